use std::{
    collections::VecDeque,
    fmt::{self, Debug, Display},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::trace;
use uuid::Uuid;

use crate::{AssertionFailure, Call, Deferred, assertions};

/// Shared reference to a callable. Spies compare these by pointer identity.
pub type Implementation<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DoubleId(Uuid);

impl DoubleId {
    fn generate() -> Self {
        DoubleId(Uuid::new_v4())
    }

    pub fn value(&self) -> &Uuid {
        &self.0
    }
}

impl Display for DoubleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct DoubleState<A, R> {
    calls: Vec<Call<A>>,
    once: VecDeque<R>,
    default: Option<R>,
    implementation: Option<Implementation<A, R>>,
}

enum Resolution<A, R> {
    Value(R),
    Delegate(Implementation<A, R>),
    Unset,
}

/// A callable stand-in that records every invocation.
///
/// `A` is the argument tuple and `R` the return type. Cloning a `Double` yields another
/// handle onto the same history and configuration, so a test can keep one handle while
/// the code under test owns another.
///
/// Return values are resolved in a fixed order: queued one-shot values first, then the
/// default return value, then the underlying implementation. With none of those, the
/// double returns `None`.
pub struct Double<A, R> {
    id: DoubleId,
    name: Option<Arc<str>>,
    state: Arc<Mutex<DoubleState<A, R>>>,
}

impl<A, R> Double<A, R> {
    pub fn new() -> Self {
        Self::from_parts(None, None)
    }

    /// Creates a double whose name is shown in assertion failures
    pub fn named(name: impl Into<String>) -> Self {
        Self::from_parts(Some(name.into()), None)
    }

    pub fn with_implementation(implementation: impl Fn(A) -> R + Send + Sync + 'static) -> Self {
        Self::from_parts(None, Some(Arc::new(implementation)))
    }

    pub(crate) fn from_parts(
        name: Option<String>,
        implementation: Option<Implementation<A, R>>,
    ) -> Self {
        Self {
            id: DoubleId::generate(),
            name: name.map(Arc::from),
            state: Arc::new(Mutex::new(DoubleState {
                calls: Vec::new(),
                once: VecDeque::new(),
                default: None,
                implementation,
            })),
        }
    }

    pub fn id(&self) -> DoubleId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, DoubleState<A, R>> {
        // Recorded history stays valid even if a panicking test poisoned the lock
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the underlying implementation
    pub fn implementation(&self, implementation: impl Fn(A) -> R + Send + Sync + 'static) {
        self.lock().implementation = Some(Arc::new(implementation));
    }

    /// Queues a value returned by exactly one future invocation, in FIFO order
    pub fn return_once(&self, value: R) {
        self.lock().once.push_back(value);
    }

    /// Sets the value returned whenever no one-shot value is queued
    pub fn return_default(&self, value: R) {
        self.lock().default = Some(value);
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub(crate) fn with_history<T>(&self, inspect: impl FnOnce(&[Call<A>]) -> T) -> T {
        inspect(&self.lock().calls)
    }
}

impl<A: Clone, R: Clone> Double<A, R> {
    /// Invokes the double, recording the call before any return value is produced
    pub fn call(&self, args: A) -> Option<R> {
        match self.record_and_resolve(&args) {
            Resolution::Value(value) => Some(value),
            Resolution::Delegate(implementation) => Some(implementation(args)),
            Resolution::Unset => None,
        }
    }

    /// Invokes the double, delegating to `fallback` when nothing else is configured
    pub(crate) fn call_through(&self, args: A, fallback: &Implementation<A, R>) -> R {
        match self.record_and_resolve(&args) {
            Resolution::Value(value) => value,
            Resolution::Delegate(implementation) => implementation(args),
            Resolution::Unset => fallback(args),
        }
    }

    fn record_and_resolve(&self, args: &A) -> Resolution<A, R> {
        let mut state = self.lock();
        let index = state.calls.len();
        state.calls.push(Call::new(args.clone(), index));
        trace!(double = %self, index, "Double invoked");

        // The lock is released before any implementation runs, so it may re-enter the double
        if let Some(value) = state.once.pop_front() {
            Resolution::Value(value)
        } else if let Some(value) = &state.default {
            Resolution::Value(value.clone())
        } else if let Some(implementation) = &state.implementation {
            Resolution::Delegate(implementation.clone())
        } else {
            Resolution::Unset
        }
    }

    pub fn calls(&self) -> Vec<Call<A>> {
        self.lock().calls.clone()
    }

    pub fn last_call(&self) -> Option<Call<A>> {
        self.lock().calls.last().cloned()
    }

    /// The call recorded at `index`, counting from 0
    pub fn nth_call(&self, index: usize) -> Option<Call<A>> {
        self.lock().calls.get(index).cloned()
    }
}

impl<A: Debug, R> Double<A, R> {
    pub fn assert_called(&self) -> Result<(), AssertionFailure> {
        assertions::assert_called(self)
    }

    pub fn assert_called_times(&self, times: usize) -> Result<(), AssertionFailure> {
        assertions::assert_called_times(self, times)
    }

    pub fn assert_not_called(&self) -> Result<(), AssertionFailure> {
        assertions::assert_not_called(self)
    }
}

impl<A: Debug + PartialEq, R> Double<A, R> {
    pub fn assert_called_with(&self, args: &A) -> Result<(), AssertionFailure> {
        assertions::assert_called_with(self, args)
    }

    pub fn assert_last_called_with(&self, args: &A) -> Result<(), AssertionFailure> {
        assertions::assert_last_called_with(self, args)
    }
}

impl<A, T: Clone, E: Clone> Double<A, Deferred<T, E>> {
    /// Every invocation without a one-shot value yields a pending value resolving to `value`
    pub fn resolve_default(&self, value: T) {
        self.return_default(Deferred::resolved(value));
    }

    pub fn resolve_once(&self, value: T) {
        self.return_once(Deferred::resolved(value));
    }

    pub fn reject_default(&self, error: E) {
        self.return_default(Deferred::rejected(error));
    }

    pub fn reject_once(&self, error: E) {
        self.return_once(Deferred::rejected(error));
    }
}

impl<A, R> Clone for Double<A, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            state: self.state.clone(),
        }
    }
}

impl<A, R> Default for Double<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Display for Double<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "double {}", self.id),
        }
    }
}

impl<A, R> Debug for Double<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Double")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("call_count", &self.call_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    #[test]
    fn test_implementation_result_and_call_recorded() {
        let double = Double::with_implementation(|(x,): (i32,)| 42 + x);

        assert_eq!(double.call((2,)), Some(44));
        assert!(double.assert_called_with(&(2,)).is_ok());
        assert_eq!(double.call_count(), 1);
    }

    #[test]
    fn test_return_once_then_no_value() {
        let double: Double<(), i32> = Double::new();
        double.return_once(10);

        assert_eq!(double.call(()), Some(10));
        assert_eq!(double.call(()), None);
    }

    #[test]
    fn test_return_once_is_fifo_before_default() {
        let double: Double<(), i32> = Double::new();
        double.return_default(0);
        double.return_once(1);
        double.return_once(2);

        assert_eq!(double.call(()), Some(1));
        assert_eq!(double.call(()), Some(2));
        assert_eq!(double.call(()), Some(0));
        assert_eq!(double.call(()), Some(0));
    }

    #[test]
    fn test_default_takes_priority_over_implementation() {
        let double = Double::with_implementation(|(x,): (i32,)| x * 2);
        assert_eq!(double.call((3,)), Some(6));

        double.return_default(-1);
        assert_eq!(double.call((3,)), Some(-1));

        double.return_default(-2);
        assert_eq!(double.call((3,)), Some(-2), "default should be replaced");
    }

    #[test]
    fn test_implementation_can_be_replaced() {
        let double = Double::with_implementation(|(x,): (i32,)| x);
        double.implementation(|(x,): (i32,)| x + 100);

        assert_eq!(double.call((1,)), Some(101));
    }

    #[test]
    fn test_history_is_ordered_and_indexed() {
        let double: Double<(String, u8), ()> = Double::new();
        for (i, word) in ["a", "b", "c"].iter().enumerate() {
            double.call((word.to_string(), i as u8));
        }

        let calls = double.calls();
        assert_eq!(calls.len(), 3);
        for (i, call) in calls.iter().enumerate() {
            assert_eq!(call.index(), i);
            assert_eq!(call.args().1, i as u8);
        }
        assert_eq!(double.nth_call(1).unwrap().args().0, "b");
        assert_eq!(double.last_call().unwrap().into_args(), ("c".to_string(), 2));
        assert!(double.nth_call(3).is_none());
    }

    #[test]
    fn test_errors_pass_through_unmodified() {
        let double = Double::with_implementation(|(input,): (&str,)| {
            input.parse::<u32>().map_err(|e| e.to_string())
        });

        assert_eq!(double.call(("12",)), Some(Ok(12)));
        assert!(matches!(double.call(("a",)), Some(Err(_))));
        assert_eq!(double.call_count(), 2);
    }

    #[test]
    fn test_clones_share_history() {
        let double: Double<(u8,), ()> = Double::named("shared");
        let handle = double.clone();

        handle.call((1,));

        assert_eq!(double.id(), handle.id());
        assert_eq!(double.call_count(), 1);
        assert_eq!(double.name(), Some("shared"));
        assert_eq!(double.to_string(), "shared");
    }

    #[test]
    fn test_implementation_may_reenter_double() {
        let double: Double<(u32,), u32> = Double::new();
        let inner = double.clone();
        double.implementation(move |(n,)| {
            if n == 0 {
                0
            } else {
                n + inner.call((n - 1,)).unwrap_or_default()
            }
        });

        assert_eq!(double.call((3,)), Some(6));
        assert_eq!(double.call_count(), 4);
    }

    #[test]
    fn test_distinct_doubles_have_distinct_ids() {
        let first: Double<(), ()> = Double::new();
        let second: Double<(), ()> = Double::new();
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_resolve_default_records_before_resolution() {
        let double: Double<(), Deferred<u64, Infallible>> = Double::new();
        double.resolve_default(1);

        let pending = double.call(()).unwrap();
        assert!(double.assert_called_times(1).is_ok());

        assert_eq!(pending.await, Ok(1));
        assert_eq!(double.call(()).unwrap().await, Ok(1));
    }

    #[tokio::test]
    async fn test_resolve_and_reject_once() {
        let double: Double<(), Deferred<&str, String>> = Double::new();
        double.resolve_default("fallback");
        double.reject_once("first".to_string());
        double.resolve_once("second");

        assert_eq!(double.call(()).unwrap().await, Err("first".to_string()));
        assert_eq!(double.call(()).unwrap().await, Ok("second"));
        assert_eq!(double.call(()).unwrap().await, Ok("fallback"));

        double.reject_default("down".to_string());
        assert_eq!(double.call(()).unwrap().await, Err("down".to_string()));
    }
}
