use std::{
    any::{Any, type_name},
    fmt::{self, Debug},
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use crate::{Double, Implementation, InvalidTargetError};

struct SlotState<A, R> {
    callable: Implementation<A, R>,
    spied: bool,
}

/// A named, swappable method on a spy target.
///
/// Callers always go through [`MethodSlot::call`], so replacing the callable (as a spy does)
/// redirects every caller, including calls the target makes to its own members.
pub struct MethodSlot<A, R> {
    state: Arc<Mutex<SlotState<A, R>>>,
}

impl<A, R> MethodSlot<A, R> {
    pub fn new(callable: impl Fn(A) -> R + Send + Sync + 'static) -> Self {
        Self::from_implementation(Arc::new(callable))
    }

    pub fn from_implementation(callable: Implementation<A, R>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState {
                callable,
                spied: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<A, R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn call(&self, args: A) -> R {
        // Clone out of the lock so the callable may re-enter this slot
        let callable = self.current();
        callable(args)
    }

    /// The callable currently installed in this slot
    pub fn current(&self) -> Implementation<A, R> {
        self.lock().callable.clone()
    }

    pub fn is_spied(&self) -> bool {
        self.lock().spied
    }
}

impl<A, R> Clone for MethodSlot<A, R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<A, R> Debug for MethodSlot<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSlot")
            .field("signature", &type_name::<fn(A) -> R>())
            .field("spied", &self.is_spied())
            .finish()
    }
}

/// An object whose members can be looked up by name and spied on.
///
/// Callable members are exposed as [`MethodSlot`]s. Any other member may be exposed too;
/// spying on it fails with [`InvalidTargetError::NotCallable`].
pub trait SpyTarget {
    fn member(&self, name: &str) -> Option<&dyn Any>;
}

/// Replaces `target.member` with a double that delegates to the original callable.
///
/// The returned [`Spy`] dereferences to that double. The original is reinstated by
/// [`Spy::restore`], or when the spy is dropped.
pub fn spy_on<A, R, T>(target: &T, member: &str) -> Result<Spy<A, R>, InvalidTargetError>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
    T: SpyTarget + ?Sized,
{
    let slot = target
        .member(member)
        .ok_or_else(|| InvalidTargetError::MissingMember(member.to_string()))?
        .downcast_ref::<MethodSlot<A, R>>()
        .ok_or_else(|| InvalidTargetError::NotCallable {
            member: member.to_string(),
            expected: type_name::<MethodSlot<A, R>>(),
        })?;

    Spy::install(member, slot)
}

/// A double bound to a target member, restorable to the member's original callable.
#[must_use = "dropping a spy restores the original member immediately"]
pub struct Spy<A, R> {
    member: String,
    double: Double<A, R>,
    slot: MethodSlot<A, R>,
    original: Option<Implementation<A, R>>,
}

impl<A, R> Spy<A, R>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    fn install(member: &str, slot: &MethodSlot<A, R>) -> Result<Self, InvalidTargetError> {
        let mut state = slot.lock();
        if state.spied {
            return Err(InvalidTargetError::AlreadySpied(member.to_string()));
        }

        let original = state.callable.clone();
        let double = Double::from_parts(Some(member.to_string()), Some(original.clone()));

        let routed = double.clone();
        let fallback = original.clone();
        state.callable = Arc::new(move |args| routed.call_through(args, &fallback));
        state.spied = true;
        drop(state);

        debug!(member, double = %double.id(), "Spy installed");

        Ok(Self {
            member: member.to_string(),
            double,
            slot: slot.clone(),
            original: Some(original),
        })
    }
}

impl<A, R> Spy<A, R> {
    pub fn double(&self) -> &Double<A, R> {
        &self.double
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn is_restored(&self) -> bool {
        self.original.is_none()
    }

    /// Puts the original callable back. Calling this again has no effect.
    pub fn restore(&mut self) {
        let Some(original) = self.original.take() else {
            return;
        };

        let mut state = self.slot.lock();
        state.callable = original;
        state.spied = false;
        drop(state);

        debug!(member = self.member, "Spy restored");
    }
}

impl<A, R> Deref for Spy<A, R> {
    type Target = Double<A, R>;

    fn deref(&self) -> &Self::Target {
        &self.double
    }
}

impl<A, R> Drop for Spy<A, R> {
    fn drop(&mut self) {
        self.restore();
    }
}

impl<A, R> Debug for Spy<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spy")
            .field("member", &self.member)
            .field("double", &self.double)
            .field("restored", &self.is_restored())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Calculator {
        add: MethodSlot<(i32, i32), i32>,
        double_sum: MethodSlot<(i32, i32), i32>,
        precision: u8,
    }

    impl Calculator {
        fn new() -> Self {
            let add = MethodSlot::new(|(a, b): (i32, i32)| a + b);
            let inner = add.clone();
            Self {
                double_sum: MethodSlot::new(move |(a, b): (i32, i32)| inner.call((a, b)) * 2),
                add,
                precision: 2,
            }
        }
    }

    impl SpyTarget for Calculator {
        fn member(&self, name: &str) -> Option<&dyn Any> {
            match name {
                "add" => Some(&self.add),
                "double_sum" => Some(&self.double_sum),
                "precision" => Some(&self.precision),
                _ => None,
            }
        }
    }

    #[test]
    fn test_unconfigured_spy_delegates_to_original() {
        let calculator = Calculator::new();
        let spy = spy_on::<(i32, i32), i32, _>(&calculator, "add").unwrap();

        assert_eq!(calculator.add.call((1, 2)), 3);
        assert!(spy.assert_called_with(&(1, 2)).is_ok());
        assert_eq!(spy.name(), Some("add"));
    }

    #[test]
    fn test_spy_intercepts_internal_calls() {
        let calculator = Calculator::new();
        let spy = spy_on::<(i32, i32), i32, _>(&calculator, "add").unwrap();
        spy.return_once(10);

        assert_eq!(calculator.double_sum.call((1, 2)), 20);
        assert_eq!(calculator.double_sum.call((1, 2)), 6);
        assert!(spy.assert_called_times(2).is_ok());
    }

    #[test]
    fn test_restore_reinstates_exact_original() {
        let calculator = Calculator::new();
        let original = calculator.add.current();

        let mut spy = spy_on::<(i32, i32), i32, _>(&calculator, "add").unwrap();
        spy.return_default(0);
        assert!(!Arc::ptr_eq(&calculator.add.current(), &original));
        assert!(calculator.add.is_spied());

        spy.restore();
        spy.restore();

        assert!(spy.is_restored());
        assert!(Arc::ptr_eq(&calculator.add.current(), &original));
        assert_eq!(calculator.add.call((2, 2)), 4);
        assert!(spy.assert_called_times(0).is_ok(), "restored member bypasses the double");
    }

    #[test]
    fn test_drop_restores() {
        let calculator = Calculator::new();
        let original = calculator.add.current();
        {
            let spy = spy_on::<(i32, i32), i32, _>(&calculator, "add").unwrap();
            spy.return_default(99);
            assert_eq!(calculator.add.call((1, 1)), 99);
        }

        assert!(Arc::ptr_eq(&calculator.add.current(), &original));
        assert!(!calculator.add.is_spied());
    }

    #[test]
    fn test_missing_member() {
        let calculator = Calculator::new();
        let err = spy_on::<(i32, i32), i32, _>(&calculator, "subtract").unwrap_err();
        assert_eq!(err, InvalidTargetError::MissingMember("subtract".to_string()));
    }

    #[test]
    fn test_non_callable_member() {
        let calculator = Calculator::new();
        let err = spy_on::<(), u8, _>(&calculator, "precision").unwrap_err();
        assert!(matches!(err, InvalidTargetError::NotCallable { ref member, .. } if member == "precision"));
    }

    #[test]
    fn test_wrong_signature_is_not_callable() {
        let calculator = Calculator::new();
        let err = spy_on::<(i64, i64), i64, _>(&calculator, "add").unwrap_err();
        assert!(matches!(err, InvalidTargetError::NotCallable { .. }));
        assert!(!calculator.add.is_spied());
    }

    #[test]
    fn test_member_cannot_be_spied_twice() {
        let calculator = Calculator::new();
        let mut first = spy_on::<(i32, i32), i32, _>(&calculator, "add").unwrap();

        let err = spy_on::<(i32, i32), i32, _>(&calculator, "add").unwrap_err();
        assert_eq!(err, InvalidTargetError::AlreadySpied("add".to_string()));

        first.restore();
        assert!(spy_on::<(i32, i32), i32, _>(&calculator, "add").is_ok());
    }
}
