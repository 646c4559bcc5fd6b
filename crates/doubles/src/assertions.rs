//! Read-only predicates over a double's call history.
//!
//! Each predicate returns `Ok(())` on success and an [`AssertionFailure`] describing the
//! expectation and the recorded history otherwise. Nothing here panics; the caller decides
//! whether a failure is fatal.

use std::{fmt::Debug, future::IntoFuture};

use crate::{AssertionFailure, Call, Double};

fn describe_history<A: Debug>(calls: &[Call<A>]) -> String {
    if calls.is_empty() {
        return "it was never called".to_string();
    }

    let rendered = calls
        .iter()
        .map(|call| format!("#{} {:?}", call.index(), call.args()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("it was called {} time(s): [{rendered}]", calls.len())
}

pub fn assert_called<A: Debug, R>(double: &Double<A, R>) -> Result<(), AssertionFailure> {
    double.with_history(|calls| {
        if calls.is_empty() {
            Err(AssertionFailure::new(
                double.to_string(),
                "to have been called",
                describe_history(calls),
            ))
        } else {
            Ok(())
        }
    })
}

pub fn assert_called_times<A: Debug, R>(
    double: &Double<A, R>,
    times: usize,
) -> Result<(), AssertionFailure> {
    double.with_history(|calls| {
        if calls.len() == times {
            Ok(())
        } else {
            Err(AssertionFailure::new(
                double.to_string(),
                format!("to have been called {times} time(s)"),
                describe_history(calls),
            ))
        }
    })
}

/// Passes if any recorded call received arguments equal to `args`, regardless of order
pub fn assert_called_with<A: Debug + PartialEq, R>(
    double: &Double<A, R>,
    args: &A,
) -> Result<(), AssertionFailure> {
    double.with_history(|calls| {
        if calls.iter().any(|call| call.args() == args) {
            Ok(())
        } else {
            Err(AssertionFailure::new(
                double.to_string(),
                format!("to have been called with {args:?}"),
                describe_history(calls),
            ))
        }
    })
}

pub fn assert_last_called_with<A: Debug + PartialEq, R>(
    double: &Double<A, R>,
    args: &A,
) -> Result<(), AssertionFailure> {
    double.with_history(|calls| match calls.last() {
        Some(call) if call.args() == args => Ok(()),
        _ => Err(AssertionFailure::new(
            double.to_string(),
            format!("to have been last called with {args:?}"),
            describe_history(calls),
        )),
    })
}

pub fn assert_not_called<A: Debug, R>(double: &Double<A, R>) -> Result<(), AssertionFailure> {
    double.with_history(|calls| {
        if calls.is_empty() {
            Ok(())
        } else {
            Err(AssertionFailure::new(
                double.to_string(),
                "not to have been called",
                describe_history(calls),
            ))
        }
    })
}

/// Awaits `future` and checks that it resolved to `expected`
pub async fn assert_resolves_to<F, T, E>(future: F, expected: &T) -> Result<(), AssertionFailure>
where
    F: IntoFuture<Output = Result<T, E>>,
    T: Debug + PartialEq,
    E: Debug,
{
    match future.await {
        Ok(value) if value == *expected => Ok(()),
        Ok(value) => Err(AssertionFailure::new(
            "future",
            format!("to resolve to {expected:?}"),
            format!("it resolved to {value:?}"),
        )),
        Err(error) => Err(AssertionFailure::new(
            "future",
            format!("to resolve to {expected:?}"),
            format!("it was rejected with {error:?}"),
        )),
    }
}

/// Awaits `future` and hands back its rejection for further inspection
pub async fn assert_rejects<F, T, E>(future: F) -> Result<E, AssertionFailure>
where
    F: IntoFuture<Output = Result<T, E>>,
    T: Debug,
{
    match future.await {
        Err(error) => Ok(error),
        Ok(value) => Err(AssertionFailure::new(
            "future",
            "to be rejected",
            format!("it resolved to {value:?}"),
        )),
    }
}
