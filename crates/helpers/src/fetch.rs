use std::time::Duration;

use doubles::Deferred;

pub const FETCH_DELAY: Duration = Duration::from_secs(1);

/// Resolves to "peanut butter" after [`FETCH_DELAY`]. Must be awaited inside a tokio runtime.
pub fn fake_fetch() -> Deferred<&'static str> {
    Deferred::resolved_after(FETCH_DELAY, "peanut butter")
}
