mod call;
mod deferred;
mod double;
mod error;
mod spy;
pub mod assertions;

pub use call::Call;
pub use deferred::Deferred;
pub use double::{Double, DoubleId, Implementation};
pub use error::{AssertionFailure, InvalidTargetError};
pub use spy::{MethodSlot, Spy, SpyTarget, spy_on};
