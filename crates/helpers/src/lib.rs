mod arithmetic;
mod fetch;
pub mod printer;
pub mod random;
pub mod user;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use arithmetic::{InvalidInputError, error_function, sum};
pub use fetch::{FETCH_DELAY, fake_fetch};
pub use printer::Printer;
pub use random::{RandomSource, random_between};
pub use user::{HttpClient, HttpError, HttpResponse, ReqwestClient, USER_ENDPOINT, UserError, get_user, get_user_from};
