#![cfg(any(test, feature = "testing"))]

// Double-backed collaborators for tests of code that depends on doubles_helpers.
//
// These implement the same traits as the real collaborators, but every call goes
// through a `Double`, so tests can program responses and inspect the recorded calls.

pub mod double_http_client;

pub use double_http_client::DoubleHttpClient;
