use std::future::Future;

use doubles::{Deferred, Double};

use crate::user::{HttpClient, HttpError, HttpResponse};

pub type GetDouble = Double<(String,), Deferred<HttpResponse, HttpError>>;

/// HTTP client whose `get` is a double, for testing code that fetches over HTTP
#[derive(Clone, Debug)]
pub struct DoubleHttpClient {
    get: GetDouble,
}

impl DoubleHttpClient {
    pub fn new() -> Self {
        Self {
            get: Double::named("HttpClient::get"),
        }
    }

    /// The double standing in for `get`, called with the requested url
    pub fn get_double(&self) -> &GetDouble {
        &self.get
    }
}

impl Default for DoubleHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for DoubleHttpClient {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send {
        // Recorded now, even though the response settles later
        let pending = self.get.call((url.to_string(),));
        let url = url.to_string();
        async move {
            match pending {
                Some(response) => response.await,
                None => Err(HttpError::Transport(format!(
                    "no response configured for {url}"
                ))),
            }
        }
    }
}
