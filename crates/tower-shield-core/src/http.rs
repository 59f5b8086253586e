//! Labeling hooks for HTTP request and response types.
//!
//! The interceptor labels metrics by request and decides retries by response
//! status without committing to a concrete body type. These two traits are
//! the seam: they are implemented here for the [`http`] crate's types and
//! can be implemented for any custom request/response pair.

/// Names a request for observability labeling.
///
/// This is the default request namer used by the interceptor when no custom
/// naming function is configured. For `http::Request` the label is the full
/// request URI.
pub trait RequestLabel {
    fn label(&self) -> String;
}

impl<B> RequestLabel for http::Request<B> {
    fn label(&self) -> String {
        self.uri().to_string()
    }
}

/// Exposes a response's status code for retry decisions and metrics.
pub trait ResponseStatus {
    fn status_code(&self) -> u16;
}

impl<B> ResponseStatus for http::Response<B> {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}
