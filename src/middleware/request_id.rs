use reqwest::RequestBuilder;
use uuid::Uuid;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID attached to every outgoing backend request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Creates a new random request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the UUID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tags an outgoing request with a fresh request ID.
///
/// Returns the builder with the `x-request-id` header set, plus a tracing span
/// carrying the method, path and ID so log lines emitted while the request is
/// in flight can be correlated with backend logs.
pub fn tag_request(
    builder: RequestBuilder,
    method: &str,
    path: &str,
) -> (RequestBuilder, tracing::Span) {
    let request_id = RequestId::new();
    let span = make_span_with_request_id(method, path, &request_id);
    (builder.header(REQUEST_ID_HEADER, request_id.as_str()), span)
}

/// Helper function to create a tracing span with request ID
pub fn make_span_with_request_id(method: &str, path: &str, request_id: &RequestId) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
    )
}
