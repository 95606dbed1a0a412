use axum::{
    body::Body,
    http::{Request, Response},
    middleware::Next,
};
use http::HeaderValue;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Per-request data shared with handlers and middleware through extensions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: String) -> Self {
        Self { request_id }
    }

    /// Reuses a caller-supplied `x-request-id`, otherwise mints a UUID v4.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let request_id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self::new(request_id)
    }
}

pub async fn request_context_middleware(mut req: Request<Body>, next: Next) -> Response<Body> {
    let context = RequestContext::from_request(&req);
    let header = HeaderValue::from_str(&context.request_id).ok();
    req.extensions_mut().insert(context);

    let mut response = next.run(req).await;
    if let Some(header) = header {
        response.headers_mut().insert(X_REQUEST_ID, header);
    }
    response
}
