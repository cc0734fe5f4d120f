//! Tenant resolution middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, Response},
    middleware::Next,
};

use super::{RequestContext, TenantResolver};

/// Attach a [`super::TenantContext`] extension to every request
///
/// Runs before route dispatch and never rejects a request.
pub async fn resolve_tenant(
    State(resolver): State<TenantResolver>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let headers = request.headers();
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()));
    let tenant_header = headers
        .get(resolver.tenant_header())
        .and_then(|h| h.to_str().ok());

    let ctx = RequestContext::new(host, tenant_header);
    let tenant = resolver.resolve(&ctx).await;
    request.extensions_mut().insert(tenant);

    next.run(request).await
}
