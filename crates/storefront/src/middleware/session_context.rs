//! Records who is signed in on the request span.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use crate::state::AppState;

/// Add the signed-in user's id and tier to the current span.
///
/// Read-only: the session is never changed here.
pub async fn session_context_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(user) = state.session().user() {
        let span = Span::current();
        span.record("user_id", user.id.as_str());
        span.record("tier", user.loyalty_tier.as_str());
    }

    next.run(request).await
}
