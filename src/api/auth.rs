use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::session::{is_valid_device_id, verify_session_token, Session};
use crate::AppState;

pub use crate::session::TokenError;

pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// Resolve who is calling and attach a [`Session`] to the request.
///
/// `Authorization: Bearer <jwt>` is verified against `SESSION_JWT_SECRET`; a
/// token that fails verification is rejected with 401. Without a token (or
/// without a configured secret) the request is anonymous. `X-Device-Id`
/// identifies the device store of anonymous callers.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let device_id = match req
        .headers()
        .get(DEVICE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
    {
        Some(id) if is_valid_device_id(id) => Some(id.to_string()),
        Some(_) => return AppError::BadRequest("invalid X-Device-Id header".into()).into_response(),
        None => None,
    };

    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let user = match (token, state.config.session_jwt_secret.as_deref()) {
        (Some(token), Some(secret)) => match verify_session_token(token, secret) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                return AppError::Unauthorized.into_response();
            }
        },
        (Some(_), None) => {
            tracing::debug!("Session token ignored: SESSION_JWT_SECRET is not set");
            None
        }
        (None, _) => None,
    };

    req.extensions_mut().insert(Session { user, device_id });
    next.run(req).await
}
