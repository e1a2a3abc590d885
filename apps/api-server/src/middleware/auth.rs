//! Authentication gate: bearer-token extractor for protected routes.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use bitacora_core::ports::AuthError;
use bitacora_shared::ErrorResponse;

use crate::state::AppState;

/// Authenticated identity, decoded from the request's bearer token.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

/// Error type for authentication failures at the gate.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            // Undecodable tokens are a malformed request rather than a
            // refused one.
            AuthError::InvalidToken(_) => actix_web::http::StatusCode::BAD_REQUEST,
            AuthError::TokenExpired | AuthError::MissingAuth => {
                actix_web::http::StatusCode::UNAUTHORIZED
            }
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(400, "Malformed Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            _ => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "server configuration error".to_string(),
            ))));
        };

        let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
            return ready(Err(AuthenticationError(AuthError::MissingAuth)));
        };

        let Ok(auth_str) = auth_header.to_str() else {
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "invalid authorization header".to_string(),
            ))));
        };

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "expected Bearer token".to_string(),
            ))));
        };

        match state.tokens.validate_token(token) {
            Ok(claims) => ready(Ok(Identity {
                user_id: claims.user_id,
                username: claims.username,
            })),
            Err(e) => ready(Err(AuthenticationError(e))),
        }
    }
}
