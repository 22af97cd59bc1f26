use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not reach the remote service: {0}")]
    ConnectFail(#[source] anyhow::Error),
    #[error("Invalid response from the server: {0}")]
    InvalidResponse(#[source] anyhow::Error),
    #[error("Remote service answered {0}: {1}")]
    UpstreamStatus(StatusCode, String),
    #[error(transparent)]
    AuthError(#[from] AuthError),
    #[error(transparent)]
    SystemError(#[from] SystemError),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("You are not an authorized user")]
    Unauthorized,
    #[error("Unable to decode token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Login state does not match")]
    StateMismatch,
    #[error("{0}")]
    IdentityProvider(String),
    #[error("{0} authentication is not configured")]
    NotConfigured(&'static str),
}

#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Missing environment variable {0}")]
    EnvVarMissing(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ConnectFail(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamStatus(_, _) => StatusCode::BAD_GATEWAY,
            AppError::AuthError(err) => match err {
                AuthError::NotConfigured(_) => StatusCode::NOT_FOUND,
                AuthError::IdentityProvider(_) => StatusCode::BAD_GATEWAY,
                AuthError::StateMismatch => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNAUTHORIZED,
            },
            AppError::SystemError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("{}", self);
        }

        let error_message = self.to_string();
        (status_code, error_message).into_response()
    }
}
