use crate::{
    auth::{identity_from_tokens, ApiToken},
    config::AuthConfig,
    errors::{AppError, AuthError},
    repositories::oidc::OidcClient,
    routes::session::SessionId,
    services::sessions::SessionHandle,
    state::AppState,
    structs::auth::CallbackParams,
    views,
};
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};

pub fn new() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout_page).post(logout))
}

/// 未登入時導向登入流程；不需驗證的模式直接放行
pub async fn authorize(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    req: Request,
    next: Next,
) -> Response {
    let login_path = match state.get_config().auth {
        AuthConfig::None => return next.run(req).await,
        AuthConfig::Cognito(_) => "/signin",
        AuthConfig::Oidc(_) => "/login",
    };

    {
        let mut session = session.lock().await;
        if session.active_identity().is_none() {
            if login_path == "/signin" {
                session.auth_message = Some("Sign in to manage shifts.".to_string());
            }
            return Redirect::to(login_path).into_response();
        }
    }

    next.run(req).await
}

fn oidc_client(state: &AppState) -> Result<&OidcClient, AppError> {
    state
        .get_oidc()
        .ok_or(AppError::AuthError(AuthError::NotConfigured("OIDC")))
}

/// 開始 OIDC redirect 流程
async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Redirect, AppError> {
    let oidc = match state.get_config().auth {
        AuthConfig::Oidc(_) => oidc_client(&state)?,
        AuthConfig::Cognito(_) => return Ok(Redirect::to("/signin")),
        AuthConfig::None => return Ok(Redirect::to("/")),
    };

    let metadata = oidc.metadata().await?;
    let pending = OidcClient::new_pending_login();
    let url = oidc.authorize_url(metadata, &pending);

    session.lock().await.pending_login = Some(pending);

    Ok(Redirect::to(&url))
}

/// provider 導回：驗 state、換 token、驗 nonce
async fn callback(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let oidc = oidc_client(&state)?;

    if let Some(error) = params.error {
        let message = params.error_description.unwrap_or(error);
        tracing::error!("OIDC login failed: {}", message);
        return Err(AppError::AuthError(AuthError::IdentityProvider(message)));
    }

    let pending = session
        .lock()
        .await
        .pending_login
        .take()
        .ok_or(AppError::AuthError(AuthError::StateMismatch))?;

    if params.state.as_deref() != Some(pending.state.as_str()) {
        return Err(AppError::AuthError(AuthError::StateMismatch));
    }

    // state 對得上但沒有授權碼，視為未授權
    let code = params
        .code
        .ok_or(AppError::AuthError(AuthError::Unauthorized))?;

    let tokens = oidc.exchange_code(&code, &pending.code_verifier).await?;

    let (identity, claims) = identity_from_tokens(
        tokens.id_token,
        tokens.access_token,
        tokens.expires_in,
        &oidc.config().client_id,
        ApiToken::Access,
    )?;

    if claims.nonce.as_deref() != Some(pending.nonce.as_str()) {
        return Err(AppError::AuthError(AuthError::InvalidToken));
    }

    tracing::info!("user {} signed in", identity.subject);
    session.lock().await.sign_in(identity);

    Ok(Redirect::to("/"))
}

async fn logout_page(Extension(session): Extension<SessionHandle>) -> Html<String> {
    let mut session = session.lock().await;
    let signed_in_as = session
        .active_identity()
        .map(|identity| identity.display_name().to_string());

    Html(views::auth::logout_page(signed_in_as.as_deref()).into_string())
}

async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Redirect {
    let identity = {
        let mut session = session.lock().await;
        let identity = session.identity.take();
        session.sign_out();
        identity
    };
    state.get_sessions().remove(&session_id).await;

    match state.get_config().auth {
        AuthConfig::None => Redirect::to("/"),
        AuthConfig::Cognito(_) => {
            if let (Some(cognito), Some(identity)) = (state.get_cognito(), identity.as_ref()) {
                if let Err(err) = cognito.sign_out(&identity.access_token).await {
                    tracing::error!("Error during logout: {}", err);
                }
            }
            Redirect::to("/signin")
        }
        AuthConfig::Oidc(_) => {
            let Some(oidc) = state.get_oidc() else {
                return Redirect::to("/");
            };
            let metadata = oidc
                .metadata()
                .await
                .inspect_err(|err| tracing::error!("Error during logout: {}", err))
                .ok();
            let id_token = identity.as_ref().map(|identity| identity.id_token.as_str());

            match oidc.logout_url(metadata, id_token) {
                Some(url) => Redirect::to(&url),
                None => Redirect::to("/"),
            }
        }
    }
}
