use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{services::sessions::SESSION_COOKIE, state::AppState};

/// 目前請求的 session id
#[derive(Clone, Debug)]
pub struct SessionId(pub String);

/// 依 cookie 掛上 session，沒有就建一個並回寫 cookie
pub async fn attach(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_id = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());

    let (id, session, created) = state
        .get_sessions()
        .get_or_create(cookie_id.as_deref())
        .await;

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(SessionId(id.clone()));

    let response = next.run(req).await;

    if !created {
        return response;
    }

    tracing::debug!("new session started");
    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.get_config().cookie_secure);

    (jar.add(cookie), response).into_response()
}
