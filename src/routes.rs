mod auth;
mod root;
mod session;
mod shifts;
mod signup;

use std::time::Duration;

use crate::state::AppState;
use axum::{middleware, Router};
use tower_http::{
    limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

/// 表單送出的內容都很小
const BODY_LIMIT: usize = 64 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn app(state: AppState) -> Router {
    let assets = ServeDir::new(&state.get_config().assets_dir);

    // 只有頁面需要 session；靜態檔和 404 不建 session
    let pages = Router::new()
        .merge(shifts::new(state.clone()))
        .merge(auth::new())
        .merge(signup::new())
        .layer(middleware::from_fn_with_state(state.clone(), session::attach));

    Router::new()
        .merge(pages)
        .nest_service("/assets", assets)
        .fallback(root::handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .with_state(state)
}
