use crate::{
    routes::auth,
    services::{
        desk,
        form::ShiftFormValues,
        sessions::{Session, SessionHandle},
        table::ShiftTable,
    },
    state::AppState,
    structs::shifts::ShiftId,
    views,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use maud::Markup;

pub fn new(state: AppState) -> Router<AppState> {
    // 所有畫面操作都要先通過登入檢查
    Router::new()
        .route("/", get(index))
        .route("/refresh", post(refresh))
        .route("/form/toggle", post(toggle_form))
        .route("/shifts", post(submit))
        .route("/shifts/{id}/edit", post(edit))
        .route("/shifts/{id}/delete", post(request_delete))
        .route("/delete/confirm", post(confirm_delete))
        .route("/delete/cancel", post(cancel_delete))
        .route_layer(middleware::from_fn_with_state(state, auth::authorize))
}

fn render(session: &mut Session) -> Markup {
    let snackbar = session.desk.take_snackbar();
    let rows = ShiftTable::rows(session.desk.shifts());
    let signed_in_as = session
        .identity
        .as_ref()
        .map(|identity| identity.display_name().to_string());

    views::shifts::page(&session.desk, snackbar.as_ref(), &rows, signed_in_as.as_deref())
}

/// 首頁；每個 session 第一次進來時向後端載入清單
async fn index(State(state): State<AppState>, Extension(session): Extension<SessionHandle>) -> Html<String> {
    let needs_load = !session.lock().await.loaded;
    if needs_load {
        desk::load_shifts(&session, state.get_shift_api()).await;
    }

    let mut session = session.lock().await;
    Html(render(&mut session).into_string())
}

async fn refresh(State(state): State<AppState>, Extension(session): Extension<SessionHandle>) -> Redirect {
    desk::load_shifts(&session, state.get_shift_api()).await;
    Redirect::to("/")
}

async fn toggle_form(Extension(session): Extension<SessionHandle>) -> Redirect {
    session.lock().await.desk.toggle_form();
    Redirect::to("/")
}

/// 表單送出；驗證失敗時回 422 並帶著錯誤重畫
async fn submit(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(values): Form<ShiftFormValues>,
) -> Response {
    match desk::submit_form(&session, state.get_shift_api(), values).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(errors) => {
            tracing::debug!("shift form rejected: {} field errors", errors.len());
            let mut session = session.lock().await;
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render(&mut session).into_string()),
            )
                .into_response()
        }
    }
}

async fn edit(Extension(session): Extension<SessionHandle>, Path(id): Path<String>) -> Redirect {
    if !session.lock().await.desk.edit(&ShiftId::new(id.clone())) {
        tracing::debug!("shift {} cannot be edited", id);
    }
    Redirect::to("/")
}

async fn request_delete(Extension(session): Extension<SessionHandle>, Path(id): Path<String>) -> Redirect {
    if !session.lock().await.desk.request_delete(&ShiftId::new(id.clone())) {
        tracing::debug!("shift {} cannot be deleted", id);
    }
    Redirect::to("/")
}

async fn confirm_delete(State(state): State<AppState>, Extension(session): Extension<SessionHandle>) -> Redirect {
    desk::confirm_delete(&session, state.get_shift_api()).await;
    Redirect::to("/")
}

async fn cancel_delete(Extension(session): Extension<SessionHandle>) -> Redirect {
    session.lock().await.desk.cancel_delete();
    Redirect::to("/")
}
