use crate::{
    auth::{identity_from_tokens, ApiToken},
    errors::{AppError, AuthError},
    repositories::identity::CognitoClient,
    services::sessions::SessionHandle,
    state::AppState,
    structs::auth::{ConfirmSignUpData, SignInData, SignUpData},
    views::auth::{helper_page, message_page, HelperForm},
};
use axum::{extract::State, response::Html, routing::get, routing::post, Extension, Form, Router};

pub fn new() -> Router<AppState> {
    Router::new()
        .route("/signup", get(sign_up_page).post(sign_up))
        .route("/signup/confirm", get(confirm_page).post(confirm_sign_up))
        .route("/signin", get(sign_in_page).post(sign_in))
        .route("/signout", post(sign_out))
}

fn cognito_client(state: &AppState) -> Result<&CognitoClient, AppError> {
    state
        .get_cognito()
        .ok_or(AppError::AuthError(AuthError::NotConfigured("Cognito")))
}

fn sign_up_form<'a>(data: &'a SignUpData, message: Option<&'a str>) -> HelperForm<'a> {
    HelperForm {
        title: "Sign Up",
        action: "/signup",
        submit_label: "Sign Up",
        inputs: vec![
            ("email", "email", "Email", data.email.as_str()),
            ("password", "password", "Password", ""),
            ("phone", "text", "Phone Number", data.phone.as_str()),
        ],
        message,
    }
}

fn confirm_form<'a>(data: &'a ConfirmSignUpData, message: Option<&'a str>) -> HelperForm<'a> {
    HelperForm {
        title: "Confirm Sign Up",
        action: "/signup/confirm",
        submit_label: "Confirm",
        inputs: vec![
            ("email", "email", "Email", data.email.as_str()),
            ("confirmationCode", "text", "Confirmation Code", ""),
        ],
        message,
    }
}

fn sign_in_form<'a>(data: &'a SignInData, message: Option<&'a str>) -> HelperForm<'a> {
    HelperForm {
        title: "Sign In",
        action: "/signin",
        submit_label: "Sign In",
        inputs: vec![
            ("email", "email", "Email", data.email.as_str()),
            ("password", "password", "Password", ""),
        ],
        message,
    }
}

async fn sign_up_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    cognito_client(&state)?;
    let data = SignUpData::default();
    Ok(Html(helper_page(sign_up_form(&data, None), None).into_string()))
}

async fn sign_up(
    State(state): State<AppState>,
    Form(data): Form<SignUpData>,
) -> Result<Html<String>, AppError> {
    let cognito = cognito_client(&state)?;

    let message = match cognito.sign_up(&data.email, &data.password, &data.phone).await {
        Ok(true) => "Sign up successful!".to_string(),
        Ok(false) => "Confirm your email.".to_string(),
        Err(err) => format!("Sign up failed: {}", err),
    };

    Ok(Html(
        helper_page(sign_up_form(&data, Some(&message)), None).into_string(),
    ))
}

async fn confirm_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    cognito_client(&state)?;
    let data = ConfirmSignUpData::default();
    Ok(Html(helper_page(confirm_form(&data, None), None).into_string()))
}

async fn confirm_sign_up(
    State(state): State<AppState>,
    Form(data): Form<ConfirmSignUpData>,
) -> Result<Html<String>, AppError> {
    let cognito = cognito_client(&state)?;

    let message = match cognito
        .confirm_sign_up(&data.email, &data.confirmation_code)
        .await
    {
        Ok(true) => "Signup confirmed!".to_string(),
        Ok(false) => "Retry with a valid code.".to_string(),
        Err(err) => format!("Confirmation failed: {}", err),
    };

    Ok(Html(
        helper_page(confirm_form(&data, Some(&message)), None).into_string(),
    ))
}

async fn sign_in_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Html<String>, AppError> {
    cognito_client(&state)?;
    let message = session.lock().await.auth_message.take();
    let data = SignInData::default();

    Ok(Html(
        helper_page(sign_in_form(&data, message.as_deref()), None).into_string(),
    ))
}

/// 登入成功後 session 即可使用 shift 畫面
async fn sign_in(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(data): Form<SignInData>,
) -> Result<Html<String>, AppError> {
    let cognito = cognito_client(&state)?;

    let result = match cognito.sign_in(&data.email, &data.password).await {
        Ok(tokens) => identity_from_tokens(
            tokens.id_token,
            tokens.access_token,
            tokens.expires_in,
            cognito.client_id(),
            ApiToken::Id,
        ),
        Err(err) => Err(err),
    };

    let (message, signed_in_as) = match result {
        Ok((identity, _)) => {
            tracing::info!("user {} signed in", identity.subject);
            let name = identity.display_name().to_string();
            session.lock().await.sign_in(identity);
            ("Sign-in successful!".to_string(), Some(name))
        }
        Err(err) => (format!("Sign-in failed: {}", err), None),
    };

    Ok(Html(
        helper_page(sign_in_form(&data, Some(&message)), signed_in_as.as_deref()).into_string(),
    ))
}

async fn sign_out(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Html<String>, AppError> {
    let cognito = cognito_client(&state)?;

    let access_token = session
        .lock()
        .await
        .identity
        .as_ref()
        .map(|identity| identity.access_token.clone());

    let (message, signed_in_as) = match access_token {
        Some(token) => match cognito.sign_out(&token).await {
            Ok(()) => {
                session.lock().await.sign_out();
                ("Signed out successfully".to_string(), None)
            }
            Err(err) => {
                let name = session
                    .lock()
                    .await
                    .identity
                    .as_ref()
                    .map(|identity| identity.display_name().to_string());
                (format!("Sign out failed: {}", err), name)
            }
        },
        None => ("Signed out successfully".to_string(), None),
    };

    Ok(Html(
        message_page("Sign Out", &message, signed_in_as.as_deref()).into_string(),
    ))
}
