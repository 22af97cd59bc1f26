use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ID token 內用到的 claims
#[derive(Debug, Serialize, Deserialize)]
pub struct IdClaims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
}

/// 已登入的使用者
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub email: Option<String>,
    pub id_token: String,
    pub access_token: String,
    /// 呼叫 shift API 時帶的 bearer token
    pub api_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.subject)
    }
}

/// OIDC redirect 進行中的資料
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub state: String,
    pub nonce: String,
    pub code_verifier: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignUpData {
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmSignUpData {
    pub email: String,
    #[serde(rename = "confirmationCode")]
    pub confirmation_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInData {
    pub email: String,
    pub password: String,
}

/// Cognito InitiateAuth 成功時的結果
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub access_token: String,
    pub id_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}
