use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::{
    config::CognitoConfig,
    errors::{AppError, AuthError},
    structs::auth::AuthenticationResult,
};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Cognito user pool 的錯誤格式
#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    user_confirmed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

pub struct CognitoClient {
    client: Client,
    config: CognitoConfig,
}

impl CognitoClient {
    pub fn new(client: Client, config: CognitoConfig) -> Self {
        CognitoClient { client, config }
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    async fn call<T: DeserializeOwned>(&self, operation: &str, body: Value) -> Result<T, AppError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .header("Content-Type", CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(|err| AppError::ConnectFail(err.into()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AppError::InvalidResponse(err.into()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ProviderError>(&text) {
                Ok(err) => err.message.unwrap_or(err.kind),
                Err(_) => format!("{} {}", status, text),
            };
            tracing::debug!("cognito {} failed: {}", operation, message);
            return Err(AppError::AuthError(AuthError::IdentityProvider(message)));
        }

        // 成功時部分操作回傳空 body
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|err| AppError::InvalidResponse(err.into()))
    }

    /// 註冊；回傳是否已完成（不需再驗證）
    pub async fn sign_up(&self, email: &str, password: &str, phone: &str) -> Result<bool, AppError> {
        let body = json!({
            "ClientId": self.config.client_id,
            "Username": email,
            "Password": password,
            "UserAttributes": [
                { "Name": "email", "Value": email },
                { "Name": "phone_number", "Value": phone },
            ],
        });

        let response: SignUpResponse = self.call("SignUp", body).await?;
        Ok(response.user_confirmed)
    }

    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<bool, AppError> {
        let body = json!({
            "ClientId": self.config.client_id,
            "Username": email,
            "ConfirmationCode": code,
        });

        let _: Value = self.call("ConfirmSignUp", body).await?;
        Ok(true)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticationResult, AppError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.config.client_id,
            "AuthParameters": {
                "USERNAME": email,
                "PASSWORD": password,
            },
        });

        let response: InitiateAuthResponse = self.call("InitiateAuth", body).await?;

        match (response.authentication_result, response.challenge_name) {
            (Some(result), _) => Ok(result),
            (None, Some(challenge)) => Err(AppError::AuthError(AuthError::IdentityProvider(
                format!("Unsupported challenge: {}", challenge),
            ))),
            (None, None) => Err(AppError::InvalidResponse(anyhow::anyhow!(
                "InitiateAuth returned no tokens"
            ))),
        }
    }

    /// 撤銷該使用者所有 token
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let body = json!({ "AccessToken": access_token });

        let _: Value = self.call("GlobalSignOut", body).await?;
        Ok(())
    }
}
