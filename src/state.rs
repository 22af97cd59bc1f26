use std::sync::Arc;

use reqwest::Client;

use crate::{
    config::{AppConfig, AuthConfig},
    errors::{AppError, SystemError},
    repositories::{
        identity::CognitoClient,
        oidc::OidcClient,
        shifts::{HttpShiftApi, ShiftApi},
    },
    services::sessions::SessionStore,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    shift_api: Arc<dyn ShiftApi>,
    sessions: SessionStore,
    cognito: Option<Arc<CognitoClient>>,
    oidc: Option<Arc<OidcClient>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::SystemError(SystemError::Internal(err.to_string())))?;

        let shift_api = Arc::new(HttpShiftApi::new(
            http_client.clone(),
            config.shift_api.clone(),
        ));

        Ok(Self::with_shift_api(config, http_client, shift_api))
    }

    /// 可替換 shift API 實作
    pub fn with_shift_api(config: AppConfig, http_client: Client, shift_api: Arc<dyn ShiftApi>) -> Self {
        let (cognito, oidc) = match &config.auth {
            AuthConfig::None => (None, None),
            AuthConfig::Cognito(cognito) => (
                Some(Arc::new(CognitoClient::new(http_client, cognito.clone()))),
                None,
            ),
            AuthConfig::Oidc(oidc) => (
                None,
                Some(Arc::new(OidcClient::new(http_client, oidc.clone()))),
            ),
        };

        AppState {
            sessions: SessionStore::new(config.session_ttl),
            config: Arc::new(config),
            shift_api,
            cognito,
            oidc,
        }
    }

    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    pub fn get_shift_api(&self) -> &dyn ShiftApi {
        self.shift_api.as_ref()
    }

    pub fn get_sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn get_cognito(&self) -> Option<&CognitoClient> {
        self.cognito.as_deref()
    }

    pub fn get_oidc(&self) -> Option<&OidcClient> {
        self.oidc.as_deref()
    }
}
