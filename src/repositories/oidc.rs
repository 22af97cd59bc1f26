use reqwest::{Client, Method};
use tokio::sync::OnceCell;

use crate::{
    auth::code_challenge,
    config::OidcConfig,
    errors::AppError,
    structs::auth::{PendingLogin, ProviderMetadata, TokenResponse},
    utils::{random::random_string, reqwest::fetch_json},
};

pub struct OidcClient {
    client: Client,
    config: OidcConfig,
    metadata: OnceCell<ProviderMetadata>,
}

impl OidcClient {
    pub fn new(client: Client, config: OidcConfig) -> Self {
        OidcClient {
            client,
            config,
            metadata: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// 第一次用到時才抓 discovery 文件，之後沿用
    pub async fn metadata(&self) -> Result<&ProviderMetadata, AppError> {
        self.metadata
            .get_or_try_init(|| async {
                let url = format!("{}/.well-known/openid-configuration", self.config.authority);
                tracing::debug!("fetching OIDC discovery document from {}", url);
                fetch_json::<ProviderMetadata>(&self.client, &url, Method::GET, None).await
            })
            .await
    }

    pub fn new_pending_login() -> PendingLogin {
        PendingLogin {
            state: random_string(32),
            nonce: random_string(32),
            code_verifier: random_string(64),
        }
    }

    pub fn authorize_url(&self, metadata: &ProviderMetadata, pending: &PendingLogin) -> String {
        let challenge = code_challenge(&pending.code_verifier);
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("state", &pending.state)
            .append_pair("nonce", &pending.nonce)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", "S256")
            .finish();

        join_query(&metadata.authorization_endpoint, &query)
    }

    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenResponse, AppError> {
        let metadata = self.metadata().await?;

        let mut pairs = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];
        if let Some(secret) = &self.config.client_secret {
            pairs.push(("client_secret", secret.as_str()));
        }

        fetch_json::<TokenResponse>(
            &self.client,
            &metadata.token_endpoint,
            Method::POST,
            Some(pairs),
        )
        .await
    }

    /// 登出用的網址；沒有 end_session_endpoint 時用 Cognito 式的 logout endpoint
    pub fn logout_url(&self, metadata: Option<&ProviderMetadata>, id_token: Option<&str>) -> Option<String> {
        if let Some(endpoint) = metadata.and_then(|m| m.end_session_endpoint.as_deref()) {
            let mut query = form_urlencoded::Serializer::new(String::new());
            query.append_pair("client_id", &self.config.client_id);
            if let Some(uri) = &self.config.post_logout_redirect_uri {
                query.append_pair("post_logout_redirect_uri", uri);
            }
            if let Some(token) = id_token {
                query.append_pair("id_token_hint", token);
            }
            return Some(join_query(endpoint, &query.finish()));
        }

        self.config.logout_endpoint.as_ref().map(|endpoint| {
            let mut query = form_urlencoded::Serializer::new(String::new());
            query.append_pair("client_id", &self.config.client_id);
            if let Some(uri) = &self.config.post_logout_redirect_uri {
                query.append_pair("logout_uri", uri);
            }
            join_query(endpoint, &query.finish())
        })
    }
}

fn join_query(endpoint: &str, query: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}{}", endpoint, separator, query)
}
