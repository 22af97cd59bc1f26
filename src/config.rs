use std::time::Duration;

use crate::{
    errors::{AppError, SystemError},
    utils::url::encode_segment,
};

/// 預設的後端路徑
const DEFAULT_COLLECTION_PATH: &str = "/api/";
const DEFAULT_ITEM_PATH: &str = "/api/single/{id}";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub shift_api: ShiftApiConfig,
    pub auth: AuthConfig,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub assets_dir: String,
}

#[derive(Debug, Clone)]
pub struct ShiftApiConfig {
    pub base_url: String,
    pub collection_path: String,
    /// 含 `{id}` 佔位符
    pub item_path: String,
    pub timeout: Duration,
}

impl ShiftApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ShiftApiConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
            item_path: DEFAULT_ITEM_PATH.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, self.collection_path)
    }

    pub fn item_url(&self, id: &str) -> String {
        let encoded = encode_segment(id);
        format!("{}{}", self.base_url, self.item_path.replace("{id}", &encoded))
    }
}

#[derive(Debug, Clone)]
pub enum AuthConfig {
    None,
    Cognito(CognitoConfig),
    Oidc(OidcConfig),
}

impl AuthConfig {
    pub fn mode(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Cognito(_) => "cognito",
            AuthConfig::Oidc(_) => "oidc",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CognitoConfig {
    pub region: String,
    pub client_id: String,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct OidcConfig {
    pub authority: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub post_logout_redirect_uri: Option<String>,
    pub logout_endpoint: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意查詢函數讀設定，測試時不用動到環境變數
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| AppError::SystemError(SystemError::EnvVarMissing(key.to_string())))
        };

        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("APP_PORT", get("APP_PORT"), 3000u16)?;

        let mut shift_api = ShiftApiConfig::new(required("SHIFT_API_BASE_URL")?);
        if let Some(path) = get("SHIFT_API_COLLECTION_PATH") {
            shift_api.collection_path = path;
        }
        if let Some(path) = get("SHIFT_API_ITEM_PATH") {
            if !path.contains("{id}") {
                return Err(invalid("SHIFT_API_ITEM_PATH 必須包含 {id}"));
            }
            shift_api.item_path = path;
        }
        shift_api.timeout = Duration::from_secs(parse_or(
            "SHIFT_API_TIMEOUT_SECS",
            get("SHIFT_API_TIMEOUT_SECS"),
            10u64,
        )?);

        let auth = match get("AUTH_MODE").as_deref().unwrap_or("none") {
            "none" => AuthConfig::None,
            "cognito" => {
                let region = required("COGNITO_REGION")?;
                let endpoint = get("COGNITO_ENDPOINT")
                    .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", region));
                AuthConfig::Cognito(CognitoConfig {
                    region,
                    client_id: required("COGNITO_CLIENT_ID")?,
                    endpoint,
                })
            }
            "oidc" => AuthConfig::Oidc(OidcConfig {
                authority: required("OIDC_AUTHORITY")?
                    .trim_end_matches('/')
                    .to_string(),
                client_id: required("OIDC_CLIENT_ID")?,
                client_secret: get("OIDC_CLIENT_SECRET"),
                redirect_uri: required("OIDC_REDIRECT_URI")?,
                scope: get("OIDC_SCOPE").unwrap_or_else(|| "openid email profile".to_string()),
                post_logout_redirect_uri: get("OIDC_POST_LOGOUT_REDIRECT_URI"),
                logout_endpoint: get("OIDC_LOGOUT_ENDPOINT"),
            }),
            other => return Err(invalid(&format!("未知的 AUTH_MODE: {}", other))),
        };

        let ttl_minutes = parse_or("SESSION_TTL_MINUTES", get("SESSION_TTL_MINUTES"), 480u64)?;
        let session_ttl = ttl_minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| invalid(&format!("SESSION_TTL_MINUTES 過大: {}", ttl_minutes)))?;
        let cookie_secure = parse_or("COOKIE_SECURE", get("COOKIE_SECURE"), false)?;
        let assets_dir = get("ASSETS_DIR").unwrap_or_else(|| "assets".to_string());

        Ok(AppConfig {
            host,
            port,
            shift_api,
            auth,
            session_ttl,
            cookie_secure,
            assets_dir,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, AppError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(&format!("{} 無法解析: {}", key, raw))),
        None => Ok(default),
    }
}

fn invalid(message: &str) -> AppError {
    AppError::SystemError(SystemError::InvalidConfig(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_auth() {
        let config =
            AppConfig::from_lookup(lookup(&[("SHIFT_API_BASE_URL", "http://backend.local/prod/")]))
                .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(matches!(config.auth, AuthConfig::None));
        assert_eq!(config.shift_api.collection_url(), "http://backend.local/prod/api/");
        assert_eq!(
            config.shift_api.item_url("abc"),
            "http://backend.local/prod/api/single/abc"
        );
        assert_eq!(config.session_ttl, Duration::from_secs(480 * 60));
    }

    #[test]
    fn missing_base_url_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(
            err,
            AppError::SystemError(SystemError::EnvVarMissing(ref key)) if key == "SHIFT_API_BASE_URL"
        ));
    }

    #[test]
    fn amplify_style_paths_and_cognito() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SHIFT_API_BASE_URL", "https://api.example.com"),
            ("SHIFT_API_COLLECTION_PATH", "/shifts"),
            ("SHIFT_API_ITEM_PATH", "/shifts/{id}"),
            ("AUTH_MODE", "cognito"),
            ("COGNITO_REGION", "eu-west-1"),
            ("COGNITO_CLIENT_ID", "client-123"),
        ]))
        .unwrap();

        assert_eq!(config.shift_api.item_url("a b"), "https://api.example.com/shifts/a%20b");
        match config.auth {
            AuthConfig::Cognito(cognito) => {
                assert_eq!(cognito.endpoint, "https://cognito-idp.eu-west-1.amazonaws.com/");
                assert_eq!(cognito.client_id, "client-123");
            }
            other => panic!("unexpected auth config: {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_lookup(lookup(&[
            ("SHIFT_API_BASE_URL", "http://b"),
            ("APP_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::SystemError(SystemError::InvalidConfig(_))));

        let err = AppConfig::from_lookup(lookup(&[
            ("SHIFT_API_BASE_URL", "http://b"),
            ("AUTH_MODE", "oidc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::SystemError(SystemError::EnvVarMissing(_))));
    }

    #[test]
    fn session_ttl_overflow_is_invalid() {
        let err = AppConfig::from_lookup(lookup(&[
            ("SHIFT_API_BASE_URL", "http://b"),
            ("SESSION_TTL_MINUTES", "18446744073709551615"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::SystemError(SystemError::InvalidConfig(_))));

        let config = AppConfig::from_lookup(lookup(&[
            ("SHIFT_API_BASE_URL", "http://b"),
            ("SESSION_TTL_MINUTES", "90"),
        ]))
        .unwrap();
        assert_eq!(config.session_ttl, Duration::from_secs(90 * 60));
    }
}
