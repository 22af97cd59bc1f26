use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sha2::{Digest, Sha256};

use crate::{
    errors::{AppError, AuthError},
    structs::auth::{IdClaims, Identity},
};

/// 呼叫 shift API 時要帶哪一種 token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiToken {
    Id,
    Access,
}

/// 解 ID token 的 claims，驗 audience 與 exp；
/// token 是直接從 provider 以 TLS 取得，不驗簽章
pub fn decode_id_token(token: &str, client_id: &str) -> Result<IdClaims, AppError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.set_audience(&[client_id]);

    decode::<IdClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::AuthError(AuthError::TokenExpired)
            }
            _ => AppError::AuthError(AuthError::InvalidToken),
        })
}

pub fn identity_from_tokens(
    id_token: String,
    access_token: String,
    expires_in: Option<i64>,
    client_id: &str,
    api_token: ApiToken,
) -> Result<(Identity, IdClaims), AppError> {
    let claims = decode_id_token(&id_token, client_id)?;

    let now = Utc::now();
    let claims_expiry: DateTime<Utc> = Utc
        .timestamp_opt(claims.exp as i64, 0)
        .single()
        .unwrap_or(now);
    // 以較早到期者為準
    let expires_at = match expires_in {
        Some(seconds) => claims_expiry.min(now + Duration::seconds(seconds)),
        None => claims_expiry,
    };

    let api_token = match api_token {
        ApiToken::Id => id_token.clone(),
        ApiToken::Access => access_token.clone(),
    };

    let identity = Identity {
        subject: claims.sub.clone(),
        email: claims.email.clone(),
        id_token,
        access_token,
        api_token,
        expires_at,
    };

    Ok((identity, claims))
}

/// PKCE S256 code challenge
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
