use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// `gty` value carried by service-to-service tokens.
pub const MACHINE_GRANT_TYPE: &str = "client-credentials";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Space separated scope list, machine tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gty: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Claims for a human user.
    pub fn user(sub: impl Into<String>, handle: impl Into<String>, roles: Vec<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            handle: Some(handle.into()),
            roles,
            scope: None,
            gty: None,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Claims for a machine (client-credentials) caller.
    pub fn machine(client_id: impl Into<String>, scopes: &[&str], expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: client_id.into(),
            handle: None,
            roles: vec![],
            scope: Some(scopes.join(" ")),
            gty: Some(MACHINE_GRANT_TYPE.to_string()),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn is_machine(&self) -> bool {
        self.gty.as_deref() == Some(MACHINE_GRANT_TYPE)
    }

    pub fn scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_ref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "JWT secret not configured"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_user_claims() {
        let claims = Claims::user("40011", "tonyj", vec!["administrator".into()], 1);
        let token = generate_jwt(&claims, "secret").unwrap();
        let decoded = validate_jwt(&token, "secret").unwrap();
        assert_eq!(decoded.sub, "40011");
        assert_eq!(decoded.roles, vec!["administrator".to_string()]);
        assert!(!decoded.is_machine());
        assert_eq!(decoded.scopes(), None);
    }

    #[test]
    fn test_machine_claims_expose_scopes() {
        let claims = Claims::machine("svc", &["read:a", "write:b"], 1);
        assert!(claims.is_machine());
        assert_eq!(claims.scopes(), Some(vec!["read:a".to_string(), "write:b".to_string()]));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_jwt(&Claims::machine("svc", &[], 1), "secret").unwrap();
        assert!(matches!(validate_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(generate_jwt(&Claims::machine("svc", &[], 1), ""), Err(JwtError::InvalidSecret)));
    }
}
