//! Access tokens are minted by the identity provider after OAuth sign-in;
//! this service only verifies them.

use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub fn token_for(user_id: Uuid, token_type: TokenType, ttl_secs: i64, secret: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: "user@example.com".into(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            token_type,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    pub fn access_token(user_id: Uuid, secret: &str) -> String {
        token_for(user_id, TokenType::Access, 900, secret)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_valid_token_round_trips_subject() {
        let user = Uuid::new_v4();
        let token = access_token(user, "secret");
        let data = verify_token(&token, "secret").unwrap();
        assert_eq!(data.claims.sub, user);
        assert_eq!(data.claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = access_token(Uuid::new_v4(), "secret");
        assert!(matches!(
            verify_token(&token, "other"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let token = token_for(Uuid::new_v4(), TokenType::Access, -120, "secret");
        assert!(verify_token(&token, "secret").is_err());
    }
}
