use chrono::{NaiveDateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::id::{marker::UserMarker, Id};

/// Claims of a session token.
///
/// Minting these is the business of the authentication subsystem
/// (and of the test suite); this application only needs to verify
/// them and read the user id back out. Token lifetime and
/// revocation belong to that subsystem too, which is why decoding
/// skips expiry validation: there is no `exp` claim to check.
#[derive(Debug, Deserialize, Serialize)]
pub struct Jwt {
    pub created_at: NaiveDateTime,
    pub issuer: String,
    pub user_id: Id<UserMarker>,
}

impl Jwt {
    #[tracing::instrument(skip_all)]
    pub fn decode(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        jsonwebtoken::decode::<Self>(token, &key, &validation).map(|data| data.claims)
    }

    #[tracing::instrument(skip_all)]
    pub fn encode(
        user_id: Id<UserMarker>,
        secret: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header {
            alg: Algorithm::HS512,
            ..Default::default()
        };
        let claims = Self {
            created_at: Utc::now().naive_utc(),
            issuer: "server".into(),
            user_id,
        };
        let key = EncodingKey::from_secret(secret.as_bytes());
        jsonwebtoken::encode(&header, &claims, &key)
    }
}
