use chrono::Duration;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{Result, ServiceAccountKey};

pub const SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets \
    https://www.googleapis.com/auth/drive.readonly";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn assertion_lifetime() -> Duration {
    Duration::hours(1)
}

fn refresh_margin() -> Duration {
    Duration::seconds(60)
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

pub fn create_assertion_at(key: &ServiceAccountKey, now_timestamp: i64) -> Result<String> {
    let claims = Claims {
        iss: key.client_email.clone(),
        scope: SCOPES.to_owned(),
        aud: key.token_uri.clone(),
        iat: now_timestamp,
        exp: now_timestamp + assertion_lifetime().num_seconds(),
    };

    let header = Header::new(Algorithm::RS256);
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;

    Ok(encode(&header, &claims, &encoding_key)?)
}

pub fn token_request_body(assertion: &str) -> Result<String> {
    Ok(serde_urlencoded::to_string([
        ("grant_type", GRANT_TYPE),
        ("assertion", assertion),
    ])?)
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone, Debug)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: i64,
}

impl AccessToken {
    pub fn from_response(response: TokenResponse, now_timestamp: i64) -> Self {
        Self {
            value: response.access_token,
            expires_at: now_timestamp + response.expires_in,
        }
    }

    pub fn is_fresh_at(&self, now_timestamp: i64) -> bool {
        self.expires_at - refresh_margin().num_seconds() > now_timestamp
    }
}
