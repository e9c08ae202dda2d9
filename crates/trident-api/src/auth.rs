// Per-vendor request authentication.
//
// The SDN controller and RouterOS both take HTTP basic auth on every
// request. The firewall appliance signs each request with an HMAC over
// the API key, a timestamp, and a single-use nonce; the appliance
// recomputes the signature, so the message layout below is part of the
// wire contract.

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const TIMESTAMP_HEADER: &str = "X-API-Timestamp";
pub const NONCE_HEADER: &str = "X-API-Nonce";
pub const SIGNATURE_HEADER: &str = "X-API-Signature";

/// Username/password pair sent as HTTP basic auth.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Attach the credentials to an outgoing request.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}

/// Signs firewall appliance requests.
#[derive(Debug, Clone)]
pub struct HmacSigner {
    api_key: String,
    api_secret: SecretString,
}

impl HmacSigner {
    pub fn new(api_key: impl Into<String>, api_secret: SecretString) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Headers for a request issued now, with a fresh nonce.
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        let timestamp = chrono::Utc::now().timestamp();
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        self.headers_at(timestamp, &nonce)
    }

    /// Headers for a request with an explicit timestamp and nonce.
    pub fn headers_at(&self, timestamp: i64, nonce: &str) -> Result<HeaderMap, Error> {
        let signature = sign_request(
            &self.api_key,
            self.api_secret.expose_secret(),
            timestamp,
            nonce,
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, header_value(&self.api_key, true)?);
        headers.insert(TIMESTAMP_HEADER, header_value(&timestamp.to_string(), false)?);
        headers.insert(NONCE_HEADER, header_value(nonce, false)?);
        headers.insert(SIGNATURE_HEADER, header_value(&signature, true)?);
        Ok(headers)
    }
}

/// `hex(HMAC-SHA256(secret, "{api_key}:{timestamp}:{nonce}"))`
pub fn sign_request(
    api_key: &str,
    api_secret: &str,
    timestamp: i64,
    nonce: &str,
) -> Result<String, Error> {
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes()).map_err(|e| {
        Error::Authentication {
            message: format!("unusable API secret: {e}"),
        }
    })?;
    mac.update(format!("{api_key}:{timestamp}:{nonce}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn header_value(raw: &str, sensitive: bool) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(raw).map_err(|e| Error::InvalidHeader(e.to_string()))?;
    value.set_sensitive(sensitive);
    Ok(value)
}
