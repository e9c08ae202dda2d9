// Shared transport configuration for building reqwest::Client instances.
//
// All three vendor clients share TLS and timeout settings through this
// module. Auth is layered on per request by each client.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("trident/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed appliances).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Same settings with a different TLS mode.
    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Append path segments to `base`, percent-encoding each one.
///
/// Each entry may itself contain `/`-separated fixed segments; dynamic
/// values (node ids, interface names) must be passed as their own entry
/// via [`Segment::Value`] so reserved characters inside them are escaped.
pub(crate) fn endpoint(base: &url::Url, segments: &[Segment<'_>]) -> Result<url::Url, Error> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
        path.pop_if_empty();
        for segment in segments {
            match segment {
                Segment::Path(fixed) => {
                    path.extend(fixed.split('/').filter(|s| !s.is_empty()));
                }
                Segment::Value(value) => {
                    path.push(value);
                }
            }
        }
    }
    Ok(url)
}

/// One piece of an endpoint path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Segment<'a> {
    /// Literal `/`-separated path owned by the client.
    Path(&'a str),
    /// Caller-supplied identifier, escaped as a single segment.
    Value(&'a str),
}
