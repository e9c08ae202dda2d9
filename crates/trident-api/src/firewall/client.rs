// Firewall appliance HTTP client
//
// Every request is signed with fresh HMAC headers (see `auth`). Replies
// come wrapped in a `{status, message, data}` envelope; the envelope is
// stripped before the caller sees the payload.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::models::{Envelope, Interface, InterfaceStats, ShaperQueue, StateEntry};
use crate::auth::HmacSigner;
use crate::error::{Error, preview};
use crate::transport::{Segment, TransportConfig, endpoint};

/// Raw client for the appliance's REST API.
#[derive(Debug, Clone)]
pub struct FirewallClient {
    http: reqwest::Client,
    base_url: Url,
    signer: HmacSigner,
}

impl FirewallClient {
    /// Create a client for `base_url` (e.g. `https://fw.example.net`).
    pub fn new(
        base_url: Url,
        signer: HmacSigner,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            signer,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, signer: HmacSigner) -> Self {
        Self {
            http,
            base_url,
            signer,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// System status; doubles as credential check and health probe.
    ///
    /// `GET /api/v1/status/system`
    pub async fn get_system_status(&self) -> Result<serde_json::Value, Error> {
        self.get("api/v1/status/system").await
    }

    /// `GET /api/v1/interface`
    pub async fn list_interfaces(&self) -> Result<Vec<Interface>, Error> {
        self.get("api/v1/interface").await
    }

    /// `GET /api/v1/status/interface`
    pub async fn list_interface_stats(&self) -> Result<Vec<InterfaceStats>, Error> {
        self.get("api/v1/status/interface").await
    }

    /// `GET /api/v1/diagnostics/states`
    pub async fn list_states(&self) -> Result<Vec<StateEntry>, Error> {
        self.get("api/v1/diagnostics/states").await
    }

    /// `POST /api/v1/firewall/traffic_shaper/queue`
    pub async fn create_shaper_queue(&self, queue: &ShaperQueue) -> Result<(), Error> {
        let _: serde_json::Value = self
            .post("api/v1/firewall/traffic_shaper/queue", queue)
            .await?;
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, Error> {
        let url = endpoint(&self.base_url, &[Segment::Path(path)])?;
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .headers(self.signer.headers()?)
            .send()
            .await?;
        parse_envelope(resp).await
    }

    async fn post<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = endpoint(&self.base_url, &[Segment::Path(path)])?;
        debug!("POST {url}");
        let resp = self
            .http
            .post(url)
            .headers(self.signer.headers()?)
            .json(body)
            .send()
            .await?;
        parse_envelope(resp).await
    }
}

/// Strip the `{status, message, data}` envelope.
///
/// A missing or `null` `data` decodes as `T::default()`; a `status`
/// other than `"ok"` is a vendor error even under HTTP 200.
async fn parse_envelope<T: DeserializeOwned + Default>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("appliance rejected request signature (HTTP {status})"),
        });
    }

    let body = resp.text().await?;
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;

    match envelope.status.as_deref() {
        None | Some("ok") => {
            trace!("envelope ok");
            Ok(envelope.data.unwrap_or_default())
        }
        Some(other) => Err(Error::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| format!("status={other}")),
        }),
    }
}
