// RouterOS REST HTTP client
//
// RouterOS v7 exposes its command tree over `/rest`: `GET` lists a menu,
// `PUT` adds an entry (the equivalent of `/queue/simple/add`). Basic auth
// on every request, no session.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::{Address, Connection, Interface, MangleRule, RouterOsError, SimpleQueue};
use crate::auth::BasicAuth;
use crate::error::{Error, preview};
use crate::transport::{Segment, TransportConfig, endpoint};

/// Raw client for the router's REST command API.
#[derive(Debug, Clone)]
pub struct RouterClient {
    http: reqwest::Client,
    base_url: Url,
    auth: BasicAuth,
}

impl RouterClient {
    /// Create a client for `base_url` (e.g. `https://router:443`).
    pub fn new(base_url: Url, auth: BasicAuth, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            auth,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, auth: BasicAuth) -> Self {
        Self {
            http,
            base_url,
            auth,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /rest/system/resource`
    pub async fn system_resource(&self) -> Result<serde_json::Value, Error> {
        self.get("rest/system/resource", &[]).await
    }

    /// `GET /rest/interface`
    pub async fn list_interfaces(&self) -> Result<Vec<Interface>, Error> {
        self.get("rest/interface", &[]).await
    }

    /// Addresses bound to one interface.
    ///
    /// `GET /rest/ip/address?interface={name}`
    pub async fn interface_addresses(&self, interface: &str) -> Result<Vec<Address>, Error> {
        self.get("rest/ip/address", &[("interface", interface)]).await
    }

    /// `GET /rest/ip/firewall/connection`
    pub async fn list_connections(&self) -> Result<Vec<Connection>, Error> {
        self.get("rest/ip/firewall/connection", &[]).await
    }

    /// `PUT /rest/queue/simple`
    pub async fn add_simple_queue(&self, queue: &SimpleQueue) -> Result<(), Error> {
        debug!(name = %queue.name, target = %queue.target, "adding simple queue");
        self.put("rest/queue/simple", queue).await
    }

    /// `PUT /rest/ip/firewall/mangle`
    pub async fn add_mangle_rule(&self, rule: &MangleRule) -> Result<(), Error> {
        debug!(mark = %rule.new_packet_mark, port = %rule.dst_port, "adding mangle rule");
        self.put("rest/ip/firewall/mangle", rule).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = endpoint(&self.base_url, &[Segment::Path(path)])?;
        debug!("GET {url} query={query:?}");
        let resp = self
            .auth
            .apply(self.http.get(url))
            .query(query)
            .send()
            .await?;
        let body = check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))
    }

    async fn put(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        let url = endpoint(&self.base_url, &[Segment::Path(path)])?;
        debug!("PUT {url}");
        let resp = self
            .auth
            .apply(self.http.put(url))
            .json(body)
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }
}

/// Map HTTP status and RouterOS error bodies into `Error`.
async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("router rejected credentials (HTTP {status})"),
        });
    }

    if !status.is_success() {
        let message = match serde_json::from_str::<RouterOsError>(&body) {
            Ok(err) => {
                let summary = err.message.unwrap_or_else(|| format!("error {}", err.error));
                match err.detail {
                    Some(detail) => format!("{summary}: {detail}"),
                    None => summary,
                }
            }
            Err(_) => preview(&body).to_owned(),
        };
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}
