// RESTCONF HTTP client for an OpenFlow SDN controller
//
// Basic auth on every request; the controller keeps no session, so
// `verify()` is the only "login" there is. Operational data lives under
// `/restconf/operational/`, programmed flows under `/restconf/config/`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::{
    Flow, FlowConfigDocument, FlowTableDocument, InventoryNode, NodeDocument, TopologyDocument,
    TopologyNode,
};
use crate::auth::BasicAuth;
use crate::error::{Error, preview};
use crate::transport::{Segment, TransportConfig, endpoint};

const TOPOLOGY_PATH: &str = "restconf/operational/network-topology:network-topology";
const INVENTORY_NODE_PATH: &str = "restconf/operational/opendaylight-inventory:nodes/node";
const CONFIG_NODE_PATH: &str = "restconf/config/opendaylight-inventory:nodes/node";
const MODULES_PATH: &str = "restconf/modules";

/// Raw client for the controller's RESTCONF northbound API.
#[derive(Debug, Clone)]
pub struct SdnClient {
    http: reqwest::Client,
    base_url: Url,
    auth: BasicAuth,
}

impl SdnClient {
    /// Create a client for `base_url` (e.g. `http://odl:8181`).
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

    /// Cheapest authenticated call the controller offers.
    ///
    /// `GET /restconf/modules`
    pub async fn ping(&self) -> Result<(), Error> {
        let url = endpoint(&self.base_url, &[Segment::Path(MODULES_PATH)])?;
        let _: serde_json::Value = self.get(url).await?;
        Ok(())
    }

    /// Every node across every operational topology.
    ///
    /// `GET /restconf/operational/network-topology:network-topology`
    pub async fn get_topology(&self) -> Result<Vec<TopologyNode>, Error> {
        let url = endpoint(&self.base_url, &[Segment::Path(TOPOLOGY_PATH)])?;
        let doc: TopologyDocument = self.get(url).await?;
        Ok(doc
            .network_topology
            .topology
            .into_iter()
            .flat_map(|t| t.node)
            .collect())
    }

    /// Flow entries in table 0 of one switch. A node without a table
    /// yields an empty list rather than an error.
    ///
    /// `GET /restconf/operational/opendaylight-inventory:nodes/node/{id}/table/0`
    pub async fn get_flow_table(&self, node_id: &str) -> Result<Vec<Flow>, Error> {
        let url = endpoint(
            &self.base_url,
            &[
                Segment::Path(INVENTORY_NODE_PATH),
                Segment::Value(node_id),
                Segment::Path("table/0"),
            ],
        )?;
        match self.get::<FlowTableDocument>(url).await {
            Ok(doc) => Ok(doc.tables.into_iter().flat_map(|t| t.flow).collect()),
            Err(Error::Api { status: 404, .. }) => {
                debug!(node_id, "no flow table on node, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Inventory entry for one node: connector and table statistics.
    ///
    /// `GET /restconf/operational/opendaylight-inventory:nodes/node/{id}`
    pub async fn get_node_statistics(
        &self,
        node_id: &str,
    ) -> Result<Option<InventoryNode>, Error> {
        let url = endpoint(
            &self.base_url,
            &[Segment::Path(INVENTORY_NODE_PATH), Segment::Value(node_id)],
        )?;
        match self.get::<NodeDocument>(url).await {
            Ok(doc) => Ok(doc.node.into_iter().next()),
            Err(Error::Api { status: 404, .. }) => {
                debug!(node_id, "node missing from inventory");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Create or replace a flow entry in the config datastore.
    ///
    /// `PUT /restconf/config/opendaylight-inventory:nodes/node/{id}/table/{t}/flow/{flow}`
    pub async fn put_flow(
        &self,
        node_id: &str,
        table_id: u8,
        flow_id: &str,
        body: &FlowConfigDocument,
    ) -> Result<(), Error> {
        let table = table_id.to_string();
        let url = endpoint(
            &self.base_url,
            &[
                Segment::Path(CONFIG_NODE_PATH),
                Segment::Value(node_id),
                Segment::Path("table"),
                Segment::Value(&table),
                Segment::Path("flow"),
                Segment::Value(flow_id),
            ],
        )?;
        self.put(url, body).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self
            .auth
            .apply(self.http.get(url))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let body = check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))
    }

    async fn put(&self, url: Url, body: &(impl Serialize + Sync)) -> Result<(), Error> {
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

/// Map HTTP status into `Error`, returning the body on success.
async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("controller rejected credentials (HTTP {status})"),
        });
    }
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }
    Ok(body)
}
