// trident-api: async clients for the three vendor control planes.
//
// Each vendor module owns its wire models and a thin HTTP client. The
// clients return vendor-shaped data; normalization into the shared
// network model happens one layer up in `trident-core`.

pub mod auth;
pub mod error;
pub mod firewall;
pub mod lenient;
pub mod router;
pub mod sdn;
pub mod transport;

pub use auth::{BasicAuth, HmacSigner};
pub use error::Error;
pub use firewall::FirewallClient;
pub use router::RouterClient;
pub use sdn::SdnClient;
pub use transport::{TlsMode, TransportConfig};
