// OpenFlow SDN controller (RESTCONF) surface.

pub mod client;
pub mod models;

pub use client::SdnClient;
