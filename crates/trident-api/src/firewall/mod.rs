// Firewall appliance REST surface (HMAC-signed).

pub mod client;
pub mod models;

pub use client::FirewallClient;
