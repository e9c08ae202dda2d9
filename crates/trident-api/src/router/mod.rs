// RouterOS REST command surface.

pub mod client;
pub mod models;

pub use client::RouterClient;
