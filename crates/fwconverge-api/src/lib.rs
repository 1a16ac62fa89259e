// fwconverge-api: Async client and wire types for the remote firewall policy API
//
// The remote system exposes one GraphQL endpoint. Each firewall family
// (WAN, Internet) has its own policy query and its own add / update /
// move / remove / publish mutations. Response and input shapes for both
// families live in `types`; `family` ties each family to its shapes and
// query documents.

pub mod client;
pub mod error;
pub mod family;
mod queries;
pub mod transport;
pub mod types;

pub use client::PolicyClient;
pub use error::Error;
pub use family::{InternetFirewall, PolicyFamily, WanFirewall};
pub use transport::{TlsMode, TransportConfig};
