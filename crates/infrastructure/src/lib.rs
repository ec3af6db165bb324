//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_collection_gateway;
mod session_credential_provider;

pub use http_collection_gateway::HttpCollectionGateway;
pub use session_credential_provider::{Session, SessionCredentialProvider};
