//! DevOps Secrets Vault client for the DSV action.

pub mod client;
pub mod transport;

pub use client::{
    AccessToken, CLIENT_HEADER, DEFAULT_CLIENT_NAME, VaultClient, VaultSession, api_endpoint,
};
pub use transport::{DEFAULT_TIMEOUT, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
