// ABOUTME: Remote access to the job services: envelope, transport, auth and wire models
// ABOUTME: Everything network-facing lives under this module

pub mod auth;
pub mod client;
pub mod models;
pub mod transport;

pub use auth::{StaticToken, TokenProvider};
pub use client::ServiceClient;
pub use models::{CostEstimation, CostParameters, JobMessage};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
