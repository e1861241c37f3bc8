// ABOUTME: Client SDK for reality analysis, modeling and conversion job services
// ABOUTME: Typed job settings, a shared wire codec, job properties and a request envelope

pub mod codec;
pub mod config;
pub mod error;
pub mod job;
pub mod remote;
pub mod service;
pub mod settings;

pub use error::{RealityError, Result};
pub use job::{JobHandle, JobProgress, JobProperties, JobState};
pub use remote::{ServiceClient, StaticToken, TokenProvider};
pub use service::Service;
pub use settings::{JobKind, JobSettings, OptionType, OptionValue};
