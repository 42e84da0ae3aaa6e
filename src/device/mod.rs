//! Remote device API client and the authorized operations built on it.

pub mod client;
pub mod error;
pub mod model;
pub mod service;

pub use client::DeviceClient;
pub use error::RemoteError;
pub use model::{Device, DeviceAction, DeviceListing, DeviceSummary, PayloadEnvelope};
pub use service::DeviceService;
