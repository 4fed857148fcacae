//! Client side of the lighting server's HTTP API.
//!
//! `Transport` fetches raw bodies; `ApiClient` decodes them into the typed
//! schemas in `types` so nothing past this module handles untyped JSON.

mod client;
mod command;
mod error;
mod transport;
mod types;

pub use client::ApiClient;
pub use command::Command;
pub use command::Hsv;
pub use command::HsvError;
pub use command::MAX_HUE;
pub use command::MAX_PERCENT;
pub use error::ApiError;
pub use error::Result;
pub use transport::HttpTransport;
pub use transport::Transport;
pub use types::ActionResponse;
pub use types::Device;
pub use types::DeviceMap;
pub use types::SMART_BULB;

#[cfg(test)]
pub(crate) use transport::MockReply;
#[cfg(test)]
pub(crate) use transport::MockTransport;
