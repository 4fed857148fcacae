use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// Category tag the server reports for Kasa smart bulbs.
pub const SMART_BULB: &str = "IOT.SMARTBULB";

/// A device as reported by the lighting server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Human-readable display name.
    pub alias: String,

    /// Device category tag, `None` when the hardware did not report one.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Whether the server holds a session with the device. Older servers
    /// omit the field entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

impl Device {
    pub fn is_bulb(&self) -> bool {
        self.kind.as_deref() == Some(SMART_BULB)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.unwrap_or(false)
    }
}

/// Devices keyed by network address.
pub type DeviceMap = HashMap<String, Device>;

/// Body of every device action response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,
}
