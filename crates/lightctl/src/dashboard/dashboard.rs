use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::alert::Alert;
use super::locks::AddressLocks;
use super::render::render;
use crate::api::ApiClient;
use crate::api::Command;
use crate::api::Device;
use crate::api::DeviceMap;
use crate::api::Hsv;
use crate::api::Transport;

/// Alert raised when the device list cannot be fetched
pub const LOAD_FAILED: &str = "Failed to load devices";

/// How a load or device action ended.
///
/// Failures have already been alerted and logged by the time this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Succeeded
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Unknown device: {0}")]
    UnknownDevice(String),
}

/// User-facing failure text for `command` against the device called `alias`
pub fn failure_message(command: &Command, alias: &str) -> String {
    match command {
        Command::Connect => format!("Failed to connect to {}", alias),
        Command::On => format!("Failed to turn on {}", alias),
        Command::Off => format!("Failed to turn off {}", alias),
        Command::SetHsv(_) => format!("Failed to set color of {}", alias),
        Command::StartRandom { .. } => format!("Failed to start random colors on {}", alias),
        Command::StopRandom => format!("Failed to stop random colors on {}", alias),
    }
}

/// Device list and controls for one session.
///
/// The server is the source of truth: `load` replaces the map wholesale and the
/// only local mutation is marking a device connected after a successful
/// connect. Actions against the same address are serialized in issue order;
/// actions against different addresses run concurrently.
pub struct Dashboard<T: Transport> {
    client: ApiClient<T>,

    /// Current device map (readers load the Arc, writers swap in a new one)
    devices: ArcSwap<DeviceMap>,

    locks: AddressLocks,

    alert: Arc<dyn Alert>,
}

impl<T: Transport> Dashboard<T> {
    /// Create a dashboard with an empty device map
    pub fn new(client: ApiClient<T>, alert: Arc<dyn Alert>) -> Self {
        Self {
            client,
            devices: ArcSwap::new(Arc::default()),
            locks: AddressLocks::default(),
            alert,
        }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Snapshot of the current device map
    pub fn devices(&self) -> Arc<DeviceMap> {
        self.devices.load_full()
    }

    pub fn device(&self, address: &str) -> Option<Device> {
        self.devices.load().get(address).cloned()
    }

    /// Smart bulbs in the current map, ordered by address
    pub fn bulbs(&self) -> Vec<(String, Device)> {
        let mut bulbs: Vec<(String, Device)> = self
            .devices
            .load()
            .iter()
            .filter(|(_, device)| device.is_bulb())
            .map(|(address, device)| (address.clone(), device.clone()))
            .collect();
        bulbs.sort_by(|a, b| a.0.cmp(&b.0));
        bulbs
    }

    pub fn render(&self) -> String {
        render(&self.devices.load())
    }

    /// Fetch the full device list and replace the map with it
    ///
    /// On failure the previous map is kept.
    pub async fn load(&self) -> Outcome {
        match self.client.get_all().await {
            Ok(devices) => {
                info!("Loaded {} devices", devices.len());
                self.devices.store(Arc::new(devices));
                Outcome::Succeeded
            }
            Err(e) => {
                warn!("Failed to load devices: {}", e);
                self.alert.alert(LOAD_FAILED);
                Outcome::Failed
            }
        }
    }

    pub async fn connect(&self, address: &str) -> Result<Outcome, DashboardError> {
        self.perform(address, Command::Connect).await
    }

    pub async fn on(&self, address: &str) -> Result<Outcome, DashboardError> {
        self.perform(address, Command::On).await
    }

    pub async fn off(&self, address: &str) -> Result<Outcome, DashboardError> {
        self.perform(address, Command::Off).await
    }

    pub async fn set_hsv(&self, address: &str, hsv: Hsv) -> Result<Outcome, DashboardError> {
        self.perform(address, Command::SetHsv(hsv)).await
    }

    pub async fn start_random(
        &self,
        address: &str,
        interval_ms: u32,
    ) -> Result<Outcome, DashboardError> {
        self.perform(address, Command::StartRandom { interval_ms })
            .await
    }

    pub async fn stop_random(&self, address: &str) -> Result<Outcome, DashboardError> {
        self.perform(address, Command::StopRandom).await
    }

    /// Send `command` to a device in the current map
    ///
    /// Unknown addresses are rejected before any request is made. Transport
    /// failures are alerted exactly like a `success: false` response.
    pub async fn perform(
        &self,
        address: &str,
        command: Command,
    ) -> Result<Outcome, DashboardError> {
        let issued_alias = self
            .device(address)
            .map(|device| device.alias)
            .ok_or_else(|| DashboardError::UnknownDevice(address.to_string()))?;

        let _guard = self.locks.acquire(address).await;
        debug!("Sending {} to {}", command, address);

        let failure = match self.client.send(address, &command).await {
            Ok(response) if response.success => None,
            Ok(response) => Some(response.message.unwrap_or_else(|| "no message".to_string())),
            Err(e) => Some(e.to_string()),
        };

        match failure {
            None => {
                info!("{} succeeded for {}", command, address);
                if command == Command::Connect {
                    self.mark_connected(address);
                }
                Ok(Outcome::Succeeded)
            }
            Some(cause) => {
                warn!("{} failed for {}: {}", command, address, cause);
                // The map may have been reloaded while the request was in flight.
                let alias = self
                    .device(address)
                    .map(|device| device.alias)
                    .unwrap_or(issued_alias);
                self.alert.alert(&failure_message(&command, &alias));
                Ok(Outcome::Failed)
            }
        }
    }

    fn mark_connected(&self, address: &str) {
        if !self.devices.load().contains_key(address) {
            debug!("{} left the device map before its connect completed", address);
            return;
        }

        self.devices.rcu(|devices| {
            let mut devices = DeviceMap::clone(devices);
            if let Some(device) = devices.get_mut(address) {
                device.connected = Some(true);
            }
            devices
        });
    }
}
