use serde::de::DeserializeOwned;
use tracing::debug;

use super::command::Command;
use super::error::ApiError;
use super::error::Result;
use super::transport::Transport;
use super::types::ActionResponse;
use super::types::DeviceMap;

/// Path of the full device listing
pub const GET_ALL_PATH: &str = "get_all";

/// Typed access to the lighting server
#[derive(Debug)]
pub struct ApiClient<T: Transport> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `path` and decode the body as `R`
    ///
    /// The returned future does nothing until awaited and resolves once.
    pub async fn request<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let body = self.transport.get(path).await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// Fetch every device the server knows about
    pub async fn get_all(&self) -> Result<DeviceMap> {
        let devices: DeviceMap = self.request(GET_ALL_PATH).await?;
        debug!("Server reported {} devices", devices.len());
        Ok(devices)
    }

    /// Send `command` to the device at `address`
    pub async fn send(&self, address: &str, command: &Command) -> Result<ActionResponse> {
        self.request(&command.path(address)).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::MockReply;
    use crate::api::MockTransport;

    #[tokio::test]
    async fn test_get_all_decodes_device_map() {
        let transport = MockTransport::new();
        transport.reply_json(
            "get_all",
            json!({"10.0.0.5": {"alias": "Lamp", "type": "IOT.SMARTBULB", "connected": false}}),
        );
        let client = ApiClient::new(transport);

        let devices = client.get_all().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices["10.0.0.5"].alias, "Lamp");
        assert_eq!(client.transport().requests(), vec!["get_all"]);
    }

    #[tokio::test]
    async fn test_send_uses_command_path() {
        let transport = MockTransport::new();
        transport.reply_json("10.0.0.5/off", json!({"success": true, "message": "success"}));
        let client = ApiClient::new(transport);

        let response = client.send("10.0.0.5", &Command::Off).await.unwrap();
        assert!(response.success);
        assert_eq!(client.transport().requests(), vec!["10.0.0.5/off"]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let transport = MockTransport::new();
        transport.reply("10.0.0.5/on", MockReply::Raw("<html>oops</html>"));
        let client = ApiClient::new(transport);

        let err = client.send("10.0.0.5", &Command::On).await.unwrap_err();
        match err {
            ApiError::Decode { path, .. } => assert_eq!(path, "10.0.0.5/on"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_shape_is_decode_error() {
        let transport = MockTransport::new();
        transport.reply_json("get_all", json!({"10.0.0.5": "Lamp"}));
        let client = ApiClient::new(transport);

        assert!(matches!(
            client.get_all().await,
            Err(ApiError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_error_is_propagated() {
        let transport = MockTransport::new();
        transport.reply("get_all", MockReply::Status(500));
        let client = ApiClient::new(transport);

        assert!(matches!(
            client.get_all().await,
            Err(ApiError::Status { status: 500, .. })
        ));
    }
}
