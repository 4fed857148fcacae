use std::net::IpAddr;

use crate::api::Device;
use crate::api::DeviceMap;

const HEADER: [&str; 4] = ["ADDRESS", "ALIAS", "TYPE", "STATUS"];

fn status(device: &Device) -> &'static str {
    match device.connected {
        Some(true) => "connected",
        Some(false) => "disconnected",
        None => "-",
    }
}

/// Render the device map as a plain-text table, ordered by address.
///
/// IP addresses sort numerically; anything else sorts before them by text.
pub fn render(devices: &DeviceMap) -> String {
    if devices.is_empty() {
        return "No devices".to_string();
    }

    let mut entries: Vec<(&String, &Device)> = devices.iter().collect();
    entries.sort_by_key(|(address, _)| (address.parse::<IpAddr>().ok(), address.to_string()));

    let rows: Vec<[String; 4]> = std::iter::once(HEADER.map(str::to_string))
        .chain(entries.into_iter().map(|(address, device)| {
            [
                address.clone(),
                device.alias.clone(),
                device.kind.clone().unwrap_or_else(|| "-".to_string()),
                status(device).to_string(),
            ]
        }))
        .collect();

    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            format!(
                "{:<w0$}  {:<w1$}  {:<w2$}  {}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(alias: &str, kind: Option<&str>, connected: Option<bool>) -> Device {
        Device {
            alias: alias.to_string(),
            kind: kind.map(str::to_string),
            connected,
        }
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&DeviceMap::new()), "No devices");
    }

    #[test]
    fn test_render_sorts_addresses_numerically() {
        let mut devices = DeviceMap::new();
        devices.insert(
            "10.0.0.52".to_string(),
            device("Porch", Some("IOT.SMARTBULB"), Some(true)),
        );
        devices.insert(
            "10.0.0.5".to_string(),
            device("Lamp", Some("IOT.SMARTBULB"), Some(false)),
        );
        devices.insert(
            "10.0.0.12".to_string(),
            device("Desk Plug", Some("IOT.SMARTPLUGSWITCH"), None),
        );
        devices.insert("garage".to_string(), device("Garage", None, None));

        insta::assert_snapshot!(render(&devices), @r"
        ADDRESS    ALIAS      TYPE                 STATUS
        garage     Garage     -                    -
        10.0.0.5   Lamp       IOT.SMARTBULB        disconnected
        10.0.0.12  Desk Plug  IOT.SMARTPLUGSWITCH  -
        10.0.0.52  Porch      IOT.SMARTBULB        connected
        ");
    }
}
