//! Interactive session over a single dashboard.
//!
//! The device map is loaded once when the session starts and kept until it
//! ends, so `connect` state survives between commands the way it would on a
//! long-lived page.

use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::api::Command;
use crate::api::Hsv;
use crate::api::HsvError;
use crate::api::Transport;
use crate::dashboard::Dashboard;

pub const HELP: &str = "\
commands:
  list                               show the device table
  refresh                            reload devices from the server
  connect <address>                  open a session with a device
  on <address>                       turn a device on
  off <address>                      turn a device off
  hsv <address> <h> <s> [v [ms]]     set a bulb's color
  random start <address> <ms>        cycle random colors
  random stop <address>              stop cycling colors
  help                               show this text
  quit                               leave the session";

/// One line of input, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Refresh,
    Device { address: String, command: Command },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command '{0}', try 'help'")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error(transparent)]
    Hsv(#[from] HsvError),
}

fn number<N: std::str::FromStr>(word: &str) -> Result<N, ParseError> {
    word.parse()
        .map_err(|_| ParseError::InvalidNumber(word.to_string()))
}

fn device(address: &str, command: Command) -> ShellCommand {
    ShellCommand::Device {
        address: address.to_string(),
        command,
    }
}

/// Parse one input line; blank lines yield `None`
pub fn parse(line: &str) -> Result<Option<ShellCommand>, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Ok(None);
    };

    let parsed = match (name, args) {
        ("list" | "ls", []) => ShellCommand::List,
        ("refresh", []) => ShellCommand::Refresh,
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit", []) => ShellCommand::Quit,
        ("connect", [address]) => device(address, Command::Connect),
        ("on", [address]) => device(address, Command::On),
        ("off", [address]) => device(address, Command::Off),
        ("connect", _) => return Err(ParseError::Usage("connect <address>")),
        ("on", _) => return Err(ParseError::Usage("on <address>")),
        ("off", _) => return Err(ParseError::Usage("off <address>")),
        ("hsv", [address, hue, saturation, rest @ ..]) if rest.len() <= 2 => {
            let value = rest.first().map(|v| number(v)).transpose()?;
            let transition = rest.get(1).map(|t| number(t)).transpose()?;
            let hsv = Hsv::new(number(hue)?, number(saturation)?, value, transition)?;
            device(address, Command::SetHsv(hsv))
        }
        ("hsv", _) => return Err(ParseError::Usage("hsv <address> <h> <s> [v [ms]]")),
        ("random", ["start", address, interval]) => device(
            address,
            Command::StartRandom {
                interval_ms: number(interval)?,
            },
        ),
        ("random", ["stop", address]) => device(address, Command::StopRandom),
        ("random", _) => {
            return Err(ParseError::Usage(
                "random start <address> <ms> | random stop <address>",
            ))
        }
        ("list" | "ls" | "refresh" | "quit" | "exit", _) => {
            return Err(ParseError::Usage("this command takes no arguments"))
        }
        (other, _) => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(parsed))
}

/// Run the session until `quit` or end of input
///
/// The dashboard may be empty if the first load failed; `refresh` retries it.
/// Alerts go wherever the dashboard's `Alert` sends them, everything else to
/// `output`.
pub async fn run<T, R, W>(dashboard: &Dashboard<T>, input: R, mut output: W) -> std::io::Result<()>
where
    T: Transport,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                output.write_all(format!("error: {}\n", e).as_bytes()).await?;
                continue;
            }
        };
        debug!("Shell command: {:?}", command);

        match command {
            ShellCommand::List => {
                output
                    .write_all(format!("{}\n", dashboard.render()).as_bytes())
                    .await?;
            }
            ShellCommand::Refresh => {
                if dashboard.load().await.is_success() {
                    output
                        .write_all(format!("{}\n", dashboard.render()).as_bytes())
                        .await?;
                }
            }
            ShellCommand::Device { address, command } => {
                if let Err(e) = dashboard.perform(&address, command).await {
                    output.write_all(format!("error: {}\n", e).as_bytes()).await?;
                }
            }
            ShellCommand::Help => {
                output.write_all(format!("{}\n", HELP).as_bytes()).await?;
            }
            ShellCommand::Quit => break,
        }
    }

    output.flush().await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::ApiClient;
    use crate::api::MockReply;
    use crate::api::MockTransport;
    use crate::dashboard::AlertLog;
    use crate::dashboard::Outcome;
    use crate::dashboard::LOAD_FAILED;

    fn device_line(address: &str, command: Command) -> Option<ShellCommand> {
        Some(ShellCommand::Device {
            address: address.to_string(),
            command,
        })
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("list"), Ok(Some(ShellCommand::List)));
        assert_eq!(parse(" refresh "), Ok(Some(ShellCommand::Refresh)));
        assert_eq!(parse("quit"), Ok(Some(ShellCommand::Quit)));
        assert_eq!(parse("help me"), Ok(Some(ShellCommand::Help)));
    }

    #[test]
    fn test_parse_device_commands() {
        assert_eq!(parse("connect 10.0.0.5"), Ok(device_line("10.0.0.5", Command::Connect)));
        assert_eq!(parse("on 10.0.0.5"), Ok(device_line("10.0.0.5", Command::On)));
        assert_eq!(parse("off  10.0.0.5"), Ok(device_line("10.0.0.5", Command::Off)));
        assert_eq!(
            parse("random start 10.0.0.5 750"),
            Ok(device_line("10.0.0.5", Command::StartRandom { interval_ms: 750 }))
        );
        assert_eq!(
            parse("random stop 10.0.0.5"),
            Ok(device_line("10.0.0.5", Command::StopRandom))
        );
    }

    #[test]
    fn test_parse_hsv() {
        let hsv = Hsv::new(200, 80, Some(40), Some(500)).unwrap();
        assert_eq!(
            parse("hsv 10.0.0.5 200 80 40 500"),
            Ok(device_line("10.0.0.5", Command::SetHsv(hsv)))
        );

        let hsv = Hsv::new(200, 80, None, None).unwrap();
        assert_eq!(
            parse("hsv 10.0.0.5 200 80"),
            Ok(device_line("10.0.0.5", Command::SetHsv(hsv)))
        );

        assert_eq!(
            parse("hsv 10.0.0.5 400 80"),
            Err(ParseError::Hsv(HsvError::Hue(400)))
        );
        assert_eq!(
            parse("hsv 10.0.0.5 red 80"),
            Err(ParseError::InvalidNumber("red".to_string()))
        );
        assert!(matches!(parse("hsv 10.0.0.5 1 2 3 4 5"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("dance 10.0.0.5"),
            Err(ParseError::UnknownCommand("dance".to_string()))
        );
        assert_eq!(parse("on"), Err(ParseError::Usage("on <address>")));
        assert!(matches!(parse("list everything"), Err(ParseError::Usage(_))));
        assert!(matches!(parse("random 10.0.0.5"), Err(ParseError::Usage(_))));
    }

    #[tokio::test]
    async fn test_session_keeps_state_between_commands() {
        let transport = MockTransport::new();
        transport
            .reply_json(
                "get_all",
                json!({"10.0.0.5": {"alias": "Lamp", "type": "IOT.SMARTBULB", "connected": false}}),
            )
            .reply_json("10.0.0.5/new", json!({"success": true}))
            .reply_json("10.0.0.5/on", json!({"success": false, "message": "failed"}));
        let alerts = Arc::new(AlertLog::new());
        let dashboard = Dashboard::new(ApiClient::new(transport), alerts.clone());
        dashboard.load().await;

        let input: &[u8] = b"connect 10.0.0.5\non 10.0.0.5\noff 10.0.0.9\nbogus\nlist\nquit\nlist\n";
        let mut output = Vec::new();
        run(&dashboard, input, &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("error: Unknown device: 10.0.0.9"));
        assert!(output.contains("error: unknown command 'bogus', try 'help'"));
        assert!(output.contains("10.0.0.5  Lamp   IOT.SMARTBULB  connected"));
        assert_eq!(output.matches("ADDRESS").count(), 1);
        assert_eq!(alerts.messages(), vec!["Failed to turn on Lamp"]);
        assert_eq!(
            dashboard.client().transport().requests(),
            vec!["get_all", "10.0.0.5/new", "10.0.0.5/on"]
        );
    }

    #[tokio::test]
    async fn test_session_recovers_from_failed_load() {
        let transport = MockTransport::new();
        transport.reply("get_all", MockReply::Status(503)).reply_json(
            "get_all",
            json!({"10.0.0.5": {"alias": "Lamp", "type": "IOT.SMARTBULB", "connected": true}}),
        );
        let alerts = Arc::new(AlertLog::new());
        let dashboard = Dashboard::new(ApiClient::new(transport), alerts.clone());
        assert_eq!(dashboard.load().await, Outcome::Failed);

        let input: &[u8] = b"list\nrefresh\nlist\nquit\n";
        let mut output = Vec::new();
        run(&dashboard, input, &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("> No devices\n"));
        assert_eq!(output.matches("10.0.0.5  Lamp   IOT.SMARTBULB  connected").count(), 2);
        assert_eq!(alerts.messages(), vec![LOAD_FAILED]);
        assert_eq!(
            dashboard.client().transport().requests(),
            vec!["get_all", "get_all"]
        );
    }
}
