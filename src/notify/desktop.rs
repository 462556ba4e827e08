//! Native desktop notifications
//!
//! Shells out to the platform notifier: `osascript` on macOS, `notify-send`
//! elsewhere. Either tool missing surfaces as a transport error, which the
//! dispatcher logs and swallows.

use super::{NotificationTransport, NotifyError, SendFuture};
use tokio::process::Command;

pub struct DesktopTransport;

impl NotificationTransport for DesktopTransport {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn send<'a>(&'a self, title: &'a str, body: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            let status = if cfg!(target_os = "macos") {
                let script = format!(
                    "display notification \"{}\" with title \"{}\"",
                    applescript_escape(body),
                    applescript_escape(title)
                );
                Command::new("osascript").arg("-e").arg(script).status().await?
            } else {
                Command::new("notify-send").arg(title).arg(body).status().await?
            };

            if status.success() {
                Ok(())
            } else {
                Err(NotifyError::Command(format!(
                    "notifier exited with {}",
                    status
                )))
            }
        })
    }
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applescript_escape() {
        assert_eq!(applescript_escape(r#"2 120,00 "PLN""#), r#"2 120,00 \"PLN\""#);
        assert_eq!(applescript_escape(r"a\b"), r"a\\b");
    }
}
