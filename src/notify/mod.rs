//! Notification fan-out
//!
//! The dispatcher turns a change list into one message and pushes it through
//! every configured transport. Transports are best-effort: a failed push is
//! logged and never fails the run, and one transport failing does not stop
//! the others.

mod desktop;
mod ntfy;

pub use desktop::DesktopTransport;
pub use ntfy::NtfyTransport;

use crate::config::NotifyConfig;
use crate::detect::{ChangeKind, ChangeRecord};
use crate::report::{format_availability, format_price};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Transport-level delivery failure
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification command failed: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boxed future returned by [`NotificationTransport::send`]
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

/// One delivery channel for change messages
pub trait NotificationTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Delivers one message; `title` is a short summary, `body` one line
    /// per change
    fn send<'a>(&'a self, title: &'a str, body: &'a str) -> SendFuture<'a>;
}

/// Fans one change message out to all configured transports
pub struct NotificationDispatcher {
    transports: Vec<Box<dyn NotificationTransport>>,
}

impl NotificationDispatcher {
    pub fn new(transports: Vec<Box<dyn NotificationTransport>>) -> Self {
        Self { transports }
    }

    /// Builds the transport list from config; an empty config means the
    /// dispatcher silently does nothing
    pub fn from_config(config: &NotifyConfig) -> Self {
        let mut transports: Vec<Box<dyn NotificationTransport>> = Vec::new();
        if let Some(topic) = config.ntfy_topic.as_deref() {
            if !topic.trim().is_empty() {
                transports.push(Box::new(NtfyTransport::new(topic)));
            }
        }
        if config.desktop {
            transports.push(Box::new(DesktopTransport));
        }
        Self::new(transports)
    }

    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    /// Sends one message covering every actual price or availability move
    ///
    /// First-seen records carry no comparison and are not pushed; they still
    /// show up in the console report.
    pub async fn dispatch(&self, changes: &[ChangeRecord]) {
        if self.transports.is_empty() {
            return;
        }

        let notable: Vec<&ChangeRecord> = changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Change)
            .collect();
        if notable.is_empty() {
            tracing::debug!("No reportable moves, skipping notifications");
            return;
        }

        let (title, body) = compose_message(&notable);
        for transport in &self.transports {
            match transport.send(&title, &body).await {
                Ok(()) => tracing::info!("Notification sent via {}", transport.name()),
                Err(e) => tracing::warn!("{} notification failed: {}", transport.name(), e),
            }
        }
    }
}

fn compose_message(changes: &[&ChangeRecord]) -> (String, String) {
    let drops = changes
        .iter()
        .filter(|c| {
            c.price_changed
                && matches!((c.prior_price, c.result.price), (Some(b), Some(a)) if a < b)
        })
        .count();

    let title = if drops > 0 {
        format!("Price drop at {} shop(s)", drops)
    } else {
        format!("{} change(s) detected", changes.len())
    };

    let lines: Vec<String> = changes.iter().map(|c| change_line(c)).collect();
    (title, lines.join("\n"))
}

fn change_line(change: &ChangeRecord) -> String {
    let mut parts = Vec::new();
    if change.price_changed {
        parts.push(format!(
            "{} -> {}",
            format_price(change.prior_price),
            format_price(change.result.price)
        ));
    }
    if change.availability_changed {
        parts.push(format_availability(change.result.availability).to_string());
    }
    format!("{}: {}", change.result.name, parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Availability, ScrapeResult, SiteConfig};
    use crate::scrape::strategy::StrategyKind;

    fn change(name: &str, before: f64, after: f64) -> ChangeRecord {
        let site = SiteConfig {
            url: format!("https://{}.example/p", name),
            name: name.to_string(),
            kind: StrategyKind::Generic,
            sku_hint: "RROFY08".to_string(),
        };
        let mut result = ScrapeResult::new(&site);
        result.price = Some(after);
        result.availability = Availability::InStock;
        ChangeRecord {
            kind: ChangeKind::Change,
            result,
            prior_price: Some(before),
            prior_availability: Some(Availability::InStock),
            price_changed: true,
            availability_changed: false,
        }
    }

    #[test]
    fn test_drop_title_counts_drops_only() {
        let a = change("Shop A", 2499.0, 2120.0);
        let b = change("Shop B", 2120.0, 2499.0);
        let (title, body) = compose_message(&[&a, &b]);
        assert_eq!(title, "Price drop at 1 shop(s)");
        assert!(body.contains("Shop A: 2 499,00 PLN -> 2 120,00 PLN"));
        assert!(body.contains("Shop B: 2 120,00 PLN -> 2 499,00 PLN"));
    }

    #[test]
    fn test_increase_only_title() {
        let b = change("Shop B", 2120.0, 2499.0);
        let (title, _) = compose_message(&[&b]);
        assert_eq!(title, "1 change(s) detected");
    }

    #[test]
    fn test_availability_line() {
        let mut c = change("Shop C", 2499.0, 2499.0);
        c.price_changed = false;
        c.availability_changed = true;
        c.result.availability = Availability::OutOfStock;
        assert_eq!(change_line(&c), "Shop C: out of stock");
    }

    #[test]
    fn test_empty_config_builds_no_transports() {
        let dispatcher = NotificationDispatcher::from_config(&NotifyConfig::default());
        assert_eq!(dispatcher.transport_count(), 0);
    }

    #[test]
    fn test_blank_topic_is_ignored() {
        let config = NotifyConfig {
            ntfy_topic: Some("   ".to_string()),
            desktop: false,
        };
        let dispatcher = NotificationDispatcher::from_config(&config);
        assert_eq!(dispatcher.transport_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_without_moves_is_a_no_op() {
        struct PanicTransport;
        impl NotificationTransport for PanicTransport {
            fn name(&self) -> &'static str {
                "panic"
            }
            fn send<'a>(&'a self, _title: &'a str, _body: &'a str) -> SendFuture<'a> {
                panic!("must not be called");
            }
        }

        let dispatcher = NotificationDispatcher::new(vec![Box::new(PanicTransport)]);
        let mut new_record = change("Shop A", 0.0, 2120.0);
        new_record.kind = ChangeKind::New;
        new_record.price_changed = false;
        dispatcher.dispatch(&[new_record]).await;
    }
}
