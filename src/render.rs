//! Browser rendering capability
//!
//! Some shops only materialize prices client-side; for those the pipeline
//! needs DOM content equivalent to what the plain fetcher gets elsewhere.
//! The capability is injected: the rest of the pipeline is testable (and
//! usable) without any real browser, and a site configured for rendering
//! simply errors when the capability is absent.
//!
//! An implementation must serialize its own browser lifecycle per
//! invocation (launch, navigate, read content, close) and must not leak
//! instances across calls.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from a rendering backend
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page load timed out")]
    Timeout,

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("renderer failed: {0}")]
    Backend(String),
}

/// Boxed future returned by [`PageRenderer::render`]
pub type RenderFuture<'a> = Pin<Box<dyn Future<Output = Result<String, RenderError>> + Send + 'a>>;

/// Capability interface for obtaining fully rendered page HTML
pub trait PageRenderer: Send + Sync {
    /// Renders the page at `url` and returns its final DOM as HTML
    fn render<'a>(&'a self, url: &'a str) -> RenderFuture<'a>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
