//! Scraping pipeline: fetch, extract, normalize
//!
//! One site check runs a strategy from [`strategy`] which composes the
//! retrying [`fetcher`], the structured-metadata [`extract`] helpers, and
//! the [`price`] normalizer into a fixed fallback chain.

pub mod extract;
pub mod fetcher;
pub mod price;
pub mod strategy;

pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher};
pub use strategy::{run_strategy, StrategyContext, StrategyKind};
