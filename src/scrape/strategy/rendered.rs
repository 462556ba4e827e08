//! Browser-rendered page strategy
//!
//! Delegates page loading to the injected [`PageRenderer`] capability and
//! then runs the full extraction chain over the rendered DOM. A missing
//! capability is a configuration condition, reported immediately on the
//! result; it is never retried as a fetch failure.

use super::{extract_price_chain, sku_hint_present, ChainOptions, StrategyContext};
use crate::model::{ScrapeResult, SiteConfig};

pub(super) async fn run(site: &SiteConfig, ctx: &StrategyContext) -> ScrapeResult {
    let mut result = ScrapeResult::new(site);

    let Some(renderer) = ctx.renderer.as_deref() else {
        result.error = Some(
            "browser rendering capability not configured; \
             inject a PageRenderer or switch this site to another strategy"
                .to_string(),
        );
        tracing::warn!("[{}] {}", site.name, result.error.as_deref().unwrap_or(""));
        return result;
    };

    tracing::info!("[{}] rendering {} via {}", site.name, site.url, renderer.name());
    let html = match renderer.render(&site.url).await {
        Ok(html) => html,
        Err(e) => {
            result.error = Some(format!("render failed: {}", e));
            tracing::error!("[{}] {}", site.name, result.error.as_deref().unwrap_or(""));
            return result;
        }
    };

    result.sku_confirmed = sku_hint_present(&html, &site.sku_hint);

    let opts = ChainOptions {
        check_itemprop: true,
        ..Default::default()
    };
    if !extract_price_chain(&mut result, &html, ctx, opts) {
        result.error = Some("price not found in rendered page".to_string());
        tracing::warn!("[{}] price not found in rendered page", site.name);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PageRenderer, RenderError, RenderFuture};
    use crate::scrape::strategy::tests::test_context;
    use crate::scrape::strategy::StrategyKind;
    use std::sync::Arc;

    struct CannedRenderer(String);

    impl PageRenderer for CannedRenderer {
        fn render<'a>(&'a self, _url: &'a str) -> RenderFuture<'a> {
            let html = self.0.clone();
            Box::pin(async move { Ok(html) })
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    struct FailingRenderer;

    impl PageRenderer for FailingRenderer {
        fn render<'a>(&'a self, _url: &'a str) -> RenderFuture<'a> {
            Box::pin(async { Err(RenderError::Timeout) })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn rendered_site() -> SiteConfig {
        SiteConfig {
            url: "https://js.example/p".to_string(),
            name: "JS Shop".to_string(),
            kind: StrategyKind::Rendered,
            sku_hint: "RROFY08".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_capability_is_terminal_error() {
        let ctx = test_context();
        let result = run(&rendered_site(), &ctx).await;
        assert_eq!(result.price, None);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("browser rendering capability"));
    }

    #[tokio::test]
    async fn test_rendered_dom_goes_through_the_chain() {
        let html = r#"<html><body>
            RROFY08, 176 cm: <span itemprop="price" content="2199.00">2 199,00 zł</span>
        </body></html>"#;
        let mut ctx = test_context();
        ctx.renderer = Some(Arc::new(CannedRenderer(html.to_string())));

        let result = run(&rendered_site(), &ctx).await;
        assert_eq!(result.price, Some(2199.00));
        assert!(result.sku_confirmed);
        assert!(result.variant_confirmed);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_render_failure_lands_on_the_result() {
        let mut ctx = test_context();
        ctx.renderer = Some(Arc::new(FailingRenderer));

        let result = run(&rendered_site(), &ctx).await;
        assert_eq!(result.price, None);
        assert!(result.error.as_deref().unwrap().contains("render failed"));
    }
}
