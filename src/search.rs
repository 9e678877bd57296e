use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::AppResult;
use crate::google::MapsProvider;
use crate::places::{PlaceQuery, RawPlaceResult};

/// Waits before a page token is redeemed.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioThrottle;

#[async_trait]
impl Throttle for TokioThrottle {
    async fn pause(&self, duration: Duration) {
        sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    /// Page tokens are rejected if used immediately after they are issued.
    pub page_token_delay: Duration,
    pub max_pages: usize,
}

pub struct PlaceSearchClient {
    provider: Arc<dyn MapsProvider>,
    throttle: Arc<dyn Throttle>,
    settings: SearchSettings,
}

impl PlaceSearchClient {
    pub fn new(
        provider: Arc<dyn MapsProvider>,
        throttle: Arc<dyn Throttle>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            provider,
            throttle,
            settings,
        }
    }

    /// Follows continuation tokens until the provider stops issuing them.
    /// Results keep page order, then in-page order.
    pub async fn search(&self, query: &PlaceQuery) -> AppResult<Vec<RawPlaceResult>> {
        let text = query.text_query();
        let mut page = self.provider.search_places(&text, None).await?;
        let mut pages = 1;
        let mut results = std::mem::take(&mut page.results);

        while let Some(token) = page.next_page_token.take() {
            if pages >= self.settings.max_pages {
                warn!(
                    query = %text,
                    pages,
                    "page limit reached with a continuation token outstanding"
                );
                break;
            }
            self.throttle.pause(self.settings.page_token_delay).await;
            page = self.provider.search_places(&text, Some(&token)).await?;
            pages += 1;
            results.append(&mut page.results);
        }

        debug!(query = %text, pages, results = results.len(), "search complete");
        Ok(results)
    }
}
