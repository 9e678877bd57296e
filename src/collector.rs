use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::{AppConfig, CollectionPlan};
use crate::distance::DistanceEnricher;
use crate::errors::AppResult;
use crate::google::MapsProvider;
use crate::places::{PlaceQuery, PlaceRecord};
use crate::search::{PlaceSearchClient, SearchSettings, Throttle};

/// Walks every (category, district) pair in order and gathers enriched records.
pub struct Collector {
    search: PlaceSearchClient,
    enricher: DistanceEnricher,
}

impl Collector {
    pub fn new(
        provider: Arc<dyn MapsProvider>,
        throttle: Arc<dyn Throttle>,
        config: &AppConfig,
    ) -> Self {
        let settings = SearchSettings {
            page_token_delay: Duration::from_millis(config.page_token_delay_ms),
            max_pages: config.max_result_pages,
        };
        Self {
            search: PlaceSearchClient::new(Arc::clone(&provider), throttle, settings),
            enricher: DistanceEnricher::new(provider, config.distance_batch_size),
        }
    }

    /// Stops at the first failing pair; nothing collected so far is returned.
    pub async fn collect(&self, plan: &CollectionPlan) -> AppResult<Vec<PlaceRecord>> {
        let mut collected = Vec::new();
        for query in plan.queries() {
            match self.collect_pair(&query).await {
                Ok(records) => {
                    info!(
                        category = %query.category,
                        district = %query.district,
                        records = records.len(),
                        "pair collected"
                    );
                    collected.extend(records);
                }
                Err(err) => {
                    warn!(
                        ?err,
                        category = %query.category,
                        district = %query.district,
                        "collection aborted"
                    );
                    return Err(err);
                }
            }
        }
        info!(
            pairs = plan.categories.len() * plan.districts.len(),
            records = collected.len(),
            "collection finished"
        );
        Ok(collected)
    }

    async fn collect_pair(&self, query: &PlaceQuery) -> AppResult<Vec<PlaceRecord>> {
        let records = self
            .search
            .search(query)
            .await?
            .into_iter()
            .map(|raw| PlaceRecord::from_raw(raw, query))
            .collect();
        self.enricher.enrich(records, &query.district).await
    }
}
