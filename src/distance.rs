use std::sync::Arc;

use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::google::MapsProvider;
use crate::places::PlaceRecord;

pub struct DistanceEnricher {
    provider: Arc<dyn MapsProvider>,
    batch_size: usize,
}

impl DistanceEnricher {
    pub fn new(provider: Arc<dyn MapsProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    /// Sets `distance_from_center` on every record, measured on foot from the
    /// district's resolved center. Records must all belong to `district`.
    ///
    /// Either every record is enriched or an error is returned and the
    /// records are dropped. An empty batch returns immediately without
    /// resolving the district, so an unknown district only fails when it
    /// has places to measure.
    pub async fn enrich(
        &self,
        mut records: Vec<PlaceRecord>,
        district: &str,
    ) -> AppResult<Vec<PlaceRecord>> {
        if records.is_empty() {
            debug!(district, "no records to measure");
            return Ok(records);
        }

        let center = self
            .provider
            .resolve_center(district)
            .await?
            .ok_or_else(|| AppError::UnresolvableDistrict(district.to_string()))?;

        let coordinates: Vec<_> = records.iter().map(PlaceRecord::coordinates).collect();
        let mut distances = Vec::with_capacity(coordinates.len());
        for (batch_index, batch) in coordinates.chunks(self.batch_size).enumerate() {
            let values = self.provider.compute_distances(center, batch).await?;
            if values.len() != batch.len() {
                return Err(AppError::MalformedResponse(format!(
                    "expected {} distances for batch {batch_index} of {district}, got {}",
                    batch.len(),
                    values.len()
                )));
            }
            debug!(district, batch_index, size = batch.len(), "distance batch measured");
            distances.extend(values);
        }

        for (record, distance) in records.iter_mut().zip(distances) {
            record.distance_from_center = Some(distance);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::{Coordinates, PlaceQuery};
    use crate::testing::{page, FakeMaps};

    const DISTRICT: &str = "Zollstock, Cologne, Germany";

    fn records(count: usize) -> Vec<PlaceRecord> {
        let query = PlaceQuery::new("Supermarket", DISTRICT);
        page("s", count, None)
            .results
            .into_iter()
            .map(|raw| PlaceRecord::from_raw(raw, &query))
            .collect()
    }

    #[tokio::test]
    async fn measures_in_batches_and_keeps_positions() {
        let maps = Arc::new(FakeMaps::default());
        maps.set_center(DISTRICT, Coordinates::new(50.9, 6.94));
        let enricher = DistanceEnricher::new(maps.clone(), 25);

        let enriched = enricher.enrich(records(60), DISTRICT).await.unwrap();

        let calls = maps.distance_calls();
        let sizes: Vec<_> = calls.iter().map(|(_, dest)| dest.len()).collect();
        assert_eq!(sizes, vec![25, 25, 10]);
        assert!(calls
            .iter()
            .all(|(origin, _)| *origin == Coordinates::new(50.9, 6.94)));
        assert_eq!(enriched.len(), 60);
        for (i, record) in enriched.iter().enumerate() {
            assert_eq!(record.gmaps_place_id, format!("s-{i}"));
            assert_eq!(record.distance_from_center, Some(i as u64));
        }
    }

    #[tokio::test]
    async fn unresolvable_district_fails() {
        let maps = Arc::new(FakeMaps::default());
        let enricher = DistanceEnricher::new(maps.clone(), 25);

        let err = enricher.enrich(records(3), DISTRICT).await.unwrap_err();
        assert!(matches!(err, AppError::UnresolvableDistrict(ref d) if d == DISTRICT));
        assert!(maps.distance_calls().is_empty());
    }

    #[tokio::test]
    async fn failed_batch_fails_whole_district() {
        let maps = Arc::new(FakeMaps::default());
        maps.set_center(DISTRICT, Coordinates::new(50.9, 6.94));
        maps.push_distances((0..25).collect());
        maps.push_distance_error(AppError::ProviderRejected {
            endpoint: "distancematrix",
            status: "OVER_QUERY_LIMIT".into(),
            message: None,
        });
        let enricher = DistanceEnricher::new(maps.clone(), 25);

        let err = enricher.enrich(records(30), DISTRICT).await.unwrap_err();
        assert!(err.is_provider_failure());
        assert_eq!(maps.distance_calls().len(), 2);
    }

    #[tokio::test]
    async fn short_batch_answer_is_malformed() {
        let maps = Arc::new(FakeMaps::default());
        maps.set_center(DISTRICT, Coordinates::new(50.9, 6.94));
        maps.push_distances(vec![100, 200]);
        let enricher = DistanceEnricher::new(maps, 25);

        let err = enricher.enrich(records(3), DISTRICT).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn skips_lookups_without_records() {
        let maps = Arc::new(FakeMaps::default());
        let enricher = DistanceEnricher::new(maps.clone(), 25);

        let enriched = enricher.enrich(Vec::new(), DISTRICT).await.unwrap();
        assert!(enriched.is_empty());
        assert!(maps.center_calls().is_empty());
    }
}
