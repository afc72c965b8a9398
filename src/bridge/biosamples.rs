use super::paging::{collect_bounded, fetch_by_ids};
use super::{QueryBridge, require_text};
use crate::error::{NmdcError, Result};
use crate::model::biosample::BIOSAMPLE_PROJECTION;
use crate::model::{Biosample, Bounded, RecordLimit};
use crate::upstream::collections::BIOSAMPLE_SET;
use crate::upstream::{PageRequest, QueryFilter};
use tracing::{debug, warn};

/// Ecosystem classification to match; `ecosystem_type` is mandatory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EcosystemQuery {
    pub ecosystem_type: String,
    pub ecosystem: Option<String>,
    pub ecosystem_category: Option<String>,
    pub ecosystem_subtype: Option<String>,
    pub specific_ecosystem: Option<String>,
}

impl EcosystemQuery {
    pub fn new(ecosystem_type: impl Into<String>) -> Self {
        Self {
            ecosystem_type: ecosystem_type.into(),
            ..Default::default()
        }
    }

    /// One equality clause per supplied field. Blank optional fields are ignored.
    pub fn to_filter(&self) -> Result<QueryFilter> {
        let ecosystem_type = require_text("ecosystem_type", &self.ecosystem_type)?;
        let mut filter = QueryFilter::new().eq("ecosystem_type", ecosystem_type);

        let optional = [
            ("ecosystem", &self.ecosystem),
            ("ecosystem_category", &self.ecosystem_category),
            ("ecosystem_subtype", &self.ecosystem_subtype),
            ("specific_ecosystem", &self.specific_ecosystem),
        ];
        for (field, value) in optional {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                filter = filter.eq(field, value);
            }
        }
        Ok(filter)
    }
}

/// Latitude/longitude window, bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lower_lat: f64,
    pub upper_lat: f64,
    pub lower_lon: f64,
    pub upper_lon: f64,
}

impl BoundingBox {
    fn validate(&self) -> Result<()> {
        check_bound("lower_lat", self.lower_lat, 90.0)?;
        check_bound("upper_lat", self.upper_lat, 90.0)?;
        check_bound("lower_lon", self.lower_lon, 180.0)?;
        check_bound("upper_lon", self.upper_lon, 180.0)?;
        if self.lower_lat >= self.upper_lat {
            return Err(NmdcError::invalid_argument(
                "lower_lat",
                "must be less than upper_lat",
            ));
        }
        if self.lower_lon >= self.upper_lon {
            return Err(NmdcError::invalid_argument(
                "lower_lon",
                "must be less than upper_lon",
            ));
        }
        Ok(())
    }
}

fn check_bound(argument: &str, value: f64, magnitude: f64) -> Result<()> {
    if !value.is_finite() || value.abs() > magnitude {
        return Err(NmdcError::invalid_argument(
            argument,
            format!("must be between -{} and {}", magnitude, magnitude),
        ));
    }
    Ok(())
}

impl QueryBridge {
    pub async fn find_biosamples_by_ecosystem(
        &self,
        query: &EcosystemQuery,
        max_records: Option<usize>,
    ) -> Result<Bounded<Biosample>> {
        let filter = query.to_filter()?;
        let limit = self.limit(max_records)?;
        self.list_biosamples(filter, limit).await
    }

    pub async fn find_biosamples_in_elevation_range(
        &self,
        min_elevation: f64,
        max_elevation: f64,
        max_records: Option<usize>,
    ) -> Result<Bounded<Biosample>> {
        if !min_elevation.is_finite() {
            return Err(NmdcError::invalid_argument("min_elevation", "must be a finite number"));
        }
        if !max_elevation.is_finite() {
            return Err(NmdcError::invalid_argument("max_elevation", "must be a finite number"));
        }
        if min_elevation >= max_elevation {
            return Err(NmdcError::invalid_argument(
                "min_elevation",
                "must be less than max_elevation",
            ));
        }
        let limit = self.limit(max_records)?;

        let filter = QueryFilter::new().between_exclusive("elev", min_elevation, max_elevation);
        self.list_biosamples(filter, limit).await
    }

    pub async fn find_biosamples_in_bounding_box(
        &self,
        bounds: BoundingBox,
        max_records: Option<usize>,
    ) -> Result<Bounded<Biosample>> {
        bounds.validate()?;
        let limit = self.limit(max_records)?;

        let filter = QueryFilter::new()
            .between_exclusive("lat_lon.latitude", bounds.lower_lat, bounds.upper_lat)
            .between_exclusive("lat_lon.longitude", bounds.lower_lon, bounds.upper_lon);
        self.list_biosamples(filter, limit).await
    }

    /// Filtered biosample listing. Records that come back not matching the
    /// filter are dropped rather than handed to the caller.
    async fn list_biosamples(
        &self,
        filter: QueryFilter,
        limit: RecordLimit,
    ) -> Result<Bounded<Biosample>> {
        let request = PageRequest::new(BIOSAMPLE_SET, filter.clone())
            .with_projection(BIOSAMPLE_PROJECTION.iter().copied());
        let collected =
            collect_bounded(self.source(), request, limit.effective, self.settings.page_size)
                .await?;

        let mut bounded = Bounded::new(collected.records, limit, collected.more_available);
        let dropped = bounded.retain(|record| filter.matches(record));
        if dropped > 0 {
            warn!(
                "Dropped {} biosample records not matching {}",
                dropped,
                filter.to_document()
            );
        }
        debug!("Returning {} biosamples", bounded.returned_count);
        bounded.try_map(Biosample::from_record)
    }

    /// Biosamples for `ids`, in the order given.
    pub(crate) async fn biosamples_by_ids(&self, ids: &[String]) -> Result<Vec<Biosample>> {
        let projection: Vec<String> = BIOSAMPLE_PROJECTION.iter().map(|f| f.to_string()).collect();
        fetch_by_ids(
            self.source(),
            BIOSAMPLE_SET,
            ids,
            &projection,
            self.settings.id_batch_size,
            self.settings.page_size,
        )
        .await?
        .into_iter()
        .map(Biosample::from_record)
        .collect()
    }
}
