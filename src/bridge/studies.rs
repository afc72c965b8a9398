use super::paging::collect_bounded;
use super::{QueryBridge, require_text};
use crate::error::{NmdcError, Result};
use crate::model::study::{PUBLICATION_DOI_CATEGORY, STUDY_PROJECTION};
use crate::model::{Bounded, Study, string_list, text};
use crate::upstream::collections::{BIOSAMPLE_SET, STUDY_SET};
use crate::upstream::{PageRequest, QueryFilter};
use serde::Serialize;
use tracing::{debug, warn};

/// The study a biosample belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyForBiosample {
    pub biosample_id: String,
    pub biosample_name: Option<String>,
    /// First associated study id, reported even when the study record is missing
    pub study_id: Option<String>,
    pub study: Option<Study>,
    /// Further studies the biosample is associated with, not fetched
    pub additional_study_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl QueryBridge {
    /// Studies with at least one publication DOI, filtered server-side.
    pub async fn find_studies_with_publications(
        &self,
        max_records: Option<usize>,
    ) -> Result<Bounded<Study>> {
        let limit = self.limit(max_records)?;
        let request = PageRequest::new(
            STUDY_SET,
            QueryFilter::new().eq("associated_dois.doi_category", PUBLICATION_DOI_CATEGORY),
        )
        .with_projection(STUDY_PROJECTION.iter().copied());

        let collected =
            collect_bounded(self.source(), request, limit.effective, self.settings.page_size)
                .await?;
        let mut studies = Bounded::new(collected.records, limit, collected.more_available)
            .try_map(Study::from_record)?;

        let dropped = studies.retain(Study::has_publications);
        if dropped > 0 {
            warn!("Dropped {} studies returned without publication DOIs", dropped);
        }
        debug!("Returning {} studies with publications", studies.returned_count);
        Ok(studies)
    }

    pub async fn get_study_for_biosample(&self, biosample_id: &str) -> Result<StudyForBiosample> {
        let biosample_id = require_text("biosample_id", biosample_id)?;
        let source = self.source();

        let request = PageRequest::new(BIOSAMPLE_SET, QueryFilter::new().eq("id", biosample_id))
            .with_projection(["id", "name", "associated_studies"]);
        let biosample = collect_bounded(source, request, 1, 1)
            .await?
            .records
            .into_iter()
            .next()
            .ok_or_else(|| NmdcError::not_found("Biosample", biosample_id))?;

        let biosample_name = biosample.get("name").and_then(text);
        let mut study_ids = biosample
            .get("associated_studies")
            .map(string_list)
            .unwrap_or_default()
            .into_iter();

        let Some(study_id) = study_ids.next() else {
            return Ok(StudyForBiosample {
                biosample_id: biosample_id.to_string(),
                biosample_name,
                study_id: None,
                study: None,
                additional_study_ids: Vec::new(),
                note: Some("Biosample has no associated studies".to_string()),
            });
        };
        let additional_study_ids: Vec<String> = study_ids.collect();

        let request = PageRequest::new(STUDY_SET, QueryFilter::new().eq("id", study_id.clone()))
            .with_projection(STUDY_PROJECTION.iter().copied());
        let study = collect_bounded(source, request, 1, 1)
            .await?
            .records
            .into_iter()
            .next()
            .map(Study::from_record)
            .transpose()?;

        let note = match (&study, additional_study_ids.len()) {
            (None, _) => Some(format!("Associated study {} was not found", study_id)),
            (Some(_), 0) => None,
            (Some(_), n) => Some(format!("Biosample is associated with {} additional studies", n)),
        };

        Ok(StudyForBiosample {
            biosample_id: biosample_id.to_string(),
            biosample_name,
            study_id: Some(study_id),
            study,
            additional_study_ids,
            note,
        })
    }
}
