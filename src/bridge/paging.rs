use crate::error::Result;
use crate::model::record_id;
use crate::upstream::{PageRequest, QueryFilter, RecordSource};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Raw records gathered from one listing, and whether the upstream had more.
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub records: Vec<Value>,
    pub more_available: bool,
}

/// Walk a listing page by page until `limit` records are held or the
/// upstream runs out. The page size is fixed for the whole walk.
pub(crate) async fn collect_bounded(
    source: &dyn RecordSource,
    request: PageRequest,
    limit: usize,
    page_size: usize,
) -> Result<Collected> {
    if limit == 0 {
        return Ok(Collected::default());
    }

    let mut request = request.with_page_size(limit.min(page_size));
    let mut records = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = source.fetch_page(&request).await?;
        pages += 1;
        let next = page.next_token().map(str::to_string);
        let empty = page.resources.is_empty();
        records.extend(page.resources);

        if records.len() >= limit {
            let more_available = records.len() > limit || next.is_some();
            records.truncate(limit);
            debug!(
                "Collected {} records from {} in {} pages (more: {})",
                records.len(),
                request.collection,
                pages,
                more_available
            );
            return Ok(Collected {
                records,
                more_available,
            });
        }

        match next {
            Some(token) if !empty => request = request.with_page_token(Some(token)),
            _ => {
                debug!(
                    "Collected {} records from {} in {} pages (exhausted)",
                    records.len(),
                    request.collection,
                    pages
                );
                return Ok(Collected {
                    records,
                    more_available: false,
                });
            }
        }
    }
}

/// Batch lookup by `id $in`, at most `batch_size` ids per request.
/// Results come back in the order of `ids`; unknown ids are skipped.
pub(crate) async fn fetch_by_ids(
    source: &dyn RecordSource,
    collection: &str,
    ids: &[String],
    projection: &[String],
    batch_size: usize,
    page_size: usize,
) -> Result<Vec<Value>> {
    let mut found: HashMap<String, Value> = HashMap::with_capacity(ids.len());

    for chunk in ids.chunks(batch_size.max(1)) {
        let request = PageRequest::new(
            collection,
            QueryFilter::new().one_of("id", chunk.iter().cloned()),
        )
        .with_projection(projection.iter().cloned());

        let collected = collect_bounded(source, request, chunk.len(), page_size).await?;
        for record in collected.records {
            let id = record_id(&record, collection)?;
            found.entry(id).or_insert(record);
        }
    }

    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}
