use serde::Serialize;

/// The record cap for one call: what the caller asked for and what is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLimit {
    pub requested: usize,
    pub effective: usize,
}

impl RecordLimit {
    pub fn new(requested: usize, cap: usize) -> Self {
        Self {
            requested,
            effective: requested.min(cap),
        }
    }

    pub fn clamped(&self) -> bool {
        self.requested > self.effective
    }
}

/// A result set with its bounds made explicit.
///
/// `more_available` is set whenever matching records were left behind because
/// of the cap, so a short result is never mistaken for a complete one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bounded<T> {
    pub records: Vec<T>,
    pub returned_count: usize,
    pub max_records: usize,
    pub requested_max_records: usize,
    pub clamped: bool,
    pub more_available: bool,
}

impl<T> Bounded<T> {
    pub fn new(mut records: Vec<T>, limit: RecordLimit, more_available: bool) -> Self {
        let truncated = records.len() > limit.effective;
        records.truncate(limit.effective);
        Self {
            returned_count: records.len(),
            records,
            max_records: limit.effective,
            requested_max_records: limit.requested,
            clamped: limit.clamped(),
            more_available: more_available || truncated,
        }
    }

    /// Convert every record, failing the whole set on the first error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Bounded<U>, E> {
        Ok(Bounded {
            records: self.records.into_iter().map(f).collect::<Result<_, _>>()?,
            returned_count: self.returned_count,
            max_records: self.max_records,
            requested_max_records: self.requested_max_records,
            clamped: self.clamped,
            more_available: self.more_available,
        })
    }

    /// Drop records failing `keep`, reporting how many were dropped.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(keep);
        self.returned_count = self.records.len();
        before - self.returned_count
    }
}
