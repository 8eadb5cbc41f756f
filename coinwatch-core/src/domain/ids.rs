use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::job::OcoJob;

/// Deterministic job ID (hash of the job tree + submission time).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the ID for a job submitted at `submitted_at`.
    ///
    /// Any `id` already on the job is ignored, so re-deriving is stable.
    pub fn derive(job: &OcoJob, submitted_at: DateTime<Utc>) -> serde_json::Result<Self> {
        let mut unidentified = job.clone();
        unidentified.id = None;

        // Struct fields serialize in declaration order, so the JSON is canonical
        let mut canonical = serde_json::to_vec(&unidentified)?;
        canonical.extend_from_slice(submitted_at.to_rfc3339().as_bytes());

        Ok(Self(blake3::hash(&canonical).to_hex().to_string()))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
