//! Submission seam: where composed jobs leave the core.
//!
//! The transport to the job service is not part of this crate. A
//! `JobSubmitter` receives a fully identified `JobEnvelope` and is expected to
//! return quickly; the session does not await delivery or retry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use thiserror::Error;

use crate::domain::{JobId, OcoJob};

/// Errors from handing a job to a submitter.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("job could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("job receiver has gone away")]
    Disconnected,

    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// A job plus the identity assigned at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEnvelope {
    pub id: JobId,
    pub submitted_at: DateTime<Utc>,
    pub job: OcoJob,
}

impl JobEnvelope {
    /// Stamp `job` with its derived ID.
    pub fn seal(job: OcoJob, submitted_at: DateTime<Utc>) -> Result<Self, SubmitError> {
        let id = JobId::derive(&job, submitted_at)?;
        Ok(Self {
            job: job.with_id(id.clone()),
            id,
            submitted_at,
        })
    }
}

/// Receives composed jobs.
pub trait JobSubmitter: Send + Sync {
    fn submit(&self, envelope: &JobEnvelope) -> Result<(), SubmitError>;
}

/// Forwards envelopes over a channel to whoever owns the transport.
pub struct ChannelSubmitter {
    tx: Sender<JobEnvelope>,
}

impl ChannelSubmitter {
    pub fn new(tx: Sender<JobEnvelope>) -> Self {
        Self { tx }
    }
}

impl JobSubmitter for ChannelSubmitter {
    fn submit(&self, envelope: &JobEnvelope) -> Result<(), SubmitError> {
        self.tx
            .send(envelope.clone())
            .map_err(|_| SubmitError::Disconnected)
    }
}

/// Keeps every submitted envelope in memory.
#[derive(Default)]
pub struct RecordingSubmitter {
    submitted: Mutex<Vec<JobEnvelope>>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<JobEnvelope> {
        self.submitted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.submitted.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JobSubmitter for RecordingSubmitter {
    fn submit(&self, envelope: &JobEnvelope) -> Result<(), SubmitError> {
        self.submitted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(envelope.clone());
        Ok(())
    }
}

impl<T: JobSubmitter + ?Sized> JobSubmitter for std::sync::Arc<T> {
    fn submit(&self, envelope: &JobEnvelope) -> Result<(), SubmitError> {
        (**self).submit(envelope)
    }
}
