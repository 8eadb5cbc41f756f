//! Job trees handed to the job service.
//!
//! An alert composition produces one root `OcoJob` (one-cancels-other) wrapping
//! up to two threshold branches. Each branch holds a single `AlertJob` that
//! fires a notification when price crosses the threshold.

use serde::{Deserialize, Serialize};

use super::coin::TickTrigger;
use super::ids::JobId;

/// Job type discriminator, serialized as the job service's type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "OneCancelsOther")]
    Oco,
    #[serde(rename = "Alert")]
    Alert,
}

/// Severity attached to a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationLevel {
    Info,
    #[default]
    Alert,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

/// Leaf job: send a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertJob {
    pub job_type: JobType,
    pub notification: Notification,
}

impl AlertJob {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            job_type: JobType::Alert,
            notification: Notification {
                message: message.into(),
                level,
            },
        }
    }
}

/// One side of an OCO job: run `job` once price crosses `threshold_as_string`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdBranch {
    pub threshold_as_string: String,
    pub job: AlertJob,
}

/// Root job: low and high branches watched against the same trigger.
///
/// A branch is `None` when its threshold was not valid at build time. Absent
/// branches serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
    pub job_type: JobType,
    pub tick_trigger: TickTrigger,
    pub verbose: bool,
    pub low: Option<ThresholdBranch>,
    pub high: Option<ThresholdBranch>,
}

impl OcoJob {
    pub fn new(
        tick_trigger: TickTrigger,
        low: Option<ThresholdBranch>,
        high: Option<ThresholdBranch>,
    ) -> Self {
        Self {
            id: None,
            job_type: JobType::Oco,
            tick_trigger,
            verbose: false,
            low,
            high,
        }
    }

    /// True when neither branch survived validation.
    pub fn is_empty(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }

    pub fn with_id(mut self, id: JobId) -> Self {
        self.id = Some(id);
        self
    }
}
