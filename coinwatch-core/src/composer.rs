//! Job composer: holds the alert draft and materializes OCO job trees.
//!
//! The composer owns exactly one `AlertDraft` for the life of a form session.
//! Every mutating call (`update`, `update_named`, `reset`) bumps the draft
//! version and notifies observers exactly once. Validity is never cached: it
//! is recomputed from the current draft on each read.

use serde::{Deserialize, Serialize};

use crate::domain::{AlertJob, Coin, NotificationLevel, OcoJob, ThresholdBranch};
use crate::draft::{AlertDraft, DraftError, DraftField, DraftPatch};
use crate::validation::{is_valid_price, Validity};

/// What observers (and the rendering layer) see after each change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub version: u64,
    pub draft: AlertDraft,
    pub validity: Validity,
}

/// Callback run after each draft change.
///
/// Observers run while the composer is borrowed mutably, so they must not call
/// back into the same composer.
pub type DraftObserver = Box<dyn Fn(&DraftSnapshot) + Send + Sync>;

/// Which way price has to move to fire a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Below,
    Above,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Self::Below => "dropped below",
            Self::Above => "rose above",
        }
    }
}

pub struct JobComposer {
    draft: AlertDraft,
    version: u64,
    level: NotificationLevel,
    observers: Vec<DraftObserver>,
}

impl Default for JobComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl JobComposer {
    pub fn new() -> Self {
        Self::with_level(NotificationLevel::default())
    }

    /// Composer whose alert branches notify at `level`.
    pub fn with_level(level: NotificationLevel) -> Self {
        Self {
            draft: AlertDraft::default(),
            version: 0,
            level,
            observers: Vec::new(),
        }
    }

    // ── Draft editing ──────────────────────────────────────────────────

    /// Merge `patch` into the draft and return the new draft.
    pub fn update(&mut self, patch: DraftPatch) -> AlertDraft {
        self.draft = self.draft.merged(&patch);
        tracing::debug!(
            version = self.version + 1,
            fields = ?patch.fields().map(|(f, _)| f.name()).collect::<Vec<_>>(),
            "draft updated"
        );
        self.notify();
        self.draft.clone()
    }

    /// String-keyed merge. Unknown keys reject the whole call and leave the
    /// draft untouched.
    pub fn update_named<'a, I>(&mut self, pairs: I) -> Result<AlertDraft, DraftError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let patch = DraftPatch::from_named(pairs).map_err(|e| {
            tracing::warn!(error = %e, "rejected draft update");
            e
        })?;
        Ok(self.update(patch))
    }

    /// Back to the empty draft.
    pub fn reset(&mut self) {
        self.draft = AlertDraft::default();
        tracing::debug!(version = self.version + 1, "draft reset");
        self.notify();
    }

    /// Clear what was submitted from `submitted` and keep anything newer.
    ///
    /// Fields still holding their submitted value are emptied. Fields changed
    /// since then belong to the next job and survive. With no intervening
    /// change this is `reset`.
    pub fn reset_submitted(&mut self, submitted: &AlertDraft) {
        if &self.draft == submitted {
            self.reset();
            return;
        }
        let patch = DraftField::ALL
            .into_iter()
            .filter(|&field| self.draft.get(field) == submitted.get(field))
            .fold(DraftPatch::default(), |patch, field| patch.set(field, ""));
        tracing::debug!("draft changed during submission, keeping newer fields");
        self.update(patch);
    }

    // ── Reads ──────────────────────────────────────────────────────────

    pub fn draft(&self) -> &AlertDraft {
        &self.draft
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn level(&self) -> NotificationLevel {
        self.level
    }

    pub fn validity(&self) -> Validity {
        Validity::of(&self.draft)
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            version: self.version,
            draft: self.draft.clone(),
            validity: self.validity(),
        }
    }

    /// Register an observer. It is not called for the current state.
    pub fn subscribe(&mut self, observer: DraftObserver) {
        self.observers.push(observer);
    }

    // ── Job materialization ────────────────────────────────────────────

    /// Build the OCO job for `coin` from the current draft.
    ///
    /// Branches whose price is not valid are left out. A draft with no valid
    /// price still yields a job, with both branches `None`.
    pub fn build_job(&self, coin: &Coin) -> OcoJob {
        let low = self.branch(coin, &self.draft.low_price, Direction::Below);
        let high = self.branch(coin, &self.draft.high_price, Direction::Above);
        OcoJob::new(coin.trigger.clone(), low, high)
    }

    fn branch(&self, coin: &Coin, price: &str, direction: Direction) -> Option<ThresholdBranch> {
        if !is_valid_price(price) {
            return None;
        }
        let threshold = price.trim().to_string();
        let message = alert_message(&coin.name, direction, &threshold, &self.draft.message);
        Some(ThresholdBranch {
            threshold_as_string: threshold,
            job: AlertJob::new(message, self.level),
        })
    }

    fn notify(&mut self) {
        self.version += 1;
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &self.observers {
            observer(&snapshot);
        }
    }
}

fn alert_message(coin_name: &str, direction: Direction, threshold: &str, note: &str) -> String {
    let mut message = format!("Price of {coin_name} {} {threshold}", direction.verb());
    let note = note.trim();
    if !note.is_empty() {
        message.push_str(": ");
        message.push_str(note);
    }
    message
}
