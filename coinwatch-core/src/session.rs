//! Alert session: wires a form to the composer, the focus router and a submitter.
//!
//! One session exists per open alert form. It owns the composer for one coin
//! and translates the form's events:
//! - `on_focus(field)` registers a router target that merges values into `field`
//! - `on_change(patch)` merges typed edits directly
//! - `submit()` builds the job, hands it to the submitter and starts over
//!
//! External input sources only ever see the shared `FocusRouter`.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use thiserror::Error;

use crate::composer::{DraftObserver, DraftSnapshot, JobComposer};
use crate::config::ComposerConfig;
use crate::domain::Coin;
use crate::draft::{AlertDraft, DraftError, DraftField, DraftPatch};
use crate::focus::{FocusRouter, FocusToken};
use crate::submit::{JobEnvelope, JobSubmitter, SubmitError};
use crate::validation::Validity;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no valid price threshold: nothing to submit")]
    EmptyJob,

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("submit failed: {0}")]
    Submit(#[from] SubmitError),
}

pub struct AlertSession {
    coin: Coin,
    composer: Arc<Mutex<JobComposer>>,
    router: Arc<FocusRouter<String>>,
    submitter: Box<dyn JobSubmitter>,
    config: ComposerConfig,
    /// This session's live registration on the shared router.
    focus: Mutex<Option<FocusToken>>,
}

impl AlertSession {
    pub fn new(
        coin: Coin,
        router: Arc<FocusRouter<String>>,
        submitter: impl JobSubmitter + 'static,
        config: ComposerConfig,
    ) -> Self {
        tracing::debug!(coin = %coin.trigger, "alert session opened");
        Self {
            coin,
            composer: Arc::new(Mutex::new(JobComposer::with_level(config.notification_level))),
            router,
            submitter: Box::new(submitter),
            config,
            focus: Mutex::new(None),
        }
    }

    // ── Form events ────────────────────────────────────────────────────

    /// `field` gained focus: route external values into it from now on.
    pub fn on_focus(&self, field: DraftField) {
        // Weak, so a registration outliving the session goes quiet
        let composer: Weak<Mutex<JobComposer>> = Arc::downgrade(&self.composer);
        let mut focus = lock(&self.focus);
        let token = self.router.set_active(field.name(), move |value: String| {
            if let Some(composer) = composer.upgrade() {
                lock(&composer).update(DraftPatch::field(field, value));
            }
        });
        *focus = Some(token);
    }

    /// Focus left the form.
    pub fn on_blur(&self) {
        self.release_focus();
    }

    /// Direct edit from the form.
    pub fn on_change(&self, patch: DraftPatch) -> AlertDraft {
        lock(&self.composer).update(patch)
    }

    /// String-keyed edit; unknown field names are rejected.
    pub fn on_change_named<'a, I>(&self, pairs: I) -> Result<AlertDraft, SessionError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Ok(lock(&self.composer).update_named(pairs)?)
    }

    /// Feed a value through the router, as an external input source would.
    pub fn dispatch(&self, value: impl Into<String>) -> bool {
        self.router.dispatch(value.into())
    }

    pub fn reset(&self) {
        lock(&self.composer).reset();
    }

    /// Switch to another coin. The draft is discarded and focus cleared.
    pub fn change_coin(&mut self, coin: Coin) {
        tracing::debug!(from = %self.coin.trigger, to = %coin.trigger, "coin changed");
        self.coin = coin;
        self.release_focus();
        lock(&self.composer).reset();
    }

    // ── Reads ──────────────────────────────────────────────────────────

    pub fn coin(&self) -> &Coin {
        &self.coin
    }

    pub fn router(&self) -> Arc<FocusRouter<String>> {
        Arc::clone(&self.router)
    }

    pub fn draft(&self) -> AlertDraft {
        lock(&self.composer).draft().clone()
    }

    pub fn validity(&self) -> Validity {
        lock(&self.composer).validity()
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        lock(&self.composer).snapshot()
    }

    /// Register a draft observer.
    ///
    /// Observers run while the session's composer is locked. Calling back into
    /// this session (`draft`, `snapshot`, `on_change`, ...) from an observer
    /// deadlocks; use the snapshot it is given instead.
    pub fn subscribe(&self, observer: DraftObserver) {
        lock(&self.composer).subscribe(observer);
    }

    // ── Submission ─────────────────────────────────────────────────────

    pub fn submit(&self) -> Result<JobEnvelope, SessionError> {
        self.submit_at(Utc::now())
    }

    /// Build, seal and hand off the job as of `submitted_at`.
    ///
    /// The job is built from one consistent view of the draft. The composer is
    /// not locked while the submitter runs, so the submitter (or another
    /// thread) may keep feeding the router. On success the submitted values are
    /// cleared, values that arrived meanwhile are kept for the next job, and
    /// this session's focus is released. On failure the draft is kept so the
    /// user can retry.
    pub fn submit_at(&self, submitted_at: DateTime<Utc>) -> Result<JobEnvelope, SessionError> {
        let (draft, job) = {
            let composer = lock(&self.composer);
            (composer.draft().clone(), composer.build_job(&self.coin))
        };
        if job.is_empty() && !self.config.allow_empty_submit {
            tracing::warn!(coin = %self.coin.trigger, "refusing to submit job with no valid threshold");
            return Err(SessionError::EmptyJob);
        }

        let envelope = JobEnvelope::seal(job, submitted_at)?;
        self.submitter.submit(&envelope)?;
        tracing::info!(id = %envelope.id, coin = %self.coin.trigger, "alert job submitted");

        self.release_focus();
        lock(&self.composer).reset_submitted(&draft);
        Ok(envelope)
    }

    /// Clear the router only if it still holds this session's registration.
    fn release_focus(&self) {
        if let Some(token) = lock(&self.focus).take() {
            self.router.clear_if_owner(token);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TickTrigger;
    use crate::submit::RecordingSubmitter;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn coin() -> Coin {
        Coin::with_name(TickTrigger::new("binance", "ETH", "BTC"), "Ether")
    }

    fn session() -> (AlertSession, Arc<RecordingSubmitter>) {
        let rec = Arc::new(RecordingSubmitter::new());
        let session = AlertSession::new(
            coin(),
            Arc::new(FocusRouter::new()),
            rec.clone(),
            ComposerConfig::default(),
        );
        (session, rec)
    }

    #[test]
    fn focus_then_dispatch_updates_field() {
        let (s, _) = session();
        s.on_focus(DraftField::LowPrice);
        assert!(s.dispatch("42"));
        assert_eq!(s.draft().low_price, "42");
        assert!(s.validity().low_price_valid);
    }

    #[test]
    fn refocus_redirects_values() {
        let (s, _) = session();
        s.on_focus(DraftField::LowPrice);
        s.on_focus(DraftField::HighPrice);
        s.dispatch("9");
        assert_eq!(s.draft().low_price, "");
        assert_eq!(s.draft().high_price, "9");
    }

    #[test]
    fn blur_drops_values() {
        let (s, _) = session();
        s.on_focus(DraftField::Message);
        s.on_blur();
        assert!(!s.dispatch("ignored"));
        assert!(s.draft().is_empty());
    }

    #[test]
    fn empty_submit_is_refused_by_default() {
        let (s, rec) = session();
        s.on_change(DraftPatch::field(DraftField::Message, "just a note"));
        assert!(matches!(s.submit(), Err(SessionError::EmptyJob)));
        assert!(rec.is_empty());
        assert_eq!(s.draft().message, "just a note");
    }

    #[test]
    fn empty_submit_allowed_when_configured() {
        let rec = Arc::new(RecordingSubmitter::new());
        let config = ComposerConfig {
            allow_empty_submit: true,
            ..ComposerConfig::default()
        };
        let s = AlertSession::new(coin(), Arc::new(FocusRouter::new()), rec.clone(), config);
        let env = s.submit().unwrap();
        assert!(env.job.is_empty());
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn submit_hands_off_and_resets() {
        let (s, rec) = session();
        s.on_focus(DraftField::HighPrice);
        s.on_change(DraftPatch::field(DraftField::LowPrice, "0.05"));
        s.dispatch("0.09");

        let env = s.submit().unwrap();
        assert_eq!(rec.submitted(), vec![env.clone()]);
        assert_eq!(env.job.low.unwrap().threshold_as_string, "0.05");
        assert_eq!(
            env.job.high.unwrap().job.notification.message,
            "Price of Ether rose above 0.09"
        );

        assert!(s.draft().is_empty());
        assert_eq!(s.router().active_field(), None);
    }

    #[test]
    fn change_coin_resets_draft() {
        let (mut s, _) = session();
        s.on_focus(DraftField::LowPrice);
        s.dispatch("1");
        s.change_coin(Coin::new(TickTrigger::new("kraken", "XBT", "USD")));
        assert!(s.draft().is_empty());
        assert!(!s.dispatch("2"));
        assert_eq!(s.coin().name, "XBT/USD (kraken)");
    }

    #[test]
    fn named_change_rejects_unknown_field() {
        let (s, _) = session();
        let err = s.on_change_named([("price", "1")]).unwrap_err();
        assert!(matches!(err, SessionError::Draft(DraftError::UnknownField(_))));
    }

    #[test]
    fn dropped_session_leaves_router_inert() {
        let router = Arc::new(FocusRouter::new());
        let seen = Arc::new(AtomicU64::new(0));
        {
            let s = AlertSession::new(
                coin(),
                router.clone(),
                RecordingSubmitter::new(),
                ComposerConfig::default(),
            );
            let counter = seen.clone();
            s.subscribe(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
            s.on_focus(DraftField::LowPrice);
            s.dispatch("1");
        }
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        // Target still registered, but its composer is gone
        assert!(router.dispatch("5".to_string()));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(Arc::strong_count(&seen), 1);
    }

    #[test]
    fn blur_leaves_other_sessions_focus() {
        let router = Arc::new(FocusRouter::new());
        let a = AlertSession::new(coin(), router.clone(), RecordingSubmitter::new(), ComposerConfig::default());
        let b = AlertSession::new(coin(), router.clone(), RecordingSubmitter::new(), ComposerConfig::default());

        a.on_focus(DraftField::LowPrice);
        b.on_focus(DraftField::HighPrice);
        a.on_blur();

        assert_eq!(router.active_field().as_deref(), Some("highPrice"));
        assert!(a.dispatch("3"));
        assert_eq!(b.draft().high_price, "3");
        assert!(a.draft().is_empty());

        b.on_blur();
        assert!(!router.is_active());
    }
}
