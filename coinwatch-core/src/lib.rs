//! Coinwatch Core: alert composition and focus routing.
//!
//! This crate contains the logic behind the alert form of the dashboard:
//! - Domain types (coins, tick triggers, OCO/alert job trees, job ids)
//! - The alert draft and its typed partial updates
//! - Price validation
//! - `JobComposer`: draft ownership, change notification, job materialization
//! - `FocusRouter`: single-slot routing of external input to the focused field
//! - `AlertSession`: the wiring between form events, router, composer and submitter
//! - TOML configuration and the coin watchlist

pub mod composer;
pub mod config;
pub mod domain;
pub mod draft;
pub mod focus;
pub mod session;
pub mod submit;
pub mod validation;

pub use composer::{DraftObserver, DraftSnapshot, JobComposer};
pub use config::{ComposerConfig, Config, ConfigError, Watchlist};
pub use draft::{AlertDraft, DraftError, DraftField, DraftPatch};
pub use focus::{FocusRouter, FocusToken};
pub use session::{AlertSession, SessionError};
pub use submit::{ChannelSubmitter, JobEnvelope, JobSubmitter, RecordingSubmitter, SubmitError};
pub use validation::{is_valid_price, parse_price, Validity};
