//! Domain types for coinwatch

pub mod coin;
pub mod ids;
pub mod job;

pub use coin::{parse_pair, Coin, CoinParseError, TickTrigger};
pub use ids::JobId;
pub use job::{AlertJob, JobType, Notification, NotificationLevel, OcoJob, ThresholdBranch};
