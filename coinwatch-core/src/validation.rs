//! Price validation for draft thresholds.

use serde::{Deserialize, Serialize};

use crate::draft::AlertDraft;

/// Per-branch validity, surfaced to the form so it can gate submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    pub low_price_valid: bool,
    pub high_price_valid: bool,
}

impl Validity {
    pub fn of(draft: &AlertDraft) -> Self {
        Self {
            low_price_valid: is_valid_price(&draft.low_price),
            high_price_valid: is_valid_price(&draft.high_price),
        }
    }

    pub fn any(&self) -> bool {
        self.low_price_valid || self.high_price_valid
    }
}

/// Parse a positive finite price, ignoring surrounding whitespace.
pub fn parse_price(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

/// A price is valid iff it is non-blank, numeric, finite and strictly positive.
pub fn is_valid_price(text: &str) -> bool {
    parse_price(text).is_some()
}
