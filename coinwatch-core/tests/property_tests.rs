//! Property tests for composer invariants.
//!
//! Uses proptest to verify:
//! 1. Merge locality: a patch changes exactly the fields it carries
//! 2. Validity purity: repeated reads agree and do not bump the version
//! 3. Price rule: valid iff the text parses to a finite number > 0
//! 4. Branch presence: a branch exists iff its price is valid
//! 5. Focus routing: only the last registered field receives a value

use proptest::prelude::*;
use std::sync::Arc;

use coinwatch_core::domain::{Coin, TickTrigger};
use coinwatch_core::{
    is_valid_price, AlertDraft, AlertSession, ComposerConfig, DraftField, DraftPatch, FocusRouter,
    JobComposer, RecordingSubmitter,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z ]{0,8}",
        (-1000.0..1000.0_f64).prop_map(|p| format!("{p}")),
        (0.0001..100000.0_f64).prop_map(|p| format!("{p:.4}")),
    ]
}

fn arb_patch() -> impl Strategy<Value = DraftPatch> {
    (
        proptest::option::of(arb_text()),
        proptest::option::of(arb_text()),
        proptest::option::of(arb_text()),
    )
        .prop_map(|(high_price, low_price, message)| DraftPatch {
            high_price,
            low_price,
            message,
        })
}

fn arb_field() -> impl Strategy<Value = DraftField> {
    prop_oneof![
        Just(DraftField::HighPrice),
        Just(DraftField::LowPrice),
        Just(DraftField::Message),
    ]
}

fn coin() -> Coin {
    Coin::new(TickTrigger::new("binance", "BTC", "USDT"))
}

proptest! {
    /// Fields absent from the patch keep their previous value.
    #[test]
    fn merge_is_field_local(first in arb_patch(), second in arb_patch()) {
        let mut c = JobComposer::new();
        let before = c.update(first);
        let after = c.update(second.clone());

        for field in DraftField::ALL {
            let expected = second
                .fields()
                .find(|(f, _)| *f == field)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| before.get(field).to_string());
            prop_assert_eq!(after.get(field), expected.as_str());
        }
    }

    /// Reading validity never changes state.
    #[test]
    fn validity_is_pure(patch in arb_patch()) {
        let mut c = JobComposer::new();
        c.update(patch);
        let version = c.version();
        let v1 = c.validity();
        let v2 = c.validity();
        prop_assert_eq!(v1, v2);
        prop_assert_eq!(c.version(), version);
    }

    /// Any positive finite number is valid; zero and negatives are not.
    #[test]
    fn positive_numbers_are_valid(p in -1.0e6..1.0e6_f64) {
        let text = format!("{p}");
        prop_assert_eq!(is_valid_price(&text), p > 0.0);
    }

    /// Letters never make a valid price.
    #[test]
    fn words_are_invalid(s in "[g-z]{1,6}") {
        prop_assert!(!is_valid_price(&s));
    }

    /// A branch appears exactly when its price is valid.
    #[test]
    fn branch_presence_follows_validity(patch in arb_patch()) {
        let mut c = JobComposer::new();
        let draft: AlertDraft = c.update(patch);
        let job = c.build_job(&coin());

        prop_assert_eq!(job.low.is_some(), is_valid_price(&draft.low_price));
        prop_assert_eq!(job.high.is_some(), is_valid_price(&draft.high_price));
        prop_assert!(!job.verbose);

        if let Some(low) = job.low {
            prop_assert_eq!(low.threshold_as_string.as_str(), draft.low_price.trim());
            prop_assert!(low.job.notification.message.contains("dropped below"));
        }
        if let Some(high) = job.high {
            prop_assert_eq!(high.threshold_as_string.as_str(), draft.high_price.trim());
            prop_assert!(high.job.notification.message.contains("rose above"));
        }
    }

    /// Whatever the focus history, the value lands only in the last field.
    #[test]
    fn only_last_focus_receives(
        history in proptest::collection::vec(arb_field(), 1..6),
        value in "[0-9]{1,5}",
    ) {
        let session = AlertSession::new(
            coin(),
            Arc::new(FocusRouter::new()),
            RecordingSubmitter::new(),
            ComposerConfig::default(),
        );
        for field in &history {
            session.on_focus(*field);
        }
        session.dispatch(value.clone());

        let last = *history.last().unwrap();
        let draft = session.draft();
        for field in DraftField::ALL {
            if field == last {
                prop_assert_eq!(draft.get(field), value.as_str());
            } else {
                prop_assert_eq!(draft.get(field), "");
            }
        }
    }
}
