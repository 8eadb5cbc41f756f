//! Alert draft: the in-progress form contents before validation.
//!
//! - `AlertDraft`: the complete record. Every field is always present, blank
//!   fields are empty strings.
//! - `DraftField`: the closed set of field names a caller may address.
//! - `DraftPatch`: a typed partial update. Merging replaces only the fields it
//!   carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from addressing draft fields by name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("unknown draft field '{0}' (expected highPrice, lowPrice or message)")]
    UnknownField(String),
}

/// A recognized draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    HighPrice,
    LowPrice,
    Message,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [Self::HighPrice, Self::LowPrice, Self::Message];

    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            Self::HighPrice => "highPrice",
            Self::LowPrice => "lowPrice",
            Self::Message => "message",
        }
    }

    pub fn is_price(self) -> bool {
        !matches!(self, Self::Message)
    }
}

impl FromStr for DraftField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highPrice" | "high_price" => Ok(Self::HighPrice),
            "lowPrice" | "low_price" => Ok(Self::LowPrice),
            "message" => Ok(Self::Message),
            other => Err(DraftError::UnknownField(other.to_string())),
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw form contents. Prices are kept as typed text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDraft {
    pub high_price: String,
    pub low_price: String,
    pub message: String,
}

impl AlertDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::HighPrice => &self.high_price,
            DraftField::LowPrice => &self.low_price,
            DraftField::Message => &self.message,
        }
    }

    /// Copy of this draft with one field replaced.
    pub fn with_field(&self, field: DraftField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.slot(field) = value.into();
        next
    }

    /// Copy of this draft with every field the patch carries replaced.
    pub fn merged(&self, patch: &DraftPatch) -> Self {
        let mut next = self.clone();
        for (field, value) in patch.fields() {
            *next.slot(field) = value.to_string();
        }
        next
    }

    pub fn is_empty(&self) -> bool {
        self.high_price.is_empty() && self.low_price.is_empty() && self.message.is_empty()
    }

    fn slot(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::HighPrice => &mut self.high_price,
            DraftField::LowPrice => &mut self.low_price,
            DraftField::Message => &mut self.message,
        }
    }
}

/// Partial draft: `None` fields are left alone on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DraftPatch {
    #[serde(default)]
    pub high_price: Option<String>,
    #[serde(default)]
    pub low_price: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl DraftPatch {
    /// Patch touching a single field.
    pub fn field(field: DraftField, value: impl Into<String>) -> Self {
        Self::default().set(field, value)
    }

    pub fn set(mut self, field: DraftField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            DraftField::HighPrice => self.high_price = value,
            DraftField::LowPrice => self.low_price = value,
            DraftField::Message => self.message = value,
        }
        self
    }

    /// Build a patch from string-keyed pairs.
    ///
    /// Fails on the first unrecognized key; nothing is built in that case.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self, DraftError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .try_fold(Self::default(), |patch, (name, value)| {
                Ok(patch.set(name.parse()?, value))
            })
    }

    /// The fields this patch carries, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (DraftField, &str)> {
        [
            (DraftField::HighPrice, self.high_price.as_deref()),
            (DraftField::LowPrice, self.low_price.as_deref()),
            (DraftField::Message, self.message.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}
