//! Answer values and annotation records.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// A single validated answer.
///
/// Serialized untagged so the wire shape matches what clients submit:
/// a bare bool for boolean questions, a string for single-choice, an
/// array of strings for multi-select. Selections are kept as a
/// [`BTreeSet`] so two answer sets with the same options compare and
/// serialize identically regardless of click order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Choice(String),
    Selection(BTreeSet<String>),
}

/// A full answer set: question key to validated value.
///
/// Always produced by [`crate::Schema::validate`], so it contains exactly
/// the schema's question keys at the time of submission.
pub type AnswerSet = BTreeMap<String, AnswerValue>;

/// One annotator's submission for one image.
///
/// Keyed by `(annotator_id, image_id)`; a later submission for the same
/// key replaces the earlier one entirely (last write wins, no merging).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Caller-supplied free text, case-sensitive, non-empty. This is the
    /// sole identity mechanism: sessions sharing the string share progress.
    pub annotator_id: String,
    pub image_id: String,
    pub answers: AnswerSet,
    pub submitted_at: Timestamp,
}
