//! Cross-annotator consensus aggregation.
//!
//! For one image, folds every annotator's stored answers into a single
//! reconciled answer per question. The result is a pure function of the
//! current records and schema: nothing here is persisted, and the output
//! is identical regardless of the order records arrive in (tallies live
//! in `BTreeMap`s, winners are picked by count with a deterministic
//! uniqueness check).

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::Serialize;

use crate::answer::{AnnotationRecord, AnswerValue};
use crate::schema::{QuestionKind, Schema};

/// The reconciled outcome for one question.
///
/// `NoConsensus` is a valid output value, not an error: it marks an exact
/// tie (or an image nobody has annotated yet) explicitly, so downstream
/// exports can distinguish "annotators disagree" from "unanswered".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ConsensusValue {
    Agreed(AnswerValue),
    NoConsensus,
}

/// Consensus outcome and the vote tally behind it for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionConsensus {
    pub value: ConsensusValue,
    /// Votes per distinct value. Boolean questions tally under `"true"`
    /// and `"false"`; single/multi questions tally per option, with
    /// zero-vote options included so exports show the full picture.
    pub tally: BTreeMap<String, u32>,
}

/// The consensus view of one image across all contributing annotators.
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusRecord {
    pub image_id: String,
    /// Per-question consensus, in schema declaration order.
    pub questions: IndexMap<String, QuestionConsensus>,
    /// Number of distinct annotators with a record valid under the
    /// current schema. Zero means "not yet annotated".
    pub annotator_count: u32,
}

/// Aggregate all records for one image into a [`ConsensusRecord`].
///
/// Records that no longer validate under the current schema are skipped
/// (schema drift between deployments), and annotators are deduplicated so
/// no one can be counted twice. An image with zero contributing
/// annotators still yields a record: every question `NoConsensus`, count 0.
pub fn aggregate(schema: &Schema, image_id: &str, records: &[AnnotationRecord]) -> ConsensusRecord {
    // Deduplicate by annotator, keeping the newest submission. The store
    // already guarantees one record per (annotator, image); this keeps the
    // result well-defined even if a caller passes raw duplicates.
    let mut contributing: BTreeMap<&str, &AnnotationRecord> = BTreeMap::new();
    for record in records {
        if record.image_id != image_id || !schema.conforms(&record.answers) {
            continue;
        }
        contributing
            .entry(record.annotator_id.as_str())
            .and_modify(|existing| {
                if record.submitted_at > existing.submitted_at {
                    *existing = record;
                }
            })
            .or_insert(record);
    }
    let annotator_count = contributing.len() as u32;

    let mut questions = IndexMap::with_capacity(schema.len());
    for (key, def) in schema.iter() {
        let answers = contributing.values().filter_map(|r| r.answers.get(key));
        let consensus = match def.kind {
            QuestionKind::Single => {
                let (tally, winner) =
                    tally_votes(&def.options, answers.filter_map(choice_label));
                QuestionConsensus {
                    value: match winner {
                        Some(label) => ConsensusValue::Agreed(AnswerValue::Choice(label)),
                        None => ConsensusValue::NoConsensus,
                    },
                    tally,
                }
            }
            QuestionKind::Boolean => {
                let (tally, winner) = tally_votes(
                    &["false".to_string(), "true".to_string()],
                    answers.filter_map(bool_label),
                );
                QuestionConsensus {
                    value: match winner.as_deref() {
                        Some(label) => ConsensusValue::Agreed(AnswerValue::Bool(label == "true")),
                        None => ConsensusValue::NoConsensus,
                    },
                    tally,
                }
            }
            QuestionKind::Multi => majority_selection(&def.options, answers, annotator_count),
        };
        questions.insert(key.clone(), consensus);
    }

    ConsensusRecord {
        image_id: image_id.to_string(),
        questions,
        annotator_count,
    }
}

fn choice_label(value: &AnswerValue) -> Option<&str> {
    match value {
        AnswerValue::Choice(c) => Some(c.as_str()),
        _ => None,
    }
}

fn bool_label(value: &AnswerValue) -> Option<&str> {
    match value {
        AnswerValue::Bool(true) => Some("true"),
        AnswerValue::Bool(false) => Some("false"),
        _ => None,
    }
}

/// Tally votes over a fixed label universe and pick a strict-max winner.
///
/// Returns the full tally (zero-vote labels included) and the winning
/// label, if any. A label wins only with a strictly highest, non-zero
/// count; any tie for the maximum means no winner.
fn tally_votes<'a>(
    labels: &[String],
    votes: impl Iterator<Item = &'a str>,
) -> (BTreeMap<String, u32>, Option<String>) {
    let mut tally: BTreeMap<String, u32> =
        labels.iter().map(|l| (l.clone(), 0)).collect();
    for vote in votes {
        *tally.entry(vote.to_string()).or_insert(0) += 1;
    }

    let max = tally.values().copied().max().unwrap_or(0);
    let mut leaders = tally
        .iter()
        .filter(|(_, &count)| count == max)
        .map(|(label, _)| label.clone());
    let winner = match (max, leaders.next(), leaders.next()) {
        (0, _, _) => None,
        (_, Some(label), None) => Some(label),
        _ => None,
    };

    (tally, winner)
}

/// Per-option strict-majority vote for multi-select questions.
///
/// Each option is an independent binary vote: it enters the consensus set
/// iff more than half of the contributing annotators selected it.
/// Annotators can agree on some options and disagree on others, so voting
/// over whole sets would throw that partial agreement away.
fn majority_selection<'a>(
    options: &[String],
    answers: impl Iterator<Item = &'a AnswerValue>,
    annotator_count: u32,
) -> QuestionConsensus {
    let mut tally: BTreeMap<String, u32> =
        options.iter().map(|o| (o.clone(), 0)).collect();
    for answer in answers {
        if let AnswerValue::Selection(selection) = answer {
            for opt in selection {
                *tally.entry(opt.clone()).or_insert(0) += 1;
            }
        }
    }

    if annotator_count == 0 {
        return QuestionConsensus {
            value: ConsensusValue::NoConsensus,
            tally,
        };
    }

    let selected: BTreeSet<String> = tally
        .iter()
        .filter(|(_, &count)| count * 2 > annotator_count)
        .map(|(opt, _)| opt.clone())
        .collect();

    QuestionConsensus {
        value: ConsensusValue::Agreed(AnswerValue::Selection(selected)),
        tally,
    }
}
