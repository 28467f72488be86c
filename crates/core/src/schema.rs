//! Question schema and answer validation.
//!
//! The schema is an ordered mapping from question key to question
//! definition. Order matters twice: it drives the order questions are
//! presented in, and it makes validation errors deterministic (the first
//! violating question in declaration order is reported).
//!
//! The schema is loaded once per server session and treated as immutable,
//! but it may differ between deployments. Stored answers are therefore
//! re-checked against the *current* schema at read time (see
//! [`Schema::conforms`]), never only at write time.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::answer::{AnswerSet, AnswerValue};
use crate::error::CoreError;

/// The answer shape a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one value from `options`.
    Single,
    /// A non-empty subset of `options`.
    Multi,
    /// Exactly `true` or `false`; `options` is unused.
    Boolean,
}

/// Definition of a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDef {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Allowed values for `single`/`multi` questions. Ignored for booleans.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The ordered question schema for one deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    questions: IndexMap<String, QuestionDef>,
}

impl Schema {
    pub fn new(questions: IndexMap<String, QuestionDef>) -> Self {
        Self { questions }
    }

    /// Parse a schema from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Iterate questions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &QuestionDef)> {
        self.questions.iter()
    }

    pub fn get(&self, key: &str) -> Option<&QuestionDef> {
        self.questions.get(key)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Validate a raw submitted answer payload against this schema.
    ///
    /// The payload must be a JSON object. Every question in the schema must
    /// be answered with a type-conforming value; the first violation (in
    /// schema declaration order) is returned as
    /// [`CoreError::Validation`]. Keys not present in the schema are
    /// ignored and dropped, so clients built against a larger, older
    /// schema keep working.
    ///
    /// On success, returns the normalized [`AnswerSet`] containing exactly
    /// the schema's question keys. Partial answer sets are never produced.
    pub fn validate(&self, answers: &serde_json::Value) -> Result<AnswerSet, CoreError> {
        let obj = answers.as_object().ok_or_else(|| {
            CoreError::validation("", "answers must be a JSON object")
        })?;

        let mut normalized = AnswerSet::new();
        for (key, def) in &self.questions {
            let value = match obj.get(key) {
                Some(v) if !v.is_null() => v,
                _ => return Err(CoreError::validation(key, "an answer is required")),
            };
            let answer = Self::check_question(key, def, value)?;
            normalized.insert(key.clone(), answer);
        }
        Ok(normalized)
    }

    /// Check whether an already-typed answer set still conforms to this
    /// schema.
    ///
    /// Used at read time: records written under an older schema may no
    /// longer be valid, and such records must not count as progress or
    /// contribute to consensus.
    pub fn conforms(&self, answers: &AnswerSet) -> bool {
        self.questions.iter().all(|(key, def)| {
            answers
                .get(key)
                .is_some_and(|value| Self::value_conforms(def, value))
        })
    }

    fn check_question(
        key: &str,
        def: &QuestionDef,
        value: &serde_json::Value,
    ) -> Result<AnswerValue, CoreError> {
        match def.kind {
            QuestionKind::Single => {
                let choice = value.as_str().ok_or_else(|| {
                    CoreError::validation(key, "expected a single choice")
                })?;
                if !def.options.iter().any(|o| o == choice) {
                    return Err(CoreError::validation(
                        key,
                        format!("'{choice}' is not one of the allowed options"),
                    ));
                }
                Ok(AnswerValue::Choice(choice.to_string()))
            }
            QuestionKind::Multi => {
                let items = value.as_array().ok_or_else(|| {
                    CoreError::validation(key, "expected a list of selected options")
                })?;
                if items.is_empty() {
                    return Err(CoreError::validation(
                        key,
                        "at least one option must be selected",
                    ));
                }
                let mut selection = BTreeSet::new();
                for item in items {
                    let opt = item.as_str().ok_or_else(|| {
                        CoreError::validation(key, "selections must be strings")
                    })?;
                    if !def.options.iter().any(|o| o == opt) {
                        return Err(CoreError::validation(
                            key,
                            format!("'{opt}' is not one of the allowed options"),
                        ));
                    }
                    selection.insert(opt.to_string());
                }
                Ok(AnswerValue::Selection(selection))
            }
            QuestionKind::Boolean => {
                let flag = value.as_bool().ok_or_else(|| {
                    CoreError::validation(key, "expected true or false")
                })?;
                Ok(AnswerValue::Bool(flag))
            }
        }
    }

    fn value_conforms(def: &QuestionDef, value: &AnswerValue) -> bool {
        match (def.kind, value) {
            (QuestionKind::Single, AnswerValue::Choice(choice)) => {
                def.options.iter().any(|o| o == choice)
            }
            (QuestionKind::Multi, AnswerValue::Selection(selection)) => {
                !selection.is_empty()
                    && selection.iter().all(|s| def.options.iter().any(|o| o == s))
            }
            (QuestionKind::Boolean, AnswerValue::Bool(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn test_schema() -> Schema {
        Schema::from_json_str(
            r#"{
                "cell_types": { "type": "multi", "options": ["B", "T", "Ki67"] },
                "density": { "type": "single", "options": ["high", "moderate", "low"] },
                "gc_like": { "type": "boolean" }
            }"#,
        )
        .unwrap()
    }

    fn valid_answers() -> serde_json::Value {
        json!({
            "cell_types": ["B", "T"],
            "density": "high",
            "gc_like": false
        })
    }

    // -- parsing -----------------------------------------------------------

    #[test]
    fn schema_preserves_declaration_order() {
        let schema = test_schema();
        let keys: Vec<&String> = schema.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["cell_types", "density", "gc_like"]);
    }

    #[test]
    fn boolean_question_needs_no_options() {
        let schema = test_schema();
        assert!(schema.get("gc_like").unwrap().options.is_empty());
    }

    // -- validate: acceptance ----------------------------------------------

    #[test]
    fn fully_answered_set_accepted() {
        let schema = test_schema();
        let normalized = schema.validate(&valid_answers()).unwrap();
        assert_eq!(normalized.len(), 3);
        assert_eq!(
            normalized.get("density"),
            Some(&AnswerValue::Choice("high".into()))
        );
    }

    #[test]
    fn extra_keys_are_dropped_not_stored() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers["retired_question"] = json!("whatever");
        let normalized = schema.validate(&answers).unwrap();
        assert!(!normalized.contains_key("retired_question"));
        assert_eq!(normalized.len(), 3);
    }

    #[test]
    fn multi_selection_order_does_not_matter() {
        let schema = test_schema();
        let a = schema
            .validate(&json!({"cell_types": ["T", "B"], "density": "low", "gc_like": true}))
            .unwrap();
        let b = schema
            .validate(&json!({"cell_types": ["B", "T"], "density": "low", "gc_like": true}))
            .unwrap();
        assert_eq!(a.get("cell_types"), b.get("cell_types"));
    }

    // -- validate: rejection -----------------------------------------------

    #[test]
    fn missing_question_rejected() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers.as_object_mut().unwrap().remove("density");
        let err = schema.validate(&answers).unwrap_err();
        assert_matches!(err, CoreError::Validation { question, .. } if question == "density");
    }

    #[test]
    fn null_answer_rejected() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers["gc_like"] = json!(null);
        let err = schema.validate(&answers).unwrap_err();
        assert_matches!(err, CoreError::Validation { question, .. } if question == "gc_like");
    }

    #[test]
    fn unknown_single_option_rejected() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers["density"] = json!("extreme");
        let err = schema.validate(&answers).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation { question, reason }
                if question == "density" && reason.contains("extreme")
        );
    }

    #[test]
    fn empty_multi_selection_rejected() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers["cell_types"] = json!([]);
        let err = schema.validate(&answers).unwrap_err();
        assert_matches!(err, CoreError::Validation { question, .. } if question == "cell_types");
    }

    #[test]
    fn unknown_multi_option_rejected() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers["cell_types"] = json!(["B", "NK"]);
        assert!(schema.validate(&answers).is_err());
    }

    #[test]
    fn boolean_as_string_rejected() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers["gc_like"] = json!("true");
        let err = schema.validate(&answers).unwrap_err();
        assert_matches!(err, CoreError::Validation { question, .. } if question == "gc_like");
    }

    #[test]
    fn single_as_array_rejected() {
        let schema = test_schema();
        let mut answers = valid_answers();
        answers["density"] = json!(["high"]);
        assert!(schema.validate(&answers).is_err());
    }

    #[test]
    fn non_object_payload_rejected() {
        let schema = test_schema();
        assert!(schema.validate(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn first_violation_follows_schema_order() {
        // Both cell_types and gc_like are invalid; cell_types is declared
        // first so it must be the one reported.
        let schema = test_schema();
        let answers = json!({"cell_types": [], "density": "high", "gc_like": "nope"});
        let err = schema.validate(&answers).unwrap_err();
        assert_matches!(err, CoreError::Validation { question, .. } if question == "cell_types");
    }

    // -- conforms (read-time re-check) -------------------------------------

    #[test]
    fn stored_answers_conform_to_same_schema() {
        let schema = test_schema();
        let normalized = schema.validate(&valid_answers()).unwrap();
        assert!(schema.conforms(&normalized));
    }

    #[test]
    fn stored_answers_fail_conformance_after_schema_drift() {
        let schema = test_schema();
        let normalized = schema.validate(&valid_answers()).unwrap();

        // A later deployment renames an option out from under the record.
        let drifted = Schema::from_json_str(
            r#"{
                "cell_types": { "type": "multi", "options": ["B", "T", "Ki67"] },
                "density": { "type": "single", "options": ["dense", "sparse"] },
                "gc_like": { "type": "boolean" }
            }"#,
        )
        .unwrap();
        assert!(!drifted.conforms(&normalized));
    }

    #[test]
    fn conformance_fails_when_schema_gains_a_question() {
        let schema = test_schema();
        let normalized = schema.validate(&valid_answers()).unwrap();

        let grown = Schema::from_json_str(
            r#"{
                "cell_types": { "type": "multi", "options": ["B", "T", "Ki67"] },
                "density": { "type": "single", "options": ["high", "moderate", "low"] },
                "gc_like": { "type": "boolean" },
                "t_ring": { "type": "single", "options": ["none", "clear"] }
            }"#,
        )
        .unwrap();
        assert!(!grown.conforms(&normalized));
    }
}
