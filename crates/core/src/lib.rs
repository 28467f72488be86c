//! Domain logic for the ELS annotation backend.
//!
//! Everything in this crate is transport-agnostic: the question schema and
//! answer validation, per-annotator progress and next-image selection, and
//! cross-annotator consensus aggregation. Persistence is injected through
//! the [`store::ProgressStore`] trait so the API layer can run against
//! PostgreSQL or an in-memory map without touching any of the logic here.

pub mod answer;
pub mod consensus;
pub mod engine;
pub mod error;
pub mod schema;
pub mod selector;
pub mod store;
pub mod types;

pub use answer::{AnnotationRecord, AnswerSet, AnswerValue};
pub use consensus::{aggregate, ConsensusRecord, ConsensusValue, QuestionConsensus};
pub use engine::{AnnotationEngine, Progress};
pub use error::CoreError;
pub use schema::{QuestionDef, QuestionKind, Schema};
pub use selector::ImageSet;
pub use store::{MemoryStore, ProgressStore};
