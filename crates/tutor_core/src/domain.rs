//! crates/tutor_core/src/domain.rs
//!
//! Defines the core data structures of a generated learning module.
//! Field names mirror the JSON contract with the generative service
//! (camelCase), so a reply deserializes into these types verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One complete generation result for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationDocument {
    pub project_name: String,
    pub overview: Overview,
    pub carousels: Vec<Carousel>,
    pub flashcards: Vec<Flashcard>,
    pub scenarios: Vec<Scenario>,
    pub glossary: Vec<GlossaryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub summary: String,
    pub key_concepts: Vec<String>,
}

/// One concept's guided slide sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carousel {
    pub title: String,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(rename = "type")]
    pub kind: SlideKind,
    pub title: String,
    pub content: String,
    /// Optional Mermaid.js diagram source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
}

/// The role a slide plays in a carousel. Declaration order is the order
/// slides are expected to appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Definition,
    Analogy,
    Technical,
    Code,
    Usecase,
}

impl SlideKind {
    pub const SEQUENCE: [SlideKind; 5] = [
        SlideKind::Definition,
        SlideKind::Analogy,
        SlideKind::Technical,
        SlideKind::Code,
        SlideKind::Usecase,
    ];
}

/// A term card with progressively deeper explanations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub term: String,
    /// Free-text icon hint, e.g. "Lock" or "Bridge".
    pub icon: String,
    pub explanations: Vec<Explanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub level: ExplanationLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplanationLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExplanationLevel {
    pub const SEQUENCE: [ExplanationLevel; 3] = [
        ExplanationLevel::Beginner,
        ExplanationLevel::Intermediate,
        ExplanationLevel::Advanced,
    ];
}

/// A guided narrative walked through step by step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

impl EducationDocument {
    /// Checks the shape the prompt asks for: 2-3 carousels of five slides in
    /// canonical order, and three explanation levels per flashcard in order.
    ///
    /// The service is not forced to honour these rules, so this is a quality
    /// probe rather than a validation step.
    pub fn follows_generation_rules(&self) -> bool {
        let carousels_ok = (2..=3).contains(&self.carousels.len())
            && self.carousels.iter().all(|c| {
                c.slides
                    .iter()
                    .map(|s| s.kind)
                    .eq(SlideKind::SEQUENCE.iter().copied())
            });
        let flashcards_ok = self.flashcards.iter().all(|f| {
            f.explanations
                .iter()
                .map(|e| e.level)
                .eq(ExplanationLevel::SEQUENCE.iter().copied())
        });
        carousels_ok && flashcards_ok
    }
}

/// A document held by the shell, tagged so clients can tell generations apart.
#[derive(Debug, Clone, Serialize)]
pub struct LearningModule {
    pub id: Uuid,
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub document: EducationDocument,
}

impl LearningModule {
    pub fn new(topic: impl Into<String>, document: EducationDocument) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            generated_at: Utc::now(),
            document,
        }
    }
}
