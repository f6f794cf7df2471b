//! crates/tutor_core/src/pipeline.rs
//!
//! The content request pipeline: builds the instruction prompt for a topic,
//! sends it with the output schema through the `ContentGenerator` port and
//! turns the raw reply into a checked `EducationDocument`.

const PROMPT_TEMPLATE: &str = r#"You are a world-class Web3 technical educator. Study the Web3 project or concept "{topic}" and produce a complete set of learning materials as one JSON object that strictly follows the provided schema. Break complex ideas into digestible, engaging, multi-layered content that suits different learning styles.

Instructions:
1. Analyze the core concepts: understand the architecture, key technical aspects and purpose of "{topic}".
2. Return structured JSON: a single, complete object matching the schema. No prose outside the JSON.
3. Build these learning modules:
   - Overview: a concise summary plus a list of the most important concepts.
   - Carousels: pick 2-3 core concepts and write exactly 5 slides for each, in this order: definition, real-world analogy, technical breakdown, code example (where applicable), use case.
   - Flashcards: 4-6 cards for key terms. Every card has exactly three explanations, in this order: Beginner (explain like I'm five), Intermediate (for a developer), Advanced (deep technical detail).
   - Scenarios: 1-2 narrative scenarios that walk the learner through solving a problem related to the topic.
   - Glossary: important terms with short, simple definitions.
4. Quality: keep everything accurate and clear. Analogies should be simple and intuitive, technical explanations precise, code examples short and relevant.

Example of a good analogy for "Smart Contract": a smart contract works like a digital vending machine. You insert a specific coin and the machine is programmed to hand over a specific snack, with nobody operating it. The rules live inside the machine and cannot be changed.

Now generate the complete educational module for "{topic}"."#;

use crate::domain::EducationDocument;
use crate::ports::{ContentGenerator, PortError};
use crate::topic::TopicQuery;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// The one message users see for any failed generation, whatever the cause.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate content. The model may be unavailable or the request was blocked. Please try again later.";

//=========================================================================================
// Error Type
//=========================================================================================

/// Any failure to turn a topic into a document.
///
/// The variants exist for logs and diagnostics only; callers facing a user
/// should show `user_message()`, which is the same for every cause.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generative service call failed: {0}")]
    Service(#[from] PortError),
    #[error("Reply is not a valid document: {0}")]
    MalformedReply(#[from] serde_json::Error),
    #[error("Generated content is missing required fields: {0}")]
    Incomplete(&'static str),
}

impl GenerationError {
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILED_MESSAGE
    }
}

//=========================================================================================
// Prompt and Schema
//=========================================================================================

/// Interpolates the topic, verbatim, into the instruction template.
pub fn build_prompt(topic: &TopicQuery) -> String {
    PROMPT_TEMPLATE.replace("{topic}", topic.as_str())
}

/// The declarative output schema sent alongside every prompt.
pub fn response_schema() -> Value {
    let nullable_string = json!({ "type": ["string", "null"] });
    json!({
        "type": "object",
        "properties": {
            "projectName": { "type": "string" },
            "overview": {
                "type": "object",
                "properties": {
                    "summary": { "type": "string" },
                    "keyConcepts": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["summary", "keyConcepts"]
            },
            "carousels": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "slides": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "type": {
                                        "type": "string",
                                        "enum": ["definition", "analogy", "technical", "code", "usecase"]
                                    },
                                    "title": { "type": "string" },
                                    "content": { "type": "string" },
                                    "diagram": {
                                        "type": ["string", "null"],
                                        "description": "Optional: A Mermaid.js syntax diagram if applicable."
                                    },
                                    "codeLanguage": nullable_string
                                },
                                "required": ["type", "title", "content"]
                            }
                        }
                    },
                    "required": ["title", "slides"]
                }
            },
            "flashcards": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "term": { "type": "string" },
                        "icon": {
                            "type": "string",
                            "description": "A simple noun to represent the term, e.g., 'Lock', 'Bridge', 'Tree'"
                        },
                        "explanations": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "level": {
                                        "type": "string",
                                        "enum": ["Beginner", "Intermediate", "Advanced"]
                                    },
                                    "text": { "type": "string" }
                                },
                                "required": ["level", "text"]
                            }
                        },
                        "codeExample": nullable_string
                    },
                    "required": ["term", "icon", "explanations"]
                }
            },
            "scenarios": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "steps": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "title": { "type": "string" },
                                    "content": { "type": "string" },
                                    "code": nullable_string
                                },
                                "required": ["title", "content"]
                            }
                        }
                    },
                    "required": ["title", "steps"]
                }
            },
            "glossary": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "term": { "type": "string" },
                        "definition": { "type": "string" }
                    },
                    "required": ["term", "definition"]
                }
            }
        },
        "required": ["projectName", "overview", "carousels", "flashcards", "scenarios", "glossary"]
    })
}

//=========================================================================================
// Reply Parsing
//=========================================================================================

/// Parses a raw service reply into a document.
///
/// The shallow check (project name, non-empty carousels) runs on the untyped
/// value first so those failures are reported as `Incomplete` rather than as a
/// deserialization error.
pub fn parse_reply(raw: &str) -> Result<EducationDocument, GenerationError> {
    let value: Value = serde_json::from_str(raw)?;

    match value.get("projectName").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => {}
        _ => return Err(GenerationError::Incomplete("projectName")),
    }
    match value.get("carousels").and_then(Value::as_array) {
        Some(carousels) if !carousels.is_empty() => {}
        _ => return Err(GenerationError::Incomplete("carousels")),
    }

    let document: EducationDocument = serde_json::from_value(value)?;

    // Views index into these sequences.
    if document.carousels.iter().any(|c| c.slides.is_empty()) {
        return Err(GenerationError::Incomplete("carousel slides"));
    }
    if document.scenarios.iter().any(|s| s.steps.is_empty()) {
        return Err(GenerationError::Incomplete("scenario steps"));
    }

    Ok(document)
}

//=========================================================================================
// The Pipeline
//=========================================================================================

/// Turns topics into documents through an injected generative service.
#[derive(Clone)]
pub struct ContentPipeline {
    generator: Arc<dyn ContentGenerator>,
    schema: Arc<Value>,
}

impl ContentPipeline {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            schema: Arc::new(response_schema()),
        }
    }

    /// Makes exactly one call to the generative service. No retries.
    pub async fn generate(&self, topic: &TopicQuery) -> Result<EducationDocument, GenerationError> {
        info!("Requesting educational content for topic '{}'", topic);
        let prompt = build_prompt(topic);

        let result = match self.generator.generate(&prompt, &self.schema).await {
            Ok(raw) => parse_reply(&raw),
            Err(e) => Err(GenerationError::from(e)),
        };

        match &result {
            Ok(document) => info!(
                "Generated '{}': {} carousels, {} flashcards, {} scenarios, {} glossary entries",
                document.project_name,
                document.carousels.len(),
                document.flashcards.len(),
                document.scenarios.len(),
                document.glossary.len()
            ),
            Err(e) => error!("Error generating content for '{}': {}", topic, e),
        }
        result
    }
}
