//! crates/tutor_core/src/views.rs
//!
//! State machines for the interactive view components and the pure rendering
//! of a view over a document. Rendering never mutates anything, so showing a
//! view twice over the same state yields the same content.

use crate::domain::{Carousel, EducationDocument, Flashcard, Scenario, SlideKind};
use serde::{Deserialize, Serialize};

const DEFAULT_CODE_LANGUAGE: &str = "javascript";

//=========================================================================================
// Tabs
//=========================================================================================

/// The five views of a learning module, in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Overview,
    Carousels,
    Flashcards,
    Scenarios,
    Glossary,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Carousels,
        Tab::Flashcards,
        Tab::Scenarios,
        Tab::Glossary,
    ];
}

//=========================================================================================
// Carousel
//=========================================================================================

/// Current slide of a carousel. Navigation wraps around at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarouselCursor {
    index: usize,
    len: usize,
}

impl CarouselCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn previous(&mut self) {
        if self.len > 0 {
            self.index = if self.index == 0 { self.len - 1 } else { self.index - 1 };
        }
    }

    /// Jumps to `index`; out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.index = index;
            true
        } else {
            false
        }
    }
}

//=========================================================================================
// Flashcard
//=========================================================================================

/// Flip and progressive-reveal state of one flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlashcardState {
    flipped: bool,
    visible_level: usize,
    levels: usize,
}

impl FlashcardState {
    pub fn new(levels: usize) -> Self {
        Self {
            flipped: false,
            visible_level: 0,
            levels,
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn visible_level(&self) -> usize {
        self.visible_level
    }

    /// Turns the card over. Either way the reveal starts again from the first level.
    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
        self.visible_level = 0;
    }

    pub fn can_reveal_more(&self) -> bool {
        self.visible_level + 1 < self.levels
    }

    pub fn reveal_more(&mut self) {
        if self.can_reveal_more() {
            self.visible_level += 1;
        }
    }
}

/// Icon family chosen from a flashcard's free-text hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    Lock,
    Link,
    Branch,
    Cube,
    Document,
    Info,
}

impl IconKind {
    /// Classifies by the first word of the hint, case-insensitively.
    pub fn from_hint(hint: &str) -> Self {
        let first = hint
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match first.as_str() {
            "lock" | "security" | "private" | "key" => IconKind::Lock,
            "bridge" | "link" | "connection" | "interoperability" => IconKind::Link,
            "tree" | "branch" | "fork" => IconKind::Branch,
            "block" | "cube" | "package" | "node" => IconKind::Cube,
            "contract" | "document" | "file" | "script" => IconKind::Document,
            _ => IconKind::Info,
        }
    }
}

//=========================================================================================
// Scenario
//=========================================================================================

/// Current step of a scenario. Navigation clamps at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioCursor {
    step: usize,
    len: usize,
}

impl ScenarioCursor {
    pub fn new(len: usize) -> Self {
        Self { step: 0, len }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn has_previous(&self) -> bool {
        self.step > 0
    }

    pub fn has_next(&self) -> bool {
        self.step + 1 < self.len
    }

    pub fn next(&mut self) {
        if self.has_next() {
            self.step += 1;
        }
    }

    pub fn previous(&mut self) {
        if self.has_previous() {
            self.step -= 1;
        }
    }
}

//=========================================================================================
// Per-document component state
//=========================================================================================

/// One state value per interactive component of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStates {
    pub carousels: Vec<CarouselCursor>,
    pub flashcards: Vec<FlashcardState>,
    pub scenarios: Vec<ScenarioCursor>,
}

impl ViewStates {
    /// Fresh state for every component: first slide, front side, first step.
    pub fn for_document(document: &EducationDocument) -> Self {
        Self {
            carousels: document
                .carousels
                .iter()
                .map(|c| CarouselCursor::new(c.slides.len()))
                .collect(),
            flashcards: document
                .flashcards
                .iter()
                .map(|f| FlashcardState::new(f.explanations.len()))
                .collect(),
            scenarios: document
                .scenarios
                .iter()
                .map(|s| ScenarioCursor::new(s.steps.len()))
                .collect(),
        }
    }
}

//=========================================================================================
// Rendering
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub language: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarouselFrame {
    pub title: String,
    pub kind: SlideKind,
    pub slide_title: String,
    /// Plain text content; empty for code slides, whose content is in `code`.
    pub content: String,
    pub code: Option<CodeBlock>,
    pub diagram: Option<String>,
    /// "current / total", one-based.
    pub position: String,
    pub slide_index: usize,
    pub slide_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealedExplanation {
    pub level: crate::domain::ExplanationLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashcardFace {
    pub term: String,
    pub icon: IconKind,
    pub flipped: bool,
    /// Explanations up to the current reveal level; empty while face up.
    pub explanations: Vec<RevealedExplanation>,
    pub can_reveal_more: bool,
    pub code_example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioFrame {
    pub title: String,
    /// "Step i of n: title".
    pub heading: String,
    pub content: String,
    pub code: Option<CodeBlock>,
    pub step_index: usize,
    pub step_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryItem {
    pub term: String,
    pub definition: String,
}

/// A view rendered over a document, ready to be serialized to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderedView {
    Overview {
        project_name: String,
        summary: String,
        key_concepts: Vec<String>,
    },
    Carousels { carousels: Vec<CarouselFrame> },
    Flashcards { flashcards: Vec<FlashcardFace> },
    Scenarios { scenarios: Vec<ScenarioFrame> },
    Glossary { entries: Vec<GlossaryItem> },
}

pub fn render_carousel(carousel: &Carousel, cursor: &CarouselCursor) -> Option<CarouselFrame> {
    let slide = carousel.slides.get(cursor.index())?;
    let (content, code) = if slide.kind == SlideKind::Code {
        let language = slide
            .code_language
            .as_deref()
            .filter(|language| !language.is_empty())
            .unwrap_or(DEFAULT_CODE_LANGUAGE)
            .to_string();
        (
            String::new(),
            Some(CodeBlock {
                language,
                source: slide.content.clone(),
            }),
        )
    } else {
        (slide.content.clone(), None)
    };
    Some(CarouselFrame {
        title: carousel.title.clone(),
        kind: slide.kind,
        slide_title: slide.title.clone(),
        content,
        code,
        diagram: slide.diagram.clone(),
        position: format!("{} / {}", cursor.index() + 1, carousel.slides.len()),
        slide_index: cursor.index(),
        slide_count: carousel.slides.len(),
    })
}

pub fn render_flashcard(card: &Flashcard, state: &FlashcardState) -> FlashcardFace {
    let explanations = if state.is_flipped() {
        card.explanations
            .iter()
            .take(state.visible_level() + 1)
            .map(|e| RevealedExplanation {
                level: e.level,
                text: e.text.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };
    FlashcardFace {
        term: card.term.clone(),
        icon: IconKind::from_hint(&card.icon),
        flipped: state.is_flipped(),
        explanations,
        can_reveal_more: state.is_flipped() && state.can_reveal_more(),
        code_example: card.code_example.clone(),
    }
}

pub fn render_scenario(scenario: &Scenario, cursor: &ScenarioCursor) -> Option<ScenarioFrame> {
    let step = scenario.steps.get(cursor.step())?;
    Some(ScenarioFrame {
        title: scenario.title.clone(),
        heading: format!(
            "Step {} of {}: {}",
            cursor.step() + 1,
            scenario.steps.len(),
            step.title
        ),
        content: step.content.clone(),
        code: step
            .code
            .as_ref()
            .filter(|source| !source.is_empty())
            .map(|source| CodeBlock {
                language: DEFAULT_CODE_LANGUAGE.to_string(),
                source: source.clone(),
            }),
        step_index: cursor.step(),
        step_count: scenario.steps.len(),
        has_previous: cursor.has_previous(),
        has_next: cursor.has_next(),
    })
}

/// Renders `tab` over `document` using the given component states.
pub fn render(document: &EducationDocument, tab: Tab, states: &ViewStates) -> RenderedView {
    match tab {
        Tab::Overview => RenderedView::Overview {
            project_name: document.project_name.clone(),
            summary: document.overview.summary.clone(),
            key_concepts: document.overview.key_concepts.clone(),
        },
        Tab::Carousels => RenderedView::Carousels {
            carousels: document
                .carousels
                .iter()
                .zip(&states.carousels)
                .filter_map(|(c, cursor)| render_carousel(c, cursor))
                .collect(),
        },
        Tab::Flashcards => RenderedView::Flashcards {
            flashcards: document
                .flashcards
                .iter()
                .zip(&states.flashcards)
                .map(|(f, state)| render_flashcard(f, state))
                .collect(),
        },
        Tab::Scenarios => RenderedView::Scenarios {
            scenarios: document
                .scenarios
                .iter()
                .zip(&states.scenarios)
                .filter_map(|(s, cursor)| render_scenario(s, cursor))
                .collect(),
        },
        Tab::Glossary => RenderedView::Glossary {
            entries: document
                .glossary
                .iter()
                .map(|g| GlossaryItem {
                    term: g.term.clone(),
                    definition: g.definition.clone(),
                })
                .collect(),
        },
    }
}
