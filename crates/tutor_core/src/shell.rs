//! crates/tutor_core/src/shell.rs
//!
//! The presentation shell: the single piece of application state a client
//! drives. Every change goes through an explicit transition method; the
//! async orchestration (calling the pipeline, running the status ticker)
//! lives with the caller.

use crate::domain::{EducationDocument, LearningModule};
use crate::pipeline::{GenerationError, GENERATION_FAILED_MESSAGE};
use crate::topic::{InputError, TopicQuery};
use crate::views::{
    render, render_carousel, render_flashcard, render_scenario, CarouselCursor, CarouselFrame,
    FlashcardFace, FlashcardState, RenderedView, ScenarioCursor, ScenarioFrame, Tab, ViewStates,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Messages cycled while a generation is pending. Display only.
pub const LOADING_MESSAGES: [&str; 7] = [
    "Analyzing project scope...",
    "Simulating documentation crawl...",
    "Extracting core concepts...",
    "Synthesizing knowledge graph...",
    "Generating ELI5 explanations...",
    "Constructing learning modules...",
    "Finalizing educational materials...",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("A learning module is already being generated")]
    Busy,
    #[error("No learning module has been generated yet")]
    NoModule,
    #[error("No {component} at index {index}")]
    IndexOutOfRange { component: &'static str, index: usize },
}

/// What a client needs to draw the shell chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellSnapshot {
    pub topic_input: String,
    pub loading: bool,
    pub loading_message: Option<String>,
    pub error: Option<String>,
    pub module_id: Option<Uuid>,
    pub project_name: Option<String>,
    pub active_view: Tab,
}

#[derive(Debug, Default)]
pub struct Shell {
    topic_input: String,
    loading: bool,
    loading_message: Option<String>,
    error: Option<String>,
    module: Option<LearningModule>,
    active_view: Tab,
    view_states: ViewStates,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn module(&self) -> Option<&LearningModule> {
        self.module.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loading_message(&self) -> Option<&str> {
        self.loading_message.as_deref()
    }

    pub fn active_view(&self) -> Tab {
        self.active_view
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot {
            topic_input: self.topic_input.clone(),
            loading: self.loading,
            loading_message: self.loading_message.clone(),
            error: self.error.clone(),
            module_id: self.module.as_ref().map(|m| m.id),
            project_name: self
                .module
                .as_ref()
                .map(|m| m.document.project_name.clone()),
            active_view: self.active_view,
        }
    }

    //=====================================================================================
    // Generation lifecycle
    //=====================================================================================

    /// Validates the submitted text and enters the loading state.
    ///
    /// On an input error the message is recorded and nothing else changes, so
    /// no outbound call must follow. On success the previous module is cleared
    /// up front; it is not restored if the generation fails.
    pub fn begin_request(&mut self, raw: &str) -> Result<TopicQuery, ShellError> {
        if self.loading {
            warn!("Rejected submission while a generation is pending");
            return Err(ShellError::Busy);
        }
        self.topic_input = raw.to_string();

        let topic = match TopicQuery::parse(raw) {
            Ok(topic) => topic,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.loading = true;
        self.loading_message = None;
        self.error = None;
        self.module = None;
        self.view_states = ViewStates::default();
        self.active_view = Tab::Overview;
        info!("Generation started for '{}'", topic);
        Ok(topic)
    }

    /// Updates the cosmetic status line. Ignored once the request has settled.
    pub fn set_loading_message(&mut self, message: &str) -> bool {
        if !self.loading {
            return false;
        }
        self.loading_message = Some(message.to_string());
        true
    }

    /// Settles the pending request with the pipeline's result.
    pub fn complete(
        &mut self,
        topic: TopicQuery,
        result: Result<EducationDocument, GenerationError>,
    ) -> Option<&LearningModule> {
        self.loading = false;
        self.loading_message = None;
        match result {
            Ok(document) => {
                self.view_states = ViewStates::for_document(&document);
                self.module = Some(LearningModule::new(topic.into_inner(), document));
                self.error = None;
            }
            Err(e) => {
                warn!("Generation for '{}' failed: {}", topic, e);
                self.error = Some(e.user_message().to_string());
                self.module = None;
                self.view_states = ViewStates::default();
            }
        }
        self.module.as_ref()
    }

    /// Settles a pending request whose worker died before reporting a result.
    /// Returns false if nothing was pending.
    pub fn abort(&mut self) -> bool {
        if !self.loading {
            return false;
        }
        self.loading = false;
        self.loading_message = None;
        self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
        self.module = None;
        self.view_states = ViewStates::default();
        true
    }

    /// "Analyze new topic": drops the current module and its view state.
    /// Refused while a generation is pending, since its result would land
    /// after the clear.
    pub fn reset(&mut self) -> Result<(), ShellError> {
        if self.loading {
            return Err(ShellError::Busy);
        }
        self.module = None;
        self.view_states = ViewStates::default();
        self.active_view = Tab::Overview;
        self.error = None;
        Ok(())
    }

    //=====================================================================================
    // Views
    //=====================================================================================

    /// Switches the active view. Leaving a view discards the interactive
    /// state of its components, so coming back starts them from the top.
    pub fn select_view(&mut self, tab: Tab) -> Result<RenderedView, ShellError> {
        if tab != self.active_view {
            if let Some(module) = &self.module {
                self.view_states = ViewStates::for_document(&module.document);
            }
        }
        self.active_view = tab;
        self.render_active()
    }

    pub fn render_active(&self) -> Result<RenderedView, ShellError> {
        let module = self.module.as_ref().ok_or(ShellError::NoModule)?;
        Ok(render(&module.document, self.active_view, &self.view_states))
    }

    pub fn carousel_next(&mut self, index: usize) -> Result<CarouselFrame, ShellError> {
        self.with_carousel(index, |cursor| cursor.next())
    }

    pub fn carousel_previous(&mut self, index: usize) -> Result<CarouselFrame, ShellError> {
        self.with_carousel(index, |cursor| cursor.previous())
    }

    pub fn carousel_go_to(&mut self, index: usize, slide: usize) -> Result<CarouselFrame, ShellError> {
        let mut in_range = true;
        let frame = self.with_carousel(index, |cursor| in_range = cursor.go_to(slide))?;
        if in_range {
            Ok(frame)
        } else {
            Err(ShellError::IndexOutOfRange {
                component: "slide",
                index: slide,
            })
        }
    }

    pub fn flashcard_flip(&mut self, index: usize) -> Result<FlashcardFace, ShellError> {
        self.with_flashcard(index, |state| state.flip())
    }

    pub fn flashcard_reveal(&mut self, index: usize) -> Result<FlashcardFace, ShellError> {
        self.with_flashcard(index, |state| state.reveal_more())
    }

    pub fn scenario_next(&mut self, index: usize) -> Result<ScenarioFrame, ShellError> {
        self.with_scenario(index, |cursor| cursor.next())
    }

    pub fn scenario_previous(&mut self, index: usize) -> Result<ScenarioFrame, ShellError> {
        self.with_scenario(index, |cursor| cursor.previous())
    }

    fn with_carousel(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut CarouselCursor),
    ) -> Result<CarouselFrame, ShellError> {
        let module = self.module.as_ref().ok_or(ShellError::NoModule)?;
        let out_of_range = ShellError::IndexOutOfRange {
            component: "carousel",
            index,
        };
        let carousel = module.document.carousels.get(index).ok_or(out_of_range.clone())?;
        let cursor = self.view_states.carousels.get_mut(index).ok_or(out_of_range.clone())?;
        f(cursor);
        render_carousel(carousel, cursor).ok_or(out_of_range)
    }

    fn with_flashcard(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut FlashcardState),
    ) -> Result<FlashcardFace, ShellError> {
        let module = self.module.as_ref().ok_or(ShellError::NoModule)?;
        let out_of_range = ShellError::IndexOutOfRange {
            component: "flashcard",
            index,
        };
        let card = module.document.flashcards.get(index).ok_or(out_of_range.clone())?;
        let state = self.view_states.flashcards.get_mut(index).ok_or(out_of_range)?;
        f(state);
        Ok(render_flashcard(card, state))
    }

    fn with_scenario(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut ScenarioCursor),
    ) -> Result<ScenarioFrame, ShellError> {
        let module = self.module.as_ref().ok_or(ShellError::NoModule)?;
        let out_of_range = ShellError::IndexOutOfRange {
            component: "scenario",
            index,
        };
        let scenario = module.document.scenarios.get(index).ok_or(out_of_range.clone())?;
        let cursor = self.view_states.scenarios.get_mut(index).ok_or(out_of_range.clone())?;
        f(cursor);
        render_scenario(scenario, cursor).ok_or(out_of_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse_reply;
    use crate::domain::SlideKind;

    fn document() -> EducationDocument {
        parse_reply(include_str!("../fixtures/uniswap_v3.json")).unwrap()
    }

    fn loaded_shell() -> Shell {
        let mut shell = Shell::new();
        let topic = shell.begin_request("Uniswap v3").unwrap();
        shell.complete(topic, Ok(document()));
        shell
    }

    #[test]
    fn input_errors_leave_shell_idle() {
        let mut shell = Shell::new();
        assert_eq!(
            shell.begin_request("ab"),
            Err(ShellError::Input(InputError::TooShort))
        );
        assert!(!shell.is_loading());
        assert_eq!(shell.error(), Some(InputError::TooShort.to_string().as_str()));
    }

    #[test]
    fn second_submission_while_pending_is_refused() {
        let mut shell = Shell::new();
        shell.begin_request("Solana").unwrap();
        assert_eq!(shell.begin_request("Ethereum"), Err(ShellError::Busy));
    }

    #[test]
    fn starting_a_request_clears_previous_module() {
        let mut shell = loaded_shell();
        shell.select_view(Tab::Glossary).unwrap();

        shell.begin_request("Solana").unwrap();
        assert!(shell.module().is_none());
        assert_eq!(shell.active_view(), Tab::Overview);
        assert!(shell.is_loading());
    }

    #[test]
    fn failure_sets_static_message_and_no_module() {
        let mut shell = Shell::new();
        let topic = shell.begin_request("Solana").unwrap();
        shell.set_loading_message(LOADING_MESSAGES[0]);

        let err = parse_reply("not json").unwrap_err();
        assert!(shell.complete(topic, Err(err)).is_none());
        assert_eq!(shell.error(), Some(GENERATION_FAILED_MESSAGE));
        assert!(!shell.is_loading());
        assert_eq!(shell.loading_message(), None);
    }

    #[test]
    fn loading_message_is_ignored_after_settle() {
        let mut shell = loaded_shell();
        assert!(!shell.set_loading_message(LOADING_MESSAGES[1]));
        assert_eq!(shell.loading_message(), None);
    }

    #[test]
    fn success_stores_module_with_topic() {
        let shell = loaded_shell();
        let module = shell.module().unwrap();
        assert_eq!(module.topic, "Uniswap v3");
        assert_eq!(shell.snapshot().project_name.as_deref(), Some("Uniswap v3"));
    }

    #[test]
    fn view_navigation_is_idempotent() {
        let mut shell = loaded_shell();
        let overview = shell.select_view(Tab::Overview).unwrap();
        shell.select_view(Tab::Glossary).unwrap();
        assert_eq!(shell.select_view(Tab::Overview).unwrap(), overview);
    }

    #[test]
    fn component_transitions_are_routed_by_index() {
        let mut shell = loaded_shell();
        let frame = shell.carousel_previous(1).unwrap();
        assert_eq!(frame.slide_index, 4);
        assert_eq!(frame.kind, SlideKind::Usecase);

        let face = shell.flashcard_flip(2).unwrap();
        assert!(face.flipped);
        let face = shell.flashcard_reveal(2).unwrap();
        assert_eq!(face.explanations.len(), 2);

        let step = shell.scenario_next(0).unwrap();
        assert_eq!(step.step_index, 1);

        assert_eq!(
            shell.carousel_next(7),
            Err(ShellError::IndexOutOfRange { component: "carousel", index: 7 })
        );
        assert_eq!(
            shell.carousel_go_to(0, 9),
            Err(ShellError::IndexOutOfRange { component: "slide", index: 9 })
        );
    }

    #[test]
    fn reset_drops_module() {
        let mut shell = loaded_shell();
        shell.reset().unwrap();
        assert!(shell.module().is_none());
        assert_eq!(shell.render_active(), Err(ShellError::NoModule));
        assert_eq!(shell.flashcard_flip(0), Err(ShellError::NoModule));
    }

    #[test]
    fn reset_is_refused_while_pending() {
        let mut shell = loaded_shell();
        let topic = shell.begin_request("Solana").unwrap();
        assert_eq!(shell.reset(), Err(ShellError::Busy));
        assert!(shell.is_loading());

        shell.complete(topic, Ok(document()));
        shell.reset().unwrap();
        assert!(shell.module().is_none());
    }

    #[test]
    fn abort_settles_pending_request() {
        let mut shell = Shell::new();
        shell.begin_request("Solana").unwrap();
        shell.set_loading_message(LOADING_MESSAGES[2]);

        assert!(shell.abort());
        assert!(!shell.is_loading());
        assert_eq!(shell.loading_message(), None);
        assert_eq!(shell.error(), Some(GENERATION_FAILED_MESSAGE));
        assert!(shell.begin_request("Solana").is_ok());
    }

    #[test]
    fn abort_is_a_no_op_when_idle() {
        let mut shell = loaded_shell();
        assert!(!shell.abort());
        assert!(shell.module().is_some());
        assert_eq!(shell.error(), None);
    }

    #[test]
    fn leaving_a_view_resets_its_components() {
        let mut shell = loaded_shell();
        shell.select_view(Tab::Carousels).unwrap();
        shell.carousel_next(0).unwrap();
        shell.flashcard_flip(1).unwrap();
        shell.scenario_next(0).unwrap();

        // Same tab again keeps the state.
        shell.select_view(Tab::Carousels).unwrap();
        assert_eq!(shell.carousel_next(0).unwrap().slide_index, 2);

        shell.select_view(Tab::Glossary).unwrap();
        shell.select_view(Tab::Carousels).unwrap();
        assert_eq!(shell.carousel_next(0).unwrap().slide_index, 1);
        assert!(shell.flashcard_flip(1).unwrap().flipped);
        assert_eq!(shell.scenario_next(0).unwrap().step_index, 1);
    }
}
