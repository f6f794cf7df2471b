pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod shell;
pub mod topic;
pub mod views;

pub use domain::{
    Carousel, EducationDocument, Explanation, ExplanationLevel, Flashcard, GlossaryEntry,
    LearningModule, Overview, Scenario, Slide, SlideKind, Step,
};
pub use pipeline::{ContentPipeline, GenerationError, GENERATION_FAILED_MESSAGE};
pub use ports::{ContentGenerator, PortError, PortResult};
pub use shell::{Shell, ShellError, ShellSnapshot, LOADING_MESSAGES};
pub use topic::{InputError, TopicQuery};
pub use views::{RenderedView, Tab};
