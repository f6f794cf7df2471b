pub mod content_llm;

pub use content_llm::OpenAiContentAdapter;
