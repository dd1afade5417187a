pub mod adapter;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod providers;

pub use adapter::InferenceAdapter;
pub use llm::LlmClient;
pub use providers::HttpProvider;
