// Summarization client layer

pub mod google;
pub mod prompts;
pub mod provider;

pub use google::GoogleAdapter;
pub use prompts::PromptVariant;
pub use provider::*;
