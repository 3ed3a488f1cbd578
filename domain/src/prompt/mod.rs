//! Prompt construction for every upstream model call

pub mod template;

pub use template::PromptTemplate;
