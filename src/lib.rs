pub mod analyzer;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod llm;
pub mod prompts;
pub mod tree;
pub mod types;

// Re-export commonly used types
pub use analyzer::{Analyzer, QuestionContext};
pub use cache::{AnalysisCaches, BoundedCache, CachedAnalysis};
pub use config::AppConfig;
pub use error::{RepolensError, Result};
pub use github::GithubClient;
pub use llm::{Generation, LlmClient, LlmConfig, UnavailableReason};
pub use tree::{build_file_tree, list_folder_paths};
pub use types::{Explanation, FileTreeNode, RepoAnalysis, RepoMeta, RepoRef, TreeEntry};
