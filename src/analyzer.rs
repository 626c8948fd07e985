//! Orchestrates the four analysis operations: analyze a repository, explain
//! a folder, explain a file, answer a question.
//!
//! Every LLM miss degrades to a fixed instructional fallback string; the
//! contract is best-effort, never all-or-nothing. GitHub failures for
//! metadata and tree fetches do propagate, since nothing useful can be said
//! without them.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::cache::{AnalysisCaches, CachedAnalysis};
use crate::error::Result;
use crate::github::GithubClient;
use crate::llm::LlmClient;
use crate::prompts;
use crate::tree::{build_file_tree, list_folder_paths};
use crate::types::{Explanation, RepoAnalysis, RepoMeta, RepoRef};

pub const MAX_FOLDER_SUMMARIES: usize = 25;
pub const MAX_SAMPLE_FILES: usize = 40;
pub const MAX_FILE_CHARS: usize = 12000;
pub const MAX_RELEVANT_FILES: usize = 30;

/// Root manifests tried for the overview prompt, first non-empty wins.
const MANIFEST_CANDIDATES: &[&str] = &["package.json", "Cargo.toml", "pyproject.toml", "go.mod"];

const FALLBACK_OVERVIEW: &str =
    "LLM is not configured. Set OPENROUTER_API_KEY to enable repository analysis.";
const FALLBACK_FOLDER: &str =
    "LLM is not configured. Set OPENROUTER_API_KEY to enable folder summaries.";
const FALLBACK_FILE: &str =
    "LLM is not configured. Set OPENROUTER_API_KEY to enable file explanations.";
const FALLBACK_ANSWER: &str =
    "LLM is not configured. Set OPENROUTER_API_KEY to enable question answering.";

/// Caller-supplied context for `answer_question`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct QuestionContext {
    #[serde(default)]
    pub overview: Option<String>,
}

pub struct Analyzer {
    github: GithubClient,
    llm: LlmClient,
    caches: AnalysisCaches,
}

impl Analyzer {
    pub fn new(github: GithubClient, llm: LlmClient) -> Self {
        Self::with_caches(github, llm, AnalysisCaches::default())
    }

    pub fn with_caches(github: GithubClient, llm: LlmClient, caches: AnalysisCaches) -> Self {
        Self { github, llm, caches }
    }

    /// Full repository analysis: overview plus one summary per folder, up to
    /// `MAX_FOLDER_SUMMARIES` in pre-order. Cached per `owner/repo` for the
    /// process lifetime.
    pub async fn analyze(&self, repo_url: &str) -> Result<RepoAnalysis> {
        let repo = GithubClient::parse_repo_url(repo_url)?;
        let repo_key = repo.cache_key();

        if let Some(cached) = self.caches.analyses.get(&repo_key) {
            debug!(repo = %repo, "analysis cache hit");
            return Ok(cached.result);
        }

        info!(repo = %repo, "analyzing repository");
        let meta = self.github.fetch_meta(&repo).await?;
        let file_paths = self.fetch_blob_paths(&repo, &meta).await?;
        let tree = build_file_tree(&file_paths);
        let folder_paths = list_folder_paths(&tree);

        let readme = self.github.fetch_readme(&repo).await;
        let manifest = self.fetch_manifest(&repo).await;

        let overview_content = self
            .llm
            .generate(&prompts::overview_prompt(&meta, &readme, &manifest, &folder_paths))
            .await
            .text_or(FALLBACK_OVERVIEW);
        let overview = Explanation::new("Repository Overview", overview_content);

        // One prompt per folder, issued sequentially, keyed in pre-order.
        let mut folders = IndexMap::new();
        for folder_path in folder_paths.iter().take(MAX_FOLDER_SUMMARIES) {
            let sample_files = sample_files_under(&file_paths, folder_path);
            let content = self
                .llm
                .generate(&prompts::folder_prompt(folder_path, &sample_files))
                .await
                .text_or(FALLBACK_FOLDER);
            folders.insert(
                folder_path.clone(),
                Explanation::new(format!("Folder: {folder_path}"), content),
            );
        }

        let result = RepoAnalysis {
            repo_name: meta.full_name.clone(),
            tree,
            overview,
            folders,
        };

        self.caches.analyses.insert(
            repo_key,
            CachedAnalysis {
                result: result.clone(),
                file_paths,
                readme,
                meta,
            },
        );
        Ok(result)
    }

    /// Explains a single folder from sample file paths beneath it. Reuses
    /// the cached path list when `analyze` already ran for this repository.
    pub async fn explain_folder(&self, repo_url: &str, folder_path: &str) -> Result<Explanation> {
        let repo = GithubClient::parse_repo_url(repo_url)?;

        let file_paths = match self.caches.analyses.get(&repo.cache_key()) {
            Some(cached) => cached.file_paths,
            None => {
                let meta = self.github.fetch_meta(&repo).await?;
                self.fetch_blob_paths(&repo, &meta).await?
            }
        };

        let folder_files = sample_files_under(&file_paths, folder_path);
        let content = self
            .llm
            .generate(&prompts::folder_prompt(folder_path, &folder_files))
            .await
            .text_or(FALLBACK_FOLDER);
        Ok(Explanation::new(format!("Folder: {folder_path}"), content))
    }

    /// Explains a single file from its (truncated) content. Cached per
    /// `owner/repo:path`.
    pub async fn explain_file(&self, repo_url: &str, path: &str) -> Result<Explanation> {
        let repo = GithubClient::parse_repo_url(repo_url)?;
        let cache_key = format!("{}:{}", repo.cache_key(), path);

        if let Some(cached) = self.caches.file_explanations.get(&cache_key) {
            debug!(repo = %repo, path, "file explanation cache hit");
            return Ok(cached);
        }

        let file_content = self.github.fetch_file_content(&repo, path).await;
        let content = self
            .llm
            .generate(&prompts::file_prompt(path, &file_content, MAX_FILE_CHARS))
            .await
            .text_or(FALLBACK_FILE);

        let explanation = Explanation::new(format!("File: {path}"), content);
        self.caches
            .file_explanations
            .insert(cache_key, explanation.clone());
        Ok(explanation)
    }

    /// Answers a free-form question using naive keyword matching over the
    /// path list plus README and overview excerpts.
    pub async fn answer_question(
        &self,
        repo_url: &str,
        question: &str,
        context: &QuestionContext,
    ) -> Result<Explanation> {
        let repo = GithubClient::parse_repo_url(repo_url)?;

        let (file_paths, readme) = match self.caches.analyses.get(&repo.cache_key()) {
            Some(cached) => (cached.file_paths, cached.readme),
            None => {
                let meta = self.github.fetch_meta(&repo).await?;
                let file_paths = self.fetch_blob_paths(&repo, &meta).await?;
                let readme = self.github.fetch_readme(&repo).await;
                (file_paths, readme)
            }
        };

        let tokens = tokenize_question(question);
        let relevant_files = relevant_paths(&file_paths, &tokens, MAX_RELEVANT_FILES);

        let prompt = prompts::question_prompt(
            question,
            context.overview.as_deref().unwrap_or(""),
            &relevant_files,
            &readme,
        );
        let answer = self.llm.generate(&prompt).await.text_or(FALLBACK_ANSWER);
        Ok(Explanation::new("Answer", answer))
    }

    async fn fetch_blob_paths(&self, repo: &RepoRef, meta: &RepoMeta) -> Result<Vec<String>> {
        let entries = self.github.fetch_tree(repo, &meta.default_branch).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_blob())
            .map(|entry| entry.path)
            .collect())
    }

    async fn fetch_manifest(&self, repo: &RepoRef) -> String {
        for candidate in MANIFEST_CANDIDATES {
            let content = self.github.fetch_file_content(repo, candidate).await;
            if !content.is_empty() {
                return content;
            }
        }
        String::new()
    }
}

/// Lower-cases the question and splits on any run of characters outside
/// `[a-z0-9_/.-]`, keeping tokens longer than three characters.
fn tokenize_question(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split(|c: char| {
            !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '/' | '.' | '-'))
        })
        .filter(|token| token.len() > 3)
        .map(str::to_string)
        .collect()
}

/// Paths containing any token as a case-insensitive substring, in original
/// order, capped at `limit`.
fn relevant_paths(file_paths: &[String], tokens: &[String], limit: usize) -> Vec<String> {
    file_paths
        .iter()
        .filter(|path| {
            let lower = path.to_lowercase();
            tokens.iter().any(|token| lower.contains(token.as_str()))
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Sample file paths with `folder_path` as a prefix, capped at
/// `MAX_SAMPLE_FILES`.
fn sample_files_under(file_paths: &[String], folder_path: &str) -> Vec<String> {
    let prefix = format!("{folder_path}/");
    file_paths
        .iter()
        .filter(|path| path.starts_with(&prefix))
        .take(MAX_SAMPLE_FILES)
        .cloned()
        .collect()
}
