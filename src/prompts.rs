//! Prompt templates for the four analysis operations.
//!
//! Each template mandates a fixed section-heading structure; the model may
//! deviate and the output shape is not validated.

use crate::types::RepoMeta;

const MAX_README_EXCERPT: usize = 4000;
const MAX_MANIFEST_EXCERPT: usize = 4000;
const MAX_OVERVIEW_FOLDERS: usize = 20;
const MAX_FOLDER_PROMPT_FILES: usize = 30;
const MAX_QUESTION_EXCERPT: usize = 2000;
const MAX_QUESTION_FILES: usize = 30;

/// Truncates `text` to at most `limit` characters, appending a marker when
/// anything was cut. The retained prefix is unmodified.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(limit).collect();
        format!("{prefix}\n...")
    }
}

pub fn overview_prompt(
    meta: &RepoMeta,
    readme: &str,
    manifest: &str,
    folder_paths: &[String],
) -> String {
    let folder_list = folder_paths
        .iter()
        .take(MAX_OVERVIEW_FOLDERS)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "\nYou are explaining a codebase to a developer new to the repo.\n\
         Write in plain English with no marketing.\n\
         Return exactly four sections with these headings:\n\n\
         **What this project does**\n\
         **Who this project is for**\n\
         **Main technologies used**\n\
         **High-level architecture**\n\n\
         Keep each section short and concrete. If uncertain, say so.\n\n\
         Repository metadata:\n\
         Name: {name}\n\
         Description: {description}\n\
         Default branch: {branch}\n\
         Primary language: {language}\n\n\
         Folder list (top-level + notable):\n\
         {folder_list}\n\n\
         README excerpt:\n\
         {readme}\n\n\
         Manifest excerpt:\n\
         {manifest}\n",
        name = meta.full_name,
        description = meta.description.as_deref().unwrap_or("No description"),
        branch = meta.default_branch,
        language = meta.language.as_deref().unwrap_or("Unknown"),
        readme = truncate(readme, MAX_README_EXCERPT),
        manifest = truncate(manifest, MAX_MANIFEST_EXCERPT),
    )
}

pub fn folder_prompt(folder_path: &str, folder_files: &[String]) -> String {
    let files = folder_files
        .iter()
        .take(MAX_FOLDER_PROMPT_FILES)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "\nYou are explaining a folder in a codebase. Write in plain English.\n\
         Return exactly three sections with these headings:\n\n\
         **What this folder is responsible for**\n\
         **Why it exists**\n\
         **What kind of files live here**\n\n\
         Folder: {folder_path}\n\
         Files (samples):\n\
         {files}\n"
    )
}

pub fn file_prompt(file_path: &str, file_content: &str, content_limit: usize) -> String {
    format!(
        "\nYou are explaining a file in a codebase. Write in plain English.\n\
         Return exactly three sections with these headings:\n\n\
         **What this file does**\n\
         **Important logic**\n\
         **How data flows**\n\n\
         File: {file_path}\n\
         Content (truncated):\n\
         {content}\n",
        content = truncate(file_content, content_limit),
    )
}

pub fn question_prompt(
    question: &str,
    overview: &str,
    relevant_files: &[String],
    readme: &str,
) -> String {
    let files = relevant_files
        .iter()
        .take(MAX_QUESTION_FILES)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "\nAnswer the user's question based on the repository context.\n\
         Be direct and honest. If unsure, say so.\n\
         Prefer pointing to specific files or folders.\n\n\
         Question:\n\
         {question}\n\n\
         Repository overview:\n\
         {overview}\n\n\
         Relevant file paths:\n\
         {files}\n\n\
         README excerpt:\n\
         {readme}\n",
        overview = truncate(overview, MAX_QUESTION_EXCERPT),
        readme = truncate(readme, MAX_QUESTION_EXCERPT),
    )
}
