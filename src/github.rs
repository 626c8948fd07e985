//! Thin client for the GitHub REST API: URL resolution, repository
//! metadata, the recursive tree listing, file contents, and the README.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{RepolensError, Result};
use crate::types::{RepoMeta, RepoRef, TreeEntry};

pub const GITHUB_API: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("repolens/", env!("CARGO_PKG_VERSION"));

static SSH_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^git@github\.com:(.+?)/(.+?)(?:\.git)?$").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: GITHUB_API.to_string(),
            token,
        }
    }

    /// Points the client at a different API root. Used by tests to target a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolves a user-supplied repository reference into `owner/repo`.
    ///
    /// Accepts `https://github.com/<owner>/<repo>[.git]`, a bare
    /// `github.com/...` form, and the SSH form
    /// `git@github.com:<owner>/<repo>[.git]`.
    pub fn parse_repo_url(repo_url: &str) -> Result<RepoRef> {
        let trimmed = repo_url.trim();

        if trimmed.starts_with("git@") {
            let captures = SSH_URL.captures(trimmed).ok_or_else(|| {
                RepolensError::InvalidRepositoryReference("Unsupported GitHub SSH URL".to_string())
            })?;
            return Ok(RepoRef::new(&captures[1], &captures[2]));
        }

        let normalized = if trimmed.starts_with("github.com/") {
            format!("https://{trimmed}")
        } else {
            trimmed.to_string()
        };

        let url = Url::parse(&normalized).map_err(|_| {
            RepolensError::InvalidRepositoryReference("Invalid repository URL".to_string())
        })?;

        match url.host_str() {
            Some("github.com") | Some("www.github.com") => {}
            _ => {
                return Err(RepolensError::InvalidRepositoryReference(
                    "Only GitHub URLs are supported right now".to_string(),
                ))
            }
        }

        let segments: Vec<&str> = url
            .path()
            .trim_start_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        if segments.len() < 2 {
            return Err(RepolensError::InvalidRepositoryReference(
                "Repository URL must include owner and repo".to_string(),
            ));
        }

        let owner = segments[0];
        let repo = segments[1].strip_suffix(".git").unwrap_or(segments[1]);
        Ok(RepoRef::new(owner, repo))
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Fetches repository metadata (name, description, default branch).
    pub async fn fetch_meta(&self, repo: &RepoRef) -> Result<RepoMeta> {
        let response = self
            .get(&format!("/repos/{}/{}", repo.owner, repo.repo))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RepolensError::Upstream {
                what: "repo",
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    /// Fetches the full recursive tree listing for a branch.
    ///
    /// A truncated upstream response (very large repositories) is returned
    /// as-is; incompleteness is a degraded result, not an error.
    pub async fn fetch_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeEntry>> {
        let response = self
            .get(&format!(
                "/repos/{}/{}/git/trees/{}",
                repo.owner, repo.repo, branch
            ))
            .query(&[("recursive", "1")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RepolensError::Upstream {
                what: "tree",
                status: response.status().as_u16(),
            });
        }
        let data: TreeResponse = response.json().await?;
        if data.truncated {
            warn!(repo = %repo, "GitHub tree response truncated, results may be incomplete");
        }
        Ok(data.tree)
    }

    /// Fetches and decodes a single file's content.
    ///
    /// Returns an empty string on any non-2xx status, on a directory
    /// response, or on missing/undecodable base64 content. A missing file is
    /// never an error.
    pub async fn fetch_file_content(&self, repo: &RepoRef, path: &str) -> String {
        let safe_path: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        let endpoint = format!(
            "/repos/{}/{}/contents/{}",
            repo.owner,
            repo.repo,
            safe_path.join("/")
        );
        self.fetch_base64_body(&endpoint, repo, path).await
    }

    /// Fetches the repository README, empty string on any failure.
    pub async fn fetch_readme(&self, repo: &RepoRef) -> String {
        let endpoint = format!("/repos/{}/{}/readme", repo.owner, repo.repo);
        self.fetch_base64_body(&endpoint, repo, "README").await
    }

    async fn fetch_base64_body(&self, endpoint: &str, repo: &RepoRef, label: &str) -> String {
        let response = match self.get(endpoint).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(repo = %repo, path = label, %error, "GitHub contents request failed");
                return String::new();
            }
        };
        if !response.status().is_success() {
            return String::new();
        }
        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(error) => {
                warn!(repo = %repo, path = label, %error, "GitHub contents body unreadable");
                return String::new();
            }
        };
        decode_contents(&data)
    }
}

// GitHub wraps file bodies in base64 with embedded newlines; directory
// listings come back as a JSON array.
fn decode_contents(data: &Value) -> String {
    if data.is_array() {
        return String::new();
    }
    if data.get("encoding").and_then(Value::as_str) != Some("base64") {
        return String::new();
    }
    let Some(content) = data.get("content").and_then(Value::as_str) else {
        return String::new();
    };
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GithubClient {
        GithubClient::new(None).with_base_url(server.uri())
    }

    #[test]
    fn parses_https_url() {
        let repo = GithubClient::parse_repo_url("https://github.com/foo/bar").unwrap();
        assert_eq!(repo, RepoRef::new("foo", "bar"));
    }

    #[test]
    fn parses_https_url_with_git_suffix_and_extra_path() {
        let repo =
            GithubClient::parse_repo_url("https://github.com/foo/bar.git/tree/main").unwrap();
        assert_eq!(repo, RepoRef::new("foo", "bar"));
    }

    #[test]
    fn parses_bare_host_form() {
        let repo = GithubClient::parse_repo_url("github.com/foo/bar").unwrap();
        assert_eq!(repo, RepoRef::new("foo", "bar"));
    }

    #[test]
    fn parses_ssh_form() {
        let repo = GithubClient::parse_repo_url("git@github.com:foo/bar.git").unwrap();
        assert_eq!(repo, RepoRef::new("foo", "bar"));
        let repo = GithubClient::parse_repo_url("git@github.com:foo/bar").unwrap();
        assert_eq!(repo, RepoRef::new("foo", "bar"));
    }

    #[test]
    fn rejects_non_github_host() {
        let err = GithubClient::parse_repo_url("https://gitlab.com/foo/bar").unwrap_err();
        assert!(matches!(err, RepolensError::InvalidRepositoryReference(_)));
    }

    #[test]
    fn rejects_missing_repo_segment() {
        let err = GithubClient::parse_repo_url("https://github.com/foo").unwrap_err();
        assert!(matches!(err, RepolensError::InvalidRepositoryReference(_)));
    }

    #[test]
    fn rejects_malformed_ssh_url() {
        let err = GithubClient::parse_repo_url("git@github.com/foo/bar").unwrap_err();
        assert!(matches!(err, RepolensError::InvalidRepositoryReference(_)));
    }

    #[tokio::test]
    async fn fetch_meta_deserializes_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar"))
            .and(header("X-GitHub-Api-Version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "full_name": "foo/bar",
                "description": "demo",
                "default_branch": "main",
                "language": "Rust"
            })))
            .mount(&server)
            .await;

        let meta = client_for(&server)
            .fetch_meta(&RepoRef::new("foo", "bar"))
            .await
            .unwrap();
        assert_eq!(meta.full_name, "foo/bar");
        assert_eq!(meta.default_branch, "main");
        assert_eq!(meta.language.as_deref(), Some("Rust"));
    }

    #[tokio::test]
    async fn fetch_meta_surfaces_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_meta(&RepoRef::new("foo", "missing"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GitHub repo fetch failed: 404");
    }

    #[tokio::test]
    async fn fetch_tree_returns_entries_even_when_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar/git/trees/main"))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tree": [
                    {"path": "src/main.rs", "type": "blob"},
                    {"path": "src", "type": "tree"}
                ],
                "truncated": true
            })))
            .mount(&server)
            .await;

        let entries = client_for(&server)
            .fetch_tree(&RepoRef::new("foo", "bar"), "main")
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_blob());
    }

    #[tokio::test]
    async fn fetch_file_content_decodes_base64_with_newlines() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar/contents/src/main.rs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "encoding": "base64",
                "content": "Zm4gbWFpbigp\nIHt9\n"
            })))
            .mount(&server)
            .await;

        let content = client_for(&server)
            .fetch_file_content(&RepoRef::new("foo", "bar"), "src/main.rs")
            .await;
        assert_eq!(content, "fn main() {}");
    }

    #[tokio::test]
    async fn fetch_file_content_is_empty_for_missing_file() {
        let server = MockServer::start().await;
        let content = client_for(&server)
            .fetch_file_content(&RepoRef::new("foo", "bar"), "nope.txt")
            .await;
        assert_eq!(content, "");
    }

    #[tokio::test]
    async fn fetch_file_content_is_empty_for_directory_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar/contents/src"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"path": "src/main.rs", "type": "file"}
            ])))
            .mount(&server)
            .await;

        let content = client_for(&server)
            .fetch_file_content(&RepoRef::new("foo", "bar"), "src")
            .await;
        assert_eq!(content, "");
    }

    #[tokio::test]
    async fn fetch_readme_decodes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "encoding": "base64",
                "content": BASE64.encode("# Hello")
            })))
            .mount(&server)
            .await;

        let readme = client_for(&server)
            .fetch_readme(&RepoRef::new("foo", "bar"))
            .await;
        assert_eq!(readme, "# Hello");
    }

    #[test]
    fn undecodable_content_degrades_to_empty() {
        assert_eq!(
            decode_contents(&json!({"encoding": "base64", "content": "!!!"})),
            ""
        );
        assert_eq!(decode_contents(&json!({"encoding": "utf-8", "content": "x"})), "");
        assert_eq!(decode_contents(&json!({"encoding": "base64"})), "");
    }
}
