//! GitHub API interaction module
//!
//! Fetches the Docker tag list and the latest dvm release.

use crate::config::{Config, APP_NAME, DOCKER_REPO, DVM_REPO};
use crate::types::{GitHubRelease, GitHubTag};
use super::RemoteCatalog;
use anyhow::Result;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;

const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug)]
pub enum GitHubError {
    RateLimited { repo: String },
    NotFound { repo: String },
    RequestFailed { repo: String, status: StatusCode },
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitHubError::RateLimited { repo } => {
                write!(f, "GitHub API rate limit exceeded while querying {}", repo)
            }
            GitHubError::NotFound { repo } => write!(f, "Repository {} not found", repo),
            GitHubError::RequestFailed { repo, status } => {
                write!(f, "GitHub request for {} failed (Status {})", repo, status)
            }
        }
    }
}

impl Error for GitHubError {}

/// Build GitHub API URL for the first page of a repository's tags
pub fn build_gh_tags_url(repo: &str) -> String {
    format!("{}/repos/{}/tags", GITHUB_API_URL, repo)
}

/// Build GitHub API URL for a repository's latest release
pub fn build_gh_latest_release_url(repo: &str) -> String {
    format!("{}/repos/{}/releases/latest", GITHUB_API_URL, repo)
}

pub fn warn_when_rate_limited(status: StatusCode) {
    if status == StatusCode::FORBIDDEN {
        tracing::warn!(
            "Your GitHub API rate limit has been exceeded. Set the GITHUB_TOKEN environment variable or use the --github-token parameter with your GitHub personal access token to authenticate and increase the rate limit."
        );
    }
}

/// Catalog backed by the GitHub REST API.
pub struct GitHubCatalog {
    client: reqwest::Client,
    token: Option<String>,
    docker_repo: String,
    dvm_repo: String,
}

impl GitHubCatalog {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: config.github_token.clone(),
            docker_repo: DOCKER_REPO.to_string(),
            dvm_repo: DVM_REPO.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, repo: &str) -> Result<T> {
        tracing::debug!("Fetching {}", url);

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", APP_NAME);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
            tracing::debug!("Using GitHub token");
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn_when_rate_limited(status);
            let repo = repo.to_string();
            return Err(match status {
                StatusCode::FORBIDDEN => GitHubError::RateLimited { repo },
                StatusCode::NOT_FOUND => GitHubError::NotFound { repo },
                status => GitHubError::RequestFailed { repo, status },
            }
            .into());
        }

        Ok(response.json().await?)
    }
}

impl RemoteCatalog for GitHubCatalog {
    async fn list_tags(&self) -> Result<Vec<String>> {
        let url = build_gh_tags_url(&self.docker_repo);
        let tags: Vec<GitHubTag> = self.get_json(&url, &self.docker_repo).await?;
        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }

    async fn latest_release_tag(&self) -> Result<String> {
        let url = build_gh_latest_release_url(&self.dvm_repo);
        let release: GitHubRelease = self.get_json(&url, &self.dvm_repo).await?;
        Ok(release.tag_name)
    }
}
