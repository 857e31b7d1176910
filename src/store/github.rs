//! A [`DocumentStore`] backed by a file in a GitHub repository.

use async_trait::async_trait;
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use percent_encoding::utf8_percent_encode;
use reqwest::{
    header::{ACCEPT, CACHE_CONTROL},
    Client, Method, RequestBuilder,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    catalog::CATALOG_PATH,
    config::{Config, FetchStrategy},
    percent_encoding::PATH_IGNORING_SLASH,
    store::{CommitId, DocumentStore, Revision, StoreError},
};

/// The commit message for every write.
const COMMIT_MESSAGE: &str = "Update icon data via admin panel";

/// The media type for JSON responses from the GitHub REST API.
const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// The media type asking the contents API for the file's raw bytes instead of base64.
const GITHUB_RAW: &str = "application/vnd.github.raw+json";

/// GitHub rejects requests without a `User-Agent`.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A [`DocumentStore`] using the GitHub REST API.
#[derive(Clone, Debug)]
pub struct GitHubStore {
    /// The HTTP client shared by every request.
    client: Client,

    /// See [`Config::owner`].
    owner: Option<String>,

    /// See [`Config::repo`].
    repo: Option<String>,

    /// See [`Config::branch`].
    branch: String,

    /// See [`Config::token`].
    token: Option<String>,

    /// See [`Config::fetch_strategy`].
    fetch_strategy: FetchStrategy,

    /// See [`Config::api_url`].
    api_url: String,

    /// See [`Config::raw_url`].
    raw_url: String,
}

/// The subset of a contents API file object this store reads.
#[derive(Deserialize, Debug)]
struct ContentsFile {
    /// The blob SHA of the file.
    sha: Revision,

    /// The file's content, encoded as described by `encoding`.
    #[serde(default)]
    content: String,

    /// The encoding of `content`. GitHub uses `"none"` for files too large to inline.
    #[serde(default)]
    encoding: Option<String>,
}

/// A `PUT` request body for the contents API.
#[derive(Serialize, Debug)]
struct PutContentsRequest<'a> {
    /// The commit message.
    message: &'a str,

    /// The new file content in base64.
    content: String,

    /// The blob SHA of the file being replaced. Omitted to create the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a Revision>,

    /// The branch to commit to.
    branch: &'a str,
}

/// The subset of a contents API `PUT` response this store reads.
#[derive(Deserialize, Debug)]
struct PutContentsResponse {
    /// The commit the write created.
    commit: CommitRef,
}

/// A reference to a commit.
#[derive(Deserialize, Debug)]
struct CommitRef {
    /// The commit SHA.
    sha: CommitId,
}

/// An error response body from the GitHub REST API.
#[derive(Deserialize, Debug)]
struct ErrorBody {
    /// The human-readable error message.
    message: Option<String>,
}

impl GitHubStore {
    /// Constructs a store for the repository coordinates in `config`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client can't be initialized (for example, if no TLS backend is
    /// available).
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token: config.token.clone(),
            fetch_strategy: config.fetch_strategy,
            api_url: config.api_url.clone(),
            raw_url: config.raw_url.clone(),
        })
    }

    /// Returns the owner and name of the repository.
    ///
    /// # Errors
    ///
    /// Fails if either isn't configured.
    fn coordinates(&self) -> Result<(&str, &str), StoreError> {
        let owner = self
            .owner
            .as_deref()
            .ok_or(StoreError::MissingConfig("GITHUB_OWNER"))?;
        let repo = self
            .repo
            .as_deref()
            .ok_or(StoreError::MissingConfig("GITHUB_REPO"))?;

        Ok((owner, repo))
    }

    /// Returns the contents API URL of the catalog file.
    ///
    /// # Errors
    ///
    /// See [`GitHubStore::coordinates`].
    fn contents_url(&self) -> Result<String, StoreError> {
        let (owner, repo) = self.coordinates()?;

        Ok(format!(
            "{}/repos/{owner}/{repo}/contents/{CATALOG_PATH}",
            self.api_url
        ))
    }

    /// Returns the raw content URL of the catalog file on the configured branch. The branch is
    /// percent-encoded except for its slashes.
    ///
    /// # Errors
    ///
    /// See [`GitHubStore::coordinates`].
    fn raw_content_url(&self) -> Result<String, StoreError> {
        let (owner, repo) = self.coordinates()?;
        let branch = utf8_percent_encode(&self.branch, PATH_IGNORING_SLASH);

        Ok(format!(
            "{}/{owner}/{repo}/{branch}/{CATALOG_PATH}",
            self.raw_url
        ))
    }

    /// Starts a contents API request, authenticated if a token is configured.
    fn api_request(&self, method: Method, url: &str, accept: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header(ACCEPT, accept)
            .header(CACHE_CONTROL, "no-cache");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Gets the catalog file's metadata from the contents API.
    ///
    /// # Errors
    ///
    /// Fails if the request fails. A non-success status is returned as a response, not an error.
    async fn get_contents(&self, accept: &str) -> Result<reqwest::Response, StoreError> {
        let url = self.contents_url()?;

        debug!(%url, branch = %self.branch, "getting catalog contents");

        Ok(self
            .api_request(Method::GET, &url, accept)
            .query(&[("ref", &self.branch)])
            .send()
            .await?)
    }

    /// Reads the document through the contents API.
    ///
    /// # Errors
    ///
    /// See [`DocumentStore::get_document`].
    async fn get_document_contents(&self) -> Result<Value, StoreError> {
        let response = self.get_contents(GITHUB_JSON).await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let file: ContentsFile = response.json().await?;

        if file.encoding.as_deref() == Some("none") {
            // The file is too large for GitHub to inline, so ask for its raw bytes instead.
            let response = self.get_contents(GITHUB_RAW).await?;

            if !response.status().is_success() {
                return Err(upstream_error(response).await);
            }

            return Ok(serde_json::from_slice(&response.bytes().await?)?);
        }

        Ok(serde_json::from_slice(&decode_content(&file)?)?)
    }

    /// Reads the document from the branch's raw content path.
    ///
    /// # Errors
    ///
    /// See [`DocumentStore::get_document`].
    async fn get_document_raw(&self) -> Result<Value, StoreError> {
        let url = self.raw_content_url()?;

        debug!(%url, "getting raw catalog");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }
}

#[async_trait]
impl DocumentStore for GitHubStore {
    async fn get_document(&self) -> Result<Value, StoreError> {
        match self.fetch_strategy {
            FetchStrategy::Contents => self.get_document_contents().await,
            FetchStrategy::Raw => self.get_document_raw().await,
        }
    }

    async fn get_revision(&self) -> Result<Option<Revision>, StoreError> {
        let response = self.get_contents(GITHUB_JSON).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let file: ContentsFile = response.json().await?;

        Ok(Some(file.sha))
    }

    async fn put_document(
        &self,
        content: &[u8],
        revision: Option<&Revision>,
    ) -> Result<CommitId, StoreError> {
        let url = self.contents_url()?;

        if self.token.is_none() {
            return Err(StoreError::MissingConfig("GITHUB_TOKEN"));
        }

        debug!(%url, branch = %self.branch, ?revision, "putting catalog contents");

        let response = self
            .api_request(Method::PUT, &url, GITHUB_JSON)
            .json(&PutContentsRequest {
                message: COMMIT_MESSAGE,
                content: BASE64.encode(content),
                sha: revision,
                branch: &self.branch,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: PutContentsResponse = response.json().await?;

        Ok(body.commit.sha)
    }
}

/// Converts a non-success response into a [`StoreError::Status`], using GitHub's error message if
/// the body has one.
async fn upstream_error(response: reqwest::Response) -> StoreError {
    let status = response.status();

    match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            message: Some(message),
        }) => StoreError::Status { status, message },
        _ => StoreError::status(status),
    }
}

/// Decodes a contents API file's base64 content, which GitHub wraps with newlines.
///
/// # Errors
///
/// Fails if the content isn't base64.
fn decode_content(file: &ContentsFile) -> Result<Vec<u8>, StoreError> {
    match file.encoding.as_deref() {
        None | Some("base64") => {}
        Some(encoding) => return Err(StoreError::UnsupportedEncoding(encoding.to_owned())),
    }

    let content: String = file
        .content
        .chars()
        .filter(|char| !char.is_ascii_whitespace())
        .collect();

    Ok(BASE64.decode(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Configuration naming a repository on a non-default branch.
    fn configured() -> Config {
        Config {
            owner: Some("octo".into()),
            repo: Some("icons".into()),
            branch: "gh-pages".into(),
            ..Config::default()
        }
    }

    #[test]
    fn builds_urls_from_coordinates() -> anyhow::Result<()> {
        let store = GitHubStore::new(&configured())?;

        assert_eq!(
            store.contents_url()?,
            "https://api.github.com/repos/octo/icons/contents/data/icons.json",
        );
        assert_eq!(
            store.raw_content_url()?,
            "https://raw.githubusercontent.com/octo/icons/gh-pages/data/icons.json",
        );

        Ok(())
    }

    #[test]
    fn raw_url_escapes_branch() -> anyhow::Result<()> {
        let store = GitHubStore::new(&Config {
            branch: "release/v2#hotfix".into(),
            ..configured()
        })?;

        assert_eq!(
            store.raw_content_url()?,
            "https://raw.githubusercontent.com/octo/icons/release/v2%23hotfix/data/icons.json",
        );

        Ok(())
    }

    #[test]
    fn decodes_wrapped_base64() -> anyhow::Result<()> {
        let encoded = BASE64.encode(br#"{"allIcons":[],"chainguardSpecific":[]}"#);
        let (head, tail) = encoded.split_at(10);

        let file = ContentsFile {
            sha: Revision::from("abc".to_owned()),
            content: format!("{head}\n{tail}\n"),
            encoding: Some("base64".into()),
        };

        let value: Value = serde_json::from_slice(&decode_content(&file)?)?;

        assert_eq!(value["allIcons"], Value::Array(Vec::new()));

        Ok(())
    }

    #[test]
    fn rejects_unknown_encoding() {
        let file = ContentsFile {
            sha: Revision::from("abc".to_owned()),
            content: String::new(),
            encoding: Some("utf-16".into()),
        };

        assert!(
            matches!(
                decode_content(&file),
                Err(StoreError::UnsupportedEncoding(encoding)) if encoding == "utf-16"
            ),
            "only base64 content should be decodable",
        );
    }

    #[test]
    fn put_request_omits_missing_revision() -> anyhow::Result<()> {
        let request = PutContentsRequest {
            message: COMMIT_MESSAGE,
            content: BASE64.encode("{}"),
            sha: None,
            branch: "main",
        };

        assert_eq!(
            serde_json::to_value(&request)?,
            serde_json::json!({
                "message": "Update icon data via admin panel",
                "content": "e30=",
                "branch": "main",
            }),
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_owner_fails_before_any_request() -> anyhow::Result<()> {
        let store = GitHubStore::new(&Config::default())?;

        let error = store
            .get_document()
            .await
            .expect_err("an unconfigured owner should fail the read");

        assert!(
            matches!(error, StoreError::MissingConfig("GITHUB_OWNER")),
            "unexpected error: {error}",
        );

        Ok(())
    }

    #[tokio::test]
    async fn write_requires_token() -> anyhow::Result<()> {
        let store = GitHubStore::new(&configured())?;

        let error = store
            .put_document(b"{}", None)
            .await
            .expect_err("a write without a token should fail");

        assert!(
            matches!(error, StoreError::MissingConfig("GITHUB_TOKEN")),
            "unexpected error: {error}",
        );

        Ok(())
    }
}
