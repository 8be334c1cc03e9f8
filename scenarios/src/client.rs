//! HTTP client for the team / pull-request service
use crate::model::{PullRequestCreate, TeamRegistration};
use prload::transaction;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

pub const TEAM_ADD_PATH: &str = "team/add";
pub const PULL_REQUEST_CREATE_PATH: &str = "pullRequest/create";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Clone, Debug)]
pub struct PrServiceClient {
    http: Client,
    base_url: Url,
}

impl PrServiceClient {
    /// `base_url` should end with `/`, as returned by [`crate::config::resolve_base_url`].
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /team/add`. Any completed response is returned as-is.
    #[transaction]
    pub async fn add_team(&self, team: &TeamRegistration) -> Result<StatusCode, ClientError> {
        let res = self
            .http
            .post(self.base_url.join(TEAM_ADD_PATH)?)
            .json(team)
            .send()
            .await?;
        Ok(res.status())
    }

    /// `POST /pullRequest/create`. Any completed response is returned as-is.
    #[transaction]
    pub async fn create_pull_request(
        &self,
        pr: &PullRequestCreate,
    ) -> Result<StatusCode, ClientError> {
        let res = self
            .http
            .post(self.base_url.join(PULL_REQUEST_CREATE_PATH)?)
            .json(pr)
            .send()
            .await?;
        Ok(res.status())
    }
}
