use std::collections::BTreeMap;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::modules::auth::schema::{LoginRequest, RegisterRequest, UserEnvelope, UserResponse};
use crate::modules::catalog::controller::{CategoriesResponse, ProjectStatusesResponse};
use crate::modules::profile::schema::{
    PageEnvelope, PanelResponse, PublicProfileResponse, SocialLinksRequest, UpdateDetailsRequest,
    UpdateStyleRequest,
};
use crate::modules::project::schema::{
    CreateProjectRequest, ProjectEnvelope, ProjectsResponse, ReorderRequest, UpdateProjectRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{status}: {error}")]
    Api {
        status: StatusCode,
        error: String,
        fields: Option<BTreeMap<String, Vec<String>>>,
    },

    #[error("Not signed in")]
    SignedOut,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

/// `{ "success": "...", ...data }` as returned by mutations.
#[derive(Debug, Deserialize)]
pub struct Saved<T> {
    pub success: String,
    #[serde(flatten)]
    pub data: T,
}

/// Mutations that only carry a message.
#[derive(Debug, Deserialize)]
pub struct NoData {}

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LoginOutcome {
    Session {
        access_token: String,
        expires_in: i64,
        user: UserResponse,
    },
    TwoFactorRequired {
        two_factor: bool,
    },
    VerificationSent {
        success: String,
    },
}

/// Thin HTTP client for the devpage API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::SignedOut)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn read<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or(ErrorBody {
            error: status.to_string(),
            fields: None,
        });

        Err(ClientError::Api {
            status,
            error: body.error,
            fields: body.fields,
        })
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    pub async fn register(&self, req: &RegisterRequest) -> Result<Saved<NoData>, ClientError> {
        Self::read(self.request(Method::POST, "/auth/register").json(req)).await
    }

    /// Stores the access token when the login produced a session.
    pub async fn login(&mut self, req: &LoginRequest) -> Result<LoginOutcome, ClientError> {
        let outcome: LoginOutcome =
            Self::read(self.request(Method::POST, "/auth/login").json(req)).await?;

        if let LoginOutcome::Session { access_token, .. } = &outcome {
            self.token = Some(access_token.clone());
        }

        Ok(outcome)
    }

    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        let envelope: UserEnvelope = Self::read(self.authed(Method::GET, "/auth/me")?).await?;
        Ok(envelope.user)
    }

    // =========================================================================
    // CATALOG
    // =========================================================================

    pub async fn categories(&self) -> Result<CategoriesResponse, ClientError> {
        Self::read(self.request(Method::GET, "/categories")).await
    }

    pub async fn project_statuses(&self) -> Result<ProjectStatusesResponse, ClientError> {
        Self::read(self.request(Method::GET, "/project-statuses")).await
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    pub async fn public_profile(&self, username: &str) -> Result<PublicProfileResponse, ClientError> {
        Self::read(self.request(Method::GET, &format!("/u/{}", username))).await
    }

    pub async fn panel(&self) -> Result<PanelResponse, ClientError> {
        Self::read(self.authed(Method::GET, "/profile")?).await
    }

    pub async fn update_details(
        &self,
        req: &UpdateDetailsRequest,
    ) -> Result<Saved<PageEnvelope>, ClientError> {
        Self::read(self.authed(Method::PATCH, "/profile/details")?.json(req)).await
    }

    pub async fn update_social_links(
        &self,
        req: &SocialLinksRequest,
    ) -> Result<Saved<PageEnvelope>, ClientError> {
        Self::read(self.authed(Method::PUT, "/profile/social-links")?.json(req)).await
    }

    pub async fn update_style(
        &self,
        req: &UpdateStyleRequest,
    ) -> Result<Saved<PageEnvelope>, ClientError> {
        Self::read(self.authed(Method::PATCH, "/profile/style")?.json(req)).await
    }

    // =========================================================================
    // PROJECTS
    // =========================================================================

    pub async fn projects(&self, username: &str) -> Result<ProjectsResponse, ClientError> {
        Self::read(self.request(Method::GET, &format!("/u/{}/projects", username))).await
    }

    pub async fn create_project(
        &self,
        req: &CreateProjectRequest,
    ) -> Result<Saved<ProjectEnvelope>, ClientError> {
        Self::read(self.authed(Method::POST, "/projects")?.json(req)).await
    }

    pub async fn update_project(
        &self,
        id: &str,
        req: &UpdateProjectRequest,
    ) -> Result<Saved<ProjectEnvelope>, ClientError> {
        Self::read(self.authed(Method::PATCH, &format!("/projects/{}", id))?.json(req)).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<Saved<NoData>, ClientError> {
        Self::read(self.authed(Method::DELETE, &format!("/projects/{}", id))?).await
    }

    pub async fn reorder_projects(
        &self,
        project_ids: Vec<String>,
    ) -> Result<Saved<ProjectsResponse>, ClientError> {
        Self::read(
            self.authed(Method::PUT, "/projects/order")?
                .json(&ReorderRequest { project_ids }),
        )
        .await
    }
}
