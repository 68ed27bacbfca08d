use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::modules::auth::schema::UserResponse;
use crate::modules::profile::model::{
    BackgroundStyle, Platform, ProjectCardsStyle, SocialLinksStyle, SocialMediaLink, UserPage,
};
use crate::modules::project::model::ProjectView;
use crate::services::validation::validate_email_or_empty;

lazy_static! {
    static ref INSTAGRAM_RE: Regex = Regex::new(r"^[A-Za-z0-9._]{1,30}$").unwrap();
    static ref GITHUB_RE: Regex = Regex::new(r"^[A-Za-z0-9-]{1,39}$").unwrap();
    static ref LINKEDIN_RE: Regex = Regex::new(r"^[A-Za-z0-9-]{3,100}$").unwrap();
    static ref DRIBBBLE_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{2,30}$").unwrap();
    static ref YOUTUBE_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{3,23}$").unwrap();
    static ref X_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{4,50}$").unwrap();
}

/// Checks a handle against the platform's username rules. Empty means
/// "remove the link" and is always accepted.
pub fn check_social_username(platform: Platform, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    let (valid, message) = match platform {
        Platform::Instagram => (
            INSTAGRAM_RE.is_match(value) && !value.ends_with(['.', '_']),
            "Invalid Instagram username",
        ),
        Platform::Github => (
            GITHUB_RE.is_match(value) && !value.ends_with('-'),
            "Invalid GitHub username",
        ),
        Platform::Linkedin => (LINKEDIN_RE.is_match(value), "Invalid LinkedIn username"),
        Platform::Dribbble => (DRIBBBLE_RE.is_match(value), "Invalid Dribbble username"),
        Platform::Youtube => (YOUTUBE_RE.is_match(value), "Invalid YouTube username"),
        Platform::X => (X_RE.is_match(value), "Invalid X username"),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("social_username").with_message(Cow::Borrowed(message)))
    }
}

fn validate_github(value: &str) -> Result<(), ValidationError> {
    check_social_username(Platform::Github, value)
}

fn validate_x(value: &str) -> Result<(), ValidationError> {
    check_social_username(Platform::X, value)
}

fn validate_youtube(value: &str) -> Result<(), ValidationError> {
    check_social_username(Platform::Youtube, value)
}

fn validate_instagram(value: &str) -> Result<(), ValidationError> {
    check_social_username(Platform::Instagram, value)
}

fn validate_dribbble(value: &str) -> Result<(), ValidationError> {
    check_social_username(Platform::Dribbble, value)
}

fn validate_linkedin(value: &str) -> Result<(), ValidationError> {
    check_social_username(Platform::Linkedin, value)
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDetailsRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Biography must be at most 200 characters"))]
    pub biography: Option<String>,
    #[validate(length(max = 50, message = "Location must be at most 50 characters"))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_email_or_empty"))]
    pub contact_email: Option<String>,
}

/// Absent platforms are left alone; an empty handle removes the link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SocialLinksRequest {
    #[validate(custom(function = "validate_github"))]
    pub github: Option<String>,
    #[validate(custom(function = "validate_x"))]
    pub x: Option<String>,
    #[validate(custom(function = "validate_youtube"))]
    pub youtube: Option<String>,
    #[validate(custom(function = "validate_instagram"))]
    pub instagram: Option<String>,
    #[validate(custom(function = "validate_dribbble"))]
    pub dribbble: Option<String>,
    #[validate(custom(function = "validate_linkedin"))]
    pub linkedin: Option<String>,
}

impl SocialLinksRequest {
    pub fn entries(&self) -> Vec<(Platform, &str)> {
        [
            (Platform::Github, &self.github),
            (Platform::X, &self.x),
            (Platform::Youtube, &self.youtube),
            (Platform::Instagram, &self.instagram),
            (Platform::Dribbble, &self.dribbble),
            (Platform::Linkedin, &self.linkedin),
        ]
        .into_iter()
        .filter_map(|(platform, value)| value.as_deref().map(|v| (platform, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStyleRequest {
    pub background_style: Option<BackgroundStyle>,
    pub project_cards_style: Option<ProjectCardsStyle>,
    pub social_links_style: Option<SocialLinksStyle>,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLinkResponse {
    pub platform: Platform,
    pub username: String,
    pub url: String,
}

/// `Default` is what a user without a stored page looks like.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageResponse {
    pub id: String,
    pub biography: Option<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub background_style: BackgroundStyle,
    pub project_cards_style: ProjectCardsStyle,
    pub social_links_style: SocialLinksStyle,
    pub social_media_links: Vec<SocialLinkResponse>,
}

impl PageResponse {
    /// Links with an unknown platform are skipped; the rest follow
    /// display order.
    pub fn new(page: &UserPage, links: &[SocialMediaLink]) -> Self {
        let mut social_media_links: Vec<SocialLinkResponse> = links
            .iter()
            .filter_map(|link| {
                Platform::parse(&link.platform).map(|platform| SocialLinkResponse {
                    platform,
                    url: platform.profile_url(&link.username),
                    username: link.username.clone(),
                })
            })
            .collect();
        social_media_links.sort_by_key(|link| link.platform);

        Self {
            id: page.id.clone(),
            biography: page.biography.clone(),
            location: page.location.clone(),
            contact_email: page.contact_email.clone(),
            background_style: BackgroundStyle::from_db(&page.background_style),
            project_cards_style: ProjectCardsStyle::from_db(&page.project_cards_style),
            social_links_style: SocialLinksStyle::from_db(&page.social_links_style),
            social_media_links,
        }
    }
}

/// What visitors of `/u/{username}` see about the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProfileResponse {
    pub user: PublicUser,
    pub page: PageResponse,
    pub projects: Vec<ProjectView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PanelResponse {
    pub user: UserResponse,
    pub page: PageResponse,
    pub projects: Vec<ProjectView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageEnvelope {
    pub page: PageResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image: Option<String>,
}
