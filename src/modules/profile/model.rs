use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserPage {
    pub id: String,
    pub user_id: String,
    pub biography: Option<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub background_style: String,
    pub project_cards_style: String,
    pub social_links_style: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SocialMediaLink {
    pub id: String,
    pub user_page_id: String,
    pub platform: String,
    pub username: String,
}

/// Style enums are stored upper-case and exchanged lower-case.
macro_rules! style_enum {
    ($name:ident { $($variant:ident => $db:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub fn as_db(self) -> &'static str {
                match self {
                    $($name::$variant => $db),+
                }
            }

            /// Unknown values fall back to the default style.
            pub fn from_db(value: &str) -> Self {
                match value {
                    $($db => $name::$variant,)+
                    _ => $name::default(),
                }
            }
        }
    };
}

style_enum!(BackgroundStyle {
    Ruby => "RUBY",
    Honey => "HONEY",
    Sky => "SKY",
    Mint => "MINT",
    Pansy => "PANSY",
    Plum => "PLUM",
});

style_enum!(ProjectCardsStyle {
    Grid => "GRID",
    List => "LIST",
});

style_enum!(SocialLinksStyle {
    Fill => "FILL",
    Line => "LINE",
    Ghost => "GHOST",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Github,
    X,
    Youtube,
    Instagram,
    Dribbble,
    Linkedin,
}

impl Platform {
    /// Display order on the public page.
    pub const ALL: [Platform; 6] = [
        Platform::Github,
        Platform::X,
        Platform::Youtube,
        Platform::Instagram,
        Platform::Dribbble,
        Platform::Linkedin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Github => "github",
            Platform::X => "x",
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Dribbble => "dribbble",
            Platform::Linkedin => "linkedin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }

    pub fn profile_url(self, username: &str) -> String {
        match self {
            Platform::Github => format!("https://github.com/{}", username),
            Platform::X => format!("https://x.com/{}", username),
            Platform::Youtube => format!("https://youtube.com/@{}", username),
            Platform::Instagram => format!("https://instagram.com/{}", username),
            Platform::Dribbble => format!("https://dribbble.com/{}", username),
            Platform::Linkedin => format!("https://linkedin.com/in/{}", username),
        }
    }
}
