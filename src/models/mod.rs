mod nav;

pub use nav::{validate_tree, NavError, NavItem, NavKind, NavNode, NavSection};

use serde::{Deserialize, Serialize};

/// Backend user object.
///
/// Kept as an open map so new profile fields on the backend don't break sessions.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserProfile {
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn display_name(&self) -> Option<String> {
        ["name", "username", "email"]
            .iter()
            .find_map(|k| {
                self.extra
                    .get(*k)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.trim().is_empty())
            })
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
}

/// A record type stored under its own REST collection.
pub trait Resource: Serialize + for<'de> Deserialize<'de> + Clone {
    /// Collection path segment, e.g. `banner`.
    const COLLECTION: &'static str;

    fn id(&self) -> Option<&str>;
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// May carry inline markup (e.g. `<span>` highlights).
    pub banner_title: String,

    #[serde(default)]
    pub banner_content: String,

    #[serde(default)]
    pub banner_image: Vec<String>,
}

impl Banner {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if strip_tags(&self.banner_title).trim().is_empty() {
            return Err(ValidationError::Required("Banner title"));
        }
        Ok(())
    }
}

impl Resource for Banner {
    const COLLECTION: &'static str = "banner";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CouncilMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Council {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: Vec<CouncilMember>,
}

impl Council {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Required("Council title"));
        }
        if self.members.iter().any(|m| m.name.trim().is_empty()) {
            return Err(ValidationError::Required("Member name"));
        }
        Ok(())
    }
}

impl Resource for Council {
    const COLLECTION: &'static str = "council";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ApplyStep {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    /// HTML.
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OnlineApply {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub steps: Vec<ApplyStep>,
}

impl Resource for OnlineApply {
    const COLLECTION: &'static str = "onlineApply";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Marketing pages whose content is a free-form section document.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum ContentPage {
    About,
    Placement,
    Admission,
    FeeStructure,
    Research,
    Infrastructure,
}

impl ContentPage {
    /// Backend collection and route segment.
    pub fn slug(self) -> &'static str {
        match self {
            ContentPage::About => "about",
            ContentPage::Placement => "placement",
            ContentPage::Admission => "admission",
            ContentPage::FeeStructure => "feeStructure",
            ContentPage::Research => "research",
            ContentPage::Infrastructure => "infrastructure",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ContentPage::About => "About",
            ContentPage::Placement => "Placement",
            ContentPage::Admission => "Admission",
            ContentPage::FeeStructure => "Fee Structure",
            ContentPage::Research => "Research",
            ContentPage::Infrastructure => "Infrastructure",
        }
    }
}
