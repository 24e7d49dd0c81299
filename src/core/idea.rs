use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::folder::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaType {
    #[default]
    Text,
    Link,
    Image,
}

impl IdeaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Link => "link",
            Self::Image => "image",
        }
    }
}

/// Link preview data filled in by the server's enrichment job. Each field
/// starts empty and is populated independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl LinkMetadata {
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub idea_type: IdeaType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_opt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_opt")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub link_metadata: Option<LinkMetadata>,
}

impl Idea {
    pub fn is_link(&self) -> bool {
        self.idea_type == IdeaType::Link
    }

    pub fn has_preview_image(&self) -> bool {
        self.link_metadata.as_ref().is_some_and(LinkMetadata::has_image)
    }

    /// Whether a link preview still needs enriching.
    pub fn needs_enrichment(&self) -> bool {
        self.is_link() && !self.has_preview_image()
    }
}

/// Body of `POST /idea-box/ideas/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaCreate {
    pub folder_id: String,
    pub idea_type: IdeaType,
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

/// Body of `PUT /idea-box/ideas/{id}`. `tags`, when present, replaces the
/// whole tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdeaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body of `POST /idea-box/ideas/{id}/promote-to-task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaPromoteToTask {
    pub task_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
}

/// Query filters for listing ideas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaFilter {
    pub folder_id: Option<String>,
    pub query: Option<String>,
    pub tags: Vec<String>,
}

impl IdeaFilter {
    pub fn folder(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: Some(folder_id.into()),
            ..Self::default()
        }
    }

    /// Query pairs, one `tags` pair per tag; empty filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(folder_id) = self.folder_id.as_deref().filter(|f| !f.is_empty()) {
            pairs.push(("folder_id", folder_id.to_string()));
        }
        if let Some(q) = self.query.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        for tag in &self.tags {
            pairs.push(("tags", tag.clone()));
        }
        pairs
    }
}
