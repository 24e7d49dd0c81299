use reqwest::Url;
use thiserror::Error;

use super::idea::{Idea, IdeaCreate, IdeaType, IdeaUpdate};
use super::tags::{format_tags, parse_tags};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Title is required for text ideas")]
    MissingTitle,
    #[error("URL is required for link ideas")]
    MissingUrl,
    #[error("Please enter a valid URL")]
    InvalidUrl,
}

/// Editable form state for an idea. Every field is a plain string the way a
/// form holds it; `tags` is comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaDraft {
    pub idea_type: IdeaType,
    pub title: String,
    pub content: String,
    pub url: String,
    pub tags: String,
}

impl IdeaDraft {
    /// Pre-fill the form from an existing idea.
    pub fn from_idea(idea: &Idea) -> Self {
        Self {
            idea_type: idea.idea_type,
            title: idea.title.clone().unwrap_or_default(),
            content: idea.content.clone().unwrap_or_default(),
            url: idea.url.clone().unwrap_or_default(),
            tags: format_tags(&idea.tags),
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        let url = self.url.trim();
        if !url.is_empty() {
            let parsed = Url::parse(url).map_err(|_| DraftError::InvalidUrl)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DraftError::InvalidUrl);
            }
        }
        match self.idea_type {
            IdeaType::Text if self.title.trim().is_empty() => Err(DraftError::MissingTitle),
            IdeaType::Link if url.is_empty() => Err(DraftError::MissingUrl),
            _ => Ok(()),
        }
    }

    pub fn into_create(self, folder_id: impl Into<String>) -> Result<IdeaCreate, DraftError> {
        self.validate()?;
        Ok(IdeaCreate {
            folder_id: folder_id.into(),
            idea_type: self.idea_type,
            title: non_blank(&self.title),
            content: non_blank(&self.content),
            url: non_blank(&self.url),
            tags: parse_tags(&self.tags),
        })
    }

    /// Every text field is sent, blank ones as `""`, so clearing a field in
    /// the form clears it on the server.
    pub fn into_update(self) -> Result<IdeaUpdate, DraftError> {
        self.validate()?;
        Ok(IdeaUpdate {
            title: Some(self.title.trim().to_string()),
            content: Some(self.content.trim().to_string()),
            url: Some(self.url.trim().to_string()),
            tags: Some(parse_tags(&self.tags)),
            ..IdeaUpdate::default()
        })
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_idea_needs_title() {
        let draft = IdeaDraft {
            content: "body".into(),
            ..IdeaDraft::default()
        };
        assert_eq!(draft.validate(), Err(DraftError::MissingTitle));
    }

    #[test]
    fn link_idea_needs_url() {
        let draft = IdeaDraft {
            idea_type: IdeaType::Link,
            ..IdeaDraft::default()
        };
        assert_eq!(draft.validate(), Err(DraftError::MissingUrl));
    }

    #[test]
    fn rejects_non_http_url() {
        let draft = IdeaDraft {
            idea_type: IdeaType::Link,
            url: "ftp://example.com/file".into(),
            ..IdeaDraft::default()
        };
        assert_eq!(draft.validate(), Err(DraftError::InvalidUrl));

        let draft = IdeaDraft {
            idea_type: IdeaType::Link,
            url: "not a url".into(),
            ..IdeaDraft::default()
        };
        assert_eq!(draft.validate(), Err(DraftError::InvalidUrl));
    }

    #[test]
    fn create_coerces_fields() {
        let draft = IdeaDraft {
            idea_type: IdeaType::Link,
            title: "  ".into(),
            url: "https://example.com".into(),
            tags: "read, later,".into(),
            ..IdeaDraft::default()
        };
        let create = draft.into_create("f1").unwrap();
        assert_eq!(create.folder_id, "f1");
        assert_eq!(create.title, None);
        assert_eq!(create.url.as_deref(), Some("https://example.com"));
        assert_eq!(create.tags, vec!["read", "later"]);
    }

    #[test]
    fn update_always_replaces_tags() {
        let draft = IdeaDraft {
            title: "Plan".into(),
            ..IdeaDraft::default()
        };
        let update = draft.into_update().unwrap();
        assert_eq!(update.tags, Some(Vec::new()));
        assert_eq!(update.title.as_deref(), Some("Plan"));
    }

    #[test]
    fn update_sends_cleared_fields() {
        let draft = IdeaDraft {
            title: " Plan ".into(),
            content: "   ".into(),
            ..IdeaDraft::default()
        };
        let update = draft.into_update().unwrap();
        assert_eq!(update.title.as_deref(), Some("Plan"));
        assert_eq!(update.content.as_deref(), Some(""));
        assert_eq!(update.url.as_deref(), Some(""));

        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["content"], "");
        assert_eq!(body["url"], "");
    }
}
