use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaFolder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Body for creating or renaming a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderInput {
    pub name: String,
    pub icon: Option<String>,
}

impl FolderInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagWithCount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub idea_count: u32,
}
