//! Idea Box endpoints: folders, ideas and tags.

use serde::Serialize;

use crate::core::folder::{FolderInput, IdeaFolder, Tag, TagWithCount};
use crate::core::idea::{Idea, IdeaCreate, IdeaFilter, IdeaPromoteToTask, IdeaUpdate};
use crate::core::task::Task;

use super::{ApiError, ApiRequest, Transport, call};

pub async fn list_folders(transport: &dyn Transport) -> Result<Vec<IdeaFolder>, ApiError> {
    call(transport, ApiRequest::get("/idea-box/folders/")).await
}

pub async fn create_folder(
    transport: &dyn Transport,
    data: &FolderInput,
) -> Result<IdeaFolder, ApiError> {
    call(transport, ApiRequest::post("/idea-box/folders/").json(data)?).await
}

pub async fn update_folder(
    transport: &dyn Transport,
    folder_id: &str,
    data: &FolderInput,
) -> Result<IdeaFolder, ApiError> {
    let req = ApiRequest::put(format!("/idea-box/folders/{}", folder_id)).json(data)?;
    call(transport, req).await
}

pub async fn delete_folder(transport: &dyn Transport, folder_id: &str) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::delete(format!("/idea-box/folders/{}", folder_id)))
        .await
        .map(|_| ())
}

/// Tags used inside a folder, with per-tag idea counts.
pub async fn folder_tags(
    transport: &dyn Transport,
    folder_id: &str,
) -> Result<Vec<TagWithCount>, ApiError> {
    call(transport, ApiRequest::get(format!("/idea-box/folders/{}/tags", folder_id))).await
}

pub async fn list_ideas(transport: &dyn Transport, filter: &IdeaFilter) -> Result<Vec<Idea>, ApiError> {
    call(transport, ApiRequest::get("/idea-box/ideas").query(filter.query_pairs())).await
}

pub async fn get_idea(transport: &dyn Transport, idea_id: &str) -> Result<Idea, ApiError> {
    call(transport, ApiRequest::get(format!("/idea-box/ideas/{}", idea_id))).await
}

pub async fn create_idea(transport: &dyn Transport, data: &IdeaCreate) -> Result<Idea, ApiError> {
    call(transport, ApiRequest::post("/idea-box/ideas/").json(data)?).await
}

pub async fn update_idea(
    transport: &dyn Transport,
    idea_id: &str,
    data: &IdeaUpdate,
) -> Result<Idea, ApiError> {
    call(transport, ApiRequest::put(format!("/idea-box/ideas/{}", idea_id)).json(data)?).await
}

pub async fn delete_idea(transport: &dyn Transport, idea_id: &str) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::delete(format!("/idea-box/ideas/{}", idea_id)))
        .await
        .map(|_| ())
}

/// Create a task from an idea. The server refuses a second promotion.
pub async fn promote_to_task(
    transport: &dyn Transport,
    idea_id: &str,
    data: &IdeaPromoteToTask,
) -> Result<Task, ApiError> {
    let req = ApiRequest::post(format!("/idea-box/ideas/{}/promote-to-task", idea_id)).json(data)?;
    call(transport, req).await
}

#[derive(Serialize)]
struct TagRename<'a> {
    name: &'a str,
}

pub async fn rename_tag(transport: &dyn Transport, tag_id: &str, name: &str) -> Result<Tag, ApiError> {
    let req = ApiRequest::put(format!("/idea-box/tags/{}", tag_id)).json(&TagRename { name })?;
    call(transport, req).await
}

pub async fn delete_tag(transport: &dyn Transport, tag_id: &str) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::delete(format!("/idea-box/tags/{}", tag_id)))
        .await
        .map(|_| ())
}
