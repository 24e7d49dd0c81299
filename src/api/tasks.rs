use crate::core::task::{Task, TaskCreate, TaskUpdate};

use super::{ApiError, ApiRequest, Transport, call};

pub async fn list(transport: &dyn Transport) -> Result<Vec<Task>, ApiError> {
    call(transport, ApiRequest::get("/tasks/")).await
}

pub async fn create(transport: &dyn Transport, data: &TaskCreate) -> Result<Task, ApiError> {
    call(transport, ApiRequest::post("/tasks/").json(data)?).await
}

/// The response body is not decoded; any 2xx counts as accepted.
pub async fn update(transport: &dyn Transport, task_id: &str, data: &TaskUpdate) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::put(format!("/tasks/{}", task_id)).json(data)?)
        .await
        .map(|_| ())
}

pub async fn delete(transport: &dyn Transport, task_id: &str) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::delete(format!("/tasks/{}", task_id)))
        .await
        .map(|_| ())
}
