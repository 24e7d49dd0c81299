//! Idea Box state: folders, the ideas of the selected folder and that
//! folder's tag counts. Mutations here are not optimistic; each success
//! refetches the affected lists.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{self, ApiError, Transport};
use crate::core::folder::{FolderInput, IdeaFolder, TagWithCount};
use crate::core::idea::{Idea, IdeaCreate, IdeaFilter, IdeaPromoteToTask, IdeaUpdate};
use crate::core::task::Task;

use super::notice::Notifier;

#[derive(Debug, Default)]
struct IdeaBoxState {
    folders: Vec<IdeaFolder>,
    ideas: Vec<Idea>,
    tags: Vec<TagWithCount>,
    filter: IdeaFilter,
    loading_ideas: bool,
    error: Option<ApiError>,
}

#[derive(Clone)]
pub struct IdeaBox {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<IdeaBoxState>>,
    notices: Notifier,
}

impl IdeaBox {
    pub fn new(transport: Arc<dyn Transport>, notices: Notifier) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(IdeaBoxState::default())),
            notices,
        }
    }

    fn lock(&self) -> MutexGuard<'_, IdeaBoxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn folders(&self) -> Vec<IdeaFolder> {
        self.lock().folders.clone()
    }

    pub fn ideas(&self) -> Vec<Idea> {
        self.lock().ideas.clone()
    }

    pub fn tags(&self) -> Vec<TagWithCount> {
        self.lock().tags.clone()
    }

    pub fn filter(&self) -> IdeaFilter {
        self.lock().filter.clone()
    }

    pub fn is_loading_ideas(&self) -> bool {
        self.lock().loading_ideas
    }

    pub fn error(&self) -> Option<ApiError> {
        self.lock().error.clone()
    }

    pub async fn load_folders(&self) -> Result<(), ApiError> {
        let result = api::ideas::list_folders(&*self.transport).await;
        let mut state = self.lock();
        match result {
            Ok(folders) => {
                log::debug!("Loaded {} idea folders", folders.len());
                state.folders = folders;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load folders: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn create_folder(&self, input: FolderInput) -> Result<IdeaFolder, ApiError> {
        let result = api::ideas::create_folder(&*self.transport, &input).await;
        self.after_folder_change(result, "Folder created!", "Failed to create folder.")
            .await
    }

    pub async fn update_folder(&self, folder_id: &str, input: FolderInput) -> Result<IdeaFolder, ApiError> {
        let result = api::ideas::update_folder(&*self.transport, folder_id, &input).await;
        self.after_folder_change(result, "Folder updated!", "Failed to update folder.")
            .await
    }

    pub async fn delete_folder(&self, folder_id: &str) -> Result<(), ApiError> {
        let result = api::ideas::delete_folder(&*self.transport, folder_id).await;
        self.after_folder_change(result, "Folder deleted!", "Failed to delete folder.")
            .await
    }

    async fn after_folder_change<T>(
        &self,
        result: Result<T, ApiError>,
        success: &str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                // A failed refetch is recorded in `error`; the mutation itself succeeded.
                let _ = self.load_folders().await;
                self.notices.success(success);
                Ok(value)
            }
            Err(e) => {
                self.notify_failure(&e, fallback);
                Err(e)
            }
        }
    }

    /// Load ideas matching `filter`. Nothing is fetched without a folder.
    /// The previous list stays visible until the new one arrives.
    pub async fn load_ideas(&self, filter: IdeaFilter) -> Result<(), ApiError> {
        {
            let mut state = self.lock();
            state.filter = filter.clone();
            if filter.folder_id.is_none() {
                state.ideas.clear();
                // Any load still in flight is superseded and will not reset it.
                state.loading_ideas = false;
                return Ok(());
            }
            state.loading_ideas = true;
        }

        let result = api::ideas::list_ideas(&*self.transport, &filter).await;

        let mut state = self.lock();
        // A newer filter may have been requested while this one was in flight.
        if state.filter != filter {
            log::debug!("Discarding ideas for superseded filter {:?}", filter);
            return result.map(|_| ());
        }
        state.loading_ideas = false;
        match result {
            Ok(ideas) => {
                log::debug!("Loaded {} ideas", ideas.len());
                state.ideas = ideas;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load ideas: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn load_tags(&self, folder_id: &str) -> Result<(), ApiError> {
        let tags = api::ideas::folder_tags(&*self.transport, folder_id).await?;
        self.lock().tags = tags;
        Ok(())
    }

    pub async fn create_idea(&self, input: IdeaCreate) -> Result<Idea, ApiError> {
        let result = api::ideas::create_idea(&*self.transport, &input).await;
        self.after_idea_change(result, "Idea created!", "Failed to create idea.")
            .await
    }

    pub async fn update_idea(&self, idea_id: &str, input: IdeaUpdate) -> Result<Idea, ApiError> {
        let result = api::ideas::update_idea(&*self.transport, idea_id, &input).await;
        self.after_idea_change(result, "Idea updated!", "Failed to update idea.")
            .await
    }

    pub async fn delete_idea(&self, idea_id: &str) -> Result<(), ApiError> {
        let result = api::ideas::delete_idea(&*self.transport, idea_id).await;
        self.after_idea_change(result, "Idea deleted!", "Failed to delete idea.")
            .await
    }

    pub async fn promote_to_task(&self, idea_id: &str, input: IdeaPromoteToTask) -> Result<Task, ApiError> {
        match api::ideas::promote_to_task(&*self.transport, idea_id, &input).await {
            Ok(task) => {
                log::info!("Promoted idea {} to task {}", idea_id, task.id);
                self.notices.success("Idea promoted to task!");
                Ok(task)
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to promote idea.");
                Err(e)
            }
        }
    }

    async fn after_idea_change<T>(
        &self,
        result: Result<T, ApiError>,
        success: &str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.refresh_current().await;
                self.notices.success(success);
                Ok(value)
            }
            Err(e) => {
                self.notify_failure(&e, fallback);
                Err(e)
            }
        }
    }

    /// Refetch ideas for the current filter and the folder's tag counts.
    async fn refresh_current(&self) {
        let filter = self.filter();
        let Some(folder_id) = filter.folder_id.clone() else {
            return;
        };
        if let Err(e) = self.load_ideas(filter).await {
            log::warn!("Refetching ideas failed: {}", e);
        }
        if let Err(e) = self.load_tags(&folder_id).await {
            log::warn!("Refetching tags for folder {} failed: {}", folder_id, e);
        }
    }

    fn notify_failure(&self, err: &ApiError, fallback: &str) {
        log::warn!("{} {}", fallback, err);
        let message = err.to_string();
        if message.is_empty() {
            self.notices.error(fallback);
        } else {
            self.notices.error(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::store::notice::{Notice, NoticeLevel};
    use reqwest::Method;
    use serde_json::{Value, json};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn idea_json(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "folder_id": "f1",
            "idea_type": "text",
            "title": title,
            "content": null,
            "url": null,
            "is_pinned": false,
            "tags": [],
            "link_metadata": null,
        })
    }

    fn setup() -> (IdeaBox, Arc<MockTransport>, UnboundedReceiver<Notice>) {
        let mock = Arc::new(MockTransport::new());
        let (notifier, rx) = Notifier::channel();
        (IdeaBox::new(mock.clone(), notifier), mock, rx)
    }

    #[tokio::test]
    async fn no_folder_means_no_fetch() {
        let (ideas, mock, _rx) = setup();
        ideas.load_ideas(IdeaFilter::default()).await.unwrap();
        assert_eq!(mock.call_count(), 0);
        assert!(ideas.ideas().is_empty());
    }

    #[tokio::test]
    async fn filtered_load_sends_query() {
        let (ideas, mock, _rx) = setup();
        mock.respond_ok(json!([idea_json("n1", "Plan")]));

        let filter = IdeaFilter {
            folder_id: Some("f1".into()),
            query: Some("plan".into()),
            tags: vec!["work".into()],
        };
        ideas.load_ideas(filter).await.unwrap();

        assert_eq!(ideas.ideas().len(), 1);
        let call = &mock.calls()[0];
        assert_eq!(call.path, "/idea-box/ideas");
        assert_eq!(
            call.query,
            vec![
                ("folder_id", "f1".to_string()),
                ("q", "plan".to_string()),
                ("tags", "work".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn previous_ideas_stay_visible_while_reloading() {
        let (ideas, mock, _rx) = setup();
        mock.respond_ok(json!([idea_json("n1", "Plan")]));
        ideas.load_ideas(IdeaFilter::folder("f1")).await.unwrap();

        let gate = mock.defer();
        let loader = ideas.clone();
        let pending = tokio::spawn(async move {
            loader
                .load_ideas(IdeaFilter {
                    query: Some("x".into()),
                    ..IdeaFilter::folder("f1")
                })
                .await
        });
        while mock.call_count() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(ideas.is_loading_ideas());
        assert_eq!(ideas.ideas().len(), 1);

        gate.send(Ok(json!([]))).unwrap();
        pending.await.unwrap().unwrap();
        assert!(ideas.ideas().is_empty());
        assert!(!ideas.is_loading_ideas());
    }

    #[tokio::test]
    async fn deselecting_folder_mid_load_clears_loading() {
        let (ideas, mock, _rx) = setup();
        let gate = mock.defer();
        let loader = ideas.clone();
        let pending = tokio::spawn(async move { loader.load_ideas(IdeaFilter::folder("f1")).await });
        while mock.call_count() < 1 {
            tokio::task::yield_now().await;
        }
        assert!(ideas.is_loading_ideas());

        ideas.load_ideas(IdeaFilter::default()).await.unwrap();
        assert!(!ideas.is_loading_ideas());

        gate.send(Ok(json!([idea_json("n1", "Plan")]))).unwrap();
        pending.await.unwrap().unwrap();
        assert!(!ideas.is_loading_ideas());
        assert!(ideas.ideas().is_empty());
    }

    #[tokio::test]
    async fn create_idea_refetches_ideas_and_tags() {
        let (ideas, mock, mut rx) = setup();
        mock.respond_ok(json!([]));
        ideas.load_ideas(IdeaFilter::folder("f1")).await.unwrap();

        mock.respond_ok(idea_json("n2", "New"));
        mock.respond_ok(json!([idea_json("n2", "New")]));
        mock.respond_ok(json!([{"id": "g1", "name": "work", "idea_count": 1}]));

        let input = IdeaCreate {
            folder_id: "f1".into(),
            idea_type: Default::default(),
            title: Some("New".into()),
            content: None,
            url: None,
            tags: vec!["work".into()],
        };
        let created = ideas.create_idea(input).await.unwrap();
        assert_eq!(created.id, "n2");
        assert_eq!(ideas.ideas().len(), 1);
        assert_eq!(ideas.tags()[0].idea_count, 1);

        let paths: Vec<String> = mock.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            vec![
                "/idea-box/ideas",
                "/idea-box/ideas/",
                "/idea-box/ideas",
                "/idea-box/folders/f1/tags",
            ]
        );
        assert_eq!(rx.try_recv().unwrap().message, "Idea created!");
    }

    #[tokio::test]
    async fn failure_notice_carries_server_message() {
        let (ideas, mock, mut rx) = setup();
        mock.respond_err(ApiError::server(409, "This idea has already been promoted to a task"));

        let input = IdeaPromoteToTask {
            task_title: "Do it".into(),
            task_description: None,
        };
        assert!(ideas.promote_to_task("n1", input).await.is_err());

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "This idea has already been promoted to a task");
        assert_eq!(mock.calls()[0].path, "/idea-box/ideas/n1/promote-to-task");
    }

    #[tokio::test]
    async fn folder_mutation_refetches_folders() {
        let (ideas, mock, mut rx) = setup();
        mock.respond_ok(json!({"id": "f2", "name": "Reading", "icon": null}));
        mock.respond_ok(json!([{"id": "f2", "name": "Reading", "icon": null}]));

        ideas.create_folder(FolderInput::new("Reading")).await.unwrap();
        assert_eq!(ideas.folders()[0].name, "Reading");
        assert_eq!(mock.calls()[1].method, Method::GET);
        assert_eq!(rx.try_recv().unwrap().message, "Folder created!");

        mock.respond_err(ApiError::Transport("offline".into()));
        assert!(ideas.delete_folder("f2").await.is_err());
        assert!(rx.try_recv().unwrap().is_error());
        assert_eq!(ideas.folders().len(), 1);
    }
}
