use std::sync::Arc;

use ascend::api::{self, HttpClient, Transport};
use ascend::config::AscendConfig;
use ascend::core::idea::IdeaFilter;
use ascend::core::tags::format_tags;
use ascend::core::task::{Task, TaskCreate, TaskStatus};
use ascend::core::widget;
use ascend::refresh::{LinkRefresher, Preview, RefreshPhase};
use ascend::store::{IdeaBox, Notice, Notifier, TaskStore};
use tokio::sync::mpsc::UnboundedReceiver;

const USAGE: &str = "\
Usage: ascend <command>

  login <username> <password>   Sign in and store the token in the keyring
  logout                        Forget the stored token
  tasks [list]                  Show the task board
  tasks add <title>             Create a task
  tasks move <id> <status>      Move a task (todo, in_progress, done)
  tasks rm <id>                 Delete a task
  ideas <folder-id>             List ideas in a folder
  preview <idea-id>             Wait for a link idea's preview";

fn init_logging(debug: bool) {
    // Journal wrapper: ascend crate at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("ascend") {
                let max = if ascend::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    ascend::set_debug_logging(debug);

    // No journal (containers, macOS): run without logging rather than fail.
    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(j) => j.with_syslog_identifier("ascend".to_string()),
        Err(e) => {
            eprintln!("Journal logging unavailable: {}", e);
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so ascend debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AscendConfig::load()?;
    init_logging(config.debug_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let mut client = HttpClient::new(&config.api_base_url)?;

    match args.as_slice() {
        ["login", username, password] => {
            let token = api::auth::login(&client, username, password).await?;
            api::keyring::store_token(&config.api_base_url, &token.access_token).await?;
            log::info!("Logged in as {}", username);
            println!("Logged in as {}.", username);
            return Ok(());
        }
        ["logout"] => {
            api::keyring::delete_token(&config.api_base_url).await?;
            println!("Logged out.");
            return Ok(());
        }
        _ => {}
    }

    match api::keyring::load_token(&config.api_base_url).await? {
        Some(token) => client.set_token(Some(token)),
        None => {
            eprintln!("Not logged in. Run `ascend login <username> <password>` first.");
            std::process::exit(1);
        }
    }
    let transport: Arc<dyn Transport> = Arc::new(client);

    match args.as_slice() {
        ["tasks"] | ["tasks", "list"] => {
            let store = TaskStore::new(transport, Notifier::silent());
            store.load().await?;
            print_board(&store);
        }
        ["tasks", "add", title @ ..] if !title.is_empty() => {
            let (notifier, mut rx) = Notifier::channel();
            let store = TaskStore::new(transport, notifier);
            let result = store.create(TaskCreate::new(title.join(" "))).await;
            print_notices(&mut rx);
            let task = result?;
            println!("  {}", task_line(&task));
        }
        ["tasks", "move", id, status] => {
            let Some(status) = TaskStatus::parse(status) else {
                eprintln!("Unknown status '{}'", status);
                std::process::exit(2);
            };
            let (notifier, mut rx) = Notifier::channel();
            let store = TaskStore::new(transport, notifier);
            store.load().await?;
            match store.move_task(id, status) {
                Some(handle) => {
                    handle.await?;
                    print_notices(&mut rx);
                }
                None if store.get(id).is_some() => println!("Task already {}.", status.label()),
                None => println!("No task with id {}.", id),
            }
        }
        ["tasks", "rm", id] => {
            let (notifier, mut rx) = Notifier::channel();
            let store = TaskStore::new(transport, notifier);
            store.load().await?;
            store.delete(id).await?;
            print_notices(&mut rx);
        }
        ["ideas", folder_id] => {
            let ideas = IdeaBox::new(transport, Notifier::silent());
            ideas.load_ideas(IdeaFilter::folder(*folder_id)).await?;
            ideas.load_tags(folder_id).await?;
            for idea in ideas.ideas() {
                let title = idea.title.as_deref().or(idea.url.as_deref()).unwrap_or("(untitled)");
                let pin = if idea.is_pinned { "*" } else { " " };
                let tags = format_tags(&idea.tags);
                println!("{} {} [{}] {}  {}", pin, idea.id, idea.idea_type.as_str(), title, tags);
            }
            let tags: Vec<String> = ideas.tags().iter().map(|t| format!("{} ({})", t.name, t.idea_count)).collect();
            if !tags.is_empty() {
                println!("\nTags: {}", tags.join(", "));
            }
        }
        ["preview", idea_id] => {
            let idea = api::ideas::get_idea(&*transport, idea_id).await?;
            let refresher = LinkRefresher::new(transport, config.refresh());
            let mut handle = refresher.start(idea);
            let state = handle.settled().await;
            if let RefreshPhase::Settled(reason) = state.phase {
                log::debug!("Preview settled after {} polls: {:?}", state.attempts, reason);
            }
            match handle.preview() {
                Preview::Placeholder => println!("(no preview yet)"),
                Preview::Ready(preview) => {
                    println!("{}", preview.title);
                    if let Some(description) = preview.description {
                        println!("{}", description);
                    }
                    if let Some(url) = preview.url {
                        println!("link:  {}", url);
                    }
                    println!("image: {}", preview.image_url.as_deref().unwrap_or("(none)"));
                }
            }
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

fn print_board(store: &TaskStore) {
    let summary = store.summary();
    if let Some(spec) = widget::find("tasks-summary") {
        println!("{}: {}/{} done\n", spec.name, summary.done, summary.total);
    }
    for column in store.board().columns {
        println!("{} ({})", column.status.label(), column.tasks.len());
        for task in &column.tasks {
            println!("  {}", task_line(task));
        }
    }
}

fn task_line(task: &Task) -> String {
    let due = task
        .due_date
        .map(|d| format!("  due {}", d.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    format!("{}  {} [{}]{}", task.id, task.title, task.priority.as_str(), due)
}

fn print_notices(rx: &mut UnboundedReceiver<Notice>) {
    while let Ok(notice) = rx.try_recv() {
        if notice.is_error() {
            eprintln!("{}", notice.message);
        } else {
            println!("{}", notice.message);
        }
    }
}
