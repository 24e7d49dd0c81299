pub mod ideas;
pub mod notice;
pub mod tasks;

pub use ideas::IdeaBox;
pub use notice::{Notice, NoticeLevel, Notifier};
pub use tasks::TaskStore;
