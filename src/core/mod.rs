pub mod board;
pub mod draft;
pub mod folder;
pub mod idea;
pub mod tags;
pub mod task;
pub mod timestamp;
pub mod user;
pub mod widget;
