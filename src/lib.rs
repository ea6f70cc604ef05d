//! xDo - a terminal task list backed by a JSON file

pub mod app;
pub mod cli;
pub mod error;
pub mod logging;
pub mod store;
pub mod task;
pub mod ui;

pub use app::{Action, App, Command};
pub use error::StoreError;
pub use store::{Entry, LoadOutcome, TaskStore};
pub use task::{Task, TaskId};
