use crate::error::{Result, StoreError};
use crate::task::{Task, TaskId};
use chrono::Local;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

pub const DEFAULT_FILE: &str = "tasks.json";

/// What `TaskStore::open` found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file yet; starting fresh.
    Missing,
    Loaded(usize),
    /// The file existed but could not be read or parsed. Its bytes were
    /// copied to `backup` (when that succeeded) before starting empty.
    Recovered {
        reason: String,
        backup: Option<PathBuf>,
    },
}

/// A task together with its position in the store and its stable id.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub index: usize,
    pub id: TaskId,
    pub task: &'a Task,
}

/// The ordered task list and the file it is mirrored to.
///
/// Every successful mutation rewrites the whole file. Invalid input (blank
/// titles, out of range indices, unknown ids) is a no-op and never touches
/// the disk. `Err` is only returned when persisting fails, in which case the
/// in-memory change has already been applied.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    ids: Vec<TaskId>,
    next_id: u64,
}

impl TaskStore {
    /// An empty store that will save to `path`. Nothing is read or written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tasks: Vec::new(),
            ids: Vec::new(),
            next_id: 0,
        }
    }

    /// Loads the store, falling back to an empty list on any problem.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        Self::open(path).0
    }

    pub fn open(path: impl Into<PathBuf>) -> (Self, LoadOutcome) {
        let mut store = Self::new(path);

        let data = match fs::read_to_string(&store.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %store.path.display(), "no task file yet, starting empty");
                return (store, LoadOutcome::Missing);
            }
            Err(err) => {
                let outcome = store.recover(format!("could not read file: {}", err));
                return (store, outcome);
            }
        };

        if data.trim().is_empty() {
            return (store, LoadOutcome::Loaded(0));
        }

        match serde_json::from_str::<Vec<Task>>(&data) {
            Ok(tasks) => {
                let count = tasks.len();
                for task in tasks {
                    store.push(task);
                }
                info!(path = %store.path.display(), count, "loaded tasks");
                (store, LoadOutcome::Loaded(count))
            }
            Err(err) => {
                let outcome = store.recover(format!("could not parse file: {}", err));
                (store, outcome)
            }
        }
    }

    fn recover(&self, reason: String) -> LoadOutcome {
        warn!(path = %self.path.display(), %reason, "task file unreadable, starting empty");

        let backup = sibling(
            &self.path,
            &format!(".corrupt-{}", Local::now().format("%Y%m%d-%H%M%S")),
        );
        let backup = match fs::copy(&self.path, &backup) {
            Ok(_) => {
                info!(backup = %backup.display(), "preserved unreadable task file");
                Some(backup)
            }
            Err(err) => {
                warn!(backup = %backup.display(), error = %err, "failed to preserve task file");
                None
            }
        };

        LoadOutcome::Recovered { reason, backup }
    }

    /// Writes the whole list to a temporary sibling and renames it over the
    /// target, so an interrupted save leaves the previous file intact.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.tasks)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = sibling(&self.path, ".tmp");
        fs::write(&tmp, content).map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&self.path, err));
        }

        debug!(path = %self.path.display(), count = self.tasks.len(), "saved tasks");
        Ok(())
    }

    pub fn add(&mut self, title: &str) -> Result<Option<TaskId>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let id = self.push(Task::new(title));
        debug!(%id, title, "added task");
        self.save()?;
        Ok(Some(id))
    }

    pub fn delete(&mut self, index: usize) -> Result<bool> {
        if index >= self.tasks.len() {
            return Ok(false);
        }

        let task = self.tasks.remove(index);
        let id = self.ids.remove(index);
        debug!(%id, index, title = %task.title, "deleted task");
        self.save()?;
        Ok(true)
    }

    pub fn toggle_complete(&mut self, index: usize) -> Result<bool> {
        let Some(task) = self.tasks.get_mut(index) else {
            return Ok(false);
        };

        task.toggle();
        debug!(index, completed = task.completed, "toggled task");
        self.save()?;
        Ok(true)
    }

    pub fn delete_by_id(&mut self, id: TaskId) -> Result<bool> {
        match self.position(id) {
            Some(index) => self.delete(index),
            None => Ok(false),
        }
    }

    pub fn toggle_by_id(&mut self, id: TaskId) -> Result<bool> {
        match self.position(id) {
            Some(index) => self.toggle_complete(index),
            None => Ok(false),
        }
    }

    /// Tasks whose title contains `query`, ignoring case, paired with their
    /// store index. An empty query matches everything.
    pub fn filter(&self, query: &str) -> Vec<(usize, &Task)> {
        self.filter_entries(query)
            .into_iter()
            .map(|entry| (entry.index, entry.task))
            .collect()
    }

    pub fn filter_entries(&self, query: &str) -> Vec<Entry<'_>> {
        let needle = query.to_lowercase();
        self.entries().filter(|e| e.task.matches(&needle)).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.tasks
            .iter()
            .zip(self.ids.iter())
            .enumerate()
            .map(|(index, (task, &id))| Entry { index, id, task })
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.ids.iter().position(|&other| other == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.position(id).map(|index| &self.tasks[index])
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn push(&mut self, task: Task) -> TaskId {
        let id = TaskId::new(self.next_id);
        self.next_id += 1;
        self.tasks.push(task);
        self.ids.push(id);
        id
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
