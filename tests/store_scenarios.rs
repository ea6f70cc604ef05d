use chrono::NaiveDateTime;
use std::fs;
use tempfile::TempDir;
use xdo::task::CREATED_AT_FORMAT;
use xdo::{App, Command, LoadOutcome, TaskStore};

fn tasks_path(temp: &TempDir) -> std::path::PathBuf {
    temp.path().join("tasks.json")
}

#[test]
fn add_then_reload_returns_identical_task() {
    let temp = TempDir::new().unwrap();
    let path = tasks_path(&temp);

    let (mut store, outcome) = TaskStore::open(&path);
    assert_eq!(outcome, LoadOutcome::Missing);
    assert!(store.is_empty());

    store.add("Buy milk").unwrap();
    assert_eq!(store.len(), 1);
    assert!(!store.tasks()[0].completed);
    assert!(NaiveDateTime::parse_from_str(&store.tasks()[0].created_at, CREATED_AT_FORMAT).is_ok());

    store.save().unwrap();
    let (reloaded, outcome) = TaskStore::open(&path);
    assert_eq!(outcome, LoadOutcome::Loaded(1));
    assert_eq!(reloaded.tasks(), store.tasks());
}

#[test]
fn delete_middle_task_keeps_order() {
    let temp = TempDir::new().unwrap();
    let mut store = TaskStore::new(tasks_path(&temp));
    for title in ["A", "B", "C"] {
        store.add(title).unwrap();
    }

    store.delete(1).unwrap();

    let titles: Vec<&str> = store.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["A", "C"]);
}

#[test]
fn filter_returns_original_indices() {
    let temp = TempDir::new().unwrap();
    let mut store = TaskStore::new(tasks_path(&temp));
    store.add("Write report").unwrap();
    store.add("Write tests").unwrap();

    let both: Vec<usize> = store.filter("write").iter().map(|(i, _)| *i).collect();
    assert_eq!(both, [0, 1]);

    let tests: Vec<usize> = store.filter("tests").iter().map(|(i, _)| *i).collect();
    assert_eq!(tests, [1]);
}

#[test]
fn toggle_twice_restores_completion() {
    let temp = TempDir::new().unwrap();
    let mut store = TaskStore::new(tasks_path(&temp));
    store.add("X").unwrap();

    store.toggle_complete(0).unwrap();
    assert!(store.tasks()[0].completed);
    store.toggle_complete(0).unwrap();
    assert!(!store.tasks()[0].completed);

    assert!(!TaskStore::load(tasks_path(&temp)).tasks()[0].completed);
}

#[test]
fn reads_file_written_by_hand() {
    let temp = TempDir::new().unwrap();
    let path = tasks_path(&temp);
    fs::write(
        &path,
        r#"[
  {
    "title": "Pay rent",
    "completed": true,
    "created_at": "2024-03-01 08:30"
  },
  {
    "title": "Pay rent",
    "completed": false,
    "created_at": "2024-04-01 08:30"
  }
]"#,
    )
    .unwrap();

    let store = TaskStore::load(&path);

    assert_eq!(store.len(), 2);
    assert!(store.tasks()[0].completed);
    assert_eq!(store.tasks()[1].created_at, "2024-04-01 08:30");
    assert_eq!(store.completed_count(), 1);
}

#[test]
fn filtered_view_mutates_the_selected_task() {
    let temp = TempDir::new().unwrap();
    let path = tasks_path(&temp);
    let mut store = TaskStore::new(&path);
    for title in ["Email Bob", "Groceries", "Email Alice"] {
        store.add(title).unwrap();
    }
    let mut app = App::new(store);

    app.dispatch(Command::SearchChanged("alice".to_string()));
    app.dispatch(Command::ToggleRequested(0));
    app.dispatch(Command::ClearSearch);
    app.dispatch(Command::DeleteRequested(0));

    let reloaded = TaskStore::load(&path);
    let state: Vec<(&str, bool)> = reloaded
        .tasks()
        .iter()
        .map(|t| (t.title.as_str(), t.completed))
        .collect();
    assert_eq!(state, [("Groceries", false), ("Email Alice", true)]);
}
