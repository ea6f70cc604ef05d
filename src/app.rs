//! Controller state: turns key and mouse input into store operations

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use tui_input::{Input, InputRequest};

use crate::error::StoreError;
use crate::store::{LoadOutcome, TaskStore};
use crate::task::{Task, TaskId};

/// Symbolic keybindings. Each one maps to a single store call or focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Add,
    Delete,
    ToggleComplete,
    FocusSearch,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('a') => Some(Action::Add),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
            KeyCode::Char('c') | KeyCode::Char(' ') => Some(Action::ToggleComplete),
            KeyCode::Char('/') => Some(Action::FocusSearch),
            _ => None,
        }
    }
}

/// Input events the view produces. Row numbers are display indices into the
/// current (possibly filtered) view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddSubmitted(String),
    DeleteRequested(usize),
    ToggleRequested(usize),
    SearchChanged(String),
    ClearSearch,
}

/// Clickable buttons in the controls area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Add,
    ToggleComplete,
    Delete,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Add, Button::ToggleComplete, Button::Delete];

    pub fn label(self) -> &'static str {
        match self {
            Button::Add => "[Add]",
            Button::ToggleComplete => "[Mark Complete/Incomplete]",
            Button::Delete => "[Delete]",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Adding,
    Searching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

pub struct App {
    store: TaskStore,
    mode: Mode,
    pub(crate) new_task: Input,
    pub(crate) search: Input,
    query: String,
    /// Ids of the rows currently on screen, in display order.
    visible: Vec<TaskId>,
    pub(crate) table_state: TableState,
    /// Where the table was last drawn, for mouse hit testing.
    pub(crate) table_area: Rect,
    /// Where each control button was last drawn.
    pub(crate) button_areas: Vec<(Button, Rect)>,
    status: Option<StatusMessage>,
    pub(crate) show_help: bool,
    should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        let mut app = Self {
            store,
            mode: Mode::Normal,
            new_task: Input::default(),
            search: Input::default(),
            query: String::new(),
            visible: Vec::new(),
            table_state: TableState::default(),
            table_area: Rect::default(),
            button_areas: Vec::new(),
            status: None,
            show_help: false,
            should_quit: false,
        };
        app.refresh_view();
        app
    }

    pub fn report_load(&mut self, outcome: &LoadOutcome) {
        if let LoadOutcome::Recovered { reason, backup } = outcome {
            let text = match backup {
                Some(backup) => format!(
                    "Could not load {} ({}); original kept at {}",
                    self.store.path().display(),
                    reason,
                    backup.display()
                ),
                None => format!(
                    "Could not load {} ({}); starting empty",
                    self.store.path().display(),
                    reason
                ),
            };
            self.set_status(StatusLevel::Warning, text);
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The filtered view as `(display index, task)` pairs.
    pub fn rows(&self) -> Vec<(usize, &Task)> {
        self.store
            .filter_entries(&self.query)
            .into_iter()
            .map(|entry| entry.task)
            .enumerate()
            .collect()
    }

    pub fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.selected().and_then(|row| self.visible.get(row).copied())
    }

    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::AddSubmitted(title) => match self.store.add(&title) {
                Ok(Some(id)) => {
                    self.refresh_view();
                    self.select_id(id);
                    self.set_status(StatusLevel::Info, format!("Added \"{}\"", title.trim()));
                }
                Ok(None) => {}
                Err(err) => {
                    self.refresh_view();
                    self.report_save_error(err);
                }
            },
            Command::DeleteRequested(row) => {
                let Some(&id) = self.visible.get(row) else {
                    return;
                };
                let result = self.store.delete_by_id(id);
                self.refresh_view();
                match result {
                    Ok(true) => self.set_status(StatusLevel::Info, "Deleted task".to_string()),
                    Ok(false) => {}
                    Err(err) => self.report_save_error(err),
                }
            }
            Command::ToggleRequested(row) => {
                let Some(&id) = self.visible.get(row) else {
                    return;
                };
                let result = self.store.toggle_by_id(id);
                self.refresh_view();
                if let Err(err) = result {
                    self.report_save_error(err);
                }
            }
            Command::SearchChanged(query) => {
                self.query = query;
                self.refresh_view();
            }
            Command::ClearSearch => {
                self.query.clear();
                self.search.reset();
                self.refresh_view();
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Release => return,
            KeyEventKind::Repeat if !self.repeats(key) => return,
            _ => {}
        }
        match self.mode {
            Mode::Adding => self.handle_adding_key(key),
            Mode::Searching => self.handle_search_key(key),
            Mode::Normal => self.handle_normal_key(key),
        }
    }

    /// Held keys repeat for movement and typing only, so holding `d` or
    /// Enter cannot delete or add more than once.
    fn repeats(&self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => matches!(
                key.code,
                KeyCode::Up
                    | KeyCode::Down
                    | KeyCode::PageUp
                    | KeyCode::PageDown
                    | KeyCode::Char('j')
                    | KeyCode::Char('k')
            ),
            Mode::Adding | Mode::Searching => !matches!(key.code, KeyCode::Enter | KeyCode::Esc),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        if self.show_help && matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            self.show_help = false;
            return;
        }

        if let Some(action) = Action::from_key(key) {
            self.perform(action);
            return;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home | KeyCode::Char('g') => self.select_row(0),
            KeyCode::End | KeyCode::Char('G') => {
                if let Some(last) = self.visible.len().checked_sub(1) {
                    self.select_row(last);
                }
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc => {
                if !self.query.is_empty() {
                    self.dispatch(Command::ClearSearch);
                }
                self.status = None;
            }
            _ => {}
        }
    }

    pub fn perform(&mut self, action: Action) {
        self.show_help = false;
        match action {
            Action::Quit => self.should_quit = true,
            Action::Add => self.mode = Mode::Adding,
            Action::FocusSearch => self.mode = Mode::Searching,
            Action::Delete => {
                if let Some(row) = self.selected() {
                    self.dispatch(Command::DeleteRequested(row));
                }
            }
            Action::ToggleComplete => {
                if let Some(row) = self.selected() {
                    self.dispatch(Command::ToggleRequested(row));
                }
            }
        }
    }

    fn handle_adding_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter => {
                self.submit_new_task();
            }
            KeyCode::Esc => {
                self.new_task.reset();
                self.mode = Mode::Normal;
            }
            _ => {
                if let Some(request) = input_request(key) {
                    self.new_task.handle(request);
                }
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.dispatch(Command::ClearSearch);
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            _ => {
                let Some(request) = input_request(key) else {
                    return;
                };
                let changed = self.search.handle(request).is_some_and(|c| c.value);
                if changed {
                    self.dispatch(Command::SearchChanged(self.search.value().to_string()));
                }
            }
        }
    }

    fn submit_new_task(&mut self) {
        let title = self.new_task.value().to_string();
        self.new_task.reset();
        self.mode = Mode::Normal;
        self.dispatch(Command::AddSubmitted(title));
    }

    pub fn press(&mut self, button: Button) {
        match button {
            Button::Add => self.submit_new_task(),
            Button::ToggleComplete => self.perform(Action::ToggleComplete),
            Button::Delete => self.perform(Action::Delete),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.move_selection(-1),
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(button) = self.button_at(mouse.column, mouse.row) {
                    self.press(button);
                } else if let Some(row) = self.row_at(mouse.column, mouse.row) {
                    self.select_row(row);
                }
            }
            _ => {}
        }
    }

    fn button_at(&self, column: u16, row: u16) -> Option<Button> {
        self.button_areas
            .iter()
            .find(|(_, area)| {
                column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
            })
            .map(|&(button, _)| button)
    }

    /// Display row under a screen position. The table has a border and a
    /// header line above the first row.
    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.table_area;
        let first_row_y = area.y.saturating_add(2);
        let inside_x = column > area.x && column < area.right().saturating_sub(1);
        let inside_y = row >= first_row_y && row < area.bottom().saturating_sub(1);
        if !inside_x || !inside_y {
            return None;
        }
        let index = (row - first_row_y) as usize + self.table_state.offset();
        (index < self.visible.len()).then_some(index)
    }

    fn move_selection(&mut self, delta: i32) {
        if self.visible.is_empty() {
            return;
        }
        let current = self.selected().unwrap_or(0);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (current + delta as usize).min(self.visible.len() - 1)
        };
        self.select_row(next);
    }

    fn select_row(&mut self, row: usize) {
        if row < self.visible.len() {
            self.table_state.select(Some(row));
        }
    }

    fn select_id(&mut self, id: TaskId) {
        if let Some(row) = self.visible.iter().position(|&v| v == id) {
            self.table_state.select(Some(row));
        }
    }

    /// Recomputes the visible rows after the store or query changed. The
    /// selected task stays selected while it is visible; otherwise the
    /// selection keeps its row number, clamped to the new view.
    fn refresh_view(&mut self) {
        let previous_id = self.selected_id();
        let previous_row = self.selected();

        self.visible = self
            .store
            .filter_entries(&self.query)
            .into_iter()
            .map(|entry| entry.id)
            .collect();

        let row = previous_id
            .and_then(|id| self.visible.iter().position(|&v| v == id))
            .or_else(|| {
                let last = self.visible.len().checked_sub(1)?;
                Some(previous_row.unwrap_or(0).min(last))
            });
        self.table_state.select(row);
        if row.is_none() {
            *self.table_state.offset_mut() = 0;
        }
    }

    fn set_status(&mut self, level: StatusLevel, text: String) {
        self.status = Some(StatusMessage { level, text });
    }

    fn report_save_error(&mut self, err: StoreError) {
        tracing::error!(error = %err, "failed to save tasks");
        self.set_status(StatusLevel::Error, format!("Failed to save: {}", err));
    }
}

fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}
