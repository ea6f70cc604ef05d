use crate::app::{App, Button, Mode, StatusLevel};
use crate::task::Task;
use crossterm::event::{self, Event};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;
use tui_input::Input;

pub const TITLE: &str = "xDo - A simple task manager";

/// Width of the input labels, so buttons line up with the input text.
const LABEL_WIDTH: usize = 9;

const DONE_GLYPH: &str = "✓";
const OPEN_GLYPH: &str = "○";

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        match event::read()? {
            Event::Key(key) => app.handle_key(key),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_table(f, chunks[1], app);
    draw_controls(f, chunks[2], app);
    draw_status(f, chunks[3], app);
    draw_footer(f, chunks[4], app);

    if app.show_help {
        draw_help(f, area);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let store = app.store();
    let counts = format!("{} tasks, {} done ", store.len(), store.completed_count());
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {}", TITLE),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(counts, Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(header, area);
}

fn draw_table(f: &mut Frame, area: Rect, app: &mut App) {
    app.table_area = area;

    let title = if app.query().is_empty() {
        " Tasks ".to_string()
    } else {
        format!(
            " Tasks matching '{}' ({} of {}) ",
            app.query(),
            app.rows().len(),
            app.store().len()
        )
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let rows: Vec<Row> = app.rows().into_iter().map(|(_, task)| task_row(task)).collect();

    if rows.is_empty() {
        let hint = if app.store().is_empty() {
            "No tasks yet. Press 'a' to add one."
        } else {
            "No tasks match the search. Press Esc to clear it."
        };
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let header = Row::new(["Status", "Task", "Created"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn task_row(task: &Task) -> Row<'static> {
    let (glyph, glyph_style, title_style) = if task.completed {
        let done = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
        (DONE_GLYPH, Style::default().fg(Color::Green), done)
    } else {
        (OPEN_GLYPH, Style::default().fg(Color::Yellow), Style::default().fg(Color::White))
    };

    Row::new(vec![
        Cell::from(Span::styled(format!("  {}", glyph), glyph_style)),
        Cell::from(Span::styled(task.title.clone(), title_style)),
        Cell::from(Span::styled(
            task.created_at.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn draw_controls(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(match app.mode() {
            Mode::Normal => Style::default(),
            _ => Style::default().fg(Color::Cyan),
        });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    render_text_field(
        f,
        lines[0],
        "New Task:",
        &app.new_task,
        app.mode() == Mode::Adding,
        "press 'a' to enter a task",
    );
    render_text_field(
        f,
        lines[1],
        "Search:  ",
        &app.search,
        app.mode() == Mode::Searching,
        "press '/' to filter",
    );
    draw_buttons(f, lines[2], app);
}

/// Draws the button row and records each label's area for mouse clicks.
fn draw_buttons(f: &mut Frame, area: Rect, app: &mut App) {
    let style = Style::default().fg(Color::Black).bg(Color::Gray);
    let mut spans = vec![Span::raw(" ".repeat(LABEL_WIDTH + 1))];
    let mut x = area.x + LABEL_WIDTH as u16 + 1;

    app.button_areas.clear();
    for button in Button::ALL {
        let label = button.label();
        let width = label.chars().count() as u16;
        let visible = width.min(area.right().saturating_sub(x));
        if visible > 0 {
            app.button_areas
                .push((button, Rect::new(x, area.y, visible, 1)));
        }
        let button_style = match button {
            Button::Add => style.bg(Color::Cyan),
            Button::ToggleComplete => style,
            Button::Delete => style.bg(Color::Red),
        };
        spans.push(Span::styled(label, button_style));
        spans.push(Span::raw(" "));
        x = x.saturating_add(width + 1);
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A labelled single-line input. The focused field shows an inverse-video
/// cursor over the character at the cursor position.
fn render_text_field(
    f: &mut Frame,
    area: Rect,
    label: &str,
    input: &Input,
    is_focused: bool,
    placeholder: &str,
) {
    let label_style = if is_focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut spans = vec![
        Span::styled(label.to_string(), label_style),
        Span::raw(" "),
    ];

    let value = input.value();
    if is_focused {
        let cursor = input.visual_cursor();
        let before: String = value.chars().take(cursor).collect();
        let at: String = value
            .chars()
            .nth(cursor)
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
        let after: String = value.chars().skip(cursor + 1).collect();

        spans.push(Span::raw(before));
        spans.push(Span::styled(
            at,
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::raw(after));
    } else if value.is_empty() {
        spans.push(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(value.to_string()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let Some(status) = app.status() else {
        return;
    };
    let color = match status.level {
        StatusLevel::Info => Color::Green,
        StatusLevel::Warning => Color::Yellow,
        StatusLevel::Error => Color::Red,
    };
    f.render_widget(
        Paragraph::new(format!(" {}", status.text)).style(Style::default().fg(color)),
        area,
    );
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let keys: &[(&str, &str)] = match app.mode() {
        Mode::Normal => &[
            ("q", "Quit"),
            ("a", "Add Task"),
            ("d", "Delete Task"),
            ("c", "Toggle Complete"),
            ("/", "Search"),
            ("?", "Help"),
        ],
        Mode::Adding => &[("Enter", "Add"), ("Esc", "Cancel")],
        Mode::Searching => &[("Enter", "Keep filter"), ("Esc", "Clear search")],
    };

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    for (key, desc) in keys {
        spans.push(Span::styled(format!(" {}", key), key_style));
        spans.push(Span::raw(format!(" {} ", desc)));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
        area,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(" a        add a task"),
        Line::from(" d / Del  delete the selected task"),
        Line::from(" c / Spc  toggle complete"),
        Line::from(" /        search (Enter keeps, Esc clears)"),
        Line::from(" j k ↑ ↓  move selection"),
        Line::from(" g G      first / last task"),
        Line::from(" q        quit"),
    ];

    let width = 46.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}
