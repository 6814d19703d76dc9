//! Terminal console for the todo store.
//!
//! Opens the store named by `DATABASE_URL` directly; the HTTP API stays read-only.

use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use todo_api::{
    config::AppConfig,
    domain::{repository::TodoRepository, todo::{Todo, TodoDraft}},
    infrastructure::{memory_repo::InMemoryTodoRepository, sqlite_repo::SqliteTodoRepository},
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env()?;
    if config.uses_memory_store() {
        run(InMemoryTodoRepository::new(), config.database_url).await
    } else {
        let repo = SqliteTodoRepository::connect(&config.database_url).await?;
        run(repo, config.database_url).await
    }
}

async fn run<R: TodoRepository>(repo: R, location: String) -> Result<()> {
    repo.init().await?;
    let mut app = App::new(repo, location);
    app.reload().await?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = event_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field { Title, Description }

enum Mode {
    Browse,
    Compose { field: Field, title: String, description: String },
}

struct App<R: TodoRepository> {
    repo: R,
    location: String,
    todos: Vec<Todo>,
    count: u64,
    list_state: ListState,
    mode: Mode,
}

impl<R: TodoRepository> App<R> {
    fn new(repo: R, location: String) -> Self {
        Self { repo, location, todos: Vec::new(), count: 0, list_state: ListState::default(), mode: Mode::Browse }
    }

    async fn reload(&mut self) -> Result<()> {
        self.todos = self.repo.list_all().await?;
        self.count = self.repo.count().await?;
        let selected = match (self.list_state.selected(), self.todos.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.list_state.select(selected);
        Ok(())
    }

    fn selected(&self) -> Option<&Todo> {
        self.list_state.selected().and_then(|i| self.todos.get(i))
    }

    fn move_by(&mut self, delta: isize) {
        if let Some(i) = self.list_state.selected() {
            let last = self.todos.len().saturating_sub(1) as isize;
            self.list_state.select(Some((i as isize + delta).clamp(0, last) as usize));
        }
    }

    async fn toggle_selected(&mut self) -> Result<()> {
        let Some(todo) = self.selected() else { return Ok(()) };
        let mut draft = todo.to_draft();
        draft.completed = !draft.completed;
        self.repo.save(draft).await?;
        self.reload().await
    }

    async fn delete_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected().map(Todo::id) else { return Ok(()) };
        self.repo.delete_by_id(id).await?;
        self.reload().await
    }

    /// Returns `true` when the user asked to quit.
    async fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        match &mut self.mode {
            Mode::Browse => match code {
                KeyCode::Char('q') => return Ok(true),
                KeyCode::Up => self.move_by(-1),
                KeyCode::Down => self.move_by(1),
                KeyCode::Enter => self.toggle_selected().await?,
                KeyCode::Char('d') => self.delete_selected().await?,
                KeyCode::Char('r') => self.reload().await?,
                KeyCode::Char('n') => {
                    self.mode = Mode::Compose { field: Field::Title, title: String::new(), description: String::new() };
                }
                _ => {}
            },
            Mode::Compose { field, title, description } => {
                let buffer = match field { Field::Title => title, Field::Description => description };
                match code {
                    KeyCode::Esc => self.mode = Mode::Browse,
                    KeyCode::Tab => {
                        *field = match field { Field::Title => Field::Description, Field::Description => Field::Title };
                    }
                    KeyCode::Backspace => { buffer.pop(); }
                    KeyCode::Char(c) => buffer.push(c),
                    KeyCode::Enter => {
                        let Mode::Compose { title, description, .. } = std::mem::replace(&mut self.mode, Mode::Browse) else {
                            return Ok(false);
                        };
                        let title = title.trim();
                        if !title.is_empty() {
                            let mut draft = TodoDraft::new(title);
                            let description = description.trim();
                            if !description.is_empty() {
                                draft = draft.with_description(description);
                            }
                            let created = self.repo.save(draft).await?;
                            self.reload().await?;
                            let index = self.todos.iter().position(|t| t.id() == created.id());
                            self.list_state.select(index);
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(false)
    }
}

async fn event_loop<R: TodoRepository>(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App<R>) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            // ignore repeats and releases
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key.code).await? {
                return Ok(());
            }
        }
    }
}

fn draw<R: TodoRepository>(f: &mut Frame, app: &mut App<R>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let help = Paragraph::new("Enter: toggle done  n: new  d: delete  r: reload  q: quit")
        .block(Block::default().borders(Borders::ALL).title("todo-tui"));
    f.render_widget(help, rows[0]);

    let items: Vec<ListItem> = app
        .todos
        .iter()
        .map(|t| ListItem::new(format!("{} #{} {}", if t.completed { "[x]" } else { "[ ]" }, t.id(), t.title)))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Todo List"))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, body[0], &mut app.list_state);

    let detail = app
        .selected()
        .map(|t| {
            format!(
                "{}\n\n{}\n\ncreated {}",
                t.title,
                t.description.as_deref().unwrap_or("(no description)"),
                t.created_at.format("%Y-%m-%d %H:%M"),
            )
        })
        .unwrap_or_default();
    let details = Paragraph::new(detail)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("details"));
    f.render_widget(details, body[1]);

    let (title, text) = match &app.mode {
        Mode::Browse => ("info", format!("store={}  |  {} todos", app.location, app.count)),
        Mode::Compose { field, title, description } => {
            let (label, value) = match field { Field::Title => ("Title", title), Field::Description => ("Desc", description) };
            ("new", format!("{label}: {value}_  |  Tab switch field, Enter save, Esc cancel"))
        }
    };
    let footer = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(footer, rows[2]);
}
