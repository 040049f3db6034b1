//! Socratis terminal client
//!
//! Runs one tutoring session in-process and draws the shared view model with
//! ratatui. Logs go to a file so they never tear the screen.

use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use socratis::attachment::{load_image, ImageData};
use socratis::catalog::{self, TOPICS};
use socratis::llm::LlmConfig;
use socratis::runtime::{RandomProgression, SessionRuntime, SharedRuntime, StepProgression};
use socratis::state_machine::{Role, StepStatus};
use socratis::tutor::{Tutor, TutorGateway};
use socratis::view::{self, Body, SessionView};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

const SIDEBAR_WIDTH: u16 = 28;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let llm_config = LlmConfig::from_env();
    if !llm_config.has_credentials() {
        tracing::warn!("No Gemini credential configured; replies will fail");
    }
    let gateway: Arc<dyn TutorGateway> = Arc::new(Tutor::from_config(&llm_config)?);
    let progression: Arc<dyn StepProgression> = Arc::new(RandomProgression::default());
    let runtime = Arc::new(SessionRuntime::new(gateway, progression));

    let mut app = App::new(runtime).await;
    if !llm_config.has_credentials() {
        app.notice = Some("No GEMINI_API_KEY set: the tutor cannot answer".to_string());
    }

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal).await;
    ratatui::restore();
    result
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::var_os("SOCRATIS_TUI_LOG")
        .map_or_else(|| std::env::temp_dir().join("socratis-tui.log"), PathBuf::from);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socratis=info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    tracing::info!(path = %path.display(), "TUI logging initialized");
    Ok(())
}

// ============================================================================
// Input commands
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Attach(PathBuf),
    Detach,
    Topic(usize),
    Send(String),
    Unknown(String),
}

/// Interpret a submitted input line. Topic numbers are 1-based.
fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Send(input.to_string());
    };

    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(n, a)| (n, a.trim()));
    match name {
        "attach" if !arg.is_empty() => Command::Attach(PathBuf::from(arg)),
        "detach" => Command::Detach,
        "topic" => match arg.parse::<usize>() {
            Ok(n) if (1..=TOPICS.len()).contains(&n) => Command::Topic(n - 1),
            _ => Command::Unknown(format!("Pick a topic between 1 and {}", TOPICS.len())),
        },
        _ => Command::Unknown(format!("Unknown command: /{name}")),
    }
}

// ============================================================================
// App
// ============================================================================

struct PendingImage {
    name: String,
    image: ImageData,
}

struct App {
    runtime: Arc<SharedRuntime>,
    view: SessionView,
    input: String,
    pending_image: Option<PendingImage>,
    /// One-line feedback for rejected input
    notice: Option<String>,
    quit: bool,
}

impl App {
    async fn new(runtime: Arc<SharedRuntime>) -> Self {
        let view = view::render(&runtime.state().await);
        Self {
            runtime,
            view,
            input: String::new(),
            pending_image: None,
            notice: None,
            quit: false,
        }
    }

    async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<(), Box<dyn std::error::Error>> {
        let mut events = EventStream::new();
        let mut session_rx = self.runtime.subscribe();

        while !self.quit {
            terminal.draw(|frame| draw(frame, self))?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(TermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                received = session_rx.recv() => match received {
                    Ok(_) | Err(RecvError::Lagged(_)) => self.refresh().await,
                    Err(RecvError::Closed) => break,
                },
            }
        }
        Ok(())
    }

    async fn refresh(&mut self) {
        self.view = view::render(&self.runtime.state().await);
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.quit = true,
            KeyCode::Char('t') if ctrl => self.cycle_topic().await,
            KeyCode::Char(c @ '1'..='4') if self.input.is_empty() && self.on_welcome() => {
                let index = c as usize - '1' as usize;
                if let Some(text) = catalog::suggestion(index) {
                    self.send(text).await;
                }
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.notice = None;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => self.input.clear(),
            KeyCode::Enter => self.submit().await,
            _ => {}
        }
    }

    fn on_welcome(&self) -> bool {
        matches!(self.view.body, Body::Welcome { .. })
    }

    async fn submit(&mut self) {
        let line = std::mem::take(&mut self.input);
        match parse_command(&line) {
            Command::Attach(path) => match load_image(&path).await {
                Ok(image) => {
                    let name = path
                        .file_name()
                        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
                    self.notice = Some(format!("Attached {name}"));
                    self.pending_image = Some(PendingImage { name, image });
                }
                Err(e) => self.notice = Some(e.to_string()),
            },
            Command::Detach => {
                self.pending_image = None;
                self.notice = Some("Attachment removed".to_string());
            }
            Command::Topic(index) => {
                if let Some(label) = catalog::topic(index) {
                    self.runtime.select_topic(label).await;
                }
            }
            Command::Send(text) => self.send(text).await,
            Command::Unknown(message) => self.notice = Some(message),
        }
    }

    async fn send(&mut self, text: String) {
        if !self.view.input.enabled {
            return;
        }
        if text.trim().is_empty() && self.pending_image.is_none() {
            return;
        }

        let image = self.pending_image.as_ref().map(|p| p.image.clone());
        match self.runtime.submit_message(text, image).await {
            Ok(effects) => {
                // The attachment is consumed only once the message is accepted
                self.pending_image = None;
                self.notice = None;
                let runtime = self.runtime.clone();
                tokio::spawn(async move { runtime.drive(effects).await });
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
        self.refresh().await;
    }

    async fn cycle_topic(&mut self) {
        let current = self.view.sidebar.topics.iter().position(|t| t.active);
        let next = current.map_or(0, |i| (i + 1) % TOPICS.len());
        if let Some(label) = catalog::topic(next) {
            self.runtime.select_topic(label).await;
        }
    }
}

// ============================================================================
// Drawing
// ============================================================================

fn draw(frame: &mut Frame, app: &App) {
    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)]).areas(frame.area());
    draw_sidebar(frame, sidebar, &app.view);

    let tracker_height = if app.view.step_tracker.is_some() { 3 } else { 0 };
    let [header, body, tracker, input, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(tracker_height),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(main);

    draw_header(frame, header, &app.view);
    draw_body(frame, body, &app.view);
    if tracker_height > 0 {
        draw_step_tracker(frame, tracker, &app.view);
    }
    draw_input(frame, input, app);

    let footer_text = app
        .notice
        .clone()
        .unwrap_or_else(|| app.view.input.disclaimer.clone());
    frame.render_widget(Paragraph::new(footer_text).dark_gray(), footer);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, view: &SessionView) {
    let mut items = vec![ListItem::new(Line::from("WORKSPACE").dark_gray())];
    items.extend(view.sidebar.workspace.iter().map(|e| nav_item(&e.label, e.active)));
    items.push(ListItem::new(""));
    items.push(ListItem::new(Line::from("TOPICS  (Ctrl+T)").dark_gray()));
    items.extend(
        view.sidebar
            .topics
            .iter()
            .enumerate()
            .map(|(i, t)| nav_item(&format!("{}. {}", i + 1, t.label), t.active)),
    );

    let block = Block::bordered().title(Span::from(view.sidebar.brand.as_str()).bold().cyan());
    frame.render_widget(List::new(items).block(block), area);
}

fn nav_item(label: &str, active: bool) -> ListItem<'static> {
    let style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let marker = if active { "> " } else { "  " };
    ListItem::new(Line::styled(format!("{marker}{label}"), style))
}

fn draw_header(frame: &mut Frame, area: Rect, view: &SessionView) {
    let mut spans = vec![Span::from(view.header.title.as_str()).bold()];
    if view.header.live {
        spans.push(Span::raw("  "));
        spans.push(Span::from(" LIVE ").black().on_green());
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_body(frame: &mut Frame, area: Rect, view: &SessionView) {
    let lines = body_lines(&view.body);
    let inner_width = area.width.saturating_sub(2).max(1);
    let height = wrapped_height(&lines, inner_width);
    // Auto-follow the newest message
    let scroll = height.saturating_sub(area.height.saturating_sub(2));

    let paragraph = Paragraph::new(lines)
        .block(Block::bordered())
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn body_lines(body: &Body) -> Vec<Line<'static>> {
    match body {
        Body::Welcome {
            headline,
            blurb,
            suggestions,
        } => {
            let mut lines = vec![
                Line::from(headline.clone()).bold(),
                Line::from(""),
                Line::from(blurb.clone()),
                Line::from(""),
            ];
            lines.extend(
                suggestions
                    .iter()
                    .enumerate()
                    .map(|(i, s)| Line::from(format!("  [{}] {}", i + 1, s.label)).cyan()),
            );
            lines
        }
        Body::Thread { messages, thinking } => {
            let mut lines = Vec::new();
            for message in messages {
                let (author, color) = match message.role {
                    Role::User => ("You", Color::Green),
                    Role::Assistant | Role::System => ("Socratis", Color::Cyan),
                };
                lines.push(Line::from(vec![
                    Span::styled(author, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::from(message.time.clone()).dark_gray(),
                ]));
                if message.image_url.is_some() {
                    lines.push(Line::from("[image attached]").italic());
                }
                lines.extend(message.content.lines().map(|l| Line::from(l.to_string())));
                lines.push(Line::from(""));
            }
            if let Some(text) = thinking {
                lines.push(Line::from(text.clone()).italic().dark_gray());
            }
            lines
        }
    }
}

/// Rows the lines occupy once wrapped to `width` columns
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines.iter().map(|l| l.width().div_ceil(width).max(1)).sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn draw_step_tracker(frame: &mut Frame, area: Rect, view: &SessionView) {
    let Some(tracker) = &view.step_tracker else {
        return;
    };
    let mut spans = Vec::new();
    for (i, step) in tracker.steps.iter().enumerate() {
        if i > 0 {
            spans.push(Span::from(" > ").dark_gray());
        }
        let span = match step.status {
            StepStatus::Completed => Span::from(format!("✓ {}", step.label)).green(),
            StepStatus::Current => Span::from(format!("● {}", step.label)).cyan().bold(),
            StepStatus::Pending => Span::from(format!("○ {}", step.label)).dark_gray(),
        };
        spans.push(span);
    }
    let block = Block::bordered().title(tracker.title.as_str());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = match &app.pending_image {
        Some(p) => format!("Message  [image: {}]", p.name),
        None => "Message".to_string(),
    };
    let (text, style) = if app.input.is_empty() {
        (app.view.input.placeholder.clone(), Style::default().fg(Color::DarkGray))
    } else {
        (app.input.clone(), Style::default())
    };
    let border = if app.view.input.enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::bordered().title(title).border_style(border);
    frame.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);

    if app.view.input.enabled {
        let cursor_x = area.x + 1 + u16::try_from(app.input.chars().count()).unwrap_or(0);
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}
