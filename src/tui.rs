use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use reqwest::header;
use std::io;
use std::path::Path;
use url::Url;

use crate::form::{Followup, Reject, Submit, UploadForm};
use crate::types::{GalleryEntry, PageData};

/// Main TUI application state
pub struct App {
    pub server_url: String,
    pub page: Option<PageData>,
    pub table_state: TableState,
    pub current_view: View,
    pub form: UploadForm,
    pub upload_path: String,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Gallery,
    /// Detail modal over the selected entry
    Detail(usize),
    Upload,
    Help,
}

impl App {
    pub fn new(server_url: String) -> Self {
        Self {
            server_url,
            page: None,
            table_state: TableState::default(),
            current_view: View::Gallery,
            form: UploadForm::new(),
            upload_path: String::new(),
            status_message: None,
            should_quit: false,
        }
    }

    pub fn images(&self) -> &[GalleryEntry] {
        self.page.as_ref().map(|p| p.images.as_slice()).unwrap_or(&[])
    }

    pub fn upload_url(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.upload.url.as_str())
    }

    pub fn next_row(&mut self) {
        let len = self.images().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.images().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_entry(&self) -> Option<&GalleryEntry> {
        self.table_state
            .selected()
            .and_then(|i| self.images().get(i))
    }

    /// Open the detail modal over the current selection, if any
    pub fn open_detail(&mut self) {
        if let Some(i) = self.table_state.selected() {
            if self.images().get(i).is_some() {
                self.current_view = View::Detail(i);
            }
        }
    }
}

/// Run the TUI
pub async fn run_tui(server_url: String) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(server_url);

    // Initial data fetch
    if let Err(e) = fetch_page(&mut app).await {
        app.status_message = Some(format!("Error: {}", e));
    }

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match app.current_view {
                    View::Gallery => handle_gallery_input(app, key.code, key.modifiers).await?,
                    View::Detail(_) => handle_detail_input(app, key.code).await?,
                    View::Upload => handle_upload_input(app, key.code, key.modifiers).await?,
                    View::Help => handle_help_input(app, key.code)?,
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    match app.current_view {
        View::Gallery => draw_gallery(f, app),
        View::Detail(index) => {
            draw_gallery(f, app);
            draw_detail_modal(f, app, index);
        }
        View::Upload => draw_upload_form(f, app),
        View::Help => draw_help(f),
    }
}

fn draw_gallery(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    // Header
    let title = Paragraph::new(format!("Image Gallery ({} images)", app.images().len()))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Table
    if app.images().is_empty() {
        let empty = Paragraph::new("No images uploaded yet\n\nPress 'u' to upload your first image")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Images"));
        f.render_widget(empty, chunks[1]);
    } else {
        let header_cells = ["Filename", "Size", "Uploaded", "Key"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows: Vec<Row> = app
            .images()
            .iter()
            .map(|entry| {
                let uploaded = entry
                    .last_modified
                    .map(format_datetime)
                    .unwrap_or_else(|| "Unknown".to_string());

                Row::new(vec![
                    Cell::from(entry.filename().to_string()),
                    Cell::from(format!("{:.2} MB", entry.size_mb())),
                    Cell::from(uploaded),
                    Cell::from(entry.key.chars().take(12).collect::<String>()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Length(10),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Images"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut app.table_state);
    }

    // Footer with keybindings and status
    let keybindings = vec![
        Span::raw("Enter: Details | "),
        Span::raw("u: Upload | "),
        Span::raw("r: Refresh | "),
        Span::raw("?: Help | "),
        Span::raw("q: Quit"),
    ];

    let footer_text = if let Some(msg) = &app.status_message {
        vec![Line::from(msg.clone())]
    } else {
        vec![Line::from(keybindings)]
    };

    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(footer, chunks[2]);
}

fn draw_detail_modal(f: &mut Frame, app: &App, index: usize) {
    let Some(entry) = app.images().get(index) else {
        return;
    };

    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);

    let uploaded = entry
        .last_modified
        .map(format_datetime)
        .unwrap_or_else(|| "Unknown".to_string());

    let lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            entry.filename().to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(format!("Key:      {}", entry.key)),
        Line::from(format!("Size:     {:.2} MB", entry.size_mb())),
        Line::from(format!("Uploaded: {}", uploaded)),
        Line::from(""),
        Line::from("Signed URL (expires in 1 hour):"),
        Line::from(entry.url.clone()),
        Line::from(""),
        Line::from("o: Save full size | c: Copy URL | Esc: Close"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Image Details"))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

fn draw_upload_form(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    // Title
    let title_widget = Paragraph::new("Upload New Image")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title_widget, chunks[0]);

    // File path field
    let input = Paragraph::new(app.upload_path.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("File path"));
    f.render_widget(input, chunks[1]);

    // Form state
    let state_text = match app.form.state() {
        crate::form::FormState::Idle => "Ready (PNG, JPEG, GIF, WebP)",
        crate::form::FormState::Uploading => "Uploading...",
        crate::form::FormState::Complete => "Upload successful! Refreshing...",
    };
    let state_widget = Paragraph::new(state_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(state_widget, chunks[2]);

    // Footer
    let footer_text = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        "Enter: Upload | Esc: Back to gallery".to_string()
    };
    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[4]);
}

fn draw_help(f: &mut Frame) {
    let help_text = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "Image Gallery - Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Gallery View:"),
        Line::from("  ↑/↓ or j/k    - Navigate images"),
        Line::from("  Enter         - Open image details"),
        Line::from("  u             - Upload a new image"),
        Line::from("  r             - Refresh the gallery"),
        Line::from("  ?             - Show this help"),
        Line::from("  q             - Quit application"),
        Line::from(""),
        Line::from("Details View:"),
        Line::from("  o             - Save the full-size image to disk"),
        Line::from("  c             - Copy the signed URL to the status line"),
        Line::from("  Esc           - Close"),
        Line::from(""),
        Line::from("Upload View:"),
        Line::from("  Enter         - Upload the file at the typed path"),
        Line::from("  Esc           - Cancel"),
        Line::from(""),
        Line::from("Press any key to return to the gallery"),
    ];

    let area = centered_rect(70, 80, f.area());

    let paragraph = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

async fn handle_gallery_input(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    match key {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.next_row(),
        KeyCode::Up | KeyCode::Char('k') => app.previous_row(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('u') => {
            app.status_message = None;
            app.current_view = View::Upload;
        }
        KeyCode::Char('r') => {
            fetch_page(app).await?;
        }
        KeyCode::Char('?') => {
            app.current_view = View::Help;
        }
        _ => {}
    }
    Ok(())
}

async fn handle_detail_input(app: &mut App, key: KeyCode) -> Result<()> {
    let index = match app.current_view {
        View::Detail(i) => i,
        _ => return Ok(()),
    };

    match key {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            app.current_view = View::Gallery;
        }
        KeyCode::Char('o') => {
            if let Some(entry) = app.images().get(index).cloned() {
                match save_full_size(&entry).await {
                    Ok(path) => app.status_message = Some(format!("Saved to {}", path)),
                    Err(e) => app.status_message = Some(format!("Error: {}", e)),
                }
                app.current_view = View::Gallery;
            }
        }
        KeyCode::Char('c') => {
            // Best effort: surface the URL on the status line
            if let Some(url) = app.images().get(index).map(|e| e.url.clone()) {
                app.status_message = Some(url);
                app.current_view = View::Gallery;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn handle_upload_input(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
    match key {
        KeyCode::Esc => {
            app.current_view = View::Gallery;
            app.status_message = None;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Enter => {
            submit_upload(app).await?;
        }
        KeyCode::Char(c) => {
            app.upload_path.push(c);
        }
        KeyCode::Backspace => {
            app.upload_path.pop();
        }
        _ => {}
    }
    Ok(())
}

fn handle_help_input(app: &mut App, _key: KeyCode) -> Result<()> {
    app.current_view = View::Gallery;
    Ok(())
}

/// Drive one submit through the upload state machine
async fn submit_upload(app: &mut App) -> Result<()> {
    let has_file = !app.upload_path.trim().is_empty();
    let has_url = app.upload_url().is_some();

    match app.form.submit(has_file, has_url) {
        Submit::Rejected(Reject::NoFile) => {
            app.status_message = Some("Type a file path first".to_string());
            return Ok(());
        }
        Submit::Rejected(Reject::NoUrl) => {
            app.status_message = Some("No pre-signed URL; refresh and retry".to_string());
            return Ok(());
        }
        Submit::Rejected(Reject::Busy) => return Ok(()),
        Submit::Begin => {}
    }

    let url = app
        .upload_url()
        .map(str::to_string)
        .unwrap_or_default();
    let path = app.upload_path.trim().to_string();

    let followup = match transfer_file(&url, Path::new(&path)).await {
        Ok(status) => {
            let followup = app.form.transfer_finished(Some(status));
            if followup == Followup::None {
                app.status_message = Some(format!("Upload failed with status {}", status));
            }
            followup
        }
        Err(e) => {
            app.status_message = Some(format!("Upload failed: {}", e));
            app.form.transfer_finished(None)
        }
    };

    if let Followup::Reload { after } = followup {
        app.status_message = Some("Upload successful! Refreshing...".to_string());
        // Refresh after a short delay to show the new image
        tokio::time::sleep(after).await;
        fetch_page(app).await?;
        app.current_view = View::Gallery;
    }

    Ok(())
}

/// PUT the file bytes directly against the signed URL, mirroring the
/// browser form's headers
async fn transfer_file(url: &str, path: &Path) -> Result<u16> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let client = reqwest::Client::new();
    let response = client
        .put(url)
        .header(header::CONTENT_TYPE, content_type_for(filename))
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(bytes)
        .send()
        .await?;

    Ok(response.status().as_u16())
}

fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

/// Fetch the signed URL of the full-size image and save it next to the
/// working directory under the entry's filename
async fn save_full_size(entry: &GalleryEntry) -> Result<String> {
    let response = reqwest::get(&entry.url).await?;
    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}", response.status());
    }

    let bytes = response.bytes().await?;
    let path = entry.filename().to_string();
    tokio::fs::write(&path, &bytes).await?;

    Ok(path)
}

// API client functions
async fn fetch_page(app: &mut App) -> Result<()> {
    let url = Url::parse(&app.server_url)
        .context("Invalid server URL")?
        .join("/api/page")?;
    let client = reqwest::Client::new();
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to fetch page data: {}", response.status());
    }

    let data: PageData = response.json().await?;
    app.page = Some(data);

    // A fresh render discards the previous upload session
    app.form = UploadForm::new();

    // Ensure table state is valid
    if !app.images().is_empty() && app.table_state.selected().is_none() {
        app.table_state.select(Some(0));
    }
    if app.images().is_empty() {
        app.table_state.select(None);
    }

    Ok(())
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("b.JPG"), "image/jpeg");
        assert_eq!(content_type_for("c.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("d.gif"), "image/gif");
        assert_eq!(content_type_for("e.webp"), "image/webp");
        assert_eq!(content_type_for("f.bin"), "application/octet-stream");
    }

    #[test]
    fn test_row_navigation_wraps() {
        let mut app = App::new("http://localhost:3000".to_string());
        app.page = Some(PageData {
            upload: crate::types::UploadTicket {
                key: "k".to_string(),
                url: "https://example.com/put".to_string(),
                expires_at: chrono::Utc::now(),
            },
            images: vec![
                GalleryEntry {
                    key: "a.png".to_string(),
                    url: String::new(),
                    size: 0,
                    last_modified: None,
                },
                GalleryEntry {
                    key: "b.png".to_string(),
                    url: String::new(),
                    size: 0,
                    last_modified: None,
                },
            ],
        });

        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(1));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(1));

        assert_eq!(app.selected_entry().map(|e| e.filename()), Some("b.png"));
    }

    #[test]
    fn test_open_detail_requires_selection() {
        let mut app = App::new("http://localhost:3000".to_string());

        // Empty gallery: nothing to open
        app.open_detail();
        assert_eq!(app.current_view, View::Gallery);

        app.page = Some(PageData {
            upload: crate::types::UploadTicket {
                key: "k".to_string(),
                url: "https://example.com/put".to_string(),
                expires_at: chrono::Utc::now(),
            },
            images: vec![GalleryEntry {
                key: "a.png".to_string(),
                url: String::new(),
                size: 0,
                last_modified: None,
            }],
        });
        app.table_state.select(Some(0));

        app.open_detail();
        assert_eq!(app.current_view, View::Detail(0));
    }
}
