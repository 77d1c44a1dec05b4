//! Application state and event loop

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    DefaultTerminal, Frame,
};
use tracing::{debug, warn};

use crate::config::{ApiConfig, Config};
use crate::services::{
    format_number, DataLoaderService, DateRange, IngestSource, LoadResult, Session, Status,
};
use crate::types::{AggregateStats, ApiCredentials, Result, VendError};

use super::theme::Theme;
use super::widgets::{
    error::ErrorView,
    help::HelpPopup,
    hours::HoursView,
    input::InputBar,
    overview::{Overview, Scope},
    records::RecordsView,
    spinner::{LoadingStage, Spinner},
    tabs::{Tab, TabBar},
    users::UsersView,
};

const SEARCH_PLACEHOLDER: &str = "press / to search by user ID or name";
const OPEN_PLACEHOLDER: &str = "file path, or YYYY-MM to fetch a month from the API";
const NOTICE_LOGGED_OUT: &str = "Logged out of the API";
const NOTICE_LOGOUT_QUEUED: &str = "Logout queued until the current load finishes";

/// Where keystrokes go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    Open,
}

/// Finished background load: the loader comes back with the result
struct LoadOutcome {
    loader: DataLoaderService,
    result: Result<LoadResult>,
}

/// Statistics derived from the session, recomputed when data or query change
#[derive(Debug, Default)]
struct ViewData {
    global: Option<AggregateStats>,
    query: Option<AggregateStats>,
    users: Vec<String>,
}

/// Main application
pub struct App {
    session: Session,
    view: ViewData,
    /// `None` while a load owns it on the background thread
    loader: Option<DataLoaderService>,
    /// Logout pressed while the loader was away; applied when it returns
    logout_requested: bool,
    /// One-shot message in the footer, cleared by the next key press
    notice: Option<&'static str>,
    api: ApiConfig,
    credentials: ApiCredentials,
    last_source: Option<IngestSource>,
    load_request: Option<IngestSource>,
    pending: Option<mpsc::Receiver<LoadOutcome>>,
    stage: LoadingStage,
    loading_label: String,
    spinner_frame: usize,
    current_tab: Tab,
    records_scroll: usize,
    user_selected: usize,
    input_mode: InputMode,
    open_input: String,
    show_help: bool,
    show_detail: bool,
    should_quit: bool,
    theme: Theme,
}

impl App {
    pub fn new(
        loader: DataLoaderService,
        api: ApiConfig,
        credentials: ApiCredentials,
        theme: Theme,
    ) -> Self {
        Self {
            session: Session::new(),
            view: ViewData::default(),
            loader: Some(loader),
            logout_requested: false,
            notice: None,
            api,
            credentials,
            last_source: None,
            load_request: None,
            pending: None,
            stage: LoadingStage::Reading,
            loading_label: String::new(),
            spinner_frame: 0,
            current_tab: Tab::default(),
            records_scroll: 0,
            user_selected: 0,
            input_mode: InputMode::default(),
            open_input: String::new(),
            show_help: false,
            show_detail: false,
            should_quit: false,
            theme,
        }
    }

    /// Queue an ingestion. Ignored while another load is in flight.
    pub fn request_load(&mut self, source: IngestSource) {
        if self.session.is_loading() {
            debug!("load already in flight, ignoring request");
            return;
        }
        self.stage = LoadingStage::for_source(&source);
        self.loading_label = source.label();
        self.session.begin_ingest();
        self.show_detail = false;
        self.refresh_view();
        self.load_request = Some(source);
    }

    /// Hand the queued source and the loader to a background thread
    fn start_requested_load(&mut self) {
        let Some(source) = self.load_request.take() else {
            return;
        };
        let Some(mut loader) = self.loader.take() else {
            return;
        };

        let (tx, rx) = mpsc::channel();
        let job = source.clone();
        thread::spawn(move || {
            let result = loader.load(&job);
            let _ = tx.send(LoadOutcome { loader, result });
        });

        self.pending = Some(rx);
        self.last_source = Some(source);
    }

    /// Pick up a finished load (non-blocking)
    fn poll_load(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                self.finish_load(outcome.loader, outcome.result);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("loader thread exited without a result");
                self.pending = None;
                // A fresh loader holds no token, so a queued logout is already satisfied
                self.loader = DataLoaderService::new(&self.api).ok();
                if std::mem::take(&mut self.logout_requested) {
                    self.notice = Some(NOTICE_LOGGED_OUT);
                }
                self.session.finish_ingest(Err(VendError::Parse(
                    "loading stopped unexpectedly".into(),
                )));
                self.refresh_view();
            }
        }
    }

    fn finish_load(&mut self, mut loader: DataLoaderService, result: Result<LoadResult>) {
        if std::mem::take(&mut self.logout_requested) {
            loader.logout();
            self.notice = Some(NOTICE_LOGGED_OUT);
        }
        self.loader = Some(loader);
        self.session.finish_ingest(result);
        self.records_scroll = 0;
        self.user_selected = 0;
        self.input_mode = InputMode::Normal;
        self.refresh_view();
    }

    /// Drop the cached API token. The loader is on the worker thread during
    /// a load, so the logout waits for it to come back.
    fn logout(&mut self) {
        match self.loader.as_mut() {
            Some(loader) => {
                loader.logout();
                self.notice = Some(NOTICE_LOGGED_OUT);
            }
            None => {
                debug!("load in flight, deferring logout");
                self.logout_requested = true;
                self.notice = Some(NOTICE_LOGOUT_QUEUED);
            }
        }
    }

    fn refresh_view(&mut self) {
        self.view = ViewData {
            global: self.session.global_stats(),
            query: self.session.query_stats(),
            users: self.session.users(),
        };
    }

    fn set_query(&mut self, query: String) {
        self.session.set_query(query);
        self.records_scroll = 0;
        self.view.query = self.session.query_stats();
    }

    fn is_ready(&self) -> bool {
        matches!(self.session.status(), Status::Ready { .. })
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.notice = None;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Search => self.handle_search_key(key),
            InputMode::Open => self.handle_open_key(key),
            InputMode::Normal if self.show_help => match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.show_help = false,
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('/') if self.is_ready() => self.input_mode = InputMode::Search,
            KeyCode::Char('c') if self.is_ready() => self.set_query(String::new()),
            KeyCode::Char('o') if !self.session.is_loading() => {
                self.open_input.clear();
                self.input_mode = InputMode::Open;
            }
            KeyCode::Char('r') => {
                if let Some(source) = self.last_source.clone() {
                    self.request_load(source);
                }
            }
            KeyCode::Char('l') => self.logout(),
            KeyCode::Char('d') => self.show_detail = !self.show_detail,
            KeyCode::Tab => self.current_tab = self.current_tab.next(),
            KeyCode::BackTab => self.current_tab = self.current_tab.prev(),
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                    self.current_tab = tab;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Enter if self.current_tab == Tab::Users => {
                if let Some(name) = self.view.users.get(self.user_selected).cloned() {
                    self.set_query(name);
                    self.current_tab = Tab::Overview;
                }
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                let mut query = self.session.query().to_string();
                query.pop();
                self.set_query(query);
            }
            KeyCode::Char(c) => {
                let mut query = self.session.query().to_string();
                query.push(c);
                self.set_query(query);
            }
            _ => {}
        }
    }

    fn handle_open_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                if let Some(source) = parse_open_input(&self.open_input, &self.credentials) {
                    self.request_load(source);
                }
            }
            KeyCode::Backspace => {
                self.open_input.pop();
            }
            KeyCode::Char(c) => self.open_input.push(c),
            _ => {}
        }
    }

    fn scroll_up(&mut self) {
        match self.current_tab {
            Tab::Records => self.records_scroll = self.records_scroll.saturating_sub(1),
            Tab::Users => self.user_selected = self.user_selected.saturating_sub(1),
            _ => {}
        }
    }

    fn scroll_down(&mut self) {
        match self.current_tab {
            Tab::Records => {
                // Clamped against the viewport at render time
                let max = self.session.filtered().len().saturating_sub(1);
                self.records_scroll = (self.records_scroll + 1).min(max);
            }
            Tab::Users => {
                let max = self.view.users.len().saturating_sub(1);
                self.user_selected = (self.user_selected + 1).min(max);
            }
            _ => {}
        }
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if self.session.is_loading() {
            self.spinner_frame = Spinner::next_frame(self.spinner_frame);
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

/// Interpret the open prompt: an existing path wins over a `YYYY-MM` month
pub fn parse_open_input(input: &str, credentials: &ApiCredentials) -> Option<IngestSource> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if !Path::new(input).exists() && DateRange::month(input).is_ok() {
        return Some(IngestSource::Remote {
            credentials: credentials.clone(),
            month: input.to_string(),
        });
    }
    Some(IngestSource::File(PathBuf::from(input)))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.status() {
            Status::Loading => {
                let [body, footer] =
                    Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
                Spinner::new(self.spinner_frame, self.stage, self.theme)
                    .source(&self.loading_label)
                    .render(body, buf);
                if let Some(notice) = self.notice {
                    self.render_notice(notice, footer, buf);
                }
            }
            Status::Idle => self.render_welcome(area, buf),
            Status::Failed { error, detail } => {
                let [body, footer] =
                    Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
                ErrorView::new(error, detail.as_ref(), self.show_detail, self.theme)
                    .render(body, buf);
                self.render_footer(footer, buf);
            }
            Status::Ready { label, records } => {
                self.render_ready(label, records.len(), area, buf);
            }
        }

        if self.show_help {
            let popup_area = HelpPopup::centered_area(area);
            HelpPopup::new(self.theme).render(popup_area, buf);
        }
    }
}

impl App {
    fn render_welcome(&self, area: Rect, buf: &mut Buffer) {
        let [_, title, _, hint, _, footer] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        Paragraph::new(vec![
            Line::from(Span::styled(
                "vendtrack",
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "No data loaded",
                Style::default().fg(self.theme.muted()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(title, buf);

        Paragraph::new(Line::from(vec![
            Span::styled("Press ", Style::default().fg(self.theme.muted())),
            Span::styled("o", Style::default().fg(self.theme.accent())),
            Span::styled(
                " to open an export file or fetch a month",
                Style::default().fg(self.theme.muted()),
            ),
        ]))
        .alignment(Alignment::Center)
        .render(hint, buf);

        self.render_footer(footer, buf);
    }

    fn render_ready(&self, label: &str, total: usize, area: Rect, buf: &mut Buffer) {
        let [tabs, sep, status, search, _, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        TabBar::new(self.current_tab, self.theme).render(tabs, buf);
        buf.set_string(
            sep.x,
            sep.y,
            "─".repeat(sep.width as usize),
            Style::default().fg(self.theme.muted()),
        );

        let mut status_spans = vec![
            Span::styled(label.to_string(), Style::default().fg(self.theme.heading())),
            Span::styled(
                format!("  {} records", format_number(total)),
                Style::default().fg(self.theme.muted()),
            ),
        ];
        if total == 0 {
            status_spans.push(Span::styled(
                "  no consumption records in this period",
                Style::default().fg(self.theme.error()),
            ));
        }
        Paragraph::new(Line::from(status_spans)).render(status, buf);

        InputBar::new("Search", self.session.query(), self.theme)
            .placeholder(SEARCH_PLACEHOLDER)
            .active(self.input_mode == InputMode::Search)
            .render(search, buf);

        let query = self.session.query();
        match self.current_tab {
            Tab::Overview => {
                let (stats, scope) = if query.is_empty() {
                    (self.view.global.as_ref(), Scope::All)
                } else {
                    (self.view.query.as_ref(), Scope::Query { query })
                };
                Overview::new(stats, scope, self.theme).render(body, buf);
            }
            Tab::Records => {
                let filtered = self.session.filtered();
                RecordsView::new(&filtered, self.records_scroll, query.is_empty(), self.theme)
                    .render(body, buf);
            }
            Tab::Hours => {
                let (stats, title) = if query.is_empty() {
                    (self.view.global.as_ref(), "All records".to_string())
                } else {
                    (self.view.query.as_ref(), format!("Results for {:?}", query))
                };
                HoursView::new(stats.map(|s| &s.hourly), &title, self.theme).render(body, buf);
            }
            Tab::Users => {
                UsersView::new(&self.view.users, self.user_selected, self.theme).render(body, buf);
            }
        }

        self.render_footer(footer, buf);
    }

    fn render_notice(&self, notice: &str, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Span::styled(notice, Style::default().fg(self.theme.accent())))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    /// Key hints, the open prompt while it is active, or a pending notice
    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        if self.input_mode == InputMode::Open {
            InputBar::new("Open", &self.open_input, self.theme)
                .placeholder(OPEN_PLACEHOLDER)
                .active(true)
                .render(area, buf);
            return;
        }
        if let Some(notice) = self.notice {
            self.render_notice(notice, area, buf);
            return;
        }

        let keys: &[(&str, &str)] = if self.is_ready() {
            &[
                ("Tab", "Switch view"),
                ("/", "Search"),
                ("o", "Open"),
                ("r", "Reload"),
                ("?", "Help"),
                ("q", "Quit"),
            ]
        } else {
            &[("o", "Open"), ("d", "Details"), ("?", "Help"), ("q", "Quit")]
        };

        let mut spans = Vec::new();
        for (i, (key, desc)) in keys.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, Style::default().fg(self.theme.accent())));
            spans.push(Span::styled(
                format!(": {}", desc),
                Style::default().fg(self.theme.muted()),
            ));
        }
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Run the TUI application
pub fn run(
    config: Config,
    credentials: ApiCredentials,
    initial: Option<IngestSource>,
) -> anyhow::Result<()> {
    // Detect before raw mode
    let theme = Theme::detect();
    let loader = DataLoaderService::new(&config.api)?;
    let mut app = App::new(loader, config.api, credentials, theme);
    if let Some(source) = initial {
        app.request_load(source);
    }

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &mut app);
    ratatui::restore();
    result
}

fn run_app(terminal: &mut DefaultTerminal, app: &mut App) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        app.start_requested_load();
        app.poll_load();

        // 100ms poll keeps the spinner moving
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConsumptionRecord;
    use chrono::Utc;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c)));
        }
    }

    fn make_record(id: &str, name: &str) -> ConsumptionRecord {
        ConsumptionRecord {
            timestamp: Utc::now(),
            user_id: id.into(),
            user_name: name.into(),
            beverage_name: "可樂".into(),
            price: 20.0,
        }
    }

    fn make_app() -> App {
        let api = ApiConfig::default();
        let loader = DataLoaderService::new(&api).unwrap();
        App::new(
            loader,
            api,
            ApiCredentials::new("WFLK_CTSP", "admin", "pw"),
            Theme::Dark,
        )
    }

    fn make_ready_app() -> App {
        let mut app = make_app();
        let loader = app.loader.take().unwrap();
        app.finish_load(
            loader,
            Ok(LoadResult {
                label: "october.xlsx".into(),
                records: vec![
                    make_record("362", "Ming Lin"),
                    make_record("17", "Amy"),
                    make_record("362", "Ming Lin"),
                ],
            }),
        );
        app
    }

    #[test]
    fn test_app_initial_state() {
        let app = make_app();
        assert_eq!(app.session.status(), &Status::Idle);
        assert_eq!(app.current_tab, Tab::Overview);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_app_quit_keys() {
        let mut app = make_app();
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());

        let mut app = make_app();
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_tab_navigation() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Records);
        app.handle_event(key(KeyCode::BackTab));
        assert_eq!(app.current_tab, Tab::Overview);
        app.handle_event(key(KeyCode::Char('4')));
        assert_eq!(app.current_tab, Tab::Users);
    }

    #[test]
    fn test_search_updates_query_stats() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);

        // 'q' is text while searching, not quit
        type_text(&mut app, "amq");
        assert!(!app.should_quit());
        app.handle_event(key(KeyCode::Backspace));
        app.handle_event(key(KeyCode::Char('y')));
        assert_eq!(app.session.query(), "amy");
        assert_eq!(app.view.query.as_ref().map(|s| s.total_items), Some(1));

        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);

        app.handle_event(key(KeyCode::Char('c')));
        assert_eq!(app.session.query(), "");
        assert!(app.view.query.is_none());
    }

    #[test]
    fn test_search_needs_data() {
        let mut app = make_app();
        app.handle_event(key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_users_enter_selects_user() {
        let mut app = make_ready_app();
        assert_eq!(app.view.users, vec!["Amy", "Ming Lin"]);

        app.handle_event(key(KeyCode::Char('4')));
        app.handle_event(key(KeyCode::Down));
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.user_selected, 1);

        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.session.query(), "Ming Lin");
        assert_eq!(app.current_tab, Tab::Overview);
        assert_eq!(app.view.query.as_ref().map(|s| s.total_items), Some(2));
    }

    #[test]
    fn test_open_prompt_requests_load() {
        let mut app = make_app();
        app.handle_event(key(KeyCode::Char('o')));
        assert_eq!(app.input_mode, InputMode::Open);
        type_text(&mut app, "2025-10");
        app.handle_event(key(KeyCode::Enter));

        assert!(app.session.is_loading());
        assert!(matches!(
            app.load_request,
            Some(IngestSource::Remote { ref month, .. }) if month == "2025-10"
        ));
        assert_eq!(app.stage, LoadingStage::Fetching);
        assert_eq!(app.loading_label, "API data (2025-10)");
    }

    #[test]
    fn test_request_ignored_while_loading() {
        let mut app = make_app();
        app.request_load(IngestSource::pasted("first"));
        app.request_load(IngestSource::pasted("second"));

        assert_eq!(app.load_request, Some(IngestSource::pasted("first")));
    }

    #[test]
    fn test_background_load_round_trip() {
        let mut app = make_app();
        let text = "事件時間\t人臉辨識ID\t使用者名稱\t品名\t金額\n\
2025-10-23 18:02:36\t362\tMing Lin\t八寶粥\t25\n";
        app.request_load(IngestSource::pasted(text));
        app.start_requested_load();
        assert!(app.loader.is_none());

        for _ in 0..200 {
            app.poll_load();
            if app.pending.is_none() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert!(app.loader.is_some());
        assert_eq!(app.session.records().len(), 1);
        assert_eq!(app.last_source, Some(IngestSource::pasted(text)));
        assert!(app.view.global.is_some());
    }

    #[test]
    fn test_failed_load_then_detail_toggle() {
        let mut app = make_app();
        let loader = app.loader.take().unwrap();
        app.finish_load(loader, Err(VendError::EmptyInput));

        assert!(matches!(app.session.status(), Status::Failed { .. }));
        app.handle_event(key(KeyCode::Char('d')));
        assert!(app.show_detail);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.show_help);
        // Other keys are swallowed while help is open
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Overview);
        app.handle_event(key(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_parse_open_input() {
        let creds = ApiCredentials::new("p", "i", "pw");
        assert_eq!(parse_open_input("   ", &creds), None);
        assert!(matches!(
            parse_open_input("2025-10", &creds),
            Some(IngestSource::Remote { .. })
        ));
        assert_eq!(
            parse_open_input(" exports/oct.xlsx ", &creds),
            Some(IngestSource::File(PathBuf::from("exports/oct.xlsx")))
        );
    }

    #[test]
    fn test_render_ready_app() {
        let app = make_ready_app();
        let area = Rect::new(0, 0, 100, 24);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("october.xlsx"));
        assert!(text.contains("[Overview]"));
    }

    // ========== Logout tests ==========

    fn screen_text(app: &App) -> String {
        let area = Rect::new(0, 0, 100, 24);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_logout_when_idle_is_immediate() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('l')));

        assert!(!app.logout_requested);
        assert_eq!(app.notice, Some(NOTICE_LOGGED_OUT));
        assert!(screen_text(&app).contains(NOTICE_LOGGED_OUT));

        // Any further key clears the notice
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.notice, None);
        assert!(screen_text(&app).contains("Switch view"));
    }

    #[test]
    fn test_logout_during_load_is_queued() {
        let mut app = make_app();
        app.request_load(IngestSource::pasted("queued"));
        // Stand-in for the worker thread holding the loader
        let loader = app.loader.take().unwrap();

        app.handle_event(key(KeyCode::Char('l')));
        assert!(app.logout_requested);
        assert_eq!(app.notice, Some(NOTICE_LOGOUT_QUEUED));
        assert!(screen_text(&app).contains(NOTICE_LOGOUT_QUEUED));

        app.finish_load(loader, Err(VendError::EmptyInput));
        assert!(!app.logout_requested);
        assert!(app.loader.is_some());
        assert_eq!(app.notice, Some(NOTICE_LOGGED_OUT));
    }

    #[test]
    fn test_queued_logout_survives_background_load() {
        let mut app = make_app();
        let text = "事件時間\t人臉辨識ID\t使用者名稱\t品名\t金額\n\
2025-10-23 18:02:36\t362\tMing Lin\t八寶粥\t25\n";
        app.request_load(IngestSource::pasted(text));
        app.start_requested_load();
        app.handle_event(key(KeyCode::Char('l')));

        for _ in 0..200 {
            app.poll_load();
            if app.pending.is_none() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert!(!app.logout_requested);
        assert_eq!(app.notice, Some(NOTICE_LOGGED_OUT));
        assert_eq!(app.session.records().len(), 1);
    }
}
