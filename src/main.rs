use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chainaudit::app::{App, DashboardTab, InputMode, Page, SessionRequest, StatusLevel};
use chainaudit::config::{self, Config, DataSourceKind};
use chainaudit::infrastructure::{
    ApiClient, RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerConfig,
};
use chainaudit::store::{DataSource, LocalGenerator};
use chainaudit::ui::{self, graph::Viewport, layout};

#[derive(Debug, Parser)]
#[command(
    name = "chainaudit",
    version,
    about = "ChainAudit: blockchain transaction network dashboard"
)]
struct Args {
    /// Config file (defaults to $CHAINAUDIT_CONFIG or the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analytics backend base URL (e.g. http://localhost:5000)
    #[arg(long)]
    api_url: Option<String>,

    /// Load the dataset from the backend instead of the local generator
    #[arg(long, conflicts_with = "local")]
    remote: bool,

    /// Use the built-in sample dataset
    #[arg(long)]
    local: bool,

    /// Seconds between price/network refreshes
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone().or_else(config::log_path));
    let config = config_from_args(&args);

    let api = Arc::new(ApiClient::new(config.api_base(), config.request_timeout())?);
    let source: Arc<dyn DataSource> = match config.data_source {
        DataSourceKind::Local => Arc::new(LocalGenerator::new(config.load_delay())),
        DataSourceKind::Remote => api.clone(),
    };
    let source_label = source.describe();
    info!(source = %source_label, api = %api.base_url(), "starting chainaudit");

    let runtime = RuntimeBridge::new(WorkerConfig {
        source,
        api,
        refresh_interval: config.refresh_interval(),
    })?;

    let mut app = App::new();
    app.layout = config.layout;
    app.trace_depth = config.trace_depth;
    app.source_label = source_label;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn config_from_args(args: &Args) -> Config {
    let mut config = match args.config.as_deref() {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if let Some(url) = args.api_url.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        config.api_url = url.to_string();
    }
    if args.remote {
        config.data_source = DataSourceKind::Remote;
    } else if args.local {
        config.data_source = DataSourceKind::Local;
    }
    if let Some(secs) = args.refresh_secs {
        config.refresh_interval_secs = secs;
    }
    config
}

/// The terminal belongs to the UI, so logs only ever go to a file
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chainaudit=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            pump_background(&mut app, &runtime);
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::DatasetReady { session, dataset } => app.apply_dataset(session, dataset),
            RuntimeEvent::DatasetFailed { session, message } => {
                app.apply_dataset_failure(session, message)
            }
            RuntimeEvent::AlertsReady { session, alerts } => app.apply_alerts(session, alerts),
            RuntimeEvent::PricesReady { session, quotes } => app.apply_prices(session, quotes),
            RuntimeEvent::NetworkReady { session, analysis } => {
                app.apply_network(session, analysis)
            }
            RuntimeEvent::ReportReady {
                session,
                request,
                report,
            } => app.apply_report(session, request, report),
            RuntimeEvent::Error { session, message } => app.apply_runtime_error(session, message),
        }
    }

    for request in app.take_requests() {
        let cmd = match request {
            SessionRequest::Open(session) => RuntimeCommand::OpenSession { session },
            SessionRequest::Close(session) => RuntimeCommand::CloseSession { session },
            SessionRequest::Inspect(session, request) => {
                RuntimeCommand::Inspect { session, request }
            }
        };
        if let Err(err) = runtime.send(cmd) {
            warn!(error = %err, "runtime worker unavailable");
            app.set_status(format!("Worker unavailable: {err}"), StatusLevel::Error);
        }
    }

    if let Some(text) = app.take_copy_request() {
        copy_to_clipboard(app, text);
    }
}

fn copy_to_clipboard(app: &mut App, text: String) {
    use arboard::Clipboard;

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                let shown = if text.chars().count() > 20 {
                    format!("{}...", text.chars().take(20).collect::<String>())
                } else {
                    text
                };
                app.set_status(format!("Copied: {shown}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => match app.page {
            Page::Home => handle_home_mode(app, key),
            Page::Dashboard => handle_normal_mode(app, key),
        },
        InputMode::Search => handle_search_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_home_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Enter => app.open_dashboard(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => {
            app.close_session();
            app.should_quit = true;
        }
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.close_session();
            app.should_quit = true;
        }
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char('/'), _) => app.enter_search(),
        (KeyCode::Char(':'), _) => app.enter_command(),
        (KeyCode::Tab, _) => app.cycle_focus(true),
        (KeyCode::BackTab, _) => app.cycle_focus(false),
        (KeyCode::Char('1'), _) => app.set_tab(DashboardTab::Overview),
        (KeyCode::Char('2'), _) => app.set_tab(DashboardTab::Metrics),
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => app.move_down(),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => app.move_up(),
        (KeyCode::Enter, _) => app.activate(),
        (KeyCode::Esc, _) => app.escape(),
        (KeyCode::Char('d'), _) => app.dismiss_focused_alert(),
        (KeyCode::Char('f'), _) => app.cycle_alert_filter(),
        (KeyCode::Char('C'), _) => app.clear_alerts(),
        (KeyCode::Char('R'), _) => app.inspect_focused(false),
        (KeyCode::Char('T'), _) => app.inspect_focused(true),
        (KeyCode::Char('y'), _) => app.copy_focused(),
        (KeyCode::Char('r'), _) => app.reload(),
        (KeyCode::Char('h'), _) => app.go_home(),
        _ => {}
    }
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.exit_search(),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_search(),
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.search_push(ch);
        }
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.help_open
        || app.report.is_some()
        || app.selection.selected_transaction().is_some()
        || app.input_mode != InputMode::Normal
        || app.page != Page::Dashboard
        || app.tab != DashboardTab::Overview
    {
        return;
    }
    let Some(size) = terminal_rect() else {
        return;
    };
    let areas = layout::areas(size);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_click(app, areas, mouse.column, mouse.row)
        }
        MouseEventKind::ScrollUp => {
            if focus_panel_at(app, areas, mouse.column, mouse.row) {
                app.move_up();
            }
        }
        MouseEventKind::ScrollDown => {
            if focus_panel_at(app, areas, mouse.column, mouse.row) {
                app.move_down();
            }
        }
        _ => {}
    }
}

fn terminal_rect() -> Option<Rect> {
    let (width, height) = crossterm::terminal::size().ok()?;
    Some(Rect {
        x: 0,
        y: 0,
        width,
        height,
    })
}

fn focus_panel_at(app: &mut App, areas: layout::UiAreas, col: u16, row: u16) -> bool {
    use chainaudit::app::Panel;

    let panel = if layout::rect_contains(areas.graph, col, row) {
        Panel::Graph
    } else if layout::rect_contains(areas.transactions, col, row) {
        Panel::Transactions
    } else if layout::rect_contains(areas.alerts, col, row) {
        Panel::Alerts
    } else {
        return false;
    };
    app.focus = panel;
    true
}

fn handle_click(app: &mut App, areas: layout::UiAreas, col: u16, row: u16) {
    if layout::rect_contains(areas.graph, col, row) {
        let point = Viewport::new(areas.graph, &app.graph_layout()).cell_to_point(col, row);
        if let Some(point) = point {
            app.click_graph(point);
        }
        return;
    }

    if layout::rect_contains(areas.transactions, col, row) {
        let inner = layout::rect_inner(areas.transactions);
        if !layout::rect_contains(inner, col, row) {
            return;
        }
        let idx = ui::list_offset(app.selected_tx_row, inner.height) + (row - inner.y) as usize;
        app.click_transaction_row(idx);
        return;
    }

    if layout::rect_contains(areas.alerts, col, row) {
        let (list, _) = ui::alert_areas(areas.alerts);
        if !layout::rect_contains(list, col, row) {
            return;
        }
        let idx = ui::list_offset(app.selected_alert_row, list.height) + (row - list.y) as usize;
        app.click_alert_row(idx);
    }
}
