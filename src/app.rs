use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::core::{
    parse_command, Action, Command, InspectRequest, NavigateTarget, NotifyLevel, SelectionState,
};
use crate::domain::{
    Alert, DerivedView, GraphLayout, LayoutConfig, Node, PipelineCache, Point, Transaction,
};
use crate::modules::{AlertState, PriceBoard, PriceQuote, SeverityFilter};
use crate::store::{Dataset, EntityStore, Snapshot};

/// Max distance, in logical canvas units, for a click to hit a node
pub const NODE_HIT_TOLERANCE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Overview,
    Metrics,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 2] = [DashboardTab::Overview, DashboardTab::Metrics];

    pub fn title(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "Overview",
            DashboardTab::Metrics => "Metrics",
        }
    }
}

/// Focusable panels of the overview tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Graph,
    Transactions,
    Alerts,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Graph, Panel::Transactions, Panel::Alerts];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Graph => "Network",
            Panel::Transactions => "Transactions",
            Panel::Alerts => "Alerts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// Opaque report returned by the risk or fund-tracing service
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub address: String,
    pub body: serde_json::Value,
}

impl Report {
    pub fn lines(&self) -> Vec<String> {
        serde_json::to_string_pretty(&self.body)
            .unwrap_or_else(|_| self.body.to_string())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Work the app wants the runtime to do, in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    Open(u64),
    Close(u64),
    Inspect(u64, InspectRequest),
}

pub struct App {
    pub page: Page,
    pub tab: DashboardTab,
    pub focus: Panel,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub selection: SelectionState,
    pub store: EntityStore,
    pub alerts: AlertState,
    pub alert_filter: SeverityFilter,
    pub prices: PriceBoard,
    pub report: Option<Report>,
    pub layout: LayoutConfig,
    pub trace_depth: u32,
    pub source_label: String,
    pub selected_node: usize,
    pub selected_tx_row: usize,
    pub selected_alert_row: usize,
    pub status: Option<StatusMessage>,
    pub help_open: bool,
    pub should_quit: bool,
    pub spinner: usize,
    pipeline: PipelineCache,
    session: u64,
    session_open: bool,
    next_version: u64,
    requests: Vec<SessionRequest>,
    pending_copy: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            page: Page::Home,
            tab: DashboardTab::Overview,
            focus: Panel::Graph,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            selection: SelectionState::new(),
            store: EntityStore::Empty,
            alerts: AlertState::new(),
            alert_filter: SeverityFilter::All,
            prices: PriceBoard::new(),
            report: None,
            layout: LayoutConfig::default(),
            trace_depth: 3,
            source_label: "local sample".to_string(),
            selected_node: 0,
            selected_tx_row: 0,
            selected_alert_row: 0,
            status: None,
            help_open: false,
            should_quit: false,
            spinner: 0,
            pipeline: PipelineCache::new(),
            session: 0,
            session_open: false,
            next_version: 1,
            requests: Vec::new(),
            pending_copy: None,
        }
    }

    // ---- session lifecycle ----

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn session_open(&self) -> bool {
        self.session_open
    }

    fn is_current(&self, session: u64) -> bool {
        let current = self.session_open && session == self.session;
        if !current {
            debug!(session, active = self.session, "discarding stale session event");
        }
        current
    }

    /// Enter the dashboard and start a fresh session
    pub fn open_dashboard(&mut self) {
        self.page = Page::Dashboard;
        if self.session_open {
            return;
        }
        self.session += 1;
        self.session_open = true;
        self.store = EntityStore::Loading;
        self.alerts.seed(Vec::new());
        self.prices.clear();
        self.report = None;
        self.sync_view();
        self.requests.push(SessionRequest::Open(self.session));
        info!(session = self.session, source = %self.source_label, "dashboard session opening");
    }

    pub fn close_session(&mut self) {
        if !self.session_open {
            return;
        }
        self.session_open = false;
        self.requests.push(SessionRequest::Close(self.session));
        info!(session = self.session, "dashboard session closed");
    }

    pub fn go_home(&mut self) {
        self.close_session();
        self.page = Page::Home;
        self.report = None;
    }

    pub fn reload(&mut self) {
        self.close_session();
        self.open_dashboard();
        self.set_status("Reloading dataset…", StatusLevel::Info);
    }

    pub fn take_requests(&mut self) -> Vec<SessionRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn take_copy_request(&mut self) -> Option<String> {
        self.pending_copy.take()
    }

    // ---- runtime events ----

    pub fn apply_dataset(&mut self, session: u64, dataset: Dataset) {
        if !self.is_current(session) {
            return;
        }
        let version = self.next_version;
        self.next_version += 1;
        match Snapshot::build(version, dataset) {
            Ok(snapshot) => {
                let integrity = snapshot.integrity();
                if !integrity.is_clean() {
                    warn!(
                        session,
                        dangling = ?integrity.dangling,
                        invalid_amount = ?integrity.invalid_amount,
                        "dataset integrity issues"
                    );
                    self.set_status(integrity.summary(), StatusLevel::Warn);
                }
                info!(
                    session,
                    version,
                    nodes = snapshot.nodes().len(),
                    transactions = snapshot.transactions().len(),
                    "snapshot ready"
                );
                self.store = EntityStore::Loaded(snapshot);
            }
            Err(err) => {
                warn!(session, error = %err, "dataset rejected");
                self.set_status(format!("Dataset rejected: {err}"), StatusLevel::Error);
                self.store = EntityStore::Failed(err.to_string());
            }
        }
        self.sync_view();
    }

    pub fn apply_dataset_failure(&mut self, session: u64, message: String) {
        if !self.is_current(session) {
            return;
        }
        self.set_status(format!("Load failed: {message}"), StatusLevel::Error);
        self.store = EntityStore::Failed(message);
        self.sync_view();
    }

    pub fn apply_alerts(&mut self, session: u64, alerts: Vec<Alert>) {
        if !self.is_current(session) {
            return;
        }
        self.alerts.seed(alerts);
        self.clamp_cursors();
    }

    pub fn apply_prices(&mut self, session: u64, quotes: BTreeMap<String, PriceQuote>) {
        if !self.is_current(session) {
            return;
        }
        self.prices.apply_prices(quotes, chrono::Local::now());
    }

    pub fn apply_network(&mut self, session: u64, analysis: serde_json::Value) {
        if !self.is_current(session) {
            return;
        }
        self.prices.apply_network(analysis);
    }

    pub fn apply_report(
        &mut self,
        session: u64,
        request: InspectRequest,
        report: serde_json::Value,
    ) {
        if !self.is_current(session) {
            return;
        }
        self.report = Some(Report {
            title: request.label().to_string(),
            address: request.address().to_string(),
            body: report,
        });
    }

    pub fn apply_runtime_error(&mut self, session: Option<u64>, message: String) {
        if let Some(session) = session {
            if !self.is_current(session) {
                return;
            }
        }
        self.set_status(message, StatusLevel::Error);
    }

    // ---- derived state ----

    /// Re-run the derived view pipeline if any of its inputs changed
    pub fn sync_view(&mut self) {
        if self.pipeline.update(
            self.store.snapshot(),
            self.selection.search_query(),
            self.selection.selected_wallet(),
        ) {
            self.clamp_cursors();
        }
    }

    pub fn view(&self) -> &DerivedView {
        self.pipeline.view()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.store.snapshot()
    }

    pub fn nodes(&self) -> &[Node] {
        self.snapshot().map(Snapshot::nodes).unwrap_or(&[])
    }

    /// Rows of the transaction table: the wallet-filtered set
    pub fn transaction_rows(&self) -> Vec<&Transaction> {
        match self.snapshot() {
            Some(snapshot) => self
                .view()
                .wallet_filtered(snapshot.transactions())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Transactions drawn as graph links: the text-filtered set
    pub fn graph_transactions(&self) -> Vec<&Transaction> {
        match self.snapshot() {
            Some(snapshot) => self.view().text_filtered(snapshot.transactions()).collect(),
            None => Vec::new(),
        }
    }

    pub fn visible_alerts(&self) -> Vec<&Alert> {
        self.alerts.filter_by_severity(self.alert_filter)
    }

    pub fn graph_layout(&self) -> GraphLayout<'_> {
        GraphLayout::new(self.layout, self.nodes())
    }

    fn clamp_cursors(&mut self) {
        let nodes = self.nodes().len();
        let rows = self.view().wallet_indices.len();
        let alerts = self.visible_alerts().len();
        self.selected_node = self.selected_node.min(nodes.saturating_sub(1));
        self.selected_tx_row = self.selected_tx_row.min(rows.saturating_sub(1));
        self.selected_alert_row = self.selected_alert_row.min(alerts.saturating_sub(1));
    }

    // ---- status ----

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            let ttl = match status.level {
                StatusLevel::Error => Duration::from_secs(6),
                _ => Duration::from_secs(3),
            };
            if status.since.elapsed() > ttl {
                self.status = None;
            }
        }
        if self.store.is_loading() {
            self.spinner = self.spinner.wrapping_add(1);
        }
    }

    // ---- focus and cursors ----

    pub fn cycle_focus(&mut self, forward: bool) {
        let index = Panel::ALL
            .iter()
            .position(|panel| *panel == self.focus)
            .unwrap_or(0);
        let next = if forward {
            (index + 1) % Panel::ALL.len()
        } else {
            (index + Panel::ALL.len() - 1) % Panel::ALL.len()
        };
        self.focus = Panel::ALL[next];
    }

    pub fn set_tab(&mut self, tab: DashboardTab) {
        self.tab = tab;
    }

    pub fn move_up(&mut self) {
        match self.focus {
            Panel::Graph => self.selected_node = self.selected_node.saturating_sub(1),
            Panel::Transactions => self.selected_tx_row = self.selected_tx_row.saturating_sub(1),
            Panel::Alerts => {
                self.selected_alert_row = self.selected_alert_row.saturating_sub(1)
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.focus {
            Panel::Graph => self.selected_node += 1,
            Panel::Transactions => self.selected_tx_row += 1,
            Panel::Alerts => self.selected_alert_row += 1,
        }
        self.clamp_cursors();
    }

    /// Enter on the focused panel
    pub fn activate(&mut self) {
        let action = match self.focus {
            Panel::Graph => {
                let id = self.nodes().get(self.selected_node).map(|node| node.id.clone());
                match id {
                    Some(id) => self.selection.click_node(id),
                    None => Action::None,
                }
            }
            Panel::Transactions => {
                let tx = self
                    .transaction_rows()
                    .get(self.selected_tx_row)
                    .map(|tx| (*tx).clone());
                match tx {
                    Some(tx) => self.selection.click_link(tx),
                    None => Action::None,
                }
            }
            Panel::Alerts => Action::None,
        };
        self.apply_action(action);
    }

    /// Esc in normal mode: close the innermost overlay, else clear the wallet
    pub fn escape(&mut self) {
        if self.help_open {
            self.help_open = false;
        } else if self.report.is_some() {
            self.report = None;
        } else if self.selection.selected_transaction().is_some() {
            let action = self.selection.close_detail();
            self.apply_action(action);
        } else if self.selection.selected_wallet().is_some() {
            let action = self.selection.reset_selection();
            self.apply_action(action);
        }
    }

    pub fn reset_selection(&mut self) {
        let action = self.selection.reset_selection();
        self.apply_action(action);
    }

    pub fn dismiss_focused_alert(&mut self) {
        let Some(id) = self
            .visible_alerts()
            .get(self.selected_alert_row)
            .map(|alert| alert.id.clone())
        else {
            self.set_status("No alert selected", StatusLevel::Warn);
            return;
        };
        let action = self.alerts.dismiss(&id);
        self.apply_action(action);
        self.clamp_cursors();
    }

    pub fn cycle_alert_filter(&mut self) {
        self.alert_filter = self.alert_filter.next();
        self.selected_alert_row = 0;
        self.clamp_cursors();
    }

    pub fn clear_alerts(&mut self) {
        self.alerts.clear_all();
        self.selected_alert_row = 0;
        self.set_status("Cleared all alerts", StatusLevel::Info);
    }

    /// Ask for risk analysis on the wallet in focus
    pub fn inspect_focused(&mut self, trace: bool) {
        let Some(address) = self.focused_address() else {
            self.set_status("Select a wallet first", StatusLevel::Warn);
            return;
        };
        let request = if trace {
            InspectRequest::Trace {
                address,
                depth: self.trace_depth,
            }
        } else {
            InspectRequest::Risk { address }
        };
        self.apply_action(Action::Inspect(request));
    }

    fn focused_address(&self) -> Option<String> {
        if let Some(wallet) = self.selection.selected_wallet() {
            return Some(wallet.to_string());
        }
        match self.focus {
            Panel::Graph => self.nodes().get(self.selected_node).map(|n| n.id.clone()),
            _ => None,
        }
    }

    /// Text `y` copies for the current context
    pub fn copy_focused(&mut self) {
        let text = if let Some(tx) = self.selection.selected_transaction() {
            Some(tx.id.clone())
        } else {
            match self.focus {
                Panel::Graph => self.nodes().get(self.selected_node).map(|n| n.id.clone()),
                Panel::Transactions => self
                    .transaction_rows()
                    .get(self.selected_tx_row)
                    .map(|tx| tx.id.clone()),
                Panel::Alerts => self
                    .visible_alerts()
                    .get(self.selected_alert_row)
                    .map(|alert| alert.id.clone()),
            }
        };
        match text {
            Some(text) => self.apply_action(Action::Copy(text)),
            None => self.set_status("Nothing to copy", StatusLevel::Warn),
        }
    }

    // ---- pointer input (logical canvas coordinates / row indices) ----

    pub fn click_graph(&mut self, point: Point) {
        self.focus = Panel::Graph;
        let hit = self
            .graph_layout()
            .node_at(point, NODE_HIT_TOLERANCE)
            .map(|node| node.id.clone());
        let Some(id) = hit else {
            return;
        };
        if let Some(index) = self.nodes().iter().position(|node| node.id == id) {
            self.selected_node = index;
        }
        let action = self.selection.click_node(id);
        self.apply_action(action);
    }

    pub fn click_transaction_row(&mut self, row: usize) {
        self.focus = Panel::Transactions;
        let Some(tx) = self.transaction_rows().get(row).map(|tx| (*tx).clone()) else {
            return;
        };
        self.selected_tx_row = row;
        let action = self.selection.click_link(tx);
        self.apply_action(action);
    }

    pub fn click_alert_row(&mut self, row: usize) {
        self.focus = Panel::Alerts;
        if row < self.visible_alerts().len() {
            self.selected_alert_row = row;
        }
    }

    // ---- text input ----

    pub fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn exit_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn search_push(&mut self, ch: char) {
        let action = self.selection.push_search_char(ch);
        self.apply_action(action);
    }

    pub fn search_pop(&mut self) {
        let action = self.selection.pop_search_char();
        self.apply_action(action);
    }

    pub fn clear_search(&mut self) {
        let action = self.selection.set_search("");
        self.apply_action(action);
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }
        let cmd = parse_command(&input);
        let action = self.execute_command(&cmd);
        self.apply_action(action);
        self.command.last = Some(input);
        self.exit_command();
    }
}

impl App {
    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Search(query) => {
                self.selection.set_search(query.clone());
                if query.is_empty() {
                    Action::Notify("Search cleared".to_string(), NotifyLevel::Info)
                } else {
                    Action::Notify(format!("Filter: {query}"), NotifyLevel::Info)
                }
            }
            Command::Wallet(id) => {
                let index = self.snapshot().map(|_| self.nodes().iter().position(|n| &n.id == id));
                match index {
                    Some(Some(index)) => {
                        self.selected_node = index;
                        self.selection.click_node(id.clone())
                    }
                    Some(None) => {
                        Action::Notify(format!("Unknown wallet: {id}"), NotifyLevel::Warn)
                    }
                    None => Action::Notify("No dataset loaded".to_string(), NotifyLevel::Warn),
                }
            }
            Command::Reset => self.selection.reset_selection(),
            Command::Tx(id) => match self.snapshot().and_then(|s| s.transaction(id)).cloned() {
                Some(tx) => self.selection.click_link(tx),
                None => Action::Notify(format!("Unknown transaction: {id}"), NotifyLevel::Warn),
            },
            Command::Close => {
                self.report = None;
                self.help_open = false;
                self.selection.close_detail()
            }

            Command::Dismiss(id) => match self.alerts.dismiss(id) {
                Action::None => Action::Notify(format!("No alert {id}"), NotifyLevel::Warn),
                action => action,
            },
            Command::ClearAlerts => {
                self.clear_alerts();
                Action::None
            }
            Command::Alerts(filter) => {
                self.alert_filter = *filter;
                self.selected_alert_row = 0;
                self.focus = Panel::Alerts;
                Action::Notify(format!("Showing {filter} alerts"), NotifyLevel::Info)
            }

            Command::Risk(address) => {
                match address
                    .clone()
                    .or_else(|| self.selection.selected_wallet().map(str::to_string))
                {
                    Some(address) => Action::Inspect(InspectRequest::Risk { address }),
                    None => Action::Notify(
                        "risk needs an address or a selected wallet".to_string(),
                        NotifyLevel::Warn,
                    ),
                }
            }
            Command::Trace { address, depth } => {
                match address
                    .clone()
                    .or_else(|| self.selection.selected_wallet().map(str::to_string))
                {
                    Some(address) => Action::Inspect(InspectRequest::Trace {
                        address,
                        depth: depth.unwrap_or(self.trace_depth),
                    }),
                    None => Action::Notify(
                        "trace needs an address or a selected wallet".to_string(),
                        NotifyLevel::Warn,
                    ),
                }
            }

            Command::Overview => Action::Navigate(NavigateTarget::Overview),
            Command::Metrics => Action::Navigate(NavigateTarget::Metrics),
            Command::Home => Action::Navigate(NavigateTarget::Home),
            Command::Dashboard => Action::Navigate(NavigateTarget::Dashboard),
            Command::Reload => Action::Navigate(NavigateTarget::Reload),
            Command::Quit => Action::Quit,

            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        }
    }

    /// Apply an action returned by a command or a state transition
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::SelectWallet(wallet) => {
                info!(wallet = ?wallet, "wallet selected");
            }
            Action::SelectTransaction(tx) => {
                info!(
                    transaction = %tx.id,
                    source = %tx.source,
                    target = %tx.target,
                    "transaction opened"
                );
            }
            Action::Alert(kind, id) => {
                info!(action = kind.as_str(), alert = %id, "alert action");
                self.set_status(format!("Dismissed {id}"), StatusLevel::Info);
            }
            Action::Navigate(target) => match target {
                NavigateTarget::Home => self.go_home(),
                NavigateTarget::Dashboard => self.open_dashboard(),
                NavigateTarget::Overview => {
                    self.open_dashboard();
                    self.set_tab(DashboardTab::Overview);
                }
                NavigateTarget::Metrics => {
                    self.open_dashboard();
                    self.set_tab(DashboardTab::Metrics);
                }
                NavigateTarget::Reload => self.reload(),
            },
            Action::Inspect(request) => {
                if !self.session_open {
                    self.set_status("Open the dashboard first", StatusLevel::Warn);
                } else {
                    info!(session = self.session, request = ?request, "inspect requested");
                    self.set_status(
                        format!("{} for {}…", request.label(), request.address()),
                        StatusLevel::Info,
                    );
                    self.requests
                        .push(SessionRequest::Inspect(self.session, request));
                }
            }
            Action::Copy(text) => self.pending_copy = Some(text),
            Action::Notify(msg, level) => self.set_status(msg, level.into()),
            Action::Quit => {
                self.close_session();
                self.should_quit = true;
            }
        }
        self.sync_view();
    }
}
