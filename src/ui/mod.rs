use chrono::{Local, TimeZone};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod graph;
pub mod layout;
pub mod widgets;

use crate::app::{App, DashboardTab, InputMode, Page, Panel, StatusLevel};
use crate::domain::{Alert, Severity, Transaction};
use crate::store::EntityStore;
use crate::ui::layout::centered_rect;
use crate::ui::widgets::MiniSparkline;

const SPINNER: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();

    if app.page == Page::Home {
        draw_home(f, size, app);
    } else {
        let areas = layout::areas(size);
        draw_header(f, areas.header, app);
        draw_tabs(f, areas.tabs, app);
        draw_stats(f, areas.stats, app);
        match &app.store {
            EntityStore::Loaded(_) => match app.tab {
                DashboardTab::Overview => {
                    graph::draw_graph(f, areas.graph, app);
                    draw_transactions(f, areas.transactions, app);
                    draw_alerts(f, areas.alerts, app);
                }
                DashboardTab::Metrics => draw_metrics(f, areas.body, app),
            },
            EntityStore::Loading => draw_loading(f, areas.body, app),
            EntityStore::Failed(reason) => draw_failure(f, areas.body, reason),
            EntityStore::Empty => draw_notice(f, areas.body, "No dataset", Color::DarkGray),
        }
        draw_status_line(f, areas.status_line, app);
        draw_command_line(f, areas.command_line, app);

        if let Some(tx) = app.selection.selected_transaction() {
            draw_transaction_popup(f, size, tx);
        }
        if app.report.is_some() {
            draw_report_popup(f, size, app);
        }
    }

    if app.help_open {
        draw_help_popup(f, size);
    }
}

fn draw_home(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let accent = Style::default()
        .fg(Color::LightCyan)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("ChainAudit", accent)),
        Line::from(Span::styled(
            "Blockchain transaction network auditing",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("• ", dim),
            Span::raw("Circular network graph of wallets, exchanges and contracts"),
        ]),
        Line::from(vec![
            Span::styled("• ", dim),
            Span::raw("Live filtering by transaction id, source or target"),
        ]),
        Line::from(vec![
            Span::styled("• ", dim),
            Span::raw("Risk alerts, price feed and network metrics"),
        ]),
        Line::from(vec![
            Span::styled("• ", dim),
            Span::raw("Risk analysis and fund tracing per address"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Source ", dim),
            Span::raw(app.source_label.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" open dashboard  "),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::raw(" help  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" quit"),
        ]),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, centered_rect(70, 60, chunks[0]));
    draw_status_line(f, chunks[1], app);
    draw_command_line(f, chunks[2], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(24),
            Constraint::Min(20),
            Constraint::Length(22),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "ChainAudit",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" dashboard", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let searching = app.input_mode == InputMode::Search;
    let query = app.selection.search_query();
    let search_line = if query.is_empty() && !searching {
        Line::from(Span::styled(
            "Search by id, source or target (/)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::raw(query.to_string())];
        if searching {
            spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };
    let search_border = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(search_border),
    );
    f.render_widget(search, chunks[1]);

    let count = app.alerts.len();
    let badge = if count > 9 {
        "9+".to_string()
    } else {
        count.to_string()
    };
    let badge_style = if count > 0 {
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let alerts = Paragraph::new(Line::from(vec![
        Span::styled("Alerts ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" {badge} "), badge_style),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(alerts, chunks[2]);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for (idx, tab) in DashboardTab::ALL.iter().enumerate() {
        let style = if *tab == app.tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} {} ", idx + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
    let stats = &app.view().stats;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let cards = [
        (
            "Total volume",
            format!("{:.2} ETH", stats.total_volume),
            Color::LightCyan,
        ),
        (
            "Transactions",
            format!(
                "{}  ({} ok / {} suspicious)",
                stats.total_transactions,
                stats.legitimate_count(),
                stats.flagged_count
            ),
            Color::White,
        ),
        (
            "Avg transaction",
            format!("{:.4} ETH", stats.avg_transaction),
            Color::White,
        ),
        (
            "Flagged",
            stats.flagged_count.to_string(),
            if stats.flagged_count > 0 {
                Color::LightRed
            } else {
                Color::LightGreen
            },
        ),
    ];

    for ((label, value, color), chunk) in cards.into_iter().zip(chunks.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(label, Style::default().fg(Color::DarkGray))),
        );
        f.render_widget(card, *chunk);
    }
}

fn panel_border(app: &App, panel: Panel) -> Style {
    if app.focus == panel {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn panel_highlight(app: &App, panel: Panel) -> Style {
    if app.focus == panel {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn draw_transactions(f: &mut Frame, area: Rect, app: &App) {
    let rows = app.transaction_rows();
    let mut title = format!(" Transactions ({}) ", rows.len());
    if let Some(wallet) = app.selection.selected_wallet() {
        title = format!(" Transactions ({}) · {} ", rows.len(), short_addr(wallet));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(panel_border(app, Panel::Transactions));

    if rows.is_empty() {
        let paragraph = Paragraph::new("No transactions match the current filters")
            .style(Style::default().fg(Color::DarkGray))
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = rows.iter().map(|tx| tx_item(tx)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(panel_highlight(app, Panel::Transactions))
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    state.select(Some(app.selected_tx_row));
    f.render_stateful_widget(list, area, &mut state);
}

fn tx_item(tx: &Transaction) -> ListItem<'static> {
    let status = if tx.is_flagged {
        Span::styled("FLAG ", Style::default().fg(Color::LightRed))
    } else {
        Span::styled("ok   ", Style::default().fg(Color::LightGreen))
    };
    ListItem::new(Line::from(vec![
        status,
        Span::raw(format!("{:<8} ", truncate_str(&tx.id, 8))),
        Span::styled(
            format!("{}→{} ", short_addr(&tx.source), short_addr(&tx.target)),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(format!("{:>10.4} ", tx.amount)),
        Span::styled(format_time(tx.timestamp), Style::default().fg(Color::DarkGray)),
    ]))
}

fn draw_alerts(f: &mut Frame, area: Rect, app: &App) {
    let counts = app.alerts.counts();
    let title = Line::from(vec![
        Span::raw(format!(" Alerts [{}] ", app.alert_filter)),
        Span::styled(format!("H{} ", counts.high), severity_style(Severity::High)),
        Span::styled(format!("M{} ", counts.medium), severity_style(Severity::Medium)),
        Span::styled(format!("L{} ", counts.low), severity_style(Severity::Low)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(panel_border(app, Panel::Alerts));

    let visible = app.visible_alerts();
    if visible.is_empty() {
        let message = if app.alerts.is_empty() {
            "No active alerts".to_string()
        } else {
            format!("No {} alerts", app.alert_filter)
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let (list_area, detail_area) = alert_areas(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = visible.iter().map(|alert| alert_item(alert)).collect();
    let list = List::new(items)
        .highlight_style(panel_highlight(app, Panel::Alerts))
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    state.select(Some(app.selected_alert_row));
    f.render_stateful_widget(list, list_area, &mut state);

    if let Some(alert) = visible.get(app.selected_alert_row) {
        let detail = Paragraph::new(Text::from(alert_detail_lines(alert)))
            .block(Block::default().borders(Borders::TOP))
            .wrap(Wrap { trim: true });
        f.render_widget(detail, detail_area);
    }
}

/// Alert list rows and the detail pane below them, inside the panel border
pub fn alert_areas(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(5)])
        .split(layout::rect_inner(area));
    (chunks[0], chunks[1])
}

/// First row a `List` shows when it keeps `selected` in view
pub fn list_offset(selected: usize, height: u16) -> usize {
    selected.saturating_sub((height as usize).saturating_sub(1))
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::High => Style::default().fg(Color::LightRed),
        Severity::Medium => Style::default().fg(Color::LightYellow),
        Severity::Low => Style::default().fg(Color::LightBlue),
    }
}

fn alert_item(alert: &Alert) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<6} ", alert.severity.label().to_uppercase()),
            severity_style(alert.severity).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} ", truncate_str(&alert.title, 40))),
        Span::styled(
            format!("· {}", alert.kind_label()),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

fn alert_detail_lines(alert: &Alert) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} ", alert.id), dim),
        Span::raw(alert.description.clone()),
    ])];
    lines.push(Line::from(Span::styled(format_time(alert.timestamp), dim)));
    if let Some(data) = alert.data.as_ref() {
        for (key, value) in data {
            lines.push(Line::from(vec![
                Span::styled(format!("{key}: "), dim),
                Span::raw(value.to_string()),
            ]));
        }
    }
    lines
}

fn draw_metrics(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(5)])
        .split(chunks[0]);

    draw_prices(f, left[0], app);
    draw_distribution(f, left[1], app);
    draw_network(f, chunks[1], app);
}

fn draw_prices(f: &mut Frame, area: Rect, app: &App) {
    let updated = app
        .prices
        .last_update()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Prices (updated {updated}) "));
    let inner = layout::rect_inner(area);
    f.render_widget(block, area);

    if app.prices.is_empty() {
        f.render_widget(
            Paragraph::new("Waiting for price feed…").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let spark_width = 20u16.min(inner.width / 3);
    for (row, (asset, quote)) in app
        .prices
        .quotes()
        .iter()
        .enumerate()
        .take(inner.height as usize)
    {
        let y = inner.y + row as u16;
        let change_style = if quote.is_up() {
            Style::default().fg(Color::LightGreen)
        } else {
            Style::default().fg(Color::LightRed)
        };
        let text_area = Rect::new(inner.x, y, inner.width.saturating_sub(spark_width), 1);
        let line = Line::from(vec![
            Span::styled(
                format!("{:<10}", truncate_str(asset, 10)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{:>12.2} ", quote.price)),
            Span::styled(format!("{:>+7.2}% ", quote.change_24h), change_style),
            Span::styled(
                format!(
                    "vol {} cap {}",
                    compact_number(quote.volume_24h),
                    compact_number(quote.market_cap)
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(Paragraph::new(line), text_area);

        let spark_area = Rect::new(
            inner.x + inner.width.saturating_sub(spark_width),
            y,
            spark_width,
            1,
        );
        f.render_widget(
            MiniSparkline::new(app.prices.history(asset)).style(change_style),
            spark_area,
        );
    }
}

fn draw_distribution(f: &mut Frame, area: Rect, app: &App) {
    let stats = &app.view().stats;
    let total = stats.total_transactions.max(1);
    let width = layout::rect_inner(area).width.saturating_sub(18) as usize;
    let bar = |count: usize| "█".repeat(count * width / total);
    let lines = vec![
        Line::from(vec![
            Span::raw(format!("{:<12}", "Legitimate")),
            Span::styled(bar(stats.legitimate_count()), Style::default().fg(Color::LightGreen)),
            Span::raw(format!(" {}", stats.legitimate_count())),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<12}", "Suspicious")),
            Span::styled(bar(stats.flagged_count), Style::default().fg(Color::LightRed)),
            Span::raw(format!(" {}", stats.flagged_count)),
        ]),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Distribution "));
    f.render_widget(paragraph, area);
}

fn draw_network(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = match app.prices.network() {
        Some(value) => serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| value.to_string())
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect(),
        None => vec![Line::from(Span::styled(
            "Waiting for network analysis…",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Network analysis "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_loading(f: &mut Frame, area: Rect, app: &App) {
    let glyph = SPINNER[app.spinner % SPINNER.len()];
    draw_notice(
        f,
        area,
        &format!("{glyph} Loading {}…", app.source_label),
        Color::LightCyan,
    );
}

fn draw_failure(f: &mut Frame, area: Rect, reason: &str) {
    draw_notice(
        f,
        area,
        &format!("Could not load dataset: {reason}\n\n:reload to try again"),
        Color::LightRed,
    );
}

fn draw_notice(f: &mut Frame, area: Rect, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, centered_rect(60, 40, area));
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled("Source ", dim),
        Span::raw(format!("{}  ", app.source_label)),
    ];
    if app.session_open() {
        spans.push(Span::styled("Session ", dim));
        spans.push(Span::raw(format!("{}  ", app.session())));
    }
    if let Some(snapshot) = app.snapshot() {
        spans.push(Span::styled("Nodes ", dim));
        spans.push(Span::raw(format!("{}  ", snapshot.nodes().len())));
    }
    if app.page == Page::Dashboard {
        spans.push(Span::styled("Focus ", dim));
        spans.push(Span::raw(format!("{}  ", app.focus.title())));
    }
    if let Some(wallet) = app.selection.selected_wallet() {
        spans.push(Span::styled("Wallet ", dim));
        spans.push(Span::styled(
            format!("{}  ", wallet),
            Style::default().fg(Color::LightCyan),
        ));
    }
    if !app.selection.search_query().is_empty() {
        spans.push(Span::styled("Filter ", dim));
        spans.push(Span::raw(app.selection.search_query().to_string()));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("search", "Filter transactions by id/source/target"),
        ("wallet", "Select a wallet by id"),
        ("reset", "Clear wallet selection"),
        ("tx", "Open transaction detail"),
        ("close", "Close detail / popups"),
        ("dismiss", "Dismiss an alert by id"),
        ("clear-alerts", "Dismiss all alerts"),
        ("alerts", "Filter alerts: all|high|medium|low"),
        ("risk", "Risk analysis for address"),
        ("trace", "Fund tracing [address] [depth]"),
        ("overview", "Overview tab"),
        ("metrics", "Metrics tab"),
        ("home", "Back to home page"),
        ("dashboard", "Open dashboard"),
        ("reload", "Reload dataset"),
        ("quit", "Quit"),
    ];

    let word = input.split_whitespace().next().unwrap_or("");
    for (cmd, desc) in commands {
        if cmd.starts_with(word) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("search | wallet | tx | risk | trace | alerts | reload");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Search => Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Yellow)),
            Span::raw(app.selection.search_query().to_string()),
            Span::styled(
                "  (live filter, Enter/Esc=done, Ctrl-u=clear)",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    f.render_widget(Paragraph::new(content), area);
}

fn action_hints(app: &App) -> Line<'static> {
    let key = Style::default().fg(Color::Yellow);
    let hints: &[(&str, &str)] = match (app.page, app.focus) {
        (Page::Home, _) => &[
            ("Enter", "dashboard"),
            (":", "command"),
            ("?", "help"),
            ("q", "quit"),
        ],
        (Page::Dashboard, Panel::Graph) => &[
            ("Tab", "panel"),
            ("j/k", "node"),
            ("Enter", "select wallet"),
            ("R", "risk"),
            ("T", "trace"),
            ("/", "search"),
            ("Esc", "reset"),
        ],
        (Page::Dashboard, Panel::Transactions) => &[
            ("Tab", "panel"),
            ("j/k", "row"),
            ("Enter", "detail"),
            ("y", "copy"),
            ("/", "search"),
        ],
        (Page::Dashboard, Panel::Alerts) => &[
            ("Tab", "panel"),
            ("j/k", "alert"),
            ("d", "dismiss"),
            ("f", "filter"),
            ("C", "clear all"),
        ],
    };
    let mut spans = Vec::new();
    for (k, label) in hints {
        spans.push(Span::styled(k.to_string(), key));
        spans.push(Span::raw(format!(" {label}  ")));
    }
    Line::from(spans)
}

fn draw_transaction_popup(f: &mut Frame, area: Rect, tx: &Transaction) {
    let popup = centered_rect(60, 50, area);
    let dim = Style::default().fg(Color::DarkGray);
    let status = if tx.is_flagged {
        Span::styled(
            "FLAGGED",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "CLEAN",
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
    };
    let lines = vec![
        Line::from(vec![Span::styled("Id      ", dim), Span::raw(tx.id.clone())]),
        Line::from(vec![Span::styled("Status  ", dim), status]),
        Line::from(vec![Span::styled("Source  ", dim), Span::raw(tx.source.clone())]),
        Line::from(vec![Span::styled("Target  ", dim), Span::raw(tx.target.clone())]),
        Line::from(vec![
            Span::styled("Amount  ", dim),
            Span::raw(format!("{:.4} ETH", tx.amount)),
        ]),
        Line::from(vec![
            Span::styled("Time    ", dim),
            Span::raw(format_datetime(tx.timestamp)),
        ]),
        Line::from(""),
        Line::from(Span::styled("Esc close  y copy id", dim)),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Transaction ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn draw_report_popup(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = app.report.as_ref() else {
        return;
    };
    let popup = centered_rect(70, 70, area);
    let lines: Vec<Line> = report.lines().into_iter().map(Line::from).collect();
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} · {} ", report.title, short_addr(&report.address)))
                .border_style(Style::default().fg(Color::LightMagenta)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup = centered_rect(64, 70, area);
    let key = Style::default().fg(Color::Yellow);
    let rows = [
        ("Enter", "Home: open dashboard / select focused item"),
        ("Tab / S-Tab", "Cycle panel focus"),
        ("1 / 2", "Overview / Metrics tab"),
        ("j k ↑ ↓", "Move within focused panel"),
        ("/", "Live search"),
        (":", "Command palette"),
        ("Esc", "Close popup, detail, or reset wallet"),
        ("d", "Dismiss focused alert"),
        ("f", "Cycle alert severity filter"),
        ("C", "Clear all alerts"),
        ("R / T", "Risk analysis / fund tracing"),
        ("y", "Copy focused id"),
        ("r", "Reload dataset"),
        ("h", "Home page"),
        ("q", "Quit"),
        ("mouse", "Click nodes, rows and alerts"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(k, desc)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", k), key),
                Span::raw(desc.to_string()),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help (? or Esc to close) "),
    );
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn format_time(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string())
}

fn format_datetime(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn compact_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{:.0}", value)
    }
}

fn short_addr(value: &str) -> String {
    if value.chars().count() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}

fn truncate_str(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    value.chars().take(max).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_hint() {
        assert_eq!(command_hint("tr"), Some("Fund tracing [address] [depth]"));
        assert_eq!(command_hint("wallet 0x1"), Some("Select a wallet by id"));
        assert_eq!(command_hint("zzz"), None);
        assert_eq!(command_hint(""), None);
    }

    #[test]
    fn test_list_offset_keeps_selection_visible() {
        assert_eq!(list_offset(0, 5), 0);
        assert_eq!(list_offset(4, 5), 0);
        assert_eq!(list_offset(7, 5), 3);
        assert_eq!(list_offset(3, 0), 3);
    }

    #[test]
    fn test_compact_number() {
        assert_eq!(compact_number(850_000_000_000.0), "850.00B");
        assert_eq!(compact_number(1_500.0), "1.5K");
        assert_eq!(compact_number(12.0), "12");
    }

    #[test]
    fn test_short_addr_and_truncate() {
        assert_eq!(short_addr("0x1a2b3c"), "0x1a2b3c");
        assert_eq!(short_addr("0x1234567890abcdef"), "0x1234..cdef");
        assert_eq!(truncate_str("abcdef", 3), "abc…");
    }
}
