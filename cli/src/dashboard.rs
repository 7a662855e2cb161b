use std::{io, time::Duration};
use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, BorderType, Paragraph, Gauge, Padding},
};
use fleetdash_core::StatisticsSummary;

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    ok: Color,
    busy: Color,
    alert: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    ok: Color::Green,
    busy: Color::Yellow,
    alert: Color::Red,
};

/// One bar chart of the dashboard.
pub struct Panel {
    pub title: &'static str,
    pub bars: Vec<(String, u64)>,
    pub money: bool,
}

pub struct DashboardApp {
    pub summary: StatisticsSummary,
    pub panels: Vec<Panel>,
    pub current_panel: usize,
}

impl DashboardApp {
    pub fn new(summary: StatisticsSummary) -> Self {
        let counts = |map: &std::collections::BTreeMap<String, usize>| -> Vec<(String, u64)> {
            map.iter().map(|(k, v)| (k.clone(), *v as u64)).collect()
        };

        let panels = vec![
            Panel {
                title: " Coût mensuel des maintenances ",
                bars: summary
                    .monthly_maintenance_cost
                    .iter()
                    .map(|m| (m.label(), m.cost.round() as u64))
                    .collect(),
                money: true,
            },
            Panel {
                title: " Véhicules par type ",
                bars: counts(&summary.vehicles_by_type),
                money: false,
            },
            Panel {
                title: " Véhicules par statut ",
                bars: counts(&summary.vehicles_by_status),
                money: false,
            },
            Panel {
                title: " Maintenances par type ",
                bars: counts(&summary.maintenance_by_type),
                money: false,
            },
        ];

        Self {
            summary,
            panels,
            current_panel: 0,
        }
    }

    pub fn next_panel(&mut self) {
        if self.current_panel < self.panels.len() - 1 {
            self.current_panel += 1;
        }
    }

    pub fn previous_panel(&mut self) {
        if self.current_panel > 0 {
            self.current_panel -= 1;
        }
    }

    pub fn current(&self) -> &Panel {
        &self.panels[self.current_panel]
    }

    /// Share of the fleet that is available right now, in `[0, 1]`.
    pub fn availability(&self) -> f64 {
        (self.summary.availability_rate / 100.0).clamp(0.0, 1.0)
    }
}

/// Runs `restore` when dropped, whatever the exit path.
struct RestoreOnDrop<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.restore)()
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// Raw mode plus alternate screen, undone when the returned guard drops.
fn enter_terminal() -> Result<RestoreOnDrop<fn()>> {
    enable_raw_mode()?;
    let guard = RestoreOnDrop { restore: restore_terminal as fn() };
    execute!(io::stdout(), EnterAlternateScreen)?;
    Ok(guard)
}

pub fn run(summary: StatisticsSummary) -> Result<()> {
    if summary.total_vehicles == 0 && summary.monthly_maintenance_cost.is_empty() {
        println!("No fleet data available.");
        return Ok(());
    }

    // Terminal setup
    let _guard = enter_terminal()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = DashboardApp::new(summary);

    // Main loop
    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left | KeyCode::Char('h') => app.previous_panel(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_panel(),
                        _ => {}
                    }
                }
            }
        }
    }

    Ok(())
}

fn ui(frame: &mut Frame, app: &DashboardApp) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + sidebar
            Constraint::Length(1), // Help
        ])
        .split(size);

    // --- Header ---
    let header_block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(THEME.muted));

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Min(1),
            Constraint::Length(40),
        ])
        .split(main_layout[0]);

    let app_title = Paragraph::new(Span::styled("FLEET DASHBOARD", Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD)))
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(app_title, header_layout[0]);

    let last = app.panels.len() - 1;
    let nav_text = Line::from(vec![
        Span::styled(" < ", Style::default().fg(if app.current_panel > 0 { THEME.text } else { THEME.muted })),
        Span::styled(app.current().title.trim(), Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
        Span::styled(" > ", Style::default().fg(if app.current_panel < last { THEME.text } else { THEME.muted })),
    ]);
    let nav = Paragraph::new(nav_text).alignment(Alignment::Right).block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(nav, header_layout[2]);

    frame.render_widget(header_block, main_layout[0]);

    // --- Main Content Split ---
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70),
            Constraint::Length(1),
            Constraint::Percentage(30),
        ])
        .split(main_layout[1]);

    draw_chart(frame, app.current(), content_chunks[0]);
    draw_info_panel(frame, app, content_chunks[2]);

    // --- Footer ---
    let help = Line::from(vec![
        Span::styled("NAV: ", Style::default().fg(THEME.muted)),
        Span::styled("←/→ ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    let footer = Paragraph::new(help).alignment(Alignment::Center).style(Style::default().fg(THEME.muted));
    frame.render_widget(footer, main_layout[2]);
}

fn draw_chart(frame: &mut Frame, panel: &Panel, area: Rect) {
    let chart_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(panel.title);

    if panel.bars.is_empty() {
        frame.render_widget(
            Paragraph::new("Aucune donnée").alignment(Alignment::Center).block(chart_block),
            area,
        );
        return;
    }

    let bar_items: Vec<Bar> = panel.bars.iter().map(|(label, value)| {
        let text = if panel.money { format!("{}€", value) } else { value.to_string() };
        Bar::default()
            .label(label.as_str())
            .value(*value)
            .style(Style::default().fg(if panel.money { THEME.busy } else { THEME.primary }))
            .text_value(text)
    }).collect();

    let chart = BarChart::default()
        .block(chart_block)
        .bar_width(9)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bar_items));

    frame.render_widget(chart, area);
}

fn draw_info_panel(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(16), // Stats
            Constraint::Min(3),     // Availability
        ])
        .split(area);

    let stats = &app.summary;
    let line = |label: &'static str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(THEME.muted)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };

    let info_text = vec![
        Line::from(vec![Span::styled("Vue d'ensemble", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from(""),
        line("Véhicules:      ", stats.total_vehicles.to_string(), THEME.text),
        line("Disponibles:    ", stats.available_vehicles.to_string(), THEME.ok),
        line("En utilisation: ", stats.in_use_vehicles.to_string(), THEME.busy),
        line("Maintenance:    ", stats.in_maintenance.to_string(), THEME.alert),
        line("Vendus:         ", stats.sold_vehicles.to_string(), THEME.muted),
        Line::from(""),
        line("Coût total:     ", format!("{:.2}€", stats.total_maintenance_cost), THEME.text),
        line("Km moyen:       ", format!("{:.0}", stats.average_mileage), THEME.text),
        line("Visites <30j:   ", stats.upcoming_inspections.to_string(), if stats.upcoming_inspections > 0 { THEME.alert } else { THEME.ok }),
        line("Conducteurs:    ", stats.total_drivers.to_string(), THEME.text),
        line("Utilisation:    ", format!("{:.0}%", stats.utilization_rate), THEME.busy),
        line("Maint./véhicule:", format!(" {:.1}", stats.maintenances_per_vehicle), THEME.text),
    ];

    let info_block = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).border_style(Style::default().fg(THEME.muted)).title(" Résumé "));
    frame.render_widget(info_block, chunks[0]);

    let ratio = app.availability();
    let gauge = Gauge::default()
        .block(Block::default().title(" Disponibilité ").borders(Borders::ALL).border_type(BorderType::Rounded).border_style(Style::default().fg(THEME.muted)))
        .gauge_style(Style::default().fg(if ratio < 0.3 { THEME.alert } else { THEME.ok }))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{:.0}% disponibles", ratio * 100.0));

    frame.render_widget(gauge, chunks[1]);
}
