//! TUI rendering logic

use crate::bundle::BundleFile;
use crate::tui::app::App;
use crate::tui::keypad::HELP;
use cardputer_sim::elm::{transcript, TERMINAL_SCRIPT};
use cardputer_sim::{dtc_description, Control, EcuState, Mode, KEYPAD_ROWS, RPM_MAX};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap};
use ratatui::Frame;

/// RPM above which the gauge turns red
const RPM_REDLINE: i32 = 7000;

/// Render the entire application UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(20),   // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Render the mode tab bar
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = Mode::ALL.iter().map(Mode::title).collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Cardputer ECU Simulator "),
        )
        .select(app.session.modes.current().index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    // Left: device (LCD above, keypad below)
    let device = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(7)])
        .split(columns[0]);
    render_screen(frame, app, device[0]);
    render_keypad(frame, app, device[1]);

    // Right: controls, activity, exporter
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(15),
            Constraint::Min(6),
        ])
        .split(columns[1]);
    render_controls(frame, app, side[0]);
    render_activity(frame, app, side[1]);
    render_exporter(frame, app, side[2]);
}

/// Render the virtual LCD
fn render_screen(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" LCD ")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let ecu = &app.session.ecu;
    let mode = app.session.modes.current();
    let ble_dot = if ecu.ble_enabled { Color::Blue } else { Color::DarkGray };
    let header = Line::from(vec![
        Span::styled("● ", Style::default().fg(ble_dot)),
        Span::styled("OBD_SD_SYS", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            if ecu.ble_connected { "BT:CONN" } else { "BT:ADV" },
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(mode.name(), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    match mode {
        Mode::Dashboard => render_dashboard(frame, app, rows[1]),
        Mode::Terminal => render_terminal(frame, ecu, rows[1]),
        Mode::Settings => render_settings(frame, app, rows[1]),
        Mode::DtcManager => render_dtc(frame, ecu, rows[1]),
        Mode::KeyMapper => render_key_mapper(frame, app, rows[1]),
        Mode::SdManager => render_sd_manager(frame, app, rows[1]),
    }
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let ecu = &app.session.ecu;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // RPM gauge
            Constraint::Length(1),
            Constraint::Length(4), // Fields
            Constraint::Min(0),
            Constraint::Length(2), // Diagnostic status
        ])
        .split(area);

    let gauge_color = if ecu.rpm > RPM_REDLINE { Color::Red } else { Color::Green };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(gauge_color).bg(Color::Black))
        .ratio((ecu.rpm as f64 / RPM_MAX as f64).clamp(0.0, 1.0))
        .label(format!("{} rpm", ecu.rpm));
    frame.render_widget(gauge, chunks[0]);

    let selected = app.selected_control();
    let lines: Vec<Line> = Control::ALL
        .iter()
        .map(|control| {
            let style = if selected == Some(*control) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(
                    format!("{:<4}", control.label()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format_control(ecu, *control), style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[2]);

    let (status, color) = if ecu.mil {
        ("ENGINE FAULT", Color::Red)
    } else {
        ("SYSTEM OK", Color::Green)
    };
    let footer = vec![
        Line::from(Span::styled("DIAGNOSTIC STATUS", Style::default().fg(Color::DarkGray))),
        Line::from(vec![
            Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled(ecu.dtc.as_str(), Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(footer), chunks[4]);
}

fn format_control(ecu: &EcuState, control: Control) -> String {
    match control {
        Control::Rpm => ecu.rpm.to_string(),
        Control::Speed => format!("{} {}", ecu.speed, control.unit()),
        Control::Temperature => format!("{}{}", ecu.temperature, control.unit()),
        Control::Voltage => format!("{:.1}{}", ecu.voltage, control.unit()),
    }
}

fn render_terminal(frame: &mut Frame, ecu: &EcuState, area: Rect) {
    let mut lines = Vec::new();
    for (request, response) in transcript(ecu, TERMINAL_SCRIPT) {
        lines.push(Line::from(Span::styled(
            format!("> {request}"),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {response}"),
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::from(Span::styled(
        "_",
        Style::default().add_modifier(Modifier::SLOW_BLINK),
    )));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let ecu = &app.session.ecu;
    let on_off = |on: bool| if on { "ON" } else { "OFF" };
    let lines = vec![
        setting_line("DEVICE", ecu.device_name.clone()),
        setting_line("BLE", on_off(ecu.ble_enabled).to_string()),
        setting_line(
            "LINK",
            if ecu.ble_connected { "CONNECTED" } else { "ADVERTISING" }.to_string(),
        ),
        setting_line("KEYS", format!("{} bound", app.session.keymap.len())),
        setting_line("SD", format!("{} logs", app.session.profiles.len())),
        Line::from(""),
        Line::from(Span::styled(
            "OPT toggles BLE",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn setting_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<8}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn render_dtc(frame: &mut Frame, ecu: &EcuState, area: Rect) {
    let color = if ecu.mil { Color::Red } else { Color::Green };
    let lines = vec![
        Line::from(Span::styled("STORED CODES", Style::default().fg(Color::DarkGray))),
        Line::from(vec![
            Span::styled(ecu.dtc.as_str(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::raw(dtc_description(&ecu.dtc)),
        ]),
        Line::from(format!("MIL {}", if ecu.mil { "ON" } else { "OFF" })),
        Line::from(""),
        Line::from(Span::styled(
            "ENT toggles MIL",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_key_mapper(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled("KEY CONFIGURATION", Style::default().fg(Color::DarkGray))),
        chunks[0],
    );

    let selected = app.session.modes.selected_index();
    let visible = chunks[1].height as usize;
    let skip = (selected + 1).saturating_sub(visible);
    let lines: Vec<Line> = app
        .session
        .keymap
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, (key, action))| {
            let style = if i == selected {
                Style::default().fg(Color::Blue).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("KEY {key:<4} {action}"), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[1]);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "UP/DOWN to navigate, F4 cycles action",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        chunks[2],
    );
}

fn render_sd_manager(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let header = Line::from(vec![
        Span::styled(
            "SD CARD MANAGER",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("[F2] NEW LOG", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let profiles = app.session.profiles.list();
    if profiles.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "SD empty",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let selected = app.session.modes.selected_index();
    let visible = chunks[1].height as usize;
    let skip = (selected + 1).saturating_sub(visible);
    let lines: Vec<Line> = profiles
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, profile)| {
            let style = if i == selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("{:<14}", profile.file_name()), style),
                Span::styled(profile.timestamp.as_str(), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[1]);
}

/// Render the virtual keypad, mapped keys highlighted
fn render_keypad(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Keypad ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = KEYPAD_ROWS
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .flat_map(|key| {
                    let mut style = if app.session.keymap.is_bound(key) {
                        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    if app.last_key.as_deref() == Some(*key) {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    [Span::styled(format!("{key:^4}"), style), Span::raw(" ")]
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center),
        inner,
    );
}

/// Render the control panel: live values and slider ranges
fn render_controls(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Controls ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let ecu = &app.session.ecu;
    let lines: Vec<Line> = Control::ALL
        .iter()
        .map(|control| {
            let (min, max) = control.range();
            Line::from(vec![
                Span::styled(format!("{control:<12}"), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:>8}", format_control(ecu, *control)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(format!("  [{min} .. {max}]"), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the rolling activity log
fn render_activity(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Activity ");
    let lines: Vec<Line> = app.activity.entries().map(Line::from).collect();
    let widget = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(widget, area);
}

/// Render the bundle exporter with one tab per file
fn render_exporter(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.generation.in_flight() {
        " Firmware Bundle (generating...) "
    } else {
        " Firmware Bundle "
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let tabs = Tabs::new(BundleFile::ALL.iter().map(BundleFile::label).collect::<Vec<_>>())
        .select(
            BundleFile::ALL
                .iter()
                .position(|f| *f == app.export_tab)
                .unwrap_or(0),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    let body = match app.generation.bundle() {
        Some(bundle) => Paragraph::new(bundle.text(app.export_tab).to_string())
            .style(Style::default().fg(Color::Green)),
        None => Paragraph::new(vec![
            Line::from(Span::styled("No bundle generated", Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                format!("F5 generates {}", app.export_tab.path()),
                Style::default().fg(Color::DarkGray),
            )),
        ]),
    };
    frame.render_widget(body.wrap(Wrap { trim: false }), chunks[1]);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let ecu = &app.session.ecu;
    let mil = if ecu.mil {
        Span::styled("MIL", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("MIL", Style::default().fg(Color::DarkGray))
    };
    let ble = if ecu.ble_enabled {
        Span::styled("BLE", Style::default().fg(Color::Blue))
    } else {
        Span::styled("BLE", Style::default().fg(Color::DarkGray))
    };

    let status_line = Line::from(vec![
        Span::raw("["),
        Span::raw(app.session.modes.current().name()),
        Span::raw("] ["),
        mil,
        Span::raw("] ["),
        ble,
        Span::raw("] "),
        Span::raw(format!("SD:{} ", app.session.profiles.len())),
        Span::raw(" | "),
        Span::styled(
            "F1: Help  F2: Save  F5: Generate  Ctrl+Q: Quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(status_line), inner);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());

    let mut help_text = vec![Line::from("Keyboard Shortcuts"), Line::from("")];
    help_text.extend(
        HELP.iter()
            .map(|(keys, meaning)| Line::from(format!("{keys:<20} {meaning}"))),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    frame.render_widget(ratatui::widgets::Clear, area);
    let widget = Paragraph::new(help_text).block(block);
    frame.render_widget(widget, area);
}

/// Helper to create a centered rectangle
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
