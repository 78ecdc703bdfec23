// Terminal view rendering
//
// Layout, top to bottom: menu bar, log panel, path prompt (when open),
// status bar.

use super::app::{key_for, App};
use crate::logging::LogLevel;
use crate::menu::widgets::WidgetName;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Everything the renderer reads besides the app state
pub struct Snapshot<'a> {
    pub running: bool,
    pub entry_points: &'a [String],
}

/// Draw one frame
pub fn draw(f: &mut Frame, app: &App, snapshot: &Snapshot<'_>) {
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(3)];
    if app.prompt.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    render_menu_bar(f, chunks[0], app, snapshot.running);
    render_logs(f, chunks[1], app);
    if app.prompt.is_some() {
        render_prompt(f, chunks[2], app);
    }
    render_status(f, chunks[chunks.len() - 1], app, snapshot);
}

/// One button per control: `[r] Run`
fn render_menu_bar(f: &mut Frame, area: Rect, app: &App, running: bool) {
    let mut spans = Vec::with_capacity(app.controls.len() * 2);
    for (name, label) in &app.controls {
        let style = match name {
            WidgetName::Run if running => Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::Cyan),
        };
        spans.push(Span::styled(
            format!("[{}] ", key_for(*name)),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(button_label(label), style));
        spans.push(Span::raw("  "));
    }

    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Menu "));
    f.render_widget(bar, area);
}

/// Button text: the part before " - ", cut to keep the bar on one line
fn button_label(label: &str) -> String {
    const MAX: usize = 24;
    let label = label.split(" - ").next().unwrap_or(label).trim();
    if label.width() <= MAX {
        return label.to_string();
    }
    let mut out = String::new();
    for c in label.chars() {
        if out.width() + unicode_width::UnicodeWidthChar::width(c).unwrap_or(0) > MAX - 1 {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Error => Style::default().fg(Color::Red),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Info => Style::default().fg(Color::Green),
        LogLevel::Debug => Style::default().fg(Color::Blue),
        LogLevel::Trace => Style::default().fg(Color::DarkGray),
    }
}

fn render_logs(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(" Logs ({}) ", app.log_buffer.len());
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.log_buffer.is_empty() {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "waiting for log output…",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(waiting, area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .log_buffer
        .recent(visible)
        .into_iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    entry.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<5} ", entry.level.as_str()), level_style(entry.level)),
                Span::styled(
                    format!("{} ", short_target(&entry.target)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(entry.message),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Module path without the crate prefix
fn short_target(target: &str) -> &str {
    target.strip_prefix("blockmenu::").unwrap_or(target)
}

fn render_prompt(f: &mut Frame, area: Rect, app: &App) {
    let Some(prompt) = &app.prompt else {
        return;
    };
    let label = app.label(prompt.widget).unwrap_or(prompt.widget.as_str());
    let title = format!(" {} (paths separated by ';', Enter to confirm, Esc to cancel) ", label);

    let input = Paragraph::new(format!("{}▏", prompt.input))
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(input, area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App, snapshot: &Snapshot<'_>) {
    let state = if snapshot.running {
        Span::styled("● running", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("○ idle", Style::default().fg(Color::DarkGray))
    };

    let entries = if snapshot.entry_points.is_empty() {
        "no entry points".to_string()
    } else {
        format!("entry: {}", snapshot.entry_points.join(" → "))
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        state,
        Span::raw(format!(" │ {} │ frame {} │ q quit", entries, app.frames)),
    ]))
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}
