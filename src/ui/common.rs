//! Shared UI chrome: header, tabs, status bar, overlays.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, InputMode, View};
use crate::ui::theme::Theme;

/// Render the header bar: app name, backend, refresh countdown.
///
/// The countdown is drawn every frame and therefore visibly updates once
/// per second; while paused it shows the frozen remaining value with a
/// paused marker.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(28)]).split(area);

    let title = Line::from(vec![
        Span::styled(" playerwatch ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(app.backend(), Style::default().fg(app.theme.dim)),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    let countdown = if app.scheduler.is_paused() {
        Span::styled(
            format!("paused ({}s) ", app.scheduler.remaining()),
            Style::default().fg(app.theme.offline).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("refresh in {}s ", app.scheduler.remaining()),
            Style::default().fg(app.theme.highlight),
        )
    };
    let countdown = Paragraph::new(Line::from(countdown)).alignment(Alignment::Right);
    frame.render_widget(countdown, chunks[1]);
}

/// Render the view tabs.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = [View::Servers, View::Activity]
        .iter()
        .map(|view| {
            let style = if *view == app.view {
                app.theme.tab_active
            } else {
                app.theme.tab_inactive
            };
            Line::from(Span::styled(format!(" {} ", view.label()), style))
        })
        .collect();

    let selected = match app.view {
        View::Servers => 0,
        View::Activity => 1,
    };
    let tabs = Tabs::new(titles).select(selected).divider("|");
    frame.render_widget(tabs, area);
}

/// Render the status bar: input prompt, transient message, error, or
/// key hints, in that priority order.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let InputMode::AddServer(text) = &app.input {
        Line::from(vec![
            Span::styled(" add server: ", Style::default().fg(app.theme.highlight)),
            Span::raw(text.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            Span::styled("  [enter:add esc:cancel]", Style::default().fg(app.theme.dim)),
        ])
    } else if let Some(message) = app.status_message() {
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.highlight),
        ))
    } else if let Some(error) = &app.load_error {
        Line::from(Span::styled(
            format!(" backend error: {}", error),
            Style::default().fg(app.theme.offline),
        ))
    } else {
        Line::from(Span::styled(
            " q:quit tab:view enter:select esc:back p:pause +/-:interval r:refresh a:add d:remove ?:help",
            Style::default().fg(app.theme.dim),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let width = 52.min(area.width.saturating_sub(4));
    let height = 18.min(area.height.saturating_sub(2));
    let overlay = centered_rect(area, width, height);

    frame.render_widget(Clear, overlay);

    let lines = vec![
        Line::from(""),
        help_line("q", "quit"),
        help_line("tab / 1 / 2", "switch view"),
        help_line("up/down j/k", "move in server table"),
        help_line("enter", "select server (activity view)"),
        help_line("esc", "clear selection / back"),
        help_line("left/right", "inspect chart points"),
        help_line("p / space", "pause or resume refresh"),
        help_line("+ / -", "refresh interval up/down"),
        help_line("r", "refresh now"),
        help_line("a", "add server"),
        help_line("d", "remove server under cursor"),
        help_line("?", "toggle this help"),
        Line::from(""),
        Line::from(Span::styled(
            " press any key to close ",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}

fn help_line(key: &str, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<14}", key), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(action.to_string()),
    ])
}

/// Render the remove-server confirmation overlay.
pub fn render_confirm(frame: &mut Frame, theme: &Theme, server: &str, area: Rect) {
    let width = (server.len() as u16 + 28).clamp(34, area.width.saturating_sub(4));
    let overlay = centered_rect(area, width, 5);

    frame.render_widget(Clear, overlay);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" Remove server '"),
            Span::styled(server.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("'? "),
            Span::styled("y", Style::default().fg(theme.offline).add_modifier(Modifier::BOLD)),
            Span::raw("/"),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.offline));
    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}

/// A rect of the given size centered within `area`.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
