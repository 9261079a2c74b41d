//! Terminal rendering.
//!
//! ## Submodules
//!
//! - [`common`]: header, tabs, status bar, help and confirm overlays
//! - [`chart`]: activity chart construction and rendering
//! - [`servers`]: server summary table
//! - [`activity`]: activity view (chart, point inspection, sample table)
//! - [`theme`]: light/dark theme with terminal auto-detection

pub mod activity;
pub mod chart;
pub mod common;
pub mod servers;
pub mod theme;

pub use chart::ChartView;
pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode, View};

/// Minimum terminal size for usable display.
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 12;

/// Render one frame of the whole UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Check for minimum terminal size
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let message = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered =
            Rect::new(0, area.height.saturating_sub(4) / 2, area.width, 5.min(area.height));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.view {
        View::Servers => servers::render(frame, app, chunks[2]),
        View::Activity => activity::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if let InputMode::ConfirmRemove(server) = &app.input {
        common::render_confirm(frame, &app.theme, server, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
