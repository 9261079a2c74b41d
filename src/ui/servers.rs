//! Server summary table.
//!
//! One row per server discovered in the latest summary refresh, with its
//! most recent status. The server set is whatever the backend reported
//! last; rows appear and disappear as servers are registered and removed.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::record::{latest, ActivityRecord};

/// Render the servers view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Server"),
        Cell::from("Status"),
        Cell::from("Players"),
        Cell::from("Samples"),
        Cell::from("Last sample"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .snapshot
        .iter()
        .map(|(server, records)| {
            let newest = latest(records);
            let (status_cell, players_cell) = match newest {
                Some(record) if record.online => (
                    Cell::from("online").style(app.theme.status_style(true)),
                    Cell::from(record.player_count.to_string()),
                ),
                Some(_) => (
                    Cell::from("offline").style(app.theme.status_style(false)),
                    Cell::from("-"),
                ),
                None => (
                    Cell::from("no data").style(Style::default().fg(app.theme.dim)),
                    Cell::from("-"),
                ),
            };

            Row::new(vec![
                Cell::from(server.clone()),
                status_cell,
                players_cell,
                Cell::from(records.len().to_string()),
                Cell::from(newest.map(format_time).unwrap_or_else(|| "-".to_string())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Server - gets the largest share
        Constraint::Min(8),  // Status
        Constraint::Min(8),  // Players
        Constraint::Min(8),  // Samples
        Constraint::Min(20), // Last sample
    ];

    let selected = app.server_cursor.min(app.snapshot.len().saturating_sub(1));
    let position_info = if app.snapshot.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, app.snapshot.len())
    };
    let title = format!(" Servers ({}){} ", app.snapshot.len(), position_info);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !app.snapshot.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_time(record: &ActivityRecord) -> String {
    record.record_creation_time.format("%Y-%m-%d %H:%M:%S").to_string()
}
