//! Activity view: chart, point inspection, and recent samples.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::record::ActivityRecord;
use crate::ui::chart::palette_color;

/// Render the activity view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Fill(2),   // Chart
        Constraint::Length(4), // Point inspection
        Constraint::Fill(1),   // Recent samples table
    ])
    .split(area);

    app.chart.render(frame, chunks[0], &app.theme, app.inspect_slot);
    render_inspection(frame, app, chunks[1]);
    render_samples(frame, app, chunks[2]);
}

/// The inspection panel resolves the original record behind each plotted
/// point at the cursor's axis slot: retrieval time, online state, and
/// the raw count. Offline records resolve too, even though the chart
/// renders them as gaps.
fn render_inspection(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Inspect ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let lines = match app.inspect_slot {
        None => vec![Line::from(Span::styled(
            "left/right to walk the time axis",
            Style::default().fg(app.theme.dim),
        ))],
        Some(slot) => {
            let mut lines = Vec::new();
            if let Some(timestamp) = app.aligned.axis().get(slot) {
                lines.push(Line::from(Span::styled(
                    timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }

            let mut spans: Vec<Span> = Vec::new();
            for (idx, series) in app.aligned.series().iter().enumerate() {
                let Some(record) = app.aligned.record_at(idx, slot) else {
                    continue;
                };
                if !spans.is_empty() {
                    spans.push(Span::raw("  "));
                }
                spans.push(Span::styled(
                    series.server().to_string(),
                    Style::default().fg(palette_color(idx)),
                ));
                spans.push(Span::raw(format!(": {}", describe(record))));
            }
            if spans.is_empty() {
                spans.push(Span::styled(
                    "no samples at this instant",
                    Style::default().fg(app.theme.dim),
                ));
            }
            lines.push(Line::from(spans));
            lines
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn describe(record: &ActivityRecord) -> String {
    let retrieved = record
        .data_retrieval_time
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "n/a".to_string());
    if record.online {
        format!("{} players (online, retrieved {})", record.player_count, retrieved)
    } else {
        format!("offline (retrieved {})", retrieved)
    }
}

fn render_samples(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Time"),
        Cell::from("Server"),
        Cell::from("Status"),
        Cell::from("Players"),
        Cell::from("Retrieved"),
    ])
    .height(1)
    .style(app.theme.header);

    // The table area is short; rows beyond it would be clipped anyway.
    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = app
        .detail_rows
        .iter()
        .take(visible.max(1))
        .map(|record| {
            let status = if record.online {
                Cell::from("online").style(app.theme.status_style(true))
            } else {
                Cell::from("offline").style(app.theme.status_style(false))
            };
            Row::new(vec![
                Cell::from(record.record_creation_time.format("%m-%d %H:%M:%S").to_string()),
                Cell::from(record.server.clone()),
                status,
                Cell::from(if record.online {
                    record.player_count.to_string()
                } else {
                    "-".to_string()
                }),
                Cell::from(
                    record
                        .data_retrieval_time
                        .map(|t| t.format("%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(15), // Time
        Constraint::Fill(2), // Server
        Constraint::Min(8),  // Status
        Constraint::Min(8),  // Players
        Constraint::Min(15), // Retrieved
    ];

    let scope = match app.coordinator.selected() {
        Some(server) => server.to_string(),
        None => "all servers".to_string(),
    };
    let title = format!(" Recent samples: {} ({}) ", scope, app.detail_rows.len());

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}
