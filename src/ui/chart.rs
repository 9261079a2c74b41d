//! Activity chart construction and rendering.
//!
//! [`ChartView`] is the chart description built from an [`AlignedSeries`]:
//! one dataset per server, a slot-index x axis, and bounds with headroom.
//! The owner replaces the whole view on every applied refresh or
//! selection change; datasets are never mutated in place. Rebuilding is
//! cheap at a tens-of-seconds cadence and sidesteps stale-scale and
//! stale-legend bugs entirely.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::data::align::AlignedSeries;
use crate::ui::theme::Theme;

/// Fixed series palette; cycles when servers outnumber colors.
pub const PALETTE: [Color; 12] = [
    Color::Rgb(0x3b, 0x82, 0xf6),
    Color::Rgb(0xef, 0x44, 0x44),
    Color::Rgb(0x10, 0xb9, 0x81),
    Color::Rgb(0xf5, 0x9e, 0x0b),
    Color::Rgb(0x8b, 0x5c, 0xf6),
    Color::Rgb(0x06, 0xb6, 0xd4),
    Color::Rgb(0xec, 0x48, 0x99),
    Color::Rgb(0x84, 0xcc, 0x16),
    Color::Rgb(0xf9, 0x73, 0x16),
    Color::Rgb(0x22, 0xc5, 0x5e),
    Color::Rgb(0xea, 0xb3, 0x08),
    Color::Rgb(0xa8, 0x55, 0xf7),
];

/// Color for the series at a given position in first-seen order.
///
/// Wraps around the palette, so two servers can share a color once the
/// server count exceeds the palette size; that is accepted.
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Minimum top of the y axis, so small counts don't fill the chart.
const SUGGESTED_Y_MAX: f64 = 20.0;

/// One server's plotted line.
#[derive(Debug, Clone)]
pub struct ChartDataset {
    pub server: String,
    pub color: Color,
    /// (axis slot, player count); gap slots are simply absent, so the
    /// line widget draws straight through them and gaps render bridged.
    pub points: Vec<(f64, f64)>,
}

/// A fully built chart, replaced wholesale on each refresh.
#[derive(Debug, Clone, Default)]
pub struct ChartView {
    title: String,
    datasets: Vec<ChartDataset>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_labels: Vec<String>,
}

impl ChartView {
    /// Build the chart description for an aligned series.
    pub fn build(series: &AlignedSeries, title: &str) -> Self {
        let datasets: Vec<ChartDataset> = series
            .series()
            .iter()
            .enumerate()
            .map(|(idx, entity)| ChartDataset {
                server: entity.server().to_string(),
                color: palette_color(idx),
                points: entity
                    .points()
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, value)| {
                        value.map(|count| (slot as f64, f64::from(count)))
                    })
                    .collect(),
            })
            .collect();

        let last_slot = series.axis().len().saturating_sub(1) as f64;
        let x_bounds = [0.0, last_slot.max(1.0)];
        let y_max = series
            .max_value()
            .map(|max| (f64::from(max) * 1.2).ceil())
            .unwrap_or(SUGGESTED_Y_MAX)
            .max(SUGGESTED_Y_MAX);
        let y_bounds = [0.0, y_max];

        let axis = series.axis();
        let x_labels = match axis.len() {
            0 => Vec::new(),
            1 => vec![format_slot(axis[0])],
            len => vec![
                format_slot(axis[0]),
                format_slot(axis[len / 2]),
                format_slot(axis[len - 1]),
            ],
        };

        Self {
            title: title.to_string(),
            datasets,
            x_bounds,
            y_bounds,
            x_labels,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn datasets(&self) -> &[ChartDataset] {
        &self.datasets
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        self.x_bounds
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        self.y_bounds
    }

    /// Render the chart, with an optional vertical guide at the
    /// inspection cursor's axis slot.
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, cursor: Option<usize>) {
        if self.datasets.iter().all(|d| d.points.is_empty()) {
            let message = Paragraph::new("Waiting for activity data...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.dim))
                .block(self.block(theme));
            frame.render_widget(message, area);
            return;
        }

        // The guide must outlive the Dataset that borrows it.
        let guide = cursor.map(|slot| self.cursor_guide(slot));

        let mut datasets: Vec<Dataset> = self
            .datasets
            .iter()
            .filter(|d| !d.points.is_empty())
            .map(|d| {
                Dataset::default()
                    .name(d.server.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(d.color))
                    .data(&d.points)
            })
            .collect();
        if let Some(guide) = &guide {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(theme.dim))
                    .data(guide),
            );
        }

        let chart = Chart::new(datasets)
            .block(self.block(theme))
            .x_axis(
                Axis::default()
                    .title("Time")
                    .style(Style::default().fg(theme.dim))
                    .bounds(self.x_bounds)
                    .labels(self.x_labels.iter().map(|l| Span::raw(l.clone())).collect::<Vec<_>>()),
            )
            .y_axis(
                Axis::default()
                    .title("Players")
                    .style(Style::default().fg(theme.dim))
                    .bounds(self.y_bounds)
                    .labels(vec![
                        Span::raw("0"),
                        Span::raw(format!("{:.0}", self.y_bounds[1] / 2.0)),
                        Span::raw(format!("{:.0}", self.y_bounds[1])),
                    ]),
            );

        frame.render_widget(chart, area);
    }

    fn block<'a>(&'a self, theme: &Theme) -> Block<'a> {
        Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
    }

    /// Vertical line of points at the cursor's x slot.
    fn cursor_guide(&self, slot: usize) -> Vec<(f64, f64)> {
        let x = (slot as f64).clamp(self.x_bounds[0], self.x_bounds[1]);
        let steps = 24;
        (0..=steps)
            .map(|i| (x, self.y_bounds[1] * f64::from(i) / f64::from(steps)))
            .collect()
    }
}

fn format_slot(timestamp: chrono::NaiveDateTime) -> String {
    timestamp.format("%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::align::align;
    use crate::data::record::{ActivityRecord, ActivitySnapshot};

    fn record(server: &str, time: &str, online: bool, player_count: u32) -> ActivityRecord {
        ActivityRecord {
            server: server.to_string(),
            record_creation_time: time.parse().unwrap(),
            data_retrieval_time: None,
            online,
            player_count,
        }
    }

    fn aligned(entries: Vec<(&str, Vec<ActivityRecord>)>) -> crate::data::align::AlignedSeries {
        let snapshot: ActivitySnapshot =
            entries.into_iter().map(|(s, r)| (s.to_string(), r)).collect();
        align(&snapshot)
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), palette_color(12));
        assert_eq!(palette_color(3), palette_color(15));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn test_build_assigns_colors_in_series_order() {
        let view = ChartView::build(
            &aligned(vec![
                ("zeta", vec![record("zeta", "2025-01-10T12:00:00", true, 1)]),
                ("alpha", vec![record("alpha", "2025-01-10T12:00:00", true, 2)]),
            ]),
            "Online players: All servers",
        );

        assert_eq!(view.datasets()[0].server, "zeta");
        assert_eq!(view.datasets()[0].color, palette_color(0));
        assert_eq!(view.datasets()[1].server, "alpha");
        assert_eq!(view.datasets()[1].color, palette_color(1));
    }

    #[test]
    fn test_build_omits_gap_slots() {
        let view = ChartView::build(
            &aligned(vec![
                (
                    "A",
                    vec![
                        record("A", "2025-01-10T12:00:00", true, 5),
                        record("A", "2025-01-10T12:01:00", false, 9),
                        record("A", "2025-01-10T12:02:00", true, 6),
                    ],
                ),
            ]),
            "t",
        );

        // The offline slot is absent, so the line bridges from slot 0 to
        // slot 2.
        assert_eq!(view.datasets()[0].points, vec![(0.0, 5.0), (2.0, 6.0)]);
    }

    #[test]
    fn test_build_empty_series() {
        let view = ChartView::build(&aligned(vec![]), "t");
        assert!(view.datasets().is_empty());
        assert_eq!(view.x_bounds(), [0.0, 1.0]);
        assert_eq!(view.y_bounds(), [0.0, SUGGESTED_Y_MAX]);
    }

    #[test]
    fn test_build_y_headroom() {
        let small = ChartView::build(
            &aligned(vec![("A", vec![record("A", "2025-01-10T12:00:00", true, 3)])]),
            "t",
        );
        // Small counts still get the suggested minimum top
        assert_eq!(small.y_bounds(), [0.0, SUGGESTED_Y_MAX]);

        let large = ChartView::build(
            &aligned(vec![("A", vec![record("A", "2025-01-10T12:00:00", true, 100)])]),
            "t",
        );
        assert_eq!(large.y_bounds(), [0.0, 120.0]);
    }

    #[test]
    fn test_build_x_bounds_span_axis() {
        let view = ChartView::build(
            &aligned(vec![(
                "A",
                vec![
                    record("A", "2025-01-10T12:00:00", true, 1),
                    record("A", "2025-01-10T12:01:00", true, 2),
                    record("A", "2025-01-10T12:02:00", true, 3),
                ],
            )]),
            "t",
        );
        assert_eq!(view.x_bounds(), [0.0, 2.0]);
    }
}
