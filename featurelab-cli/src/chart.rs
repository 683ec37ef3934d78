//! Two stacked line charts: price on top, volatility below.
//!
//! Rendered once into an inline terminal viewport; there is no event loop.

use featurelab_core::FeatureTable;
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
    Terminal, TerminalOptions, Viewport,
};
use std::io;

/// Price and volatility charts for one feature table.
pub struct FeatureCharts<'a> {
    table: &'a FeatureTable,
    ticker: &'a str,
}

impl<'a> FeatureCharts<'a> {
    pub fn new(table: &'a FeatureTable, ticker: &'a str) -> Self {
        Self { table, ticker }
    }
}

impl Widget for FeatureCharts<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.table.is_empty() {
            Paragraph::new("No rows to plot")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL))
                .render(area, buf);
            return;
        }

        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

        let dates = self.table.dates();
        let first = dates.first().map(|d| d.to_string()).unwrap_or_default();
        let last = dates.last().map(|d| d.to_string()).unwrap_or_default();

        line_chart(
            &self.table.price(),
            &format!(" Price {} ", self.ticker),
            &format!("Price {}", self.ticker),
            Color::Cyan,
            (&first, &last),
        )
        .render(top, buf);

        line_chart(
            &self.table.volatility(),
            " Volatility (log returns rolling std) ",
            "Volatility (risk)",
            Color::Yellow,
            (&first, &last),
        )
        .render(bottom, buf);
    }
}

/// Owns its points so the chart can borrow them for the render call.
struct LineChart {
    points: Vec<(f64, f64)>,
    title: String,
    legend: String,
    color: Color,
    x_labels: (String, String),
    y_bounds: [f64; 2],
}

impl Widget for LineChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [lo, hi] = self.y_bounds;
        let x_max = (self.points.len().saturating_sub(1)).max(1) as f64;

        let dataset = Dataset::default()
            .name(self.legend)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.color))
            .data(&self.points);

        Chart::new(vec![dataset])
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .x_axis(
                Axis::default()
                    .bounds([0.0, x_max])
                    .labels(vec![Span::raw(self.x_labels.0), Span::raw(self.x_labels.1)]),
            )
            .y_axis(
                Axis::default()
                    .bounds([lo, hi])
                    .labels(vec![Span::raw(format_tick(lo)), Span::raw(format_tick(hi))]),
            )
            .render(area, buf);
    }
}

fn line_chart(values: &[f64], title: &str, legend: &str, color: Color, x_labels: (&str, &str)) -> LineChart {
    LineChart {
        points: values.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect(),
        title: title.to_string(),
        legend: legend.to_string(),
        color,
        x_labels: (x_labels.0.to_string(), x_labels.1.to_string()),
        y_bounds: padded_bounds(values),
    }
}

/// Min/max with 5% padding; a flat series gets a unit band around its value.
fn padded_bounds(values: &[f64]) -> [f64; 2] {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = max - min;
    let pad = if range > 0.0 { range * 0.05 } else { min.abs().max(1.0) * 0.05 };
    [min - pad, max + pad]
}

fn format_tick(v: f64) -> String {
    if v.abs() >= 100.0 {
        format!("{v:.0}")
    } else if v.abs() >= 1.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.4}")
    }
}

/// Draw the charts into an inline viewport below the current cursor.
pub fn draw_inline(table: &FeatureTable, ticker: &str) -> io::Result<()> {
    let rows = crossterm::terminal::size().map(|(_, rows)| rows).unwrap_or(24);
    let height = rows.saturating_sub(2).clamp(12, 30);

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(height),
        },
    )?;
    terminal.draw(|frame| frame.render_widget(FeatureCharts::new(table, ticker), frame.area()))?;
    println!();
    Ok(())
}
