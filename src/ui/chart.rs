//! Line chart of the three axes over the buffer.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::SampleBuffer;

/// Chart points for each axis, indexed by position in the buffer.
pub struct AxisSeries {
    pub x: Vec<(f64, f64)>,
    pub y: Vec<(f64, f64)>,
    pub z: Vec<(f64, f64)>,
}

impl AxisSeries {
    pub fn from_buffer(buffer: &SampleBuffer) -> Self {
        let samples = buffer.as_slice();
        let points = |f: fn(&crate::data::Sample) -> f64| -> Vec<(f64, f64)> {
            samples
                .iter()
                .enumerate()
                .map(|(i, s)| (i as f64, f(s)))
                .collect()
        };
        Self {
            x: points(|s| s.x),
            y: points(|s| s.y),
            z: points(|s| s.z),
        }
    }
}

/// Render the chart, or the loading placeholder while the buffer is empty.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Accelerometer ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let buffer = app.feed.buffer();
    if buffer.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let y = inner.y + inner.height / 2;
        let placeholder = Paragraph::new("Loading chart...")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(placeholder, Rect::new(inner.x, y, inner.width, 1));
        return;
    }

    let series = AxisSeries::from_buffer(buffer);
    let datasets = vec![
        Dataset::default()
            .name("X")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.axis_x))
            .data(&series.x),
        Dataset::default()
            .name("Y")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.axis_y))
            .data(&series.y),
        Dataset::default()
            .name("Z")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.axis_z))
            .data(&series.z),
    ];

    let samples = buffer.as_slice();
    let first = samples.first().map(|s| s.time_of_day()).unwrap_or_default();
    let last = samples.last().map(|s| s.time_of_day()).unwrap_or_default();
    let x_max = (samples.len().saturating_sub(1) as f64).max(1.0);
    let [y_min, y_max] = app.y_bounds;
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(dim)
                .bounds([0.0, x_max])
                .labels(vec![Line::from(first), Line::from(last)]),
        )
        .y_axis(
            Axis::default()
                .style(dim)
                .bounds([y_min, y_max])
                .labels(vec![
                    Line::from(format!("{y_min:.0}")),
                    Line::from("0"),
                    Line::from(format!("{y_max:.0}")),
                ]),
        );

    frame.render_widget(chart, area);
}
