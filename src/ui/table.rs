//! Latest readings table, newest row first.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::Sample;

/// Cells for one table row: time, x, y, z.
pub fn row_cells(sample: &Sample) -> [String; 4] {
    [
        sample.time_of_day(),
        sample.x.to_string(),
        sample.y.to_string(),
        sample.z.to_string(),
    ]
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let latest = app.feed.buffer().latest_n(app.table_rows);

    let header = Row::new(["Time", "X", "Y", "Z"].map(Cell::from)).style(app.theme.header);
    let rows: Vec<Row> = latest
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let [time, x, y, z] = row_cells(sample);
            let row = Row::new(vec![
                Cell::from(time),
                Cell::from(x).style(Style::default().fg(app.theme.axis_x)),
                Cell::from(y).style(Style::default().fg(app.theme.axis_y)),
                Cell::from(z).style(Style::default().fg(app.theme.axis_z)),
            ]);
            if i == 0 {
                row.style(app.theme.newest)
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Latest Readings ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}
