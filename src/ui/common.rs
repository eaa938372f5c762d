//! Common UI components: header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the header bar.
///
/// Displays: connection state, buffer fill, arrival rate, dropped messages.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let feed = &app.feed;
    let connection = feed.connection();
    let buffer = feed.buffer();

    let rate = match feed.rate().per_second() {
        Some(rate) => format!("{:.1}/s", rate),
        None => "-/s".to_string(),
    };

    let dropped = feed.dropped_messages();
    let dropped_span = if dropped > 0 {
        Span::styled(
            format!("{}", dropped),
            Style::default().fg(app.theme.waiting),
        )
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.connection_style(connection)),
        Span::styled("SENSORWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(connection.to_string(), app.theme.connection_style(connection)),
        Span::raw(" │ "),
        Span::styled(
            format!("{}/{}", buffer.len(), buffer.cap()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" samples │ "),
        Span::raw(rate),
        Span::raw(" │ "),
        dropped_span,
        Span::raw(" dropped"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(err) = app.load_error() {
        format!(" Error: {} | ?:help q:quit", err)
    } else if let Some(updated) = app.feed.last_updated() {
        format!(
            " {} | Updated {:.1}s ago | e:export ?:help q:quit",
            app.source_description(),
            updated.elapsed().as_secs_f64(),
        )
    } else {
        format!(" {} | Loading... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  e         Export buffer to JSON"),
        Line::from("  ?         Toggle this help"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Chart",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::styled("  ━ X", Style::default().fg(app.theme.axis_x)),
            Span::styled("  ━ Y", Style::default().fg(app.theme.axis_y)),
            Span::styled("  ━ Z", Style::default().fg(app.theme.axis_z)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 12u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
