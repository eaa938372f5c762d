//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::source::ConnectionState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// X axis series.
    pub axis_x: Color,
    /// Y axis series.
    pub axis_y: Color,
    /// Z axis series.
    pub axis_z: Color,
    /// Color for a live stream.
    pub live: Color,
    /// Color for connecting or reconnecting.
    pub waiting: Color,
    /// Color for a stream that has stopped.
    pub down: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for the newest row of the readings table.
    pub newest: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            axis_x: Color::Rgb(255, 99, 132),
            axis_y: Color::Rgb(53, 162, 235),
            axis_z: Color::Rgb(75, 192, 192),
            live: Color::Green,
            waiting: Color::Yellow,
            down: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            newest: Style::default().add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            axis_x: Color::Rgb(220, 60, 95),
            axis_y: Color::Rgb(30, 120, 190),
            axis_z: Color::Rgb(40, 150, 150),
            live: Color::Green,
            waiting: Color::Yellow,
            down: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            newest: Style::default().add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a stream connection state
    pub fn connection_style(&self, state: &ConnectionState) -> Style {
        match state {
            ConnectionState::Connected => Style::default().fg(self.live),
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => {
                Style::default().fg(self.waiting)
            }
            ConnectionState::Disconnected => {
                Style::default().fg(self.down).add_modifier(Modifier::BOLD)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_dark_axis_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.axis_x, Color::Rgb(255, 99, 132));
        assert_eq!(theme.axis_y, Color::Rgb(53, 162, 235));
        assert_eq!(theme.axis_z, Color::Rgb(75, 192, 192));
    }

    #[test]
    fn test_connection_style() {
        let theme = Theme::dark();
        assert_eq!(
            theme.connection_style(&ConnectionState::Connected).fg,
            Some(Color::Green)
        );
        let reconnecting = ConnectionState::Reconnecting {
            attempt: 2,
            delay: Duration::from_millis(500),
        };
        assert_eq!(theme.connection_style(&reconnecting).fg, Some(Color::Yellow));
        assert!(theme
            .connection_style(&ConnectionState::Disconnected)
            .add_modifier
            .contains(Modifier::BOLD));
    }
}
