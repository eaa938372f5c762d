//! Application state.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::data::{LiveFeed, Sample};
use crate::source::DataSource;
use crate::ui::Theme;

/// Upper bound on events applied per UI tick, so a fast stream cannot
/// starve redraws.
const MAX_EVENTS_PER_TICK: usize = 1024;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub feed: LiveFeed,

    // Display settings
    pub table_rows: usize,
    pub y_bounds: [f64; 2],

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and settings.
    pub fn new(source: Box<dyn DataSource>, settings: &Settings) -> Self {
        Self::with_theme(source, settings, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(source: Box<dyn DataSource>, settings: &Settings, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            source,
            feed: LiveFeed::new(settings.buffer.max_points),
            table_rows: settings.buffer.table_rows,
            y_bounds: [settings.chart.y_min, settings.chart.y_max],
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The error to show in the status bar, if any.
    ///
    /// A failed bulk load takes precedence over source errors.
    pub fn load_error(&self) -> Option<String> {
        self.feed
            .fetch_error()
            .map(str::to_string)
            .or_else(|| self.source.error())
    }

    /// Drain pending events from the source into the feed.
    ///
    /// Returns the number of events that changed the buffer.
    pub fn poll_source(&mut self) -> usize {
        let mut changed = 0;
        for _ in 0..MAX_EVENTS_PER_TICK {
            let Some(event) = self.source.poll() else {
                break;
            };
            if self.feed.apply(event) {
                changed += 1;
            }
        }
        changed
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current buffer to a file. Returns the number of samples written.
    pub fn export_state(&self, path: &Path) -> Result<usize> {
        let buffer = self.feed.buffer();
        if buffer.is_empty() {
            anyhow::bail!("No samples to export");
        }
        write_samples(path, buffer.as_slice())?;
        Ok(buffer.len())
    }
}

/// Write samples to `path` as a pretty JSON array, in the given order.
pub fn write_samples(path: &Path, samples: &[Sample]) -> Result<()> {
    let json = serde_json::to_string_pretty(samples)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
