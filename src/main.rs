use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sensorwatch::app::{write_samples, App};
use sensorwatch::source::fetch;
use sensorwatch::{
    events, ui, ConnectionState, DataSource, LiveFeed, LiveSource, SampleBuffer, Settings,
    StreamSource,
};

/// How long to wait for the stream to close on exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll interval for the dashboard and headless loops.
const TICK: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "sensorwatch")]
#[command(about = "Live accelerometer dashboard for the terminal")]
struct Args {
    /// Settings file (TOML). Missing is fine.
    #[arg(short = 'C', long, default_value = "sensorwatch.toml")]
    config: PathBuf,

    /// Bulk endpoint returning recent samples newest-first
    #[arg(long)]
    bulk_url: Option<String>,

    /// WebSocket endpoint pushing one sample per message
    #[arg(long)]
    stream_url: Option<String>,

    /// Maximum number of samples kept in the buffer
    #[arg(short = 'n', long)]
    max_points: Option<usize>,

    /// Connect to a TCP endpoint for newline-delimited samples (host:port)
    #[arg(short, long, conflicts_with_all = ["bulk_url", "stream_url", "export"])]
    connect: Option<String>,

    /// Log buffer changes instead of drawing the dashboard
    #[arg(long, conflicts_with = "export")]
    headless: bool,

    /// Fetch the bulk endpoint, write the buffer to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log file used while the dashboard is on screen
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;

    let interactive = !args.headless && args.export.is_none();
    init_logging(&settings, interactive)?;

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_to_file(&settings, export_path));
    }

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        let source = rt.block_on(connect_tcp(addr))?;
        return if args.headless {
            rt.block_on(run_headless(source, &settings))
        } else {
            run_tui(source, &settings)
        };
    }

    // Default: bulk fetch plus WebSocket stream
    let _guard = rt.enter();
    let (source, handle) = LiveSource::spawn(&settings)?;
    let result = if args.headless {
        rt.block_on(run_headless(Box::new(source), &settings))
    } else {
        run_tui(Box::new(source), &settings)
    };

    if rt
        .block_on(tokio::time::timeout(SHUTDOWN_TIMEOUT, handle.shutdown()))
        .is_err()
    {
        warn!("stream did not close in time");
    }

    result
}

/// Layer command-line flags over file and environment settings.
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(Some(args.config.as_path()))?;

    if let Some(ref url) = args.bulk_url {
        settings.endpoints.bulk_url = url.clone();
    }
    if let Some(ref url) = args.stream_url {
        settings.endpoints.stream_url = url.clone();
    }
    if let Some(max_points) = args.max_points {
        settings.buffer.max_points = max_points;
    }
    if let Some(ref path) = args.log_file {
        settings.log.file = path.display().to_string();
    }

    settings.validate()?;
    Ok(settings)
}

/// Install the tracing subscriber.
///
/// The dashboard owns the terminal, so interactive runs log to a file.
fn init_logging(settings: &Settings, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log.filter))
        .context("invalid log filter")?;

    if to_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log.file)
            .with_context(|| format!("opening log file {}", settings.log.file))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Connect to a TCP endpoint streaming newline-delimited samples
async fn connect_tcp(addr: &str) -> Result<Box<dyn DataSource>> {
    use tokio::net::TcpStream;

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("Failed to connect to {}", addr))?;
    println!("Connected!");
    Ok(Box::new(StreamSource::spawn(stream, addr)))
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, settings: &Settings) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source, settings);
    info!(source = app.source_description(), "dashboard started");

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.poll_source();

        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events::poll_event(TICK)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Apply events without a terminal, logging each buffer change.
///
/// Runs until Ctrl-C or until the stream has stopped for good.
async fn run_headless(mut source: Box<dyn DataSource>, settings: &Settings) -> Result<()> {
    let mut feed = LiveFeed::new(settings.buffer.max_points);
    let mut tick = tokio::time::interval(TICK);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(source = source.description(), "running headless");

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            _ = tick.tick() => {
                while let Some(event) = source.poll() {
                    if !feed.apply(event) {
                        continue;
                    }
                    let buffer = feed.buffer();
                    match buffer.newest() {
                        Some(newest) => info!(
                            len = buffer.len(),
                            id = %newest.id,
                            time = %newest.time_of_day(),
                            x = newest.x,
                            y = newest.y,
                            z = newest.z,
                            "buffer updated"
                        ),
                        None => info!(len = 0, "buffer updated"),
                    }
                }
                if *feed.connection() == ConnectionState::Disconnected {
                    if let Some(err) = source.error() {
                        warn!(error = %err, "source stopped");
                    }
                    break;
                }
            }
        }
    }

    info!(
        len = feed.buffer().len(),
        dropped = feed.dropped_messages(),
        "headless run finished"
    );
    Ok(())
}

/// Fetch the bulk endpoint once and write the resulting buffer to a JSON file
async fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let client = fetch::build_client(settings.fetch.timeout)?;
    let samples = fetch::fetch_bulk(&client, &settings.endpoints.bulk_url).await?;
    let buffer = SampleBuffer::new(settings.buffer.max_points).initialize(samples);

    write_samples(export_path, buffer.as_slice())?;

    println!(
        "Exported {} samples to: {}",
        buffer.len(),
        export_path.display()
    );
    Ok(())
}
