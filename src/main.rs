use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use playerwatch::app::App;
use playerwatch::events;
use playerwatch::source::client::ActivityClient;
use playerwatch::source::worker::{FetchCommand, FetchLimits, FetchWorker};
use playerwatch::ui::{self, Theme};

#[derive(Parser, Debug)]
#[command(name = "playerwatch")]
#[command(about = "Terminal UI for monitoring game server activity and online player counts")]
struct Args {
    /// Base URL of the activity backend
    #[arg(short, long, default_value = "http://localhost:8080")]
    backend: String,

    /// Refresh interval in seconds
    #[arg(short, long, default_value = "30")]
    refresh: u32,

    /// Maximum chart data points per server
    #[arg(long, default_value = "30")]
    max_points: u32,

    /// Row limit for the recent-samples table
    #[arg(long, default_value = "200")]
    limit: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Color theme
    #[arg(long, value_enum, default_value_t = ThemeArg::Auto)]
    theme: ThemeArg,

    /// Append logs to this file (RUST_LOG controls verbosity)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Auto,
    Dark,
    Light,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let theme = match args.theme {
        ThemeArg::Auto => Theme::auto_detect(),
        ThemeArg::Dark => Theme::dark(),
        ThemeArg::Light => Theme::light(),
    };

    // The TUI loop is synchronous; the runtime only runs fetch tasks.
    let runtime = tokio::runtime::Runtime::new()?;
    let client = ActivityClient::new(&args.backend, Duration::from_secs(args.timeout))?;
    let limits = FetchLimits { max_data_points: args.max_points, detail_rows: args.limit };
    let mut worker = FetchWorker::spawn(runtime.handle(), client, limits);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(args.backend.clone(), args.refresh, theme);

    // First refresh right away; the countdown covers the ones after.
    for request in app.refresh_now() {
        worker.submit(FetchCommand::Refresh(request));
    }

    let result = run_app(&mut terminal, &mut app, &mut worker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &mut FetchWorker,
) -> Result<()> {
    let mut last_step = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Apply completed fetches in arrival order; the sequence guard
        // drops the ones that lost a race to a newer request.
        while let Some(outcome) = worker.poll() {
            for request in app.apply(outcome) {
                worker.submit(FetchCommand::Refresh(request));
            }
        }

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => {
                    for command in events::handle_key_event(app, key) {
                        worker.submit(command);
                    }
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Step the countdown on each one-second boundary
        if last_step.elapsed() >= Duration::from_secs(1) {
            last_step = Instant::now();
            for request in app.on_second() {
                worker.submit(FetchCommand::Refresh(request));
            }
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    // Without a log file, events go nowhere: writing to stderr would
    // corrupt the alternate screen.
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
