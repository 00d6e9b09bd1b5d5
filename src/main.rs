//! Drinkmenu - Entry Point
//!
//! Initializes logging and the terminal, wires the menu service into the
//! UI, and runs the main loop.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use drinkmenu::fetch::{Dispatcher, HttpMenuService};
use drinkmenu::render::{detect_render_mode, KittyGraphics};
use drinkmenu::ui::App;
use drinkmenu::Config;

/// Target frames per second for the UI loop
const TARGET_FPS: u64 = 30;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

fn main() -> Result<()> {
    init_logging();
    log::info!("Starting Drinkmenu v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let render_mode = config.render_mode.unwrap_or_else(detect_render_mode);
    log::info!("Using render mode: {:?}", render_mode);

    let service = HttpMenuService::new(&config).context("Failed to create HTTP client")?;
    let mut app = App::new(Dispatcher::new(Arc::new(service)), render_mode);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut kitty = KittyGraphics::new();

    app.load();
    let result = run_loop(&mut terminal, &mut app, &mut kitty);

    // Restore terminal
    if let Err(e) = kitty.clear_all(terminal.backend_mut()) {
        log::warn!("Failed to clear images: {}", e);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Drinkmenu shut down cleanly");
    result
}

/// Log to a file so output does not interfere with the TUI
fn init_logging() {
    let target: Box<dyn io::Write + Send> = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("drinkmenu.log")
    {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(io::sink()),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    kitty: &mut KittyGraphics,
) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        // Handle input
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }

        // Apply finished fetches on this thread
        app.update();

        terminal.draw(|frame| app.render(frame))?;
        kitty.sync(terminal.backend_mut(), app.image_placements(), |url| app.image(url))?;

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }

    Ok(())
}
