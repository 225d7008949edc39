use anyhow::{Context, Result};
use conflict_dash::app::App;
use conflict_dash::data::{self, CleanReport, Dataset};
use conflict_dash::map::MapRenderer;
use conflict_dash::ui;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use std::env;
use std::path::{Path, PathBuf};

/// Dataset read when no path is given on the command line.
const DEFAULT_DATASET: &str = "data/East-Asia-Pacific_2018-2022_May20.csv";

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET));

    // Load and clean before the terminal UI takes the screen so warnings
    // and fatal errors print normally.
    let (dataset, clean_report) = data::load_dataset(&path)
        .with_context(|| format!("cannot start dashboard from {}", path.display()))?;
    let base_map = MapRenderer::load(Path::new("data"));

    let mut terminal = ratatui::init();
    terminal.clear()?;
    let result = run(&mut terminal, dataset, clean_report, base_map);
    ratatui::restore();

    result
}

fn run(
    terminal: &mut DefaultTerminal,
    dataset: Dataset,
    clean_report: CleanReport,
    base_map: MapRenderer,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(
        dataset,
        clean_report,
        base_map,
        size.width as usize,
        size.height as usize,
    );

    // Main loop. Nothing animates, so block on the next event and redraw
    // only after handling it.
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                        // Raw-data table
                        KeyCode::Char('t') => app.toggle_table(),
                        KeyCode::PageDown => app.scroll_table(10),
                        KeyCode::PageUp => app.scroll_table(-10),

                        // Map selectors
                        KeyCode::Right | KeyCode::Char('c') => app.step_country(1),
                        KeyCode::Left | KeyCode::Char('C') => app.step_country(-1),
                        KeyCode::Down | KeyCode::Char('y') => app.step_year(1),
                        KeyCode::Up | KeyCode::Char('Y') => app.step_year(-1),

                        // Pan with hjkl
                        KeyCode::Char('h') => app.pan(-10, 0),
                        KeyCode::Char('l') => app.pan(10, 0),
                        KeyCode::Char('k') => app.pan(0, -6),
                        KeyCode::Char('j') => app.pan(0, 6),

                        // Zoom
                        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
                        KeyCode::Char('0') => app.refit(),

                        _ => {}
                    }
                }
            }
            Event::Resize(width, height) => {
                app.resize(width as usize, height as usize);
            }
            _ => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
