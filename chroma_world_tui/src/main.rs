use chroma_world_core::{
    Color as Paint, EntityId, GameEntity, Interaction, MapItemKind,
    level::load_world_from_str,
    palette::Palette,
    world::{MoveOutcome, StopReason, World},
};
use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Level file to load
    #[arg(short, long, value_name = "MAP_FILE", default_value = "maps/level01.txt")]
    map: PathBuf,

    /// Palette file (TOML); the built-in classic palette is used when omitted
    #[arg(short, long, value_name = "PALETTE_FILE")]
    palette: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    /// The world being played.
    world: World,
    /// The player steered by the keyboard.
    player: EntityId,
    palette: Palette,
    map_file: PathBuf,
    /// Description of the last move, shown in the status panel.
    last_event: String,
    should_quit: bool,
}

impl App {
    fn new(map_file: PathBuf, palette: Palette) -> Result<Self> {
        let (world, player) = load_level(&map_file, &palette)?;
        Ok(App {
            world,
            player,
            palette,
            map_file,
            last_event: "Use the arrow keys or WASD to move.".to_string(),
            should_quit: false,
        })
    }

    /// Reloads the level from disk, restoring the start state.
    fn restart(&mut self) -> Result<()> {
        let (world, player) = load_level(&self.map_file, &self.palette)?;
        self.world = world;
        self.player = player;
        self.last_event = "Level restarted.".to_string();
        Ok(())
    }

    fn step(&mut self, dx: i32, dy: i32) {
        self.last_event = match self.world.try_move(self.player, dx, dy) {
            Ok(outcome) => describe_move(&outcome),
            Err(err) => err.to_string(),
        };
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) {
        self.world.tick();
    }

    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn load_level(map_file: &Path, palette: &Palette) -> Result<(World, EntityId)> {
    let text = std::fs::read_to_string(map_file)
        .with_context(|| format!("Failed to read map file {}", map_file.display()))?;
    let level = load_world_from_str(&text, palette)
        .with_context(|| format!("Failed to load level {}", map_file.display()))?;
    Ok(level)
}

fn describe_move(outcome: &MoveOutcome) -> String {
    let mut text = if outcome.moved() {
        format!("Moved {} cell(s) to {}.", outcome.steps, outcome.to)
    } else {
        "Did not move.".to_string()
    };
    for interaction in &outcome.interactions {
        if let Interaction::Recolored { from, to } = interaction {
            let from = from.as_ref().map_or("nothing", Paint::name);
            text.push_str(&format!(" Painted {} -> {}.", from, to));
        }
    }
    match outcome.stopped {
        Some(StopReason::Blocked { position, kind }) => {
            text.push_str(&format!(" Blocked by {:?} at {}.", kind, position))
        }
        Some(StopReason::OutOfBounds) => text.push_str(" Edge of the map."),
        Some(StopReason::OccupiedByPlayer(id)) => {
            text.push_str(&format!(" Player {} is in the way.", id))
        }
        Some(StopReason::Inactive) => text.push_str(" Player is inactive."),
        None => {}
    }
    text
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        init_logging(log_file)?;
    }

    let palette = match &args.palette {
        Some(path) => Palette::load(path)
            .with_context(|| format!("Failed to load palette {}", path.display()))?,
        None => Palette::classic(),
    };
    info!(colors = palette.colors().len(), rules = palette.mix_table().len(), "palette ready");

    // Load before touching the terminal so errors print normally
    let mut app = App::new(args.map, palette)?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    result
}

/// Sends tracing output to `path`; the terminal itself is owned by the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chroma_world_core=info,chroma_world_tui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                        KeyCode::Char('r') => app.restart()?,
                        KeyCode::Up | KeyCode::Char('w') => app.step(0, -1),
                        KeyCode::Down | KeyCode::Char('s') => app.step(0, 1),
                        KeyCode::Left | KeyCode::Char('a') => app.step(-1, 0),
                        KeyCode::Right | KeyCode::Char('d') => app.step(1, 0),
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Maps a game color onto a terminal foreground style.
fn paint_style(paint: Option<&Paint>) -> Style {
    match paint {
        Some(paint) => {
            let (r, g, b) = paint.rgb();
            Style::default().fg(Color::Rgb(r, g, b))
        }
        None => Style::default().fg(Color::White),
    }
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60), // Area for the map
            Constraint::Percentage(30), // Area for player status and mix rules
            Constraint::Percentage(10), // Area for help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], &app.world);

    let info_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_layout[1]);
    render_status(frame, info_layout[0], app);
    render_mix_rules(frame, info_layout[1], &app.world);

    let help_text = Paragraph::new("Arrows/WASD move, 'r' restarts, 'q' or 'Esc' quits.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the keyboard player's state and the last move.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    if let Some(player) = app.world.player(app.player) {
        let color_name = player.color().map_or("none", Paint::name);
        lines.push(Line::from(vec![
            Span::raw("Color: "),
            Span::styled(color_name, paint_style(player.color()).bold()),
        ]));
        lines.push(Line::from(format!(
            "Position: {}  Speed: {}",
            player.position, player.speed
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(app.last_event.as_str()));

    let status = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Player"));
    frame.render_widget(status, area);
}

fn render_mix_rules(frame: &mut Frame, area: Rect, world: &World) {
    let items: Vec<ListItem> = world
        .mix_table()
        .rules()
        .map(|(first, second, result)| {
            ListItem::from(Line::from(vec![
                Span::raw(format!("{} + {} = ", first, second)),
                Span::styled(result.name(), paint_style(Some(result))),
            ]))
        })
        .collect();

    let rules = List::new(items).block(Block::default().borders(Borders::ALL).title("Mixing"));
    frame.render_widget(rules, area);
}

/// Renders the world map onto the frame.
fn render_map(frame: &mut Frame, area: Rect, world: &World) {
    let mut lines: Vec<Line> = Vec::with_capacity(world.height());

    for (position, cell) in world.items().enumerate() {
        if position.x == 0 {
            lines.push(Line::default());
        }
        let player = world
            .player_at(position)
            .and_then(|id| world.player(id))
            .map(|player| Span::styled("@", paint_style(player.color()).bold()));

        let span = player.unwrap_or_else(|| match cell.as_ref().filter(|item| item.is_active()) {
            Some(item) => match item.kind() {
                MapItemKind::Wall => Span::styled("#", Style::default().fg(Color::DarkGray)),
                MapItemKind::Door => Span::styled("|", paint_style(item.color())),
                MapItemKind::PaintingBlock => Span::styled("▒", paint_style(item.color())),
            },
            None => Span::raw(" "),
        });
        if let Some(line) = lines.last_mut() {
            line.push_span(span);
        }
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Chroma World").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
