use std::fs::File;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fogmaze::config::{Cli, Command, MazeArgs, PlayArgs};
use fogmaze::game::{Game, ScoreBoard};
use fogmaze::render::{ascii, Renderer};
use fogmaze::{AppError, Dir, Maze, TraversalState};

fn main() {
    let cli = Cli::parse();
    let to_stderr = matches!(cli.command, Some(Command::Print));
    if let Err(err) = init_logging(cli.log_file.as_deref(), to_stderr) {
        eprintln!("{err}");
        std::process::exit(2);
    }

    let seed = cli.maze.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, difficulty = ?cli.maze.difficulty, "starting");

    let result = match &cli.command {
        Some(Command::Print) => print_maze(&cli.maze, seed),
        Some(Command::Play(play)) => play_game(&cli.maze, play, seed),
        None => play_game(&cli.maze, &PlayArgs::default(), seed),
    };
    if let Err(err) = result {
        error!(%err, "exiting with error");
        eprintln!("fogmaze: {err}");
        std::process::exit(1);
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The play screen owns stdout, so logs only go somewhere when a file is
/// given or when printing a maze.
fn init_logging(log_file: Option<&Path>, to_stderr: bool) -> Result<(), AppError> {
    if let Some(path) = log_file {
        let file = File::create(path).map_err(|source| AppError::LogFile {
            path: path.display().to_string(),
            source,
        })?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn print_maze(args: &MazeArgs, seed: u64) -> Result<(), AppError> {
    let settings = args.game_settings(&PlayArgs::default()).maze_settings(1);
    let mut rng = StdRng::seed_from_u64(seed);
    let maze = Maze::construct(settings, &mut rng)?;
    print!("{}", ascii(&maze, None));
    println!(
        "seed={} size={} openings={} shortest={}",
        seed,
        maze.size(),
        maze.openings(),
        maze.shortest_path_len(maze.start(), maze.goal())
            .map_or_else(|| "-".to_string(), |d| d.to_string())
    );
    Ok(())
}

fn play_game(args: &MazeArgs, play: &PlayArgs, seed: u64) -> Result<(), AppError> {
    let settings = args.game_settings(play);
    // Build before touching the terminal so bad settings fail cleanly.
    let game = Game::new(settings, seed, Instant::now())?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let mut scores = ScoreBoard::default();
    let result = run(&mut stdout, game, play, &mut scores);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    println!(
        "Levels won: {}  Score: {}/{}  (seed {})",
        scores.levels_won, scores.total, scores.best_possible, seed
    );
    result
}

fn run(
    stdout: &mut Stdout,
    mut game: Game,
    play: &PlayArgs,
    scores: &mut ScoreBoard,
) -> Result<(), AppError> {
    let mut renderer = Renderer::new(game.maze());
    let frame_time = play.frame_time();

    loop {
        let frame_start = Instant::now();
        let mut rebuilt = false;
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('r') => {
                    game.restart(Instant::now())?;
                    rebuilt = true;
                }
                KeyCode::Char('n') if game.state() == TraversalState::Won => {
                    game.next_level(Instant::now())?;
                    rebuilt = true;
                }
                code => {
                    if let Some(dir) = dir_for_key(code) {
                        game.handle_move(dir, Instant::now(), scores);
                    }
                }
            }
        }

        let now = Instant::now();
        game.tick(now);
        if rebuilt {
            renderer.reset(stdout, game.maze())?;
        }
        renderer.render(stdout, &game, scores, now)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(Dir::North),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(Dir::East),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(Dir::South),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(Dir::West),
        _ => None,
    }
}
