//! # Delve Main Entry Point
//!
//! A line-based terminal frontend: loads or starts a session, reads commands
//! from stdin and runs the turn scheduler until the player quits.

use clap::Parser;
use delve::{
    config, input_to_action, parse_command, Action, DelveError, DelveResult, DungeonParams, Engine,
    InputSource, PlayerInput, SessionEnd, TileType, TurnScheduler,
};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "A turn-based dungeon crawler played one command per line")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Where the session is saved on exit
    #[arg(long, default_value = config::SAVE_FILE_NAME)]
    save_file: PathBuf,

    /// Resume the session stored in the save file
    #[arg(long = "continue")]
    resume: bool,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Delve v{}", delve::VERSION);

    let mut engine = if args.resume {
        info!("Loading session from {}", args.save_file.display());
        Engine::load_from_path(&args.save_file)?
    } else {
        let seed = args.seed.unwrap_or_else(rand::random);
        info!("Using seed {}", seed);
        Engine::new_game(DungeonParams::new(), seed)?
    };

    let mut input = StdinInput::new();
    play(&mut engine, &mut input, &args.save_file)
}

/// Runs the session to its end and saves it. A fault or a panic inside the
/// session still gets a best-effort save before the error is returned.
fn play(engine: &mut Engine, input: &mut dyn InputSource, save_file: &Path) -> DelveResult<()> {
    let mut scheduler = TurnScheduler::default();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| scheduler.run(engine, input)));

    match outcome {
        Ok(SessionEnd::Escape) => {
            engine.save_to_path(save_file)?;
            println!("Game saved to {}.", save_file.display());
            Ok(())
        }
        Ok(SessionEnd::Fault(fault)) => {
            error!("Session aborted: {}", fault);
            save_after_failure(engine, save_file);
            Err(fault)
        }
        Err(_) => {
            error!("Session panicked");
            save_after_failure(engine, save_file);
            Err(DelveError::InvalidState("the session panicked".to_string()))
        }
    }
}

/// Best-effort save once the session has gone wrong.
fn save_after_failure(engine: &Engine, path: &Path) {
    match engine.save_to_path(path) {
        Ok(()) => warn!("Saved the session to {} after the failure", path.display()),
        Err(save_error) => warn!("Could not save after the failure: {}", save_error),
    }
}

/// Sets up `env_logger`, honoring `RUST_LOG` when it is set.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
}

/// Reads commands from stdin, printing the map and new messages before each
/// prompt. End of input quits.
struct StdinInput {
    printed_messages: usize,
}

impl StdinInput {
    fn new() -> Self {
        Self { printed_messages: 0 }
    }

    fn show(&mut self, engine: &Engine) {
        println!("{}", render_map(engine));

        let messages = engine.message_log.messages();
        let start = self.printed_messages.min(messages.len());
        for message in &messages[start..] {
            println!("  {}", message.full_text());
        }
        self.printed_messages = messages.len();

        if let Some(player) = engine.player_actor() {
            println!(
                "HP {}/{}  Floor {}  Level {}  Turn {}",
                player.fighter.hp(),
                player.fighter.max_hp(),
                engine.current_floor,
                player.leveling.current_level,
                engine.turn_number
            );
            for (index, item) in player.inventory.items().iter().enumerate() {
                let worn = if player.equipment.is_equipped(item.id) {
                    " (equipped)"
                } else {
                    ""
                };
                println!("  {}) {}{}", index + 1, item.name, worn);
            }
        }
    }
}

impl InputSource for StdinInput {
    fn next_action(&mut self, engine: &Engine) -> Action {
        self.show(engine);
        let stdin = io::stdin();

        loop {
            print!("> ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return Action::escape(engine.player_id),
                Ok(_) => {}
            }

            let command = parse_command(&line);
            match command.and_then(|command| input_to_action(command, engine)) {
                Some(action) => return action,
                None if matches!(command, Some(PlayerInput::Use(_, None))) => {
                    println!("That item must be aimed: use N X Y")
                }
                None => println!(
                    "Commands: h j k l y u b n (move), . (wait), g (pick up), > (descend), \
                     drop N, equip N, use N [X Y], q (quit)"
                ),
            }
        }
    }
}

/// Draws explored tiles, with entities shown only where currently visible.
fn render_map(engine: &Engine) -> String {
    let level = &engine.level;
    let mut rows: Vec<Vec<char>> = level
        .tiles
        .iter()
        .map(|row| {
            row.iter()
                .map(|tile| match (tile.explored, tile.tile_type) {
                    (false, _) => ' ',
                    (true, TileType::Wall) => '#',
                    (true, TileType::Floor) => '.',
                    (true, TileType::DownStairs) => '>',
                })
                .collect()
        })
        .collect();

    let mut visible: Vec<_> = level
        .entities
        .iter()
        .filter(|entity| level.is_visible(entity.position))
        .collect();
    visible.sort_by_key(|entity| entity.render_order);
    for entity in visible {
        if let Some(cell) = rows
            .get_mut(entity.position.y as usize)
            .and_then(|row| row.get_mut(entity.position.x as usize))
        {
            *cell = entity.glyph;
        }
    }

    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve::ScriptedInput;
    use tempfile::tempdir;

    /// Plays a few waits, then blows up.
    struct CrashingInput {
        turns_left: u32,
    }

    impl InputSource for CrashingInput {
        fn next_action(&mut self, engine: &Engine) -> Action {
            if self.turns_left == 0 {
                panic!("input device vanished");
            }
            self.turns_left -= 1;
            Action::wait(engine.player_id)
        }
    }

    #[test]
    fn test_quitting_saves_the_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quit.json");
        let mut engine = Engine::new_game(DungeonParams::for_testing(), 12).unwrap();
        let mut input = ScriptedInput::new(Vec::new());

        play(&mut engine, &mut input, &path).unwrap();
        assert!(Engine::load_from_path(&path).is_ok());
    }

    #[test]
    fn test_panic_still_saves_the_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crash.json");
        let mut engine = Engine::new_game(DungeonParams::for_testing(), 12).unwrap();
        let mut input = CrashingInput { turns_left: 2 };

        let result = play(&mut engine, &mut input, &path);

        assert!(matches!(result, Err(DelveError::InvalidState(_))));
        let restored = Engine::load_from_path(&path).unwrap();
        assert_eq!(restored.turn_number, 2);
    }

    #[test]
    fn test_render_map_hides_unexplored_cells() {
        let engine = Engine::new_game(DungeonParams::for_testing(), 12).unwrap();
        let map = render_map(&engine);
        assert!(map.contains('@'));
        assert!(map.lines().count() <= engine.level.height as usize);
    }
}
