use clap::{Parser, Subcommand};
use plank_core::difficulty::LEVEL_COUNT;
use plank_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Sender};
use std::thread;

#[derive(Parser)]
#[command(name = "plankflow")]
#[command(about = "Guided plank workout timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a guided workout (default)
    Start {
        /// Difficulty level, 0 (Beginner) to 4 (Expert)
        #[arg(long)]
        level: Option<u8>,

        /// Multiply every phase duration (e.g. 0.2 for a quick run-through)
        #[arg(long)]
        time_scale: Option<f64>,

        /// Milliseconds between ticks
        #[arg(long)]
        tick_ms: Option<u64>,
    },

    /// Show the timing table for each difficulty level
    Levels,

    /// Show the exercises and their form cues
    Plan,

    /// Show or change preferences
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print current preferences
    Show,

    /// Update one or more preferences
    Set {
        /// Body weight in kilograms
        #[arg(long)]
        weight: Option<f64>,

        /// Height in centimetres
        #[arg(long)]
        height: Option<f64>,

        /// Enable or disable sounds
        #[arg(long)]
        sound: Option<bool>,

        /// Enable or disable vibration
        #[arg(long)]
        vibration: Option<bool>,
    },
}

fn main() -> Result<()> {
    plank_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    match cli.command {
        Some(Commands::Start {
            level,
            time_scale,
            tick_ms,
        }) => cmd_start(config, level, time_scale, tick_ms),
        Some(Commands::Levels) => cmd_levels(),
        Some(Commands::Plan) => cmd_plan(),
        Some(Commands::Prefs { action }) => cmd_prefs(&config, action.unwrap_or(PrefsAction::Show)),
        None => cmd_start(config, None, None, None),
    }
}

fn cmd_start(
    mut config: Config,
    level: Option<u8>,
    time_scale: Option<f64>,
    tick_ms: Option<u64>,
) -> Result<()> {
    if let Some(level) = level {
        config.workout.level = level;
    }
    if let Some(time_scale) = time_scale {
        config.workout.time_scale = time_scale;
    }
    if let Some(tick_ms) = tick_ms {
        config.workout.tick_interval_ms = tick_ms;
    }
    config.validate()?;

    let plan = default_plan();
    let errors = plan.validate();
    if !errors.is_empty() {
        eprintln!("Plan validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Plan("Invalid workout plan".into()));
    }

    let store = JsonFileStore::in_data_dir(&config.data.data_dir);
    let preferences = store.load();

    let mut runner = WorkoutRunner::new(
        plan.clone(),
        &config.workout,
        preferences,
        TerminalFeedback,
    )?;

    let workout = runner.machine().config();
    println!(
        "Difficulty: {} (hold {}s, short break {}s, long break {}s)",
        level_label(config.workout.level)?,
        workout.exercise_duration,
        workout.short_break,
        workout.long_break
    );
    println!("Controls: p = pause/resume, n = next, b = back, q = end workout, c = cancel end");

    let (tx, rx) = channel();
    tx.send(Command::Action(UserAction::StartSetup))
        .map_err(|e| Error::Other(e.to_string()))?;
    tx.send(Command::Action(UserAction::Begin))
        .map_err(|e| Error::Other(e.to_string()))?;
    spawn_keyboard_reader(tx.clone());

    let outcome = runner.run(&rx, &tx, render);
    println!();

    match outcome {
        WorkoutOutcome::Completed { summary, .. } => {
            println!("Workout complete!");
            println!();
            println!("Session summary");
            println!("  Total plank time: {}", format_ms(summary.total_plank_ms));
            println!("  Longest hold: {}", format_ms(summary.longest_hold_ms));
            println!("  Estimated calories burned: {} kcal", summary.calories);
        }
        WorkoutOutcome::Aborted => println!("Workout ended early."),
        WorkoutOutcome::Disconnected => println!("Workout interrupted."),
    }
    Ok(())
}

/// Forward keyboard lines to the engine until stdin closes
fn spawn_keyboard_reader(tx: Sender<Command>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(action) = parse_key(&line) {
                if tx.send(Command::Action(action)).is_err() {
                    break;
                }
            }
        }
        tracing::debug!("Keyboard input closed");
    });
}

fn parse_key(line: &str) -> Option<UserAction> {
    match line.trim().to_lowercase().as_str() {
        "p" | "" => Some(UserAction::TogglePause),
        "n" => Some(UserAction::SkipNext),
        "b" => Some(UserAction::SkipPrevious),
        "q" => Some(UserAction::RequestAbort),
        "c" => Some(UserAction::CancelAbort),
        _ => None,
    }
}

fn render(runner: &WorkoutRunner<TerminalFeedback>, events: &[WorkoutEvent]) {
    let state = runner.state();
    let plan = runner.plan();
    let total = plan.len();
    let shown = plan.get(runner.machine().display_index());
    let name = shown.map(|e| e.name.as_str()).unwrap_or("");

    for event in events {
        match event {
            WorkoutEvent::PhaseChanged { to, .. } => match to {
                Phase::Countdown => println!("\nGet into position: {}", name),
                Phase::Exercise => println!(
                    "\n[{}/{}] Hold steady: {}",
                    state.exercise_index + 1,
                    total,
                    name
                ),
                Phase::Break => println!("\nRest. Up next: {}", name),
                _ => {}
            },
            WorkoutEvent::ExerciseChanged { index } if state.phase == Phase::Exercise => {
                if !events
                    .iter()
                    .any(|e| matches!(e, WorkoutEvent::PhaseChanged { .. }))
                {
                    println!("\n[{}/{}] Hold steady: {}", index + 1, total, name);
                }
            }
            WorkoutEvent::HalfwayReached { .. } if shown.is_some_and(|e| e.can_mirror) => {
                println!("\nSwitch sides");
            }
            WorkoutEvent::PauseToggled { paused: true } => println!("\nPaused"),
            WorkoutEvent::PauseToggled { paused: false } => println!("\nResumed"),
            WorkoutEvent::AbortArmed => println!("\nPress q again to end the workout"),
            WorkoutEvent::AbortCancelled => println!("\nContinuing"),
            _ => {}
        }
    }

    if state.phase.is_running() {
        let marker = if state.paused { " (paused)" } else { "" };
        print!("\r  {:>3}s{}   ", state.time_left_seconds, marker);
        let _ = io::stdout().flush();
    }
}

fn cmd_levels() -> Result<()> {
    println!("Level  Name          Hold  Short break  Long break");
    for level in 0..LEVEL_COUNT as u8 {
        let config = config_from_level(level)?;
        let marker = if level == DEFAULT_LEVEL { " (default)" } else { "" };
        println!(
            "{:>5}  {:<12}  {:>3}s  {:>10}s  {:>9}s{}",
            level,
            level_label(level)?,
            config.exercise_duration,
            config.short_break,
            config.long_break,
            marker
        );
    }
    Ok(())
}

fn cmd_plan() -> Result<()> {
    println!("Exercise guide");
    for (index, exercise) in default_plan().exercises.iter().enumerate() {
        let sides = if exercise.can_mirror { " (both sides)" } else { "" };
        println!();
        println!("  {:>2}. {}{}", index + 1, exercise.name, sides);
        for cue in &exercise.description {
            println!("      - {}", cue);
        }
    }
    Ok(())
}

fn cmd_prefs(config: &Config, action: PrefsAction) -> Result<()> {
    let store = JsonFileStore::in_data_dir(&config.data.data_dir);
    let mut prefs = store.load();

    if let PrefsAction::Set {
        weight,
        height,
        sound,
        vibration,
    } = action
    {
        if let Some(weight) = weight {
            prefs.weight_kg = positive("weight", weight)?;
        }
        if let Some(height) = height {
            prefs.height_cm = positive("height", height)?;
        }
        if let Some(sound) = sound {
            prefs.sound = sound;
        }
        if let Some(vibration) = vibration {
            prefs.vibration = vibration;
        }
        store.save(&prefs)?;
        println!("✓ Preferences saved");
    }

    println!("Vibration: {}", on_off(prefs.vibration));
    println!("Sound: {}", on_off(prefs.sound));
    println!("Weight: {} kg", prefs.weight_kg);
    println!("Height: {} cm", prefs.height_cm);
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidArgument(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
