use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use prana_core::{
    builtin_patterns, shared_store, BreathSnapshot, BreathingTimer, IntervalDriver, Phase,
};
use prana_store::SettingsStore;

#[derive(Parser)]
#[command(name = "prana-cli", about = "Guided breathing sessions in the terminal")]
struct Cli {
    /// Settings file; configuration changes made during a run are saved back.
    #[arg(long, default_value = "prana.toml")]
    settings: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in breathing patterns.
    Patterns,
    /// Run a guided session.
    Run {
        /// Pattern key (see `patterns`); defaults to the persisted selection.
        #[arg(long)]
        pattern: Option<String>,
        /// Session length in seconds.
        #[arg(long, default_value_t = 60.0)]
        seconds: f64,
        /// Stretch (+) or compress (-) the cycle by this many milliseconds.
        #[arg(long, default_value_t = 0)]
        speed: i64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Patterns => {
            let mut patterns: Vec<_> = builtin_patterns().into_values().collect();
            patterns.sort_by(|a, b| a.id.cmp(&b.id));
            for p in patterns {
                let t = p.phases;
                println!(
                    "{:<10} {:<12} {:>4.1}-{:.1}-{:.1}-{:.1}s  {:>4.1} bpm  {}",
                    p.id,
                    p.label,
                    t.inhale / 1000.0,
                    t.hold_in / 1000.0,
                    t.exhale / 1000.0,
                    t.hold_out / 1000.0,
                    p.breaths_per_minute(),
                    p.description,
                );
            }
        }
        Commands::Run {
            pattern,
            seconds,
            speed,
        } => {
            let settings = SettingsStore::new(&cli.settings);
            let store = shared_store(settings.load_store()?);
            if let Some(key) = pattern {
                store.lock().select_pattern(&key);
            }
            if speed != 0 {
                store.lock().adjust_cycle_speed(speed as f64);
            }
            {
                let s = store.lock();
                let active = s.active_pattern();
                println!(
                    "{}: {} ({:.1}s cycle)",
                    active.label,
                    active.description,
                    s.total_cycle_time() / 1000.0
                );
            }

            let mut timer = BreathingTimer::new(store, IntervalDriver::default());
            timer.play();

            let mut last_phase = Phase::Ready;
            let session_ms = seconds * 1000.0;
            loop {
                let snap = timer.snapshot();
                if snap.session_time >= session_ms {
                    break;
                }
                if snap.phase != last_phase {
                    announce(&snap);
                    last_phase = snap.phase;
                }
                thread::sleep(Duration::from_millis(50));
            }
            timer.pause();

            let snap = timer.snapshot();
            println!(
                "\ndone: {} cycle(s), {:.1}s of breathing",
                snap.cycle_count.saturating_sub(1),
                snap.session_time / 1000.0
            );
            settings.save(&timer.store().lock())?;
        }
    }
    Ok(())
}

fn announce(snap: &BreathSnapshot) {
    let name = match snap.phase {
        Phase::Ready => return,
        Phase::Inhale => "inhale",
        Phase::HoldIn => "hold",
        Phase::Exhale => "exhale",
        Phase::HoldOut => "hold out",
    };
    println!(
        "[{:>6.1}s] {:<9} {:.1}s",
        snap.session_time / 1000.0,
        name,
        snap.phase_duration / 1000.0
    );
}
