use clap::Subcommand;
use getfit_core::{format_clock, Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dot-path key: timer.work_duration, timer.short_break_duration,
        /// timer.long_break_duration, timer.total_reps, timer.total_sets,
        /// catalog.path
        key: String,
    },
    /// Change one setting; timer settings are validated before saving
    Set {
        /// Dot-path key (see `get`)
        key: String,
        /// Seconds for durations, a count for reps/sets, a file path for catalog.path
        value: String,
    },
    /// Show the default workout and catalog settings
    List {
        /// Print the raw settings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the default workout (12:00 work, 3 reps x 2 sets) and bundled catalog
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, %value, "configuration updated");
            match config.get(&key) {
                Some(stored) => println!("{key} = {stored}"),
                None => println!("{key} updated"),
            }
            if key.starts_with("timer.") {
                let workout = config.timer_configuration()?;
                println!("workout length: {}", format_clock(workout.total_expected_secs()));
            }
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_sections(&config);
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn print_sections(config: &Config) {
    let t = &config.timer;
    let durations = [
        ("work_duration", t.work_duration),
        ("short_break_duration", t.short_break_duration),
        ("long_break_duration", t.long_break_duration),
    ];

    println!("[timer]");
    for (name, secs) in durations {
        println!("  {name:<22}= {secs:<6}({})", format_clock(u64::from(secs)));
    }
    println!("  {:<22}= {}", "total_reps", t.total_reps);
    println!("  {:<22}= {}", "total_sets", t.total_sets);
    match config.timer_configuration() {
        Ok(workout) => println!(
            "  {:<22}  {}",
            "workout length",
            format_clock(workout.total_expected_secs())
        ),
        Err(e) => println!("  invalid: {e}"),
    }

    println!("[catalog]");
    let path = config.catalog.path.as_deref().unwrap_or("(bundled)");
    println!("  {:<22}= {path}", "path");
}
