use clap::Args;
use getfit_core::storage::Database;
use getfit_core::timer::format_clock;

#[derive(Args)]
pub struct StatsArgs {
    /// Also list this many recent workouts
    #[arg(long, default_value_t = 0)]
    recent: usize,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let stats = db.stats()?;
    let recent = db.recent_workouts(args.recent)?;

    if args.json {
        let out = serde_json::json!({ "stats": stats, "recent": recent });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "workouts: {} ({} completed), time: {}",
        stats.total_workouts,
        stats.completed_workouts,
        format_clock(stats.total_elapsed_secs)
    );
    println!(
        "today:    {} workouts, time: {}",
        stats.today_workouts,
        format_clock(stats.today_elapsed_secs)
    );
    for w in &recent {
        println!(
            "  {}  {}x{}  {}  {}",
            w.finished_at.format("%Y-%m-%d %H:%M"),
            w.config.total_reps,
            w.config.total_sets,
            format_clock(w.total_elapsed_secs),
            if w.completed { "completed" } else { "stopped" },
        );
    }
    Ok(())
}
