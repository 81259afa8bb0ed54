use std::path::PathBuf;

use clap::Subcommand;
use getfit_core::{Config, ExerciseCatalog};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List exercises
    List {
        /// JSON file to load instead of the configured or bundled list
        #[arg(long)]
        path: Option<PathBuf>,
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CatalogAction::List { path, json } => {
            let path = path.or_else(|| Config::load_or_default().catalog.path.map(PathBuf::from));
            let catalog = match path {
                Some(path) => ExerciseCatalog::load(&path),
                None => ExerciseCatalog::bundled(),
            };

            let exercises = catalog.sorted();
            if json {
                println!("{}", serde_json::to_string_pretty(&exercises)?);
            } else if exercises.is_empty() {
                println!("no exercises available");
            } else {
                for exercise in exercises {
                    println!("{:<24} {}", exercise.id, exercise.link);
                }
            }
        }
    }
    Ok(())
}
