//! Exercise catalog.
//!
//! A flat list of `{ "id", "link" }` records, loaded once and deduplicated.
//! Loading never fails: a missing or malformed list yields an empty catalog
//! and an error log entry.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

const BUNDLED_EXERCISES: &str = include_str!("../data/exercises.json");

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub link: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
    exercises: HashSet<Exercise>,
}

impl ExerciseCatalog {
    /// Parse a JSON array of exercises.
    ///
    /// # Errors
    /// Returns an error if `json` is not an array of `{id, link}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let list: Vec<Exercise> = serde_json::from_str(json)?;
        Ok(Self {
            exercises: list.into_iter().collect(),
        })
    }

    /// The list shipped inside the binary.
    pub fn bundled() -> Self {
        Self::parse_or_empty(BUNDLED_EXERCISES, "bundled")
    }

    /// Load from a file, falling back to an empty catalog.
    pub fn load(path: &Path) -> Self {
        tracing::debug!(path = %path.display(), "loading exercise catalog");
        match std::fs::read_to_string(path) {
            Ok(json) => Self::parse_or_empty(&json, &path.display().to_string()),
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read exercise catalog; continuing with an empty set"
                );
                Self::default()
            }
        }
    }

    fn parse_or_empty(json: &str, source: &str) -> Self {
        match Self::from_json(json) {
            Ok(catalog) if catalog.is_empty() => {
                tracing::error!(source, "exercise catalog is empty");
                catalog
            }
            Ok(catalog) => {
                tracing::debug!(source, count = catalog.len(), "exercise catalog loaded");
                catalog
            }
            Err(e) => {
                tracing::error!(
                    source,
                    error = %e,
                    "failed to parse exercise catalog; continuing with an empty set"
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Exercise with the given id. When several records share the id, the
    /// one with the lowest link wins, matching the order of [`Self::sorted`].
    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.id == id)
            .min_by(|a, b| a.link.cmp(&b.link))
    }

    /// Exercises ordered by id, for stable output.
    pub fn sorted(&self) -> Vec<&Exercise> {
        let mut list: Vec<&Exercise> = self.exercises.iter().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.link.cmp(&b.link)));
        list
    }
}
