//! Snapshot loading for the five catalog collections.
//!
//! Loading is deliberately forgiving: a missing or malformed collection
//! file is logged and replaced with an empty collection so the process
//! keeps serving whatever data did load. Only an unusable snapshot
//! directory is reported as an error.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::model::{Category, CategoryFile, Course, Instructor, Review, User};
use super::text;
use crate::{CatalogError, Result};

pub const COURSES_FILE: &str = "courses.json";
pub const INSTRUCTORS_FILE: &str = "instructors.json";
pub const REVIEWS_FILE: &str = "course_reviews.json";
pub const USERS_FILE: &str = "users.json";
pub const CATEGORIES_FILE: &str = "categories.json";

/// Raw collections as read from disk, before index construction.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
    pub categories: Vec<Category>,
}

impl Snapshot {
    /// Load every collection from a snapshot directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CatalogError::Snapshot(format!(
                "snapshot directory {} does not exist",
                dir.display()
            )));
        }

        let snapshot = Self {
            courses: sanitize_courses(load_collection(&dir.join(COURSES_FILE))),
            instructors: load_collection(&dir.join(INSTRUCTORS_FILE)),
            reviews: load_collection(&dir.join(REVIEWS_FILE)),
            users: load_collection(&dir.join(USERS_FILE)),
            categories: load_categories(&dir.join(CATEGORIES_FILE)),
        };

        info!(
            "snapshot loaded: {} courses, {} instructors, {} reviews, {} users, {} categories",
            snapshot.courses.len(),
            snapshot.instructors.len(),
            snapshot.reviews.len(),
            snapshot.users.len(),
            snapshot.categories.len()
        );

        Ok(snapshot)
    }
}

/// Drop course records without a usable id or title and backfill
/// missing slugs from the title.
pub(crate) fn sanitize_courses(raw: Vec<Value>) -> Vec<Course> {
    let total = raw.len();
    let mut courses = Vec::with_capacity(total);

    for value in raw {
        let mut course: Course = match serde_json::from_value(value) {
            Ok(course) => course,
            Err(e) => {
                debug!("skipping malformed course record: {e}");
                continue;
            }
        };

        if course.id.is_empty() || course.title.is_empty() {
            debug!("skipping course without id or title");
            continue;
        }

        if course.slug.as_deref().is_none_or(str::is_empty) {
            course.slug = Some(text::slugify(&course.title));
        }

        courses.push(course);
    }

    if courses.len() < total {
        debug!("discarded {} invalid course records", total - courses.len());
    }

    courses
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_json(path) {
        Ok(items) => items,
        Err(e) => {
            warn!(
                "failed to load {}: {e}; continuing with an empty collection",
                path.display()
            );
            Vec::new()
        }
    }
}

fn load_categories(path: &Path) -> Vec<Category> {
    match read_json::<CategoryFile>(path) {
        Ok(file) => file.all_categories,
        Err(e) => {
            warn!(
                "failed to load {}: {e}; continuing with an empty collection",
                path.display()
            );
            Vec::new()
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_skips_records_missing_id_or_title() {
        let raw = vec![
            serde_json::json!({ "id": "c1", "title": "Kept" }),
            serde_json::json!({ "id": "", "title": "No id" }),
            serde_json::json!({ "title": "Missing id entirely" }),
            serde_json::json!({ "id": "c2" }),
            serde_json::json!("not even an object"),
            serde_json::json!({ "id": "c3", "title": "Also kept" }),
        ];

        let courses = sanitize_courses(raw);
        let ids: Vec<&str> = courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[test]
    fn sanitize_backfills_slug_from_title() {
        let raw = vec![
            serde_json::json!({ "id": "c1", "title": "Lập trình Web" }),
            serde_json::json!({ "id": "c2", "title": "Whatever", "slug": "keep-this" }),
            serde_json::json!({ "id": "c3", "title": "Blank slug", "slug": "" }),
        ];

        let courses = sanitize_courses(raw);
        assert_eq!(courses[0].slug.as_deref(), Some("lap-trinh-web"));
        assert_eq!(courses[1].slug.as_deref(), Some("keep-this"));
        assert_eq!(courses[2].slug.as_deref(), Some("blank-slug"));
    }
}
