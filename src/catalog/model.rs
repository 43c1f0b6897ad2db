//! Record types for the five snapshot collections.
//!
//! The shapes mirror the snapshot JSON files. Most course fields are
//! optional in the wild, so everything except `id` and `title` carries a
//! serde default; records missing those two are discarded at load time.

use serde::{Deserialize, Deserializer, Serialize};

/// A single course record.
///
/// Prices are in currency minor units (the snapshots use VND, which has
/// none). `slug` may be absent in the raw data; the loader backfills it
/// from the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub instructor_id: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_outcomes: Vec<String>,
    #[serde(default)]
    pub duration_hours: f64,
    #[serde(default)]
    pub number_of_lectures: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub number_of_reviews: u64,
    #[serde(default, deserialize_with = "flag")]
    pub is_bestseller: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Course {
    /// Discounted price when one is set, list price otherwise.
    pub fn effective_price(&self) -> u64 {
        self.discount_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio_snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub course_id: String,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub avatar: String,
}

/// A taxonomy node. `featured` distinguishes the handful of main
/// categories from the rest; that split is presentational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<String>,
}

/// On-disk wrapper of the categories snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFile {
    #[serde(rename = "allCategories", default)]
    pub all_categories: Vec<Category>,
}

/// The snapshots encode boolean flags as either JSON booleans or 0/1
/// integers; accept both.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_accept_integers_and_booleans() {
        let as_int: Course = serde_json::from_value(serde_json::json!({
            "id": "c1", "title": "T", "is_bestseller": 1, "is_new": 0
        }))
        .unwrap();
        assert!(as_int.is_bestseller);
        assert!(!as_int.is_new);

        let as_bool: Course = serde_json::from_value(serde_json::json!({
            "id": "c1", "title": "T", "is_bestseller": true
        }))
        .unwrap();
        assert!(as_bool.is_bestseller);
    }

    #[test]
    fn effective_price_prefers_discount() {
        let course: Course = serde_json::from_value(serde_json::json!({
            "id": "c1", "title": "T", "price": 200_000, "discount_price": 99_000
        }))
        .unwrap();
        assert_eq!(course.effective_price(), 99_000);

        let full: Course = serde_json::from_value(serde_json::json!({
            "id": "c2", "title": "T", "price": 200_000, "discount_price": null
        }))
        .unwrap();
        assert_eq!(full.effective_price(), 200_000);
    }

    #[test]
    fn zero_discount_is_a_real_price() {
        // Unlike a missing discount, an explicit zero means free.
        let course: Course = serde_json::from_value(serde_json::json!({
            "id": "c1", "title": "T", "price": 200_000, "discount_price": 0
        }))
        .unwrap();
        assert_eq!(course.effective_price(), 0);
    }
}
