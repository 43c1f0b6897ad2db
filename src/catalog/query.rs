//! Query options, compound filtering, sorting, and pagination.

use std::cmp::Reverse;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::Course;
use super::text;

/// Upper price bound applied when a query sets none (VND).
pub const DEFAULT_MAX_PRICE: u64 = 5_000_000;

/// Page size applied when a query sets none.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Options accepted by the course listing queries. Every field is
/// optional; the documented defaults apply when a field is unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Free-text query; triggers relevance pre-ranking when non-empty.
    pub q: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact level match.
    pub level: Option<String>,
    /// Inclusive lower bound on effective price (default 0).
    pub min_price: Option<u64>,
    /// Inclusive upper bound on effective price (default 5,000,000).
    pub max_price: Option<u64>,
    /// Minimum course rating.
    pub min_rating: Option<f64>,
    /// 1-indexed page (default 1; zero is clamped to 1).
    pub page: Option<usize>,
    /// Page size (default 12; zero is clamped to 1).
    pub limit: Option<usize>,
    /// Sort key (default title).
    pub sort: Option<SortKey>,
}

/// Sort orders for course listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Case- and diacritics-insensitive title order.
    #[default]
    Title,
    /// Effective price, ascending.
    Price,
    /// Effective price, descending.
    PriceDesc,
    /// Course rating, descending.
    Rating,
    /// Review count, descending.
    Reviews,
    /// `rating * ln(review_count + 1)`, descending.
    Popularity,
    /// Last-updated timestamp, descending; unparseable dates sort as
    /// the epoch.
    Date,
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    /// Unknown keys fall back to title order rather than erroring.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "title" => Self::Title,
            "price" => Self::Price,
            "price_desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            "reviews" => Self::Reviews,
            "popularity" => Self::Popularity,
            "date" => Self::Date,
            other => {
                debug!("unknown sort key {other:?}, falling back to title");
                Self::Title
            }
        })
    }
}

/// Conjunction of the category, level, price-band, and rating
/// predicates. Unset predicates pass.
pub(crate) fn matches_filters(course: &Course, opts: &QueryOptions) -> bool {
    if let Some(category) = &opts.category {
        if course.category != *category {
            return false;
        }
    }

    if let Some(level) = &opts.level {
        if course.level != *level {
            return false;
        }
    }

    let price = course.effective_price();
    if price < opts.min_price.unwrap_or(0) || price > opts.max_price.unwrap_or(DEFAULT_MAX_PRICE) {
        return false;
    }

    if let Some(min_rating) = opts.min_rating {
        if course.rating < min_rating {
            return false;
        }
    }

    true
}

/// Stable in-place sort; ties keep their incoming order.
pub(crate) fn sort_courses(courses: &mut [&Course], key: SortKey) {
    match key {
        SortKey::Title => courses.sort_by_cached_key(|c| text::normalize(&c.title)),
        SortKey::Price => courses.sort_by_key(|c| c.effective_price()),
        SortKey::PriceDesc => courses.sort_by_key(|c| Reverse(c.effective_price())),
        SortKey::Rating => courses.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::Reviews => courses.sort_by_key(|c| Reverse(c.number_of_reviews)),
        SortKey::Popularity => courses.sort_by(|a, b| popularity(b).total_cmp(&popularity(a))),
        SortKey::Date => courses.sort_by_key(|c| Reverse(last_updated_timestamp(c))),
    }
}

fn popularity(course: &Course) -> f64 {
    course.rating * ((course.number_of_reviews + 1) as f64).ln()
}

fn last_updated_timestamp(course: &Course) -> i64 {
    course
        .last_updated
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(0)
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Pagination metadata reported alongside every page slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_courses: usize,
    pub per_page: usize,
}

/// Slice out a 1-indexed page. Out-of-range pages yield an empty slice;
/// zero page or limit are clamped to 1.
pub(crate) fn paginate<'a>(
    courses: &[&'a Course],
    page: usize,
    limit: usize,
) -> (Vec<&'a Course>, Pagination) {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = courses.len();

    let start = (page - 1).saturating_mul(limit);
    let slice = courses.iter().skip(start).take(limit).copied().collect();

    (
        slice,
        Pagination {
            current_page: page,
            total_pages: total.div_ceil(limit),
            total_courses: total,
            per_page: limit,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn course(id: &str, body: serde_json::Value) -> Course {
        let mut value = serde_json::json!({ "id": id, "title": id });
        value
            .as_object_mut()
            .unwrap()
            .extend(body.as_object().unwrap().clone());
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_sort_key_falls_back_to_title() {
        assert_eq!("price_desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert_eq!("newest".parse::<SortKey>().unwrap(), SortKey::Title);
        assert_eq!("".parse::<SortKey>().unwrap(), SortKey::Title);
    }

    #[test]
    fn price_band_is_inclusive_on_both_ends() {
        let c = course("a", serde_json::json!({ "price": 100 }));
        let opts = QueryOptions {
            min_price: Some(100),
            max_price: Some(100),
            ..Default::default()
        };
        assert!(matches_filters(&c, &opts));

        let below = QueryOptions {
            min_price: Some(101),
            ..Default::default()
        };
        assert!(!matches_filters(&c, &below));
    }

    #[test]
    fn default_price_band_caps_at_five_million() {
        let pricey = course("a", serde_json::json!({ "price": 5_000_001u64 }));
        assert!(!matches_filters(&pricey, &QueryOptions::default()));

        let capped = course("b", serde_json::json!({ "price": 5_000_000u64 }));
        assert!(matches_filters(&capped, &QueryOptions::default()));
    }

    #[test]
    fn filters_are_conjunctive() {
        let c = course(
            "a",
            serde_json::json!({ "category": "Web", "level": "Beginner", "price": 50, "rating": 4.5 }),
        );
        let opts = QueryOptions {
            category: Some("Web".into()),
            level: Some("Advanced".into()),
            ..Default::default()
        };
        assert!(!matches_filters(&c, &opts));
    }

    #[test]
    fn date_sort_treats_missing_dates_as_epoch() {
        let dated = course("a", serde_json::json!({ "last_updated": "2024-06-01" }));
        let undated = course("b", serde_json::json!({}));
        let rfc = course("c", serde_json::json!({ "last_updated": "2025-01-15T10:00:00Z" }));
        let garbage = course("d", serde_json::json!({ "last_updated": "soon" }));

        let mut rows = vec![&undated, &dated, &garbage, &rfc];
        sort_courses(&mut rows, SortKey::Date);

        let ids: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();
        // Unparseable and missing dates tie at the epoch and keep their
        // incoming relative order.
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn popularity_weights_rating_by_log_reviews() {
        let loud = course(
            "loud",
            serde_json::json!({ "rating": 4.0, "number_of_reviews": 1000 }),
        );
        let quiet = course(
            "quiet",
            serde_json::json!({ "rating": 5.0, "number_of_reviews": 2 }),
        );
        let mut rows = vec![&quiet, &loud];
        sort_courses(&mut rows, SortKey::Popularity);
        assert_eq!(rows[0].id, "loud");
    }

    #[test]
    fn paginate_clamps_and_reports_totals() {
        let a = course("a", serde_json::json!({}));
        let b = course("b", serde_json::json!({}));
        let c = course("c", serde_json::json!({}));
        let rows = vec![&a, &b, &c];

        let (slice, meta) = paginate(&rows, 0, 0);
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.per_page, 1);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(slice.len(), 1);

        let (slice, meta) = paginate(&rows, 2, 2);
        assert_eq!(slice.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(meta.total_pages, 2);
        assert_eq!(meta.total_courses, 3);

        let (slice, meta) = paginate(&rows, 9, 2);
        assert!(slice.is_empty());
        assert_eq!(meta.current_page, 9);
    }
}
