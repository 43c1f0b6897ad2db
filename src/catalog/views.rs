//! Joined read models returned by the index.
//!
//! These are owned, serializable values: every join the index performs
//! clones the matched records so results stay valid independent of the
//! index borrow.

use serde::Serialize;

use super::model::{Course, Instructor, Review, User};
use super::query::Pagination;

/// A course joined to its instructor. The instructor is always present;
/// a missing reference is replaced by the placeholder instructor.
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithInstructor {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Instructor,
}

/// A review joined to its author, placeholder on miss.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithUser {
    #[serde(flatten)]
    pub review: Review,
    pub user: User,
}

/// Aggregates over one course's reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total_reviews: usize,
    pub average_rating: f64,
}

/// Full course detail: instructor, reviews with authors, up to four
/// related courses, and review aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetails {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Instructor,
    pub reviews: Vec<ReviewWithUser>,
    pub related_courses: Vec<CourseWithInstructor>,
    pub stats: ReviewStats,
}

/// One page of a course listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub courses: Vec<CourseWithInstructor>,
    pub pagination: Pagination,
}

/// Aggregates over one instructor's courses and their reviews.
/// `total_students` sums per-course review counts; it is a population
/// proxy, not a distinct-learner count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructorStats {
    pub total_courses: usize,
    pub total_students: u64,
    pub total_reviews: usize,
    pub average_rating: f64,
}

/// An instructor joined to their full course list and aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct InstructorProfile {
    #[serde(flatten)]
    pub instructor: Instructor,
    pub courses: Vec<CourseWithInstructor>,
    pub stats: InstructorStats,
}

/// Per-instructor roll-up used by the instructor listing.
#[derive(Debug, Clone, Serialize)]
pub struct InstructorSummary {
    #[serde(flatten)]
    pub instructor: Instructor,
    pub course_count: usize,
    pub total_students: u64,
    pub average_rating: f64,
}

/// Distinct sub-category with its course count, optionally scoped to a
/// single category ("all" otherwise).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCategoryCount {
    pub name: String,
    pub category: String,
    pub course_count: usize,
}

/// Effective-price spread over the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
    pub average: f64,
}

/// Catalog-wide counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_courses: usize,
    pub total_instructors: usize,
    /// Sum of per-course review counts, same proxy as
    /// [`InstructorStats::total_students`].
    pub total_students: u64,
    pub total_reviews: usize,
    /// Mean review rating, rounded to one decimal.
    pub average_rating: f64,
    pub categories_count: usize,
    /// Bestseller count.
    pub featured_courses: usize,
}
