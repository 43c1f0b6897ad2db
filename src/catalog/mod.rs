//! The catalog index - read-only queries over the loaded collections.
//!
//! An index is built once from a [`Snapshot`] and never mutated again;
//! every query takes `&self`, so a single instance can be shared across
//! threads (e.g. behind an `Arc`) without coordination. Construct it
//! explicitly and pass it to whoever needs it rather than stashing it in
//! a global.
//!
//! The read path never fails: unknown ids come back as `None`, empty
//! queries as empty lists, and dangling references are joined to fixed
//! placeholder records.

pub mod model;
pub mod query;
pub mod snapshot;
pub mod text;
pub mod views;

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::info;

use crate::Result;
use model::{Category, Course, Instructor, Review, User};
use query::{QueryOptions, DEFAULT_PAGE_SIZE};
use snapshot::Snapshot;
use views::{
    CatalogStats, CourseDetails, CourseWithInstructor, InstructorProfile, InstructorStats,
    InstructorSummary, Page, PriceRange, ReviewStats, ReviewWithUser, SubCategoryCount,
};

const PLACEHOLDER_INSTRUCTOR_AVATAR: &str = "https://via.placeholder.com/150";
const PLACEHOLDER_USER_AVATAR: &str = "https://via.placeholder.com/50";

/// Courses qualify as featured above this rating even without the
/// bestseller flag.
const FEATURED_RATING_FLOOR: f64 = 4.8;

/// Related courses attached to a course detail.
const RELATED_LIMIT: usize = 4;

pub struct CatalogIndex {
    courses: Vec<Course>,
    instructors: Vec<Instructor>,
    reviews: Vec<Review>,
    users: Vec<User>,
    categories: Vec<Category>,

    // Position maps by id; first occurrence wins on duplicates.
    course_pos: HashMap<String, usize>,
    instructor_pos: HashMap<String, usize>,
    user_pos: HashMap<u64, usize>,
}

impl CatalogIndex {
    /// Build an index over an already-loaded snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        let Snapshot {
            courses,
            instructors,
            reviews,
            users,
            categories,
        } = snapshot;

        let mut course_pos = HashMap::with_capacity(courses.len());
        for (i, course) in courses.iter().enumerate() {
            course_pos.entry(course.id.clone()).or_insert(i);
        }

        let mut instructor_pos = HashMap::with_capacity(instructors.len());
        for (i, instructor) in instructors.iter().enumerate() {
            instructor_pos.entry(instructor.id.clone()).or_insert(i);
        }

        let mut user_pos = HashMap::with_capacity(users.len());
        for (i, user) in users.iter().enumerate() {
            user_pos.entry(user.id).or_insert(i);
        }

        info!(
            "catalog index ready: {} courses, {} instructors",
            courses.len(),
            instructors.len()
        );

        Self {
            courses,
            instructors,
            reviews,
            users,
            categories,
            course_pos,
            instructor_pos,
            user_pos,
        }
    }

    /// Load the snapshot directory and build an index over it.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Snapshot::load(dir)?))
    }

    /// Raw course lookup by id.
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.course_pos.get(id).map(|&i| &self.courses[i])
    }

    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructor_pos.get(id).map(|&i| &self.instructors[i])
    }

    pub fn user(&self, id: u64) -> Option<&User> {
        self.user_pos.get(&id).map(|&i| &self.users[i])
    }

    /// Join a course to its instructor, substituting the placeholder
    /// instructor when the reference dangles.
    pub fn enrich(&self, course: &Course) -> CourseWithInstructor {
        CourseWithInstructor {
            course: course.clone(),
            instructor: self.instructor_or_placeholder(&course.instructor_id),
        }
    }

    /// Relevance-ranked free-text search, then compound filters, then
    /// instructor joins. An empty (or whitespace/diacritic-only) query
    /// returns nothing. Equal scores keep collection order.
    pub fn search(&self, raw_query: &str, opts: &QueryOptions) -> Vec<CourseWithInstructor> {
        let ranked = self.ranked_by_relevance(raw_query);
        ranked
            .into_iter()
            .filter(|c| query::matches_filters(c, opts))
            .map(|c| self.enrich(c))
            .collect()
    }

    /// Filtered, sorted, paginated course listing. When `q` is set the
    /// candidate set is first restricted to relevance matches; the final
    /// order is always the requested sort key (title by default).
    pub fn get_courses(&self, opts: &QueryOptions) -> Page {
        let mut matched: Vec<&Course> = match opts.q.as_deref() {
            Some(q) if !text::normalize(q).is_empty() => self.ranked_by_relevance(q),
            _ => self.courses.iter().collect(),
        };

        matched.retain(|c| query::matches_filters(c, opts));
        query::sort_courses(&mut matched, opts.sort.unwrap_or_default());

        let (slice, pagination) = query::paginate(
            &matched,
            opts.page.unwrap_or(1),
            opts.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        );

        Page {
            courses: slice.into_iter().map(|c| self.enrich(c)).collect(),
            pagination,
        }
    }

    /// Every course, enriched, in collection order.
    pub fn all_courses(&self) -> Vec<CourseWithInstructor> {
        self.courses.iter().map(|c| self.enrich(c)).collect()
    }

    /// Course detail: instructor, reviews with authors, related courses
    /// from the same category (collection order, self excluded), and
    /// review aggregates.
    pub fn course_details(&self, id: &str) -> Option<CourseDetails> {
        let course = self.course(id)?;

        let reviews: Vec<ReviewWithUser> = self
            .reviews
            .iter()
            .filter(|r| r.course_id == course.id)
            .map(|r| ReviewWithUser {
                review: r.clone(),
                user: self.user_or_placeholder(r.user_id),
            })
            .collect();

        let related_courses: Vec<CourseWithInstructor> = self
            .courses
            .iter()
            .filter(|c| c.category == course.category && c.id != course.id)
            .take(RELATED_LIMIT)
            .map(|c| self.enrich(c))
            .collect();

        let total_reviews = reviews.len();
        let average_rating = mean_rating(reviews.iter().map(|r| r.review.rating));

        Some(CourseDetails {
            course: course.clone(),
            instructor: self.instructor_or_placeholder(&course.instructor_id),
            reviews,
            related_courses,
            stats: ReviewStats {
                total_reviews,
                average_rating,
            },
        })
    }

    /// Bestsellers and courses rated at least 4.8, best rating first.
    pub fn featured(&self, limit: usize) -> Vec<CourseWithInstructor> {
        let mut picks: Vec<&Course> = self
            .courses
            .iter()
            .filter(|c| c.is_bestseller || c.rating >= FEATURED_RATING_FLOOR)
            .collect();
        picks.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        picks
            .into_iter()
            .take(limit)
            .map(|c| self.enrich(c))
            .collect()
    }

    /// Distinct category names of the current courses, collection order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.courses
            .iter()
            .map(|c| c.category.as_str())
            .filter(|cat| !cat.is_empty() && seen.insert(*cat))
            .map(str::to_string)
            .collect()
    }

    /// The category taxonomy nodes as loaded.
    pub fn taxonomy(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Distinct level names of the current courses, collection order.
    pub fn levels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.courses
            .iter()
            .map(|c| c.level.as_str())
            .filter(|level| !level.is_empty() && seen.insert(*level))
            .map(str::to_string)
            .collect()
    }

    /// Min, max, and mean effective price; all zero for an empty catalog.
    pub fn price_range(&self) -> PriceRange {
        if self.courses.is_empty() {
            return PriceRange {
                min: 0,
                max: 0,
                average: 0.0,
            };
        }

        let prices: Vec<u64> = self.courses.iter().map(Course::effective_price).collect();
        PriceRange {
            min: prices.iter().copied().min().unwrap_or(0),
            max: prices.iter().copied().max().unwrap_or(0),
            average: prices.iter().sum::<u64>() as f64 / prices.len() as f64,
        }
    }

    /// Distinct sub-categories with course counts, optionally scoped to
    /// one category. Counts follow first-seen order.
    pub fn sub_categories(&self, category: Option<&str>) -> Vec<SubCategoryCount> {
        let pool: Vec<&Course> = self
            .courses
            .iter()
            .filter(|c| category.is_none_or(|cat| c.category == cat))
            .collect();

        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for course in &pool {
            if let Some(sub) = course.sub_category.as_deref().filter(|s| !s.is_empty()) {
                if !counts.contains_key(sub) {
                    order.push(sub);
                }
                *counts.entry(sub).or_insert(0) += 1;
            }
        }

        order
            .into_iter()
            .map(|name| SubCategoryCount {
                name: name.to_string(),
                category: category.unwrap_or("all").to_string(),
                course_count: counts.get(name).copied().unwrap_or(0),
            })
            .collect()
    }

    /// An instructor with their full course list and aggregates.
    pub fn instructor_profile(&self, id: &str) -> Option<InstructorProfile> {
        let instructor = self.instructor(id)?;

        let courses: Vec<&Course> = self
            .courses
            .iter()
            .filter(|c| c.instructor_id == instructor.id)
            .collect();
        let reviews: Vec<&Review> = self
            .reviews
            .iter()
            .filter(|r| courses.iter().any(|c| c.id == r.course_id))
            .collect();

        Some(InstructorProfile {
            instructor: instructor.clone(),
            stats: InstructorStats {
                total_courses: courses.len(),
                total_students: courses.iter().map(|c| c.number_of_reviews).sum(),
                total_reviews: reviews.len(),
                average_rating: mean_rating(reviews.iter().map(|r| r.rating)),
            },
            courses: courses.iter().map(|c| self.enrich(c)).collect(),
        })
    }

    /// Every instructor with per-instructor roll-ups.
    pub fn instructors(&self) -> Vec<InstructorSummary> {
        self.instructors
            .iter()
            .map(|instructor| {
                let courses: Vec<&Course> = self
                    .courses
                    .iter()
                    .filter(|c| c.instructor_id == instructor.id)
                    .collect();
                let ratings = self
                    .reviews
                    .iter()
                    .filter(|r| courses.iter().any(|c| c.id == r.course_id))
                    .map(|r| r.rating);

                InstructorSummary {
                    instructor: instructor.clone(),
                    course_count: courses.len(),
                    total_students: courses.iter().map(|c| c.number_of_reviews).sum(),
                    average_rating: mean_rating(ratings),
                }
            })
            .collect()
    }

    /// Catalog-wide counters.
    pub fn stats(&self) -> CatalogStats {
        let total_reviews = self.reviews.len();
        let average_rating = mean_rating(self.reviews.iter().map(|r| r.rating));

        CatalogStats {
            total_courses: self.courses.len(),
            total_instructors: self.instructors.len(),
            total_students: self.courses.iter().map(|c| c.number_of_reviews).sum(),
            total_reviews,
            // One decimal, matching what the storefront displays.
            average_rating: (average_rating * 10.0).round() / 10.0,
            categories_count: self.categories().len(),
            featured_courses: self.courses.iter().filter(|c| c.is_bestseller).count(),
        }
    }

    /// Score every course against the normalized query, drop zero
    /// scores, and order by descending score (stable, so ties keep
    /// collection order). Empty normalized queries match nothing.
    fn ranked_by_relevance(&self, raw_query: &str) -> Vec<&Course> {
        let normalized = text::normalize(raw_query);
        if normalized.is_empty() {
            return Vec::new();
        }
        let terms: Vec<&str> = normalized.split_whitespace().collect();

        let mut scored: Vec<(u32, &Course)> = self
            .courses
            .iter()
            .map(|c| (text::search_score(c, &normalized, &terms), c))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by_key(|(score, _)| Reverse(*score));

        scored.into_iter().map(|(_, c)| c).collect()
    }

    fn instructor_or_placeholder(&self, id: &str) -> Instructor {
        self.instructor(id).cloned().unwrap_or_else(|| Instructor {
            id: id.to_string(),
            fullname: "Unknown Instructor".to_string(),
            avatar: PLACEHOLDER_INSTRUCTOR_AVATAR.to_string(),
            bio_snippet: "Instructor information not available.".to_string(),
        })
    }

    fn user_or_placeholder(&self, id: u64) -> User {
        self.user(id).cloned().unwrap_or_else(|| User {
            id,
            username: "unknown".to_string(),
            fullname: "Anonymous User".to_string(),
            avatar: PLACEHOLDER_USER_AVATAR.to_string(),
        })
    }
}

fn mean_rating(ratings: impl Iterator<Item = u8>) -> f64 {
    let (count, sum) = ratings.fold((0usize, 0u64), |(n, s), r| (n + 1, s + u64::from(r)));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
