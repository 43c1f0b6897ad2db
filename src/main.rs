//! Syllabus - course catalog queries from the command line
//!
//! Thin consumer of the catalog index: loads the snapshot directory once,
//! runs a single query, and prints a table or JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing_subscriber::EnvFilter;

use syllabus::catalog::query::{QueryOptions, SortKey};
use syllabus::catalog::views::CourseWithInstructor;
use syllabus::CatalogIndex;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "syllabus",
    about = "Query a course catalog snapshot: search, filter, and inspect",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Directory containing the snapshot JSON files
    #[clap(long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Output results as JSON instead of tables
    #[clap(long, global = true)]
    json: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// List courses with filters, sorting, and pagination
    List {
        /// Free-text query (restricts candidates by relevance)
        #[clap(short, long)]
        query: Option<String>,

        /// Exact category filter
        #[clap(long)]
        category: Option<String>,

        /// Exact level filter
        #[clap(long)]
        level: Option<String>,

        /// Inclusive minimum effective price
        #[clap(long)]
        min_price: Option<u64>,

        /// Inclusive maximum effective price
        #[clap(long)]
        max_price: Option<u64>,

        /// Minimum rating
        #[clap(long)]
        rating: Option<f64>,

        /// Sort key: title, price, price_desc, rating, reviews, popularity, date
        #[clap(long, default_value = "title")]
        sort: SortKey,

        /// 1-indexed page
        #[clap(long, default_value_t = 1)]
        page: usize,

        /// Page size
        #[clap(long, default_value_t = 12)]
        limit: usize,
    },

    /// Relevance-ranked free-text search
    Search {
        query: String,
    },

    /// Show full detail for one course
    Show {
        id: String,
    },

    /// Show bestsellers and top-rated courses
    Featured {
        #[clap(long, default_value_t = 8)]
        limit: usize,
    },

    /// List distinct categories and the taxonomy
    Categories,

    /// List distinct course levels
    Levels,

    /// List instructors with their roll-up stats
    Instructors,

    /// Show one instructor with their courses
    Instructor {
        id: String,
    },

    /// Show catalog-wide statistics
    Stats,
}

#[derive(Tabled)]
struct CourseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Price")]
    price: u64,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Reviews")]
    reviews: u64,
    #[tabled(rename = "Instructor")]
    instructor: String,
}

impl From<&CourseWithInstructor> for CourseRow {
    fn from(item: &CourseWithInstructor) -> Self {
        Self {
            id: item.course.id.clone(),
            title: item.course.title.clone(),
            category: item.course.category.clone(),
            level: item.course.level.clone(),
            price: item.course.effective_price(),
            rating: format!("{:.1}", item.course.rating),
            reviews: item.course.number_of_reviews,
            instructor: item.instructor.fullname.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level.to_filter_directive()))
        .with_writer(std::io::stderr)
        .init();

    let index = CatalogIndex::load(&cli.data_dir).with_context(|| {
        format!(
            "failed to load catalog snapshots from {}",
            cli.data_dir.display()
        )
    })?;

    match cli.command {
        Command::List {
            query,
            category,
            level,
            min_price,
            max_price,
            rating,
            sort,
            page,
            limit,
        } => {
            let opts = QueryOptions {
                q: query,
                category,
                level,
                min_price,
                max_price,
                min_rating: rating,
                page: Some(page),
                limit: Some(limit),
                sort: Some(sort),
            };
            let result = index.get_courses(&opts);
            if cli.json {
                print_json(&result)?;
            } else {
                print_course_table(&result.courses);
                println!(
                    "page {}/{} ({} courses)",
                    result.pagination.current_page,
                    result.pagination.total_pages,
                    result.pagination.total_courses
                );
            }
        }

        Command::Search { query } => {
            let results = index.search(&query, &QueryOptions::default());
            if cli.json {
                print_json(&results)?;
            } else if results.is_empty() {
                println!("no courses match {query:?}");
            } else {
                print_course_table(&results);
            }
        }

        Command::Show { id } => {
            let Some(details) = index.course_details(&id) else {
                bail!("course {id:?} not found");
            };
            if cli.json {
                print_json(&details)?;
            } else {
                println!("{} — {}", details.course.id, details.course.title);
                println!("  category: {} / level: {}", details.course.category, details.course.level);
                println!("  instructor: {}", details.instructor.fullname);
                println!(
                    "  price: {} (effective {})",
                    details.course.price,
                    details.course.effective_price()
                );
                println!(
                    "  {} reviews, average {:.1}",
                    details.stats.total_reviews, details.stats.average_rating
                );
                if !details.related_courses.is_empty() {
                    println!("  related:");
                    for related in &details.related_courses {
                        println!("    {} — {}", related.course.id, related.course.title);
                    }
                }
            }
        }

        Command::Featured { limit } => {
            let results = index.featured(limit);
            if cli.json {
                print_json(&results)?;
            } else {
                print_course_table(&results);
            }
        }

        Command::Categories => {
            if cli.json {
                print_json(&index.taxonomy())?;
            } else {
                for name in index.categories() {
                    match index.category_by_name(&name) {
                        Some(node) => println!("{} {}", node.icon, name),
                        None => println!("{name}"),
                    }
                }
            }
        }

        Command::Levels => {
            let levels = index.levels();
            if cli.json {
                print_json(&levels)?;
            } else {
                for level in levels {
                    println!("{level}");
                }
            }
        }

        Command::Instructors => {
            let summaries = index.instructors();
            if cli.json {
                print_json(&summaries)?;
            } else {
                #[derive(Tabled)]
                struct InstructorRow {
                    #[tabled(rename = "ID")]
                    id: String,
                    #[tabled(rename = "Name")]
                    name: String,
                    #[tabled(rename = "Courses")]
                    courses: usize,
                    #[tabled(rename = "Students")]
                    students: u64,
                    #[tabled(rename = "Avg rating")]
                    rating: String,
                }

                let rows: Vec<InstructorRow> = summaries
                    .iter()
                    .map(|s| InstructorRow {
                        id: s.instructor.id.clone(),
                        name: s.instructor.fullname.clone(),
                        courses: s.course_count,
                        students: s.total_students,
                        rating: format!("{:.1}", s.average_rating),
                    })
                    .collect();
                print_table(rows);
            }
        }

        Command::Instructor { id } => {
            let Some(profile) = index.instructor_profile(&id) else {
                bail!("instructor {id:?} not found");
            };
            if cli.json {
                print_json(&profile)?;
            } else {
                println!("{} — {}", profile.instructor.id, profile.instructor.fullname);
                println!("  {}", profile.instructor.bio_snippet);
                println!(
                    "  {} courses, {} students, {} reviews, average {:.1}",
                    profile.stats.total_courses,
                    profile.stats.total_students,
                    profile.stats.total_reviews,
                    profile.stats.average_rating
                );
                print_course_table(&profile.courses);
            }
        }

        Command::Stats => {
            let stats = index.stats();
            if cli.json {
                print_json(&stats)?;
            } else {
                println!("courses:      {}", stats.total_courses);
                println!("instructors:  {}", stats.total_instructors);
                println!("students:     {}", stats.total_students);
                println!("reviews:      {}", stats.total_reviews);
                println!("avg rating:   {:.1}", stats.average_rating);
                println!("categories:   {}", stats.categories_count);
                println!("bestsellers:  {}", stats.featured_courses);
            }
        }
    }

    Ok(())
}

fn print_course_table(courses: &[CourseWithInstructor]) {
    let rows: Vec<CourseRow> = courses.iter().map(CourseRow::from).collect();
    print_table(rows);
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    if rows.is_empty() {
        println!("(no results)");
        return;
    }
    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    println!("{table}");
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
