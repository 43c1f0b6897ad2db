//! Text normalization, slug derivation, and the search relevance score.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::model::Course;

/// Lowercase, strip diacritics (NFD decomposition, combining marks
/// removed), and trim surrounding whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Derive a URL-safe slug from a title: lowercase, diacritics stripped,
/// `đ` folded to `d`, runs of non-alphanumerics collapsed to single
/// hyphens with none at either end.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        // NFD does not decompose đ; it needs an explicit fold.
        let c = if c == 'đ' { 'd' } else { c };
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Additive relevance score of one course against a normalized query.
///
/// The weights are a behavioral contract, not a tunable: every consumer's
/// result ordering follows them, and reorderings here surface directly in
/// what callers see first.
///
/// - exact title match: +15
/// - title contains query: +10
/// - description contains query: +4
/// - per title word: starts with query +5, else contains it +3
/// - per query term (>= 2 chars): in title +4, in description +2
pub fn search_score(course: &Course, query: &str, terms: &[&str]) -> u32 {
    let title = normalize(&course.title);
    let desc = normalize(&course.description);

    let mut score = 0;

    if title == query {
        score += 15;
    }
    if title.contains(query) {
        score += 10;
    }
    if desc.contains(query) {
        score += 4;
    }

    for word in title.split_whitespace() {
        if word.starts_with(query) {
            score += 5;
        } else if word.contains(query) {
            score += 3;
        }
    }

    for term in terms {
        if term.chars().count() < 2 {
            continue;
        }
        if title.contains(term) {
            score += 4;
        }
        if desc.contains(term) {
            score += 2;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn course(title: &str, description: &str) -> Course {
        serde_json::from_value(serde_json::json!({
            "id": "x", "title": title, "description": description
        }))
        .unwrap()
    }

    #[test]
    fn normalize_strips_diacritics_and_case() {
        assert_eq!(normalize("  Phát triển Web  "), "phat trien web");
        assert_eq!(normalize("Tiếng Anh"), "tieng anh");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("Lập trình Web từ Zero!"), "lap-trinh-web-tu-zero");
        assert_eq!(slugify("Đàn Guitar -- cơ bản"), "dan-guitar-co-ban");
        assert_eq!(slugify("  C++ / Rust 101  "), "c-rust-101");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn exact_title_match_accumulates_every_rule() {
        // "web" as both full query and single term: 15 (exact) + 10
        // (contains) + 5 (word start) + 4 (term in title) = 34.
        let c = course("Web", "");
        assert_eq!(search_score(&c, "web", &["web"]), 34);
    }

    #[test]
    fn word_start_and_substring_weights() {
        // "web development basics": contains +10, word start +5, term +4.
        let a = course("Web Development Basics", "");
        assert_eq!(search_score(&a, "web", &["web"]), 19);

        // "advanced web" scores identically; the word "web" is still a
        // word-start match even though it is not the first word.
        let b = course("Advanced Web", "");
        assert_eq!(search_score(&b, "web", &["web"]), 19);

        // "webinar hosting": contains +10 and word-start +5 and term +4.
        let c = course("Webinar Hosting", "");
        assert_eq!(search_score(&c, "web", &["web"]), 19);

        // Mid-word substring only: "cobweb" contains but no word starts
        // with the query: 10 + 3 + 4 = 17.
        let d = course("Cobweb", "");
        assert_eq!(search_score(&d, "web", &["web"]), 17);
    }

    #[test]
    fn description_only_match() {
        let c = course("Cooking 101", "all about web cooking");
        // description contains +4, term in description +2.
        assert_eq!(search_score(&c, "web", &["web"]), 6);
        assert_eq!(search_score(&c, "pottery", &["pottery"]), 0);
    }

    #[test]
    fn short_terms_are_ignored_in_term_pass() {
        let c = course("C Programming", "");
        // Single-char query still matches title rules, but the term pass
        // skips terms under two chars.
        let with_term = search_score(&c, "c", &["c"]);
        let no_term = search_score(&c, "c", &[]);
        assert_eq!(with_term, no_term);
    }

    #[test]
    fn multi_term_queries_accumulate_per_term() {
        let c = course("Web Design Masterclass", "modern design for the web");
        let score = search_score(&c, "web design", &["web", "design"]);
        // title contains "web design" +10, no single word matches the
        // full query, description does not contain it contiguously,
        // terms: web in title +4 in desc +2, design in title +4 in
        // desc +2 = 22.
        assert_eq!(score, 22);
    }
}
