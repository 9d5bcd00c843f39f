//! Keyword categorization of announcement titles.

use crate::models::Category;

/// Map a raw title to its category.
///
/// Case-insensitive substring rules, first match wins:
/// "answer key" > "result" > "admit" / "hall ticket" > everything else.
/// A title mentioning both a result and an admit card is a `Result`.
pub fn categorize(raw_title: &str) -> Category {
    let t = raw_title.to_lowercase();
    if t.contains("answer key") {
        Category::AnswerKey
    } else if t.contains("result") {
        Category::Result
    } else if t.contains("admit") || t.contains("hall ticket") {
        Category::AdmitCard
    } else {
        Category::LatestJob
    }
}
