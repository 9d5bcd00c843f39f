//! Plain-text rendering of an accepted batch.
//!
//! The output is deterministic: same items in the same order give the same
//! bytes, which keeps mail bodies diffable and tests exact.

use crate::models::AcceptedItem;
use crate::utils::item_count;
use std::fmt::Write;

const SEPARATOR: &str = "----------------------------------";

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

/// Render `items` into a subject and body.
///
/// `greeting_name` personalizes the salutation line when set.
pub fn render(items: &[AcceptedItem], greeting_name: Option<&str>) -> Report {
    let subject = format!("New announcements: {}", item_count(items.len()));

    let mut body = String::new();
    match greeting_name {
        Some(name) => writeln!(body, "Hello {name},").unwrap(),
        None => writeln!(body, "Hello,").unwrap(),
    }
    writeln!(body).unwrap();
    writeln!(body, "New announcements found ({}):", item_count(items.len())).unwrap();
    writeln!(body).unwrap();

    for item in items {
        writeln!(body, "{SEPARATOR}").unwrap();
        writeln!(body, "Title    : {}", item.title).unwrap();
        writeln!(body, "Category : {}", item.category).unwrap();
        writeln!(body, "Source   : {}", item.source_id).unwrap();
        writeln!(body, "Date     : {}", item.date).unwrap();
        writeln!(body, "Link     : {}", item.link).unwrap();
    }

    writeln!(body).unwrap();
    writeln!(body, "Please verify from official websites.").unwrap();

    Report { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn item(title: &str, category: Category, source: &str) -> AcceptedItem {
        AcceptedItem {
            title: title.to_string(),
            category,
            source_id: source.to_string(),
            date: "18-10-2026".to_string(),
            link: format!("https://{}.example/x", source.to_lowercase()),
        }
    }

    #[test]
    fn test_render_full_report() {
        let items = vec![
            item("XYZ Board Result 2024 Out", Category::Result, "ResultBharat"),
            item("XYZ Board Admit Card 2024 Released", Category::AdmitCard, "RojgarResult"),
        ];
        let report = render(&items, Some("Bhanu"));

        assert_eq!(report.subject, "New announcements: 2 items");
        let expected = "Hello Bhanu,\n\
\n\
New announcements found (2 items):\n\
\n\
----------------------------------\n\
Title    : XYZ Board Result 2024 Out\n\
Category : Result\n\
Source   : ResultBharat\n\
Date     : 18-10-2026\n\
Link     : https://resultbharat.example/x\n\
----------------------------------\n\
Title    : XYZ Board Admit Card 2024 Released\n\
Category : Admit Card\n\
Source   : RojgarResult\n\
Date     : 18-10-2026\n\
Link     : https://rojgarresult.example/x\n\
\n\
Please verify from official websites.\n";
        assert_eq!(report.body, expected);
    }

    #[test]
    fn test_render_single_item_without_name() {
        let items = vec![item("SSC CGL Recruitment", Category::LatestJob, "FreeJobAlert")];
        let report = render(&items, None);
        assert_eq!(report.subject, "New announcements: 1 item");
        assert!(report.body.starts_with("Hello,\n"));
        assert!(report.body.contains("Category : Latest Job\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let items = vec![item("A title long enough", Category::Result, "S")];
        assert_eq!(render(&items, None), render(&items, None));
    }
}
