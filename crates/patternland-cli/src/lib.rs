use std::fmt::Write as _;

use patternland_core::models::{PatternPublic, PatternsPublic, UsersPublic};
use patternland_core::pagination::total_pages;
use patternland_core::Page;
use patternland_services::{Notifier, PatternFileEntry};
use serde::Serialize;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{}", out);
    Ok(())
}

/// Prints notifications to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }
}

/// Render one page of patterns. `owned` marks rows belonging to the caller.
pub fn pattern_table(list: &PatternsPublic, page: Page, owned: &[bool]) -> String {
    let mut out = String::new();
    let pages = total_pages(list.count, page.size).max(1);
    let _ = writeln!(
        out,
        "Patterns: {} total (page {} of {})",
        list.count, page.number, pages
    );

    if list.data.is_empty() {
        let _ = writeln!(out, "\nNo patterns found.");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<36} {:<30} {:<10} {:<8} {:<12} {:<14} {:>4} {:<5}",
        "ID", "Title", "Brand", "Version", "For", "Category", "Diff", ""
    );
    let _ = writeln!(out, "{}", "-".repeat(126));

    for (i, pattern) in list.data.iter().enumerate() {
        let badge = if owned.get(i).copied().unwrap_or(false) {
            "Yours"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:<36} {:<30} {:<10} {:<8} {:<12} {:<14} {:>4} {:<5}",
            pattern.id,
            truncate_string(&pattern.title, 30),
            pattern.brand.to_string(),
            pattern.version.to_string(),
            pattern.for_who.to_string(),
            truncate_string(pattern.category_label(), 14),
            pattern.difficulty,
            badge
        );
    }

    if page.has_next(list.count) {
        let _ = writeln!(out, "\n... (more patterns, use --page {})", page.next().number);
    }
    out
}

/// Render a single pattern with its optional fields.
pub fn pattern_details(pattern: &PatternPublic) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", pattern.title, pattern.id);
    let _ = writeln!(out, "  Brand:      {}", pattern.brand);
    let _ = writeln!(out, "  Version:    {}", pattern.version);
    let _ = writeln!(out, "  For:        {}", pattern.for_who);
    let _ = writeln!(out, "  Category:   {}", pattern.category_label());
    let _ = writeln!(out, "  Difficulty: {}", pattern.difficulty);
    if let Some(ref fabric) = pattern.fabric {
        match pattern.fabric_amount {
            Some(amount) => {
                let _ = writeln!(out, "  Fabric:     {} ({} m)", fabric, amount);
            }
            None => {
                let _ = writeln!(out, "  Fabric:     {}", fabric);
            }
        }
    }
    if let Some(ref url) = pattern.pattern_url {
        let _ = writeln!(out, "  URL:        {}", url);
    }
    if let Some(ref description) = pattern.description {
        let _ = writeln!(out, "\n  {}", description);
    }
    out
}

/// Render the files view: one line per slot with its download name.
pub fn files_table(entries: &[PatternFileEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<24} {}",
            entry.label,
            entry.file_id.as_deref().unwrap_or("not available")
        );
    }
    out
}

pub fn users_table(list: &UsersPublic) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Users: {} total", list.count);
    let _ = writeln!(
        out,
        "\n{:<36} {:<32} {:<24} {:<6} {:<8}",
        "ID", "Email", "Full name", "Admin", "Status"
    );
    let _ = writeln!(out, "{}", "-".repeat(110));
    for user in &list.data {
        let _ = writeln!(
            out,
            "{:<36} {:<32} {:<24} {:<6} {:<8}",
            user.id,
            truncate_string(&user.email, 32),
            truncate_string(user.full_name.as_deref().unwrap_or("N/A"), 24),
            if user.is_superuser { "yes" } else { "no" },
            if user.is_active { "Active" } else { "Inactive" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use patternland_core::models::FileSlot;
    use serde_json::json;

    fn patterns(count: u64, titles: &[&str]) -> PatternsPublic {
        let data = titles
            .iter()
            .map(|title| {
                serde_json::from_value(json!({
                    "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
                    "owner_id": "7f9619ff-8b86-d011-b42d-00cf4fc964ff",
                    "title": title,
                    "description": null,
                    "brand": "Fibre Mood",
                    "version": "Paper",
                    "pattern_url": null,
                    "for_who": "Kids",
                    "category": "T-shirts",
                    "difficulty": 3,
                    "fabric": "Jersey",
                    "fabric_amount": 1.5
                }))
                .unwrap()
            })
            .collect();
        PatternsPublic { data, count }
    }

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_exact() {
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("ab", 2), "ab");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_multibyte() {
        assert_eq!(truncate_string("Robe d'été fleurie", 10), "Robe d'...");
    }

    #[test]
    fn pattern_table_marks_owned_rows() {
        let list = patterns(12, &["Tee Shirt", "Wrap Dress"]);
        let out = pattern_table(&list, Page::new(1, 10), &[true, false]);

        assert!(out.starts_with("Patterns: 12 total (page 1 of 2)"));
        let rows: Vec<&str> = out.lines().filter(|l| l.contains("Fibre Mood")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Tee Shirt") && rows[0].trim_end().ends_with("Yours"));
        assert!(!rows[1].contains("Yours"));
        assert!(out.contains("use --page 2"));
    }

    #[test]
    fn pattern_table_empty() {
        let out = pattern_table(&patterns(0, &[]), Page::default(), &[]);
        assert!(out.contains("page 1 of 1"));
        assert!(out.contains("No patterns found."));
    }

    #[test]
    fn details_and_files() {
        let list = patterns(1, &["Tee Shirt"]);
        let details = pattern_details(&list.data[0]);
        assert!(details.contains("Category:   T-shirts"));
        assert!(details.contains("Jersey (1.5 m)"));

        let files = files_table(&[PatternFileEntry {
            slot: FileSlot::A4,
            label: FileSlot::A4.label(),
            file_id: None,
        }]);
        assert!(files.contains("not available"));
    }
}
