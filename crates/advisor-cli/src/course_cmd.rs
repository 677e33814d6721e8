//! `advisor course` command: look a course up by code or title.

use std::fmt::Write as _;

use anyhow::{Result, bail};

use advisor_core::catalog::{CatalogIndex, CourseCatalogEntry, Lookup, MatchTier};

/// Most title matches printed.
const MAX_MATCHES: usize = 10;

pub fn run_course(index: &CatalogIndex, query: &str) -> Result<()> {
    match render_lookup(index, query) {
        Some(text) => {
            print!("{text}");
            Ok(())
        }
        None => bail!("no course matches {query:?}"),
    }
}

/// Details for a code hit, a ranked list for title hits, `None` otherwise.
pub fn render_lookup(index: &CatalogIndex, query: &str) -> Option<String> {
    match index.lookup(query) {
        Lookup::Code(entry) => Some(render_entry(index, entry)),
        Lookup::Title(matches) => {
            let mut out = String::with_capacity(64 * matches.len().min(MAX_MATCHES));
            for hit in matches.iter().take(MAX_MATCHES) {
                let _ = writeln!(
                    out,
                    "{} - {} ({} credits) [{}]",
                    hit.entry.code,
                    hit.entry.title,
                    hit.entry.credits,
                    tier_label(hit.tier)
                );
            }
            if matches.len() > MAX_MATCHES {
                let _ = writeln!(out, "... and {} more", matches.len() - MAX_MATCHES);
            }
            Some(out)
        }
        Lookup::NotFound => None,
    }
}

fn render_entry(index: &CatalogIndex, entry: &CourseCatalogEntry) -> String {
    let mut out = String::with_capacity(256);
    let _ = writeln!(out, "{} - {}", entry.code, entry.title);
    let _ = writeln!(out, "Credits: {}", entry.credits);

    let prerequisite = index
        .prerequisite(&entry.code)
        .and_then(|p| p.display_text())
        .unwrap_or_else(|| "None".to_string());
    let _ = writeln!(out, "Prerequisites: {prerequisite}");

    if !entry.description.trim().is_empty() {
        let _ = writeln!(out, "\n{}", entry.description.trim());
    }
    out
}

fn tier_label(tier: MatchTier) -> String {
    match tier {
        MatchTier::Exact => "exact".to_string(),
        MatchTier::Substring => "substring".to_string(),
        MatchTier::AllWords => "all words".to_string(),
        MatchTier::Fuzzy(similarity) => format!("fuzzy {similarity:.2}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_test_utils::sample_catalog;

    #[test]
    fn code_lookup_shows_details() {
        let text = render_lookup(&sample_catalog(), "cs01101").unwrap();
        assert!(text.starts_with("CS 01101 - Data Structures\nCredits: 3\n"));
        assert!(text.contains("Prerequisites: CS 01100 and (MATH 01130 or MATH 01131)\n"));
    }

    #[test]
    fn title_lookup_ranks_matches() {
        let text = render_lookup(&sample_catalog(), "calculus").unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("MATH 01130 - Calculus I (4 credits)"));
        assert!(lines.iter().all(|l| l.ends_with("[substring]")));
    }

    #[test]
    fn unknown_query_is_none() {
        assert!(render_lookup(&sample_catalog(), "underwater basket weaving").is_none());
    }
}
