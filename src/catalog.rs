// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::model::Channel;

/// Label of the option that lifts the category restriction.
pub const ALL_CATEGORIES: &str = "All Categories";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    /// Filter value; empty for "all categories".
    pub value: String,
    pub label: String,
}

/// Channels whose name contains `search_term` (case-insensitive) and whose
/// category equals `category`. Empty inputs do not restrict. Input order is kept.
pub fn filter<'a>(catalog: &'a [Channel], search_term: &str, category: &str) -> Vec<&'a Channel> {
    let term = search_term.to_lowercase();

    catalog
        .iter()
        .filter(|ch| term.is_empty() || ch.name.to_lowercase().contains(&term))
        .filter(|ch| category.is_empty() || ch.category.as_deref() == Some(category))
        .collect()
}

/// Selector options: "All Categories" followed by each distinct non-empty
/// category in order of first appearance.
pub fn category_options(catalog: &[Channel]) -> Vec<CategoryOption> {
    let mut options = vec![CategoryOption {
        value: String::new(),
        label: ALL_CATEGORIES.to_string(),
    }];

    for category in catalog.iter().filter_map(Channel::category_name) {
        if !options.iter().skip(1).any(|o| o.value == category) {
            options.push(CategoryOption {
                value: category.to_string(),
                label: category.to_string(),
            });
        }
    }

    options
}

/// The channel `direction` steps away from `selected` within `visible`.
///
/// Returns `None` when nothing is selected, the selection is filtered out, or
/// the step would leave the list.
pub fn adjacent<'a>(
    visible: &[&'a Channel],
    selected: Option<&str>,
    direction: isize,
) -> Option<&'a Channel> {
    let selected = selected?;
    let current = visible.iter().position(|ch| ch.name == selected)?;
    let next = current.checked_add_signed(direction)?;
    visible.get(next).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, category: Option<&str>) -> Channel {
        Channel {
            name: name.to_string(),
            logo: None,
            category: category.map(str::to_string),
            stream_url: format!("https://example.com/{}.m3u8", name),
            epg_id: None,
        }
    }

    fn catalog() -> Vec<Channel> {
        vec![
            channel("BBC News", Some("News")),
            channel("Euronews", Some("News")),
            channel("NASA Live", Some("Science")),
            channel("Test Stream", Some("Test")),
            channel("Unsorted", None),
        ]
    }

    fn names<'a>(channels: &[&'a Channel]) -> Vec<&'a str> {
        channels.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let catalog = catalog();
        let filtered = filter(&catalog, "", "");
        assert_eq!(filtered.len(), catalog.len());
        assert!(filtered.iter().zip(&catalog).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = catalog();
        assert_eq!(names(&filter(&catalog, "NEWS", "")), vec!["BBC News", "Euronews"]);
        assert_eq!(names(&filter(&catalog, "live", "")), vec!["NASA Live"]);
    }

    #[test]
    fn test_category_is_exact() {
        let catalog = catalog();
        assert_eq!(names(&filter(&catalog, "", "News")), vec!["BBC News", "Euronews"]);
        assert!(filter(&catalog, "", "news").is_empty());
    }

    #[test]
    fn test_predicates_are_anded() {
        let catalog = catalog();
        assert_eq!(names(&filter(&catalog, "euro", "News")), vec!["Euronews"]);
        assert!(filter(&catalog, "nasa", "News").is_empty());
    }

    #[test]
    fn test_filter_result_is_ordered_subsequence() {
        let catalog = catalog();
        for term in ["", "e", "s", "news", "zzz"] {
            for category in ["", "News", "Science", "Test"] {
                let filtered = filter(&catalog, term, category);
                let positions = filtered
                    .iter()
                    .map(|f| catalog.iter().position(|c| c == *f).unwrap());
                let mut last = None;
                for pos in positions {
                    assert!(last.is_none_or(|l| pos > l));
                    last = Some(pos);
                }
                for ch in &filtered {
                    assert!(ch.name.to_lowercase().contains(term));
                    if !category.is_empty() {
                        assert_eq!(ch.category.as_deref(), Some(category));
                    }
                }
            }
        }
    }

    #[test]
    fn test_category_options_first_occurrence_order() {
        let options = category_options(&catalog());
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec![ALL_CATEGORIES, "News", "Science", "Test"]);
        assert_eq!(options[0].value, "");
    }

    #[test]
    fn test_category_options_skip_empty() {
        let catalog = vec![channel("A", Some("")), channel("B", None)];
        assert_eq!(category_options(&catalog).len(), 1);
    }

    #[test]
    fn test_adjacent_moves_within_visible() {
        let catalog = catalog();
        let visible = filter(&catalog, "", "News");
        assert_eq!(
            adjacent(&visible, Some("BBC News"), 1).map(|c| c.name.as_str()),
            Some("Euronews")
        );
        assert_eq!(
            adjacent(&visible, Some("Euronews"), -1).map(|c| c.name.as_str()),
            Some("BBC News")
        );
    }

    #[test]
    fn test_adjacent_stops_at_edges() {
        let catalog = catalog();
        let visible = filter(&catalog, "", "");
        assert!(adjacent(&visible, Some("BBC News"), -1).is_none());
        assert!(adjacent(&visible, Some("Unsorted"), 1).is_none());
    }

    #[test]
    fn test_adjacent_requires_visible_selection() {
        let catalog = catalog();
        let visible = filter(&catalog, "", "News");
        assert!(adjacent(&visible, None, 1).is_none());
        assert!(adjacent(&visible, Some("NASA Live"), 1).is_none());
    }
}
