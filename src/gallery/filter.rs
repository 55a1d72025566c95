use std::collections::HashSet;
use std::fmt;

use crate::state::data::Item;

/// Label of the "no filter" choice
pub const ALL_CHANNELS: &str = "All";

/// Channel selected in the filter bar
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelChoice {
    #[default]
    All,
    Channel(String),
}

impl ChannelChoice {
    /// Interpret a raw selection; empty or "All" means no filter
    pub fn from_selection(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CHANNELS {
            ChannelChoice::All
        } else {
            ChannelChoice::Channel(value.to_string())
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ChannelChoice::All => true,
            ChannelChoice::Channel(channel) => item.has_channel(channel),
        }
    }
}

impl fmt::Display for ChannelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelChoice::All => f.write_str(ALL_CHANNELS),
            ChannelChoice::Channel(channel) => f.write_str(channel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    ManualOrder,
    ViewsDescending,
    EngagementsDescending,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [
        SortMode::ManualOrder,
        SortMode::ViewsDescending,
        SortMode::EngagementsDescending,
    ];
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortMode::ManualOrder => "Default (Order)",
            SortMode::ViewsDescending => "Views ↓",
            SortMode::EngagementsDescending => "Engagements ↓",
        })
    }
}

/// Derive the visible list from the full item list
///
/// Returns references into `items` so the caller sees the very same items;
/// the input is never reordered. All sorts are stable.
pub fn visible_items<'a>(items: &'a [Item], channel: &ChannelChoice, sort: SortMode) -> Vec<&'a Item> {
    let mut visible: Vec<&Item> = items.iter().filter(|item| channel.matches(item)).collect();

    match sort {
        SortMode::ManualOrder => {
            visible.sort_by(|a, b| a.display_order.total_cmp(&b.display_order));
        }
        SortMode::ViewsDescending => {
            visible.sort_by(|a, b| {
                b.view_count
                    .unwrap_or(0)
                    .cmp(&a.view_count.unwrap_or(0))
                    .then_with(|| a.display_order.total_cmp(&b.display_order))
            });
        }
        SortMode::EngagementsDescending => {
            visible.sort_by(|a, b| {
                b.engagement_count
                    .unwrap_or(0)
                    .cmp(&a.engagement_count.unwrap_or(0))
                    .then_with(|| a.display_order.total_cmp(&b.display_order))
            });
        }
    }

    visible
}

/// Channels offered in the filter bar
///
/// De-duplicated ignoring case, displayed with the first-seen casing and
/// sorted alphabetically (case-insensitive).
pub fn channel_options(items: &[Item]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for channel in items.iter().flat_map(|item| item.channels.iter()) {
        if seen.insert(channel.to_lowercase()) {
            options.push(channel.clone());
        }
    }

    options.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Item> {
        vec![
            Item::new("a", "A").with_order(3.0).with_views(5).with_channels(["Instagram"]),
            Item::new("b", "B").with_order(1.0).with_views(50).with_channels(["tiktok", "instagram"]),
            Item::new("c", "C").with_order(2.0).with_engagements(7),
            Item::new("d", "D").with_order(2.0).with_views(5).with_channels(["TikTok"]),
        ]
    }

    fn ids(items: &[&Item]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_all_shows_untagged_items() {
        let items = sample();
        let visible = visible_items(&items, &ChannelChoice::All, SortMode::ManualOrder);
        assert_eq!(visible.len(), 4);
        assert!(visible.iter().any(|i| i.id == "c"));
    }

    #[test]
    fn test_channel_filter_ignores_case() {
        let items = sample();
        let choice = ChannelChoice::from_selection("INSTAGRAM");
        let visible = visible_items(&items, &choice, SortMode::ManualOrder);
        assert_eq!(ids(&visible), ["b", "a"]);
        assert!(visible.iter().all(|i| i.has_channel("instagram")));
    }

    #[test]
    fn test_unknown_channel_gives_empty_list() {
        let items = sample();
        let choice = ChannelChoice::from_selection("YouTube");
        assert!(visible_items(&items, &choice, SortMode::ManualOrder).is_empty());
    }

    #[test]
    fn test_empty_and_all_selection_mean_no_filter() {
        assert_eq!(ChannelChoice::from_selection(""), ChannelChoice::All);
        assert_eq!(ChannelChoice::from_selection("All"), ChannelChoice::All);
        assert_eq!(
            ChannelChoice::from_selection("Instagram"),
            ChannelChoice::Channel("Instagram".to_string())
        );
    }

    #[test]
    fn test_manual_order_is_stable_on_ties() {
        let items = sample();
        let visible = visible_items(&items, &ChannelChoice::All, SortMode::ManualOrder);
        // c and d share order 2.0 and keep their list order
        assert_eq!(ids(&visible), ["b", "c", "d", "a"]);
    }

    #[test]
    fn test_views_descending_breaks_ties_by_order() {
        let items = sample();
        let visible = visible_items(&items, &ChannelChoice::All, SortMode::ViewsDescending);
        // a and d both have 5 views, d has the lower order; c has no views
        assert_eq!(ids(&visible), ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_engagements_treat_missing_as_zero() {
        let items = sample();
        let visible = visible_items(&items, &ChannelChoice::All, SortMode::EngagementsDescending);
        assert_eq!(ids(&visible), ["c", "b", "d", "a"]);
    }

    #[test]
    fn test_views_and_order_scenario() {
        let items = vec![
            Item::new("x", "X").with_order(2.0).with_views(10),
            Item::new("y", "Y").with_order(1.0).with_views(30),
        ];
        let by_views = visible_items(&items, &ChannelChoice::All, SortMode::ViewsDescending);
        assert_eq!(by_views[0].view_count, Some(30));
        assert_eq!(by_views[1].view_count, Some(10));

        let by_order = visible_items(&items, &ChannelChoice::All, SortMode::ManualOrder);
        assert_eq!(by_order[0].display_order, 1.0);
        assert_eq!(by_order[1].display_order, 2.0);
    }

    #[test]
    fn test_visible_items_are_the_same_objects() {
        let items = sample();
        let first = visible_items(&items, &ChannelChoice::All, SortMode::ViewsDescending);
        let second = visible_items(&items, &ChannelChoice::All, SortMode::ViewsDescending);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert!(std::ptr::eq(*a, *b));
        }
        // Input untouched
        assert_eq!(items[0].id, "a");
    }

    #[test]
    fn test_channel_options_dedup_first_seen_casing() {
        let items = sample();
        assert_eq!(channel_options(&items), ["Instagram", "tiktok"]);
    }

    #[test]
    fn test_channel_options_empty_without_tags() {
        let items = vec![Item::new("a", "A")];
        assert!(channel_options(&items).is_empty());
    }
}
