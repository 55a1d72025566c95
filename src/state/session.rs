use tracing::{debug, warn};

use super::data::{Item, MediaAsset};
use crate::gallery::filter::{channel_options, visible_items, ChannelChoice, SortMode};
use crate::gallery::lightbox::{Lightbox, Playback};

/// UI state of one gallery session
///
/// Created with defaults on startup and mutated only through explicit user
/// actions. Nothing here is persisted. The item list itself is owned by the
/// application and passed in, so every derived view is recomputed from the
/// current state instead of being cached.
#[derive(Debug, Clone, Default)]
pub struct GallerySession {
    channel: ChannelChoice,
    sort: SortMode,
    lightbox: Lightbox,
}

impl GallerySession {
    pub fn new(autoplay_video: bool) -> Self {
        Self {
            channel: ChannelChoice::All,
            sort: SortMode::ManualOrder,
            lightbox: Lightbox::new(autoplay_video),
        }
    }

    pub fn channel(&self) -> &ChannelChoice {
        &self.channel
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// The filtered and sorted items currently shown in the grid
    pub fn visible<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        visible_items(items, &self.channel, self.sort)
    }

    /// "All" followed by every known channel
    pub fn channel_choices(&self, items: &[Item]) -> Vec<ChannelChoice> {
        std::iter::once(ChannelChoice::All)
            .chain(channel_options(items).into_iter().map(ChannelChoice::Channel))
            .collect()
    }

    pub fn set_channel(&mut self, items: &[Item], choice: ChannelChoice) {
        debug!(channel = %choice, "channel filter changed");
        self.rederive(items, |session| session.channel = choice);
    }

    pub fn set_sort(&mut self, items: &[Item], mode: SortMode) {
        debug!(sort = %mode, "sort mode changed");
        self.rederive(items, |session| session.sort = mode);
    }

    /// Open the lightbox at a visible index
    pub fn open(&mut self, items: &[Item], index: usize) {
        let visible = self.visible(items);
        if index >= visible.len() {
            warn!(index, visible = visible.len(), "ignoring open for a tile that is not visible");
            return;
        }
        debug!(item = %visible[index].id, "opening lightbox");
        self.lightbox.open(index, &visible);
    }

    pub fn close(&mut self) {
        self.lightbox.close();
    }

    pub fn next(&mut self, items: &[Item]) {
        let visible = self.visible(items);
        self.lightbox.next(&visible);
    }

    pub fn prev(&mut self, items: &[Item]) {
        let visible = self.visible(items);
        self.lightbox.prev(&visible);
    }

    pub fn jump_to(&mut self, items: &[Item], slide: usize) {
        let visible = self.visible(items);
        self.lightbox.jump_to(slide, &visible);
    }

    pub fn toggle_playing(&mut self) {
        self.lightbox.toggle_playing();
    }

    pub fn playback_finished(&mut self, session: u64) {
        self.lightbox.playback_finished(session);
    }

    /// Playback state of the active video slide, if any
    pub fn playback(&self) -> Option<&Playback> {
        self.lightbox.playback()
    }

    pub fn current_item<'a>(&self, items: &'a [Item]) -> Option<&'a Item> {
        self.lightbox.current_item(&self.visible(items))
    }

    pub fn current_slide<'a>(&self, items: &'a [Item]) -> Option<&'a MediaAsset> {
        self.lightbox.current_slide(&self.visible(items))
    }

    /// Keyboard navigation is bound only while the lightbox is open
    pub fn keyboard_bound(&self) -> bool {
        self.lightbox.is_open()
    }

    /// Apply a filter/sort change and keep the lightbox on the same item
    ///
    /// The active item is looked up again by id in the new visible list. If
    /// it is no longer visible the lightbox closes.
    fn rederive(&mut self, items: &[Item], change: impl FnOnce(&mut Self)) {
        let active_id = self
            .lightbox
            .current_item(&self.visible(items))
            .map(|item| item.id.clone());

        change(self);

        if !self.lightbox.is_open() {
            return;
        }

        let visible = self.visible(items);
        match active_id.and_then(|id| visible.iter().position(|item| item.id == id)) {
            Some(index) => self.lightbox.retarget(index, &visible),
            None => {
                debug!("active item filtered out, closing lightbox");
                self.lightbox.close();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::lightbox::LightboxState;

    fn items() -> Vec<Item> {
        vec![
            Item::new("a", "A")
                .with_order(1.0)
                .with_views(1)
                .with_channels(["Instagram"])
                .with_media(vec![MediaAsset::image("a1.jpg"), MediaAsset::image("a2.jpg")]),
            Item::new("b", "B")
                .with_order(2.0)
                .with_views(9)
                .with_channels(["TikTok"])
                .with_media(vec![MediaAsset::video("b.mp4")]),
            Item::new("c", "C")
                .with_order(3.0)
                .with_views(5)
                .with_channels(["instagram", "TikTok"])
                .with_media(vec![
                    MediaAsset::design("d1"),
                    MediaAsset::image("c.jpg"),
                    MediaAsset::design("d2"),
                ]),
        ]
    }

    #[test]
    fn test_defaults() {
        let session = GallerySession::new(true);
        assert_eq!(session.channel(), &ChannelChoice::All);
        assert_eq!(session.sort_mode(), SortMode::ManualOrder);
        assert!(!session.lightbox().is_open());
        assert!(!session.keyboard_bound());
    }

    #[test]
    fn test_channel_choices_start_with_all() {
        let items = items();
        let session = GallerySession::new(true);
        let choices: Vec<String> = session
            .channel_choices(&items)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(choices, ["All", "Instagram", "TikTok"]);
    }

    #[test]
    fn test_open_binds_keyboard_and_close_releases() {
        let items = items();
        let mut session = GallerySession::new(true);
        session.open(&items, 0);
        assert!(session.keyboard_bound());
        session.close();
        assert!(!session.keyboard_bound());
        session.open(&items, 2);
        session.close();
        assert!(!session.keyboard_bound());
    }

    #[test]
    fn test_open_outside_visible_list_is_ignored() {
        let items = items();
        let mut session = GallerySession::new(true);
        session.set_channel(&items, ChannelChoice::from_selection("TikTok"));
        session.open(&items, 2);
        assert!(!session.lightbox().is_open());
    }

    #[test]
    fn test_sort_change_follows_active_item() {
        let items = items();
        let mut session = GallerySession::new(true);
        session.open(&items, 0);
        session.next(&items);
        assert_eq!(session.current_item(&items).unwrap().id, "a");

        session.set_sort(&items, SortMode::ViewsDescending);
        // a now sits last (views 1) but stays active on the same slide
        assert_eq!(session.lightbox().state(), LightboxState::Open { item: 2, slide: 1 });
        assert_eq!(session.current_item(&items).unwrap().id, "a");
        assert_eq!(session.current_slide(&items).unwrap().url, "a2.jpg");
    }

    #[test]
    fn test_filter_change_closes_when_item_disappears() {
        let items = items();
        let mut session = GallerySession::new(true);
        session.open(&items, 1);
        assert_eq!(session.current_item(&items).unwrap().id, "b");

        session.set_channel(&items, ChannelChoice::from_selection("instagram"));
        assert!(!session.lightbox().is_open());
        assert!(!session.keyboard_bound());
    }

    #[test]
    fn test_filter_change_keeps_visible_item() {
        let items = items();
        let mut session = GallerySession::new(true);
        session.open(&items, 2);
        session.set_channel(&items, ChannelChoice::from_selection("TikTok"));
        assert_eq!(session.lightbox().active_item(), Some(1));
        assert_eq!(session.current_item(&items).unwrap().id, "c");
    }

    #[test]
    fn test_design_item_navigates_designs_only() {
        let items = items();
        let mut session = GallerySession::new(true);
        session.open(&items, 2);
        assert_eq!(session.current_slide(&items).unwrap().url, "d1");
        session.next(&items);
        assert_eq!(session.current_slide(&items).unwrap().url, "d2");
        session.next(&items);
        assert_eq!(session.current_slide(&items).unwrap().url, "d1");
        session.prev(&items);
        session.jump_to(&items, 0);
        assert_eq!(session.current_slide(&items).unwrap().url, "d1");
    }

    #[test]
    fn test_empty_filter_result() {
        let items = items();
        let mut session = GallerySession::new(true);
        session.set_channel(&items, ChannelChoice::from_selection("YouTube"));
        assert!(session.visible(&items).is_empty());
    }
}
