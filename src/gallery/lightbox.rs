/// Lightbox controller
///
/// Owns the open/closed state, the active item (an index into the
/// *visible* list) and the active slide (an index into that item's slide
/// set). Every method takes the current visible list so slide counts are
/// always derived from fresh data instead of being cached.
use crate::gallery::slides::slides_for;
use crate::state::data::{Item, MediaAsset, MediaKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open { item: usize, slide: usize },
}

/// Playback state of the active video slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    /// Slide identity the state belongs to
    pub url: String,
    /// Decoder session; a new one starts whenever a video slide becomes active
    pub session: u64,
    pub playing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    state: LightboxState,
    playback: Option<Playback>,
    autoplay: bool,
    sessions: u64,
}

impl Lightbox {
    pub fn new(autoplay: bool) -> Self {
        Self {
            state: LightboxState::Closed,
            playback: None,
            autoplay,
            sessions: 0,
        }
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state(), LightboxState::Open { .. })
    }

    pub fn active_item(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open { item, .. } => Some(item),
            LightboxState::Closed => None,
        }
    }

    pub fn active_slide(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open { slide, .. } => Some(slide),
            LightboxState::Closed => None,
        }
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    /// Open at `item`, always starting from the first slide
    pub fn open(&mut self, item: usize, visible: &[&Item]) {
        self.state = LightboxState::Open { item, slide: 0 };
        self.sync_playback(visible);
    }

    pub fn close(&mut self) {
        self.state = LightboxState::Closed;
        self.playback = None;
    }

    pub fn next(&mut self, visible: &[&Item]) {
        self.step(visible, |slide, n| (slide + 1) % n);
    }

    pub fn prev(&mut self, visible: &[&Item]) {
        self.step(visible, |slide, n| (slide + n - 1) % n);
    }

    /// Jump to `slide`; out-of-range targets are ignored
    pub fn jump_to(&mut self, slide: usize, visible: &[&Item]) {
        let LightboxState::Open { item, .. } = self.state else {
            return;
        };
        if slide < self.slide_count(visible) {
            self.state = LightboxState::Open { item, slide };
            self.sync_playback(visible);
        }
    }

    /// Point the open lightbox at another visible index without resetting the slide
    ///
    /// Used when the visible list is re-derived and the active item moved.
    /// The slide index is clamped to the item's slide set.
    pub fn retarget(&mut self, item: usize, visible: &[&Item]) {
        let LightboxState::Open { slide, .. } = self.state else {
            return;
        };
        let n = visible.get(item).map(|it| slides_for(it).len()).unwrap_or(0);
        let slide = if n == 0 { 0 } else { slide.min(n - 1) };
        self.state = LightboxState::Open { item, slide };
        self.sync_playback(visible);
    }

    pub fn current_item<'a>(&self, visible: &[&'a Item]) -> Option<&'a Item> {
        self.active_item().and_then(|i| visible.get(i).copied())
    }

    /// Slide set of the active item, empty when closed
    pub fn slides<'a>(&self, visible: &[&'a Item]) -> Vec<&'a MediaAsset> {
        self.current_item(visible).map(slides_for).unwrap_or_default()
    }

    pub fn slide_count(&self, visible: &[&Item]) -> usize {
        self.slides(visible).len()
    }

    /// The slide to render, `None` if closed or the index no longer exists
    pub fn current_slide<'a>(&self, visible: &[&'a Item]) -> Option<&'a MediaAsset> {
        let slide = self.active_slide()?;
        self.slides(visible).get(slide).copied()
    }

    pub fn toggle_playing(&mut self) {
        if let Some(playback) = self.playback.as_mut() {
            playback.playing = !playback.playing;
        }
    }

    /// The decoder reached the end of the video and rewound; wait for play
    pub fn playback_finished(&mut self, session: u64) {
        if let Some(playback) = self.playback.as_mut().filter(|p| p.session == session) {
            playback.playing = false;
        }
    }

    fn step(&mut self, visible: &[&Item], advance: impl Fn(usize, usize) -> usize) {
        let LightboxState::Open { item, slide } = self.state else {
            return;
        };
        let n = self.slide_count(visible);
        if n == 0 {
            return;
        }
        self.state = LightboxState::Open {
            item,
            slide: advance(slide.min(n - 1), n),
        };
        self.sync_playback(visible);
    }

    /// Playback follows the slide identity: a new video url starts fresh
    fn sync_playback(&mut self, visible: &[&Item]) {
        match self.current_slide(visible) {
            Some(asset) if asset.kind == MediaKind::Video => {
                let same = self
                    .playback
                    .as_ref()
                    .is_some_and(|p| p.url == asset.url);
                if !same {
                    self.sessions += 1;
                    self.playback = Some(Playback {
                        url: asset.url.clone(),
                        session: self.sessions,
                        playing: self.autoplay,
                    });
                }
            }
            _ => self.playback = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_slides() -> Item {
        Item::new("p", "Post").with_media(vec![
            MediaAsset::image("1.jpg"),
            MediaAsset::image("2.jpg"),
            MediaAsset::video("3.mp4"),
        ])
    }

    #[test]
    fn test_starts_closed() {
        let lightbox = Lightbox::new(true);
        assert_eq!(lightbox.state(), LightboxState::Closed);
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_next_wraps_to_first_slide() {
        let item = three_slides();
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        lightbox.jump_to(2, &visible);
        assert_eq!(lightbox.active_slide(), Some(2));

        lightbox.next(&visible);
        assert_eq!(lightbox.active_slide(), Some(0));
    }

    #[test]
    fn test_prev_wraps_to_last_slide() {
        let item = three_slides();
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        lightbox.prev(&visible);
        assert_eq!(lightbox.active_slide(), Some(2));
    }

    #[test]
    fn test_n_steps_return_to_start() {
        let item = three_slides();
        let visible = vec![&item];
        for start in 0..3 {
            let mut lightbox = Lightbox::new(false);
            lightbox.open(0, &visible);
            lightbox.jump_to(start, &visible);
            for _ in 0..3 {
                lightbox.next(&visible);
            }
            assert_eq!(lightbox.active_slide(), Some(start));
            lightbox.next(&visible);
            lightbox.prev(&visible);
            assert_eq!(lightbox.active_slide(), Some(start));
        }
    }

    #[test]
    fn test_open_resets_slide() {
        let first = three_slides();
        let second = three_slides();
        let visible = vec![&first, &second];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        lightbox.next(&visible);
        lightbox.open(1, &visible);
        assert_eq!(lightbox.state(), LightboxState::Open { item: 1, slide: 0 });
        lightbox.next(&visible);
        lightbox.open(1, &visible);
        assert_eq!(lightbox.active_slide(), Some(0));
    }

    #[test]
    fn test_jump_out_of_range_is_ignored() {
        let item = three_slides();
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        lightbox.jump_to(1, &visible);
        lightbox.jump_to(3, &visible);
        assert_eq!(lightbox.active_slide(), Some(1));
    }

    #[test]
    fn test_navigation_on_empty_slide_set_is_noop() {
        let item = Item::new("empty", "Empty");
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        lightbox.next(&visible);
        lightbox.prev(&visible);
        lightbox.jump_to(0, &visible);
        assert_eq!(lightbox.state(), LightboxState::Open { item: 0, slide: 0 });
        assert!(lightbox.current_slide(&visible).is_none());
    }

    #[test]
    fn test_navigation_when_closed_is_noop() {
        let item = three_slides();
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.next(&visible);
        lightbox.jump_to(1, &visible);
        assert_eq!(lightbox.state(), LightboxState::Closed);
    }

    #[test]
    fn test_stale_item_index_renders_nothing() {
        let item = three_slides();
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        let shrunk: Vec<&Item> = Vec::new();
        assert!(lightbox.current_slide(&shrunk).is_none());
        lightbox.next(&shrunk);
        assert_eq!(lightbox.active_slide(), Some(0));
    }

    #[test]
    fn test_close_from_any_state() {
        let item = three_slides();
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.close();
        assert!(!lightbox.is_open());
        lightbox.open(0, &visible);
        lightbox.close();
        assert_eq!(lightbox.state(), LightboxState::Closed);
        assert!(lightbox.playback().is_none());
    }

    #[test]
    fn test_video_playback_follows_slide_identity() {
        let item = three_slides();
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        assert!(lightbox.playback().is_none());

        lightbox.prev(&visible);
        let playback = lightbox.playback().cloned().unwrap();
        assert_eq!(playback.url, "3.mp4");
        assert!(playback.playing);

        lightbox.toggle_playing();
        assert!(!lightbox.playback().unwrap().playing);
        assert_eq!(lightbox.playback().unwrap().session, playback.session);

        // Leaving and coming back restarts playback in a new decoder session
        lightbox.next(&visible);
        assert!(lightbox.playback().is_none());
        lightbox.prev(&visible);
        let again = lightbox.playback().unwrap();
        assert!(again.playing);
        assert_ne!(again.session, playback.session);
    }

    #[test]
    fn test_video_url_change_starts_new_session() {
        let item = Item::new("v", "V").with_media(vec![
            MediaAsset::video("a.mp4"),
            MediaAsset::video("b.mp4"),
        ]);
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        let first = lightbox.playback().cloned().unwrap();
        assert_eq!(first.url, "a.mp4");

        lightbox.next(&visible);
        let second = lightbox.playback().cloned().unwrap();
        assert_eq!(second.url, "b.mp4");
        assert_ne!(second.session, first.session);

        // Jumping onto the slide that is already active keeps the decoder
        lightbox.jump_to(1, &visible);
        assert_eq!(lightbox.playback().unwrap().session, second.session);
    }

    #[test]
    fn test_playback_finished_pauses_matching_session_only() {
        let item = Item::new("v", "V").with_media(vec![MediaAsset::video("clip.mp4")]);
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        let session = lightbox.playback().unwrap().session;

        lightbox.playback_finished(session + 1);
        assert!(lightbox.playback().unwrap().playing);
        lightbox.playback_finished(session);
        assert!(!lightbox.playback().unwrap().playing);
    }

    #[test]
    fn test_autoplay_disabled_starts_paused() {
        let item = Item::new("v", "V").with_media(vec![MediaAsset::video("clip.mp4")]);
        let visible = vec![&item];
        let mut lightbox = Lightbox::new(false);
        lightbox.open(0, &visible);
        assert!(!lightbox.playback().unwrap().playing);
    }

    #[test]
    fn test_retarget_clamps_slide() {
        let big = three_slides();
        let small = Item::new("s", "S").with_media(vec![MediaAsset::image("only.jpg")]);
        let visible = vec![&big, &small];
        let mut lightbox = Lightbox::new(true);
        lightbox.open(0, &visible);
        lightbox.jump_to(2, &visible);
        lightbox.retarget(1, &visible);
        assert_eq!(lightbox.state(), LightboxState::Open { item: 1, slide: 0 });
    }
}
