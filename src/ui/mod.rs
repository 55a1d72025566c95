/// UI module
///
/// iced views for the gallery window:
/// - Channel and sort pickers (filters.rs)
/// - The tile grid (grid.rs)
/// - The lightbox overlay and its keyboard binding (lightbox.rs)

pub mod filters;
pub mod grid;
pub mod lightbox;

use iced::widget::{container, image, text};
use iced::{Border, Color, Element};

use crate::Message;

/// Load state of a fetched image, keyed by url in the app
#[derive(Debug, Clone)]
pub enum MediaState {
    Loading,
    Ready(image::Handle),
    Failed,
}

/// What the lightbox shows for the active video slide
#[derive(Debug, Clone)]
pub struct VideoScreen {
    /// Playback session the frames belong to
    pub session: u64,
    pub frame: Option<image::Handle>,
    pub error: Option<String>,
}

impl VideoScreen {
    pub fn new(session: u64) -> Self {
        Self {
            session,
            frame: None,
            error: None,
        }
    }
}

/// Small white-on-dark label used for badges and counters
pub fn badge<'a>(label: String) -> Element<'a, Message> {
    container(text(label).size(12).color(Color::WHITE))
        .padding([2, 6])
        .style(|_theme| container::Style {
            background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
            border: Border {
                radius: 4.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

/// Solid background fill
pub fn fill(color: Color) -> impl Fn(&iced::Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(color.into()),
        ..container::Style::default()
    }
}
