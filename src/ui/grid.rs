use std::collections::HashMap;

use iced::alignment::{Horizontal, Vertical};
use iced::widget::{container, image, mouse_area, scrollable, text, tooltip, Space, Stack};
use iced::{mouse, Color, ContentFit, Element, Length};
use iced_aw::Wrap;

use super::{badge, fill, MediaState};
use crate::config::GridConfig;
use crate::gallery::tile::{cover_for, slide_counter, tile_height, TileCover};
use crate::state::data::Item;
use crate::Message;

const EMPTY_MESSAGE: &str = "No posts for this channel yet.";

/// Placeholder text shown instead of tiles, `None` when there is something to show
pub fn empty_message(visible: &[&Item]) -> Option<&'static str> {
    visible.is_empty().then_some(EMPTY_MESSAGE)
}

/// One 4:5 tile per visible item, in visible order
pub fn view<'a>(
    visible: &[&'a Item],
    thumbnails: &'a HashMap<String, MediaState>,
    grid: &GridConfig,
) -> Element<'a, Message> {
    if let Some(message) = empty_message(visible) {
        return container(text(message).size(14))
            .padding(12)
            .width(Length::Fill)
            .into();
    }

    let tiles: Vec<Element<'a, Message>> = visible
        .iter()
        .enumerate()
        .map(|(index, item)| tile(index, item, thumbnails, grid.tile_width))
        .collect();

    scrollable(
        container(
            Wrap::with_elements(tiles)
                .spacing(grid.spacing)
                .line_spacing(grid.spacing),
        )
        .padding([8, 2]),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn tile<'a>(
    index: usize,
    item: &'a Item,
    thumbnails: &'a HashMap<String, MediaState>,
    width: f32,
) -> Element<'a, Message> {
    let cover = cover_for(item);

    let mut layers: Vec<Element<'a, Message>> = vec![cover_layer(cover, thumbnails)];

    if let Some(label) = cover.badge() {
        layers.push(corner(badge(label.to_string()), Horizontal::Right));
    }
    if let Some(count) = slide_counter(item) {
        layers.push(corner(badge(format!("{count} ▶")), Horizontal::Left));
    }

    let body = container(
        Stack::with_children(layers)
            .width(Length::Fill)
            .height(Length::Fill),
    )
    .width(Length::Fixed(width))
    .height(Length::Fixed(tile_height(width)))
    .clip(true)
    .style(fill(Color::from_rgb8(0xEE, 0xEE, 0xEE)));

    let clickable = mouse_area(body)
        .on_press(Message::TileActivated(index))
        .interaction(mouse::Interaction::Pointer);

    tooltip(
        clickable,
        container(text(item.title.as_str()).size(12)).padding(4),
        tooltip::Position::Bottom,
    )
    .style(container::rounded_box)
    .into()
}

fn cover_layer<'a>(
    cover: TileCover<'a>,
    thumbnails: &'a HashMap<String, MediaState>,
) -> Element<'a, Message> {
    match cover {
        TileCover::Image(url) => thumbnail(url, thumbnails, Color::from_rgb8(0xEE, 0xEE, 0xEE)),
        // First decoded frame; tiles never play
        TileCover::Video(url) => thumbnail(url, thumbnails, Color::BLACK),
        TileCover::Design => placeholder(Color::from_rgb8(0x11, 0x11, 0x11)),
        TileCover::Empty => Space::new(Length::Fill, Length::Fill).into(),
    }
}

fn thumbnail<'a>(
    url: &str,
    thumbnails: &'a HashMap<String, MediaState>,
    fallback: Color,
) -> Element<'a, Message> {
    match thumbnails.get(url) {
        Some(MediaState::Ready(handle)) => image(handle.clone())
            .content_fit(ContentFit::Cover)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        _ => placeholder(fallback),
    }
}

fn placeholder<'a>(color: Color) -> Element<'a, Message> {
    container(Space::new(Length::Fill, Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(fill(color))
        .into()
}

fn corner<'a>(content: Element<'a, Message>, side: Horizontal) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(side)
        .align_y(Vertical::Top)
        .padding(6)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::filter::ChannelChoice;
    use crate::state::session::GallerySession;

    #[test]
    fn test_empty_channel_shows_placeholder() {
        let items = vec![
            Item::new("a", "A").with_channels(["Instagram"]),
            Item::new("b", "B").with_channels(["TikTok"]),
        ];
        let mut session = GallerySession::new(true);
        assert_eq!(empty_message(&session.visible(&items)), None);

        session.set_channel(&items, ChannelChoice::from_selection("YouTube"));
        assert_eq!(
            empty_message(&session.visible(&items)),
            Some("No posts for this channel yet.")
        );
    }

    #[test]
    fn test_no_items_shows_placeholder() {
        assert_eq!(empty_message(&[]), Some(EMPTY_MESSAGE));
    }
}
