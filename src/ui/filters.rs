use iced::widget::{button, pick_list, row, text, Space};
use iced::{Alignment, Element, Length};

use crate::gallery::filter::{ChannelChoice, SortMode};
use crate::Message;

/// "3 posts", "1 post"
pub fn post_count_label(count: usize) -> String {
    format!("{} post{}", count, if count == 1 { "" } else { "s" })
}

/// Channel picker, sort picker, visible count and catalog button
pub fn view<'a>(
    choices: Vec<ChannelChoice>,
    selected: &ChannelChoice,
    sort: SortMode,
    visible_count: usize,
) -> Element<'a, Message> {
    let channel = pick_list(choices, Some(selected.clone()), Message::ChannelSelected)
        .text_size(14)
        .padding([6, 10]);

    let sort = pick_list(&SortMode::ALL[..], Some(sort), Message::SortSelected)
        .text_size(14)
        .padding([6, 10]);

    row![
        text("Channel").size(14),
        channel,
        text(post_count_label(visible_count)).size(12),
        Space::with_width(Length::Fill),
        text("Sort by").size(14),
        sort,
        button(text("Open catalog…").size(14))
            .on_press(Message::OpenCatalog)
            .padding([6, 10]),
    ]
    .spacing(8)
    .padding([8, 8])
    .align_y(Alignment::Center)
    .into()
}
