use std::collections::HashMap;

use iced::alignment::{Horizontal, Vertical};
use iced::keyboard::{self, key::Named, Key};
use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, row, text, Column, Space, Stack,
};
use iced::{Background, Border, Color, ContentFit, Element, Length};

use super::{badge, fill, MediaState, VideoScreen};
use crate::gallery::lightbox::Playback;
use crate::state::data::{Item, MediaAsset, MediaKind};
use crate::state::session::GallerySession;
use crate::{LightboxMessage, Message};

const PANEL_MAX_WIDTH: f32 = 900.0;

/// Keyboard binding, subscribed only while the lightbox is open
pub fn on_key(key: Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    let action = match key {
        Key::Named(Named::Escape) => LightboxMessage::Close,
        Key::Named(Named::ArrowRight) => LightboxMessage::Next,
        Key::Named(Named::ArrowLeft) => LightboxMessage::Prev,
        _ => return None,
    };
    Some(Message::Lightbox(action))
}

/// Modal overlay for the active item; nothing when closed
pub fn view<'a>(
    session: &GallerySession,
    items: &'a [Item],
    loaded: &'a HashMap<String, MediaState>,
    video: Option<&'a VideoScreen>,
    fullscreen: bool,
) -> Option<Element<'a, Message>> {
    let lightbox = session.lightbox();
    if !lightbox.is_open() {
        return None;
    }

    let visible = session.visible(items);
    let slides = lightbox.slides(&visible);
    let active = lightbox.active_slide().unwrap_or(0);

    let mut layers: Vec<Element<'a, Message>> = vec![match lightbox.current_slide(&visible) {
        Some(slide) => slide_view(slide, loaded, lightbox.playback(), video, fullscreen),
        None => Space::new(Length::Fill, Length::Fill).into(),
    }];

    if slides.len() > 1 {
        layers.push(arrows());
        layers.push(dots(slides.len(), active));
    }

    let mut panel: Column<'a, Message> = column![Stack::with_children(layers)
        .width(Length::Fill)
        .height(Length::Fill)];

    if let Some(alt) = session
        .current_item(items)
        .and_then(|item| item.alt_text.as_deref())
    {
        panel = panel.push(
            container(text(alt).size(14).color(Color::WHITE))
                .padding([12, 14])
                .width(Length::Fill),
        );
    }

    let panel = container(panel)
        .max_width(PANEL_MAX_WIDTH)
        .height(Length::Fill)
        .clip(true)
        .style(fill(Color::BLACK));

    let backdrop = container(center(opaque(panel)).padding(40))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(fill(Color::from_rgba(0.0, 0.0, 0.0, 0.8)));

    Some(
        mouse_area(backdrop)
            .on_press(Message::Lightbox(LightboxMessage::Close))
            .into(),
    )
}

fn slide_view<'a>(
    slide: &'a MediaAsset,
    loaded: &'a HashMap<String, MediaState>,
    playback: Option<&Playback>,
    video: Option<&'a VideoScreen>,
    fullscreen: bool,
) -> Element<'a, Message> {
    match slide.kind {
        MediaKind::Image => match loaded.get(&slide.url) {
            Some(MediaState::Ready(handle)) => image(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            Some(MediaState::Failed) => message("Could not load image"),
            _ => message("Loading…"),
        },
        MediaKind::Video => video_view(slide, playback, video),
        MediaKind::EmbeddedDesign => design_view(slide, fullscreen),
    }
}

fn video_view<'a>(
    slide: &'a MediaAsset,
    playback: Option<&Playback>,
    video: Option<&'a VideoScreen>,
) -> Element<'a, Message> {
    // Playback and frames belong to the slide url; anything else is stale
    let Some(playback) = playback.filter(|p| p.url == slide.url) else {
        return message("Loading video…");
    };
    let screen = video.filter(|v| v.session == playback.session);

    let picture: Element<'a, Message> = match screen {
        Some(VideoScreen {
            error: Some(error), ..
        }) => message(error),
        Some(VideoScreen {
            frame: Some(frame), ..
        }) => image(frame.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        _ => message("Loading video…"),
    };

    let controls = container(
        button(text(if playback.playing { "Pause" } else { "Play" }))
            .on_press(Message::Lightbox(LightboxMessage::TogglePlayback)),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .align_x(Horizontal::Right)
    .align_y(Vertical::Top)
    .padding(10);

    Stack::with_children([picture, controls.into()])
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn design_view<'a>(slide: &'a MediaAsset, fullscreen: bool) -> Element<'a, Message> {
    let actions = row![
        button(text(if fullscreen { "Exit fullscreen" } else { "Fullscreen" }))
            .on_press(Message::Lightbox(LightboxMessage::ToggleFullscreen)),
        button(text("Copy link"))
            .on_press(Message::Lightbox(LightboxMessage::CopyLink(slide.url.clone()))),
    ]
    .spacing(8);

    center(
        column![
            badge("design".to_string()),
            text(slide.url.as_str()).size(12).color(Color::from_rgb8(0xAA, 0xAA, 0xAA)),
            actions,
        ]
        .spacing(12)
        .align_x(Horizontal::Center),
    )
    .into()
}

fn message<'a>(label: &'a str) -> Element<'a, Message> {
    center(text(label).size(14).color(Color::WHITE)).into()
}

fn arrows<'a>() -> Element<'a, Message> {
    let arrow = |label: &'a str, action: LightboxMessage| {
        button(center(text(label).size(28)))
            .width(40)
            .height(40)
            .on_press(Message::Lightbox(action))
    };

    container(
        row![
            arrow("‹", LightboxMessage::Prev),
            Space::with_width(Length::Fill),
            arrow("›", LightboxMessage::Next),
        ]
        .align_y(Vertical::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .align_y(Vertical::Center)
    .padding(10)
    .into()
}

fn dots<'a>(count: usize, active: usize) -> Element<'a, Message> {
    let dots = (0..count).fold(row![].spacing(6), |dots, index| {
        let color = if index == active {
            Color::WHITE
        } else {
            Color::from_rgba(1.0, 1.0, 1.0, 0.4)
        };
        dots.push(
            button(Space::new(8, 8))
                .padding(0)
                .style(move |_theme, _status| button::Style {
                    background: Some(Background::Color(color)),
                    border: Border {
                        radius: 999.0.into(),
                        ..Border::default()
                    },
                    ..button::Style::default()
                })
                .on_press(Message::Lightbox(LightboxMessage::JumpTo(index))),
        )
    });

    container(dots)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Horizontal::Center)
        .align_y(Vertical::Bottom)
        .padding(10)
        .into()
}
