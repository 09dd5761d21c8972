use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, Image};
use iced::{Alignment, Element, Length, Theme};
use iced_aw::Wrap;
use std::collections::BTreeMap;

use crate::grid::Filter;
use crate::state::Slot;
use crate::viewer::{Bucket, Showcase, NO_IMAGE, NO_NAME, UNAVAILABLE_HINT, UNAVAILABLE_TITLE};

const CARD_IMAGE_SIZE: f32 = 220.0;

/// Render the viewer: category tabs above the selected section, or every
/// section stacked when the showcase is not tabbed
///
/// `thumbnails` maps product ids to decoded images.
pub fn view<'a>(showcase: &'a Showcase, thumbnails: &'a BTreeMap<usize, Handle>) -> Element<'a, Filter> {
    let Some(selected) = showcase.selected() else {
        return unavailable();
    };

    if !showcase.is_tabbed() {
        let sections = showcase
            .buckets()
            .iter()
            .fold(column![].spacing(28), |sections, bucket| {
                sections.push(section(bucket, thumbnails))
            });

        return column![
            text("제품 카탈로그").size(32),
            scrollable(sections).height(Length::Fill),
        ]
        .spacing(16)
        .padding(24)
        .into();
    }

    let tabs = showcase.buckets().iter().fold(row![].spacing(8), |tabs, bucket| {
        let style: fn(&Theme, button::Status) -> button::Style = if bucket.filter == selected.filter {
            button::primary
        } else {
            button::secondary
        };
        tabs.push(button(text(bucket.title())).style(style).on_press(bucket.filter))
    });

    column![
        text("제품 카탈로그").size(32),
        tabs,
        scrollable(section(selected, thumbnails)).height(Length::Fill),
    ]
    .spacing(16)
    .padding(24)
    .into()
}

/// A titled grid of product cards
fn section<'a>(bucket: &'a Bucket, thumbnails: &'a BTreeMap<usize, Handle>) -> Element<'a, Filter> {
    let cards: Vec<Element<'a, Filter>> = bucket
        .products
        .iter()
        .map(|product| product_card(product, thumbnails.get(&product.id)))
        .collect();

    column![text(bucket.title()).size(24), Wrap::with_elements(cards)]
        .spacing(12)
        .into()
}

fn product_card<'a>(product: &'a Slot, thumbnail: Option<&Handle>) -> Element<'a, Filter> {
    let picture: Element<'a, Filter> = match thumbnail {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fixed(CARD_IMAGE_SIZE))
            .height(Length::Fixed(CARD_IMAGE_SIZE))
            .into(),
        None => text(NO_IMAGE).into(),
    };

    let name = if product.name.trim().is_empty() {
        NO_NAME
    } else {
        product.name.as_str()
    };

    container(
        column![
            container(picture)
                .center_x(Length::Fixed(CARD_IMAGE_SIZE))
                .center_y(Length::Fixed(CARD_IMAGE_SIZE)),
            text(name).size(16),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
    .padding(10)
    .style(container::rounded_box)
    .into()
}

/// Fixed message shown when there is no catalog to display
fn unavailable<'a>() -> Element<'a, Filter> {
    container(
        column![
            text(UNAVAILABLE_TITLE).size(28),
            text(UNAVAILABLE_HINT).size(16),
        ]
        .spacing(10)
        .align_x(Alignment::Center),
    )
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}
