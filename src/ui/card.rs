use iced::widget::image::Handle;
use iced::widget::{button, column, container, pick_list, row, text, text_input, Image};
use iced::{Alignment, Degrees, Element, Length, Radians, Rotation};
use std::fmt;

use crate::state::{Category, Slot};

/// Side of the square image area on a card
const IMAGE_SIZE: f32 = 180.0;

/// Events raised by one card, tagged with the card's slot index
#[derive(Debug, Clone, PartialEq)]
pub enum CardEvent {
    /// Open the file picker for this slot's image
    PickImage,
    NameInput(String),
    CategorySelected(Option<Category>),
    Rotate,
    Delete,
    /// Pick this card up for reordering
    Grab,
    /// Drop the held card here, swapping the two
    DropHere,
}

/// Entry of the category picker, including "unassigned"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryChoice(pub Option<Category>);

impl CategoryChoice {
    pub fn options() -> Vec<CategoryChoice> {
        std::iter::once(CategoryChoice(None))
            .chain(Category::ALL.into_iter().map(|c| CategoryChoice(Some(c))))
            .collect()
    }
}

impl fmt::Display for CategoryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(category) => f.write_str(category.label()),
            None => f.write_str("선택하세요"),
        }
    }
}

/// Render the editable card for the slot at `index`
///
/// `name` is what the name field shows, which may be an edit that has not
/// been committed to the slot yet. `held` is the card currently picked up
/// for reordering, if any.
pub fn view<'a>(
    index: usize,
    slot: &'a Slot,
    name: &'a str,
    thumbnail: Option<&Handle>,
    held: Option<usize>,
) -> Element<'a, (usize, CardEvent)> {
    let header = row![
        text(format!("제품 {}", slot.id)).size(16).width(Length::Fill),
        reorder_button(index, held),
    ]
    .align_y(Alignment::Center)
    .spacing(6);

    let picture: Element<'a, (usize, CardEvent)> = match thumbnail {
        Some(handle) => {
            let radians = Radians::from(Degrees(slot.rotation.degrees() as f32));
            Image::new(handle.clone())
                .width(Length::Fixed(IMAGE_SIZE))
                .height(Length::Fixed(IMAGE_SIZE))
                .rotation(Rotation::Solid(radians))
                .into()
        }
        None if !slot.image.is_empty() => text("🌐 원격 이미지").into(),
        None => text("📷 이미지 선택").into(),
    };

    let image_area = button(
        container(picture)
            .width(Length::Fixed(IMAGE_SIZE))
            .height(Length::Fixed(IMAGE_SIZE))
            .center_x(Length::Fixed(IMAGE_SIZE))
            .center_y(Length::Fixed(IMAGE_SIZE)),
    )
    .style(button::text)
    .on_press((index, CardEvent::PickImage));

    let mut controls = row![].spacing(6);
    if !slot.image.is_empty() {
        controls = controls
            .push(button(text("↻")).on_press((index, CardEvent::Rotate)))
            .push(
                button(text("✕"))
                    .style(button::danger)
                    .on_press((index, CardEvent::Delete)),
            );
    }

    let name_input = text_input("제품명을 입력하세요", name)
        .on_input(move |value| (index, CardEvent::NameInput(value)))
        .width(Length::Fixed(IMAGE_SIZE));

    let category = row![
        text("카테고리").size(13),
        pick_list(
            CategoryChoice::options(),
            Some(CategoryChoice(slot.category)),
            move |choice: CategoryChoice| (index, CardEvent::CategorySelected(choice.0)),
        )
        .text_size(13),
    ]
    .align_y(Alignment::Center)
    .spacing(6);

    container(
        column![header, image_area, controls, name_input, category]
            .spacing(8)
            .align_x(Alignment::Center),
    )
    .padding(10)
    .style(container::rounded_box)
    .into()
}

/// "Pick up" button, or "drop here" while another card is held
fn reorder_button<'a>(index: usize, held: Option<usize>) -> Element<'a, (usize, CardEvent)> {
    match held {
        Some(from) if from == index => button(text("✋ 이동 중"))
            .style(button::primary)
            .on_press((index, CardEvent::Grab))
            .into(),
        Some(_) => button(text("⤵ 여기로"))
            .style(button::success)
            .on_press((index, CardEvent::DropHere))
            .into(),
        None => button(text("⇄"))
            .style(button::secondary)
            .on_press((index, CardEvent::Grab))
            .into(),
    }
}
