use crate::Message;
use iced::{
    font,
    widget::{
        button, center, column, container, horizontal_space, image as img, mouse_area, opaque,
        row, scrollable, stack, text, Column,
    },
    Alignment, Color, Element, Font, Length,
};
use material_preview::{
    overlay::{NoticeKind, ParagraphBlock, SlideView},
    ContentArea, PreviewOverlay, RasterDocument,
};

/// Render `content` above `base`, closing on clicks outside of it.
pub fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| {
                container::Style {
                    background: Some(
                        Color {
                            a: 0.8,
                            ..Color::BLACK
                        }
                        .into(),
                    ),
                    ..container::Style::default()
                }
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}

pub fn view<'a, D: RasterDocument>(
    overlay: &'a PreviewOverlay<D>,
    page: Option<&'a img::Handle>,
) -> Element<'a, Message> {
    let labels = overlay.labels();

    let header = row![
        text(overlay.title().unwrap_or_default()).size(18),
        horizontal_space(),
        button(text(labels.close())).on_press(Message::ClosePreview),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let body: Element<'a, Message> = match overlay.content() {
        ContentArea::Blank => horizontal_space().into(),
        ContentArea::Loading => center(text(labels.loading())).into(),
        ContentArea::Page(_) => match page {
            Some(handle) => scrollable(
                container(img(handle.clone()).width(Length::Shrink)).center_x(Length::Fill),
            )
            .height(Length::Fill)
            .into(),
            None => center(text(labels.loading())).into(),
        },
        ContentArea::Paragraphs(blocks) => scrollable(paragraphs(blocks))
            .height(Length::Fill)
            .into(),
        ContentArea::Slide(slide) => scrollable(slide_view(slide)).height(Length::Fill).into(),
        ContentArea::Notice(notice) => {
            let message = text(notice.text.as_str());
            let message = match notice.kind {
                NoticeKind::Error => message.style(text::danger),
                NoticeKind::Empty => message.style(text::secondary),
            };
            center(message).into()
        }
    };

    let navigation = overlay.navigation();
    let mut footer = row![].spacing(10).align_y(Alignment::Center);
    if navigation.visible {
        footer = footer.push(
            button(text(labels.previous()))
                .on_press_maybe(navigation.prev_enabled.then_some(Message::PreviousUnit)),
        );
    }
    footer = footer.push(horizontal_space());
    footer = footer.push(text(overlay.page_info()));
    footer = footer.push(horizontal_space());
    if navigation.visible {
        footer = footer.push(
            button(text(labels.next()))
                .on_press_maybe(navigation.next_enabled.then_some(Message::NextUnit)),
        );
    }

    container(column![header, body, footer].spacing(12))
        .padding(20)
        .max_width(960)
        .max_height(820)
        .style(container::rounded_box)
        .into()
}

fn paragraphs(blocks: &[ParagraphBlock]) -> Element<'_, Message> {
    let bold = Font {
        weight: font::Weight::Bold,
        ..Font::DEFAULT
    };
    Column::with_children(blocks.iter().map(|block| {
        if block.heading {
            text(block.text.as_str()).size(18).font(bold).into()
        } else {
            text(block.text.as_str()).size(14).into()
        }
    }))
    .spacing(8)
    .padding(20)
    .into()
}

fn slide_view(slide: &SlideView) -> Element<'_, Message> {
    let mut content = column![text(slide.title.as_str()).size(24)]
        .spacing(15)
        .padding(40)
        .align_x(Alignment::Center);
    match &slide.placeholder {
        Some(placeholder) => {
            content = content.push(text(placeholder.as_str()).style(text::secondary));
        }
        None => {
            for block in &slide.blocks {
                content = content.push(text(block.as_str()).size(16));
            }
        }
    }
    content.into()
}
