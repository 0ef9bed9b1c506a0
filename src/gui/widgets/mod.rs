use iced::{
    Color, ContentFit, Element, Length, Theme, border,
    widget::{button, container, container::Style, image, row, scrollable, text},
};
use iced_widget::container::bordered_box;

const REPORT_HEIGHT: f32 = 100.0;
const REPORT_FONT_SIZE: f32 = 12.0;

fn image_frame(theme: &Theme) -> Style {
    bordered_box(theme).border(border::width(2).color(Color::BLACK))
}

/// Bordered display area; empty when nothing is loaded
pub fn image_panel<'a, Message: 'a>(handle: Option<&image::Handle>) -> Element<'a, Message> {
    let content: Element<'a, Message> = match handle {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => text("").width(Length::Fill).height(Length::Fill).into(),
    };

    container(content)
        .style(image_frame)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Read-only report text
pub fn report_panel<'a, Message: 'a>(report: &'a str) -> Element<'a, Message> {
    container(scrollable(text(report).size(REPORT_FONT_SIZE)).width(Length::Fill))
        .style(bordered_box)
        .padding(4)
        .width(Length::Fill)
        .height(Length::Fixed(REPORT_HEIGHT))
        .into()
}

/// A button that is greyed out unless `message` is set
pub fn action_button<'a, Message: Clone + 'a>(
    label: &'a str,
    message: Option<Message>,
) -> Element<'a, Message> {
    button(text(label))
        .on_press_maybe(message)
        .width(Length::Fill)
        .into()
}

pub fn button_row<'a, Message: 'a>(
    buttons: impl IntoIterator<Item = Element<'a, Message>>,
) -> Element<'a, Message> {
    row(buttons).spacing(10).width(Length::Fill).into()
}
