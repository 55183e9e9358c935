use iced::widget::{Container, Row, button, column, text, vertical_space};
use iced::{Alignment, Element, Length, Renderer, Theme};
use iced_font_awesome::fa_icon_solid;

use crate::app::{App, Message};

fn icon_button_content<'a>(
    icon_element: impl Into<Element<'a, Message, Theme, Renderer>>,
    label: &'a str,
) -> Row<'a, Message> {
    Row::new()
        .align_y(Alignment::Center)
        .spacing(5)
        .push(icon_element)
        .push(text(label))
}

pub fn nav_menu(app: &App) -> Container<Message> {
    let is_admin = app
        .current_user
        .as_ref()
        .is_some_and(|user| user.is_admin());

    let content_for_admin = column![
        button(icon_button_content(
            fa_icon_solid("calendar-days").style(move |_| text::base(&app.theme)),
            "Расписание"
        ))
        .on_press(Message::GoToSchedule)
        .width(Length::Fill),
        button(icon_button_content(
            fa_icon_solid("magnifying-glass").style(move |_| text::base(&app.theme)),
            "Просмотр"
        ))
        .on_press(Message::GoToScheduleView)
        .width(Length::Fill),
        button(icon_button_content(
            fa_icon_solid("folder-open").style(move |_| text::base(&app.theme)),
            "Поиск"
        ))
        .on_press(Message::GoToSearch)
        .width(Length::Fill),
        button(icon_button_content(
            fa_icon_solid("address-card").style(move |_| text::base(&app.theme)),
            "Профиль"
        ))
        .on_press(Message::GoToProfile)
        .width(Length::Fill),
        vertical_space(),
        button(icon_button_content(
            fa_icon_solid("gear").style(move |_| text::base(&app.theme)),
            "Настройки"
        ))
        .on_press(Message::GoToSettings)
        .width(Length::Fill),
        button(icon_button_content(
            fa_icon_solid("arrow-right-from-bracket").style(move |_| text::base(&app.theme)),
            "Выход"
        ))
        .on_press(Message::Logout)
        .width(Length::Fill),
    ]
    .spacing(10);

    let content_for_user = column![
        button(icon_button_content(
            fa_icon_solid("calendar-days").style(move |_| text::base(&app.theme)),
            "Моё расписание"
        ))
        .on_press(Message::GoToScheduleView)
        .width(Length::Fill),
        button(icon_button_content(
            fa_icon_solid("address-card").style(move |_| text::base(&app.theme)),
            "Профиль"
        ))
        .on_press(Message::GoToProfile)
        .width(Length::Fill),
        vertical_space(),
        button(icon_button_content(
            fa_icon_solid("gear").style(move |_| text::base(&app.theme)),
            "Настройки"
        ))
        .on_press(Message::GoToSettings)
        .width(Length::Fill),
        button(icon_button_content(
            fa_icon_solid("arrow-right-from-bracket").style(move |_| text::base(&app.theme)),
            "Выход"
        ))
        .on_press(Message::Logout)
        .width(Length::Fill),
    ]
    .spacing(10);

    if is_admin {
        Container::new(content_for_admin)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(10)
    } else {
        Container::new(content_for_user)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(10)
    }
}
