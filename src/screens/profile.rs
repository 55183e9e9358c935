use iced::widget::container::bordered_box;
use iced::widget::{Container, column, text};
use iced::Length;

use crate::app::{App, Message};

pub fn profile_screen(app: &App) -> Container<Message> {
    let content = match &app.current_user {
        Some(user) => {
            let role = if user.is_superuser {
                "администратор".to_string()
            } else {
                user.role.clone().unwrap_or_else(|| "не указана".to_string())
            };
            column![
                text(format!("Имя: {}", user)).size(24),
                text(format!("Почта: {}", user.email)).size(24),
                text(format!("Роль: {}", role)).size(24),
            ]
            .spacing(10)
        }
        None => column![text("Данные пользователя недоступны.").size(20)].spacing(10),
    };

    let user_info_widget = Container::new(content)
        .style(move |_| bordered_box(&app.theme))
        .width(Length::Fill)
        .padding(10);
    Container::new(user_info_widget)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(20)
}
