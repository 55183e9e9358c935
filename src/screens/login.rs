use iced::{Center, Length, widget::{Container, button, column, text, text_input, vertical_space}};

use crate::app::{App, Message};

pub fn login_screen(app: &App) -> Container<Message> {
    // Второй шаг: сервер выслал код подтверждения на почту
    if let Some(email) = &app.awaiting_two_factor {
        let content = column![
            text("Подтверждение входа").size(30),
            vertical_space(),
            text(format!("Код отправлен на {}", email)).size(16),
            text_input("Код из письма", &app.login_code)
                .on_input(Message::LoginCodeChanged)
                .padding(10)
                .size(18)
                .width(Length::Fixed(350.0)),
            button("Подтвердить")
                .on_press(Message::LoginPressed)
                .padding(10),
            if let Some(notice) = &app.login_notice {
                text(notice).size(16)
            } else {
                text("")
            },
            text(&app.error_message).size(18),
            vertical_space(),
            button("Назад ко входу").on_press(Message::Logout).padding(10),
        ]
        .spacing(15)
        .width(Length::Fill)
        .align_x(Center);

        return Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(40);
    }

    let content = column![
        text("Вход").size(30),
        vertical_space(),
        text_input("Почта", &app.login_email)
            .on_input(Message::LoginEmailChanged)
            .padding(10)
            .size(18)
            .width(Length::Fixed(350.0)),
        text_input("Пароль", &app.login_password)
            .on_input(Message::LoginPasswordChanged)
            .padding(10)
            .size(18)
            .secure(true)
            .width(Length::Fixed(350.0)),
        button("Войти")
            .on_press(Message::LoginPressed)
            .padding(10),
        text(&app.error_message).size(18),
        vertical_space(),
    ]
    .spacing(15)
    .width(Length::Fill)
    .align_x(Center);

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(40)
}
