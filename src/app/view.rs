use iced::Length;
use iced::widget::{Column, Container, Row};

use crate::app::state::Screen;
use crate::screens::{
    login_screen, nav_menu, profile_screen, schedule_screen, schedule_view_screen, search_screen,
    settings_screen,
};

use super::{App, Message};

impl App {
    pub fn view(&self) -> Row<Message> {
        Row::new()
            .spacing(20)
            .push(
                // Боковое меню скрыто, пока пользователь не вошёл
                if self.current_screen != Screen::Login {
                    Container::new(nav_menu(self))
                        .width(Length::Fixed(200.0))
                        .height(Length::Fill)
                        .padding(10)
                } else {
                    Container::new(Column::new())
                        .width(Length::Fixed(0.0))
                        .height(Length::Fill)
                },
            )
            .push(
                match &self.current_screen {
                    Screen::Login => login_screen(self),
                    Screen::Schedule => schedule_screen(self),
                    Screen::ScheduleView => schedule_view_screen(self),
                    Screen::Search => search_screen(self),
                    Screen::Profile => profile_screen(self),
                    Screen::Settings => settings_screen(self),
                }
                .width(Length::Fill),
            )
            .into()
    }
}
