use iced::widget::container::bordered_box;
use iced::widget::{Column, Container, PickList, Row, Scrollable, Text, TextInput, text};
use iced::{Alignment, Length};

use crate::app::state::SearchKind;
use crate::app::{App, Message};

/// Поиск по справочникам. Запрос уходит через 300 мс после последнего
/// ввода; минимальная длина - два символа.
pub fn search_screen(app: &App) -> Container<Message> {
    let controls = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(
            TextInput::new("Введите запрос...", &app.search_query)
                .on_input(Message::SearchQueryChanged)
                .padding(10)
                .size(16)
                .width(Length::Fixed(350.0)),
        )
        .push(PickList::new(
            SearchKind::ALL.to_vec(),
            Some(app.search_kind),
            Message::SearchKindSelected,
        ));

    let mut content = Column::new()
        .spacing(15)
        .padding(20)
        .push(text("Поиск").size(26))
        .push(controls);

    if app.search_loading {
        content = content.push(text("Поиск...").size(15));
    } else if let Some(error) = &app.search_error {
        // Сюда же попадает отказ в доступе: текст ошибки уже различает его
        content = content.push(
            Container::new(Text::new(error.clone()).size(14))
                .width(Length::Fill)
                .padding(8)
                .style(move |_| bordered_box(&app.theme)),
        );
    } else if !app.has_searched {
        content = content.push(text("Введите минимум два символа для поиска.").size(14));
    } else if app.search_results.is_empty() {
        content = content.push(
            text(format!("Ничего не найдено по запросу \"{}\".", app.search_query)).size(14),
        );
    } else {
        let mut results = Column::new().spacing(5);
        for hit in &app.search_results {
            let mut row = Row::new()
                .spacing(10)
                .push(Text::new(hit.label()).size(14).width(Length::FillPortion(4)));
            if let Some(email) = &hit.email {
                row = row.push(Text::new(email.clone()).size(13).width(Length::FillPortion(3)));
            }
            results = results.push(
                Container::new(row)
                    .width(Length::Fill)
                    .padding(8)
                    .style(move |_| bordered_box(&app.theme)),
            );
        }
        content = content.push(Scrollable::new(results).height(Length::Fill));
    }

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
}
