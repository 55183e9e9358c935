use iced::widget::container::{background, bordered_box};
use iced::widget::{
    Button, Checkbox, Column, Container, PickList, Row, Rule, Stack, Text, TextInput, button,
    horizontal_space, text,
};
use iced::{Alignment, Color, Length};
use iced_aw::date_picker;

use crate::app::state::{BookingDraft, ClassroomChoice, FormError};
use crate::app::{App, Message};
use crate::schedule::{CalendarView, ViewDimension, project_events, time_slots};
use crate::screens::calendar::calendar;

/// Экран управления расписанием: календарь с бронированием занятий.
/// Клик по пустому слоту создаёт занятие, клик по событию редактирует.
pub fn schedule_screen(app: &App) -> Container<Message> {
    let toolbar = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(text("Управление расписанием").size(26))
        .push(horizontal_space())
        .push(button("Сегодня").on_press(Message::CalendarToday))
        .push(button("<").on_press(Message::CalendarPrev))
        .push(button(">").on_press(Message::CalendarNext))
        .push(PickList::new(
            CalendarView::ALL.to_vec(),
            Some(app.current_view),
            Message::CalendarViewSelected,
        ));

    let mut content = Column::new().spacing(10).padding(20).push(toolbar).push(
        text("Кликните по пустому слоту, чтобы добавить занятие, или по событию, чтобы изменить его.")
            .size(14),
    );

    if let Some(error) = &app.schedule_error {
        content = content.push(
            Container::new(
                Row::new()
                    .spacing(10)
                    .align_y(Alignment::Center)
                    .push(Text::new(error.clone()).size(14))
                    .push(horizontal_space())
                    .push(button("X").on_press(Message::DismissScheduleError)),
            )
            .width(Length::Fill)
            .padding(8)
            .style(move |_| bordered_box(&app.theme)),
        );
    }

    if app.schedule_loading {
        content = content.push(text("Загрузка...").size(16));
    }

    let events = project_events(&app.lessons, ViewDimension::Course);
    content = content.push(calendar(
        &app.theme,
        &events,
        app.current_view,
        app.current_date,
        Some(Message::SlotClicked),
        Some(Message::EventClicked),
    ));

    let mut ui_stack = Stack::new().push(
        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill),
    );

    if let Some(draft) = app.booking.draft() {
        ui_stack = ui_stack.push(booking_modal(app, draft));
        if app.confirm_delete {
            ui_stack = ui_stack.push(delete_modal(app));
        }
    }

    Container::new(ui_stack)
        .width(Length::Fill)
        .height(Length::Fill)
}

fn form_error_block<'a>(app: &'a App, error: &FormError) -> Container<'a, Message> {
    let mut lines = Column::new().spacing(3);
    match error {
        FormError::Conflict { message, errors } => {
            // Сводка и каждая строка конфликта показываются дословно
            lines = lines.push(Text::new(message.clone()).size(14));
            for line in errors {
                lines = lines.push(Text::new(line.clone()).size(13));
            }
        }
        FormError::Other(message) => {
            lines = lines.push(Text::new(message.clone()).size(14));
        }
    }
    Container::new(lines)
        .width(Length::Fill)
        .padding(8)
        .style(move |_| bordered_box(&app.theme))
}

fn booking_modal<'a>(app: &'a App, draft: &'a BookingDraft) -> Container<'a, Message> {
    let is_editing = draft.is_editing();
    let modal_title = if is_editing {
        "Редактирование занятия"
    } else {
        "Новое занятие"
    };
    let submit_label = if draft.submitting {
        "Сохранение..."
    } else if is_editing {
        "Сохранить"
    } else {
        "Создать занятие"
    };

    let mut form = Column::new().spacing(10).push(Text::new(modal_title).size(24));

    if let Some(error) = &draft.error {
        form = form.push(form_error_block(app, error));
    }

    // Курс и модуль выбираются только при создании: перенос занятия в другой
    // модуль сервером не поддерживается.
    if !is_editing {
        form = form.push(
            PickList::new(
                app.courses.clone(),
                draft.course.clone(),
                Message::FormCourseSelected,
            )
            .placeholder("Выберите курс...")
            .width(Length::Fill),
        );
        form = form.push(
            PickList::new(
                app.course_modules.clone(),
                draft.course_module.clone(),
                Message::FormModuleSelected,
            )
            .placeholder(if draft.course.is_some() {
                "Выберите модуль..."
            } else {
                "Сначала выберите курс"
            })
            .width(Length::Fill),
        );

        if let Some(info) = &app.hours_info {
            let mut hours_col = Column::new().spacing(3).push(
                Text::new(format!(
                    "Часы модуля: {}ч | Запланировано: {}ч | Осталось: {}ч",
                    info.total_hours, info.scheduled_hours, info.remaining_hours
                ))
                .size(14),
            );
            if info.is_exhausted() {
                hours_col = hours_col
                    .push(Text::new("Внимание: лимит часов модуля исчерпан!").size(14));
            }
            form = form.push(
                Container::new(hours_col)
                    .width(Length::Fill)
                    .padding(8)
                    .style(move |_| bordered_box(&app.theme)),
            );
        }
    }

    let date_button = Button::new(Text::new("Дата")).on_press(Message::FormChooseDate);
    form = form.push(
        Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(
                TextInput::new("Дата", &draft.date_string())
                    .width(Length::Fixed(140.0))
                    .padding(8),
            )
            .push(date_picker(
                app.show_form_date_picker,
                draft.date,
                date_button,
                Message::FormDateCancelled,
                Message::FormDateSubmitted,
            )),
    );

    form = form.push(
        Row::new()
            .spacing(10)
            .push(
                PickList::new(
                    time_slots(),
                    draft.start_time.clone(),
                    Message::FormStartTimeSelected,
                )
                .placeholder("Начало...")
                .width(Length::Fill),
            )
            .push(
                PickList::new(
                    time_slots(),
                    draft.end_time.clone(),
                    Message::FormEndTimeSelected,
                )
                .placeholder("Конец...")
                .width(Length::Fill),
            ),
    );

    let mut classroom_options = vec![ClassroomChoice::Default];
    classroom_options.extend(
        app.classrooms
            .iter()
            .cloned()
            .map(ClassroomChoice::Room),
    );
    form = form.push(
        PickList::new(
            classroom_options,
            Some(draft.classroom.clone()),
            Message::FormClassroomSelected,
        )
        .width(Length::Fill),
    );

    if !is_editing {
        let mut recurrence = Column::new().spacing(8).push(
            Checkbox::new(
                "Повторять занятие в следующие недели",
                draft.is_recurring,
            )
            .on_toggle(Message::FormRecurringToggled),
        );
        if draft.is_recurring {
            recurrence = recurrence.push(
                Row::new()
                    .spacing(10)
                    .align_y(Alignment::Center)
                    .push(
                        TextInput::new("4", &draft.recurrence_weeks)
                            .on_input(Message::FormWeeksChanged)
                            .width(Length::Fixed(80.0))
                            .padding(8),
                    )
                    .push(Text::new("недель (от 2 до 20)").size(14)),
            );
        }
        form = form.push(
            Container::new(recurrence)
                .width(Length::Fill)
                .padding(8)
                .style(move |_| bordered_box(&app.theme)),
        );
    }

    form = form.push(
        TextInput::new("Содержание занятия, заметки...", &draft.notes)
            .on_input(Message::FormNotesChanged)
            .padding(8),
    );

    let mut buttons = Row::new().spacing(10);
    if is_editing {
        buttons = buttons.push(button("Удалить").on_press(Message::AskDeleteLesson));
    }
    buttons = buttons
        .push(horizontal_space())
        .push(button("Отмена").on_press(Message::CancelBooking))
        .push(
            button(submit_label)
                .on_press_maybe((!draft.submitting).then_some(Message::SubmitBooking)),
        );
    form = form.push(Rule::horizontal(10)).push(buttons);

    let modal = Container::new(form)
        .style(move |_| bordered_box(&app.theme))
        .padding(20)
        .width(Length::Fixed(520.0));

    Container::new(Container::new(modal).center(Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_| {
            background(Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.7,
            })
        })
}

fn delete_modal(app: &App) -> Container<'_, Message> {
    let delete_label = if app.deleting { "Удаление..." } else { "Удалить" };
    let content = Column::new()
        .spacing(15)
        .align_x(Alignment::Center)
        .push(Text::new("Удалить занятие").size(22))
        .push(Text::new("Вы уверены, что хотите удалить это занятие?").size(15))
        .push(Text::new("Это действие нельзя отменить.").size(15))
        .push(
            Row::new()
                .spacing(10)
                .push(button("Отмена").on_press(Message::CancelDeleteLesson))
                .push(
                    button(delete_label)
                        .on_press_maybe((!app.deleting).then_some(Message::ConfirmDeleteLesson)),
                ),
        );

    let modal = Container::new(content)
        .style(move |_| bordered_box(&app.theme))
        .padding(20)
        .width(Length::Fixed(400.0));

    Container::new(Container::new(modal).center(Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_| {
            background(Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.7,
            })
        })
}
