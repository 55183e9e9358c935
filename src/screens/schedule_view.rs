use iced::widget::container::bordered_box;
use iced::widget::{
    Column, Container, PickList, Row, Scrollable, Text, button, horizontal_space, text,
};
use iced::{Alignment, Length};

use crate::app::state::{Course, Lesson, MyScheduleChoice, UserInfo};
use crate::app::{App, Message};
use crate::pagination::PageItem;
use crate::schedule::{
    CalendarView, ViewDimension, hours_in_view, lessons_in_view, parse_date, period_label,
    project_events,
};
use crate::screens::calendar::calendar;

/// Экран консультации расписания: администратор смотрит по группе,
/// преподавателю или аудитории; остальные видят собственное расписание.
pub fn schedule_view_screen(app: &App) -> Container<Message> {
    let is_admin = app.current_user.as_ref().is_some_and(UserInfo::is_admin);

    let title = if is_admin {
        "Просмотр расписаний"
    } else {
        "Моё расписание"
    };
    let subtitle = if is_admin {
        "Выберите группу, преподавателя или аудиторию."
    } else {
        "Все ваши занятия; при необходимости отфильтруйте по группе."
    };

    let mut content = Column::new()
        .spacing(10)
        .padding(20)
        .push(text(title).size(26))
        .push(text(subtitle).size(14));

    // Панель фильтров
    let filters: Container<Message> = if is_admin {
        let mut dimension_row = Row::new().spacing(5);
        for dimension in ViewDimension::ALL {
            dimension_row = dimension_row.push(
                button(text(dimension.to_string()).size(14)).on_press_maybe(
                    (*dimension != app.consult_dimension)
                        .then_some(Message::DimensionSelected(*dimension)),
                ),
            );
        }
        let target: Row<Message> = match app.consult_dimension {
            ViewDimension::Course => Row::new().push(
                PickList::new(
                    app.courses.clone(),
                    app.consult_course.clone(),
                    Message::ConsultCourseSelected,
                )
                .placeholder("Выберите группу...")
                .width(Length::Fill),
            ),
            ViewDimension::Trainer => Row::new().push(
                PickList::new(
                    app.trainers.clone(),
                    app.consult_trainer.clone(),
                    Message::ConsultTrainerSelected,
                )
                .placeholder("Выберите преподавателя...")
                .width(Length::Fill),
            ),
            ViewDimension::Classroom => Row::new().push(
                PickList::new(
                    app.classrooms.clone(),
                    app.consult_classroom.clone(),
                    Message::ConsultClassroomSelected,
                )
                .placeholder("Выберите аудиторию...")
                .width(Length::Fill),
            ),
        };
        Container::new(
            Row::new()
                .spacing(15)
                .align_y(Alignment::Center)
                .push(dimension_row)
                .push(target),
        )
        .width(Length::Fill)
        .padding(10)
        .style(move |_| bordered_box(&app.theme))
    } else {
        let choices = my_schedule_choices(&app.consult_lessons);
        let indicator = match app.my_schedule_filter {
            MyScheduleChoice::All => "Показаны все ваши занятия.",
            MyScheduleChoice::Course(_) => "Фильтр по выбранной группе.",
        };
        Container::new(
            Row::new()
                .spacing(15)
                .align_y(Alignment::Center)
                .push(
                    PickList::new(
                        choices,
                        Some(app.my_schedule_filter.clone()),
                        Message::MyScheduleFilterSelected,
                    )
                    .width(Length::Fixed(320.0)),
                )
                .push(text(indicator).size(14)),
        )
        .width(Length::Fill)
        .padding(10)
        .style(move |_| bordered_box(&app.theme))
    };
    content = content.push(filters);

    if let Some(error) = &app.consult_error {
        content = content.push(
            Container::new(
                Row::new()
                    .spacing(10)
                    .align_y(Alignment::Center)
                    .push(Text::new(error.clone()).size(14))
                    .push(horizontal_space())
                    .push(button("X").on_press(Message::DismissConsultError)),
            )
            .width(Length::Fill)
            .padding(8)
            .style(move |_| bordered_box(&app.theme)),
        );
    }

    let has_selection = match app.consult_dimension {
        ViewDimension::Course => app.consult_course.is_some(),
        ViewDimension::Trainer => app.consult_trainer.is_some(),
        ViewDimension::Classroom => app.consult_classroom.is_some(),
    };

    if is_admin && !has_selection {
        content = content
            .push(text("Выберите вариант выше, чтобы увидеть расписание.").size(15));
    }

    if app.consult_loading {
        content = content.push(text("Загрузка...").size(16));
    }

    if !app.consult_loading && (has_selection || !is_admin) {
        // Сводка пересчитывается из списка занятий, отфильтрованного по окну
        // активного режима календаря.
        let visible = lessons_in_view(&app.consult_lessons, app.consult_view, app.consult_date);
        let mut stats = Row::new()
            .spacing(15)
            .align_y(Alignment::Center)
            .push(
                text(format!(
                    "Занятий: {} {}",
                    visible.len(),
                    period_label(app.consult_view, app.consult_date)
                ))
                .size(14),
            );
        if !visible.is_empty() {
            stats = stats.push(text(format!("Часов: {:.1}ч", hours_in_view(&visible))).size(14));
        }
        stats = stats
            .push(horizontal_space())
            .push(button("Сегодня").on_press(Message::ConsultToday))
            .push(button("<").on_press(Message::ConsultPrev))
            .push(button(">").on_press(Message::ConsultNext))
            .push(PickList::new(
                CalendarView::ALL.to_vec(),
                Some(app.consult_view),
                Message::ConsultViewSelected,
            ));
        content = content.push(
            Container::new(stats)
                .width(Length::Fill)
                .padding(8)
                .style(move |_| bordered_box(&app.theme)),
        );

        let events = project_events(&app.consult_lessons, app.consult_dimension);
        content = content.push(
            Container::new(calendar(
                &app.theme,
                &events,
                app.consult_view,
                app.consult_date,
                None,
                None,
            ))
            .height(Length::FillPortion(3)),
        );

        if !app.consult_lessons.is_empty() {
            content = content
                .push(Scrollable::new(lessons_table(app)).height(Length::FillPortion(2)));
        }
    }

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
}

/// Варианты фильтра "моего расписания": все группы плюс группы из
/// загруженного списка занятий.
fn my_schedule_choices(lessons: &[Lesson]) -> Vec<MyScheduleChoice> {
    let mut choices = vec![MyScheduleChoice::All];
    for lesson in lessons {
        let already = choices.iter().any(|c| c.course_id() == Some(lesson.course_id));
        if !already {
            choices.push(MyScheduleChoice::Course(Course {
                id: lesson.course_id,
                name: lesson
                    .course_name
                    .clone()
                    .unwrap_or_else(|| format!("Группа {}", lesson.course_id)),
                area: None,
                status: None,
            }));
        }
    }
    choices
}

fn format_lesson_date(raw: &str) -> String {
    use chrono::Datelike;
    match parse_date(raw) {
        Some(d) => format!("{:02}.{:02}.{}", d.day(), d.month(), d.year()),
        None => raw.to_string(),
    }
}

fn short_time(time: &str) -> String {
    time.chars().take(5).collect()
}

/// Таблица занятий: колонка активного измерения скрыта, список разбит на
/// страницы по десять строк.
fn lessons_table(app: &App) -> Container<'_, Message> {
    let dimension = app.consult_dimension;
    let show_course = dimension != ViewDimension::Course;
    let show_trainer = dimension != ViewDimension::Trainer;
    let show_classroom = dimension != ViewDimension::Classroom;

    let mut header = Row::new()
        .spacing(10)
        .push(Text::new("Дата").size(14).width(Length::FillPortion(2)))
        .push(Text::new("Время").size(14).width(Length::FillPortion(2)))
        .push(Text::new("Модуль").size(14).width(Length::FillPortion(3)));
    if show_course {
        header = header.push(Text::new("Группа").size(14).width(Length::FillPortion(3)));
    }
    if show_trainer {
        header = header.push(
            Text::new("Преподаватель")
                .size(14)
                .width(Length::FillPortion(3)),
        );
    }
    if show_classroom {
        header = header.push(Text::new("Аудитория").size(14).width(Length::FillPortion(2)));
    }
    header = header.push(Text::new("Длительность").size(14).width(Length::FillPortion(2)));

    let mut table = Column::new().spacing(5).push(
        Container::new(header)
            .width(Length::Fill)
            .padding(8)
            .style(move |_| bordered_box(&app.theme)),
    );

    for lesson in app.table_pager.slice(&app.consult_lessons) {
        let mut row = Row::new()
            .spacing(10)
            .push(
                Text::new(format_lesson_date(&lesson.date))
                    .size(13)
                    .width(Length::FillPortion(2)),
            )
            .push(
                Text::new(format!(
                    "{} - {}",
                    short_time(&lesson.start_time),
                    short_time(&lesson.end_time)
                ))
                .size(13)
                .width(Length::FillPortion(2)),
            )
            .push(
                Text::new(lesson.module_name.clone())
                    .size(13)
                    .width(Length::FillPortion(3)),
            );
        if show_course {
            row = row.push(
                Text::new(lesson.course_name.clone().unwrap_or_else(|| "-".to_string()))
                    .size(13)
                    .width(Length::FillPortion(3)),
            );
        }
        if show_trainer {
            row = row.push(
                Text::new(lesson.trainer_name.clone())
                    .size(13)
                    .width(Length::FillPortion(3)),
            );
        }
        if show_classroom {
            row = row.push(
                Text::new(
                    lesson
                        .classroom_name
                        .clone()
                        .unwrap_or_else(|| "-".to_string()),
                )
                .size(13)
                .width(Length::FillPortion(2)),
            );
        }
        row = row.push(
            Text::new(format!("{}ч", lesson.duration_hours))
                .size(13)
                .width(Length::FillPortion(2)),
        );
        table = table.push(
            Container::new(row)
                .width(Length::Fill)
                .padding(8)
                .style(move |_| bordered_box(&app.theme)),
        );
    }

    table = table.push(pagination_row(app));

    Container::new(table).width(Length::Fill)
}

fn pagination_row(app: &App) -> Row<'_, Message> {
    let pager = &app.table_pager;
    let shown_from = (pager.page - 1) * pager.per_page + 1;
    let shown_to = (pager.page * pager.per_page).min(pager.total);

    let mut controls = Row::new().spacing(5).align_y(Alignment::Center).push(
        text(format!(
            "Показано {} - {} из {}",
            shown_from, shown_to, pager.total
        ))
        .size(13),
    );
    controls = controls.push(horizontal_space());

    if pager.pages() <= 1 {
        return controls;
    }

    controls = controls.push(
        button("<").on_press_maybe(pager.has_prev().then_some(Message::TablePageChanged(pager.page - 1))),
    );
    for item in pager.page_numbers() {
        controls = match item {
            PageItem::Page(number) => controls.push(
                button(text(format!("{}", number)).size(13)).on_press_maybe(
                    (number != pager.page).then_some(Message::TablePageChanged(number)),
                ),
            ),
            PageItem::Ellipsis => controls.push(text("...").size(13)),
        };
    }
    controls.push(
        button(">").on_press_maybe(pager.has_next().then_some(Message::TablePageChanged(pager.page + 1))),
    )
}
