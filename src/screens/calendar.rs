use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use iced::widget::container::bordered_box;
use iced::widget::{Column, Container, Row, Scrollable, container, mouse_area, text};
use iced::{Alignment, Color, Element, Length, Theme};

use crate::app::Message;
use crate::schedule::{CalendarEvent, CalendarView, PALETTE_LEN, parse_time, time_slots};

/// Палитра событий - те же шесть цветов, что в веб-версии.
pub const EVENT_PALETTE: [Color; PALETTE_LEN] = [
    Color { r: 0.231, g: 0.510, b: 0.965, a: 1.0 }, // синий
    Color { r: 0.063, g: 0.725, b: 0.506, a: 1.0 }, // зелёный
    Color { r: 0.961, g: 0.620, b: 0.043, a: 1.0 }, // янтарный
    Color { r: 0.937, g: 0.267, b: 0.267, a: 1.0 }, // красный
    Color { r: 0.545, g: 0.361, b: 0.965, a: 1.0 }, // фиолетовый
    Color { r: 0.925, g: 0.282, b: 0.600, a: 1.0 }, // розовый
];

pub const WEEKDAYS_RU: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];

const SLOT_HEIGHT: f32 = 26.0;

pub fn event_color(index: usize) -> Color {
    EVENT_PALETTE[index % EVENT_PALETTE.len()]
}

fn event_style(color: Color) -> impl Fn(&Theme) -> container::Style {
    move |_| container::Style {
        background: Some(color.into()),
        text_color: Some(Color::WHITE),
        border: iced::Border {
            radius: 4.0.into(),
            ..Default::default()
        },
        ..container::Style::default()
    }
}

/// Самодельный календарь на обычных виджетах: неделя и день - сетка
/// получасовых слотов 07:00–23:00, месяц - сетка дней, список - перечень
/// событий. Состояние (дата, режим) контролируется снаружи; обработчики
/// кликов передают экраны: консультация их не передаёт и остаётся
/// только для чтения.
pub fn calendar<'a>(
    theme: &'a Theme,
    events: &[CalendarEvent],
    view: CalendarView,
    date: NaiveDate,
    on_slot: Option<fn(NaiveDate, String) -> Message>,
    on_event: Option<fn(i64) -> Message>,
) -> Container<'a, Message> {
    let body: Element<'a, Message> = match view {
        CalendarView::Week => {
            let monday = date.week(Weekday::Mon).first_day();
            let days: Vec<NaiveDate> = (0..7).map(|i| monday + Duration::days(i)).collect();
            time_grid(theme, events, &days, on_slot, on_event)
        }
        CalendarView::Day => time_grid(theme, events, &[date], on_slot, on_event),
        CalendarView::Month => month_grid(theme, events, date, on_slot, on_event),
        CalendarView::Agenda => agenda_list(theme, events, on_event),
    };
    Container::new(body)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_| bordered_box(theme))
        .padding(5)
}

/// Сетка получасовых слотов для одного или семи дней.
fn time_grid<'a>(
    theme: &'a Theme,
    events: &[CalendarEvent],
    days: &[NaiveDate],
    on_slot: Option<fn(NaiveDate, String) -> Message>,
    on_event: Option<fn(i64) -> Message>,
) -> Element<'a, Message> {
    let mut header = Row::new()
        .spacing(2)
        .push(Container::new(text("")).width(Length::Fixed(52.0)));
    for day in days {
        let label = format!(
            "{} {:02}.{:02}",
            WEEKDAYS_RU[day.weekday().num_days_from_monday() as usize],
            day.day(),
            day.month()
        );
        header = header.push(
            Container::new(text(label).size(14))
                .width(Length::Fill)
                .align_x(Alignment::Center),
        );
    }

    let mut grid = Column::new().spacing(2);
    for slot in time_slots() {
        let Some(slot_time) = parse_time(&slot) else {
            continue;
        };
        let mut row = Row::new().spacing(2).push(
            Container::new(text(slot.clone()).size(11))
                .width(Length::Fixed(52.0))
                .height(Length::Fixed(SLOT_HEIGHT)),
        );
        for day in days {
            row = row.push(slot_cell(
                theme, events, *day, slot_time, &slot, on_slot, on_event,
            ));
        }
        grid = grid.push(row);
    }

    Column::new()
        .spacing(4)
        .push(header)
        .push(Scrollable::new(grid).height(Length::Fill))
        .into()
}

fn slot_cell<'a>(
    theme: &'a Theme,
    events: &[CalendarEvent],
    day: NaiveDate,
    slot_time: NaiveTime,
    slot_label: &str,
    on_slot: Option<fn(NaiveDate, String) -> Message>,
    on_event: Option<fn(i64) -> Message>,
) -> Element<'a, Message> {
    let slot_end = slot_time + Duration::minutes(30);

    // Событие, начинающееся в этом слоте, рисуется с заголовком; слоты,
    // накрытые продолжением события, закрашиваются без текста.
    let starting = events.iter().find(|e| {
        e.start.date() == day && e.start.time() >= slot_time && e.start.time() < slot_end
    });
    let covering = events
        .iter()
        .find(|e| e.start.date() == day && e.start.time() < slot_time && e.end.time() > slot_time);

    if let Some(event) = starting {
        let color = event_color(event.color_index);
        let block = Container::new(text(event.title.clone()).size(11))
            .width(Length::Fill)
            .height(Length::Fixed(SLOT_HEIGHT))
            .padding(2)
            .style(event_style(color));
        return match on_event {
            Some(handler) => mouse_area(block).on_press(handler(event.lesson_id)).into(),
            None => block.into(),
        };
    }
    if let Some(event) = covering {
        let color = event_color(event.color_index);
        let block = Container::new(text(""))
            .width(Length::Fill)
            .height(Length::Fixed(SLOT_HEIGHT))
            .style(event_style(color));
        return match on_event {
            Some(handler) => mouse_area(block).on_press(handler(event.lesson_id)).into(),
            None => block.into(),
        };
    }

    let empty = Container::new(text(""))
        .width(Length::Fill)
        .height(Length::Fixed(SLOT_HEIGHT))
        .style(move |_| bordered_box(theme));
    match on_slot {
        Some(handler) => mouse_area(empty)
            .on_press(handler(day, slot_label.to_string()))
            .into(),
        None => empty.into(),
    }
}

/// Сетка дней месяца: в ячейке номер дня и до трёх событий.
fn month_grid<'a>(
    theme: &'a Theme,
    events: &[CalendarEvent],
    date: NaiveDate,
    on_slot: Option<fn(NaiveDate, String) -> Message>,
    on_event: Option<fn(i64) -> Message>,
) -> Element<'a, Message> {
    let first = date.with_day(1).unwrap_or(date);
    let grid_start = first.week(Weekday::Mon).first_day();

    let mut header = Row::new().spacing(2);
    for name in WEEKDAYS_RU {
        header = header.push(
            Container::new(text(name).size(14))
                .width(Length::Fill)
                .align_x(Alignment::Center),
        );
    }

    let mut weeks = Column::new().spacing(2).push(header);
    let mut cursor = grid_start;
    // Шесть строк недель всегда покрывают любой месяц.
    for _ in 0..6 {
        let mut week_row = Row::new().spacing(2);
        for _ in 0..7 {
            week_row = week_row.push(month_cell(
                theme,
                events,
                cursor,
                cursor.month() == date.month(),
                on_slot,
                on_event,
            ));
            cursor = cursor + Duration::days(1);
        }
        weeks = weeks.push(week_row);
    }
    Scrollable::new(weeks).height(Length::Fill).into()
}

fn month_cell<'a>(
    theme: &'a Theme,
    events: &[CalendarEvent],
    day: NaiveDate,
    in_month: bool,
    on_slot: Option<fn(NaiveDate, String) -> Message>,
    on_event: Option<fn(i64) -> Message>,
) -> Element<'a, Message> {
    let day_events: Vec<&CalendarEvent> =
        events.iter().filter(|e| e.start.date() == day).collect();

    let day_label = if in_month {
        text(format!("{}", day.day())).size(13)
    } else {
        text(format!("{}", day.day())).size(13).color(Color {
            r: 0.5,
            g: 0.5,
            b: 0.5,
            a: 1.0,
        })
    };
    let mut cell = Column::new().spacing(2).push(day_label);
    for event in day_events.iter().take(3) {
        let color = event_color(event.color_index);
        let line = Container::new(text(event.title.clone()).size(10))
            .width(Length::Fill)
            .padding(1)
            .style(event_style(color));
        let line: Element<'a, Message> = match on_event {
            Some(handler) => mouse_area(line).on_press(handler(event.lesson_id)).into(),
            None => line.into(),
        };
        cell = cell.push(line);
    }
    if day_events.len() > 3 {
        cell = cell.push(text(format!("+ {} ещё", day_events.len() - 3)).size(10));
    }

    let boxed = Container::new(cell)
        .width(Length::Fill)
        .height(Length::Fixed(86.0))
        .padding(3)
        .style(move |_| bordered_box(theme));
    match on_slot {
        // В месячной сетке слот начинается в полночь, как и в веб-версии.
        Some(handler) => mouse_area(boxed)
            .on_press(handler(day, "00:00".to_string()))
            .into(),
        None => boxed.into(),
    }
}

/// Список всех событий по возрастанию времени начала.
fn agenda_list<'a>(
    theme: &'a Theme,
    events: &[CalendarEvent],
    on_event: Option<fn(i64) -> Message>,
) -> Element<'a, Message> {
    let mut ordered: Vec<&CalendarEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.start);

    let mut list = Column::new().spacing(5);
    if ordered.is_empty() {
        list = list.push(text("Нет занятий в этом периоде.").size(16));
    }
    for event in ordered {
        let color = event_color(event.color_index);
        let line = Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(
                Container::new(text("").size(10))
                    .width(Length::Fixed(10.0))
                    .height(Length::Fixed(10.0))
                    .style(event_style(color)),
            )
            .push(
                text(format!(
                    "{:02}.{:02}.{} {:02}:{:02} - {:02}:{:02}",
                    event.start.date().day(),
                    event.start.date().month(),
                    event.start.date().year(),
                    event.start.time().hour(),
                    event.start.time().minute(),
                    event.end.time().hour(),
                    event.end.time().minute(),
                ))
                .size(13),
            )
            .push(text(event.title.clone()).size(13));
        let row = Container::new(line)
            .width(Length::Fill)
            .padding(5)
            .style(move |_| bordered_box(theme));
        let row: Element<'a, Message> = match on_event {
            Some(handler) => mouse_area(row).on_press(handler(event.lesson_id)).into(),
            None => row.into(),
        };
        list = list.push(row);
    }
    Scrollable::new(list).height(Length::Fill).into()
}
