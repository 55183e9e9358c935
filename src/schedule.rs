use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::app::state::Lesson;

/// Количество цветов в палитре событий (цвета лежат в screens/calendar.rs).
pub const PALETTE_LEN: usize = 6;

pub const MONTHS_RU: [&str; 12] = [
    "январь", "февраль", "март", "апрель", "май", "июнь",
    "июль", "август", "сентябрь", "октябрь", "ноябрь", "декабрь",
];

/// Режим отображения календаря. Состояние хранится в App, не в виджете.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    Month,
    #[default]
    Week,
    Day,
    Agenda,
}

impl CalendarView {
    pub const ALL: &'static [CalendarView] = &[
        CalendarView::Month,
        CalendarView::Week,
        CalendarView::Day,
        CalendarView::Agenda,
    ];
}

impl std::fmt::Display for CalendarView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            CalendarView::Month => "Месяц",
            CalendarView::Week => "Неделя",
            CalendarView::Day => "День",
            CalendarView::Agenda => "Список",
        })
    }
}

/// Измерение просмотра расписания: по группе, преподавателю или аудитории.
/// Везде, где поведение зависит от измерения, match обязан быть исчерпывающим.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewDimension {
    #[default]
    Course,
    Trainer,
    Classroom,
}

impl ViewDimension {
    pub const ALL: &'static [ViewDimension] = &[
        ViewDimension::Course,
        ViewDimension::Trainer,
        ViewDimension::Classroom,
    ];
}

impl std::fmt::Display for ViewDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            ViewDimension::Course => "Группа",
            ViewDimension::Trainer => "Преподаватель",
            ViewDimension::Classroom => "Аудитория",
        })
    }
}

/// Событие календаря, полученное из занятия.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub lesson_id: i64,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub color_index: usize,
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Сервер отдаёт "HH:MM:SS", форма отправляет "HH:MM" - принимаем оба.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Цвет события определяется модулем: детерминированно, коллизии допустимы.
pub fn color_index(module_id: i64) -> usize {
    module_id.rem_euclid(PALETTE_LEN as i64) as usize
}

fn event_title(lesson: &Lesson, dimension: ViewDimension) -> String {
    let course = lesson
        .course_name
        .clone()
        .unwrap_or_else(|| format!("Группа {}", lesson.course_id));
    match dimension {
        ViewDimension::Course => format!("{} - {}", lesson.module_name, lesson.trainer_name),
        ViewDimension::Trainer => format!("{}: {}", course, lesson.module_name),
        ViewDimension::Classroom => format!("{} - {}", course, lesson.module_name),
    }
}

/// Чистая проекция занятий в события календаря. Никаких побочных эффектов:
/// одинаковый вход всегда даёт одинаковый выход. Занятия с некорректной
/// датой или временем пропускаются, остальные проецируются.
pub fn project_events(lessons: &[Lesson], dimension: ViewDimension) -> Vec<CalendarEvent> {
    lessons
        .iter()
        .filter_map(|lesson| {
            let date = parse_date(&lesson.date)?;
            let start = parse_time(&lesson.start_time)?;
            let end = parse_time(&lesson.end_time)?;
            Some(CalendarEvent {
                lesson_id: lesson.id,
                title: event_title(lesson, dimension),
                start: date.and_time(start),
                end: date.and_time(end),
                color_index: color_index(lesson.module_id),
            })
        })
        .collect()
}

/// Границы окна дат активного режима (включительно). Для списка окна нет.
pub fn view_window(view: CalendarView, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match view {
        CalendarView::Day => Some((date, date)),
        CalendarView::Week => {
            let week = date.week(Weekday::Mon);
            Some((week.first_day(), week.last_day()))
        }
        CalendarView::Month => {
            let first = date.with_day(1).unwrap_or(date);
            let last = first
                .checked_add_months(Months::new(1))
                .and_then(|d| d.checked_sub_signed(Duration::days(1)))
                .unwrap_or(first);
            Some((first, last))
        }
        CalendarView::Agenda => None,
    }
}

/// Занятия, попадающие в окно активного режима. O(n) по списку - при
/// админских объёмах (сотни занятий) этого достаточно.
pub fn lessons_in_view<'a>(
    lessons: &'a [Lesson],
    view: CalendarView,
    date: NaiveDate,
) -> Vec<&'a Lesson> {
    match view_window(view, date) {
        None => lessons.iter().collect(),
        Some((from, to)) => lessons
            .iter()
            .filter(|l| match parse_date(&l.date) {
                Some(d) => d >= from && d <= to,
                None => false,
            })
            .collect(),
    }
}

pub fn hours_in_view(lessons: &[&Lesson]) -> f64 {
    lessons.iter().map(|l| l.duration_hours).sum()
}

pub fn period_label(view: CalendarView, date: NaiveDate) -> String {
    match view {
        CalendarView::Month => {
            let name = MONTHS_RU[date.month0() as usize];
            format!("({} {})", name, date.year())
        }
        CalendarView::Week => {
            let week = date.week(Weekday::Mon);
            let (a, b) = (week.first_day(), week.last_day());
            format!(
                "({:02}.{:02} - {:02}.{:02})",
                a.day(), a.month(), b.day(), b.month()
            )
        }
        CalendarView::Day => format!("({:02}.{:02}.{})", date.day(), date.month(), date.year()),
        CalendarView::Agenda => "(всего)".to_string(),
    }
}

/// Шаг навигации Назад/Вперёд. Список листается помесячно.
pub fn step(view: CalendarView, date: NaiveDate, forward: bool) -> NaiveDate {
    match view {
        CalendarView::Day => date + Duration::days(if forward { 1 } else { -1 }),
        CalendarView::Week => date + Duration::days(if forward { 7 } else { -7 }),
        CalendarView::Month | CalendarView::Agenda => {
            let shifted = if forward {
                date.checked_add_months(Months::new(1))
            } else {
                date.checked_sub_months(Months::new(1))
            };
            shifted.unwrap_or(date)
        }
    }
}

/// Получасовые слоты 07:00–23:00 - те же, что предлагает форма бронирования.
pub fn time_slots() -> Vec<String> {
    (0..33)
        .map(|i| format!("{:02}:{:02}", 7 + i / 2, (i % 2) * 30))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: i64, module_id: i64, date: &str, start: &str, end: &str) -> Lesson {
        Lesson {
            id,
            course_module_id: 1,
            course_id: 7,
            module_id,
            module_name: format!("Модуль {}", module_id),
            course_name: Some("Веб-разработка".to_string()),
            trainer_name: "Иванов".to_string(),
            classroom_id: Some(3),
            classroom_name: Some("А-101".to_string()),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            duration_hours: 2.0,
            notes: None,
        }
    }

    #[test]
    fn projection_is_pure() {
        let lessons = vec![
            lesson(1, 2, "2024-03-04", "10:00", "12:00"),
            lesson(2, 5, "2024-03-05", "09:00:00", "10:30:00"),
        ];
        let a = project_events(&lessons, ViewDimension::Course);
        let b = project_events(&lessons, ViewDimension::Course);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn event_start_precedes_end() {
        let lessons = vec![lesson(1, 0, "2024-03-04", "10:00", "12:00")];
        let events = project_events(&lessons, ViewDimension::Course);
        assert!(events[0].start < events[0].end);
    }

    #[test]
    fn broken_rows_are_skipped() {
        let lessons = vec![
            lesson(1, 0, "2024-03-04", "10:00", "12:00"),
            lesson(2, 0, "не дата", "10:00", "12:00"),
            lesson(3, 0, "2024-03-04", "??", "12:00"),
        ];
        let events = project_events(&lessons, ViewDimension::Course);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].lesson_id, 1);
    }

    #[test]
    fn color_is_deterministic_and_wraps() {
        assert_eq!(color_index(4), color_index(4));
        for k in 0..5i64 {
            assert_eq!(color_index(2), color_index(2 + k * PALETTE_LEN as i64));
        }
        assert!(color_index(-1) < PALETTE_LEN);
    }

    #[test]
    fn title_depends_on_dimension() {
        let l = vec![lesson(1, 2, "2024-03-04", "10:00", "12:00")];
        let by_course = project_events(&l, ViewDimension::Course);
        let by_trainer = project_events(&l, ViewDimension::Trainer);
        let by_room = project_events(&l, ViewDimension::Classroom);
        // В режиме "по преподавателю" имя преподавателя в заголовок не входит.
        assert!(by_course[0].title.contains("Иванов"));
        assert!(!by_trainer[0].title.contains("Иванов"));
        assert!(by_trainer[0].title.contains("Веб-разработка"));
        assert!(by_room[0].title.contains("Веб-разработка"));
    }

    #[test]
    fn week_window_starts_on_monday() {
        // 2024-03-06 - среда; неделя 04.03–10.03.
        let date = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let (from, to) = view_window(CalendarView::Week, date).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn month_window_covers_whole_month() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let (from, to) = view_window(CalendarView::Month, date).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn view_filter_and_hours_sum() {
        let lessons = vec![
            lesson(1, 0, "2024-03-04", "10:00", "12:00"),
            lesson(2, 0, "2024-03-08", "10:00", "12:00"),
            lesson(3, 0, "2024-03-18", "10:00", "12:00"),
        ];
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let in_week = lessons_in_view(&lessons, CalendarView::Week, date);
        assert_eq!(in_week.len(), 2);
        assert_eq!(hours_in_view(&in_week), 4.0);
        let all = lessons_in_view(&lessons, CalendarView::Agenda, date);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn navigation_steps() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(
            step(CalendarView::Day, date, true),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            step(CalendarView::Week, date, false),
            NaiveDate::from_ymd_opt(2024, 2, 26).unwrap()
        );
        assert_eq!(
            step(CalendarView::Month, date, true),
            NaiveDate::from_ymd_opt(2024, 4, 4).unwrap()
        );
    }

    #[test]
    fn slots_run_from_seven_to_eleven_pm() {
        let slots = time_slots();
        assert_eq!(slots.first().map(String::as_str), Some("07:00"));
        assert_eq!(slots.last().map(String::as_str), Some("23:00"));
        assert_eq!(slots.len(), 33);
    }
}
