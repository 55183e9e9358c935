use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use iced::{Task, Theme};
use iced_aw::date_picker::Date;
use serde::Deserialize;

use crate::api::{Api, LessonCreate, LessonUpdate};
use crate::app::Message;
use crate::config::load_config;
use crate::config::theme_from_str;
use crate::pagination::Pager;
use crate::schedule::{CalendarView, ViewDimension};

pub const TABLE_PER_PAGE: usize = 10;

pub struct App {
    pub api: Api,
    pub theme: Theme,
    pub current_screen: Screen,
    pub current_user: Option<UserInfo>,
    //
    pub login_email: String,
    pub login_password: String,
    pub login_code: String,
    // Some(email) - сервер запросил код подтверждения для этого адреса
    pub awaiting_two_factor: Option<String>,
    pub login_notice: Option<String>,
    pub error_message: String,
    //
    // Экран бронирования
    pub lessons: Vec<Lesson>,
    pub courses: Vec<Course>,
    pub classrooms: Vec<Classroom>,
    pub trainers: Vec<UserInfo>,
    pub schedule_loading: bool,
    pub schedule_error: Option<String>,
    pub current_date: NaiveDate,
    pub current_view: CalendarView,
    //
    // Форма бронирования
    pub booking: BookingForm,
    pub course_modules: Vec<CourseModule>,
    pub hours_info: Option<HoursInfo>,
    pub show_form_date_picker: bool,
    pub confirm_delete: bool,
    pub deleting: bool,
    //
    // Счётчики поколений: ответ с устаревшим поколением отбрасывается
    pub modules_gen: u64,
    pub hours_gen: u64,
    pub consult_gen: u64,
    pub search_gen: u64,
    //
    // Экран консультации расписания
    pub consult_dimension: ViewDimension,
    pub consult_course: Option<Course>,
    pub consult_trainer: Option<UserInfo>,
    pub consult_classroom: Option<Classroom>,
    pub my_schedule_filter: MyScheduleChoice,
    pub consult_lessons: Vec<Lesson>,
    pub consult_loading: bool,
    pub consult_error: Option<String>,
    pub consult_date: NaiveDate,
    pub consult_view: CalendarView,
    pub table_pager: Pager,
    //
    // Поиск
    pub search_query: String,
    pub search_kind: SearchKind,
    pub search_results: Vec<SearchHit>,
    pub search_loading: bool,
    pub search_error: Option<String>,
    pub has_searched: bool,
}

impl Default for App {
    fn default() -> Self {
        let config = load_config().unwrap_or_default();
        let theme = theme_from_str(&config.theme_name).unwrap_or(Theme::Light);
        let today = Local::now().date_naive();
        Self {
            api: Api::new(config.api_base_url(), config.access_token),
            theme,
            current_screen: Screen::default(),
            current_user: None,
            login_email: String::new(),
            login_password: String::new(),
            login_code: String::new(),
            awaiting_two_factor: None,
            login_notice: None,
            error_message: String::new(),
            lessons: vec![],
            courses: vec![],
            classrooms: vec![],
            trainers: vec![],
            schedule_loading: false,
            schedule_error: None,
            current_date: today,
            current_view: CalendarView::default(),
            booking: BookingForm::Closed,
            course_modules: vec![],
            hours_info: None,
            show_form_date_picker: false,
            confirm_delete: false,
            deleting: false,
            modules_gen: 0,
            hours_gen: 0,
            consult_gen: 0,
            search_gen: 0,
            consult_dimension: ViewDimension::default(),
            consult_course: None,
            consult_trainer: None,
            consult_classroom: None,
            my_schedule_filter: MyScheduleChoice::All,
            consult_lessons: vec![],
            consult_loading: false,
            consult_error: None,
            consult_date: today,
            consult_view: CalendarView::default(),
            table_pager: Pager::new(0, TABLE_PER_PAGE),
            search_query: String::new(),
            search_kind: SearchKind::default(),
            search_results: vec![],
            search_loading: false,
            search_error: None,
            has_searched: false,
        }
    }
}

impl App {
    /// Начальное состояние: если в конфиге сохранён токен, проверяем его
    /// через /auth/me; недействительный токен стирается в update.
    pub fn new() -> (Self, Task<Message>) {
        let app = Self::default();
        let task = if app.api.has_token() {
            let api = app.api.clone();
            Task::perform(
                async move { api.me().await.map_err(|e| e.to_string()) },
                Message::SessionRestored,
            )
        } else {
            Task::none()
        };
        (app, task)
    }
}

#[derive(PartialEq, Default)]
pub enum Screen {
    #[default]
    Login,
    Schedule,
    ScheduleView,
    Search,
    Profile,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.is_superuser
    }

    pub fn is_professor(&self) -> bool {
        self.role.as_deref() == Some("professor") && !self.is_superuser
    }
}

impl fmt::Display for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.full_name {
            Some(name) if !name.is_empty() => write!(f, "{}", name),
            _ => write!(f, "{}", self.email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleRef {
    pub name: String,
    #[serde(default)]
    pub default_duration_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainerRef {
    pub name: String,
}

/// Модуль в составе курса. `order` задаёт порядок в программе; сервер отдаёт
/// список уже отсортированным, клиент сортирует ещё раз на всякий случай.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseModule {
    pub id: i64,
    pub course_id: i64,
    pub module_id: i64,
    #[serde(default)]
    pub module: Option<ModuleRef>,
    #[serde(default)]
    pub trainer_id: Option<i64>,
    #[serde(default)]
    pub trainer: Option<TrainerRef>,
    #[serde(default)]
    pub classroom_id: Option<i64>,
    pub total_hours: f64,
    #[serde(default)]
    pub order: i64,
}

impl CourseModule {
    pub fn module_name(&self) -> String {
        match &self.module {
            Some(m) => m.name.clone(),
            None => format!("Модуль {}", self.module_id),
        }
    }
}

impl fmt::Display for CourseModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}ч)", self.module_name(), self.total_hours)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Classroom {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl fmt::Display for Classroom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Одно запланированное занятие модуля. Даты и время храним строками, как
/// на проводе; разбор выполняется там, где нужна арифметика.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub course_module_id: i64,
    pub course_id: i64,
    pub module_id: i64,
    pub module_name: String,
    #[serde(default)]
    pub course_name: Option<String>,
    pub trainer_name: String,
    #[serde(default)]
    pub classroom_id: Option<i64>,
    #[serde(default)]
    pub classroom_name: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub duration_hours: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Сводка часов модуля, считается сервером. Клиент только показывает её:
/// локальная арифметика разъехалась бы с параллельными бронированиями.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HoursInfo {
    pub total_hours: f64,
    pub scheduled_hours: f64,
    pub remaining_hours: f64,
}

impl HoursInfo {
    /// Предупреждение, не запрет: решает сервер.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_hours < 1.0
    }
}

/// Списочные эндпоинты отвечают либо конвертом с пагинацией, либо голым
/// массивом - принимаем оба варианта.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated(PageEnvelope<T>),
    Plain(Vec<T>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub pages: i64,
    #[serde(default)]
    pub page: i64,
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Paginated(envelope) => envelope.items,
            ListResponse::Plain(items) => items,
        }
    }
}

/// Выбор аудитории в форме: пусто - использовать аудиторию модуля.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassroomChoice {
    Default,
    Room(Classroom),
}

impl ClassroomChoice {
    pub fn id(&self) -> Option<i64> {
        match self {
            ClassroomChoice::Default => None,
            ClassroomChoice::Room(room) => Some(room.id),
        }
    }
}

impl fmt::Display for ClassroomChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassroomChoice::Default => write!(f, "Аудитория модуля по умолчанию"),
            ClassroomChoice::Room(room) => write!(f, "{}", room),
        }
    }
}

/// Фильтр "моего расписания" преподавателя.
#[derive(Debug, Clone, PartialEq)]
pub enum MyScheduleChoice {
    All,
    Course(Course),
}

impl MyScheduleChoice {
    pub fn course_id(&self) -> Option<i64> {
        match self {
            MyScheduleChoice::All => None,
            MyScheduleChoice::Course(course) => Some(course.id),
        }
    }
}

impl fmt::Display for MyScheduleChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MyScheduleChoice::All => write!(f, "Все мои группы"),
            MyScheduleChoice::Course(course) => write!(f, "{}", course),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchKind {
    #[default]
    Courses,
    Users,
    Classrooms,
}

impl SearchKind {
    pub const ALL: &'static [SearchKind] = &[
        SearchKind::Courses,
        SearchKind::Users,
        SearchKind::Classrooms,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            SearchKind::Courses => "courses",
            SearchKind::Users => "users",
            SearchKind::Classrooms => "classrooms",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            SearchKind::Courses => "Группы",
            SearchKind::Users => "Пользователи",
            SearchKind::Classrooms => "Аудитории",
        })
    }
}

/// Строка результата поиска: у разных сущностей разные поля имени.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SearchHit {
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.title.clone())
            .or_else(|| self.full_name.clone())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "(без названия)".to_string())
    }
}

/// Ошибка, отображаемая внутри формы бронирования.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// Структурный отказ сервера: сводка плюс строки конфликтов,
    /// показываются дословно.
    Conflict { message: String, errors: Vec<String> },
    Other(String),
}

/// Форма бронирования: закрыта либо открыта с черновиком.
/// Переходы: Closed -> (создание | правка) -> отправка -> Closed.
pub enum BookingForm {
    Closed,
    Open(BookingDraft),
}

impl BookingForm {
    pub fn draft(&self) -> Option<&BookingDraft> {
        match self {
            BookingForm::Closed => None,
            BookingForm::Open(draft) => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut BookingDraft> {
        match self {
            BookingForm::Closed => None,
            BookingForm::Open(draft) => Some(draft),
        }
    }
}

pub struct BookingDraft {
    /// None - создание нового занятия, Some - правка существующего.
    pub editing: Option<Lesson>,
    pub course: Option<Course>,
    pub course_module: Option<CourseModule>,
    pub classroom: ClassroomChoice,
    pub date: Date,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: String,
    pub is_recurring: bool,
    pub recurrence_weeks: String,
    pub error: Option<FormError>,
    pub submitting: bool,
}

fn short_time(time: &str) -> String {
    time.chars().take(5).collect()
}

impl BookingDraft {
    /// Черновик по клику на пустой слот. Время окончания намеренно равно
    /// времени начала - так ведёт себя и веб-версия.
    pub fn for_slot(date: NaiveDate, start_time: &str) -> Self {
        Self {
            editing: None,
            course: None,
            course_module: None,
            classroom: ClassroomChoice::Default,
            date: Date::from_ymd(date.year(), date.month(), date.day()),
            start_time: Some(start_time.to_string()),
            end_time: Some(start_time.to_string()),
            notes: String::new(),
            is_recurring: false,
            recurrence_weeks: "4".to_string(),
            error: None,
            submitting: false,
        }
    }

    /// Черновик по клику на событие: все поля из занятия, курс и модуль
    /// менять нельзя - сервер не поддерживает перенос занятия в другой
    /// модуль.
    pub fn for_lesson(lesson: &Lesson, classrooms: &[Classroom]) -> Self {
        let date = crate::schedule::parse_date(&lesson.date)
            .map(|d| Date::from_ymd(d.year(), d.month(), d.day()))
            .unwrap_or_else(Date::today);
        let classroom = lesson
            .classroom_id
            .and_then(|id| classrooms.iter().find(|c| c.id == id))
            .map(|c| ClassroomChoice::Room(c.clone()))
            .unwrap_or(ClassroomChoice::Default);
        Self {
            editing: Some(lesson.clone()),
            course: None,
            course_module: None,
            classroom,
            date,
            start_time: Some(short_time(&lesson.start_time)),
            end_time: Some(short_time(&lesson.end_time)),
            notes: lesson.notes.clone().unwrap_or_default(),
            is_recurring: false,
            recurrence_weeks: "4".to_string(),
            error: None,
            submitting: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn date_string(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.date.year, self.date.month, self.date.day
        )
    }

    fn times(&self) -> Result<(String, String), String> {
        let start = self
            .start_time
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or("Заполните все обязательные поля.")?;
        let end = self
            .end_time
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or("Заполните все обязательные поля.")?;
        Ok((start, end))
    }

    pub fn create_payload(&self) -> Result<LessonCreate, String> {
        let course_module = self
            .course
            .as_ref()
            .and(self.course_module.as_ref())
            .ok_or("Выберите курс и модуль.")?;
        let (start_time, end_time) = self.times()?;
        let recurrence_weeks = if self.is_recurring {
            let weeks: u32 = self
                .recurrence_weeks
                .trim()
                .parse()
                .map_err(|_| "Количество недель должно быть числом от 2 до 20.")?;
            if !(2..=20).contains(&weeks) {
                return Err("Количество недель должно быть от 2 до 20.".to_string());
            }
            Some(weeks)
        } else {
            None
        };
        Ok(LessonCreate {
            course_module_id: course_module.id,
            classroom_id: self.classroom.id(),
            date: self.date_string(),
            start_time,
            end_time,
            notes: self.notes.clone(),
            is_recurring: self.is_recurring,
            recurrence_weeks,
        })
    }

    pub fn update_payload(&self) -> Result<(i64, LessonUpdate), String> {
        let lesson = self
            .editing
            .as_ref()
            .ok_or("Нет занятия для редактирования.")?;
        let (start_time, end_time) = self.times()?;
        Ok((
            lesson.id,
            LessonUpdate {
                date: self.date_string(),
                start_time,
                end_time,
                classroom_id: self.classroom.id(),
                notes: self.notes.clone(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson() -> Lesson {
        Lesson {
            id: 42,
            course_module_id: 9,
            course_id: 7,
            module_id: 2,
            module_name: "Сети".to_string(),
            course_name: None,
            trainer_name: "Петров".to_string(),
            classroom_id: Some(3),
            classroom_name: Some("Б-204".to_string()),
            date: "2024-03-04".to_string(),
            start_time: "10:00:00".to_string(),
            end_time: "12:30:00".to_string(),
            duration_hours: 2.5,
            notes: Some("практика".to_string()),
        }
    }

    #[test]
    fn slot_click_prefills_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let draft = BookingDraft::for_slot(date, "10:00");
        assert_eq!(draft.date_string(), "2024-03-04");
        assert_eq!(draft.start_time.as_deref(), Some("10:00"));
        // Поведение веб-версии: конец совпадает с началом.
        assert_eq!(draft.end_time.as_deref(), Some("10:00"));
        assert!(!draft.is_editing());
    }

    #[test]
    fn lesson_click_prefills_everything() {
        let rooms = vec![Classroom {
            id: 3,
            name: "Б-204".to_string(),
            kind: "лекционная".to_string(),
            capacity: Some(30),
            is_available: true,
        }];
        let draft = BookingDraft::for_lesson(&lesson(), &rooms);
        assert!(draft.is_editing());
        assert_eq!(draft.date_string(), "2024-03-04");
        assert_eq!(draft.start_time.as_deref(), Some("10:00"));
        assert_eq!(draft.end_time.as_deref(), Some("12:30"));
        assert_eq!(draft.notes, "практика");
        assert_eq!(draft.classroom.id(), Some(3));
    }

    #[test]
    fn create_requires_course_and_module() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let draft = BookingDraft::for_slot(date, "10:00");
        assert!(draft.create_payload().is_err());
    }

    #[test]
    fn recurrence_weeks_are_bounded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut draft = BookingDraft::for_slot(date, "10:00");
        draft.course = Some(Course {
            id: 7,
            name: "Веб".to_string(),
            area: None,
            status: None,
        });
        draft.course_module = Some(CourseModule {
            id: 9,
            course_id: 7,
            module_id: 2,
            module: None,
            trainer_id: None,
            trainer: None,
            classroom_id: None,
            total_hours: 25.0,
            order: 1,
        });
        draft.is_recurring = true;
        draft.recurrence_weeks = "21".to_string();
        assert!(draft.create_payload().is_err());
        draft.recurrence_weeks = "4".to_string();
        let payload = draft.create_payload().unwrap();
        assert_eq!(payload.recurrence_weeks, Some(4));
    }

    #[test]
    fn hours_warning_threshold() {
        let ok = HoursInfo {
            total_hours: 25.0,
            scheduled_hours: 20.0,
            remaining_hours: 5.0,
        };
        let exhausted = HoursInfo {
            total_hours: 25.0,
            scheduled_hours: 25.0,
            remaining_hours: 0.0,
        };
        assert!(!ok.is_exhausted());
        assert!(exhausted.is_exhausted());
    }

    #[test]
    fn list_response_accepts_both_shapes() {
        let plain: ListResponse<Course> =
            serde_json::from_str(r#"[{"id":1,"name":"Веб"}]"#).unwrap();
        assert_eq!(plain.into_items().len(), 1);

        let paged: ListResponse<Course> = serde_json::from_str(
            r#"{"items":[{"id":1,"name":"Веб"},{"id":2,"name":"Сети"}],"total":45,"pages":3,"page":1}"#,
        )
        .unwrap();
        assert_eq!(paged.into_items().len(), 2);
    }
}
