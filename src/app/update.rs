use std::time::Duration;

use chrono::Local;
use iced::Task;
use regex::Regex;
use tracing::{debug, error, warn};

use crate::api::{ApiError, LoginAttempt};
use crate::app::state::{BookingDraft, BookingForm, FormError, Screen, UserInfo};
use crate::config::{Config, save_config, theme_from_str};
use crate::schedule::{self, ViewDimension};
use crate::screens::settings::theme_to_str;

use super::{App, Message};

/// Ошибка API в ошибку формы: конфликт сохраняет структуру, остальное
/// сводится к тексту.
fn form_error(err: ApiError) -> FormError {
    match err {
        ApiError::Conflict { message, errors } => FormError::Conflict { message, errors },
        other => FormError::Other(other.to_string()),
    }
}

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // --- Вход ---
            Message::LoginEmailChanged(v) => {
                self.login_email = v;
                Task::none()
            }
            Message::LoginPasswordChanged(v) => {
                self.login_password = v;
                Task::none()
            }
            Message::LoginCodeChanged(v) => {
                self.login_code = v;
                Task::none()
            }
            Message::LoginPressed => {
                if let Some(email) = self.awaiting_two_factor.clone() {
                    if self.login_code.trim().is_empty() {
                        self.error_message = "Введите код подтверждения.".to_string();
                        return Task::none();
                    }
                    let api = self.api.clone();
                    let code = self.login_code.trim().to_string();
                    return Task::perform(
                        async move {
                            api.verify_two_factor(&email, &code)
                                .await
                                .map_err(|e| e.to_string())
                        },
                        Message::LoginFinished,
                    );
                }
                if self.login_email.trim().is_empty() || self.login_password.trim().is_empty() {
                    self.error_message = "Пожалуйста, заполните все поля.".to_string();
                    return Task::none();
                }
                let email_re = Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").unwrap();
                if !email_re.is_match(self.login_email.trim()) {
                    self.error_message = "Некорректный адрес почты.".to_string();
                    return Task::none();
                }
                let api = self.api.clone();
                let email = self.login_email.trim().to_string();
                let password = self.login_password.clone();
                Task::perform(
                    async move { api.login(&email, &password).await.map_err(|e| e.to_string()) },
                    Message::LoginFinished,
                )
            }
            Message::LoginFinished(result) => match result {
                Ok(LoginAttempt::TwoFactorRequired { email }) => {
                    self.awaiting_two_factor = Some(email);
                    self.login_notice = Some("Код отправлен на вашу почту.".to_string());
                    self.error_message.clear();
                    Task::none()
                }
                Ok(LoginAttempt::LoggedIn { token, user }) => {
                    self.api.set_token(Some(token.clone()));
                    self.persist_config(Some(token));
                    self.finish_sign_in(user)
                }
                Err(e) => {
                    warn!("вход не удался: {}", e);
                    self.error_message = if self.awaiting_two_factor.is_some() {
                        "Код неверен или истёк.".to_string()
                    } else {
                        e
                    };
                    Task::none()
                }
            },
            Message::SessionRestored(result) => match result {
                Ok(user) => self.finish_sign_in(user),
                Err(e) => {
                    // Сохранённый токен больше не действителен - стираем.
                    debug!("сессия не восстановлена: {}", e);
                    self.api.set_token(None);
                    self.persist_config(None);
                    self.current_screen = Screen::Login;
                    Task::none()
                }
            },
            Message::Logout => {
                self.api.set_token(None);
                self.persist_config(None);
                let mut fresh = App::default();
                fresh.theme = self.theme.clone();
                fresh.api = self.api.clone();
                *self = fresh;
                self.current_screen = Screen::Login;
                Task::none()
            }
            // --- Навигация ---
            Message::GoToSchedule => {
                self.current_screen = Screen::Schedule;
                self.load_schedule_data()
            }
            Message::GoToScheduleView => {
                self.current_screen = Screen::ScheduleView;
                self.load_consult_data()
            }
            Message::GoToSearch => {
                self.current_screen = Screen::Search;
                Task::none()
            }
            Message::GoToProfile => {
                self.current_screen = Screen::Profile;
                Task::none()
            }
            Message::GoToSettings => {
                self.current_screen = Screen::Settings;
                Task::none()
            }
            Message::ThemeSelected(name) => {
                if let Some(theme) = theme_from_str(name) {
                    self.theme = theme;
                    self.persist_config(self.api.token().map(str::to_string));
                }
                Task::none()
            }
            // --- Экран бронирования ---
            Message::ReloadSchedule => self.load_schedule_data(),
            Message::ScheduleDataLoaded(result) => {
                self.schedule_loading = false;
                match result {
                    Ok((lessons, courses, classrooms)) => {
                        self.lessons = lessons;
                        self.courses = courses;
                        self.classrooms = classrooms;
                        self.schedule_error = None;
                    }
                    Err(e) => {
                        error!("не удалось загрузить расписание: {}", e);
                        self.schedule_error = Some(format!("Ошибка загрузки данных: {}", e));
                    }
                }
                Task::none()
            }
            Message::DismissScheduleError => {
                self.schedule_error = None;
                Task::none()
            }
            Message::CalendarViewSelected(view) => {
                self.current_view = view;
                Task::none()
            }
            Message::CalendarToday => {
                self.current_date = Local::now().date_naive();
                Task::none()
            }
            Message::CalendarPrev => {
                self.current_date = schedule::step(self.current_view, self.current_date, false);
                Task::none()
            }
            Message::CalendarNext => {
                self.current_date = schedule::step(self.current_view, self.current_date, true);
                Task::none()
            }
            // --- Форма бронирования ---
            Message::SlotClicked(date, start_time) => {
                self.course_modules.clear();
                self.hours_info = None;
                self.booking = BookingForm::Open(BookingDraft::for_slot(date, &start_time));
                Task::none()
            }
            Message::EventClicked(lesson_id) => {
                let Some(lesson) = self.lessons.iter().find(|l| l.id == lesson_id) else {
                    return Task::none();
                };
                self.booking =
                    BookingForm::Open(BookingDraft::for_lesson(lesson, &self.classrooms));
                self.course_modules.clear();
                self.hours_info = None;
                Task::none()
            }
            Message::FormCourseSelected(course) => {
                let Some(draft) = self.booking.draft_mut() else {
                    return Task::none();
                };
                draft.course_module = None;
                draft.course = Some(course.clone());
                self.course_modules.clear();
                self.hours_info = None;
                self.modules_gen += 1;
                let generation = self.modules_gen;
                let api = self.api.clone();
                Task::perform(
                    async move {
                        let result = api
                            .course_modules(course.id)
                            .await
                            .map_err(|e| e.to_string());
                        (generation, result)
                    },
                    |(generation, result)| Message::FormModulesLoaded(generation, result),
                )
            }
            Message::FormModulesLoaded(generation, result) => {
                if generation != self.modules_gen {
                    debug!("ответ модулей с устаревшим поколением отброшен");
                    return Task::none();
                }
                match result {
                    Ok(modules) => self.course_modules = modules,
                    Err(e) => {
                        // Список остаётся пустым: выбор модуля недоступен,
                        // но форма продолжает работать.
                        warn!("не удалось загрузить модули курса: {}", e);
                        self.course_modules.clear();
                    }
                }
                Task::none()
            }
            Message::FormModuleSelected(module) => {
                let Some(draft) = self.booking.draft_mut() else {
                    return Task::none();
                };
                draft.course_module = Some(module.clone());
                self.hours_info = None;
                self.hours_gen += 1;
                let generation = self.hours_gen;
                let api = self.api.clone();
                Task::perform(
                    async move {
                        let result = api.hours_info(module.id).await.map_err(|e| e.to_string());
                        (generation, result)
                    },
                    |(generation, result)| Message::HoursInfoLoaded(generation, result),
                )
            }
            Message::HoursInfoLoaded(generation, result) => {
                if generation != self.hours_gen {
                    debug!("ответ сводки часов с устаревшим поколением отброшен");
                    return Task::none();
                }
                match result {
                    Ok(info) => self.hours_info = Some(info),
                    Err(e) => {
                        warn!("не удалось загрузить сводку часов: {}", e);
                        self.hours_info = None;
                    }
                }
                Task::none()
            }
            Message::FormClassroomSelected(choice) => {
                if let Some(draft) = self.booking.draft_mut() {
                    draft.classroom = choice;
                }
                Task::none()
            }
            Message::FormChooseDate => {
                self.show_form_date_picker = true;
                Task::none()
            }
            Message::FormDateSubmitted(date) => {
                if let Some(draft) = self.booking.draft_mut() {
                    draft.date = date;
                }
                self.show_form_date_picker = false;
                Task::none()
            }
            Message::FormDateCancelled => {
                self.show_form_date_picker = false;
                Task::none()
            }
            Message::FormStartTimeSelected(time) => {
                if let Some(draft) = self.booking.draft_mut() {
                    draft.start_time = Some(time);
                }
                Task::none()
            }
            Message::FormEndTimeSelected(time) => {
                if let Some(draft) = self.booking.draft_mut() {
                    draft.end_time = Some(time);
                }
                Task::none()
            }
            Message::FormNotesChanged(notes) => {
                if let Some(draft) = self.booking.draft_mut() {
                    draft.notes = notes;
                }
                Task::none()
            }
            Message::FormRecurringToggled(value) => {
                if let Some(draft) = self.booking.draft_mut() {
                    draft.is_recurring = value;
                }
                Task::none()
            }
            Message::FormWeeksChanged(value) => {
                if let Some(draft) = self.booking.draft_mut() {
                    if value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) {
                        draft.recurrence_weeks = value;
                    }
                }
                Task::none()
            }
            Message::SubmitBooking => {
                let Some(draft) = self.booking.draft_mut() else {
                    return Task::none();
                };
                draft.error = None;
                if draft.is_editing() {
                    match draft.update_payload() {
                        Ok((id, payload)) => {
                            draft.submitting = true;
                            let api = self.api.clone();
                            Task::perform(
                                async move { api.update_lesson(id, &payload).await },
                                |result| Message::BookingSaved(result.map_err(form_error)),
                            )
                        }
                        Err(msg) => {
                            draft.error = Some(FormError::Other(msg));
                            Task::none()
                        }
                    }
                } else {
                    match draft.create_payload() {
                        Ok(payload) => {
                            draft.submitting = true;
                            let api = self.api.clone();
                            Task::perform(
                                async move { api.create_lesson(&payload).await },
                                |result| Message::BookingSaved(result.map_err(form_error)),
                            )
                        }
                        Err(msg) => {
                            draft.error = Some(FormError::Other(msg));
                            Task::none()
                        }
                    }
                }
            }
            Message::BookingSaved(result) => match result {
                Ok(()) => {
                    // Полная перезагрузка вместо локальной правки списка:
                    // параллельные бронирования могли изменить соседние
                    // занятия.
                    self.booking = BookingForm::Closed;
                    self.hours_info = None;
                    self.course_modules.clear();
                    self.load_schedule_data()
                }
                Err(err) => {
                    if let Some(draft) = self.booking.draft_mut() {
                        draft.submitting = false;
                        draft.error = Some(err);
                    }
                    Task::none()
                }
            },
            Message::CancelBooking => {
                self.booking = BookingForm::Closed;
                self.hours_info = None;
                self.course_modules.clear();
                self.confirm_delete = false;
                Task::none()
            }
            // --- Удаление занятия ---
            Message::AskDeleteLesson => {
                if self.booking.draft().is_some_and(|d| d.is_editing()) {
                    self.confirm_delete = true;
                }
                Task::none()
            }
            Message::CancelDeleteLesson => {
                self.confirm_delete = false;
                Task::none()
            }
            Message::ConfirmDeleteLesson => {
                let Some(lesson_id) = self
                    .booking
                    .draft()
                    .and_then(|d| d.editing.as_ref())
                    .map(|l| l.id)
                else {
                    self.confirm_delete = false;
                    return Task::none();
                };
                self.deleting = true;
                let api = self.api.clone();
                Task::perform(
                    async move { api.delete_lesson(lesson_id).await.map_err(|e| e.to_string()) },
                    Message::LessonDeleted,
                )
            }
            Message::LessonDeleted(result) => {
                self.deleting = false;
                self.confirm_delete = false;
                match result {
                    Ok(()) => {
                        self.booking = BookingForm::Closed;
                        self.hours_info = None;
                        self.course_modules.clear();
                        self.load_schedule_data()
                    }
                    Err(e) => {
                        // Форма остаётся открытой, ошибка показывается в ней.
                        if let Some(draft) = self.booking.draft_mut() {
                            draft.error =
                                Some(FormError::Other(format!("Ошибка удаления: {}", e)));
                        }
                        Task::none()
                    }
                }
            }
            // --- Экран консультации ---
            Message::ConsultDataLoaded(result) => {
                match result {
                    Ok((courses, trainers, classrooms)) => {
                        self.courses = courses;
                        self.trainers = trainers;
                        self.classrooms = classrooms;
                        self.consult_error = None;
                    }
                    Err(e) => {
                        error!("не удалось загрузить справочники: {}", e);
                        self.consult_error = Some(format!("Ошибка загрузки данных: {}", e));
                    }
                }
                Task::none()
            }
            Message::DimensionSelected(dimension) => {
                self.consult_dimension = dimension;
                self.consult_course = None;
                self.consult_trainer = None;
                self.consult_classroom = None;
                self.consult_lessons.clear();
                self.table_pager.reset(0);
                Task::none()
            }
            Message::ConsultCourseSelected(course) => {
                self.consult_course = Some(course);
                self.load_consult_lessons()
            }
            Message::ConsultTrainerSelected(trainer) => {
                self.consult_trainer = Some(trainer);
                self.load_consult_lessons()
            }
            Message::ConsultClassroomSelected(classroom) => {
                self.consult_classroom = Some(classroom);
                self.load_consult_lessons()
            }
            Message::MyScheduleFilterSelected(choice) => {
                self.my_schedule_filter = choice;
                self.load_consult_lessons()
            }
            Message::ConsultLessonsLoaded(generation, result) => {
                if generation != self.consult_gen {
                    debug!("ответ занятий с устаревшим поколением отброшен");
                    return Task::none();
                }
                self.consult_loading = false;
                match result {
                    Ok(lessons) => {
                        self.table_pager.reset(lessons.len());
                        self.consult_lessons = lessons;
                        self.consult_error = None;
                    }
                    Err(e) => {
                        error!("не удалось загрузить занятия: {}", e);
                        self.consult_lessons.clear();
                        self.table_pager.reset(0);
                        self.consult_error = Some(format!("Ошибка загрузки расписания: {}", e));
                    }
                }
                Task::none()
            }
            Message::DismissConsultError => {
                self.consult_error = None;
                Task::none()
            }
            Message::ConsultViewSelected(view) => {
                self.consult_view = view;
                Task::none()
            }
            Message::ConsultToday => {
                self.consult_date = Local::now().date_naive();
                Task::none()
            }
            Message::ConsultPrev => {
                self.consult_date = schedule::step(self.consult_view, self.consult_date, false);
                Task::none()
            }
            Message::ConsultNext => {
                self.consult_date = schedule::step(self.consult_view, self.consult_date, true);
                Task::none()
            }
            Message::TablePageChanged(page) => {
                self.table_pager.set_page(page);
                Task::none()
            }
            // --- Поиск ---
            Message::SearchQueryChanged(query) => {
                self.search_query = query;
                self.schedule_search_debounce()
            }
            Message::SearchKindSelected(kind) => {
                self.search_kind = kind;
                self.search_results.clear();
                self.has_searched = false;
                self.search_error = None;
                self.schedule_search_debounce()
            }
            Message::SearchDebounceElapsed(generation) => {
                if generation != self.search_gen {
                    return Task::none();
                }
                let query = self.search_query.trim().to_string();
                if query.chars().count() < 2 {
                    return Task::none();
                }
                self.search_loading = true;
                self.has_searched = true;
                self.search_error = None;
                let api = self.api.clone();
                let kind = self.search_kind;
                Task::perform(
                    async move {
                        let result = api
                            .search(kind, &query, 50)
                            .await
                            .map_err(|e| e.to_string());
                        (generation, result)
                    },
                    |(generation, result)| Message::SearchResultsLoaded(generation, result),
                )
            }
            Message::SearchResultsLoaded(generation, result) => {
                if generation != self.search_gen {
                    debug!("ответ поиска с устаревшим поколением отброшен");
                    return Task::none();
                }
                self.search_loading = false;
                match result {
                    Ok(results) => self.search_results = results,
                    Err(e) => {
                        self.search_results.clear();
                        self.search_error = Some(e);
                    }
                }
                Task::none()
            }
            Message::ErrorOccurred(e) => {
                error!("{}", e);
                self.error_message = e;
                Task::none()
            }
        }
    }

    fn finish_sign_in(&mut self, user: UserInfo) -> Task<Message> {
        let is_admin = user.is_admin();
        self.current_user = Some(user);
        self.login_password.clear();
        self.login_code.clear();
        self.awaiting_two_factor = None;
        self.login_notice = None;
        self.error_message.clear();
        if is_admin {
            self.current_screen = Screen::Schedule;
            self.load_schedule_data()
        } else {
            self.current_screen = Screen::ScheduleView;
            self.load_consult_data()
        }
    }

    /// Параллельная загрузка занятий и справочников экрана бронирования.
    fn load_schedule_data(&mut self) -> Task<Message> {
        self.schedule_loading = true;
        let api = self.api.clone();
        Task::perform(
            async move {
                tokio::try_join!(
                    api.list_lessons(),
                    api.list_courses(),
                    api.list_classrooms()
                )
                .map_err(|e| e.to_string())
            },
            Message::ScheduleDataLoaded,
        )
    }

    /// Справочники экрана консультации: администратору - всё, остальным
    /// сразу их собственное расписание.
    fn load_consult_data(&mut self) -> Task<Message> {
        match &self.current_user {
            Some(user) if user.is_admin() => {
                let api = self.api.clone();
                Task::perform(
                    async move {
                        tokio::try_join!(
                            api.list_courses(),
                            api.list_trainers(),
                            api.list_classrooms()
                        )
                        .map_err(|e| e.to_string())
                    },
                    Message::ConsultDataLoaded,
                )
            }
            Some(_) => self.load_consult_lessons(),
            None => Task::none(),
        }
    }

    fn load_consult_lessons(&mut self) -> Task<Message> {
        self.consult_gen += 1;
        let generation = self.consult_gen;
        self.table_pager.reset(0);
        let api = self.api.clone();
        let is_admin = self
            .current_user
            .as_ref()
            .is_some_and(UserInfo::is_admin);
        if is_admin {
            let selected = match self.consult_dimension {
                ViewDimension::Course => self.consult_course.as_ref().map(|c| c.id),
                ViewDimension::Trainer => self.consult_trainer.as_ref().map(|t| t.id),
                ViewDimension::Classroom => self.consult_classroom.as_ref().map(|c| c.id),
            };
            let Some(id) = selected else {
                self.consult_lessons.clear();
                return Task::none();
            };
            self.consult_loading = true;
            let dimension = self.consult_dimension;
            Task::perform(
                async move {
                    let result = api
                        .lessons_by(dimension, id)
                        .await
                        .map_err(|e| e.to_string());
                    (generation, result)
                },
                |(generation, result)| Message::ConsultLessonsLoaded(generation, result),
            )
        } else {
            self.consult_loading = true;
            let course_id = self.my_schedule_filter.course_id();
            Task::perform(
                async move {
                    let result = api.my_schedule(course_id).await.map_err(|e| e.to_string());
                    (generation, result)
                },
                |(generation, result)| Message::ConsultLessonsLoaded(generation, result),
            )
        }
    }

    /// Откладывает запрос поиска на 300 мс после последнего ввода. Каждое
    /// нажатие повышает поколение, поэтому срабатывает только последний
    /// таймер.
    fn schedule_search_debounce(&mut self) -> Task<Message> {
        self.search_gen += 1;
        if self.search_query.trim().chars().count() < 2 {
            self.search_results.clear();
            self.has_searched = false;
            self.search_error = None;
            self.search_loading = false;
            return Task::none();
        }
        let generation = self.search_gen;
        Task::perform(
            async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                generation
            },
            Message::SearchDebounceElapsed,
        )
    }

    fn persist_config(&self, token: Option<String>) {
        let config = Config {
            theme_name: theme_to_str(&self.theme).to_string(),
            api_base_url: Some(self.api.base_url().to_string()),
            access_token: token,
        };
        if let Err(err) = save_config(&config) {
            warn!("не удалось сохранить настройки: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::app::state::{Course, Lesson, SearchHit};

    fn lesson() -> Lesson {
        Lesson {
            id: 42,
            course_module_id: 9,
            course_id: 7,
            module_id: 2,
            module_name: "Сети".to_string(),
            course_name: None,
            trainer_name: "Петров".to_string(),
            classroom_id: None,
            classroom_name: None,
            date: "2024-03-04".to_string(),
            start_time: "10:00:00".to_string(),
            end_time: "12:00:00".to_string(),
            duration_hours: 2.0,
            notes: None,
        }
    }

    #[test]
    fn slot_click_opens_creation_form() {
        let mut app = App::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let _ = app.update(Message::SlotClicked(date, "10:00".to_string()));
        let draft = app.booking.draft().expect("форма должна открыться");
        assert!(!draft.is_editing());
        assert_eq!(draft.date_string(), "2024-03-04");
        assert_eq!(draft.start_time.as_deref(), Some("10:00"));
    }

    #[test]
    fn event_click_opens_editing_form() {
        let mut app = App::default();
        app.lessons = vec![lesson()];
        let _ = app.update(Message::EventClicked(42));
        let draft = app.booking.draft().expect("форма должна открыться");
        assert!(draft.is_editing());
        assert_eq!(draft.start_time.as_deref(), Some("10:00"));
        assert_eq!(draft.end_time.as_deref(), Some("12:00"));
    }

    #[test]
    fn conflict_keeps_form_open_with_draft() {
        let mut app = App::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let _ = app.update(Message::SlotClicked(date, "10:00".to_string()));
        if let Some(draft) = app.booking.draft_mut() {
            draft.notes = "введено администратором".to_string();
        }
        let _ = app.update(Message::BookingSaved(Err(FormError::Conflict {
            message: "X".to_string(),
            errors: vec!["A".to_string(), "B".to_string()],
        })));
        let draft = app.booking.draft().expect("форма осталась открытой");
        assert_eq!(draft.notes, "введено администратором");
        match draft.error.as_ref().expect("ошибка показана") {
            FormError::Conflict { message, errors } => {
                assert_eq!(message, "X");
                assert_eq!(errors, &vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("ожидался конфликт, получено: {:?}", other),
        }
    }

    #[test]
    fn successful_delete_closes_everything() {
        let mut app = App::default();
        app.lessons = vec![lesson()];
        let _ = app.update(Message::EventClicked(42));
        let _ = app.update(Message::AskDeleteLesson);
        assert!(app.confirm_delete);
        let _ = app.update(Message::LessonDeleted(Ok(())));
        assert!(!app.confirm_delete);
        assert!(app.booking.draft().is_none());
    }

    #[test]
    fn failed_delete_keeps_form_open() {
        let mut app = App::default();
        app.lessons = vec![lesson()];
        let _ = app.update(Message::EventClicked(42));
        let _ = app.update(Message::LessonDeleted(Err("сбой".to_string())));
        let draft = app.booking.draft().expect("форма осталась открытой");
        assert!(matches!(draft.error, Some(FormError::Other(_))));
    }

    #[test]
    fn stale_module_response_is_dropped() {
        let mut app = App::default();
        app.modules_gen = 5;
        let modules = vec![];
        let _ = app.update(Message::FormModulesLoaded(3, Ok(modules)));
        assert!(app.course_modules.is_empty());
        // Актуальное поколение принимается.
        let fresh = vec![crate::app::state::CourseModule {
            id: 9,
            course_id: 7,
            module_id: 2,
            module: None,
            trainer_id: None,
            trainer: None,
            classroom_id: None,
            total_hours: 25.0,
            order: 1,
        }];
        let _ = app.update(Message::FormModulesLoaded(5, Ok(fresh)));
        assert_eq!(app.course_modules.len(), 1);
    }

    #[test]
    fn stale_search_response_is_dropped() {
        let mut app = App::default();
        app.search_gen = 8;
        let hit = SearchHit {
            id: Some(1),
            name: Some("Веб".to_string()),
            title: None,
            full_name: None,
            email: None,
        };
        let _ = app.update(Message::SearchResultsLoaded(7, Ok(vec![hit.clone()])));
        assert!(app.search_results.is_empty());
        let _ = app.update(Message::SearchResultsLoaded(8, Ok(vec![hit])));
        assert_eq!(app.search_results.len(), 1);
    }

    #[test]
    fn short_query_clears_results() {
        let mut app = App::default();
        app.search_results = vec![SearchHit {
            id: None,
            name: Some("старый".to_string()),
            title: None,
            full_name: None,
            email: None,
        }];
        app.has_searched = true;
        let _ = app.update(Message::SearchQueryChanged("в".to_string()));
        assert!(app.search_results.is_empty());
        assert!(!app.has_searched);
    }

    #[test]
    fn two_factor_challenge_switches_login_stage() {
        let mut app = App::default();
        let _ = app.update(Message::LoginFinished(Ok(LoginAttempt::TwoFactorRequired {
            email: "admin@example.com".to_string(),
        })));
        assert_eq!(
            app.awaiting_two_factor.as_deref(),
            Some("admin@example.com")
        );
        assert!(app.login_notice.is_some());
    }

    #[test]
    fn empty_login_fields_block_submission() {
        let mut app = App::default();
        let _ = app.update(Message::LoginPressed);
        assert!(!app.error_message.is_empty());
    }

    #[test]
    fn dimension_change_resets_selection() {
        let mut app = App::default();
        app.consult_course = Some(Course {
            id: 7,
            name: "Веб".to_string(),
            area: None,
            status: None,
        });
        app.consult_lessons = vec![lesson()];
        let _ = app.update(Message::DimensionSelected(ViewDimension::Trainer));
        assert!(app.consult_course.is_none());
        assert!(app.consult_lessons.is_empty());
    }

    #[test]
    fn out_of_range_table_page_is_noop() {
        let mut app = App::default();
        // 45 занятий по 10 на страницу: 5 страниц, шестой нет.
        app.table_pager.reset(45);
        let _ = app.update(Message::TablePageChanged(6));
        assert_eq!(app.table_pager.page, 1);
        let _ = app.update(Message::TablePageChanged(5));
        assert_eq!(app.table_pager.page, 5);
    }
}
