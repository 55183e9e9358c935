use chrono::NaiveDate;
use iced_aw::date_picker::Date;

use crate::api::LoginAttempt;
use crate::app::state::{
    Classroom, ClassroomChoice, Course, CourseModule, FormError, HoursInfo, Lesson,
    MyScheduleChoice, SearchHit, SearchKind, UserInfo,
};
use crate::schedule::{CalendarView, ViewDimension};

#[derive(Debug, Clone)]
pub enum Message {
    // Вход
    LoginEmailChanged(String),
    LoginPasswordChanged(String),
    LoginCodeChanged(String),
    LoginPressed,
    LoginFinished(Result<LoginAttempt, String>),
    SessionRestored(Result<UserInfo, String>),
    Logout,
    //
    GoToSchedule,
    GoToScheduleView,
    GoToSearch,
    GoToProfile,
    GoToSettings,
    ThemeSelected(&'static str),
    //
    // Экран бронирования
    ReloadSchedule,
    ScheduleDataLoaded(Result<(Vec<Lesson>, Vec<Course>, Vec<Classroom>), String>),
    DismissScheduleError,
    CalendarViewSelected(CalendarView),
    CalendarToday,
    CalendarPrev,
    CalendarNext,
    //
    // Форма бронирования
    SlotClicked(NaiveDate, String),
    EventClicked(i64),
    FormCourseSelected(Course),
    FormModulesLoaded(u64, Result<Vec<CourseModule>, String>),
    FormModuleSelected(CourseModule),
    HoursInfoLoaded(u64, Result<HoursInfo, String>),
    FormClassroomSelected(ClassroomChoice),
    FormChooseDate,
    FormDateSubmitted(Date),
    FormDateCancelled,
    FormStartTimeSelected(String),
    FormEndTimeSelected(String),
    FormNotesChanged(String),
    FormRecurringToggled(bool),
    FormWeeksChanged(String),
    SubmitBooking,
    BookingSaved(Result<(), FormError>),
    CancelBooking,
    //
    // Удаление занятия: подтверждение -> запрос -> перезагрузка
    AskDeleteLesson,
    ConfirmDeleteLesson,
    CancelDeleteLesson,
    LessonDeleted(Result<(), String>),
    //
    // Экран консультации
    ConsultDataLoaded(Result<(Vec<Course>, Vec<UserInfo>, Vec<Classroom>), String>),
    DimensionSelected(ViewDimension),
    ConsultCourseSelected(Course),
    ConsultTrainerSelected(UserInfo),
    ConsultClassroomSelected(Classroom),
    MyScheduleFilterSelected(MyScheduleChoice),
    ConsultLessonsLoaded(u64, Result<Vec<Lesson>, String>),
    DismissConsultError,
    ConsultViewSelected(CalendarView),
    ConsultToday,
    ConsultPrev,
    ConsultNext,
    TablePageChanged(usize),
    //
    // Поиск
    SearchQueryChanged(String),
    SearchKindSelected(SearchKind),
    SearchDebounceElapsed(u64),
    SearchResultsLoaded(u64, Result<Vec<SearchHit>, String>),
    //
    ErrorOccurred(String),
}
