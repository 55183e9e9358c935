use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::state::{
    Classroom, Course, CourseModule, HoursInfo, Lesson, ListResponse, SearchHit, SearchKind,
    UserInfo,
};
use crate::schedule::ViewDimension;

/// Ошибки REST-клиента. Конфликт расписания - отдельный вариант: форма
/// показывает его построчно и остаётся открытой.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{message}")]
    Conflict { message: String, errors: Vec<String> },
    #[error("Нет прав для доступа к этой функции.")]
    Forbidden,
    #[error("Сессия недействительна. Войдите заново.")]
    Unauthorized,
    #[error("{0}")]
    Api(String),
    #[error("Ошибка сети: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: DetailField,
}

/// Тело ошибки сервера: либо `{detail: "строка"}`, либо структурный
/// конфликт `{detail: {message, errors: [{message}, ...]}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetailField {
    Conflict(ConflictDetail),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ConflictDetail {
    message: String,
    #[serde(default)]
    errors: Vec<ConflictLine>,
}

#[derive(Debug, Deserialize)]
struct ConflictLine {
    message: String,
}

pub fn parse_error_body(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => return ApiError::Unauthorized,
        StatusCode::FORBIDDEN => return ApiError::Forbidden,
        _ => {}
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => match parsed.detail {
            DetailField::Conflict(detail) => ApiError::Conflict {
                message: detail.message,
                errors: detail.errors.into_iter().map(|e| e.message).collect(),
            },
            DetailField::Text(text) => ApiError::Api(text),
        },
        Err(_) => ApiError::Api(format!("HTTP {}", status.as_u16())),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonCreate {
    pub course_module_id: i64,
    pub classroom_id: Option<i64>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: String,
    pub is_recurring: bool,
    /// Отсутствует в JSON, если повторение не запрошено.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_weeks: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonUpdate {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub classroom_id: Option<i64>,
    pub notes: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TwoFactorChallenge {
    email: String,
}

#[derive(Debug, Clone)]
pub enum LoginAttempt {
    LoggedIn { token: String, user: UserInfo },
    /// Сервер ответил 202: выслан код подтверждения на этот адрес.
    TwoFactorRequired { email: String },
}

/// REST-клиент. Дёшево клонируется в асинхронные задачи; токен подставляется
/// в каждый запрос заголовком Authorization.
#[derive(Clone)]
pub struct Api {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl Api {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status, &body));
        }
        Ok(response.json::<T>().await?)
    }

    async fn expect_ok(response: Response) -> Result<(), ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status, &body));
        }
        Ok(())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.authorize(self.http.get(self.url(path))).send().await?;
        Self::decode(response).await
    }

    // --- Аутентификация ---

    pub async fn me(&self) -> Result<UserInfo, ApiError> {
        self.fetch_json("/auth/me").await
    }

    /// Вход по паролю. Сервер принимает form-urlencoded и может ответить
    /// 202 - тогда требуется второй шаг с кодом.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginAttempt, ApiError> {
        let form = [("username", email), ("password", password)];
        let response = self
            .http
            .post(self.url("/auth/login"))
            .form(&form)
            .send()
            .await?;
        if response.status() == StatusCode::ACCEPTED {
            let challenge: TwoFactorChallenge = response.json().await?;
            return Ok(LoginAttempt::TwoFactorRequired {
                email: challenge.email,
            });
        }
        let token: TokenResponse = Self::decode(response).await?;
        self.finish_login(token.access_token).await
    }

    pub async fn verify_two_factor(
        &self,
        email: &str,
        code: &str,
    ) -> Result<LoginAttempt, ApiError> {
        let body = serde_json::json!({ "email": email, "code": code });
        let response = self
            .http
            .post(self.url("/auth/login/2fa"))
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = Self::decode(response).await?;
        self.finish_login(token.access_token).await
    }

    async fn finish_login(&self, token: String) -> Result<LoginAttempt, ApiError> {
        let mut authed = self.clone();
        authed.set_token(Some(token.clone()));
        let user = authed.me().await?;
        Ok(LoginAttempt::LoggedIn { token, user })
    }

    // --- Справочники ---

    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let list: ListResponse<Course> = self.fetch_json("/courses/").await?;
        Ok(list.into_items())
    }

    pub async fn list_classrooms(&self) -> Result<Vec<Classroom>, ApiError> {
        let list: ListResponse<Classroom> = self.fetch_json("/classrooms/").await?;
        Ok(list.into_items())
    }

    /// Преподаватели: общий список пользователей, отфильтрованный по роли.
    pub async fn list_trainers(&self) -> Result<Vec<UserInfo>, ApiError> {
        let list: ListResponse<UserInfo> = self.fetch_json("/users/").await?;
        Ok(list
            .into_items()
            .into_iter()
            .filter(|u| u.role.as_deref() == Some("professor"))
            .collect())
    }

    pub async fn course_modules(&self, course_id: i64) -> Result<Vec<CourseModule>, ApiError> {
        let mut modules: Vec<CourseModule> = self
            .fetch_json(&format!("/courses/{}/modules", course_id))
            .await?;
        modules.sort_by_key(|m| m.order);
        Ok(modules)
    }

    // --- Занятия ---

    pub async fn list_lessons(&self) -> Result<Vec<Lesson>, ApiError> {
        self.fetch_json("/lessons/").await
    }

    pub async fn lessons_by(
        &self,
        dimension: ViewDimension,
        id: i64,
    ) -> Result<Vec<Lesson>, ApiError> {
        let path = match dimension {
            ViewDimension::Course => format!("/lessons/by-course/{}", id),
            ViewDimension::Trainer => format!("/lessons/by-trainer/{}", id),
            ViewDimension::Classroom => format!("/lessons/by-classroom/{}", id),
        };
        self.fetch_json(&path).await
    }

    pub async fn my_schedule(&self, course_id: Option<i64>) -> Result<Vec<Lesson>, ApiError> {
        let path = match course_id {
            Some(id) => format!("/lessons/my-schedule?course_id={}", id),
            None => "/lessons/my-schedule".to_string(),
        };
        self.fetch_json(&path).await
    }

    pub async fn hours_info(&self, course_module_id: i64) -> Result<HoursInfo, ApiError> {
        self.fetch_json(&format!("/lessons/hours-info/{}", course_module_id))
            .await
    }

    pub async fn create_lesson(&self, payload: &LessonCreate) -> Result<(), ApiError> {
        let response = self
            .authorize(self.http.post(self.url("/lessons/")))
            .json(payload)
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    pub async fn update_lesson(&self, id: i64, payload: &LessonUpdate) -> Result<(), ApiError> {
        let response = self
            .authorize(self.http.put(self.url(&format!("/lessons/{}", id))))
            .json(payload)
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    pub async fn delete_lesson(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .authorize(self.http.delete(self.url(&format!("/lessons/{}", id))))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    // --- Поиск ---

    pub async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, ApiError> {
        let response = self
            .authorize(
                self.http
                    .get(self.url(&format!("/search/{}", kind.path())))
                    .query(&[("q", query), ("limit", &limit.to_string())]),
            )
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_body_is_itemized() {
        let body = r#"{"detail":{"message":"X","errors":[{"message":"A"},{"message":"B"}]}}"#;
        let err = parse_error_body(StatusCode::CONFLICT, body);
        match err {
            ApiError::Conflict { message, errors } => {
                assert_eq!(message, "X");
                assert_eq!(errors, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("ожидался конфликт, получено: {:?}", other),
        }
    }

    #[test]
    fn plain_detail_becomes_api_error() {
        let body = r#"{"detail":"Занятие не найдено"}"#;
        let err = parse_error_body(StatusCode::NOT_FOUND, body);
        assert_eq!(err, ApiError::Api("Занятие не найдено".to_string()));
    }

    #[test]
    fn status_dominates_for_auth_errors() {
        assert_eq!(
            parse_error_body(StatusCode::FORBIDDEN, r#"{"detail":"x"}"#),
            ApiError::Forbidden
        );
        assert_eq!(
            parse_error_body(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        );
    }

    #[test]
    fn unreadable_body_falls_back_to_status() {
        let err = parse_error_body(StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert_eq!(err, ApiError::Api("HTTP 500".to_string()));
    }

    #[test]
    fn non_recurring_payload_omits_weeks() {
        let payload = LessonCreate {
            course_module_id: 9,
            classroom_id: None,
            date: "2024-03-04".to_string(),
            start_time: "10:00".to_string(),
            end_time: "12:00".to_string(),
            notes: String::new(),
            is_recurring: false,
            recurrence_weeks: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("recurrence_weeks").is_none());
        assert_eq!(value["is_recurring"], serde_json::json!(false));
        // Пустая аудитория уходит как null: сервер подставит аудиторию модуля.
        assert!(value["classroom_id"].is_null());
    }

    #[test]
    fn recurring_payload_carries_weeks() {
        let payload = LessonCreate {
            course_module_id: 9,
            classroom_id: Some(3),
            date: "2024-03-04".to_string(),
            start_time: "10:00".to_string(),
            end_time: "12:00".to_string(),
            notes: String::new(),
            is_recurring: true,
            recurrence_weeks: Some(6),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["recurrence_weeks"], serde_json::json!(6));
    }
}
