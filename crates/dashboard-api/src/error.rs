//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 `{"code": ..., "message": ...}` 형식의 에러를
//! 일관되게 반환합니다. 폴백 캐스케이드를 쓰는 엔드포인트는 항상
//! 200을 반환하므로 이 타입을 쓰지 않습니다.

use axum::http::StatusCode;
use axum::Json;
use dashboard_data::DataError;
use serde::{Deserialize, Serialize};

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "기업을 찾을 수 없습니다: 삼성전자"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_ERROR", "INVALID_INPUT", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    /// 새로운 에러 응답 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 404 응답 생성.
pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::new("NOT_FOUND", message)),
    )
}

/// 400 응답 생성.
pub fn invalid_input(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("INVALID_INPUT", message)),
    )
}

/// 503 응답 생성 (DB 미연결 등).
pub fn service_unavailable(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiErrorResponse::new("SERVICE_UNAVAILABLE", message)),
    )
}

/// DataError를 상태 코드 + 에러 응답으로 변환.
pub fn from_data_error(err: DataError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = match &err {
        DataError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DataError::ReferenceFileMissing(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DataError::InvalidData(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        DataError::ConnectionError(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        DataError::FetchError(_) | DataError::EmptyData(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "SOURCE_ERROR")
        }
        DataError::QueryError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}
