//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 외부 소스 조회 오류
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 소스가 빈 결과를 반환함
    #[error("Empty data from source: {0}")]
    EmptyData(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 참조 파일을 찾을 수 없음
    #[error("Reference file not found: {0}")]
    ReferenceFileMissing(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// 데이터 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, DataError>;

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound(err.to_string()),
            sqlx::Error::PoolTimedOut => DataError::ConnectionError(err.to_string()),
            other => DataError::QueryError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            DataError::ConnectionError(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}
