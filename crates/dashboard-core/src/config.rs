//! 설정 관리.
//!
//! 애플리케이션 설정을 환경 변수에서 로드합니다.
//! 모든 값에는 로컬 개발에 적합한 기본값이 있습니다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 외부 데이터 조회 설정
    pub fetch: FetchConfig,
}

impl AppConfig {
    /// 환경 변수에서 설정을 로드합니다.
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            fetch: FetchConfig::from_env(),
        }
    }
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드 (`API_HOST`, `API_PORT`).
    pub fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self { host, port }
    }

    /// `host:port` 형태의 바인딩 주소를 반환합니다.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 연결 문자열 (없으면 문서 저장소 없이 기동)
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// 환경 변수에서 설정 로드 (`DATABASE_URL`, `DB_MAX_CONNECTIONS`).
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL").ok();
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let connect_timeout_secs = std::env::var("DB_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            url,
            max_connections,
            connect_timeout_secs,
        }
    }

    /// 연결 타임아웃을 Duration으로 반환합니다.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// 외부 데이터 조회 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// 외부 호출 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 캐시 신선도 윈도우 (시간)
    pub cache_freshness_hours: i64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            cache_freshness_hours: 6,
        }
    }
}

impl FetchConfig {
    /// 환경 변수에서 설정 로드 (`FETCH_TIMEOUT_SECS`, `CACHE_FRESHNESS_HOURS`).
    pub fn from_env() -> Self {
        let request_timeout_secs = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);
        let cache_freshness_hours = std::env::var("CACHE_FRESHNESS_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(6);

        Self {
            request_timeout_secs,
            cache_freshness_hours,
        }
    }

    /// 요청 타임아웃을 Duration으로 반환합니다.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 캐시 신선도 윈도우를 chrono Duration으로 반환합니다.
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache_freshness_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.fetch.cache_freshness_hours, 6);
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
        };
        assert_eq!(server.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_freshness_window() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.freshness_window(), chrono::Duration::hours(6));
    }

    #[test]
    fn test_request_timeout() {
        let fetch = FetchConfig {
            request_timeout_secs: 7,
            ..FetchConfig::default()
        };
        assert_eq!(fetch.request_timeout(), Duration::from_secs(7));
    }
}
