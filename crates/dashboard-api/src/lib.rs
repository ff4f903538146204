//! 대시보드 REST API 서버 라이브러리.

pub mod error;
pub mod routes;
pub mod sources;
pub mod state;
