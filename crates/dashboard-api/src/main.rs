//! 주식 대시보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 기업 문서 조회, 시세/지수 시계열, 뉴스/리포트 수집, 재무지표 랭킹
//! 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use dashboard_api::routes::create_api_router;
use dashboard_api::state::AppState;
use dashboard_core::config::AppConfig;
use dashboard_core::logging::init_logging_from_env;

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
///
/// # 환경변수
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://dashboard.example.com,https://admin.example.com`
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS에 유효한 origin이 없어 전체 허용");
                AllowOrigin::any()
            } else {
                info!(count = origins.len(), "CORS origin 목록 적용");
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS 미설정, 전체 origin 허용 (개발 모드)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    init_logging_from_env()?;

    info!("대시보드 API 서버 시작...");

    let config = AppConfig::from_env();
    let addr = config.server.bind_addr();

    let state = Arc::new(AppState::initialize(config).await?);

    info!(
        has_db = state.db_pool.is_some(),
        has_yahoo = state.yahoo.is_some(),
        has_industry = state.industry.is_some(),
        has_sales = state.sales.is_some(),
        "애플리케이션 상태 초기화 완료"
    );

    let app = create_router(state);

    info!(%addr, "API 서버 리스닝");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("서버 정상 종료");

    Ok(())
}

/// Graceful shutdown 시그널 대기 (Ctrl+C 또는 SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Ctrl+C 수신, graceful shutdown 시작...");
        }
        _ = terminate => {
            warn!("SIGTERM 수신, graceful shutdown 시작...");
        }
    }
}
