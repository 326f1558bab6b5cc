use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tzarfat_api::server::{AppState, build_router};
use tzarfat_core::analytics::entity::AnalyticsSnapshot;
use tzarfat_core::analytics::port::{Dashboard, StateStream};
use tzarfat_core::common::time::{RealTimeProvider, TimeProvider};
use tzarfat_core::testing::{ScriptedSource, sample_snapshot};
use tzarfat_core::view::state::{ReadyState, RefreshStats, ViewState};
use tzarfat_dashboard::refresh::DashboardImpl;

fn ready_state(snapshot: AnalyticsSnapshot, last_error: Option<&str>) -> ViewState {
    ViewState::Ready(ReadyState {
        snapshot: Arc::new(snapshot),
        fetched_at: RealTimeProvider.now(),
        last_error: last_error.map(str::to_string),
    })
}

/// 状态固定、可手动切换的看板桩。
struct StaticDashboard {
    state: Mutex<ViewState>,
}

impl StaticDashboard {
    fn new(state: ViewState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    fn set(&self, state: ViewState) {
        *self.state.lock().unwrap() = state;
    }
}

impl Dashboard for StaticDashboard {
    fn state(&self) -> ViewState {
        self.state.lock().unwrap().clone()
    }

    fn subscribe(&self) -> StateStream {
        Box::pin(futures::stream::empty())
    }

    fn stats(&self) -> RefreshStats {
        RefreshStats::default()
    }

    fn dispose(&self) {}
}

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server(dashboard: Arc<dyn Dashboard>) -> String {
    let app = build_router(AppState { dashboard });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn client() -> reqwest::Client {
    let _installed = rustls::crypto::ring::default_provider().install_default();
    reqwest::Client::new()
}

async fn get(base: &str, path: &str) -> (StatusCode, Value) {
    let resp = client()
        .get(format!("{}{}", base, path))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn test_loading_state_answers_503() {
    let base = spawn_test_server(StaticDashboard::new(ViewState::Loading)).await;

    let (status, body) = get(&base, "/api/v1/dashboard/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "loading");
    assert_eq!(body["data"]["stale"], false);

    for path in [
        "/api/v1/dashboard/summary",
        "/api/v1/dashboard/trades",
        "/api/v1/dashboard/portfolio",
        "/api/v1/dashboard/allocation",
        "/api/v1/dashboard/holdings",
        "/api/v1/dashboard/tabs/dashboard",
    ] {
        let (status, body) = get(&base, path).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", path);
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert!(body["error"].as_str().unwrap().contains("loading"));
    }
}

#[tokio::test]
async fn test_first_failure_answers_502_with_retry_message() {
    let base = spawn_test_server(StaticDashboard::new(ViewState::Error(
        "HTTP status error: 500".to_string(),
    )))
    .await;

    let (status, body) = get(&base, "/api/v1/dashboard/summary").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("HTTP status error: 500"));
    assert!(message.contains("retry"));

    let (_, body) = get(&base, "/api/v1/dashboard/state").await;
    assert_eq!(body["data"]["status"], "error");
    assert_eq!(body["data"]["error"], "HTTP status error: 500");
}

#[tokio::test]
async fn test_panels_render_projections_with_display_strings() {
    let base = spawn_test_server(StaticDashboard::new(ready_state(sample_snapshot(), None))).await;

    let (status, body) = get(&base, "/api/v1/dashboard/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let summary = &body["data"];
    assert_eq!(summary["total_assets"], "100000");
    assert_eq!(summary["total_assets_display"], "$100,000.00");
    assert_eq!(summary["total_profit"], "2000");
    assert_eq!(summary["total_profit_display"], "+$2,000.00");
    assert_eq!(summary["today_trade_count"], 1);

    let (_, body) = get(&base, "/api/v1/dashboard/trades").await;
    let trade = &body["data"][0];
    assert_eq!(trade["id"], 1);
    assert_eq!(trade["type"], "Покупка");
    assert_eq!(trade["side"], "Buy");
    assert_eq!(trade["qty"], 10);
    assert_eq!(trade["price"], "150.5");
    assert_eq!(trade["total_display"], "$1,505.00");
    assert_eq!(trade["time"], "10:32");

    let (_, body) = get(&base, "/api/v1/dashboard/portfolio").await;
    assert_eq!(body["data"][0]["period"], "Jan");
    assert_eq!(body["data"][0]["value"], "100000");

    let (_, body) = get(&base, "/api/v1/dashboard/allocation").await;
    let entry = &body["data"][0];
    assert_eq!(entry["asset"], "Stocks");
    assert_eq!(entry["percent_display"], "60%");
    assert_eq!(entry["slot"], 0);

    let (_, body) = get(&base, "/api/v1/dashboard/holdings").await;
    let holding = &body["data"][0];
    assert_eq!(holding["rank"], 1);
    assert_eq!(holding["ticker"], "AAPL");
    assert_eq!(holding["name"], "Apple");
    assert_eq!(holding["change"], "+5%");
    assert_eq!(holding["value"], "6000");
}

#[tokio::test]
async fn test_tab_bundles() {
    let base = spawn_test_server(StaticDashboard::new(ready_state(sample_snapshot(), None))).await;

    let (status, body) = get(&base, "/api/v1/dashboard/tabs/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    let tab = body["data"].as_object().unwrap();
    assert_eq!(tab["tab"], "dashboard");
    assert!(tab.contains_key("summary"));
    assert!(tab.contains_key("portfolio"));
    assert!(tab.contains_key("trades"));
    assert!(!tab.contains_key("allocation"));
    assert!(!tab.contains_key("holdings"));

    let (_, body) = get(&base, "/api/v1/dashboard/tabs/analytics").await;
    let tab = body["data"].as_object().unwrap();
    assert!(tab.contains_key("portfolio"));
    assert!(!tab.contains_key("trades"));

    let (_, body) = get(&base, "/api/v1/dashboard/tabs/reports").await;
    let tab = body["data"].as_object().unwrap();
    assert!(tab.contains_key("trades"));
    assert!(!tab.contains_key("summary"));

    let (_, body) = get(&base, "/api/v1/dashboard/tabs/portfolio").await;
    let tab = body["data"].as_object().unwrap();
    assert!(tab.contains_key("allocation"));
    assert!(tab.contains_key("holdings"));
    assert!(!tab.contains_key("portfolio"));
}

#[tokio::test]
async fn test_unknown_tab_is_404_even_while_loading() {
    let dashboard = StaticDashboard::new(ViewState::Loading);
    let base = spawn_test_server(dashboard.clone()).await;

    let (status, body) = get(&base, "/api/v1/dashboard/tabs/settings").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown Tab: settings");

    dashboard.set(ready_state(sample_snapshot(), None));
    let (status, _) = get(&base, "/api/v1/dashboard/tabs/settings").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stale_snapshot_is_served_and_flagged() {
    let dashboard = StaticDashboard::new(ready_state(sample_snapshot(), None));
    let base = spawn_test_server(dashboard.clone()).await;

    let (_, body) = get(&base, "/api/v1/dashboard/state").await;
    assert_eq!(body["data"]["status"], "ready");
    assert_eq!(body["data"]["stale"], false);
    assert!(body["data"]["fetched_at"].is_string());

    dashboard.set(ready_state(
        sample_snapshot(),
        Some("Network error: connection refused"),
    ));

    let (_, body) = get(&base, "/api/v1/dashboard/state").await;
    assert_eq!(body["data"]["stale"], true);
    assert_eq!(body["data"]["error"], "Network error: connection refused");

    let (status, body) = get(&base, "/api/v1/dashboard/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_assets"], "100000");
}

#[tokio::test]
async fn test_openapi_document_lists_dashboard_routes() {
    let base = spawn_test_server(StaticDashboard::new(ViewState::Loading)).await;

    let (status, body) = get(&base, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    for path in [
        "/api/v1/dashboard/state",
        "/api/v1/dashboard/stats",
        "/api/v1/dashboard/summary",
        "/api/v1/dashboard/trades",
        "/api/v1/dashboard/portfolio",
        "/api/v1/dashboard/allocation",
        "/api/v1/dashboard/holdings",
        "/api/v1/dashboard/tabs/{tab}",
    ] {
        assert!(paths.contains_key(path), "{}", path);
    }
}

#[tokio::test]
async fn test_end_to_end_with_refreshing_dashboard() {
    let source = Arc::new(ScriptedSource::new(vec![]).with_fallback(sample_snapshot()));
    let dashboard = DashboardImpl::start(
        source,
        Duration::from_secs(3600),
        Arc::new(RealTimeProvider),
    );
    let base = spawn_test_server(dashboard.clone()).await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while !matches!(dashboard.state(), ViewState::Ready(_)) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let (status, body) = get(&base, "/api/v1/dashboard/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["today_trade_count"], 1);

    let (_, body) = get(&base, "/api/v1/dashboard/stats").await;
    assert_eq!(body["data"]["issued"], 1);
    assert_eq!(body["data"]["applied"], 1);
    assert!(body["data"]["last_success_at"].is_string());

    dashboard.dispose();
}
