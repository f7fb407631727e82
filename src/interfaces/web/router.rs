use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    middleware::Next,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::AppState;
use super::handlers::{automations, dashboard, records};

/// Empty `origins` allows any origin.
fn build_cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub(crate) fn build_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(dashboard::health_endpoint))
        .route("/api/logs", get(super::sse_logs_endpoint))
        .route(
            "/api/dashboard/stats",
            get(dashboard::dashboard_stats_endpoint),
        )
        .route(
            "/api/scheduler/jobs",
            get(automations::get_scheduler_jobs_endpoint),
        )
        .route(
            "/api/automations/{id}/run",
            post(automations::run_automation_endpoint),
        )
        .route(
            "/api/{table}",
            get(records::list_records_endpoint).post(records::create_record_endpoint),
        )
        .route(
            "/api/{table}/{id}",
            get(records::get_record_endpoint)
                .put(records::update_record_endpoint)
                .delete(records::delete_record_endpoint),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(build_cors(&state.cors_origins))
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::automation::AutomationEngine;
    use crate::core::automation::agent::LogOnlyEvaluator;
    use crate::core::automation::notify::LogNotifier;
    use crate::core::store::RecordStore;
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio_cron_scheduler::JobScheduler;
    use tower::util::ServiceExt;

    async fn test_state() -> AppState {
        let store = RecordStore::open_in_memory().unwrap();
        let engine = Arc::new(AutomationEngine::new(
            store.clone(),
            JobScheduler::new().await.unwrap(),
            Arc::new(LogNotifier),
            Arc::new(LogOnlyEvaluator),
        ));
        let (log_tx, _) = tokio::sync::broadcast::channel(16);
        AppState::new(store, engine, log_tx, Vec::new())
    }

    async fn json_request(
        app: Router,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
            None => Body::empty(),
        };

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body_bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));
        (status, json)
    }

    fn status_automation(enabled: bool) -> Value {
        json!({
            "automation_id": "auto-002",
            "name": "Status Change Notification",
            "target_table": "workflow_navigator",
            "trigger_type": "record_updated",
            "trigger_config": {"conditions": [{"field": "status", "changed": true}]},
            "actions": [
                {"type": "log", "message": "Status updated"},
                {"type": "notify", "message": "Workflow status has changed"}
            ],
            "enabled": enabled
        })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn security_headers_present_on_responses() {
        let app = build_api_router(test_state().await);
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_table_is_rejected_for_every_verb() {
        let app = build_api_router(test_state().await);
        for (method, path, body) in [
            (Method::GET, "/api/users", None),
            (Method::GET, "/api/users/1", None),
            (Method::POST, "/api/users", Some(json!({"name": "x"}))),
            (Method::PUT, "/api/users/1", Some(json!({"name": "x"}))),
            (Method::DELETE, "/api/users/1", None),
        ] {
            let (status, json) = json_request(app.clone(), method, path, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(json["error"], "Invalid table name");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_record_is_404() {
        let app = build_api_router(test_state().await);
        let (status, json) =
            json_request(app.clone(), Method::GET, "/api/money_moves/mn-404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Record not found");

        let (status, _) = json_request(
            app,
            Method::PUT,
            "/api/money_moves/mn-404",
            Some(json!({"amount": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bad_payloads_are_client_errors() {
        let app = build_api_router(test_state().await);
        for body in [json!({}), json!([1, 2]), json!({"password": "hunter2"})] {
            let (status, _) =
                json_request(app.clone(), Method::POST, "/api/money_moves", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/money_moves")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_list_get_delete_round() {
        let state = test_state().await;
        let app = build_api_router(state.clone());

        for (id, name) in [("wf-001", "Website Redesign"), ("wf-002", "Q4 Planning")] {
            let (status, json) = json_request(
                app.clone(),
                Method::POST,
                "/api/workflow_navigator",
                Some(json!({"workflow_id": id, "name": name, "status": "Planned"})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(json["id"], id);
            assert_eq!(json["message"], "Record created successfully");
        }

        let (status, json) =
            json_request(app.clone(), Method::GET, "/api/workflow_navigator", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["workflow_id"], "wf-002");

        let (status, json) = json_request(
            app.clone(),
            Method::GET,
            "/api/workflow_navigator/wf-001",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Website Redesign");

        let (status, json) = json_request(
            app.clone(),
            Method::DELETE,
            "/api/workflow_navigator/wf-001",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Record deleted successfully");

        let log = state
            .store
            .list_records(crate::core::store::Table::ActivityLog)
            .await
            .unwrap();
        let actions: Vec<&str> = log.iter().map(|r| r["action"].as_str().unwrap()).collect();
        assert_eq!(actions, vec!["DELETE", "CREATE", "CREATE"]);
        assert_eq!(log[0]["details"], "");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn status_update_fires_the_automation() {
        let state = test_state().await;
        let app = build_api_router(state.clone());

        let (status, _) = json_request(
            app.clone(),
            Method::POST,
            "/api/automations",
            Some(status_automation(true)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json_request(
            app.clone(),
            Method::POST,
            "/api/workflow_navigator",
            Some(json!({"workflow_id": "wf-001", "name": "Website Redesign", "status": "Planned"})),
        )
        .await;

        let (status, json) = json_request(
            app.clone(),
            Method::PUT,
            "/api/workflow_navigator/wf-001",
            Some(json!({"priority": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Record updated successfully");

        json_request(
            app.clone(),
            Method::PUT,
            "/api/workflow_navigator/wf-001",
            Some(json!({"status": "Active"})),
        )
        .await;

        let log = state.store.list_records(crate::core::store::Table::ActivityLog).await.unwrap();
        let automation_entries: Vec<&serde_json::Map<String, Value>> =
            log.iter().filter(|r| r["action"] == "AUTOMATION").collect();
        assert_eq!(automation_entries.len(), 1);
        assert_eq!(automation_entries[0]["record_id"], "wf-001");
        assert_eq!(automation_entries[0]["details"], "Status updated");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn scheduled_automation_follows_gateway_edits() {
        let state = test_state().await;
        let app = build_api_router(state);

        let (status, _) = json_request(
            app.clone(),
            Method::POST,
            "/api/automations",
            Some(json!({
                "automation_id": "auto-001",
                "name": "Weekly Workflow Summary",
                "target_table": "workflow_navigator",
                "trigger_type": "scheduled",
                "trigger_config": {"time": "Sunday 17:00"},
                "actions": [{"type": "log", "message": "Weekly summary generated"}],
                "enabled": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, json) = json_request(app.clone(), Method::GET, "/api/scheduler/jobs", None).await;
        assert_eq!(json["jobs"], json!(["auto-001"]));

        json_request(
            app.clone(),
            Method::PUT,
            "/api/automations/auto-001",
            Some(json!({"enabled": 0})),
        )
        .await;
        let (_, json) = json_request(app.clone(), Method::GET, "/api/scheduler/jobs", None).await;
        assert_eq!(json["count"], 0);

        json_request(
            app.clone(),
            Method::PUT,
            "/api/automations/auto-001",
            Some(json!({"enabled": 1})),
        )
        .await;
        let (_, json) = json_request(app.clone(), Method::GET, "/api/scheduler/jobs", None).await;
        assert_eq!(json["count"], 1);

        json_request(app.clone(), Method::DELETE, "/api/automations/auto-001", None).await;
        let (_, json) = json_request(app, Method::GET, "/api/scheduler/jobs", None).await;
        assert_eq!(json["count"], 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn renamed_automation_stays_scheduled() {
        let app = build_api_router(test_state().await);
        json_request(
            app.clone(),
            Method::POST,
            "/api/automations",
            Some(json!({
                "automation_id": "auto-001",
                "name": "Weekly Workflow Summary",
                "target_table": "workflow_navigator",
                "trigger_type": "scheduled",
                "trigger_config": {"time": "Sunday 17:00"},
                "actions": [{"type": "log", "message": "Weekly summary generated"}],
                "enabled": 1
            })),
        )
        .await;

        let (status, _) = json_request(
            app.clone(),
            Method::PUT,
            "/api/automations/auto-001",
            Some(json!({"automation_id": "auto-weekly"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = json_request(app, Method::GET, "/api/scheduler/jobs", None).await;
        assert_eq!(json["jobs"], json!(["auto-weekly"]));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn writes_succeed_when_activity_log_is_unavailable() {
        let state = test_state().await;
        let app = build_api_router(state.clone());
        json_request(
            app.clone(),
            Method::POST,
            "/api/automations",
            Some(json!({
                "automation_id": "auto-triage",
                "name": "Triage",
                "target_table": "workflow_navigator",
                "trigger_type": "record_created",
                "actions": [{"type": "update_record", "fields": {"status": "Triaged"}}],
                "enabled": 1
            })),
        )
        .await;
        state.store.execute_batch("DROP TABLE activity_log").await.unwrap();

        let (status, json) = json_request(
            app.clone(),
            Method::POST,
            "/api/workflow_navigator",
            Some(json!({"workflow_id": "wf-001", "name": "Website Redesign"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["id"], "wf-001");

        let (_, json) = json_request(
            app.clone(),
            Method::GET,
            "/api/workflow_navigator/wf-001",
            None,
        )
        .await;
        assert_eq!(json["status"], "Triaged");

        let (status, _) = json_request(
            app.clone(),
            Method::PUT,
            "/api/workflow_navigator/wf-001",
            Some(json!({"priority": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = json_request(
            app,
            Method::DELETE,
            "/api/workflow_navigator/wf-001",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn manual_run_reports_and_404s() {
        let app = build_api_router(test_state().await);
        json_request(
            app.clone(),
            Method::POST,
            "/api/automations",
            Some(status_automation(true)),
        )
        .await;

        let (status, json) =
            json_request(app.clone(), Method::POST, "/api/automations/auto-002/run", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["report"]["executed"], 2);

        let (status, _) =
            json_request(app, Method::POST, "/api/automations/auto-404/run", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dashboard_stats_shape() {
        let app = build_api_router(test_state().await);
        json_request(
            app.clone(),
            Method::POST,
            "/api/workflow_navigator",
            Some(json!({"workflow_id": "wf-001", "name": "Website Redesign", "status": "Active"})),
        )
        .await;

        let (status, json) = json_request(app, Method::GET, "/api/dashboard/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["workflows"], json!([{"status": "Active", "count": 1}]));
        assert_eq!(json["projects"]["total"], 0);
        assert_eq!(json["innovations"]["total"], 0);
        assert_eq!(json["recentActivity"].as_array().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn static_routes_win_over_table_routes() {
        let app = build_api_router(test_state().await);
        let (status, json) = json_request(app.clone(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");

        let (status, _) = json_request(app, Method::GET, "/api/scheduler", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
