mod common;

use std::time::{Duration, Instant};

use client::dashboard::Dashboard;
use client::error::Error;
use common::{goal_json, nutrition_json, weight_json, workout_json, TestApp};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_lists(app: &TestApp, weight: ResponseTemplate, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/api/workouts"))
        .and(query_param("days", "30"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    workout_json(1, "2024-01-10T18:00:00"),
                    workout_json(2, "2024-01-12T18:00:00"),
                    workout_json(3, "2024-01-14T18:00:00"),
                    workout_json(4, "2024-01-16T18:00:00"),
                    workout_json(5, "2024-01-18T18:00:00"),
                    workout_json(6, "2024-01-20T18:00:00"),
                ]))
                .set_delay(delay),
        )
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/weight"))
        .and(query_param("days", "90"))
        .respond_with(weight.set_delay(delay))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/nutrition"))
        .and(query_param("days", "30"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    nutrition_json(1, "2024-01-19T12:00:00"),
                    nutrition_json(2, "2024-01-20T12:00:00"),
                ]))
                .set_delay(delay),
        )
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/goals"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([goal_json(1, false), goal_json(2, true)]))
                .set_delay(delay),
        )
        .expect(1)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn test_dashboard_loads_every_section() -> anyhow::Result<()> {
    let app = TestApp::signed_in().await?;
    mount_lists(
        &app,
        ResponseTemplate::new(200).set_body_json(json!([
            weight_json(1, "2024-01-01T08:00:00", 186.0),
            weight_json(2, "2024-01-01T20:00:00", 185.0),
            weight_json(3, "2024-01-02T09:00:00", 184.5),
        ])),
        Duration::ZERO,
    )
    .await;

    let dashboard = Dashboard::new(&app.context.api);
    let summary = dashboard.load().await;

    assert!(summary.is_complete());
    assert_eq!(summary.workout_count(), Some(6));
    assert_eq!(summary.nutrition_count(), Some(2));
    assert_eq!(summary.weight_count(), Some(2));
    assert_eq!(summary.active_goal_count(), Some(1));
    let recent: Vec<i64> = summary.recent_workouts().iter().map(|w| w.id).collect();
    assert_eq!(recent, vec![6, 5, 4, 3, 2]);
    let series: Vec<f64> = summary.weight_series().iter().map(|(_, w)| *w).collect();
    assert_eq!(series, vec![185.0, 184.5]);
    Ok(())
}

#[tokio::test]
async fn test_dashboard_partial_failure() -> anyhow::Result<()> {
    let app = TestApp::signed_in().await?;
    mount_lists(
        &app,
        ResponseTemplate::new(500).set_body_json(json!({ "error": "weight service down" })),
        Duration::ZERO,
    )
    .await;

    let dashboard = Dashboard::new(&app.context.api);
    let summary = dashboard.load().await;

    assert!(!summary.is_complete());
    assert!(matches!(summary.weight, Err(Error::Server { .. })));
    assert_eq!(summary.workout_count(), Some(6));
    assert_eq!(summary.nutrition_count(), Some(2));
    assert_eq!(summary.active_goal_count(), Some(1));
    assert!(dashboard.weight.snapshot().error.is_some());
    assert!(!dashboard.weight.is_loading());
    assert!(app.context.session.state().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_dashboard_sections_load_concurrently() -> anyhow::Result<()> {
    let app = TestApp::signed_in().await?;
    let delay = Duration::from_millis(400);
    mount_lists(
        &app,
        ResponseTemplate::new(200)
            .set_body_json(json!([weight_json(1, "2024-01-01T08:00:00", 186.0)])),
        delay,
    )
    .await;

    let dashboard = Dashboard::new(&app.context.api);
    let started = Instant::now();
    let summary = dashboard.load().await;
    let elapsed = started.elapsed();

    assert!(summary.is_complete());
    // four sequential sections would take at least 4 * delay
    assert!(elapsed < delay * 3, "dashboard took {elapsed:?}");
    Ok(())
}
