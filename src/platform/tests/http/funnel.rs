use std::collections::BTreeMap;

use chrono::Utc;
use metadata::funnels::CreateFunnelRequest;
use metadata::funnels::CreateFunnelStepRequest;
use metadata::funnels::StepKind;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;
use storage::record::Event;
use storage::record::Goal;
use storage::Record;
use storage::Store;

use crate::assert_response_status_eq;
use crate::tests::auth_headers;
use crate::tests::run_http_service;
use crate::tests::TestService;

async fn create_funnel(svc: &TestService, website_id: &str, steps: &[(StepKind, &str, &str)]) -> u64 {
    let funnel = svc
        .md
        .funnels
        .create(website_id, CreateFunnelRequest {
            created_by: None,
            name: "signup".to_string(),
        })
        .unwrap();
    for (kind, name, descriptor) in steps {
        svc.md
            .funnels
            .create_step(website_id, funnel.id, CreateFunnelStepRequest {
                name: name.to_string(),
                kind: *kind,
                descriptor: descriptor.to_string(),
            })
            .unwrap();
    }

    funnel.id
}

async fn page_view(store: &dyn Store, website_id: &str, visitor: &str, page: &str) {
    store
        .insert(Record::Event(Event {
            id: format!("{visitor}{page}"),
            website: website_id.to_string(),
            visitor_id: visitor.to_string(),
            session_id: format!("s-{visitor}"),
            page: page.to_string(),
            referrer: None,
            title: None,
            created_at: Utc::now(),
        }))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_evaluate() {
    let svc = run_http_service(vec![]).await.unwrap();
    let cl = Client::new();
    let funnel_id = create_funnel(&svc, "w1", &[
        (StepKind::Page, "landing", "equals:/landing"),
        (StepKind::Page, "pricing", "startsWith:/pricing"),
        (StepKind::Goal, "signup", "completes:signup"),
    ])
    .await;

    for i in 0..5 {
        page_view(svc.store.as_ref(), "w1", &format!("v{i}"), "/landing").await;
    }
    for i in 0..3 {
        page_view(svc.store.as_ref(), "w1", &format!("v{i}"), "/pricing/team").await;
    }
    // never landed
    page_view(svc.store.as_ref(), "w1", "x", "/pricing").await;
    svc.store
        .insert(Record::Goal(Goal {
            id: "g1".to_string(),
            website: "w1".to_string(),
            visitor_id: "v0".to_string(),
            session_id: None,
            name: "signup".to_string(),
            custom_params: BTreeMap::new(),
            created_at: Utc::now(),
        }))
        .await
        .unwrap();

    let resp = cl
        .get(format!(
            "{}/funnels/evaluate?websiteId=w1&funnelId={funnel_id}",
            svc.base_url
        ))
        .headers(auth_headers("w1").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "ok": true,
            "dataset": [
                {"$id": 1, "visitors": 5, "name": "landing", "dropoff": 0, "descriptor": "equals:/landing", "kind": "page"},
                {"$id": 2, "visitors": 3, "name": "pricing", "dropoff": 2, "descriptor": "startsWith:/pricing", "kind": "page"},
                {"$id": 3, "visitors": 1, "name": "signup", "dropoff": 2, "descriptor": "completes:signup", "kind": "goal"},
            ]
        })
    );
}

#[tokio::test]
async fn test_evaluate_empty_funnel() {
    let svc = run_http_service(vec![]).await.unwrap();
    let funnel_id = create_funnel(&svc, "w1", &[]).await;

    let resp = Client::new()
        .get(format!(
            "{}/funnels/evaluate?websiteId=w1&funnelId={funnel_id}",
            svc.base_url
        ))
        .headers(auth_headers("w1").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"ok": true, "dataset": []}));
}

#[tokio::test]
async fn test_evaluate_errors() {
    let svc = run_http_service(vec![]).await.unwrap();
    let cl = Client::new();
    let url = format!("{}/funnels/evaluate", svc.base_url);
    let funnel_id = create_funnel(&svc, "w1", &[
        (StepKind::Page, "landing", "equals:/landing"),
        (StepKind::Page, "pricing", "matches:/pricing"),
    ])
    .await;

    // missing ids
    {
        let resp = cl
            .get(format!("{url}?websiteId=w1"))
            .headers(auth_headers("w1").unwrap())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], json!(false));
        assert!(body["error"].is_string());
    }

    // no credential
    {
        let resp = cl
            .get(format!("{url}?websiteId=w1&funnelId={funnel_id}"))
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::UNAUTHORIZED);
    }

    // credential signed with another key
    {
        let resp = cl
            .get(format!("{url}?websiteId=w1&funnelId={funnel_id}"))
            .bearer_auth("not-a-token")
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::UNAUTHORIZED);
    }

    // credential of another website
    {
        let resp = cl
            .get(format!("{url}?websiteId=w1&funnelId={funnel_id}"))
            .headers(auth_headers("w2").unwrap())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::FORBIDDEN);
    }

    // unknown funnel
    {
        let resp = cl
            .get(format!("{url}?websiteId=w1&funnelId=100"))
            .headers(auth_headers("w1").unwrap())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::NOT_FOUND);
    }

    // unsupported operator fails the whole evaluation
    {
        let resp = cl
            .get(format!("{url}?websiteId=w1&funnelId={funnel_id}"))
            .headers(auth_headers("w1").unwrap())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("matches"));
        assert!(body.get("dataset").is_none());
    }
}
