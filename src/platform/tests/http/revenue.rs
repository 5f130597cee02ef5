use std::sync::atomic::Ordering;

use platform::payments::PaymentEvent;
use platform::revenue::summary_cache_key;
use platform::revenue::RevenueSummary;
use platform::revenue::SyncResponse;
use reqwest::Client;
use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;
use serde_json::Value;
use storage::Collection;

use crate::assert_response_status_eq;
use crate::tests::auth_headers;
use crate::tests::run_http_service;
use crate::tests::TestService;

fn payment(id: &str, subscription_id: Option<&str>, amount: rust_decimal::Decimal) -> PaymentEvent {
    PaymentEvent {
        id: id.to_string(),
        typ: "payment.succeeded".to_string(),
        subscription_id: subscription_id.map(|s| s.to_string()),
        amount,
        currency: "USD".to_string(),
        visitor_id: Some("v1".to_string()),
        session_id: Some("s1".to_string()),
        created_at: None,
    }
}

async fn send_webhook(svc: &TestService, cl: &Client, ev: &PaymentEvent) -> Value {
    let resp = cl
        .post(format!("{}/webhooks/payments/w1", svc.base_url))
        .json(ev)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

async fn summary(svc: &TestService, cl: &Client) -> RevenueSummary {
    let resp = cl
        .get(format!("{}/websites/w1/revenue", svc.base_url))
        .headers(auth_headers("w1").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_webhook_and_summary() {
    let svc = run_http_service(vec![]).await.unwrap();
    let cl = Client::new();

    let first = payment("p1", Some("sub1"), dec!(10));
    assert_eq!(send_webhook(&svc, &cl, &first).await, json!({"ok":true,"recorded":true}));
    // duplicate delivery
    assert_eq!(send_webhook(&svc, &cl, &first).await, json!({"ok":true,"recorded":false}));

    let renewal = PaymentEvent {
        typ: "subscription.renewed".to_string(),
        ..payment("p2", Some("sub1"), dec!(10))
    };
    assert_eq!(send_webhook(&svc, &cl, &renewal).await, json!({"ok":true,"recorded":true}));

    // not attributable to a visit
    let anonymous = PaymentEvent {
        visitor_id: None,
        ..payment("p3", None, dec!(99))
    };
    assert_eq!(send_webhook(&svc, &cl, &anonymous).await, json!({"ok":true,"recorded":false}));

    // not a successful payment
    let refund = PaymentEvent {
        typ: "payment.refunded".to_string(),
        ..payment("p4", None, dec!(99))
    };
    assert_eq!(send_webhook(&svc, &cl, &refund).await, json!({"ok":true,"recorded":false}));

    assert_eq!(svc.store.len(Collection::Revenue), 2);

    let res = summary(&svc, &cl).await;
    assert!(res.ok);
    let usd = &res.currencies["USD"];
    assert_eq!(usd.total, dec!(20));
    assert_eq!(usd.new, dec!(10));
    assert_eq!(usd.recurring, dec!(10));
    assert_eq!(usd.payments, 2);

    // cached summary is dropped by the next payment
    let cached_key = summary_cache_key("w1", 2, res.since.timestamp());
    assert!(svc.md.kv.get(&cached_key).unwrap().is_some());
    let one_off = payment("p5", None, dec!(5));
    assert_eq!(send_webhook(&svc, &cl, &one_off).await, json!({"ok":true,"recorded":true}));
    assert!(svc.md.kv.get(&cached_key).unwrap().is_none());

    // a summary computed before the payment and stored after the invalidation is never served
    let stale = serde_json::to_vec(&res).unwrap();
    svc.md.kv.set(&cached_key, &stale, None).unwrap();

    let res = summary(&svc, &cl).await;
    let usd = &res.currencies["USD"];
    assert_eq!(usd.total, dec!(25));
    assert_eq!(usd.new, dec!(15));
    assert_eq!(usd.payments, 3);
}

#[tokio::test]
async fn test_summary_requires_credential() {
    let svc = run_http_service(vec![]).await.unwrap();
    let cl = Client::new();

    let resp = cl
        .get(format!("{}/websites/w1/revenue", svc.base_url))
        .send()
        .await
        .unwrap();
    assert_response_status_eq!(resp, StatusCode::UNAUTHORIZED);

    let resp = cl
        .get(format!("{}/websites/w1/revenue", svc.base_url))
        .headers(auth_headers("w2").unwrap())
        .send()
        .await
        .unwrap();
    assert_response_status_eq!(resp, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sync_is_throttled() {
    let svc = run_http_service(vec![
        payment("p1", Some("sub1"), dec!(10)),
        payment("p2", Some("sub1"), dec!(10)),
        payment("p3", None, dec!(3)),
    ])
    .await
    .unwrap();
    let cl = Client::new();
    let url = format!("{}/websites/w1/revenue/sync", svc.base_url);

    let res: SyncResponse = cl
        .post(&url)
        .headers(auth_headers("w1").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(res, SyncResponse {
        ok: true,
        fetched: true,
        recorded: 3,
    });

    let res: SyncResponse = cl
        .post(&url)
        .headers(auth_headers("w1").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(res, SyncResponse {
        ok: true,
        fetched: false,
        recorded: 0,
    });
    assert_eq!(svc.payments.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(svc.store.len(Collection::Revenue), 3);

    // a webhook delivery of an already synced payment is ignored
    assert_eq!(
        send_webhook(&svc, &cl, &payment("p3", None, dec!(3))).await,
        json!({"ok":true,"recorded":false})
    );
}
