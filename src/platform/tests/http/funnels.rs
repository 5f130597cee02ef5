use metadata::funnels::Funnel;
use metadata::funnels::FunnelStep;
use metadata::funnels::StepKind;
use platform::funnels::CreateFunnelRequest;
use platform::funnels::CreateStepRequest;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;

use crate::assert_response_json_eq;
use crate::assert_response_status_eq;
use crate::tests::auth_headers;
use crate::tests::run_http_service;
use crate::tests::EMPTY_LIST;

#[tokio::test]
async fn test_funnels() {
    let svc = run_http_service(vec![]).await.unwrap();
    let funnels_url = format!("{}/websites/w1/funnels", svc.base_url);
    let cl = Client::new();
    let headers = auth_headers("w1").unwrap();

    // list without funnels
    {
        let resp = cl
            .get(&funnels_url)
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_response_json_eq!(resp, EMPTY_LIST.to_string());
    }

    // get unexisting funnel
    {
        let resp = cl
            .get(format!("{funnels_url}/1"))
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::NOT_FOUND);
    }

    // create
    let funnel: Funnel = {
        let resp = cl
            .post(&funnels_url)
            .body(
                serde_json::to_string(&CreateFunnelRequest {
                    name: "signup".to_string(),
                })
                .unwrap(),
            )
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    };
    assert_eq!(funnel.id, 1);
    assert_eq!(funnel.website_id, "w1");

    // another website can't read it
    {
        let resp = cl
            .get(format!("{}/websites/w2/funnels/1", svc.base_url))
            .headers(auth_headers("w2").unwrap())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::NOT_FOUND);
    }

    let steps_url = format!("{funnels_url}/{}/steps", funnel.id);
    for (name, kind, descriptor) in [
        ("landing", StepKind::Page, "equals:/"),
        ("pricing", StepKind::Page, "wildCardPattern:*pricing*"),
        ("signup", StepKind::Goal, "completes:signup"),
    ] {
        let resp = cl
            .post(&steps_url)
            .body(
                serde_json::to_string(&CreateStepRequest {
                    name: name.to_string(),
                    kind,
                    descriptor: descriptor.to_string(),
                })
                .unwrap(),
            )
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::CREATED);
    }

    // descriptors are validated
    for descriptor in ["matches:/", "nooperator", ":/"] {
        let resp = cl
            .post(&steps_url)
            .body(
                serde_json::to_string(&CreateStepRequest {
                    name: "bad".to_string(),
                    kind: StepKind::Page,
                    descriptor: descriptor.to_string(),
                })
                .unwrap(),
            )
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::BAD_REQUEST);
    }

    // unknown kind is rejected by the json extractor
    {
        let resp = cl
            .post(&steps_url)
            .body(r#"{"name":"x","kind":"click","descriptor":"equals:/"}"#)
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], Value::Bool(false));
    }

    let steps: Vec<FunnelStep> = cl
        .get(&steps_url)
        .headers(headers.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["landing", "pricing", "signup"]);

    // delete step
    {
        let resp = cl
            .delete(format!("{steps_url}/2"))
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::OK);

        let steps: Vec<FunnelStep> = cl
            .get(&steps_url)
            .headers(headers.clone())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(steps.len(), 2);
    }

    // delete funnel
    {
        let resp = cl
            .delete(format!("{funnels_url}/{}", funnel.id))
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::OK);

        let resp = cl
            .get(format!("{funnels_url}/{}", funnel.id))
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        assert_response_status_eq!(resp, StatusCode::NOT_FOUND);
    }
}
