use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wujie_mcp::config::{CREATE_TASK_PATH, MODEL_INFOS_PATH, QUERY_TASK_PATH};
use wujie_mcp::imagegen::{ErrorKind, GenerateImageParams, ImageGenError, WujieClient};
use wujie_mcp::{ImageService, PollSettings, WujieConfig};

fn service_for(server: &MockServer, poll: PollSettings) -> ImageService {
    let config = WujieConfig::new(url::Url::parse(&server.uri()).unwrap(), "test-key").with_poll(poll);
    let client = WujieClient::new(&config).unwrap();
    ImageService::new(Arc::new(client), &config)
}

fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        timeout_multiplier: 1.5,
        max_poll_time: Duration::from_secs(5),
    }
}

fn task_body(status: i64, cost: i64) -> serde_json::Value {
    let picture_url = if status == 4 { "https://x/y.png" } else { "" };
    json!({
        "code": 200,
        "data": {
            "status": status,
            "picture_url": picture_url,
            "involve_yellow": 0,
            "integral_cost": cost,
            "integral_cost_message": "",
            "fail_message": null
        }
    })
}

async fn mount_create(server: &MockServer, key: &str, expected_second: u64) {
    Mock::given(method("POST"))
        .and(path(CREATE_TASK_PATH))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "success",
            "data": {
                "results": [{"key": key, "expected_second": expected_second, "batchTask_key": ""}],
                "expected_integral_cost": 5
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn generate_polls_until_success() {
    let server = MockServer::start().await;
    mount_create(&server, "abc123", 10).await;

    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .and(query_param("key", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body(2, 5)))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .and(query_param("key", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body(4, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let text = service_for(&server, fast_poll())
        .generate(GenerateImageParams::new("a red fox"), CancellationToken::new())
        .await
        .unwrap();

    assert!(text.contains("abc123"));
    assert!(text.contains("https://x/y.png"));
    assert!(text.contains('5'));
}

#[tokio::test]
async fn generate_sends_defaults_and_caller_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_TASK_PATH))
        .and(body_partial_json(json!({
            "prompt": "a red fox",
            "model": 1018,
            "num": 1,
            "width": 1024,
            "height": 512,
            "init_image_url": "",
            "uc_prompt": "blur"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"results": [{"key": "k9", "expected_second": 1}]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body(4, 2)))
        .mount(&server)
        .await;

    let params = GenerateImageParams {
        width: Some(1024),
        uc_prompt: Some("blur".into()),
        ..GenerateImageParams::new("a red fox")
    };
    let text = service_for(&server, fast_poll())
        .generate(params, CancellationToken::new())
        .await
        .unwrap();
    assert!(text.contains("k9"));
}

#[tokio::test]
async fn rejected_submission_never_polls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_TASK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 500,
            "message": "quota exceeded",
            "data": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body(2, 5)))
        .expect(0)
        .mount(&server)
        .await;

    let err = service_for(&server, fast_poll())
        .generate(GenerateImageParams::new("a red fox"), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InternalError);
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn empty_key_is_its_own_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_TASK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"results": [{"key": "", "expected_second": 10}]}
        })))
        .mount(&server)
        .await;

    let err = service_for(&server, fast_poll())
        .generate(GenerateImageParams::new("a red fox"), CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, ImageGenError::EmptyKey);
}

#[tokio::test]
async fn never_finishing_task_times_out() {
    let server = MockServer::start().await;
    mount_create(&server, "slow1", 1).await;
    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body(1, 5)))
        .mount(&server)
        .await;

    let poll = PollSettings {
        interval: Duration::from_millis(10),
        timeout_multiplier: 1.5,
        max_poll_time: Duration::from_millis(50),
    };
    let err = service_for(&server, poll)
        .generate(GenerateImageParams::new("a red fox"), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestTimeout);
    assert!(err.to_string().contains("slow1"));
}

#[tokio::test]
async fn flagged_image_is_reported_as_failure() {
    let server = MockServer::start().await;
    mount_create(&server, "nsfw1", 10).await;
    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"status": 4, "picture_url": "https://x/z.png", "involve_yellow": 1, "integral_cost": 5}
        })))
        .mount(&server)
        .await;

    let err = service_for(&server, fast_poll())
        .generate(GenerateImageParams::new("a red fox"), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::TaskFailed { ref key, .. } if key == "nsfw1"));
}

#[tokio::test]
async fn http_errors_surface_as_request_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_TASK_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = service_for(&server, fast_poll())
        .generate(GenerateImageParams::new("a red fox"), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ImageGenError::RequestFailed(ref msg) if msg.contains("502")));
}

#[tokio::test]
async fn one_shot_query_reports_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .and(query_param("key", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body(2, 3)))
        .expect(2)
        .mount(&server)
        .await;

    let service = service_for(&server, fast_poll());
    let first = service.query("abc123").await.unwrap();
    let second = service.query("abc123").await.unwrap();
    assert_eq!(first, second);
    assert!(first.contains("generating"));
    assert!(first.contains('3'));
}

#[tokio::test]
async fn one_shot_query_does_not_raise_on_failed_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY_TASK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"status": 3, "integral_cost": 1, "fail_message": {"fail_code": 2, "fail_message": "bad prompt"}}
        })))
        .mount(&server)
        .await;

    let text = service_for(&server, fast_poll()).query("abc123").await.unwrap();
    assert!(text.contains("failed: bad prompt"));
}

#[tokio::test]
async fn one_shot_query_requires_a_key() {
    let server = MockServer::start().await;
    let err = service_for(&server, fast_poll()).query("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParams);
}

#[tokio::test]
async fn model_listing_renders_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MODEL_INFOS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": [{"model_code": 1013, "model_desc": "FLUX"}]
        })))
        .mount(&server)
        .await;

    let table = service_for(&server, fast_poll()).list_models().await.unwrap();
    let rows: Vec<&str> = table.lines().skip(2).collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("1013"));
    assert!(rows[0].contains("FLUX"));
}

#[tokio::test]
async fn model_listing_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MODEL_INFOS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 401,
            "message": "invalid token",
            "data": null
        })))
        .mount(&server)
        .await;

    let err = service_for(&server, fast_poll()).list_models().await.unwrap_err();
    assert_eq!(err, ImageGenError::CatalogRejected("invalid token".into()));
}
