//! HTTP front tests: a real listener driven by a real client.

mod common;

use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use common::{start_mock, MockResponse};
use stage_relay::http::server::INVOKE_PATH;
use stage_relay::{HttpServer, Shutdown};

struct Front {
    base: String,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), std::io::Error>>,
}

async fn start_front(proxy_url: &str) -> Front {
    let config = common::config("http://router.local", proxy_url);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    Front {
        base: format!("http://{addr}"),
        shutdown,
        task,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_stage_prefix_stripped_and_body_rewritten() {
    let proxy = start_mock(|_| MockResponse::ok("text/html", "<link href='/style.css'>")).await;
    let front = start_front(&proxy.url()).await;

    let response = client().get(format!("{}/prod/", front.base)).send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "<link href='/prod/style.css'>");
    assert_eq!(proxy.last_request().request_line, "GET http://router.local/ HTTP/1.1");
}

#[tokio::test]
async fn test_redirect_points_at_front_host() {
    let proxy = start_mock(|_| MockResponse::redirect("http://router.local/index.html")).await;
    let front = start_front(&proxy.url()).await;
    let host = front.base.trim_start_matches("http://").to_string();

    let response = client().get(format!("{}/prod/", front.base)).send().await.unwrap();

    assert_eq!(response.status(), 302);
    assert_eq!(
        response.headers()["location"],
        format!("https://{host}/prod/index.html").as_str()
    );
}

#[tokio::test]
async fn test_image_served_as_raw_bytes() {
    let pixels = vec![0x47, 0x49, 0x46, 0x38, 0x00, 0xfe];
    let served = pixels.clone();
    let proxy = start_mock(move |_| MockResponse::ok("image/gif", served.clone())).await;
    let front = start_front(&proxy.url()).await;

    let response = client()
        .get(format!("{}/prod/spinner.gif", front.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "image/gif");
    assert_eq!(response.bytes().await.unwrap().to_vec(), pixels);
}

#[tokio::test]
async fn test_invoke_endpoint_returns_gateway_response() {
    let proxy = start_mock(|_| MockResponse::ok("image/png", vec![1u8, 2, 3])).await;
    let front = start_front(&proxy.url()).await;

    let event = json!({
        "httpMethod": "GET",
        "path": "/logo.png",
        "headers": { "Host": "api.example.com" },
        "requestContext": { "stage": "prod" }
    });
    let response = client()
        .post(format!("{}{}", front.base, INVOKE_PATH))
        .json(&event)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["isBase64Encoded"], true);
    assert_eq!(body["body"], "AQID");
    assert_eq!(body["multiValueHeaders"]["Content-Type"][0], "image/png");
}

#[tokio::test]
async fn test_unreachable_proxy_is_bad_gateway() {
    let dead = common::closed_addr().await;
    let front = start_front(&format!("http://{dead}")).await;

    let response = client().get(format!("{}/prod/api", front.base)).send().await.unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errorType"], "UpstreamTransportError");
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let proxy = start_mock(|_| MockResponse::ok("text/plain", "ok")).await;
    let front = start_front(&proxy.url()).await;

    front.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), front.task)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
