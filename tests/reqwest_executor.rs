use helix_eventsub::{
    Client, Condition, Config, HelixErr, SubscriptionRequest, SubscriptionsParams, Transport,
};
use http::StatusCode;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_BODY: &str = r#"{"total":2,"data":[{"id":"832389eb-0d0b-41f8-b564-da039f6c4c75","status":"enabled","type":"channel.follow","version":"1","condition":{"broadcaster_user_id":"12345678"},"created_at":"2021-03-09T10:37:32.308415339Z","transport":{"method":"webhook","callback":"https://example.com/eventsub/follow"},"cost":1},{"id":"832389eb-0d0b-41f8-b564-da039f6c4c73","status":"enabled","type":"channel.follow","version":"1","condition":{"broadcaster_user_id":"12345679"},"created_at":"2021-03-09T10:37:32.308415339Z","transport":{"method":"webhook","callback":"https://example.com/eventsub/follow"},"cost":1}],"limit":100000000,"max_total_cost":10000,"total_cost":2,"pagination":{}}"#;

fn client_for(server: &MockServer) -> Client {
    let base = Url::parse(&format!("{}/helix", server.uri())).unwrap();
    Client::new(
        Config::new("my-client-id")
            .with_app_access_token("app-token")
            .with_base_url(base),
    )
}

#[tokio::test]
async fn test_list_subscriptions_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/helix/eventsub/subscriptions"))
        .and(header("client-id", "my-client-id"))
        .and(header("authorization", "Bearer app-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ratelimit-limit", "800")
                .insert_header("ratelimit-remaining", "799")
                .insert_header("ratelimit-reset", "1624497600")
                .set_body_raw(LIST_BODY, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let res = client_for(&server)
        .get_eventsub_subscriptions(&SubscriptionsParams::default())
        .await
        .unwrap();

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().unwrap().subscriptions.len(), 2);
    assert_eq!(res.rate_limit().unwrap().remaining, 799);
}

#[tokio::test]
async fn test_create_subscription_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/helix/eventsub/subscriptions"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "type": "channel.follow",
            "transport": { "method": "webhook", "secret": "s3cr37w0rd" }
        })))
        .respond_with(ResponseTemplate::new(409).set_body_raw(
            r#"{"error":"Conflict","status":409,"message":"subscription already exists"}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = SubscriptionRequest::new(
        "channel.follow",
        Condition::broadcaster("12345678"),
        Transport::webhook("https://example.com/eventsub/follow", "s3cr37w0rd"),
    );
    let res = client_for(&server)
        .create_eventsub_subscription(&request)
        .await
        .unwrap();

    assert_eq!(res.status, StatusCode::CONFLICT);
    let err = res.into_result().unwrap_err();
    assert_eq!(err.error, "Conflict");
    assert_eq!(err.status, 409);
}

#[tokio::test]
async fn test_remove_subscription_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/helix/eventsub/subscriptions"))
        .and(query_param("id", "832389eb-0d0b-41f8-b564-da039f6c4c75"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let res = client_for(&server)
        .remove_eventsub_subscription("832389eb-0d0b-41f8-b564-da039f6c4c75")
        .await
        .unwrap();

    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.is_success());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // grab a free port, then close it so the connection is refused
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base = Url::parse(&format!("http://127.0.0.1:{}/helix", port)).unwrap();
    let client = Client::new(Config::new("my-client-id").with_base_url(base));

    let err = client
        .get_eventsub_subscriptions(&SubscriptionsParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, HelixErr::Transport(_)));

    let msg = err.to_string();
    assert!(msg.starts_with("failed to execute API request: "));
    assert!(
        msg.to_lowercase().contains("refused"),
        "missing refusal reason: {msg}"
    );
    assert_eq!(msg.matches("error sending request").count(), 1);
    assert!(std::error::Error::source(&err).is_none());
}
