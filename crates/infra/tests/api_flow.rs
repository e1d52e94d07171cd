//! Login followed by authenticated resource calls against a mock server

use std::sync::Arc;

use cirrus_common::Clock;
use cirrus_core::SessionManager;
use cirrus_domain::{ClientOptions, OrderDirection};
use cirrus_infra::{
    ApiClient, ApiError, FindOptions, GetOptions, HttpClient, LoginClient, LoginRequest, MemoryStorage,
    ResourceClient,
};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Article {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct Comment {
    id: String,
}

async fn connect(server: &MockServer) -> ApiClient {
    let options = ClientOptions::new("app")
        .with_api_root_url(server.address().to_string())
        .with_api_version("v1")
        .with_ssl(false);
    let session = SessionManager::builder(Arc::new(MemoryStorage::new()))
        .slot(options.session_slot())
        .build()
        .unwrap();
    session.initialize().unwrap();
    let transport = Arc::new(HttpClient::from_options(&options).unwrap());
    ApiClient::new(&options, transport, session)
}

async fn login(server: &MockServer, api: &ApiClient) {
    Mock::given(method("POST"))
        .and(path("/v1/app/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "t0k3n",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/app/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .mount(server)
        .await;

    LoginClient::new(api.clone()).login(&LoginRequest::new("ada", "secret")).await.unwrap();
}

#[tokio::test]
async fn test_find_sends_token_and_query() {
    let server = MockServer::start().await;
    let api = connect(&server).await;
    login(&server, &api).await;

    Mock::given(method("GET"))
        .and(path("/v1/app/articles/"))
        .and(header("Authorization", "Bearer t0k3n"))
        .and(query_param("searchQuery", "rust"))
        .and(query_param("page", "1"))
        .and(query_param("rpp", "2"))
        .and(query_param("sort", "title|desc"))
        .and(query_param("tags", "news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "item": [{ "id": "a1", "title": "One" }, { "id": "a2", "title": "Two" }],
            "page": 1,
            "recordsPerPage": 2,
            "totalRecords": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let articles: ResourceClient<Article> = ResourceClient::named(api, "articles").unwrap();
    let options = FindOptions::new()
        .search("rust")
        .page(1, 2)
        .order_by("title", OrderDirection::Desc)
        .filter("tags", "news");
    let page = articles.find(&options).await.unwrap();

    assert_eq!(page.item[0], Article { id: "a1".into(), title: "One".into() });
    assert!(page.has_next());
}

#[tokio::test]
async fn test_anonymous_requests_omit_authorization() {
    let server = MockServer::start().await;
    let api = connect(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/app/articles/a1/"))
        .and(header("Authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/app/articles/a1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "a1", "title": "One" })))
        .mount(&server)
        .await;

    let articles: ResourceClient<Article> = ResourceClient::named(api, "articles").unwrap();
    let article = articles.get("a1", &GetOptions::default()).await.unwrap();

    assert_eq!(article.title, "One");
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.headers.contains_key("authorization")));
}

#[tokio::test]
async fn test_subresource_and_remove() {
    let server = MockServer::start().await;
    let api = connect(&server).await;
    login(&server, &api).await;

    Mock::given(method("GET"))
        .and(path("/v1/app/articles/a1/comments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "item": [{ "id": "c1" }] })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/app/articles/a1/comments/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let articles: ResourceClient<Article> = ResourceClient::named(api, "articles").unwrap();
    let comments = articles.subresource::<Comment>("a1", "comments").unwrap();

    let page = comments.find(&FindOptions::new()).await.unwrap();
    assert_eq!(page.item[0].id, "c1");
    comments.remove("c1").await.unwrap();
}

#[tokio::test]
async fn test_missing_item_maps_to_not_found() {
    let server = MockServer::start().await;
    let api = connect(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/app/resources/cars/missing/"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"not found"}"#))
        .mount(&server)
        .await;

    let cars: ResourceClient<serde_json::Value> =
        ResourceClient::named(api, "dynamic-resources").unwrap().with_param("schemaName", "cars");
    let result = cars.get("missing", &GetOptions::default()).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_expired_session_token_is_not_sent() {
    let server = MockServer::start().await;
    let api = connect(&server).await;
    let expired = cirrus_domain::AuthToken::from_expires_in("old", "Bearer", -5, api.session().clock().now());
    // An expired token logs out immediately
    api.session().set_user(Some(json!({ "id": "u1" })), Some(expired)).unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/app/key-values/k1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": "k1" })))
        .mount(&server)
        .await;

    let values: ResourceClient<serde_json::Value> = ResourceClient::named(api.clone(), "key-values").unwrap();
    values.get("k1", &GetOptions::default()).await.unwrap();

    assert!(!api.session().is_authenticated());
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}
