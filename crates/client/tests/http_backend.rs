use portaria_client::legacy::LegacyStoreClient;
use portaria_client::{HttpBackend, PortariaApi, SourceRef};
use portaria_core::{ApiError, LegacyStoreConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_ask_posts_question_and_parses_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({ "question": "O que diz a portaria 12?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Ela trata de **férias**.",
            "sources": [{ "id": "portaria_12_2023", "title": "Portaria 12/2023" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::with_base_url(&server.uri()).unwrap();
    let response = backend.ask("O que diz a portaria 12?").await.unwrap();

    assert_eq!(response.answer, "Ela trata de **férias**.");
    assert_eq!(
        response.sources,
        vec![SourceRef::new("portaria_12_2023", "Portaria 12/2023")]
    );
}

#[tokio::test]
async fn test_error_body_becomes_application_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Nenhuma pergunta fornecida" })),
        )
        .mount(&server)
        .await;

    let backend = HttpBackend::with_base_url(&server.uri()).unwrap();
    let err = backend.ask("").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Application {
            status: 400,
            message: "Nenhuma pergunta fornecida".to_string()
        }
    );
}

#[tokio::test]
async fn test_failure_without_error_body_is_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let backend = HttpBackend::with_base_url(&server.uri()).unwrap();
    let err = backend.search("licitação").await.unwrap_err();

    assert_eq!(err, ApiError::Server(502));
    assert_eq!(err.to_string(), "Erro do servidor: 502");
}

#[tokio::test]
async fn test_search_posts_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({ "query": "diárias 2022" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": "p1", "title": "Portaria 1/2022", "score": 0.91, "snippet": "Concede diárias" },
                { "id": "p2", "title": "Portaria 7/2022", "score": 0.77, "snippet": "Altera diárias" }
            ]
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::with_base_url(&server.uri()).unwrap();
    let response = backend.search("diárias 2022").await.unwrap();

    let ids: Vec<_> = response.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_get_document_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/document/portaria_42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "portaria_42",
            "title": "Conteúdo Completo: portaria_42",
            "content": "Art. 1º Fica instituído..."
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::with_base_url(&server.uri()).unwrap();
    let document = backend.get_document("portaria_42").await.unwrap();

    assert_eq!(document.id, "portaria_42");
    assert!(document.content.starts_with("Art. 1º"));
}

#[tokio::test]
async fn test_malformed_body_is_unknown_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/document/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let backend = HttpBackend::with_base_url(&server.uri()).unwrap();
    let err = backend.get_document("x").await.unwrap_err();

    assert!(matches!(err, ApiError::Unknown(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_connection_error() {
    // Bind then drop a listener so nothing answers on the port. Mock servers
    // are pooled and keep listening after they are dropped.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let backend = HttpBackend::with_base_url(&format!("http://{}", addr)).unwrap();
    let err = backend.ask("alguém aí?").await.unwrap_err();

    assert_eq!(err, ApiError::Connection);
}

#[tokio::test]
async fn test_legacy_find_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/portarias/_find"))
        .and(header_exists("authorization"))
        .and(body_json(json!({
            "selector": { "$or": [
                { "content": { "$regex": "(?i)café" } },
                { "title": { "$regex": "(?i)café" } }
            ]},
            "limit": 50,
            "fields": ["_id", "title", "content"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [{ "_id": "p9", "title": "Portaria 9", "content": "Fornecimento de café" }]
        })))
        .mount(&server)
        .await;

    let client = LegacyStoreClient::new(&LegacyStoreConfig {
        url: server.uri(),
        database: "portarias".to_string(),
        username: Some("admin".to_string()),
        password: Some("secret".to_string()),
    })
    .unwrap();

    let docs = client.search_portarias("café").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "p9");
}

#[tokio::test]
async fn test_legacy_failure_ignores_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/portarias/_find"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "unauthorized" })),
        )
        .mount(&server)
        .await;

    let client = LegacyStoreClient::new(&LegacyStoreConfig {
        url: server.uri(),
        database: "portarias".to_string(),
        username: None,
        password: None,
    })
    .unwrap();

    let err = client.search_portarias("x").await.unwrap_err();
    assert_eq!(err.to_string(), "Erro do servidor: 401");
}
