use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::Router;
use llamainsight::api::InsightService;
use llamainsight::config::Config;
use llamainsight::server::{create_app, AppState};
use mockito::Server;
use serde_json::Value;

pub mod test_helpers {
    use super::*;

    pub const ANALYSIS_MODEL: &str = "analysis-model";
    pub const VISION_MODEL: &str = "vision-model";
    pub const BOUNDARY: &str = "llamainsight-test-boundary";

    /// English prose that passes content validation
    pub const PROSE: &str = "The quarterly report describes how the platform team moved the \
        billing service to a new cluster. It explains the migration plan, the risks that were \
        tracked and the results that followed. Latency dropped and the error rate stayed flat \
        for the whole month after the change.";

    pub async fn setup_test_server() -> mockito::ServerGuard {
        Server::new_async().await
    }

    /// Config with every endpoint pointed at the mock server and all keys set
    pub fn create_test_config(server_url: &str) -> Config {
        let mut config = Config::default();
        config.endpoints.github_api_base = server_url.to_string();
        config.endpoints.gemini_api_base = server_url.to_string();
        config.endpoints.reader_api_base = server_url.to_string();
        config.api_keys.gemini_api_key = Some("gemini-test-key".to_string());
        config.api_keys.reader_api_key = Some("reader-test-key".to_string());
        config.model.analysis_model = ANALYSIS_MODEL.to_string();
        config.model.vision_model = VISION_MODEL.to_string();
        config
    }

    pub fn create_test_app(config: Config) -> Router {
        let max_upload = config.server.max_upload_bytes;
        let service = InsightService::new(config).expect("service builds");
        create_app(AppState::new(service), max_upload)
    }

    pub fn model_path(model: &str) -> String {
        format!("/v1beta/models/{}:generateContent", model)
    }

    pub fn gemini_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
        .to_string()
    }

    /// A model reply that satisfies the analysis minimums
    pub fn analysis_reply() -> String {
        let narrative = format!("{} {}", PROSE, PROSE);
        serde_json::json!({
            "summary": narrative,
            "features": ["Cluster migration", "Risk tracking", "Latency results"],
            "technologies": ["Kubernetes"],
            "useCases": ["Planning migrations", "Reporting to stakeholders"],
            "insights": narrative,
        })
        .to_string()
    }

    pub fn multipart_request(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analyze-file")
            .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .expect("valid request")
    }

    pub fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    pub async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    pub fn setup_test_logger() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("llamainsight=debug")
            .with_test_writer()
            .try_init();
    }
}
