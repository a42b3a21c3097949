//! Shared fixtures for integration tests

#![allow(dead_code)]

use pagesumm::Config;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const SUMMARY_TEXT: &str = "- Rust is fast\n- Rust is memory safe";

pub fn article_html() -> String {
    let paragraph = "Rust is a general-purpose programming language emphasizing performance, \
        type safety, and concurrency. It enforces memory safety without a garbage collector.[1]";
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Rust</title><script>window.tracker = "TRACKER";</script></head>
<body>
<header><h1>Site header</h1></header>
<nav><ul><li>NAV_LINK</li></ul></nav>
<article>
<h1>Rust (programming language)</h1>
<p>{paragraph}</p>
<p>{paragraph}</p>
</article>
<footer><p>FOOTER_TEXT</p></footer>
</body>
</html>"#
    )
}

/// Config pointing the completion API at `server` and exports at `export_dir`
pub fn test_config(server: &MockServer, export_dir: &Path) -> Config {
    let mut config = Config::default();
    config.agent.base_url = server.uri();
    config.agent.model = "test-model".to_string();
    config.api.key = Some(API_KEY.to_string());
    config.fetch.timeout_secs = Some(5);
    config.export.dir = export_dir.to_path_buf();
    config
}

pub async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

pub async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })))
        .mount(server)
        .await;
}
