//! Web form front end.
//!
//! `GET /` renders the form, `POST /` runs the pipeline with export enabled,
//! and `GET /download/:filename` serves exported documents.

use crate::export::DOCX_CONTENT_TYPE;
use crate::pipeline::{Pipeline, RunRequest};
use crate::summary::SummaryStyle;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use quick_xml::escape::escape;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Values offered in the summary type select
const FORM_STYLES: [(&str, &str); 4] = [
    ("short", "Short"),
    ("detailed", "Detailed"),
    ("bullets", "Bullet points"),
    ("other", "Other"),
];

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

/// Fields posted by the summary form
#[derive(Debug, Default, Deserialize)]
pub struct SummariseForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary_type: String,
    #[serde(default)]
    pub model_name: String,
}

/// Everything the page template can show
#[derive(Debug, Default)]
struct PageView {
    url: String,
    summary_type: String,
    model_name: String,
    summary: Option<String>,
    error: Option<String>,
    response_time: Option<f64>,
    download_file: Option<String>,
}

/// Build the application router
pub fn router(pipeline: Pipeline) -> Router {
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    Router::new()
        .route("/", get(index_handler).post(summarise_handler))
        .route("/download/:filename", get(download_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process exits
pub async fn serve(pipeline: Pipeline, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(pipeline);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Web server listening on {}", addr);

    axum::serve(listener, app).await
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&PageView {
        summary_type: "short".to_string(),
        model_name: state.pipeline.default_model().to_string(),
        ..PageView::default()
    }))
}

async fn summarise_handler(
    State(state): State<AppState>,
    Form(form): Form<SummariseForm>,
) -> Html<String> {
    let mut view = PageView {
        url: form.url.clone(),
        summary_type: form.summary_type.clone(),
        model_name: form.model_name.clone(),
        ..PageView::default()
    };

    let request = RunRequest::new(form.url.as_str())
        .style(SummaryStyle::from_form_value(&form.summary_type))
        .model(form.model_name.as_str())
        .export(true);

    match state.pipeline.run(&request).await {
        Ok(report) => {
            view.response_time = Some(report.summary.elapsed_seconds());
            view.summary = Some(report.summary.text);
            view.download_file = report.document;
        }
        Err(e) => {
            error!(error = %e, url = %form.url, "Summarisation failed");
            view.error = Some(format!("Error: {e}"));
        }
    }

    Html(render_page(&view))
}

async fn download_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let path = match state.pipeline.exporter().resolve(&filename) {
        Ok(path) => path,
        Err(e) => {
            warn!(file = %filename, error = %e, "Rejected download");
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let headers = [
                (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ];
            (headers, bytes).into_response()
        }
        Err(e) => {
            error!(file = %filename, error = %e, "Failed to read exported document");
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
    }
}

fn render_page(view: &PageView) -> String {
    let mut options = String::new();
    for (value, label) in FORM_STYLES {
        let selected = if value == view.summary_type { " selected" } else { "" };
        options.push_str(&format!(
            r#"<option value="{value}"{selected}>{label}</option>"#
        ));
    }

    let mut results = String::new();
    if let Some(error) = &view.error {
        results.push_str(&format!(r#"<p class="error">{}</p>"#, escape(error)));
    }
    if let Some(summary) = &view.summary {
        results.push_str(&format!(
            r#"<h2>Summary</h2><div class="summary">{}</div>"#,
            escape(summary).replace('\n', "<br>")
        ));
    }
    if let Some(seconds) = view.response_time {
        results.push_str(&format!("<p>Response Time: {seconds:.2} seconds</p>"));
    }
    if let Some(file) = &view.download_file {
        results.push_str(&format!(
            r#"<p><a href="/download/{0}">Download as Word document</a></p>"#,
            escape(file)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>AI Website Summarizer</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
label {{ display: block; margin-top: 1rem; }}
input, select {{ width: 100%; padding: 0.4rem; }}
.error {{ color: #b00020; }}
.summary {{ background: #f5f5f5; padding: 1rem; }}
</style>
</head>
<body>
<h1>AI Website Summarizer</h1>
<form method="post" action="/">
<label for="url">Website URL</label>
<input type="url" id="url" name="url" value="{url}" required>
<label for="summary_type">Summary type</label>
<select id="summary_type" name="summary_type">{options}</select>
<label for="model_name">Model</label>
<input type="text" id="model_name" name="model_name" value="{model}">
<p><button type="submit">Summarize</button></p>
</form>
{results}
</body>
</html>
"#,
        url = escape(&view.url),
        model = escape(&view.model_name),
    )
}
