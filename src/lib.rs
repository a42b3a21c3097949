//! # pagesumm
//!
//! Fetch a webpage, strip the boilerplate and summarise the remaining text
//! with a large language model.
//!
//! ## Features
//!
//! - **Article extraction**: fixed boilerplate filters and an `article` → `main` → `body` content root
//! - **Summary styles**: short, detailed, bullet-point or generic instructions
//! - **Two front ends, one pipeline**: a web form and a terminal prompt
//! - **Word export**: summaries saved as `.docx` with run metadata

pub mod agent;
pub mod config;
pub mod export;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod scraper;
pub mod summary;
pub mod ui;
pub mod web;

pub use config::Config;
pub use pipeline::{Pipeline, PipelineError, RunReport, RunRequest};
pub use summary::{SummaryRequest, SummaryResult, SummaryStyle};
