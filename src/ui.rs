//! Terminal front end: the interactive URL prompt and result printing.

use crate::export::DocumentContents;
use crate::pipeline::{Pipeline, PipelineError, RunReport, RunRequest};
use colored::Colorize;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::error;

const URL_PROMPT: &str = "Enter website URL";

/// Ask for one URL, summarise it and print the result.
///
/// Failures are printed and logged; they end the attempt without an error.
pub async fn prompt(pipeline: &Pipeline) -> anyhow::Result<()> {
    let url = read_url()?;

    println!("\n{}\n", "Generating Summary...".dimmed());

    match pipeline.run(&RunRequest::new(url.as_str())).await {
        Ok(report) => print_report(&report),
        Err(e) => print_error(&url, &e),
    }

    Ok(())
}

/// Read the URL from the terminal, or one line of piped input
fn read_url() -> anyhow::Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        let url: String = Input::new().with_prompt(URL_PROMPT).interact_text()?;
        return Ok(url);
    }

    print!("{URL_PROMPT}: ");
    io::stdout().flush()?;
    Ok(read_line_from(stdin.lock())?)
}

fn read_line_from<R: BufRead>(mut reader: R) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Print a finished summary
pub fn print_report(report: &RunReport) {
    println!("{}\n", "===== SUMMARY =====".bold());
    println!("{}", report.summary.text);
    println!(
        "\n{}",
        format!(
            "Model: {} | Response Time: {:.2} seconds",
            report.model,
            report.summary.elapsed_seconds()
        )
        .dimmed()
    );

    if let Some(document) = &report.document {
        println!("{} {}", "Saved:".green(), document);
    }
}

/// Print and log a pipeline failure
pub fn print_error(url: &str, err: &PipelineError) {
    error!(error = %err, url = %url, "Summarisation failed");
    // Errors go to stdout alongside the summary output
    let _ = write_error(&mut io::stdout(), err);
}

fn write_error<W: Write>(out: &mut W, err: &PipelineError) -> io::Result<()> {
    writeln!(out, "{} {}", "Error:".red().bold(), err)
}

/// Print an exported document read back from disk
pub fn print_document(contents: &DocumentContents) {
    println!("{}\n", contents.title.bold());
    for line in &contents.metadata {
        println!("{}", line.dimmed());
    }
    println!("\n{}", contents.summary);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_piped_url_is_trimmed() {
        let input = Cursor::new("  https://example.com/post \nignored\n");
        assert_eq!(read_line_from(input).unwrap(), "https://example.com/post");
    }

    #[test]
    fn test_error_line_carries_message() {
        let mut out = Vec::new();
        let err = PipelineError::InvalidUrl("example.com".into());
        write_error(&mut out, &err).unwrap();

        let line = String::from_utf8(out).unwrap();
        assert!(line.contains("Error:"));
        assert!(line.contains("Invalid URL. Please enter a valid http/https URL."));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_empty_input_reads_blank_url() {
        let url = read_line_from(Cursor::new("")).unwrap();
        assert!(url.is_empty());
    }
}
