use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

use serde::{Deserialize, Serialize};

use crate::models::AnswerEnvelope;
use crate::services::IngestReport;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

pub trait Formatter {
    fn format_answer(&self, envelope: &AnswerEnvelope) -> String;
    fn format_coverage(&self, coverage: &BTreeMap<String, u64>) -> String;
    fn format_ingest_report(&self, report: &IngestReport) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_answer(&self, envelope: &AnswerEnvelope) -> String {
        let mut output = String::new();
        writeln!(output, "A: {}", envelope.answer).unwrap();
        if !envelope.citations.is_empty() {
            writeln!(output, "\nSources:").unwrap();
            for citation in &envelope.citations {
                writeln!(output, "  - {}", citation).unwrap();
            }
        }
        output
    }

    fn format_coverage(&self, coverage: &BTreeMap<String, u64>) -> String {
        if coverage.is_empty() {
            return "No documents ingested yet.\n".to_string();
        }

        let mut output = String::new();
        writeln!(output, "Ingested sources").unwrap();
        writeln!(output, "----------------").unwrap();
        for (filename, pages) in coverage {
            writeln!(output, "  {} ({} pages)", filename, pages).unwrap();
        }
        let total: u64 = coverage.values().sum();
        writeln!(output, "Total pages: {}", total).unwrap();
        output
    }

    fn format_ingest_report(&self, report: &IngestReport) -> String {
        let mut output = String::new();
        writeln!(output, "Ingestion Complete").unwrap();
        writeln!(output, "------------------").unwrap();
        writeln!(output, "Documents: {}", report.documents).unwrap();
        writeln!(output, "Pages:     {}", report.pages).unwrap();
        writeln!(output, "Chunks:    {}", report.chunks).unwrap();
        writeln!(output, "Batches:   {}", report.batches).unwrap();
        writeln!(output, "Tokens:    {}", report.tokens).unwrap();
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_answer(&self, envelope: &AnswerEnvelope) -> String {
        serde_json::to_string_pretty(envelope)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    fn format_coverage(&self, coverage: &BTreeMap<String, u64>) -> String {
        serde_json::to_string_pretty(&serde_json::json!({ "sources": coverage }))
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    fn format_ingest_report(&self, report: &IngestReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({ "message": message }).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({ "error": error }).to_string()
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
