//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use truscope_domain::VerificationReport;

/// Longest quote shown in the evidence table
const MAX_QUOTE_CHARS: usize = 80;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format one report.
    pub fn format_report(&self, report: &VerificationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(self.format_quiet(report)),
        }
    }

    /// Format the reports of a batch run.
    pub fn format_reports(&self, reports: &[VerificationReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
            OutputFormat::Quiet => Ok(reports
                .iter()
                .map(|r| self.format_quiet(r))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.format_batch_table(reports)),
        }
    }

    fn format_quiet(&self, report: &VerificationReport) -> String {
        format!("{}\t{}", report.score, report.verdict)
    }

    fn format_report_table(&self, report: &VerificationReport) -> String {
        let mut out = Vec::new();

        out.push(format!("{} {}", self.label("Claim:"), report.claim));
        out.push(format!(
            "{} {} ({}/100)",
            self.label("Verdict:"),
            self.verdict(&report.verdict, report.score),
            report.score
        ));
        out.push(format!("{} {}", self.label("Reasoning:"), report.reasoning));
        out.push(String::new());

        let mut tiers = Builder::default();
        tiers.push_record(["Tier", "Status", "Confidence", "Evidence", "Time (ms)"]);
        for summary in &report.tier_breakdown {
            let status = if summary.success {
                self.colorize("ok", "green")
            } else {
                self.colorize("failed", "red")
            };
            tiers.push_record([
                summary.tier.to_string(),
                status,
                format!("{:.0}", summary.confidence),
                summary.evidence_count.to_string(),
                summary.processing_time_ms.to_string(),
            ]);
        }
        out.push(styled(tiers));

        if report.evidence.is_empty() {
            out.push(self.colorize("No evidence found.", "yellow"));
        } else {
            let mut evidence = Builder::default();
            evidence.push_record(["Score", "Publisher", "Type", "Quote"]);
            let mut sorted: Vec<_> = report.evidence.iter().collect();
            sorted.sort_by(|a, b| b.score().total_cmp(&a.score()));
            for item in sorted {
                evidence.push_record([
                    format!("{:.0}", item.score()),
                    item.publisher.clone(),
                    item.evidence_type.as_str().to_string(),
                    truncate(&item.quote, MAX_QUOTE_CHARS),
                ]);
            }
            out.push(styled(evidence));
        }

        for warning in &report.warnings {
            out.push(self.warning(warning));
        }
        out.push(self.info(&format!(
            "{} via {:?} in {} ms (report {})",
            report.verdict, report.synthesis_method, report.processing_time_ms, report.id
        )));

        out.join("\n")
    }

    fn format_batch_table(&self, reports: &[VerificationReport]) -> String {
        if reports.is_empty() {
            return self.colorize("No claims processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Claim", "Verdict", "Score", "Tiers", "Warnings"]);
        for (idx, report) in reports.iter().enumerate() {
            builder.push_record([
                (idx + 1).to_string(),
                truncate(&report.claim, 50),
                self.verdict(&report.verdict, report.score),
                report.score.to_string(),
                report.tier_breakdown.len().to_string(),
                report.warnings.len().to_string(),
            ]);
        }
        styled(builder)
    }

    /// Verdict colored by score band.
    fn verdict(&self, verdict: &str, score: u8) -> String {
        let color = match score {
            70..=100 => "green",
            50..=69 => "yellow",
            _ => "red",
        };
        self.colorize(verdict, color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn label(&self, text: &str) -> String {
        if self.color_enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}
