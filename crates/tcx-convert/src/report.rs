use comfy_table::{presets::UTF8_FULL, Table};
use tcx_transcoder::{MemberReport, MemberStatus, SummaryRecord};

/// One processed input, as shown in the batch and archive tables.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub name: String,
    pub status: MemberStatus,
    pub summary: Option<SummaryRecord>,
    pub message: Option<String>,
}

impl FileOutcome {
    pub fn converted(name: impl Into<String>, summary: SummaryRecord) -> Self {
        Self {
            name: name.into(),
            status: MemberStatus::Converted,
            summary: Some(summary),
            message: None,
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: MemberStatus::Failed,
            summary: None,
            message: Some(message.into()),
        }
    }

    pub fn from_member(report: &MemberReport, summary: Option<&SummaryRecord>) -> Self {
        Self {
            name: report.name.clone(),
            status: report.status,
            summary: summary.cloned(),
            message: report.message.clone(),
        }
    }
}

pub fn outcome_table(outcomes: &[FileOutcome]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "File",
        "Status",
        "Date & Time",
        "Total Time",
        "Distance (km)",
        "Message",
    ]);

    for outcome in outcomes {
        let summary = outcome.summary.clone().unwrap_or_default();
        let status = match outcome.status {
            MemberStatus::Converted => "converted",
            MemberStatus::Failed => "failed",
        };
        table.add_row(vec![
            outcome.name.clone(),
            status.to_string(),
            summary.activity_datetime.unwrap_or_default(),
            summary.total_time.unwrap_or_default(),
            summary.total_distance_km.unwrap_or_default(),
            outcome.message.clone().unwrap_or_default(),
        ]);
    }

    table
}

pub fn print_counts(outcomes: &[FileOutcome]) {
    let converted = outcomes
        .iter()
        .filter(|outcome| outcome.status == MemberStatus::Converted)
        .count();
    println!("\n--- Conversion Summary ---");
    println!("  Converted: {converted}");
    println!("  Failed: {}", outcomes.len() - converted);
}

pub fn print_summary(summary: &SummaryRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else if summary.is_empty() {
        println!("No activity summary available.");
    } else {
        println!("{summary}");
    }
    Ok(())
}
