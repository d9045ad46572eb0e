//! Sensor test report: turns test records into document content.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Alignment, CellStyle, Color, Content, FontSize, Table, TableStyle, TextStyle, Weight,
};

pub const HEADER_COLOR: Color = Color(63, 81, 181);
pub const SUCCESS_COLOR: Color = Color(76, 175, 80);
pub const ERROR_COLOR: Color = Color(244, 67, 54);
pub const WARNING_COLOR: Color = Color(255, 152, 0);
pub const LIGHT_GRAY: Color = Color(245, 245, 245);
pub const GRAY: Color = Color(128, 128, 128);

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInput {
    pub title: Option<String>,
    /// Preformatted timestamp; omitted from the report when absent.
    pub generated_at: Option<String>,
    pub generator: Option<String>,
    pub duration_ms: u64,
    /// Device properties as (label, value) pairs, in display order.
    pub device: Vec<(String, Option<String>)>,
    pub results: Vec<TestRecord>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRecord {
    pub sensor_name: String,
    pub sensor_type: String,
    pub working: bool,
    pub duration_ms: u64,
    pub sample: Option<String>,
    pub accuracy: Option<String>,
    pub error: Option<String>,
}

impl TestRecord {
    fn details(&self) -> String {
        if self.working {
            format!(
                "Sample: {}\nAccuracy: {}",
                self.sample.as_deref().unwrap_or("-"),
                self.accuracy.as_deref().unwrap_or("-")
            )
        } else {
            format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("Unknown error")
            )
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
    pub success_rate: f64,
}

pub fn summarize(results: &[TestRecord]) -> Summary {
    let total = results.len();
    let working = results.iter().filter(|r| r.working).count();
    let success_rate = if total > 0 {
        working as f64 * 100.0 / total as f64
    } else {
        0.0
    };
    Summary {
        total,
        working,
        failed: total - working,
        success_rate,
    }
}

pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}

/// Green from 80%, orange from 50%, red below.
pub fn rate_color(success_rate: f64) -> Color {
    if success_rate >= 80.0 {
        SUCCESS_COLOR
    } else if success_rate >= 50.0 {
        WARNING_COLOR
    } else {
        ERROR_COLOR
    }
}

fn colored(style: &TableStyle, color: Color) -> CellStyle {
    CellStyle {
        text: style.body.with_color(color),
        fill: None,
    }
}

fn cells<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn section_table_style(weights: Vec<f32>) -> TableStyle {
    TableStyle {
        header: TextStyle::new(FontSize::Body, Weight::Bold, Alignment::Center)
            .with_color(Color::WHITE),
        body: TextStyle::new(FontSize::Small, Weight::Regular, Alignment::Center),
        cell_padding: 6.0,
        header_fill: Some(HEADER_COLOR),
        stripe_fill: Some(LIGHT_GRAY),
        column_weights: Some(weights),
        ..TableStyle::default()
    }
}

/// Build the full report: title, device information, summary, per-sensor
/// results and a closing footer line.
pub fn build_report(input: &ReportInput) -> Result<Content> {
    let mut content = Content::new();
    let section = |c: &mut Content, title: &str| -> Result<()> {
        c.add_spacer(10.0)?
            .add_heading_with(title, 2, Alignment::Left, Some(HEADER_COLOR))?;
        Ok(())
    };

    content.add_heading_with(
        input.title.as_deref().unwrap_or("Sensor Test Report"),
        1,
        Alignment::Center,
        Some(HEADER_COLOR),
    )?;
    if let Some(at) = &input.generated_at {
        content.add_paragraph(
            format!("Generated on {at}"),
            TextStyle::new(FontSize::Small, Weight::Regular, Alignment::Center).with_color(GRAY),
        )?;
    }

    if !input.device.is_empty() {
        section(&mut content, "Device Information")?;
        let label_style = CellStyle {
            text: TextStyle::new(FontSize::Body, Weight::Bold, Alignment::Left)
                .with_color(HEADER_COLOR),
            fill: Some(LIGHT_GRAY),
        };
        let rows = input
            .device
            .iter()
            .map(|(label, value)| {
                vec![
                    label.clone(),
                    value.clone().unwrap_or_else(|| "Unknown".to_string()),
                ]
            })
            .collect();
        let table = (0..input.device.len()).fold(
            Table::without_header(rows).with_style(TableStyle {
                body: TextStyle::default(),
                cell_padding: 8.0,
                stripe_fill: None,
                ..section_table_style(vec![1.0, 2.0])
            }),
            |table, row| table.with_cell_style(row, 0, label_style),
        );
        content.push_table(table)?;
    }

    let summary = summarize(&input.results);
    section(&mut content, "Test Summary")?;
    let style = section_table_style(vec![1.0, 1.0, 1.0, 1.0]);
    let summary_table = Table::new(
        cells(["Total Sensors", "Working", "Failed", "Success Rate"]),
        vec![vec![
            summary.total.to_string(),
            summary.working.to_string(),
            summary.failed.to_string(),
            format!("{:.1}%", summary.success_rate),
        ]],
    )
    .with_cell_style(0, 1, colored(&style, SUCCESS_COLOR))
    .with_cell_style(0, 2, colored(&style, ERROR_COLOR))
    .with_cell_style(0, 3, colored(&style, rate_color(summary.success_rate)))
    .with_style(style);
    content.push_table(summary_table)?;
    content.add_paragraph(
        format!("Test Duration: {}", format_duration(input.duration_ms)),
        TextStyle::default(),
    )?;

    section(&mut content, "Detailed Test Results")?;
    let style = section_table_style(vec![2.0, 1.0, 1.0, 1.0, 3.0]);
    let rows = input
        .results
        .iter()
        .map(|r| {
            vec![
                r.sensor_name.clone(),
                r.sensor_type.clone(),
                if r.working { "PASS" } else { "FAIL" }.to_string(),
                format_duration(r.duration_ms),
                r.details(),
            ]
        })
        .collect();
    let results_table = input.results.iter().enumerate().fold(
        Table::new(
            cells(["Sensor Name", "Type", "Status", "Duration", "Details"]),
            rows,
        ),
        |table, (ri, r)| {
            let status = if r.working { SUCCESS_COLOR } else { ERROR_COLOR };
            table.with_cell_style(ri, 2, colored(&style, status))
        },
    );
    content.push_table(results_table.with_style(style))?;

    content.add_spacer(30.0)?.add_paragraph(
        format!(
            "Generated by {}",
            input.generator.as_deref().unwrap_or("pagewright-pdf")
        ),
        TextStyle::new(FontSize::Small, Weight::Regular, Alignment::Center).with_color(GRAY),
    )?;

    log::debug!(
        "report: {} results, {} blocks",
        input.results.len(),
        content.len()
    );
    Ok(content)
}
