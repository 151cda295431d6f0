//! Rendering of the wide report table
//!
//! Rows are grouped by county and family type. Each group becomes one table
//! with the line item as row label and one currency column per year.
//! Rendering never touches the input table.

pub mod format;

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use askama::Template;
use chrono::{Local, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

pub use self::format::{format_cell, format_currency};
use crate::error::Result;
use crate::error::util::safe_create_file;
use crate::transform::{ReportGroup, ReportTable};

/// Default report title
pub const DEFAULT_TITLE: &str = "Self-Sufficiency Standard Comparison";

/// Placeholder shown when no rows matched the selection
pub const EMPTY_PLACEHOLDER: &str =
    "No line items matched the selected counties and family types.";

/// Output format of the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Box-drawn console tables
    #[default]
    Text,
    /// Markdown document
    Markdown,
    /// Standalone HTML document
    Html,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown report format '{other}' (expected text, markdown or html)")),
        }
    }
}

/// Options controlling how the report is rendered
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output format
    pub format: ReportFormat,
    /// Title override; [`DEFAULT_TITLE`] when `None`
    pub title: Option<String>,
    /// Counties named in the subtitle, in display order
    pub counties: Vec<String>,
    /// Year whose dollars the costs are expressed in
    pub reference_year: i32,
    /// Add a column with the change from the first to the last year
    pub include_change: bool,
}

/// A rendered report ready for display or export
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Report title
    pub title: String,
    /// Subtitle naming the compared counties
    pub subtitle: String,
    /// Format the body is written in
    pub format: ReportFormat,
    /// Date the report was generated
    pub generated_on: NaiveDate,
    /// Full rendered document
    pub body: String,
}

impl RenderedReport {
    /// Write the report to a file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut file = safe_create_file(path, "report output")?;
        file.write_all(self.body.as_bytes())?;
        log::info!("Wrote {:?} report to {}", self.format, path.display());
        Ok(())
    }
}

impl fmt::Display for RenderedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

struct Section {
    heading: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn format_change(first: Option<f64>, last: Option<f64>) -> String {
    match (first, last) {
        (Some(first), Some(last)) => {
            let change = last - first;
            if change.round() > 0.0 {
                format!("+{}", format_currency(change))
            } else {
                format_currency(change)
            }
        }
        _ => "n/a".to_string(),
    }
}

fn build_section(table: &ReportTable, group: &ReportGroup<'_>, include_change: bool) -> Section {
    let years = table.years();
    let with_change = include_change && years.len() > 1;

    let mut header = vec!["Line Item".to_string(), "Group".to_string()];
    header.extend(years.iter().map(ToString::to_string));
    if with_change {
        header.push("Change".to_string());
    }

    let rows = group
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.line_item.clone(), row.line_group.to_string()];
            cells.extend(row.costs.iter().map(|cost| format_cell(*cost)));
            if with_change {
                let first = row.costs.first().copied().flatten();
                let last = row.costs.last().copied().flatten();
                cells.push(format_change(first, last));
            }
            cells
        })
        .collect();

    Section {
        heading: format!("{}: {}", group.county, group.family_type),
        header,
        rows,
    }
}

fn tabled_table(section: &Section, style: ReportFormat) -> String {
    let mut builder = Builder::default();
    builder.push_record(section.header.clone());
    for row in &section.rows {
        builder.push_record(row.clone());
    }

    let mut table = builder.build();
    match style {
        ReportFormat::Markdown => table.with(Style::markdown()),
        _ => table.with(Style::modern()),
    };
    table.modify(Columns::new(2..), Alignment::right());
    table.to_string()
}

fn render_text(report: &RenderedReport, sections: &[Section]) -> String {
    let mut out = format!("{}\n{}\n\n", report.title, report.subtitle);
    if sections.is_empty() {
        out.push_str(EMPTY_PLACEHOLDER);
        out.push('\n');
    }
    for section in sections {
        out.push_str(&section.heading);
        out.push('\n');
        out.push_str(&tabled_table(section, ReportFormat::Text));
        out.push_str("\n\n");
    }
    out.push_str(&format!("Generated {}\n", report.generated_on));
    out
}

fn render_markdown(report: &RenderedReport, sections: &[Section]) -> String {
    let mut out = format!("# {}\n\n_{}_\n\n", report.title, report.subtitle);
    if sections.is_empty() {
        out.push_str(EMPTY_PLACEHOLDER);
        out.push_str("\n\n");
    }
    for section in sections {
        out.push_str(&format!("## {}\n\n", section.heading));
        out.push_str(&tabled_table(section, ReportFormat::Markdown));
        out.push_str("\n\n");
    }
    out.push_str(&format!("Generated {}\n", report.generated_on));
    out
}

/// Standalone HTML document; askama escapes every interpolated value
#[derive(Template)]
#[template(path = "report.html")]
struct HtmlReport<'a> {
    title: &'a str,
    subtitle: &'a str,
    placeholder: &'a str,
    sections: &'a [Section],
    generated_on: NaiveDate,
}

fn render_html(report: &RenderedReport, sections: &[Section]) -> Result<String> {
    let page = HtmlReport {
        title: &report.title,
        subtitle: &report.subtitle,
        placeholder: EMPTY_PLACEHOLDER,
        sections,
        generated_on: report.generated_on,
    };
    Ok(page.render()?)
}

/// Render the report table
pub fn render(table: &ReportTable, options: &RenderOptions) -> Result<RenderedReport> {
    let counties: Vec<&str> = if options.counties.is_empty() {
        table.rows().iter().map(|r| r.county.as_str()).unique().collect()
    } else {
        options.counties.iter().map(String::as_str).collect()
    };

    let mut report = RenderedReport {
        title: options
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        subtitle: format!(
            "{}: annual costs in {} dollars",
            counties.iter().join(" vs. "),
            options.reference_year
        ),
        format: options.format,
        generated_on: Local::now().date_naive(),
        body: String::new(),
    };

    let sections: Vec<Section> = table
        .groups()
        .iter()
        .map(|group| build_section(table, group, options.include_change))
        .collect();

    report.body = match options.format {
        ReportFormat::Text => render_text(&report, &sections),
        ReportFormat::Markdown => render_markdown(&report, &sections),
        ReportFormat::Html => render_html(&report, &sections)?,
    };
    Ok(report)
}
