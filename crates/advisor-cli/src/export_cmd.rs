//! `advisor export-prereqs` command: dump every prerequisite parse as JSON.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use advisor_core::catalog::CatalogIndex;
use advisor_core::code::CourseCode;

/// Exported prerequisite state of one course.
#[derive(Debug, Serialize)]
pub struct PrerequisiteExport {
    /// Rendered expression, or the original text when it did not parse.
    pub expr: Option<String>,
    pub valid: bool,
    /// Referenced codes missing from the catalog.
    pub not_found: Vec<CourseCode>,
}

/// Every course's prerequisite parse keyed by code, in code order.
pub fn prerequisite_exports(index: &CatalogIndex) -> BTreeMap<&CourseCode, PrerequisiteExport> {
    index
        .prerequisites()
        .map(|(code, parse)| {
            let export = PrerequisiteExport {
                expr: parse.display_text(),
                valid: parse.is_valid(),
                not_found: parse.unresolved.clone(),
            };
            (code, export)
        })
        .collect()
}

/// Export prerequisite parses as JSON to `output` or stdout.
pub fn run_export_prereqs(index: &CatalogIndex, output: Option<&str>) -> Result<()> {
    let exports = prerequisite_exports(index);

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {path}"))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };

    serde_json::to_writer_pretty(&mut writer, &exports)?;
    writeln!(writer)?;

    if let Some(path) = output {
        println!("Exported {} courses to {path}", exports.len());
    }

    Ok(())
}
