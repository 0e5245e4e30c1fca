//! Assertions over the output directory: cached facets and written reports.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Session ids with a cached facet, sorted
pub fn cached_session_ids(facets_dir: &Path) -> Result<Vec<String>> {
    if !facets_dir.exists() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in WalkDir::new(facets_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
    }
    ids.sort();
    Ok(ids)
}

/// The cached facet for `session_id`, parsed as raw JSON
pub fn read_facet(facets_dir: &Path, session_id: &str) -> Result<Value> {
    let path = facets_dir.join(format!("{}.json", session_id));
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("no cached facet at {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

/// Timestamped report files (`report_*.html`, excluding the latest alias), sorted
pub fn report_files(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut reports = Vec::new();
    for entry in WalkDir::new(output_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let is_report = {
            let name = entry.file_name().to_string_lossy();
            name.starts_with("report_") && name.ends_with(".html") && name != "report_latest.html"
        };
        if is_report {
            reports.push(entry.into_path());
        }
    }
    reports.sort();
    Ok(reports)
}

/// Fail unless `value[field]` equals `expected`
pub fn assert_field(value: &Value, field: &str, expected: &Value) -> Result<()> {
    let actual = value
        .get(field)
        .with_context(|| format!("facet has no '{}' field", field))?;
    if actual != expected {
        anyhow::bail!("Expected {} = {}, got {}", field, expected, actual);
    }
    Ok(())
}
