use anyhow::Result;
use chrono::Utc;
use insights_index::FacetFilter;
use insights_runtime::{Error, InferenceBackend, ReportService};
use insights_types::Facet;

use super::open::open_report;
use crate::args::FilterArgs;
use crate::context::ExecutionContext;
use crate::views::{Palette, kilo};

pub struct ReportOptions<'a> {
    pub project: Option<&'a str>,
    pub verbose: bool,
    pub open: bool,
}

/// `insights report`: rebuild the report from the facet cache, no extraction
pub fn handle(ctx: &ExecutionContext, filter: FilterArgs, verbose: bool, no_open: bool) -> Result<()> {
    let config = ctx.config()?;
    let prompts = ctx.prompts(&config)?;

    let facets = ctx.store().load_all(&FacetFilter {
        project: filter.project.clone(),
        since_days: filter.since,
    })?;
    if facets.is_empty() {
        return Err(Error::EmptyCache("run `insights run` first".to_string()).into());
    }

    let label = filter
        .project
        .as_deref()
        .map(|p| format!(" (filtered: {})", p))
        .unwrap_or_default();
    println!("Loaded {} cached facets{}", facets.len(), label);

    let backend = super::inference_backend(&config, ctx.output_dir())?;
    write_report(
        ctx,
        &backend,
        &prompts.report,
        &facets,
        &ReportOptions {
            project: filter.project.as_deref(),
            verbose,
            open: !no_open,
        },
    )
}

/// Generate, write and optionally open the report.
///
/// A failed report call is printed and swallowed: the facets are already
/// cached and `insights report` can retry without re-extracting.
pub(crate) fn write_report<B: InferenceBackend>(
    ctx: &ExecutionContext,
    backend: &B,
    report_prompt: &str,
    facets: &[Facet],
    options: &ReportOptions<'_>,
) -> Result<()> {
    let palette = Palette::new(ctx.color);
    let prepared = ReportService::new(report_prompt).prepare(facets, options.project)?;
    println!();
    println!(
        "Generating report ({}K chars input)...",
        kilo(prepared.input_chars())
    );

    match prepared.generate(backend, ctx.output_dir(), Utc::now()) {
        Ok(artifact) => {
            println!();
            println!("Report: {}", palette.ok(&artifact.path.display().to_string()));
            if options.verbose {
                println!("  Latest: {} ({} bytes)", artifact.latest.display(), artifact.bytes);
            }
            if options.open {
                open_report(&artifact.path);
            }
            Ok(())
        }
        Err(Error::Inference(err)) => {
            eprintln!("{}", palette.error(&format!("Error generating report: {}", err)));
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
