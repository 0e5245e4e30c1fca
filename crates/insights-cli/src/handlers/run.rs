use anyhow::Result;
use insights_engine::make_batches;
use insights_index::FacetFilter;
use insights_providers::DiscoveryOptions;
use insights_runtime::{ExtractService, RetryPolicy, load_pending, scan_sessions};
use std::collections::HashSet;

use super::report::{ReportOptions, write_report};
use crate::args::FilterArgs;
use crate::context::ExecutionContext;
use crate::views::{Palette, PlanView, kilo, print_extract_progress, print_extract_summary};

pub struct RunOptions {
    pub filter: FilterArgs,
    pub limit: Option<usize>,
    pub force: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub no_open: bool,
}

/// Full pipeline: discover, extract facets for stale sessions, write the report
pub fn handle(ctx: &ExecutionContext, options: RunOptions) -> Result<()> {
    let palette = Palette::new(ctx.color);
    let config = ctx.config()?;
    let prompts = ctx.prompts(&config)?;
    let backend = if options.dry_run {
        None
    } else {
        Some(super::inference_backend(&config, ctx.output_dir())?)
    };
    let store = ctx.store();
    let report_options = ReportOptions {
        project: options.filter.project.as_deref(),
        verbose: options.verbose,
        open: !options.no_open,
    };
    let facet_filter = FacetFilter {
        project: options.filter.project.clone(),
        since_days: options.filter.since,
    };

    // Phase 1
    println!("{}", palette.heading("Phase 1: Discovering sessions..."));
    let discovery = DiscoveryOptions {
        project_filter: options.filter.project.clone(),
        since_days: options.filter.since,
        limit: options.limit,
    };
    let scan = scan_sessions(ctx.sessions_dir(), &store, &discovery, options.force)?;
    let projects: HashSet<&str> = scan
        .discovered
        .iter()
        .map(|s| s.project.as_str())
        .collect();
    println!(
        "  Found {} sessions across {} projects",
        scan.discovered.len(),
        projects.len()
    );

    if scan.discovered.is_empty() {
        println!("No sessions to process.");
        return Ok(());
    }
    println!(
        "  {} already cached, {} to process",
        scan.cached(),
        scan.stale.len()
    );

    if scan.stale.is_empty() {
        let Some(backend) = &backend else {
            println!();
            println!("All sessions cached. Nothing to extract.");
            return Ok(());
        };
        println!();
        println!("All sessions cached. Regenerating report...");
        let facets = store.load_all(&facet_filter)?;
        return write_report(ctx, backend, &prompts.report, &facets, &report_options);
    }

    println!();
    println!("Extracting transcripts...");
    let load = load_pending(scan.stale);
    let total_chars: usize = load.pending.iter().map(|p| p.char_count()).sum();
    println!(
        "  Extracted {} transcripts ({}K chars total)",
        load.pending.len(),
        kilo(total_chars)
    );
    if load.skipped > 0 {
        println!("  Skipped {} empty sessions", load.skipped);
    }
    if load.pending.is_empty() {
        println!("No transcripts to process.");
        return Ok(());
    }

    // Phase 2
    let sessions = load.pending.len();
    let batches = make_batches(load.pending, &config.batch);
    println!();
    println!(
        "{}",
        palette.heading(&format!(
            "Phase 2: Processing {} sessions in {} batches",
            sessions,
            batches.len()
        ))
    );

    let Some(backend) = backend else {
        println!();
        print!(
            "{}",
            PlanView {
                batches: &batches,
                verbose: options.verbose,
            }
        );
        return Ok(());
    };

    let retry = RetryPolicy::from(&config.retry);
    let service = ExtractService::new(&backend, &store, &retry, &prompts.facet);
    let summary = service.run(&batches, |event| {
        print_extract_progress(&event, palette, options.verbose)
    })?;
    print_extract_summary(&summary, palette);

    // Phase 3
    println!();
    println!("{}", palette.heading("Phase 3: Generating report..."));
    let facets = store.load_all(&facet_filter)?;
    println!("  Total facets (cached + new): {}", facets.len());
    if facets.is_empty() {
        println!("No facets to report on.");
        return Ok(());
    }
    write_report(ctx, &backend, &prompts.report, &facets, &report_options)?;

    println!();
    println!("{}", palette.ok("Done!"));
    Ok(())
}
