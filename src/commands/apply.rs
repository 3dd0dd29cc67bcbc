use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::ApplyArgs;
use crate::commands::inventory::discover_agent_files;
use crate::model::{ApplyRunManifest, DocumentReport, DocumentResult, EditOutcome, RunTally};
use crate::section::{Locator, Template, edit_document, has_heading_line};
use crate::util::{now_utc_string, read_text, sha256_text, write_json_pretty, write_text};

pub fn run(args: ApplyArgs) -> Result<()> {
    let started_at = now_utc_string();
    let template_path = args.tree.resolved_template_path();
    let plugins_root = args.tree.plugins_root();

    // Template and locator errors are fatal and surface before any document is read.
    let template_text = read_text(&template_path)?;
    let template = Template::from_text(&template_text)?;
    let locator = Locator::new(&args.section.to_spec())?;
    info!(
        path = %template_path.display(),
        chars = template.char_count(),
        "loaded section template"
    );
    if !has_heading_line(template.lines(), locator.heading()) {
        warn!(
            heading = %locator.heading(),
            "template does not contain the section heading; later runs will not find it"
        );
    }

    let agent_files = discover_agent_files(&plugins_root, &args.tree.agents_dir)?;
    info!(count = agent_files.len(), root = %plugins_root.display(), "found agent files");

    let mut tally = RunTally::default();
    let mut documents = Vec::with_capacity(agent_files.len());

    for path in &agent_files {
        let result = update_document(path, &locator, &template, args.dry_run);
        match &result {
            DocumentResult::Updated { outcome } => {
                info!(path = %path.display(), dry_run = args.dry_run, "{}", outcome.message())
            }
            DocumentResult::Failed { reason } => {
                warn!(path = %path.display(), reason = %reason, "failed to update")
            }
        }

        tally.record(&result);
        documents.push(DocumentReport {
            path: path.display().to_string(),
            result,
        });
    }

    info!(
        updated = tally.updated(),
        replaced = tally.replaced,
        added = tally.added,
        failed = tally.failed,
        total = tally.total,
        "section update complete"
    );

    if let Some(report_path) = &args.report_path {
        let manifest = ApplyRunManifest {
            manifest_version: 1,
            started_at,
            completed_at: now_utc_string(),
            root: args.tree.root.display().to_string(),
            template_path: template_path.display().to_string(),
            template_sha256: sha256_text(&template_text),
            dry_run: args.dry_run,
            tally,
            documents,
        };
        write_json_pretty(report_path, &manifest)?;
        info!(path = %report_path.display(), "wrote run report");
    }

    Ok(())
}

/// Reads, edits and rewrites one document. Errors never escape; they become
/// a `Failed` result and the file is left as it was.
pub fn update_document(
    path: &Path,
    locator: &Locator,
    template: &Template,
    dry_run: bool,
) -> DocumentResult {
    match try_update_document(path, locator, template, dry_run) {
        Ok(outcome) => DocumentResult::Updated { outcome },
        Err(err) => DocumentResult::Failed {
            reason: format!("{err:#}"),
        },
    }
}

fn try_update_document(
    path: &Path,
    locator: &Locator,
    template: &Template,
    dry_run: bool,
) -> Result<EditOutcome> {
    let text = read_text(path)?;
    let (edited, outcome) = edit_document(locator, &text, template)?;

    if !dry_run && edited != text {
        write_text(path, &edited)?;
    }

    Ok(outcome)
}
