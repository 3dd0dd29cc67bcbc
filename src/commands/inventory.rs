use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::InventoryArgs;
use crate::model::{AgentInventoryManifest, InventoryEntry, Placement, PlannedAction};
use crate::section::{Document, Locator};
use crate::util::{now_utc_string, read_text, sha256_text, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let plugins_root = args.tree.plugins_root();
    let template_path = args.tree.resolved_template_path();
    let template_text = read_text(&template_path)?;
    let locator = Locator::new(&args.section.to_spec())?;

    let manifest = build_manifest(
        &plugins_root,
        &args.tree.agents_dir,
        &locator,
        &template_text,
    )?;

    for entry in &manifest.documents {
        match entry.planned_action {
            PlannedAction::Unresolved | PlannedAction::ReadFailed => warn!(
                path = %entry.path,
                action = ?entry.planned_action,
                reason = %entry.reason.as_deref().unwrap_or_default(),
                "cannot plan document"
            ),
            _ => info!(
                path = %entry.path,
                action = ?entry.planned_action,
                lines = entry.line_count,
                "planned"
            ),
        }
    }

    if let Some(manifest_path) = &args.manifest_path {
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote inventory manifest");
    }
    info!(document_count = manifest.document_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(
    plugins_root: &Path,
    agents_dir: &str,
    locator: &Locator,
    template_text: &str,
) -> Result<AgentInventoryManifest> {
    let paths = discover_agent_files(plugins_root, agents_dir)?;

    let documents: Vec<InventoryEntry> = paths
        .iter()
        .map(|path| plan_document(path, locator))
        .collect();

    Ok(AgentInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        plugins_directory: plugins_root.display().to_string(),
        template_sha256: sha256_text(template_text),
        document_count: documents.len(),
        documents,
    })
}

/// Unreadable or unresolvable documents become entries, never errors.
fn plan_document(path: &Path, locator: &Locator) -> InventoryEntry {
    let mut entry = InventoryEntry {
        path: path.display().to_string(),
        sha256: None,
        line_count: 0,
        planned_action: PlannedAction::ReadFailed,
        range_start: None,
        range_end: None,
        reason: None,
    };

    let text = match read_text(path) {
        Ok(text) => text,
        Err(err) => {
            entry.reason = Some(format!("{err:#}"));
            return entry;
        }
    };
    let document = Document::parse(&text);
    entry.sha256 = Some(sha256_text(&text));
    entry.line_count = document.lines().len();

    match locator.locate(&text, document.lines()) {
        Ok(Placement::Replace { start, end }) => {
            entry.planned_action = PlannedAction::Replace;
            entry.range_start = Some(start);
            entry.range_end = Some(end);
        }
        Ok(Placement::Insert { at }) => {
            entry.planned_action = PlannedAction::Insert;
            entry.range_start = Some(at);
            entry.range_end = Some(at);
        }
        Err(err) => {
            entry.planned_action = PlannedAction::Unresolved;
            entry.reason = Some(format!("{err:#}"));
        }
    }

    entry
}

/// Finds `<plugins_root>/*/<agents_dir>/*.md`, sorted by path.
pub fn discover_agent_files(plugins_root: &Path, agents_dir: &str) -> Result<Vec<PathBuf>> {
    let mut agent_files = Vec::new();

    let plugins = fs::read_dir(plugins_root)
        .with_context(|| format!("failed to read {}", plugins_root.display()))?;

    for plugin in plugins {
        let plugin =
            plugin.with_context(|| format!("failed to read entry in {}", plugins_root.display()))?;
        let agents_path = plugin.path().join(agents_dir);
        if !agents_path.is_dir() {
            continue;
        }

        let entries = fs::read_dir(&agents_path)
            .with_context(|| format!("failed to read {}", agents_path.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to read entry in {}", agents_path.display()))?;
            let path = entry.path();

            // Follows symlinks, like the plugin directory check above.
            if !path.is_file() {
                continue;
            }

            let is_markdown = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "md")
                .unwrap_or(false);

            if is_markdown {
                agent_files.push(path);
            }
        }
    }

    agent_files.sort();
    Ok(agent_files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{build_manifest, discover_agent_files};
    use crate::model::{DEFAULT_ANCHORS, PlannedAction, SectionSpec};
    use crate::section::Locator;

    fn setup_plugins() -> TempDir {
        let dir = TempDir::new().unwrap();
        let plugins = dir.path().join("plugins");

        fs::create_dir_all(plugins.join("beta").join("agents")).unwrap();
        fs::create_dir_all(plugins.join("alpha").join("agents").join("nested")).unwrap();
        fs::create_dir_all(plugins.join("gamma").join("commands")).unwrap();

        fs::write(plugins.join("beta/agents/reviewer.md"), "# Reviewer\n").unwrap();
        fs::write(
            plugins.join("alpha/agents/architect.md"),
            "# Architect\n\n## Serena MCP Integration\nold\n",
        )
        .unwrap();
        fs::write(plugins.join("alpha/agents/notes.txt"), "not markdown").unwrap();
        fs::write(plugins.join("alpha/agents/nested/deep.md"), "# Deep\n").unwrap();
        fs::write(plugins.join("gamma/commands/run.md"), "# Command\n").unwrap();
        fs::write(plugins.join("README.md"), "# Plugins\n").unwrap();

        dir
    }

    fn locator() -> Locator {
        Locator::new(&SectionSpec {
            heading: "## Serena MCP Integration".to_string(),
            keyword: "serena".to_string(),
            anchors: DEFAULT_ANCHORS.iter().map(|anchor| anchor.to_string()).collect(),
        })
        .unwrap()
    }

    #[test]
    fn discovers_only_two_level_agent_markdown_sorted() {
        let dir = setup_plugins();
        let plugins = dir.path().join("plugins");

        let files = discover_agent_files(&plugins, "agents").unwrap();
        let relative: Vec<String> = files
            .iter()
            .map(|path| {
                path.strip_prefix(&plugins)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(relative, vec!["alpha/agents/architect.md", "beta/agents/reviewer.md"]);
    }

    #[test]
    fn missing_plugins_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover_agent_files(&dir.path().join("plugins"), "agents").is_err());
    }

    #[test]
    fn manifest_records_planned_actions_without_writing() {
        let dir = setup_plugins();
        let plugins = dir.path().join("plugins");
        let before = fs::read_to_string(plugins.join("beta/agents/reviewer.md")).unwrap();

        let manifest =
            build_manifest(&plugins, "agents", &locator(), "## Serena MCP Integration\n").unwrap();

        assert_eq!(manifest.document_count, 2);
        assert!(matches!(manifest.documents[0].planned_action, PlannedAction::Replace));
        assert_eq!(manifest.documents[0].range_start, Some(1));
        assert!(matches!(manifest.documents[1].planned_action, PlannedAction::Insert));
        assert_eq!(manifest.documents[1].sha256.as_ref().map(String::len), Some(64));
        assert_eq!(
            fs::read_to_string(plugins.join("beta/agents/reviewer.md")).unwrap(),
            before
        );
    }

    #[test]
    fn unreadable_document_is_recorded_and_inventory_continues() {
        let dir = setup_plugins();
        let plugins = dir.path().join("plugins");
        fs::write(plugins.join("beta/agents/latin1.md"), b"# Caf\xe9\n").unwrap();

        let manifest =
            build_manifest(&plugins, "agents", &locator(), "## Serena MCP Integration\n").unwrap();

        assert_eq!(manifest.document_count, 3);
        let latin1 = &manifest.documents[1];
        assert!(latin1.path.ends_with("latin1.md"));
        assert!(matches!(latin1.planned_action, PlannedAction::ReadFailed));
        assert!(latin1.sha256.is_none());
        assert!(latin1.reason.as_deref().unwrap().contains("failed to read"));
        assert!(matches!(manifest.documents[2].planned_action, PlannedAction::Insert));
    }

    #[cfg(unix)]
    #[test]
    fn discovers_symlinked_agent_files() {
        let dir = setup_plugins();
        let plugins = dir.path().join("plugins");
        let shared = dir.path().join("shared-agent.md");
        fs::write(&shared, "# Shared\n").unwrap();
        std::os::unix::fs::symlink(&shared, plugins.join("beta/agents/shared.md")).unwrap();

        let files = discover_agent_files(&plugins, "agents").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["architect.md", "reviewer.md", "shared.md"]);
    }
}
