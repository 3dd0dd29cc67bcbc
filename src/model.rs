use serde::Serialize;

pub const DEFAULT_ANCHORS: [&str; 5] = [
    "## Example Interactions",
    "## Key Distinctions",
    "## Output Examples",
    "## Workflow Position",
    "## See Also",
];

/// What to look for in each document and where to put it when it is missing.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub heading: String,
    pub keyword: String,
    pub anchors: Vec<String>,
}

/// Where the template goes, in line indices of the original document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Half-open range `start..end` holding the existing section.
    Replace { start: usize, end: usize },
    Insert { at: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Replaced,
    Added,
}

impl EditOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Replaced => "Replaced existing section",
            Self::Added => "Added new section",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentResult {
    Updated { outcome: EditOutcome },
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTally {
    pub replaced: usize,
    pub added: usize,
    pub failed: usize,
    pub total: usize,
}

impl RunTally {
    pub fn record(&mut self, result: &DocumentResult) {
        self.total += 1;
        match result {
            DocumentResult::Updated {
                outcome: EditOutcome::Replaced,
            } => self.replaced += 1,
            DocumentResult::Updated {
                outcome: EditOutcome::Added,
            } => self.added += 1,
            DocumentResult::Failed { .. } => self.failed += 1,
        }
    }

    pub fn updated(&self) -> usize {
        self.replaced + self.added
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub path: String,
    #[serde(flatten)]
    pub result: DocumentResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyRunManifest {
    pub manifest_version: u32,
    pub started_at: String,
    pub completed_at: String,
    pub root: String,
    pub template_path: String,
    pub template_sha256: String,
    pub dry_run: bool,
    pub tally: RunTally,
    pub documents: Vec<DocumentReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedAction {
    Replace,
    Insert,
    Unresolved,
    ReadFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntry {
    pub path: String,
    pub sha256: Option<String>,
    pub line_count: usize,
    pub planned_action: PlannedAction,
    pub range_start: Option<usize>,
    pub range_end: Option<usize>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub plugins_directory: String,
    pub template_sha256: String,
    pub document_count: usize,
    pub documents: Vec<InventoryEntry>,
}
