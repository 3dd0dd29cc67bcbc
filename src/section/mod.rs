//! Line-oriented locate-and-splice of one named markdown section.

use anyhow::{Result, bail};

use crate::model::{EditOutcome, Placement};

mod blocks;
mod locate;
mod splice;

use blocks::fenced_code_mask;
pub use locate::Locator;
pub use splice::splice;

/// A markdown file as a sequence of lines. A trailing newline yields a final
/// empty line, so `render(parse(text)) == text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(ToOwned::to_owned).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// The block inserted for the target section. Blank lines at either end of
/// the source text are dropped; everything in between is kept verbatim.
#[derive(Debug, Clone)]
pub struct Template {
    lines: Vec<String>,
}

impl Template {
    pub fn from_text(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.split('\n').collect();

        let Some(first) = lines.iter().position(|line| !is_blank(line)) else {
            bail!("template has no content");
        };
        let last = lines
            .iter()
            .rposition(|line| !is_blank(line))
            .unwrap_or(first);

        Ok(Self {
            lines: lines[first..=last].iter().map(|line| line.to_string()).collect(),
        })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).sum::<usize>()
            + self.lines.len().saturating_sub(1)
    }
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// True when some line outside fenced code, trimmed, is exactly `heading`.
pub fn has_heading_line(lines: &[String], heading: &str) -> bool {
    let fenced = fenced_code_mask(lines);
    lines
        .iter()
        .zip(fenced)
        .any(|(line, in_fence)| !in_fence && line.trim() == heading)
}

/// Case-insensitive substring match anywhere in the text, prose included.
/// An empty keyword never matches.
pub fn mentions_keyword(text: &str, keyword: &str) -> bool {
    if keyword.trim().is_empty() {
        return false;
    }
    text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Runs locate + splice over one document's text.
pub fn edit_document(
    locator: &Locator,
    text: &str,
    template: &Template,
) -> Result<(String, EditOutcome)> {
    let document = Document::parse(text);
    let placement = locator.locate(text, document.lines())?;

    let outcome = match placement {
        Placement::Replace { .. } => EditOutcome::Replaced,
        Placement::Insert { .. } => EditOutcome::Added,
    };

    let edited = Document::from_lines(splice(document.lines(), placement, template.lines()));
    Ok((edited.render(), outcome))
}
