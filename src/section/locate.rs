use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::model::{Placement, SectionSpec};

use super::{fenced_code_mask, has_heading_line, is_blank, mentions_keyword};

pub struct Locator {
    heading: String,
    keyword: String,
    anchors: Vec<String>,
    target_level: usize,
    heading_pattern: Regex,
}

impl Locator {
    pub fn new(spec: &SectionSpec) -> Result<Self> {
        let heading_pattern =
            Regex::new(r"^(#{1,6})\s").context("failed to compile heading regex")?;

        let heading = spec.heading.trim().to_string();
        let target_level = heading_pattern
            .captures(&heading)
            .and_then(|captures| captures.get(1))
            .map(|hashes| hashes.as_str().len())
            .with_context(|| format!("section heading is not a markdown heading: {heading}"))?;

        let anchors: Vec<String> = spec
            .anchors
            .iter()
            .map(|anchor| anchor.trim().to_string())
            .filter(|anchor| !anchor.is_empty())
            .collect();
        if let Some(anchor) = anchors
            .iter()
            .find(|anchor| heading.starts_with(anchor.as_str()))
        {
            bail!("anchor '{anchor}' would match the section heading: {heading}");
        }

        Ok(Self {
            heading,
            keyword: spec.keyword.clone(),
            anchors,
            target_level,
            heading_pattern,
        })
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Deliberately loose: a keyword mention in prose counts as present.
    pub fn already_has_section(&self, text: &str, lines: &[String]) -> bool {
        has_heading_line(lines, &self.heading) || mentions_keyword(text, &self.keyword)
    }

    pub fn locate(&self, text: &str, lines: &[String]) -> Result<Placement> {
        if !self.already_has_section(text, lines) {
            return Ok(Placement::Insert {
                at: self.insertion_point(lines),
            });
        }

        let (start, end) = self
            .section_bounds(lines)
            .with_context(|| format!("could not find section bounds for '{}'", self.heading))?;
        Ok(Placement::Replace { start, end })
    }

    /// Range of the existing section, widened over the blank lines above the
    /// heading and narrowed to exclude the blank lines before the next heading.
    pub fn section_bounds(&self, lines: &[String]) -> Option<(usize, usize)> {
        let fenced = fenced_code_mask(lines);

        let marker =
            (0..lines.len()).find(|&i| !fenced[i] && lines[i].trim() == self.heading)?;

        let mut end = (marker + 1..lines.len())
            .find(|&i| {
                !fenced[i]
                    && self
                        .heading_level(&lines[i])
                        .is_some_and(|level| level <= self.target_level)
            })
            .unwrap_or(lines.len());
        while end > marker && is_blank(&lines[end - 1]) {
            end -= 1;
        }

        let mut start = marker;
        while start > 0 && is_blank(&lines[start - 1]) {
            start -= 1;
        }

        Some((start, end))
    }

    /// Line before which a missing section goes: the earliest anchor by
    /// position, else end of document, backed up over blank lines.
    pub fn insertion_point(&self, lines: &[String]) -> usize {
        let fenced = fenced_code_mask(lines);

        let mut at = (0..lines.len())
            .find(|&i| {
                let trimmed = lines[i].trim();
                !fenced[i]
                    && self
                        .anchors
                        .iter()
                        .any(|anchor| trimmed.starts_with(anchor.as_str()))
            })
            .unwrap_or(lines.len());

        while at > 0 && is_blank(&lines[at - 1]) {
            at -= 1;
        }
        at
    }

    fn heading_level(&self, line: &str) -> Option<usize> {
        self.heading_pattern
            .captures(line.trim())
            .and_then(|captures| captures.get(1))
            .map(|hashes| hashes.as_str().len())
    }
}
