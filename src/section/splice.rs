use crate::model::Placement;

use super::is_blank;

const SEPARATOR: [&str; 2] = ["", ""];

/// Builds `prefix + 2 blanks + template + 2 blanks + suffix`.
///
/// Blank lines touching the spliced range are dropped from both `prefix` and
/// `suffix`, so the separation is exactly two blank lines on each side no
/// matter how many were there before.
pub fn splice(lines: &[String], placement: Placement, template: &[String]) -> Vec<String> {
    let (head, tail) = match placement {
        Placement::Replace { start, end } => (start.min(lines.len()), end.min(lines.len())),
        Placement::Insert { at } => {
            let at = at.min(lines.len());
            (at, at)
        }
    };
    let tail = tail.max(head);

    let mut prefix_end = head;
    while prefix_end > 0 && is_blank(&lines[prefix_end - 1]) {
        prefix_end -= 1;
    }

    let mut suffix_start = tail;
    while suffix_start < lines.len() && is_blank(&lines[suffix_start]) {
        suffix_start += 1;
    }

    let mut out = Vec::with_capacity(
        prefix_end + template.len() + SEPARATOR.len() * 2 + (lines.len() - suffix_start),
    );
    out.extend_from_slice(&lines[..prefix_end]);
    out.extend(SEPARATOR.iter().map(|line| line.to_string()));
    out.extend_from_slice(template);
    out.extend(SEPARATOR.iter().map(|line| line.to_string()));
    out.extend_from_slice(&lines[suffix_start..]);
    out
}
