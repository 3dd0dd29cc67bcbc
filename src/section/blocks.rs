use pulldown_cmark::{CodeBlockKind, Event, Parser as MdParser, Tag};

/// `true` for every line covered by a fenced code block, fence lines included.
///
/// Indented code blocks are left unmasked so their lines still match on
/// trimmed text.
pub fn fenced_code_mask(lines: &[String]) -> Vec<bool> {
    let text = lines.join("\n");

    let mut line_starts = Vec::with_capacity(lines.len());
    let mut offset = 0;
    for line in lines {
        line_starts.push(offset);
        offset += line.len() + 1;
    }

    let mut mask = vec![false; lines.len()];
    for (event, range) in MdParser::new(&text).into_offset_iter() {
        let Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) = event else {
            continue;
        };

        for (i, line) in lines.iter().enumerate() {
            let start = line_starts[i];
            let end = start + line.len();
            if start < range.end && end >= range.start {
                mask[i] = true;
            }
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::fenced_code_mask;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(ToOwned::to_owned).collect()
    }

    #[test]
    fn masks_backtick_and_tilde_fences() {
        let mask = fenced_code_mask(&lines("a\n```sh\n# x\n```\nb\n~~~\n## y\n~~~\nc"));
        assert_eq!(
            mask,
            vec![false, true, true, true, false, true, true, true, false]
        );
    }

    #[test]
    fn indented_backticks_do_not_open_a_fence() {
        let mask = fenced_code_mask(&lines("# Agent\n\n    ```\n\n## See Also\n- a"));
        assert!(!mask[4]);
        assert!(!mask[5]);
    }

    #[test]
    fn unclosed_fence_runs_to_end_of_document() {
        let mask = fenced_code_mask(&lines("a\n\n```\n## x\n## y"));
        assert_eq!(mask, vec![false, false, true, true, true]);
    }
}
