pub const DEFAULT_OUTPUT_PREFIX: &str = "converted_";

const XML_DECLARATION_OPEN: &[u8] = b"<?xml";
const XML_DECLARATION_CLOSE: &[u8] = b"?>";
const ROOT_MARKER: &[u8] = b"<TrainingCenterDatabase";

/// Cheap check that `content` looks like a TCX document: an XML declaration
/// closed on its own line, and a `TrainingCenterDatabase` start tag.
pub fn looks_like_tcx(content: &[u8]) -> bool {
    has_xml_declaration(content) && contains(content, ROOT_MARKER)
}

fn has_xml_declaration(content: &[u8]) -> bool {
    let mut rest = content;
    while let Some(start) = find(rest, XML_DECLARATION_OPEN) {
        let after = &rest[start + XML_DECLARATION_OPEN.len()..];
        let line_end = after
            .iter()
            .position(|byte| *byte == b'\n')
            .unwrap_or(after.len());
        if contains(&after[..line_end], XML_DECLARATION_CLOSE) {
            return true;
        }
        rest = after;
    }
    false
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Output name for a converted file: `prefix` goes in front of the last path
/// component, so `runs/a.tcx` becomes `runs/converted_a.tcx`.
pub fn converted_file_name(source_name: &str, prefix: &str) -> String {
    match source_name.rfind(['/', '\\']) {
        Some(index) => {
            let (dir, file) = source_name.split_at(index + 1);
            format!("{dir}{prefix}{file}")
        }
        None => format!("{prefix}{source_name}"),
    }
}
