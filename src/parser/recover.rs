//! Locate JSON-like objects embedded in free text.

/// Byte ranges of top-level balanced `{...}` substrings, in order of
/// appearance.
///
/// Braces inside double-quoted strings are ignored and backslash escapes are
/// honored. An opening brace that is never closed is skipped and scanning
/// resumes at the next one.
pub fn balanced_objects(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        match closing_brace(bytes, open) {
            Some(close) => {
                found.push(&text[open..=close]);
                start = close + 1;
            }
            None => start = open + 1
        }
        if start >= text.len() {
            break;
        }
    }
    found
}

fn closing_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
