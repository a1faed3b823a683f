//! Local filename derivation for downloaded Drive files.
//!
//! Drive announces the original name in `Content-Disposition`; when it does
//! not, the file ID is used instead.

/// Longest file name most local filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Pick a safe local name from a `Content-Disposition` value, falling back to `file_id`.
pub fn derive_filename(content_disposition: Option<&str>, file_id: &str) -> String {
    let candidate = content_disposition
        .and_then(parse_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty() && name != "." && name != "..");

    match candidate {
        Some(name) => name,
        None => {
            let fallback = sanitize_filename(file_id);
            if fallback.is_empty() {
                "download.bin".to_string()
            } else {
                fallback
            }
        }
    }
}

/// Read `filename*` (RFC 5987) or `filename` from a `Content-Disposition` header.
///
/// `filename*` wins when both are present.
pub fn parse_content_disposition(header_value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in header_value.split(';') {
        let Some((key, value)) = param.trim().split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if key == "filename*" {
            let encoded = value
                .split_once("''")
                .map(|(_charset, rest)| rest)
                .unwrap_or(value);
            let decoded = percent_decode(encoded.trim_matches('"'));
            if !decoded.is_empty() {
                return Some(decoded);
            }
        } else if key == "filename" {
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .map(|v| v.replace("\\\"", "\"").replace("\\\\", "\\"))
                .unwrap_or_else(|| value.to_string());
            if !unquoted.is_empty() {
                plain = Some(unquoted);
            }
        }
    }

    plain
}

/// Strip path separators and control characters, trim dots and spaces, cap length.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == ' ' || c == '.');

    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
