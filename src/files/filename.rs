//! Filesystem-safe names for per-activity log files.
//!
//! Activity names are built from event classes and can hold anything:
//! separators, unicode, path characters, hundreds of classes. They are
//! transliterated to ASCII, stripped of invalid characters, truncated and
//! suffixed with the node's unique name, so distinct activities never share
//! a file.

use deunicode::deunicode;

/// Windows reserved device names that cannot be used as filenames.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters that are invalid in filenames on common filesystems.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Used when nothing of the activity name survives sanitization.
const FALLBACK_NAME: &str = "activity";

/// Longest sanitized activity name kept before the unique suffix.
pub const MAX_STEM_LENGTH: usize = 100;

/// Maximum filename length for most filesystems.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Sanitizes an activity name for use in a filename.
///
/// 1. `::` between classes → hyphen
/// 2. Unicode → ASCII transliteration
/// 3. Whitespace and hyphen runs → single hyphen
/// 4. Invalid filesystem characters removed
/// 5. Leading/trailing dots, spaces, hyphens trimmed
/// 6. Windows reserved names prefixed with `_`
/// 7. Empty results → "activity" fallback
pub fn sanitize(input: &str) -> String {
    let ascii = deunicode(&input.replace("::", "-"));

    let mut result = String::with_capacity(ascii.len());
    let mut last_was_hyphen = false;
    for c in ascii.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_was_hyphen {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if INVALID_CHARS.contains(&c) {
            continue;
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            last_was_hyphen = false;
        }
    }

    let name = handle_reserved_name(trim_edges(&result));
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// File name for the log of one activity: the sanitized, truncated name
/// followed by the node's unique name, e.g. `check-register-Activity_3.txt`.
pub fn activity_log_filename(name: &str, unique_name: &str) -> String {
    let stem = truncate_to_length(&sanitize(name), MAX_STEM_LENGTH);
    let stem = trim_edges(&stem);
    let suffix = sanitize(unique_name);

    if stem.is_empty() {
        format!("{}.txt", suffix)
    } else {
        format!("{}-{}.txt", stem, suffix)
    }
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c| c == '.' || c == ' ' || c == '-')
}

/// Truncates a string to at most `max_len` characters.
fn truncate_to_length(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Prefixes Windows reserved names, with or without an extension.
fn handle_reserved_name(name: &str) -> String {
    let base_name = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };

    let upper = base_name.to_uppercase();
    if WINDOWS_RESERVED.iter().any(|reserved| upper == *reserved) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}
