//! Safe filename generation utilities

/// Characters rejected by common filesystems.
const RESERVED: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Replace every reserved character in a title with an underscore.
///
/// All other characters pass through unchanged, Unicode included. The
/// mapping is deterministic and idempotent.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect()
}

/// Build the `{title}_{quality}.{extension}` output name for a download.
pub fn output_file_name(title: &str, quality_label: &str, extension: &str) -> String {
    format!("{}_{}.{}", sanitize_title(title), quality_label, extension)
}
