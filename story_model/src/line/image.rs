//! Image directives carried in engine tags.

/// Tag prefix marking an inline illustration.
pub const IMAGE_TAG_PREFIX: &str = "image:";

/// Extension given to image names that lack one.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Find the first `image:` tag and return its normalized file name.
///
/// Returns an empty string when no tag names an image.
pub fn extract_image<S: AsRef<str>>(tags: &[S]) -> String {
    extract_image_with_extension(tags, DEFAULT_IMAGE_EXTENSION)
}

/// Like [`extract_image`], appending `.{extension}` when the name lacks it.
pub fn extract_image_with_extension<S: AsRef<str>>(tags: &[S], extension: &str) -> String {
    tags.iter()
        .filter_map(|tag| tag.as_ref().trim_start().strip_prefix(IMAGE_TAG_PREFIX))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(|name| normalize_image_name(name, extension))
        .unwrap_or_default()
}

fn normalize_image_name(name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}
