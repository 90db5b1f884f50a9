//! File extension to mime type lookup.

/// Mime type for an unknown extension.
pub const OCTET_STREAM: &str = "application/octet-stream";

const TYPES: &[(&str, &str)] = &[
    ("apng", "image/apng"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    ("css", "text/css"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("otf", "font/otf"),
    ("ttf", "font/ttf"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("aac", "audio/aac"),
    ("mp3", "audio/mpeg"),
    ("oga", "audio/ogg"),
    ("wav", "audio/wav"),
    ("weba", "audio/webm"),
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("ogg", "video/ogg"),
    ("ogv", "video/ogg"),
    ("webm", "video/webm"),
];

/// Mime type for `filename` by its extension, case-insensitively.
#[must_use]
pub fn from_filename(filename: &str) -> Option<&'static str> {
    let (_, extension) = filename.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, mime)| *mime)
}

/// Extension to give a generated file name of type `mime`.
#[must_use]
pub fn extension_for(mime: &str) -> Option<&'static str> {
    TYPES.iter().find(|(_, known)| *known == mime).map(|(extension, _)| *extension)
}

/// Whether `mime` matches `pattern`: `*`, an exact type, or a `type/*`
/// wildcard.
#[must_use]
pub fn matches(pattern: &str, mime: &str) -> bool {
    let pattern = pattern.trim();
    if pattern == "*" || pattern == "*/*" {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(group) => mime.split_once('/').is_some_and(|(kind, _)| kind.eq_ignore_ascii_case(group)),
        None => pattern.eq_ignore_ascii_case(mime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        assert_eq!(from_filename("photo.JPG"), Some("image/jpeg"));
        assert_eq!(from_filename("archive.tar.gz"), None);
        assert_eq!(from_filename("README"), None);
        assert_eq!(extension_for("image/jpeg"), Some("jpeg"));
    }

    #[test]
    fn test_patterns() {
        assert!(matches("image/*", "image/png"));
        assert!(!matches("image/*", "video/mp4"));
        assert!(matches("text/css", "text/css"));
        assert!(matches("*", "font/woff2"));
        assert!(!matches("image/png", "image/jpeg"));
    }
}
