//! Content type inference for local files.

use std::path::Path;

/// Extensions the space treats differently from the system mime tables.
const OVERRIDES: &[(&str, &str)] = &[
    ("appcache", "text/cache-manifest"),
    ("tid", "text/plain"),
    ("woff", "application/x-woff"),
];

/// Content type for `path` by extension, if one is known.
pub fn guess(path: &Path) -> Option<String> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    if let Some(ext) = ext.as_deref() {
        if let Some((_, mime)) = OVERRIDES.iter().find(|(known, _)| *known == ext) {
            return Some((*mime).to_string());
        }
    }
    mime_guess::from_path(path).first().map(|m| m.essence_str().to_string())
}

/// Content type for serving `path`, falling back to an opaque byte stream.
pub fn guess_or_octet_stream(path: &Path) -> String {
    guess(path).unwrap_or_else(|| "application/octet-stream".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        assert_eq!(guess(Path::new("site.appcache")).as_deref(), Some("text/cache-manifest"));
        assert_eq!(guess(Path::new("assets/notes.tid")).as_deref(), Some("text/plain"));
        assert_eq!(guess(Path::new("font.WOFF")).as_deref(), Some("application/x-woff"));
    }

    #[test]
    fn test_system_types() {
        assert_eq!(guess(Path::new("index.html")).as_deref(), Some("text/html"));
        assert_eq!(guess(Path::new("logo.png")).as_deref(), Some("image/png"));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(guess(Path::new("README")).is_none());
        assert_eq!(guess_or_octet_stream(Path::new("README")), "application/octet-stream");
    }
}
