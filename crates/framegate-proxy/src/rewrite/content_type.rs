//! Content-type classification for body rewriting.

/// Media-type fragments that mark a response as an ES module or script.
const SCRIPT_MEDIA_TYPES: [&str; 4] = [
    "javascript",
    "application/x-javascript",
    "text/jsx",
    "text/typescript",
];

/// How a response body is treated by the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `text/html`: URL rewriting plus script injection
    Html,
    /// JavaScript/TypeScript/JSX: module import rewriting
    Script,
    /// Anything else passes through byte-for-byte
    Other,
}

impl ContentKind {
    /// Classify a `Content-Type` header value; parameters after `;` are ignored.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return ContentKind::Other;
        };
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if media_type.contains("text/html") {
            ContentKind::Html
        } else if SCRIPT_MEDIA_TYPES.iter().any(|t| media_type.contains(t)) {
            ContentKind::Script
        } else {
            ContentKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Script => "module",
            ContentKind::Other => "passthrough",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_with_charset() {
        assert_eq!(
            ContentKind::from_content_type(Some("text/html; charset=utf-8")),
            ContentKind::Html
        );
    }

    #[test]
    fn test_script_types() {
        for ct in [
            "application/javascript",
            "text/javascript; charset=utf-8",
            "application/x-javascript",
            "text/jsx",
            "text/typescript",
            "Application/JavaScript",
        ] {
            assert_eq!(
                ContentKind::from_content_type(Some(ct)),
                ContentKind::Script,
                "{ct}"
            );
        }
    }

    #[test]
    fn test_parameters_are_ignored() {
        // A parameter mentioning html must not flip the classification.
        assert_eq!(
            ContentKind::from_content_type(Some("application/json; profile=text/html")),
            ContentKind::Other
        );
    }

    #[test]
    fn test_other_types_pass_through() {
        assert_eq!(
            ContentKind::from_content_type(Some("image/png")),
            ContentKind::Other
        );
        assert_eq!(
            ContentKind::from_content_type(Some("text/css")),
            ContentKind::Other
        );
        assert_eq!(ContentKind::from_content_type(None), ContentKind::Other);
    }
}
