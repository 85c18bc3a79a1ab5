//! Parsing configuration carried by every document

/// Options that drive tree construction and name canonicalization.
///
/// The three presets mirror the usual parsing modes; fields can be tweaked
/// afterwards with struct update syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentConfig {
    /// Keep tag and attribute names as typed; otherwise they are lower-cased
    pub case_sensitive: bool,
    /// Drop whitespace-only text between tags
    pub ignore_whitespace_between_tags: bool,
    /// Do not create comment nodes
    pub ignore_comments: bool,
    /// Treat the HTML void elements as void
    pub enable_void_tags: bool,
    /// Render void elements (or, without void tags, every empty element) as `<x/>`
    pub self_close_void_tags: bool,
    /// Apply the implicit closing rules of HTML
    pub implied_end_tags: bool,
    /// Run the foster-parenting fixer over tables at end of input
    pub use_foster_rules: bool,
    /// Treat end tags that would break out of a table or list as orphans
    pub unclosed_tag_as_orphan_check: bool,
    /// Keep diagnostics on the document
    pub collect_errors: bool,
    /// Internet Explorer version that conditional comments are evaluated against
    pub cond_comment_ie_version: f32,
}

impl DocumentConfig {
    /// Lenient HTML parsing: case-insensitive names, void tags and implied end tags
    pub fn html() -> Self {
        Self {
            case_sensitive: false,
            ignore_whitespace_between_tags: false,
            ignore_comments: false,
            enable_void_tags: true,
            self_close_void_tags: false,
            implied_end_tags: true,
            use_foster_rules: true,
            unclosed_tag_as_orphan_check: false,
            collect_errors: false,
            cond_comment_ie_version: 10.0,
        }
    }

    /// XHTML: case-sensitive, void tags are self closed, no implied end tags
    pub fn xhtml() -> Self {
        Self {
            case_sensitive: true,
            self_close_void_tags: true,
            implied_end_tags: false,
            use_foster_rules: false,
            ..Self::html()
        }
    }

    /// XML: case-sensitive, no void tags, whitespace between tags is dropped
    pub fn xml() -> Self {
        Self {
            case_sensitive: true,
            ignore_whitespace_between_tags: true,
            enable_void_tags: false,
            self_close_void_tags: false,
            implied_end_tags: false,
            use_foster_rules: false,
            ..Self::html()
        }
    }

    /// Canonical form of a tag or attribute name under this configuration
    pub fn canonical_name<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
        if self.case_sensitive || !name.bytes().any(|b| b.is_ascii_uppercase()) {
            std::borrow::Cow::Borrowed(name)
        } else {
            std::borrow::Cow::Owned(name.to_ascii_lowercase())
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self::html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        let html = DocumentConfig::html();
        assert_eq!(html.canonical_name("DIV"), "div");
        assert_eq!(html.canonical_name("span"), "span");

        let xml = DocumentConfig::xml();
        assert_eq!(xml.canonical_name("DataSet"), "DataSet");
    }

    #[test]
    fn test_presets() {
        assert!(DocumentConfig::default().implied_end_tags);
        assert!(!DocumentConfig::xhtml().implied_end_tags);
        assert!(DocumentConfig::xhtml().self_close_void_tags);
        assert!(!DocumentConfig::xml().enable_void_tags);
    }
}
