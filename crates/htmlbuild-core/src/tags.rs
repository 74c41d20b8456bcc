//! Opening tag extraction.
//!
//! A deliberately small matcher: element name, whitespace, attributes, `>`.
//! Only double-quoted attribute values are recognized.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Matches ` name="value"` pairs inside a tag's attribute region.
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s([A-Za-z0-9_\-:]+)="([^"]+)""#).unwrap());

/// Opening `<script ...>` tags, the element the built-in handlers read.
static SCRIPT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| tag_regex("script").unwrap());

/// An HTML opening tag with its attributes.
///
/// # Example
///
/// ```
/// use htmlbuild_core::extract_tags;
///
/// let tags = extract_tags("script", r#"<script src="app.js" data-main="main"></script>"#);
/// assert_eq!(tags.len(), 1);
/// assert_eq!(tags[0].get("src"), Some("app.js"));
/// assert_eq!(tags[0].get("data-main"), Some("main"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Raw matched text of the opening tag.
    pub html: String,
    /// Attribute values keyed by lowercased attribute name.
    pub attrs: HashMap<String, String>,
}

impl Tag {
    /// Get an attribute value by (case-insensitive) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check whether the tag carries an attribute.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Extract every opening `element` tag from `html`, in document order.
///
/// Element names match case-insensitively. Tags without any attributes
/// (e.g. a bare `<script>`) are not returned.
#[must_use]
pub fn extract_tags(element: &str, html: &str) -> Vec<Tag> {
    let tag_re = if element.eq_ignore_ascii_case("script") {
        Cow::Borrowed(&*SCRIPT_TAG_RE)
    } else {
        match tag_regex(element) {
            Ok(re) => Cow::Owned(re),
            Err(_) => return Vec::new(),
        }
    };

    tag_re
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let region = caps.get(1)?.as_str();
            let attrs = ATTR_RE
                .captures_iter(region)
                .map(|attr| (attr[1].to_ascii_lowercase(), attr[2].to_owned()))
                .collect();

            Some(Tag {
                html: whole.as_str().to_owned(),
                attrs,
            })
        })
        .collect()
}

fn tag_regex(element: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)<{}(\s[^>]*)>", regex::escape(element)))
}
