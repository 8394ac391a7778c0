//! Namespace definitions and element vocabularies.
//!
//! Tags are handled in Clark notation (`{namespace-uri}local-name`), which is
//! how [`crate::reader::OaiReader`] reports every payload element.

/// OAI-PMH 2.0 protocol namespace URI.
pub const OAI_PMH: &str = "http://www.openarchives.org/OAI/2.0/";

/// OAI Dublin Core container namespace URI (`<oai_dc:dc>`).
pub const OAI_DC: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

/// Dublin Core Metadata Element Set 1.1 namespace URI.
pub const DC: &str = "http://purl.org/dc/elements/1.1/";

/// UNT Libraries metadata namespace URI.
pub const UNTL: &str = "http://digital2.library.unt.edu/untl/";

/// The 15 canonical Dublin Core elements, in display order.
pub const DC_ELEMENTS: [&str; 15] = [
    "title",
    "creator",
    "contributor",
    "publisher",
    "date",
    "language",
    "description",
    "subject",
    "coverage",
    "source",
    "relation",
    "rights",
    "type",
    "format",
    "identifier",
];

/// UNTL element vocabulary.
pub const UNTL_ELEMENTS: [&str; 22] = [
    "title",
    "creator",
    "contributor",
    "publisher",
    "date",
    "language",
    "description",
    "subject",
    "primarySource",
    "coverage",
    "source",
    "citation",
    "relation",
    "collection",
    "institution",
    "rights",
    "resourceType",
    "format",
    "identifier",
    "degree",
    "note",
    "meta",
];

/// UNTL fields whose display value lives in a nested `<name>` child.
pub const NAME_FIELDS: [&str; 3] = ["creator", "contributor", "publisher"];

/// Local name of the nested child holding a name field's value.
pub const NAME_CHILD: &str = "name";

/// "Who, what, where, when": creator, title, identifier, date.
pub const WWWW_ELEMENTS: [&str; 4] = ["creator", "title", "identifier", "date"];

/// Build a Clark-notation tag from a namespace URI and a local name.
///
/// ```
/// use repoinv::namespaces::{qualified, DC};
///
/// assert_eq!(qualified(DC, "title"), "{http://purl.org/dc/elements/1.1/}title");
/// ```
#[must_use]
pub fn qualified(namespace: &str, local: &str) -> String {
    format!("{{{namespace}}}{local}")
}

/// Local part of a Clark-notation tag; tags without a namespace are returned as-is.
#[must_use]
pub fn local_name(tag: &str) -> &str {
    match tag.rfind('}') {
        Some(idx) if tag.starts_with('{') => &tag[idx + 1..],
        _ => tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_strips_namespace() {
        assert_eq!(local_name(&qualified(UNTL, "meta")), "meta");
        assert_eq!(local_name("record"), "record");
    }

    #[test]
    fn test_wwww_elements_are_canonical() {
        for element in WWWW_ELEMENTS {
            assert!(DC_ELEMENTS.contains(&element));
        }
    }
}
