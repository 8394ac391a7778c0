//! Schema-aware extraction of field values from records.
//!
//! Two payload schemas are supported, each behind the [`FieldExtractor`] trait:
//! - [`FlatExtractor`] — unqualified Dublin Core (`oai_dc`): every element is
//!   a flat text element and carries no qualifier
//! - [`QualifiedExtractor`] — UNTL: elements carry a `qualifier` attribute,
//!   and the name fields (creator, contributor, publisher) hold their display
//!   value in a nested `<untl:name>` child
//!
//! The schema is chosen once, through [`MetadataSchema::extractor`], and the
//! rest of the crate only talks to the trait.
//!
//! # Examples
//!
//! ```
//! use repoinv::extract::MetadataSchema;
//! use repoinv::namespaces::{qualified, UNTL};
//! use repoinv::record::{MetadataElement, Record};
//!
//! let record = Record::builder()
//!     .identifier("id-1")
//!     .element(
//!         MetadataElement::new(qualified(UNTL, "creator"), "\n  ")
//!             .with_qualifier("lead")
//!             .with_child(qualified(UNTL, "name"), "Jane Doe"),
//!     )
//!     .build();
//!
//! let extractor = MetadataSchema::Untl.extractor();
//! let values = extractor.field_values(&record, "creator", Some("lead"));
//! assert_eq!(values[0].value, "Jane Doe");
//! assert!(extractor.field_values(&record, "creator", Some("other")).is_empty());
//! ```

use crate::error::{HarvestError, Result};
use crate::namespaces::{self, qualified};
use crate::record::{MetadataElement, Record};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Qualifier reported for qualified-schema elements without a `qualifier` attribute.
pub const NO_QUALIFIER: &str = "None";

/// One extracted (tag, qualifier, value) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    /// Clark-notation tag of the element
    pub tag: String,
    /// Qualifier attribute; always `None` for the flat schema
    pub qualifier: Option<String>,
    /// Normalized, non-empty value
    pub value: String,
}

impl FieldEntry {
    /// Qualifier as displayed, with [`NO_QUALIFIER`] standing in for an absent one.
    #[must_use]
    pub fn qualifier_or_sentinel(&self) -> &str {
        self.qualifier.as_deref().unwrap_or(NO_QUALIFIER)
    }
}

/// Trim a raw value and turn every line break or tab into a single space.
///
/// ```
/// use repoinv::extract::normalize_value;
///
/// assert_eq!(normalize_value("  one\ntwo\tthree\r\nfour "), "one two three four");
/// ```
#[must_use]
pub fn normalize_value(raw: &str) -> String {
    raw.trim().replace("\r\n", " ").replace(['\n', '\r', '\t'], " ")
}

/// Supported metadata payload schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum MetadataSchema {
    /// Unqualified Dublin Core (`oai_dc`)
    #[default]
    #[value(name = "dc")]
    DublinCore,
    /// UNT Libraries qualified metadata
    #[value(name = "untl")]
    Untl,
}

impl MetadataSchema {
    /// Short schema name, as used in OAI-PMH `metadataPrefix`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MetadataSchema::DublinCore => "oai_dc",
            MetadataSchema::Untl => "untl",
        }
    }

    /// Namespace URI of the payload's field elements.
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            MetadataSchema::DublinCore => namespaces::DC,
            MetadataSchema::Untl => namespaces::UNTL,
        }
    }

    /// Field names accepted for value extraction.
    #[must_use]
    pub fn vocabulary(self) -> &'static [&'static str] {
        match self {
            MetadataSchema::DublinCore => &namespaces::DC_ELEMENTS,
            MetadataSchema::Untl => &namespaces::UNTL_ELEMENTS,
        }
    }

    /// Reject field names outside the schema's vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::UnknownField`] for an unsupported name.
    pub fn validate_field(self, field: &str) -> Result<()> {
        if self.vocabulary().contains(&field) {
            Ok(())
        } else {
            Err(HarvestError::UnknownField {
                field: field.to_string(),
                schema: self.name(),
            })
        }
    }

    /// Clark-notation tag for a field name in this schema.
    #[must_use]
    pub fn tag(self, field: &str) -> String {
        qualified(self.namespace(), field)
    }

    /// Tag of this schema's counterpart to a Dublin Core element.
    ///
    /// UNTL names the DC `type` element `resourceType`; all other elements
    /// keep their name.
    #[must_use]
    pub fn dc_equivalent_tag(self, dc_element: &str) -> String {
        match (self, dc_element) {
            (MetadataSchema::Untl, "type") => self.tag("resourceType"),
            _ => self.tag(dc_element),
        }
    }

    /// The extractor implementing this schema's rules.
    #[must_use]
    pub fn extractor(self) -> Box<dyn FieldExtractor> {
        match self {
            MetadataSchema::DublinCore => Box::new(FlatExtractor),
            MetadataSchema::Untl => Box::new(QualifiedExtractor::new()),
        }
    }
}

impl fmt::Display for MetadataSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Schema-specific rules for turning payload elements into [`FieldEntry`] values.
///
/// Implementors supply the per-element rules; the provided methods build the
/// record-level read operations on top of them, so both schemas answer
/// values-by-field, presence and full dumps the same way.
pub trait FieldExtractor: fmt::Debug + Send + Sync {
    /// Schema handled by this extractor.
    fn schema(&self) -> MetadataSchema;

    /// Normalized value of one element; empty when the element carries no value.
    fn element_value(&self, element: &MetadataElement) -> String;

    /// Qualifier of one element.
    fn element_qualifier(&self, element: &MetadataElement) -> Option<String>;

    /// Identifier to print on output lines for this record.
    fn output_id<'r>(&self, record: &'r Record) -> Option<Cow<'r, str>> {
        record.identifier.as_deref().map(Cow::Borrowed)
    }

    /// Entry for one element, or `None` when its value is empty.
    fn entry(&self, element: &MetadataElement) -> Option<FieldEntry> {
        let value = self.element_value(element);
        if value.is_empty() {
            return None;
        }
        Some(FieldEntry {
            tag: element.tag.clone(),
            qualifier: self.element_qualifier(element),
            value,
        })
    }

    /// Non-empty entries for `field` in document order, optionally restricted
    /// to one qualifier ([`NO_QUALIFIER`] matches unqualified elements).
    fn field_values(
        &self,
        record: &Record,
        field: &str,
        qualifier: Option<&str>,
    ) -> Vec<FieldEntry> {
        let tag = self.schema().tag(field);
        record
            .metadata
            .iter()
            .filter(|element| element.tag == tag)
            .filter_map(|element| self.entry(element))
            .filter(|entry| qualifier.map_or(true, |q| entry.qualifier_or_sentinel() == q))
            .collect()
    }

    /// Every non-empty entry of the payload in document order.
    fn all_fields(&self, record: &Record) -> Vec<FieldEntry> {
        record
            .metadata
            .iter()
            .filter_map(|element| self.entry(element))
            .collect()
    }

    /// Whether `field` has at least one non-empty value.
    fn field_presence(&self, record: &Record, field: &str) -> bool {
        let tag = self.schema().tag(field);
        record
            .metadata
            .iter()
            .any(|element| element.tag == tag && !self.element_value(element).is_empty())
    }
}

/// Extractor for unqualified Dublin Core payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatExtractor;

impl FieldExtractor for FlatExtractor {
    fn schema(&self) -> MetadataSchema {
        MetadataSchema::DublinCore
    }

    fn element_value(&self, element: &MetadataElement) -> String {
        normalize_value(&element.text)
    }

    fn element_qualifier(&self, _element: &MetadataElement) -> Option<String> {
        None
    }
}

/// Extractor for UNTL payloads.
#[derive(Debug, Clone)]
pub struct QualifiedExtractor {
    name_field_tags: Vec<String>,
    name_child_tag: String,
    ark_tag: String,
}

impl Default for QualifiedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl QualifiedExtractor {
    /// Create an extractor for the UNTL namespace.
    #[must_use]
    pub fn new() -> Self {
        let schema = MetadataSchema::Untl;
        QualifiedExtractor {
            name_field_tags: namespaces::NAME_FIELDS
                .iter()
                .map(|field| schema.tag(field))
                .collect(),
            name_child_tag: schema.tag(namespaces::NAME_CHILD),
            ark_tag: schema.tag("meta"),
        }
    }

    fn is_name_field(&self, tag: &str) -> bool {
        self.name_field_tags.iter().any(|name_tag| name_tag == tag)
    }
}

impl FieldExtractor for QualifiedExtractor {
    fn schema(&self) -> MetadataSchema {
        MetadataSchema::Untl
    }

    fn element_value(&self, element: &MetadataElement) -> String {
        if self.is_name_field(&element.tag) {
            if let Some(name) = element.child_text(&self.name_child_tag) {
                return normalize_value(name);
            }
        }
        normalize_value(&element.text)
    }

    fn element_qualifier(&self, element: &MetadataElement) -> Option<String> {
        element.qualifier.clone()
    }

    /// The ARK from `<untl:meta qualifier="ark">`, falling back to the header identifier.
    fn output_id<'r>(&self, record: &'r Record) -> Option<Cow<'r, str>> {
        record
            .metadata
            .iter()
            .find(|element| {
                element.tag == self.ark_tag && element.qualifier.as_deref() == Some("ark")
            })
            .map(|element| normalize_value(&element.text))
            .filter(|ark| !ark.is_empty())
            .map(Cow::Owned)
            .or_else(|| record.identifier.as_deref().map(Cow::Borrowed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::{DC, UNTL};

    fn dc_record() -> Record {
        Record::builder()
            .identifier("oai:dc:1")
            .element(MetadataElement::new(qualified(DC, "title"), "  Foo\nBar "))
            .element(MetadataElement::new(qualified(DC, "creator"), ""))
            .element(MetadataElement::new(qualified(DC, "creator"), "Smith"))
            .element(MetadataElement::new(qualified(DC, "date"), "2020"))
            .build()
    }

    fn untl_record() -> Record {
        Record::builder()
            .identifier("oai:untl:1")
            .element(
                MetadataElement::new(qualified(UNTL, "title"), "Report")
                    .with_qualifier("officialtitle"),
            )
            .element(
                MetadataElement::new(qualified(UNTL, "creator"), "\n    ")
                    .with_qualifier("lead")
                    .with_child(qualified(UNTL, "type"), "per")
                    .with_child(qualified(UNTL, "name"), " Jane Doe "),
            )
            .element(MetadataElement::new(qualified(UNTL, "subject"), "Rivers"))
            .element(
                MetadataElement::new(qualified(UNTL, "meta"), "ark:/67531/metapth1")
                    .with_qualifier("ark"),
            )
            .build()
    }

    #[test]
    fn test_flat_values_skip_empty_and_normalize() {
        let record = dc_record();
        let values = FlatExtractor.field_values(&record, "creator", None);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "Smith");
        assert!(values[0].qualifier.is_none());

        let titles = FlatExtractor.field_values(&record, "title", None);
        assert_eq!(titles[0].value, "Foo Bar");
    }

    #[test]
    fn test_flat_qualifier_filter_matches_sentinel_only() {
        let record = dc_record();
        assert!(FlatExtractor.field_values(&record, "date", Some("issued")).is_empty());
        assert_eq!(
            FlatExtractor
                .field_values(&record, "date", Some(NO_QUALIFIER))
                .len(),
            1
        );
    }

    #[test]
    fn test_flat_all_fields_in_document_order() {
        let fields = FlatExtractor.all_fields(&dc_record());
        let values: Vec<_> = fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["Foo Bar", "Smith", "2020"]);
    }

    #[test]
    fn test_qualified_name_field_uses_nested_name() {
        let extractor = QualifiedExtractor::new();
        let record = untl_record();
        let lead = extractor.field_values(&record, "creator", Some("lead"));
        assert_eq!(lead.len(), 1);
        assert_eq!(lead[0].value, "Jane Doe");
        assert!(extractor
            .field_values(&record, "creator", Some("other"))
            .is_empty());
    }

    #[test]
    fn test_qualified_name_field_without_name_child_uses_text() {
        let extractor = QualifiedExtractor::new();
        let record = Record::builder()
            .element(MetadataElement::new(qualified(UNTL, "publisher"), "UNT Press"))
            .build();
        let values = extractor.field_values(&record, "publisher", None);
        assert_eq!(values[0].value, "UNT Press");
    }

    #[test]
    fn test_qualified_missing_qualifier_matches_sentinel() {
        let extractor = QualifiedExtractor::new();
        let record = untl_record();
        let subjects = extractor.field_values(&record, "subject", Some(NO_QUALIFIER));
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].qualifier_or_sentinel(), "None");
    }

    #[test]
    fn test_presence_agrees_with_values() {
        let extractor = QualifiedExtractor::new();
        let record = untl_record();
        for field in namespaces::UNTL_ELEMENTS {
            assert_eq!(
                extractor.field_presence(&record, field),
                !extractor.field_values(&record, field, None).is_empty(),
                "presence mismatch for {field}"
            );
        }
        let record = dc_record();
        for field in namespaces::DC_ELEMENTS {
            assert_eq!(
                FlatExtractor.field_presence(&record, field),
                !FlatExtractor.field_values(&record, field, None).is_empty()
            );
        }
    }

    #[test]
    fn test_output_id_prefers_ark() {
        let extractor = QualifiedExtractor::new();
        assert_eq!(
            extractor.output_id(&untl_record()).as_deref(),
            Some("ark:/67531/metapth1")
        );
        assert_eq!(extractor.output_id(&dc_record()).as_deref(), Some("oai:dc:1"));
        assert_eq!(
            FlatExtractor.output_id(&untl_record()).as_deref(),
            Some("oai:untl:1")
        );
    }

    #[test]
    fn test_ark_whitespace_is_normalized() {
        let record = Record::builder()
            .identifier("oai:untl:2")
            .element(
                MetadataElement::new(qualified(UNTL, "meta"), "\n ark:/67531/\tmetapth2 \n")
                    .with_qualifier("ark"),
            )
            .build();
        assert_eq!(
            QualifiedExtractor::new().output_id(&record).as_deref(),
            Some("ark:/67531/ metapth2")
        );
    }

    #[test]
    fn test_dc_equivalent_tag() {
        assert_eq!(
            MetadataSchema::Untl.dc_equivalent_tag("type"),
            qualified(UNTL, "resourceType")
        );
        assert_eq!(
            MetadataSchema::DublinCore.dc_equivalent_tag("type"),
            qualified(DC, "type")
        );
        assert_eq!(MetadataSchema::Untl.dc_equivalent_tag("title"), qualified(UNTL, "title"));
    }

    #[test]
    fn test_validate_field() {
        assert!(MetadataSchema::DublinCore.validate_field("rights").is_ok());
        assert!(MetadataSchema::Untl.validate_field("primarySource").is_ok());
        let err = MetadataSchema::DublinCore
            .validate_field("primarySource")
            .unwrap_err();
        assert!(matches!(err, HarvestError::UnknownField { schema: "oai_dc", .. }));
    }

    #[test]
    fn test_schema_selects_extractor() {
        assert_eq!(
            MetadataSchema::Untl.extractor().schema(),
            MetadataSchema::Untl
        );
        assert_eq!(
            MetadataSchema::DublinCore.extractor().schema(),
            MetadataSchema::DublinCore
        );
    }
}
