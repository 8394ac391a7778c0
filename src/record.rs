//! Harvested record structures.
//!
//! This module provides the owned representation of one OAI-PMH `<record>`:
//! - [`Record`] — header data plus the metadata payload
//! - [`MetadataElement`] — one child element of the payload root
//! - [`RecordStatus`] — active / deleted gate from the header
//!
//! Records are normally produced by [`crate::reader::OaiReader`]; the builder
//! exists for callers that assemble records by hand.
//!
//! # Examples
//!
//! ```
//! use repoinv::record::{MetadataElement, Record, RecordStatus};
//! use repoinv::namespaces::{qualified, DC};
//!
//! let record = Record::builder()
//!     .identifier("oai:example.org:1")
//!     .element(MetadataElement::new(qualified(DC, "title"), "A Title"))
//!     .build();
//!
//! assert_eq!(record.identifier.as_deref(), Some("oai:example.org:1"));
//! assert_eq!(record.status, RecordStatus::Active);
//! assert_eq!(record.metadata.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a record as declared on its header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordStatus {
    /// No `status` attribute on the header
    #[default]
    Active,
    /// `status="deleted"`
    Deleted,
    /// Any other literal attribute value
    Other(String),
}

impl RecordStatus {
    /// Interpret the header's `status` attribute (absent means active).
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            None | Some("active") => RecordStatus::Active,
            Some("deleted") => RecordStatus::Deleted,
            Some(other) => RecordStatus::Other(other.to_string()),
        }
    }

    /// Whether the record takes part in statistics and output.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }

    /// The literal status string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Deleted => "deleted",
            RecordStatus::Other(value) => value,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One child element of the metadata payload root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataElement {
    /// Clark-notation tag, e.g. `{http://purl.org/dc/elements/1.1/}title`
    pub tag: String,
    /// `qualifier` attribute, if present
    pub qualifier: Option<String>,
    /// Concatenated direct text content, unmodified
    pub text: String,
    /// Nested child elements as (Clark tag, text) pairs, in document order
    pub children: Vec<(String, String)>,
}

impl MetadataElement {
    /// Create an element with text content and no qualifier or children.
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        MetadataElement {
            tag: tag.into(),
            qualifier: None,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Set the qualifier attribute.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Append a nested child element.
    #[must_use]
    pub fn with_child(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.children.push((tag.into(), text.into()));
        self
    }

    /// Text of the first nested child with the given Clark tag.
    #[must_use]
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|(child_tag, _)| child_tag == tag)
            .map(|(_, text)| text.as_str())
    }
}

/// An OAI-PMH record: header data plus the metadata payload.
///
/// The payload is stored as the ordered children of the metadata root
/// element (`<oai_dc:dc>`, `<untl:metadata>`, ...), so extraction never
/// depends on the positional shape of the surrounding document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based position within the dump; 0 for records built by hand
    #[serde(default)]
    pub position: usize,
    /// Header `<identifier>`; `None` when the header lacks one
    pub identifier: Option<String>,
    /// Header status
    pub status: RecordStatus,
    /// Header `<datestamp>`
    pub datestamp: Option<String>,
    /// Header `<setSpec>` values
    pub set_specs: Vec<String>,
    /// Clark tag of the payload root element, if the record has a payload
    pub metadata_root: Option<String>,
    /// Payload children in document order
    pub metadata: Vec<MetadataElement>,
}

impl Record {
    /// Create a builder for fluently constructing records.
    #[must_use]
    pub fn builder() -> RecordBuilder {
        RecordBuilder {
            record: Record::default(),
        }
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Set the header identifier.
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.record.identifier = Some(identifier.into());
        self
    }

    /// Set the position within the dump.
    #[must_use]
    pub fn position(mut self, position: usize) -> Self {
        self.record.position = position;
        self
    }

    /// Set the header status.
    #[must_use]
    pub fn status(mut self, status: RecordStatus) -> Self {
        self.record.status = status;
        self
    }

    /// Mark the record deleted.
    #[must_use]
    pub fn deleted(self) -> Self {
        self.status(RecordStatus::Deleted)
    }

    /// Set the header datestamp.
    #[must_use]
    pub fn datestamp(mut self, datestamp: impl Into<String>) -> Self {
        self.record.datestamp = Some(datestamp.into());
        self
    }

    /// Add a set membership.
    #[must_use]
    pub fn set_spec(mut self, set_spec: impl Into<String>) -> Self {
        self.record.set_specs.push(set_spec.into());
        self
    }

    /// Set the payload root tag.
    #[must_use]
    pub fn metadata_root(mut self, tag: impl Into<String>) -> Self {
        self.record.metadata_root = Some(tag.into());
        self
    }

    /// Append a payload element.
    #[must_use]
    pub fn element(mut self, element: MetadataElement) -> Self {
        self.record.metadata.push(element);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}
