//! Streaming records out of OAI-PMH repository dumps.
//!
//! This module provides [`OaiReader`], which pulls one `<record>` at a time
//! from any [`std::io::BufRead`] source using quick-xml's namespace-aware pull
//! parser. Only the record currently being built is held in memory, so dump
//! size does not affect memory use.
//!
//! Records are recognized by the local name `record` in any namespace (dumps
//! written without the OAI-PMH default namespace are common). Inside a record:
//! - `<header>` supplies `status`, `<identifier>`, `<datestamp>`, `<setSpec>`
//! - the first element child of `<metadata>` is the payload root, and each of
//!   its element children becomes a [`MetadataElement`]
//!
//! # Examples
//!
//! ```
//! use repoinv::reader::OaiReader;
//!
//! let xml = r#"<records>
//!   <record>
//!     <header><identifier>oai:example.org:1</identifier></header>
//!     <metadata>
//!       <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
//!                  xmlns:dc="http://purl.org/dc/elements/1.1/">
//!         <dc:title>First</dc:title>
//!       </oai_dc:dc>
//!     </metadata>
//!   </record>
//! </records>"#;
//!
//! let mut reader = OaiReader::new(xml.as_bytes());
//! let record = reader.read_record()?.expect("one record");
//! assert_eq!(record.identifier.as_deref(), Some("oai:example.org:1"));
//! assert!(reader.read_record()?.is_none());
//! # Ok::<(), repoinv::HarvestError>(())
//! ```

use crate::error::{HarvestError, Result};
use crate::extract::normalize_value;
use crate::namespaces::qualified;
use crate::record::{MetadataElement, Record, RecordStatus};
use flate2::read::MultiGzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Element opened by a start or empty tag, with its name resolved.
#[derive(Debug)]
struct OpenElement {
    /// Clark-notation tag
    tag: String,
    local: String,
    attributes: Vec<(String, String)>,
}

impl OpenElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Owned view of the quick-xml events the record parser cares about.
#[derive(Debug)]
enum XmlEvent {
    Start(OpenElement),
    Empty(OpenElement),
    End,
    Text(String),
    Other,
    Eof,
}

/// Streaming reader for OAI-PMH repository dumps.
///
/// `OaiReader` returns one [`Record`] per call to
/// [`read_record`](Self::read_record) and also implements [`Iterator`].
/// Dropping the reader part-way through a dump releases the source; no
/// further input is consumed.
pub struct OaiReader<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    records_read: usize,
    failed: bool,
}

impl<R: BufRead> std::fmt::Debug for OaiReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OaiReader")
            .field("records_read", &self.records_read)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl OaiReader<Box<dyn BufRead>> {
    /// Open a dump on disk, transparently decompressing gzip input.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its first bytes
    /// cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = BufReader::new(File::open(path)?);
        let is_gzip = file.fill_buf()?.starts_with(&GZIP_MAGIC);
        debug!(path = %path.display(), is_gzip, "opening repository dump");

        let source: Box<dyn BufRead> = if is_gzip {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(file)
        };
        Ok(OaiReader::new(source))
    }
}

impl<R: BufRead> OaiReader<R> {
    /// Create a reader over any buffered source.
    pub fn new(source: R) -> Self {
        OaiReader {
            reader: NsReader::from_reader(source),
            buf: Vec::new(),
            records_read: 0,
            failed: false,
        }
    }

    /// Number of records returned so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read the next record.
    ///
    /// Returns `Ok(Some(record))` for each `<record>` element, `Ok(None)` once
    /// the document is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MalformedInput`] if the XML is not well formed
    /// or ends inside a record, and [`HarvestError::IoError`] on read failure.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(element) if element.local == "record" => {
                    let mut record = self.read_record_body()?;
                    self.records_read += 1;
                    record.position = self.records_read;
                    debug!(
                        position = record.position,
                        identifier = ?record.identifier,
                        status = %record.status,
                        fields = record.metadata.len(),
                        "parsed record"
                    );
                    return Ok(Some(record));
                },
                XmlEvent::Empty(element) if element.local == "record" => {
                    self.records_read += 1;
                    return Ok(Some(Record {
                        position: self.records_read,
                        ..Record::default()
                    }));
                },
                XmlEvent::Eof => return Ok(None),
                _ => {},
            }
        }
    }

    fn read_record_body(&mut self) -> Result<Record> {
        let mut record = Record::default();
        loop {
            match self.next_event()? {
                XmlEvent::Start(element) => match element.local.as_str() {
                    "header" => {
                        record.status = RecordStatus::from_attribute(element.attribute("status"));
                        self.read_header(&mut record)?;
                    },
                    "metadata" => self.read_metadata(&mut record)?,
                    _ => self.skip_element()?,
                },
                XmlEvent::Empty(element) if element.local == "header" => {
                    record.status = RecordStatus::from_attribute(element.attribute("status"));
                },
                XmlEvent::End => return Ok(record),
                XmlEvent::Eof => return Err(self.unexpected_eof("record")),
                _ => {},
            }
        }
    }

    fn read_header(&mut self, record: &mut Record) -> Result<()> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(element) => {
                    let text = normalize_value(&self.read_text()?);
                    match element.local.as_str() {
                        "identifier" if !text.is_empty() => record.identifier = Some(text),
                        "datestamp" => record.datestamp = Some(text),
                        "setSpec" => record.set_specs.push(text),
                        _ => {},
                    }
                },
                XmlEvent::End => return Ok(()),
                XmlEvent::Eof => return Err(self.unexpected_eof("header")),
                _ => {},
            }
        }
    }

    fn read_metadata(&mut self, record: &mut Record) -> Result<()> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(root) => {
                    if record.metadata_root.is_some() {
                        self.skip_element()?;
                    } else {
                        record.metadata_root = Some(root.tag);
                        self.read_payload(record)?;
                    }
                },
                XmlEvent::Empty(root) => {
                    if record.metadata_root.is_none() {
                        record.metadata_root = Some(root.tag);
                    }
                },
                XmlEvent::End => return Ok(()),
                XmlEvent::Eof => return Err(self.unexpected_eof("metadata")),
                _ => {},
            }
        }
    }

    fn read_payload(&mut self, record: &mut Record) -> Result<()> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(element) => {
                    let field = self.read_field(element)?;
                    record.metadata.push(field);
                },
                XmlEvent::Empty(element) => {
                    let qualifier = element.attribute("qualifier").map(str::to_string);
                    let mut field = MetadataElement::new(element.tag, "");
                    field.qualifier = qualifier;
                    record.metadata.push(field);
                },
                XmlEvent::End => return Ok(()),
                XmlEvent::Eof => return Err(self.unexpected_eof("metadata payload")),
                _ => {},
            }
        }
    }

    fn read_field(&mut self, element: OpenElement) -> Result<MetadataElement> {
        let qualifier = element.attribute("qualifier").map(str::to_string);
        let mut field = MetadataElement::new(element.tag, "");
        field.qualifier = qualifier;
        loop {
            match self.next_event()? {
                XmlEvent::Text(text) => field.text.push_str(&text),
                XmlEvent::Start(child) => {
                    let text = self.read_text()?;
                    field.children.push((child.tag, text));
                },
                XmlEvent::Empty(child) => field.children.push((child.tag, String::new())),
                XmlEvent::End => return Ok(field),
                XmlEvent::Eof => return Err(self.unexpected_eof("metadata field")),
                XmlEvent::Other => {},
            }
        }
    }

    /// Collect the direct text of the element just opened, skipping nested elements.
    fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                XmlEvent::Text(chunk) => text.push_str(&chunk),
                XmlEvent::Start(_) => self.skip_element()?,
                XmlEvent::End => return Ok(text),
                XmlEvent::Eof => return Err(self.unexpected_eof("element text")),
                XmlEvent::Empty(_) | XmlEvent::Other => {},
            }
        }
    }

    /// Consume events up to and including the end of the element just opened.
    fn skip_element(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_event()? {
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End => depth -= 1,
                XmlEvent::Eof => return Err(self.unexpected_eof("element")),
                _ => {},
            }
        }
        Ok(())
    }

    fn next_event(&mut self) -> Result<XmlEvent> {
        self.buf.clear();
        let position = self.reader.buffer_position();
        let (resolve, event) = self
            .reader
            .read_resolved_event_into(&mut self.buf)
            .map_err(|e| malformed_at(position, &e))?;

        match event {
            Event::Start(start) => Ok(XmlEvent::Start(open_element(&resolve, &start, position)?)),
            Event::Empty(start) => Ok(XmlEvent::Empty(open_element(&resolve, &start, position)?)),
            Event::End(_) => Ok(XmlEvent::End),
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| malformed_at(position, &e))?;
                Ok(XmlEvent::Text(text.into_owned()))
            },
            Event::CData(data) => Ok(XmlEvent::Text(
                String::from_utf8_lossy(&data.into_inner()).into_owned(),
            )),
            Event::Eof => Ok(XmlEvent::Eof),
            _ => Ok(XmlEvent::Other),
        }
    }

    fn unexpected_eof(&mut self, context: &str) -> HarvestError {
        self.failed = true;
        HarvestError::MalformedInput(format!(
            "Unexpected end of input inside {context} at byte {}",
            self.reader.buffer_position()
        ))
    }
}

impl<R: BufRead> Iterator for OaiReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.read_record();
        if result.is_err() {
            self.failed = true;
        }
        result.transpose()
    }
}

fn malformed_at(position: usize, error: &dyn std::fmt::Display) -> HarvestError {
    HarvestError::MalformedInput(format!("XML error at byte {position}: {error}"))
}

fn open_element(
    resolve: &ResolveResult,
    start: &BytesStart,
    position: usize,
) -> Result<OpenElement> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let tag = match resolve {
        ResolveResult::Bound(namespace) => {
            qualified(&String::from_utf8_lossy(namespace.as_ref()), &local)
        },
        ResolveResult::Unbound => local.clone(),
        ResolveResult::Unknown(prefix) => {
            return Err(HarvestError::MalformedInput(format!(
                "Unbound namespace prefix '{}' at byte {position}",
                String::from_utf8_lossy(prefix)
            )));
        },
    };

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| malformed_at(position, &e))?;
        if attribute.key.as_namespace_binding().is_some() || attribute.key.prefix().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| malformed_at(position, &e))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(OpenElement {
        tag,
        local,
        attributes,
    })
}
