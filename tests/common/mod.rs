//! Common test helpers shared across the integration suite.
//!
//! Dumps are assembled from small string builders so each test states only
//! the fields it cares about.

#![allow(dead_code)]

use repoinv::{run, OaiReader, Result, RunConfig, RunSummary};

/// Namespace declarations of an `oai_dc` payload root.
const OAI_DC_OPEN: &str = concat!(
    r#"<oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/" "#,
    r#"xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
);

/// Namespace declaration of a UNTL payload root.
const UNTL_OPEN: &str = r#"<untl:metadata xmlns:untl="http://digital2.library.unt.edu/untl/">"#;

/// Wraps record fragments into a `ListRecords` response.
pub fn dump(records: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <OAI-PMH xmlns=\"http://www.openarchives.org/OAI/2.0/\"><ListRecords>\n\
         {}\n\
         </ListRecords></OAI-PMH>",
        records.join("\n")
    )
}

/// Header fragment; `None` omits the identifier.
fn header(identifier: Option<&str>, deleted: bool) -> String {
    let status = if deleted { r#" status="deleted""# } else { "" };
    let identifier = identifier
        .map(|id| format!("<identifier>{id}</identifier>"))
        .unwrap_or_default();
    format!("<header{status}>{identifier}<datestamp>2020-01-01</datestamp></header>")
}

/// An active Dublin Core record with `(element, value)` fields.
pub fn dc_record(identifier: &str, fields: &[(&str, &str)]) -> String {
    dc_record_with(Some(identifier), false, fields)
}

/// A deleted Dublin Core record.
pub fn deleted_dc_record(identifier: &str, fields: &[(&str, &str)]) -> String {
    dc_record_with(Some(identifier), true, fields)
}

/// A Dublin Core record with full control over identifier and status.
pub fn dc_record_with(identifier: Option<&str>, deleted: bool, fields: &[(&str, &str)]) -> String {
    let body: String = fields
        .iter()
        .map(|(element, value)| format!("<dc:{element}>{value}</dc:{element}>"))
        .collect();
    format!(
        "<record>{}<metadata>{OAI_DC_OPEN}{body}</oai_dc:dc></metadata></record>",
        header(identifier, deleted)
    )
}

/// One UNTL field: element, optional qualifier, text and optional nested name.
pub struct UntlField<'a> {
    pub element: &'a str,
    pub qualifier: Option<&'a str>,
    pub text: &'a str,
    pub name: Option<&'a str>,
}

impl<'a> UntlField<'a> {
    pub fn plain(element: &'a str, qualifier: Option<&'a str>, text: &'a str) -> Self {
        UntlField {
            element,
            qualifier,
            text,
            name: None,
        }
    }

    pub fn named(element: &'a str, qualifier: Option<&'a str>, name: &'a str) -> Self {
        UntlField {
            element,
            qualifier,
            text: "",
            name: Some(name),
        }
    }
}

/// An active UNTL record.
pub fn untl_record(identifier: &str, fields: &[UntlField<'_>]) -> String {
    let body: String = fields
        .iter()
        .map(|field| {
            let qualifier = field
                .qualifier
                .map(|q| format!(r#" qualifier="{q}""#))
                .unwrap_or_default();
            let inner = match field.name {
                Some(name) => format!("<untl:type>per</untl:type><untl:name>{name}</untl:name>"),
                None => field.text.to_string(),
            };
            format!("<untl:{0}{qualifier}>{inner}</untl:{0}>", field.element)
        })
        .collect();
    format!(
        "<record>{}<metadata>{UNTL_OPEN}{body}</untl:metadata></metadata></record>",
        header(Some(identifier), false)
    )
}

/// Run `config` over an in-memory dump and capture stdout as a string.
pub fn run_on(config: &RunConfig, xml: &str) -> Result<(String, RunSummary)> {
    let mut out = Vec::new();
    let summary = run(config, OaiReader::new(xml.as_bytes()), &mut out)?;
    Ok((String::from_utf8(out).expect("output is UTF-8"), summary))
}

/// The two-record dump used across suites: one active, one deleted.
pub fn two_record_dump() -> String {
    dump(&[
        dc_record(
            "oai:x:1",
            &[("title", "Foo"), ("creator", "Bar"), ("date", "2020")],
        ),
        deleted_dc_record("oai:x:2", &[("title", "Baz")]),
    ])
}
