//! Atom entry writer and feed reader.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::trace;

use aztable_core::error::{InvalidInputError, ProtocolError};
use aztable_core::record::{
    PARTITION_KEY, ROW_KEY, TABLE_NAME, TIMESTAMP, TYPE_TAG, is_system_field, validate_field_name,
};
use aztable_core::{Author, EntityKey, Error, Record, Result, TableDescriptor, TableName, Value};

use super::{ATOM_NS, DATA_NS, METADATA_NS};

/// Wire type of timestamp properties.
const EDM_DATE_TIME: &str = "Edm.DateTime";

/// Type names every record carries; they are never written.
const DEFAULT_TYPE_NAMES: [&str; 2] = ["System.Object", "System.Management.Automation.PSObject"];

/// A property to write: name, text and optional `m:type`.
type WireProperty<'a> = (&'a str, Cow<'a, str>, Option<&'static str>);

/// Encode an entity write body.
///
/// `id` is the entity's absolute URI for update and merge, and `None` for
/// insert. System fields in `record` are skipped; the key always comes
/// from `key`.
pub fn encode_entity(
    key: &EntityKey,
    record: &Record,
    id: Option<&str>,
    author: Option<&Author>,
    updated: DateTime<Utc>,
) -> Result<String> {
    let mut properties: Vec<WireProperty<'_>> = vec![
        (PARTITION_KEY, Cow::Borrowed(key.partition()), None),
        (ROW_KEY, Cow::Borrowed(key.row()), None),
    ];
    let type_names: Vec<&str> = record
        .type_names()
        .iter()
        .map(String::as_str)
        .filter(|n| !DEFAULT_TYPE_NAMES.contains(n))
        .collect();
    if !type_names.is_empty() {
        properties.push((TYPE_TAG, Cow::Owned(type_names.join(",")), None));
    }
    for (name, value) in record.iter() {
        if is_system_field(name) || name == TYPE_TAG {
            continue;
        }
        validate_field_name(name)?;
        let edm_type = value.as_timestamp().map(|_| EDM_DATE_TIME);
        properties.push((name, value.to_wire_string(), edm_type));
    }

    write_entry(id.unwrap_or_default(), author, updated, &properties)
}

/// Encode a create-table body.
pub fn encode_table(
    table: &TableName,
    author: Option<&Author>,
    updated: DateTime<Utc>,
) -> Result<String> {
    write_entry(
        "",
        author,
        updated,
        &[(TABLE_NAME, Cow::Borrowed(table.as_str()), None)],
    )
}

fn write_entry(
    id: &str,
    author: Option<&Author>,
    updated: DateTime<Utc>,
    properties: &[WireProperty<'_>],
) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("yes"))))
        .map_err(write_failed)?;

    let mut entry = BytesStart::new("entry");
    entry.push_attribute(("xmlns:d", DATA_NS));
    entry.push_attribute(("xmlns:m", METADATA_NS));
    entry.push_attribute(("xmlns", ATOM_NS));
    writer.write_event(Event::Start(entry)).map_err(write_failed)?;

    write_text_element(&mut writer, "title", "")?;
    write_text_element(
        &mut writer,
        "updated",
        &updated.to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;

    writer
        .write_event(Event::Start(BytesStart::new("author")))
        .map_err(write_failed)?;
    match author {
        Some(author) => {
            write_text_element(&mut writer, "name", &author.name)?;
            if let Some(ref email) = author.email {
                write_text_element(&mut writer, "email", email)?;
            }
        }
        None => write_text_element(&mut writer, "name", "")?,
    }
    writer
        .write_event(Event::End(BytesEnd::new("author")))
        .map_err(write_failed)?;

    write_text_element(&mut writer, "id", id)?;

    let mut content = BytesStart::new("content");
    content.push_attribute(("type", "application/xml"));
    writer.write_event(Event::Start(content)).map_err(write_failed)?;
    writer
        .write_event(Event::Start(BytesStart::new("m:properties")))
        .map_err(write_failed)?;
    for (name, value, edm_type) in properties {
        let element = format!("d:{}", name);
        match edm_type {
            Some(edm_type) => write_typed_element(&mut writer, &element, value, edm_type)?,
            None => write_text_element(&mut writer, &element, value)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new("m:properties")))
        .map_err(write_failed)?;
    writer
        .write_event(Event::End(BytesEnd::new("content")))
        .map_err(write_failed)?;

    writer
        .write_event(Event::End(BytesEnd::new("entry")))
        .map_err(write_failed)?;

    let body = String::from_utf8(writer.into_inner()).map_err(write_failed)?;
    trace!(body = %body, "encoded entry");
    Ok(body)
}

/// Write `<name>text</name>`, or `<name/>` for empty text.
fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        return writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(write_failed);
    }
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(write_failed)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_failed)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_failed)
}

/// Write `<name m:type="..">text</name>`.
fn write_typed_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
    edm_type: &str,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    start.push_attribute(("m:type", edm_type));
    writer.write_event(Event::Start(start)).map_err(write_failed)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_failed)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_failed)
}

fn write_failed(err: impl fmt::Display) -> Error {
    InvalidInputError::Other {
        message: format!("failed to encode entry: {}", err),
    }
    .into()
}

/// Decode every `properties` block in a response into a record.
///
/// With `include_table_info`, `PartitionKey`, `RowKey` and `Timestamp` are
/// kept and `TableName` is set to `table`; otherwise all four are left out.
pub fn decode_entities(body: &str, table: &TableName, include_table_info: bool) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    let mut property: Option<Property> = None;

    walk(body, |node| {
        match node {
            Node::Open { name, .. } if name == "properties" => current = Some(Record::new()),
            Node::Open {
                name,
                null,
                edm_type,
            } if current.is_some() => {
                property = Some(Property {
                    name,
                    text: String::new(),
                    null,
                    edm_type,
                })
            }
            Node::Text(text) => {
                if let Some(ref mut p) = property {
                    p.text.push_str(&text);
                }
            }
            Node::Close { name } if name == "properties" => {
                if let Some(mut record) = current.take() {
                    if include_table_info {
                        record.insert(TABLE_NAME, table.as_str());
                    }
                    records.push(record);
                }
            }
            Node::Close { .. } => {
                if let (Some(p), Some(record)) = (property.take(), current.as_mut()) {
                    p.apply(record, include_table_info);
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    trace!(count = records.len(), table = %table, "decoded entities");
    Ok(records)
}

/// Decode table entries from a create or list response.
pub fn decode_tables(body: &str) -> Result<Vec<TableDescriptor>> {
    #[derive(Default)]
    struct Entry {
        id: Option<String>,
        updated: Option<String>,
        name: Option<String>,
    }

    let mut tables = Vec::new();
    let mut entry: Option<Entry> = None;
    let mut capture: Option<(String, String)> = None;

    walk(body, |node| {
        match node {
            Node::Open { name, .. } if name == "entry" => entry = Some(Entry::default()),
            Node::Open { name, .. } if entry.is_some() => capture = Some((name, String::new())),
            Node::Text(text) => {
                if let Some((_, ref mut buf)) = capture {
                    buf.push_str(&text);
                }
            }
            Node::Close { name } if name == "entry" => {
                if let Some(done) = entry.take() {
                    let name = done.name.ok_or_else(|| decode_failed("table entry without TableName"))?;
                    tables.push(TableDescriptor {
                        name,
                        id: done.id.unwrap_or_default(),
                        updated: done
                            .updated
                            .and_then(|u| DateTime::parse_from_rfc3339(u.trim()).ok())
                            .map(|u| u.with_timezone(&Utc)),
                    });
                }
            }
            Node::Close { name } => {
                if let (Some(e), Some((captured, text))) = (entry.as_mut(), capture.take()) {
                    if captured == name {
                        match name.as_str() {
                            "id" => e.id = Some(text),
                            "updated" => e.updated = Some(text),
                            TABLE_NAME => e.name = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(tables)
}

/// Error details from a service error body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Read `code` and `message` from an XML error body.
///
/// Returns empty details if the body is not a readable error document.
pub fn decode_error(body: &str) -> ServiceError {
    let mut error = ServiceError::default();
    let mut capture: Option<(String, String)> = None;

    let result = walk(body, |node| {
        match node {
            Node::Open { name, .. } => capture = Some((name, String::new())),
            Node::Text(text) => {
                if let Some((_, ref mut buf)) = capture {
                    buf.push_str(&text);
                }
            }
            Node::Close { name } => {
                if let Some((captured, text)) = capture.take() {
                    let text = text.trim();
                    if captured == name && !text.is_empty() {
                        match name.as_str() {
                            "code" => error.code = Some(text.to_string()),
                            "message" => error.message = Some(text.to_string()),
                            _ => {}
                        }
                    }
                }
            }
        }
        Ok(())
    });

    match result {
        Ok(()) => error,
        Err(_) => ServiceError::default(),
    }
}

/// A property element being read.
struct Property {
    name: String,
    text: String,
    null: bool,
    edm_type: Option<String>,
}

impl Property {
    fn apply(self, record: &mut Record, include_table_info: bool) {
        if self.null {
            return;
        }
        match self.name.as_str() {
            TYPE_TAG => record.set_type_names(self.text.split(',').map(str::trim)),
            PARTITION_KEY | ROW_KEY => {
                if include_table_info {
                    record.insert(self.name, self.text);
                }
            }
            TIMESTAMP => {
                if include_table_info {
                    record.insert(TIMESTAMP, Value::parse_timestamp(&self.text));
                }
            }
            _ if self.edm_type.as_deref() == Some(EDM_DATE_TIME) => {
                let value = Value::parse_timestamp(&self.text);
                record.insert(self.name, value);
            }
            _ => {
                record.insert(self.name, self.text);
            }
        }
    }
}

/// A simplified XML event: element names are local names and empty
/// elements arrive as an open followed by a close.
enum Node<'a> {
    Open {
        name: String,
        null: bool,
        edm_type: Option<String>,
    },
    Close { name: String },
    Text(Cow<'a, str>),
}

/// Feed every node of `body` to `visit`, failing on malformed XML.
fn walk<F>(body: &str, mut visit: F) -> Result<()>
where
    F: FnMut(Node<'_>) -> Result<()>,
{
    let mut reader = Reader::from_str(body);
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(decode_failed)? {
            Event::Start(e) => {
                depth += 1;
                visit(Node::Open {
                    name: local_name(e.local_name().as_ref())?,
                    null: is_null(&e),
                    edm_type: edm_type(&e),
                })?;
            }
            Event::Empty(e) => {
                let name = local_name(e.local_name().as_ref())?;
                visit(Node::Open {
                    name: name.clone(),
                    null: is_null(&e),
                    edm_type: edm_type(&e),
                })?;
                visit(Node::Close { name })?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                visit(Node::Close {
                    name: local_name(e.local_name().as_ref())?,
                })?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(decode_failed)?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(decode_failed("text outside the document element"));
                    }
                    continue;
                }
                visit(Node::Text(text))?;
            }
            Event::CData(c) => {
                let text = std::str::from_utf8(&c).map_err(decode_failed)?;
                visit(Node::Text(Cow::Owned(text.to_string())))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(decode_failed("document ended inside an element"));
    }
    Ok(())
}

fn local_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(decode_failed)
}

fn is_null(element: &BytesStart<'_>) -> bool {
    element
        .attributes()
        .flatten()
        .any(|a| a.key.local_name().as_ref() == b"null" && a.value.as_ref() == b"true")
}

fn edm_type(element: &BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"type" && a.key.prefix().is_some())
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn decode_failed(err: impl fmt::Display) -> Error {
    ProtocolError::Decode {
        reason: err.to_string(),
    }
    .into()
}
