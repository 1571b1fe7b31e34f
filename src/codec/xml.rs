//! XML wire format.
//!
//! Parsing walks quick-xml events and builds a [`Value`]: every element with
//! children becomes a record, every text leaf a string, repeated sibling
//! names a sequence. Scalars stay text at this layer; the target payload
//! type decides what each leaf means when it is restored.
//!
//! Rendering is the mirror image: a root element named after the captured
//! record (the payload's serde name, so `#[serde(rename = "...")]` overrides
//! it), one child element per field in declared order, byte sequences as
//! literal escaped text rather than base64.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::value::{Record, Value};
use super::CodecError;

pub(super) fn parse(bytes: &[u8]) -> Result<Value, CodecError> {
    let mut reader = Reader::from_reader(bytes);
    // Open elements: name plus the fields collected so far.
    let mut stack: Vec<(String, Vec<(String, Value)>)> = Vec::new();
    let mut text = String::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(CodecError::Message("multiple root elements".to_owned()));
                }
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push((name, Vec::new()));
                text.clear();
            }
            Event::End(_) => {
                let Some((name, fields)) = stack.pop() else {
                    return Err(CodecError::Message("unexpected closing element".to_owned()));
                };
                let value = if fields.is_empty() {
                    Value::Str(std::mem::take(&mut text))
                } else {
                    // Interleaved text around child elements is dropped.
                    text.clear();
                    Value::Record(Record { name: name.clone(), fields })
                };
                match stack.last_mut() {
                    Some((_, parent)) => attach(parent, name, value),
                    None => root = Some(value),
                }
            }
            Event::Empty(empty) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some((_, parent)) => attach(parent, name, Value::Str(String::new())),
                    None => {
                        if root.is_some() {
                            return Err(CodecError::Message("multiple root elements".to_owned()));
                        }
                        root = Some(Value::Str(String::new()));
                    }
                }
            }
            Event::Text(t) => {
                let unescaped = t.unescape()?;
                let trimmed = unescaped.trim();
                if !trimmed.is_empty() {
                    text.push_str(trimmed);
                }
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                text.push_str(std::str::from_utf8(&raw)?);
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CodecError::Message("unclosed element".to_owned()));
    }
    root.ok_or_else(|| CodecError::Message("no root element".to_owned()))
}

/// Adds a child value to its parent's fields, folding repeated sibling names
/// into a sequence.
fn attach(fields: &mut Vec<(String, Value)>, name: String, value: Value) {
    if let Some((_, existing)) = fields.iter_mut().find(|(k, _)| *k == name) {
        match existing {
            Value::Seq(items) => items.push(value),
            _ => {
                let first = std::mem::replace(existing, Value::Null);
                *existing = Value::Seq(vec![first, value]);
            }
        }
    } else {
        fields.push((name, value));
    }
}

pub(super) fn render(value: &Value) -> Result<Vec<u8>, CodecError> {
    let Value::Record(record) = value else {
        return Err(CodecError::Unrepresentable("an XML document needs a record at the root"));
    };
    if record.name.is_empty() {
        return Err(CodecError::Unrepresentable("an XML root element needs a payload type name"));
    }

    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(BytesStart::new(record.name.as_str())))?;
    for (name, field) in &record.fields {
        write_element(&mut writer, name, field)?;
    }
    writer.write_event(Event::End(BytesEnd::new(record.name.as_str())))?;
    Ok(writer.into_inner())
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &Value,
) -> Result<(), CodecError> {
    // A sequence repeats its element name, one element per item.
    if let Value::Seq(items) = value {
        for item in items {
            write_element(writer, name, item)?;
        }
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    write_content(writer, value)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_content(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => write_text(writer, &b.to_string())?,
        Value::Int(n) => write_text(writer, &n.to_string())?,
        Value::UInt(n) => write_text(writer, &n.to_string())?,
        Value::Float(n) => write_text(writer, &n.to_string())?,
        Value::Str(s) => write_text(writer, s)?,
        Value::Bytes(b) => write_text(writer, std::str::from_utf8(b)?)?,
        Value::Record(record) => {
            for (name, field) in &record.fields {
                write_element(writer, name, field)?;
            }
        }
        // Handled by write_element.
        Value::Seq(_) => {
            return Err(CodecError::Unrepresentable("a sequence cannot nest directly in XML"));
        }
    }
    Ok(())
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), CodecError> {
    writer.write_event(Event::Text(BytesText::new(text)))?;
    Ok(())
}
