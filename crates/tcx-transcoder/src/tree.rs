//! Namespace-aware element tree for the input document.
//!
//! Only what the transcoder reads is kept: resolved element names, unprefixed
//! attributes, and the text that precedes an element's first child. Comments,
//! processing instructions and tail text are dropped while parsing.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::errors::TranscodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub namespace: Option<String>,
    pub local_name: String,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

impl Element {
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    /// Value of an attribute written without a prefix.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.namespace.is_none() && attr.local_name == local_name)
            .map(|attr| attr.value.as_str())
    }

    /// All elements below this one in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant with the given qualified name.
    pub fn find(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        self.descendants().find(|element| element.is(namespace, local_name))
    }

    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants()
            .filter(move |element| element.is(namespace, local_name))
    }

    /// First descendant with the given name whose text is present and non-empty.
    pub fn find_text(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.find(namespace, local_name)
            .and_then(|element| element.text.as_deref())
            .filter(|text| !text.is_empty())
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Parses a complete document and returns its root element.
pub fn parse_document(input: &[u8]) -> Result<Element, TranscodeError> {
    let mut reader = NsReader::from_reader(input);
    let mut buf = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| TranscodeError::malformed(position, err.to_string()))?;

        match event {
            Event::Start(start) => {
                let element = open_element(&reader, &start, position)?;
                open.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, &start, position)?;
                close_element(element, &mut open, &mut root, position)?;
            }
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| TranscodeError::malformed(position, "unexpected end tag"))?;
                close_element(element, &mut open, &mut root, position)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| TranscodeError::malformed(position, err.to_string()))?;
                push_text(&mut open, text, position)?;
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let text = std::str::from_utf8(&raw)
                    .map_err(|err| TranscodeError::malformed(position, err.to_string()))?;
                push_text(&mut open, Cow::Borrowed(text), position)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.last() {
        return Err(TranscodeError::malformed(
            reader.buffer_position() as u64,
            format!("unclosed element '{}'", unclosed.local_name),
        ));
    }

    root.ok_or_else(|| {
        TranscodeError::malformed(reader.buffer_position() as u64, "no root element found")
    })
}

fn open_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<Element, TranscodeError> {
    let (resolved, local) = reader.resolve_element(start.name());
    let namespace = resolved_namespace(resolved, position)?;
    let local_name = decode(local.into_inner(), position)?;

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| TranscodeError::malformed(position, err.to_string()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let namespace = resolved_namespace(resolved, position)?;
        let local_name = decode(local.into_inner(), position)?;
        let value = attr
            .unescape_value()
            .map_err(|err| TranscodeError::malformed(position, err.to_string()))?
            .into_owned();
        attributes.push(Attribute {
            namespace,
            local_name,
            value,
        });
    }

    Ok(Element {
        namespace,
        local_name,
        attributes,
        text: None,
        children: Vec::new(),
    })
}

fn close_element(
    element: Element,
    open: &mut [Element],
    root: &mut Option<Element>,
    position: u64,
) -> Result<(), TranscodeError> {
    match open.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(TranscodeError::malformed(position, "junk after document element")),
    }
}

fn push_text(
    open: &mut [Element],
    text: Cow<'_, str>,
    position: u64,
) -> Result<(), TranscodeError> {
    match open.last_mut() {
        // Tail text after a child is not part of the element's own text.
        Some(element) if element.children.is_empty() => {
            element.text.get_or_insert_with(String::new).push_str(&text);
            Ok(())
        }
        Some(_) => Ok(()),
        None if text.trim().is_empty() => Ok(()),
        None => Err(TranscodeError::malformed(
            position,
            "text outside of the document element",
        )),
    }
}

fn resolved_namespace(
    resolved: ResolveResult<'_>,
    position: u64,
) -> Result<Option<String>, TranscodeError> {
    match resolved {
        ResolveResult::Bound(namespace) => decode(namespace.into_inner(), position).map(Some),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(TranscodeError::malformed(
            position,
            format!("unbound prefix '{}'", String::from_utf8_lossy(&prefix)),
        )),
    }
}

fn decode(bytes: &[u8], position: u64) -> Result<String, TranscodeError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| TranscodeError::malformed(position, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:test";

    #[test]
    fn descendants_are_in_document_order() {
        let root = parse_document(br#"<a xmlns="urn:test"><b><c/></b><d>text</d></a>"#)
            .expect("document should parse");

        let names: Vec<&str> = root
            .descendants()
            .map(|element| element.local_name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "c", "d"]);
        assert_eq!(root.find_text(NS, "d"), Some("text"));
    }

    #[test]
    fn prefixed_elements_resolve_to_their_namespace() {
        let root = parse_document(
            br#"<a xmlns="urn:test" xmlns:x="urn:other"><x:b>1</x:b><b>2</b></a>"#,
        )
        .expect("document should parse");

        assert_eq!(root.find_text("urn:other", "b"), Some("1"));
        assert_eq!(root.find_text(NS, "b"), Some("2"));
    }

    #[test]
    fn text_keeps_entities_and_ignores_tail() {
        let root = parse_document(br#"<a xmlns="urn:test"><b>x &amp; y<c/>tail</b></a>"#)
            .expect("document should parse");

        let b = root.find(NS, "b").expect("b element");
        assert_eq!(b.text.as_deref(), Some("x & y"));
    }

    #[test]
    fn empty_element_has_no_text() {
        let root = parse_document(br#"<a xmlns="urn:test"><b></b><c/></a>"#)
            .expect("document should parse");

        assert!(root.find(NS, "b").expect("b").text.is_none());
        assert!(root.find(NS, "c").expect("c").text.is_none());
        assert_eq!(root.find_text(NS, "b"), None);
    }

    #[test]
    fn prefixed_attributes_are_not_plain_attributes() {
        let root = parse_document(br#"<a xmlns:x="urn:other" x:Sport="Biking" Id="7"/>"#)
            .expect("document should parse");

        assert_eq!(root.attribute("Sport"), None);
        assert_eq!(root.attribute("Id"), Some("7"));
    }

    #[test]
    fn rejects_documents_that_are_not_well_formed() {
        let cases: [&[u8]; 6] = [
            b"not xml",
            b"",
            b"<a><b></a>",
            b"<a>",
            b"<a/><b/>",
            b"<x:a/>",
        ];
        for case in cases {
            match parse_document(case) {
                Err(TranscodeError::MalformedInput { .. }) => {}
                other => panic!(
                    "expected MalformedInput for {:?}, got {other:?}",
                    String::from_utf8_lossy(case)
                ),
            }
        }
    }
}
