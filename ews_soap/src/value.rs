/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! A generic tree representation of EWS request and response payloads.
//!
//! Operations are described as a [`Value`] tree rather than one serde type
//! per schema element: EWS payloads are deeply nested, the server tolerates
//! omitted optional elements, and responses collapse repeated fields in ways
//! that are awkward to capture with rigid types (see [`Value::normalized`]).
//! Typed operation builders in [`crate::ops`] assemble these trees; the
//! response reader in [`crate::soap`] produces them.

use std::io::Write;

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::Error;

/// A single node in a request or response payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Text content, either an element's character data or a leaf field.
    Scalar(String),

    /// An element with attributes and/or named children.
    Object(Object),

    /// A repeated element. When serialized under a field name, every entry
    /// is written as a separate element of that name.
    Sequence(Vec<Value>),
}

impl Value {
    /// Returns the inner object, if this value is one.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the text carried by this value, either scalar content or the
    /// character data of an element which also carries attributes.
    pub fn text(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => Some(text),
            Value::Object(object) => object.text.as_deref(),
            Value::Sequence(_) => None,
        }
    }

    /// Looks up a named child, if this value is an object.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|object| object.get(name))
    }

    /// Returns the text content of a named child.
    pub fn field_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::text)
    }

    /// Returns an attribute value, if this value is an object.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_object().and_then(|object| object.attribute(name))
    }

    /// Returns a named child as a sequence, regardless of its wire shape.
    ///
    /// See [`Object::sequence`].
    pub fn sequence(&self, name: &str) -> Vec<&Value> {
        match self.as_object() {
            Some(object) => object.sequence(name),
            None => Vec::new(),
        }
    }

    /// Collects every child of this value along with its name, flattening
    /// repeated fields into their entries.
    ///
    /// Container elements such as `Items` hold children of several possible
    /// names; this is the accessor for walking them without naming each.
    pub fn entries(&self) -> Vec<(&str, &Value)> {
        match self.as_object() {
            Some(object) => object.entries(),
            None => Vec::new(),
        }
    }

    /// Unwraps this value into the entries of a sequence.
    ///
    /// A bare value becomes a one-entry sequence. The wire format collapses
    /// a repeated field holding a single entry into a bare element and omits
    /// the field entirely when it is empty, so consumers of repeated fields
    /// must never branch on the wire shape; this is the uniform conversion.
    pub fn into_sequence(self) -> Vec<Value> {
        match self {
            Value::Sequence(entries) => entries,
            value => vec![value],
        }
    }

    /// Rewraps this value as an explicit sequence. Idempotent: normalizing
    /// an already-normalized value returns it unchanged.
    pub fn normalized(self) -> Value {
        Value::Sequence(self.into_sequence())
    }

    /// Moves the named child out of this value.
    pub(crate) fn into_child(self, name: &str) -> Option<Value> {
        match self {
            Value::Object(object) => object
                .children
                .into_iter()
                .find(|(child_name, _)| child_name == name)
                .map(|(_, child)| child),
            _ => None,
        }
    }

    /// Writes this value as an XML element named `name`.
    ///
    /// `depth` is the nesting level relative to the operation element. The
    /// operation element and its direct children live in the messages
    /// namespace; everything nested deeper lives in the types namespace.
    /// Attributes are written unprefixed.
    pub(crate) fn serialize_into<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        depth: usize,
    ) -> Result<(), Error> {
        let qualified = qualify(name, depth);

        match self {
            Value::Scalar(text) => {
                writer.write_event(Event::Start(BytesStart::new(qualified.as_str())))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new(qualified.as_str())))?;
            }

            Value::Sequence(entries) => {
                for entry in entries {
                    entry.serialize_into(writer, name, depth)?;
                }
            }

            Value::Object(object) => {
                let mut start = BytesStart::new(qualified.as_str());
                for (attr_name, attr_value) in &object.attributes {
                    start.push_attribute((attr_name.as_str(), attr_value.as_str()));
                }

                if object.children.is_empty() && object.text.is_none() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;

                    if let Some(text) = &object.text {
                        writer.write_event(Event::Text(BytesText::new(text)))?;
                    }

                    for (child_name, child) in &object.children {
                        child.serialize_into(writer, child_name, depth + 1)?;
                    }

                    writer.write_event(Event::End(BytesEnd::new(qualified.as_str())))?;
                }
            }
        }

        Ok(())
    }
}

fn qualify(name: &str, depth: usize) -> String {
    if depth <= 1 {
        format!("m:{name}")
    } else {
        format!("t:{name}")
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(if value { "true" } else { "false" }.to_owned())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

/// An element node: attributes, optional character data and named children,
/// all in insertion order. The wire schema is sequence-ordered, so order is
/// significant on the request path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Object {
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Adds an attribute if the value is present.
    pub fn opt_attr<V: Into<String>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Adds a named child.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.children.push((name.into(), value.into()));
        self
    }

    /// Adds a named child if the value is present.
    pub fn opt_field<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    /// Sets the element's character data.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Returns the first child with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.children
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, value)| value)
    }

    /// Returns an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the named child as a sequence: absent fields yield an empty
    /// sequence, a bare value yields a one-entry sequence and an explicit
    /// sequence yields its entries. Applies uniformly to every repeated
    /// field; callers must not special-case the wire shape per field.
    pub fn sequence(&self, name: &str) -> Vec<&Value> {
        match self.get(name) {
            None => Vec::new(),
            Some(Value::Sequence(entries)) => entries.iter().collect(),
            Some(value) => vec![value],
        }
    }

    /// Collects every child along with its name, flattening repeated fields
    /// into their entries.
    pub fn entries(&self) -> Vec<(&str, &Value)> {
        let mut entries = Vec::new();

        for (name, child) in &self.children {
            match child {
                Value::Sequence(values) => {
                    entries.extend(values.iter().map(|value| (name.as_str(), value)))
                }
                value => entries.push((name.as_str(), value)),
            }
        }

        entries
    }

    pub(crate) fn push_attribute(&mut self, name: String, value: String) {
        self.attributes.push((name, value));
    }

    /// Inserts a child read off the wire. Repeated sibling names are
    /// promoted to a [`Value::Sequence`] so that repetition survives in the
    /// tree even though each sibling arrives as a separate element.
    pub(crate) fn push_child(&mut self, name: String, value: Value) {
        match self
            .children
            .iter_mut()
            .find(|(child_name, _)| *child_name == name)
        {
            Some((_, Value::Sequence(entries))) => entries.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Value::Sequence(Vec::new()));
                *existing = Value::Sequence(vec![first, value]);
            }
            None => self.children.push((name, value)),
        }
    }

    pub(crate) fn append_text(&mut self, chunk: &str) {
        match &mut self.text {
            Some(text) => text.push_str(chunk),
            None => self.text = Some(chunk.to_owned()),
        }
    }

    pub(crate) fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub(crate) fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn take_text(&mut self) -> Option<String> {
        self.text.take()
    }
}
