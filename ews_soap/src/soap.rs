/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! SOAP envelope construction and parsing.

use std::io::Write;

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use crate::{
    ops::Operation,
    response::ResponseCode,
    value::{Object, Value},
    Error, MESSAGES_NS_URI, SOAP_NS_URI, TYPES_NS_URI,
};

/// The Exchange Server version identifiers allowed in `RequestServerVersion`
/// headers.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/requestserverversion#version-attribute-values>
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeServerVersion {
    Exchange2007,
    Exchange2007_SP1,
    Exchange2010,
    Exchange2010_SP1,
    Exchange2010_SP2,
    Exchange2013,
    Exchange2013_SP1,
}

impl ExchangeServerVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeServerVersion::Exchange2007 => "Exchange2007",
            ExchangeServerVersion::Exchange2007_SP1 => "Exchange2007_SP1",
            ExchangeServerVersion::Exchange2010 => "Exchange2010",
            ExchangeServerVersion::Exchange2010_SP1 => "Exchange2010_SP1",
            ExchangeServerVersion::Exchange2010_SP2 => "Exchange2010_SP2",
            ExchangeServerVersion::Exchange2013 => "Exchange2013",
            ExchangeServerVersion::Exchange2013_SP1 => "Exchange2013_SP1",
        }
    }
}

/// Parses the provided string into a known version identifier.
impl TryFrom<&str> for ExchangeServerVersion {
    /// If the provided string could not be turned into a known version
    /// identifier, [`Error::UnknownServerVersion`] is returned.
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Exchange2007" => Ok(ExchangeServerVersion::Exchange2007),
            "Exchange2007_SP1" => Ok(ExchangeServerVersion::Exchange2007_SP1),
            "Exchange2010" => Ok(ExchangeServerVersion::Exchange2010),
            "Exchange2010_SP1" => Ok(ExchangeServerVersion::Exchange2010_SP1),
            "Exchange2010_SP2" => Ok(ExchangeServerVersion::Exchange2010_SP2),
            "Exchange2013" => Ok(ExchangeServerVersion::Exchange2013),
            "Exchange2013_SP1" => Ok(ExchangeServerVersion::Exchange2013_SP1),

            _ => Err(Error::UnknownServerVersion(value.to_owned())),
        }
    }
}

/// The `soap:Header` contents attached to an outgoing request.
#[derive(Clone, Debug)]
pub struct RequestHeaders {
    /// The schema version targeted by the attached request.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/requestserverversion>
    pub server_version: ExchangeServerVersion,

    /// The SMTP address of the account to act as, if any.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/exchangeimpersonation>
    pub impersonated_mailbox: Option<String>,
}

/// A SOAP envelope containing the body of an EWS operation.
///
/// See <https://www.w3.org/TR/2000/NOTE-SOAP-20000508/#_Toc478383494>
#[derive(Clone, Debug)]
pub struct RequestEnvelope<B> {
    pub headers: RequestHeaders,
    pub body: B,
}

impl<B> RequestEnvelope<B>
where
    B: Operation,
{
    /// Serializes the SOAP envelope as a complete XML document.
    pub fn as_xml_document(&self) -> Result<Vec<u8>, Error> {
        const SOAP_ENVELOPE: &str = "soap:Envelope";
        const SOAP_HEADER: &str = "soap:Header";
        const SOAP_BODY: &str = "soap:Body";

        let mut writer = {
            let inner: Vec<u8> = Default::default();
            Writer::new(inner)
        };

        // All EWS examples use XML 1.0 with UTF-8, so stick to that for now.
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        // The envelope and its top-level children are written by hand in
        // order to control the namespace declarations they carry.
        writer.write_event(Event::Start(BytesStart::new(SOAP_ENVELOPE).with_attributes([
            ("xmlns:soap", SOAP_NS_URI),
            ("xmlns:m", MESSAGES_NS_URI),
            ("xmlns:t", TYPES_NS_URI),
        ])))?;

        writer.write_event(Event::Start(BytesStart::new(SOAP_HEADER)))?;

        let mut version = BytesStart::new("t:RequestServerVersion");
        version.push_attribute(("Version", self.headers.server_version.as_str()));
        writer.write_event(Event::Empty(version))?;

        if let Some(address) = &self.headers.impersonated_mailbox {
            write_impersonation_header(&mut writer, address)?;
        }

        writer.write_event(Event::End(BytesEnd::new(SOAP_HEADER)))?;

        writer.write_event(Event::Start(BytesStart::new(SOAP_BODY)))?;

        // Write the operation itself.
        self.body.to_value()?.serialize_into(&mut writer, B::NAME, 0)?;

        writer.write_event(Event::End(BytesEnd::new(SOAP_BODY)))?;
        writer.write_event(Event::End(BytesEnd::new(SOAP_ENVELOPE)))?;

        Ok(writer.into_inner())
    }
}

fn write_impersonation_header<W: Write>(
    writer: &mut Writer<W>,
    address: &str,
) -> Result<(), Error> {
    writer.write_event(Event::Start(BytesStart::new("t:ExchangeImpersonation")))?;
    writer.write_event(Event::Start(BytesStart::new("t:ConnectingSID")))?;

    writer.write_event(Event::Start(BytesStart::new("t:PrimarySmtpAddress")))?;
    writer.write_event(Event::Text(BytesText::new(address)))?;
    writer.write_event(Event::End(BytesEnd::new("t:PrimarySmtpAddress")))?;

    writer.write_event(Event::End(BytesEnd::new("t:ConnectingSID")))?;
    writer.write_event(Event::End(BytesEnd::new("t:ExchangeImpersonation")))?;

    Ok(())
}

/// A parsed SOAP response envelope.
#[derive(Clone, Debug)]
pub struct ResponseEnvelope {
    server_version: Option<String>,
    body: Value,
}

impl ResponseEnvelope {
    /// Parses a response document into a generic value tree.
    ///
    /// Namespace prefixes are stripped from element and attribute names.
    /// Servers differ in the prefixes they declare, and response content is
    /// unambiguous without them.
    pub fn parse(document: &str) -> Result<Self, Error> {
        let root = read_document(document)?;

        let server_version = root
            .get("Header")
            .and_then(|header| header.get("ServerVersionInfo"))
            .and_then(|info| info.attribute("Version"))
            .map(str::to_owned);

        let body = root
            .into_child("Body")
            .ok_or_else(|| Error::MissingElement("Body".to_owned()))?;

        if let Some(fault) = body.get("Fault") {
            return Err(Error::RequestFault(Box::new(Fault::from_value(fault))));
        }

        Ok(Self {
            server_version,
            body,
        })
    }

    /// The version identifier reported by the responding server, if any.
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    /// The contents of the `soap:Body` element.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the response element matching the named operation.
    ///
    /// Every operation's response is wrapped in an element named after the
    /// operation, e.g. `GetItemResponse` for `GetItem`.
    pub fn operation_response(&self, operation_name: &str) -> Result<&Value, Error> {
        let name = format!("{operation_name}Response");

        self.body.get(&name).ok_or(Error::MissingElement(name))
    }

    /// Consumes the envelope and returns the response element matching the
    /// named operation.
    pub fn into_operation_response(self, operation_name: &str) -> Result<Value, Error> {
        let name = format!("{operation_name}Response");

        self.body.into_child(&name).ok_or(Error::MissingElement(name))
    }
}

/// A structured representation of a SOAP fault, indicating an error in an
/// EWS request.
///
/// See <https://www.w3.org/TR/2000/NOTE-SOAP-20000508/#_Toc478383507>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    /// An error code indicating the fault in the original request.
    pub faultcode: String,

    /// A human-readable description of the error.
    pub faultstring: String,

    /// A URI indicating the SOAP actor responsible for the error.
    pub faultactor: Option<String>,

    /// Clarifying information about EWS-specific errors.
    pub detail: Option<FaultDetail>,
}

impl Fault {
    fn from_value(value: &Value) -> Self {
        Self {
            faultcode: value.field_text("faultcode").unwrap_or_default().to_owned(),
            faultstring: value
                .field_text("faultstring")
                .unwrap_or_default()
                .to_owned(),
            faultactor: value.field_text("faultactor").map(str::to_owned),
            detail: value.get("detail").map(FaultDetail::from_value),
        }
    }

    /// The delay the server asked for before this request is retried, if
    /// the fault describes a throttling condition.
    pub fn back_off_milliseconds(&self) -> Option<u64> {
        self.detail
            .as_ref()
            .and_then(|detail| detail.back_off_milliseconds)
    }
}

/// EWS-specific details regarding a SOAP fault.
///
/// This element is not documented in the EWS reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaultDetail {
    /// An error code indicating the nature of the issue.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/responsecode>
    pub response_code: Option<ResponseCode>,

    /// A human-readable description of the error.
    pub message: Option<String>,

    /// The retry delay attached to `ErrorServerBusy` faults.
    pub back_off_milliseconds: Option<u64>,
}

impl FaultDetail {
    fn from_value(value: &Value) -> Self {
        Self {
            response_code: value.field_text("ResponseCode").map(ResponseCode::from),
            message: value.field_text("Message").map(str::to_owned),
            back_off_milliseconds: crate::response::back_off_milliseconds(value),
        }
    }
}

/// Collects an XML document into a single value spanning the root element.
fn read_document(document: &str) -> Result<Value, Error> {
    let mut reader = Reader::from_str(document);

    // Elements still being read live on a stack, with the innermost on top.
    // Completed elements attach to their parent as they close.
    let mut stack: Vec<(String, Object)> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push((element_name(&start), read_attributes(&start)?));
            }

            Event::Empty(start) => {
                let name = element_name(&start);
                let value = complete_element(read_attributes(&start)?);

                match stack.last_mut() {
                    Some((_, parent)) => parent.push_child(name, value),
                    None => return Ok(value),
                }
            }

            Event::End(_) => {
                let Some((name, element)) = stack.pop() else {
                    return Err(Error::MalformedDocument(
                        "end tag without matching start tag",
                    ));
                };

                let value = complete_element(element);

                match stack.last_mut() {
                    Some((_, parent)) => parent.push_child(name, value),
                    None => return Ok(value),
                }
            }

            Event::Text(text) => {
                if let Some((_, element)) = stack.last_mut() {
                    element.append_text(&text.unescape()?);
                }
            }

            Event::CData(data) => {
                if let Some((_, element)) = stack.last_mut() {
                    element.append_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }

            Event::Eof => {
                return Err(Error::MalformedDocument(
                    "document ended before the root element was closed",
                ));
            }

            Event::Decl(_) | Event::DocType(_) | Event::PI(_) | Event::Comment(_) => {}
        }
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn read_attributes(start: &BytesStart<'_>) -> Result<Object, Error> {
    let mut object = Object::new();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;

        // Namespace declarations are not content.
        if attribute.key.as_ref().starts_with(b"xmlns") {
            continue;
        }

        let name = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value()?;

        object.push_attribute(name, value.into_owned());
    }

    Ok(object)
}

/// Finishes an element once its end tag is reached.
///
/// Elements with no attributes or children collapse to their text content.
/// Indentation between child elements is not content and is dropped.
fn complete_element(mut element: Object) -> Value {
    let text = element.take_text();

    if !element.has_attributes() && !element.has_children() {
        return Value::Scalar(text.unwrap_or_default());
    }

    match text.filter(|text| !text.trim().is_empty()) {
        Some(text) => Value::Object(element.text(text)),
        None => Value::Object(element),
    }
}
