/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Structures for processing the contents of operation responses.

use std::fmt;

use thiserror::Error;

use crate::{value::Value, Error as CrateError};

/// The success/failure status of an individual response message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Warning,
    Error,
}

/// A code describing the outcome of an individual response message.
///
/// Codes are carried as strings rather than a closed enumeration. The server
/// defines several hundred of them and adds more across versions, and callers
/// only ever match on the handful they understand.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/responsecode>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseCode(String);

impl ResponseCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this code signals a successful operation.
    pub fn is_success(&self) -> bool {
        self.0 == "NoError"
    }

    /// Whether this code signals that the server is throttling requests.
    pub fn is_server_busy(&self) -> bool {
        self.0 == "ErrorServerBusy"
    }
}

impl From<String> for ResponseCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ResponseCode {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl PartialEq<&str> for ResponseCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

/// An error taking the place of an operation's results in a response
/// message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("server responded with {response_code}: {message_text}")]
pub struct ResponseError {
    /// The `MessageText` element's contents, if present.
    pub message_text: String,

    /// The `ResponseCode` element's contents.
    pub response_code: ResponseCode,

    /// The retry delay attached to `ErrorServerBusy` errors.
    pub back_off_milliseconds: Option<u64>,
}

/// A single response message within an operation response.
///
/// Operations take batches of inputs, and a response carries one response
/// message per input, each succeeding or failing on its own.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/responsemessages>
#[derive(Clone, Debug)]
pub struct ResponseMessage<'a> {
    class: ResponseClass,
    code: Option<ResponseCode>,
    message_text: Option<&'a str>,
    back_off_milliseconds: Option<u64>,
    content: &'a Value,
}

impl<'a> ResponseMessage<'a> {
    fn from_value(value: &'a Value) -> Result<Self, CrateError> {
        let class = match value.attribute("ResponseClass") {
            Some("Success") => ResponseClass::Success,
            Some("Warning") => ResponseClass::Warning,
            Some("Error") => ResponseClass::Error,

            Some(_) => {
                return Err(CrateError::MalformedDocument(
                    "unrecognized ResponseClass attribute",
                ))
            }
            None => return Err(CrateError::MissingElement("ResponseClass".to_owned())),
        };

        Ok(Self {
            class,
            code: value.field_text("ResponseCode").map(ResponseCode::from),
            message_text: value.field_text("MessageText"),
            back_off_milliseconds: back_off_milliseconds(value),
            content: value,
        })
    }

    pub fn class(&self) -> ResponseClass {
        self.class
    }

    pub fn response_code(&self) -> Option<&ResponseCode> {
        self.code.as_ref()
    }

    /// The message element itself, for navigating operation-specific
    /// content.
    pub fn content(&self) -> &'a Value {
        self.content
    }

    /// The retry delay requested by the server, if this message describes a
    /// throttling condition.
    pub fn back_off_milliseconds(&self) -> Option<u64> {
        self.back_off_milliseconds
    }

    /// Builds the error description for a message whose class is `Error`.
    pub fn to_error(&self) -> Result<ResponseError, CrateError> {
        let response_code = self
            .code
            .clone()
            .ok_or_else(|| CrateError::MissingElement("ResponseCode".to_owned()))?;

        Ok(ResponseError {
            message_text: self.message_text.unwrap_or_default().to_owned(),
            response_code,
            back_off_milliseconds: self.back_off_milliseconds,
        })
    }
}

/// Collects the individual response messages out of an operation response
/// element.
///
/// The returned list carries one message per input the operation was given,
/// in input order. An empty list is not itself an error; callers decide how
/// many messages they expect.
pub fn response_messages<'a>(
    response: &'a Value,
    operation_name: &str,
) -> Result<Vec<ResponseMessage<'a>>, CrateError> {
    let container = response
        .get("ResponseMessages")
        .ok_or_else(|| CrateError::MissingElement("ResponseMessages".to_owned()))?;

    container
        .sequence(&format!("{operation_name}ResponseMessage"))
        .into_iter()
        .map(ResponseMessage::from_value)
        .collect()
}

/// Extracts the retry delay from a `MessageXml` element nested under the
/// given element, if one is present.
pub(crate) fn back_off_milliseconds(container: &Value) -> Option<u64> {
    container
        .get("MessageXml")?
        .sequence("Value")
        .into_iter()
        .find(|entry| entry.attribute("Name") == Some("BackOffMilliseconds"))
        .and_then(|entry| entry.text())
        .and_then(|text| text.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::soap::ResponseEnvelope;

    fn parse_response(document: &str) -> crate::value::Value {
        let envelope = ResponseEnvelope::parse(document).expect("deserialization should succeed");
        envelope
            .operation_response("GetItem")
            .expect("response element should be present")
            .clone()
    }

    #[test]
    fn collects_response_messages_in_order() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
                     <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                         <s:Body>
                             <m:GetItemResponse
                                 xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                                 xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
                                 <m:ResponseMessages>
                                     <m:GetItemResponseMessage ResponseClass="Success">
                                         <m:ResponseCode>NoError</m:ResponseCode>
                                         <m:Items><t:Message><t:Subject>first</t:Subject></t:Message></m:Items>
                                     </m:GetItemResponseMessage>
                                     <m:GetItemResponseMessage ResponseClass="Success">
                                         <m:ResponseCode>NoError</m:ResponseCode>
                                         <m:Items><t:Message><t:Subject>second</t:Subject></t:Message></m:Items>
                                     </m:GetItemResponseMessage>
                                 </m:ResponseMessages>
                             </m:GetItemResponse>
                         </s:Body>
                     </s:Envelope>"#;

        let response = parse_response(xml);
        let messages =
            response_messages(&response, "GetItem").expect("messages should be collected");

        assert_eq!(messages.len(), 2, "should collect one message per item");

        let subjects = messages
            .iter()
            .map(|message| {
                assert_eq!(message.class(), ResponseClass::Success);
                message
                    .content()
                    .get("Items")
                    .and_then(|items| items.get("Message"))
                    .and_then(|item| item.field_text("Subject"))
                    .expect("subject should be present")
            })
            .collect::<Vec<_>>();

        assert_eq!(subjects, ["first", "second"], "input order should be kept");
    }

    #[test]
    fn collects_nothing_from_empty_response_messages() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><m:GetItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"><m:ResponseMessages/></m:GetItemResponse></s:Body></s:Envelope>"#;

        // The self-closed container parses to an empty scalar, and a missing
        // message sequence is an empty batch.
        let response = parse_response(xml);
        let messages =
            response_messages(&response, "GetItem").expect("messages should be collected");

        assert!(messages.is_empty());
    }

    #[test]
    fn error_message_converts_to_response_error() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
                     <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                         <s:Body>
                             <m:GetItemResponse
                                 xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">
                                 <m:ResponseMessages>
                                     <m:GetItemResponseMessage ResponseClass="Error">
                                         <m:MessageText>The specified object was not found in the store.</m:MessageText>
                                         <m:ResponseCode>ErrorItemNotFound</m:ResponseCode>
                                         <m:DescriptiveLinkKey>0</m:DescriptiveLinkKey>
                                     </m:GetItemResponseMessage>
                                 </m:ResponseMessages>
                             </m:GetItemResponse>
                         </s:Body>
                     </s:Envelope>"#;

        let response = parse_response(xml);
        let messages =
            response_messages(&response, "GetItem").expect("messages should be collected");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].class(), ResponseClass::Error);

        let error = messages[0].to_error().expect("error should be described");
        assert_eq!(error.response_code, "ErrorItemNotFound");
        assert_eq!(
            error.message_text,
            "The specified object was not found in the store."
        );
        assert_eq!(error.back_off_milliseconds, None);
        assert_eq!(
            error.to_string(),
            "server responded with ErrorItemNotFound: The specified object was not found in the store."
        );
    }

    #[test]
    fn server_busy_message_carries_back_off_delay() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
                     <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                         <s:Body>
                             <m:GetItemResponse
                                 xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                                 xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
                                 <m:ResponseMessages>
                                     <m:GetItemResponseMessage ResponseClass="Error">
                                         <m:MessageText>The server cannot service this request right now. Try again later.</m:MessageText>
                                         <m:ResponseCode>ErrorServerBusy</m:ResponseCode>
                                         <m:DescriptiveLinkKey>0</m:DescriptiveLinkKey>
                                         <m:MessageXml>
                                             <t:Value Name="BackOffMilliseconds">5000</t:Value>
                                         </m:MessageXml>
                                     </m:GetItemResponseMessage>
                                 </m:ResponseMessages>
                             </m:GetItemResponse>
                         </s:Body>
                     </s:Envelope>"#;

        let response = parse_response(xml);
        let messages =
            response_messages(&response, "GetItem").expect("messages should be collected");

        let code = messages[0].response_code().expect("code should be present");
        assert!(code.is_server_busy());
        assert_eq!(messages[0].back_off_milliseconds(), Some(5000));
    }

    #[test]
    fn warning_message_keeps_its_content() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><m:GetItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages" xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types"><m:ResponseMessages><m:GetItemResponseMessage ResponseClass="Warning"><m:MessageText>Some items could not be resolved.</m:MessageText><m:ResponseCode>ErrorBatchProcessingStopped</m:ResponseCode><m:Items><t:Message><t:Subject>partial</t:Subject></t:Message></m:Items></m:GetItemResponseMessage></m:ResponseMessages></m:GetItemResponse></s:Body></s:Envelope>"#;

        let response = parse_response(xml);
        let messages =
            response_messages(&response, "GetItem").expect("messages should be collected");

        assert_eq!(messages[0].class(), ResponseClass::Warning);
        assert_eq!(
            messages[0].response_code(),
            Some(&ResponseCode::from("ErrorBatchProcessingStopped"))
        );
        assert_eq!(
            messages[0]
                .content()
                .get("Items")
                .and_then(|items| items.get("Message"))
                .and_then(|item| item.field_text("Subject")),
            Some("partial")
        );
    }

    #[test]
    fn message_without_response_class_is_an_error() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><m:GetItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"><m:ResponseMessages><m:GetItemResponseMessage><m:ResponseCode>NoError</m:ResponseCode></m:GetItemResponseMessage></m:ResponseMessages></m:GetItemResponse></s:Body></s:Envelope>"#;

        let response = parse_response(xml);

        match response_messages(&response, "GetItem") {
            Err(CrateError::MissingElement(name)) => assert_eq!(name, "ResponseClass"),
            other => panic!("expected missing element error, got: {other:?}"),
        }
    }

    #[test]
    fn response_code_matches_known_values() {
        let code = ResponseCode::from("NoError");
        assert!(code.is_success());
        assert!(!code.is_server_busy());
        assert_eq!(code, "NoError");

        let code = ResponseCode::from("ErrorServerBusy");
        assert!(!code.is_success());
        assert!(code.is_server_busy());
    }
}
