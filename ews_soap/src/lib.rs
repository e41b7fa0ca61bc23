/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Serialization and parsing of EWS operations.
//!
//! Requests are built as XML documents wrapped in SOAP envelopes, and
//! responses are parsed into a generic value tree which operations navigate
//! by name. No transport is provided here; consumers hand the serialized
//! document to whatever HTTP machinery they use and feed the response body
//! back.

use thiserror::Error;

pub mod ops;
pub mod response;
pub mod soap;
#[cfg(test)]
mod test_utils;
pub mod types;
pub mod value;

pub use ops::Operation;
pub use response::{ResponseClass, ResponseCode, ResponseError};
pub use soap::{
    ExchangeServerVersion, Fault, FaultDetail, RequestEnvelope, RequestHeaders, ResponseEnvelope,
};
pub use types::*;
pub use value::{Object, Value};

pub(crate) const MESSAGES_NS_URI: &str =
    "http://schemas.microsoft.com/exchange/services/2006/messages";
pub(crate) const SOAP_NS_URI: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub(crate) const TYPES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

#[derive(Debug, Error)]
pub enum Error {
    #[error("error manipulating XML data")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to format date/time value")]
    TimeFormat(#[from] time::error::Format),

    #[error("failed to parse date/time value")]
    TimeParse(#[from] time::error::Parse),

    #[error("request resulted in a fault: {}", .0.faultstring)]
    RequestFault(Box<soap::Fault>),

    #[error("response is missing {0}")]
    MissingElement(String),

    #[error("malformed XML document: {0}")]
    MalformedDocument(&'static str),

    #[error("unrecognized server version identifier: {0}")]
    UnknownServerVersion(String),
}
