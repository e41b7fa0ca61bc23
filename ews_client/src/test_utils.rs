/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Test doubles and response fixtures shared across client tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use url::Url;

use crate::client::ClientConfig;
use crate::transport::Transport;

const MESSAGES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/messages";
const TYPES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

/// A scripted transport standing in for an HTTP stack.
///
/// Responses are replayed in the order they were queued; requests are
/// recorded for inspection. Session bracketing is counted so tests can
/// assert the acquire/release pairing.
pub(crate) struct MockTransport {
    replies: RefCell<VecDeque<Result<String, ntlm_http::Error>>>,
    requests: RefCell<Vec<String>>,
    acquire_error: RefCell<Option<ntlm_http::Error>>,
    acquired: Cell<usize>,
    released: Cell<usize>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        MockTransport {
            replies: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
            acquire_error: RefCell::new(None),
            acquired: Cell::new(0),
            released: Cell::new(0),
        }
    }

    /// Queues a response body.
    pub(crate) fn reply(self, body: impl Into<String>) -> Self {
        self.replies.borrow_mut().push_back(Ok(body.into()));
        self
    }

    /// Queues a send failure.
    pub(crate) fn fail(self, error: ntlm_http::Error) -> Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }

    /// Makes the next acquisition fail.
    pub(crate) fn fail_acquire(self, error: ntlm_http::Error) -> Self {
        *self.acquire_error.borrow_mut() = Some(error);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub(crate) fn acquired(&self) -> usize {
        self.acquired.get()
    }

    pub(crate) fn released(&self) -> usize {
        self.released.get()
    }
}

impl Transport for MockTransport {
    fn acquire(&self) -> Result<(), ntlm_http::Error> {
        self.acquired.set(self.acquired.get() + 1);

        match self.acquire_error.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn send(&self, _endpoint: &Url, body: &[u8]) -> Result<Vec<u8>, ntlm_http::Error> {
        self.requests
            .borrow_mut()
            .push(String::from_utf8_lossy(body).into_owned());

        self.replies
            .borrow_mut()
            .pop_front()
            .expect("test script ran out of replies")
            .map(String::into_bytes)
    }

    fn release(&self) {
        self.released.set(self.released.get() + 1);
    }
}

pub(crate) fn test_config() -> ClientConfig {
    ClientConfig::new(
        Url::parse("https://mail.example.com/EWS/Exchange.asmx").unwrap(),
        "EXAMPLE\\mailbot",
        "hunter2",
    )
}

/// Wraps response messages in the named operation's response element and a
/// SOAP envelope.
pub(crate) fn operation_response(op_name: &str, messages: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><m:{op_name}Response xmlns:m="{MESSAGES_NS}" xmlns:t="{TYPES_NS}"><m:ResponseMessages>{messages}</m:ResponseMessages></m:{op_name}Response></s:Body></s:Envelope>"#
    )
}

/// Like [`operation_response`], with a `ServerVersionInfo` header carrying
/// the given version identifier.
pub(crate) fn operation_response_with_version(
    version: &str,
    op_name: &str,
    messages: &str,
) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header><h:ServerVersionInfo MajorVersion="15" MinorVersion="0" Version="{version}" xmlns:h="{TYPES_NS}"/></s:Header><s:Body><m:{op_name}Response xmlns:m="{MESSAGES_NS}" xmlns:t="{TYPES_NS}"><m:ResponseMessages>{messages}</m:ResponseMessages></m:{op_name}Response></s:Body></s:Envelope>"#
    )
}

pub(crate) fn success_message(op_name: &str, content: &str) -> String {
    format!(
        r#"<m:{op_name}ResponseMessage ResponseClass="Success"><m:ResponseCode>NoError</m:ResponseCode>{content}</m:{op_name}ResponseMessage>"#
    )
}

pub(crate) fn error_message(op_name: &str, code: &str, text: &str) -> String {
    format!(
        r#"<m:{op_name}ResponseMessage ResponseClass="Error"><m:MessageText>{text}</m:MessageText><m:ResponseCode>{code}</m:ResponseCode><m:DescriptiveLinkKey>0</m:DescriptiveLinkKey></m:{op_name}ResponseMessage>"#
    )
}

/// An `ErrorServerBusy` response message asking for a retry after the given
/// delay.
pub(crate) fn busy_message(op_name: &str, delay_ms: u64) -> String {
    format!(
        r#"<m:{op_name}ResponseMessage ResponseClass="Error"><m:MessageText>The server cannot service this request right now.</m:MessageText><m:ResponseCode>ErrorServerBusy</m:ResponseCode><m:MessageXml><t:Value Name="BackOffMilliseconds">{delay_ms}</t:Value></m:MessageXml></m:{op_name}ResponseMessage>"#
    )
}
