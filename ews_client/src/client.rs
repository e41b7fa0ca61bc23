/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The Exchange mailbox client and its operation executor.
//!
//! The mailbox operations are grouped by concern in this module's
//! submodules. Every one of them funnels through
//! [`ExchangeClient::run_operation`], which owns serialization, session
//! bracketing, logging and the busy-retry loop.

mod calendar;
mod folders;
mod messages;
mod send_message;

use std::cell::Cell;
use std::env;
use std::fmt;
use std::thread;
use std::time::Duration;

use ews_soap::response::{response_messages, ResponseMessage};
use ews_soap::{
    BaseFolderId, ExchangeServerVersion, Operation, RequestEnvelope, RequestHeaders,
    ResponseClass, ResponseEnvelope, Value,
};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transport::{NtlmTransport, SessionGuard, Transport};

/// Environment variable name. When set, requests and responses are logged
/// in full, credentials and message content included.
const LOG_NETWORK_PAYLOADS_ENV_VAR: &str = "EWS_LOG_NETWORK_PAYLOADS";

/// Upper bound on attempts for a request the server keeps answering with a
/// busy signal. The server's requested back-off delay is honored between
/// attempts.
const MAX_BUSY_ATTEMPTS: u32 = 3;

/// The schema version to advertise before the server has reported which one
/// it speaks. Exchange Server 2007 SP1 keeps requests compatible with older
/// servers, and SP1 specifically introduced the identifier format that more
/// modern versions still use, which makes it preferable over plain Exchange
/// Server 2007.
const DEFAULT_SERVER_VERSION: ExchangeServerVersion = ExchangeServerVersion::Exchange2007_SP1;

/// Connection settings for an [`ExchangeClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) endpoint: Url,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) delegate: Option<String>,
    pub(crate) impersonation: Option<String>,
    pub(crate) server_version: ExchangeServerVersion,
}

impl ClientConfig {
    pub fn new(endpoint: Url, username: impl Into<String>, password: impl Into<String>) -> Self {
        ClientConfig {
            endpoint,
            username: username.into(),
            password: password.into(),
            delegate: None,
            impersonation: None,
            server_version: DEFAULT_SERVER_VERSION,
        }
    }

    /// Reads and writes the given mailbox instead of the account's own,
    /// using folder permissions granted to the account.
    pub fn with_delegate(mut self, email_address: impl Into<String>) -> Self {
        self.delegate = Some(email_address.into());
        self
    }

    /// Acts as the given mailbox outright. Requires impersonation rights on
    /// the account.
    pub fn with_impersonation(mut self, email_address: impl Into<String>) -> Self {
        self.impersonation = Some(email_address.into());
        self
    }

    /// Advertises a specific schema version instead of the default.
    pub fn with_server_version(mut self, server_version: ExchangeServerVersion) -> Self {
        self.server_version = server_version;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("delegate", &self.delegate)
            .field("impersonation", &self.impersonation)
            .field("server_version", &self.server_version)
            .finish()
    }
}

/// A client for one Exchange mailbox.
pub struct ExchangeClient<T> {
    config: ClientConfig,
    transport: T,
    server_version: Cell<ExchangeServerVersion>,
}

impl ExchangeClient<NtlmTransport> {
    /// Builds a client speaking NTLM-authenticated HTTP to the configured
    /// endpoint.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let credentials =
            ntlm_http::Credentials::new(config.username.clone(), config.password.clone());
        let transport = NtlmTransport::new(credentials, config.endpoint.clone())?;

        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ExchangeClient<T> {
    /// Builds a client over a caller-provided transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let server_version = Cell::new(config.server_version);

        ExchangeClient {
            config,
            transport,
            server_version,
        }
    }

    /// Runs one operation against the server and returns its response
    /// element with the envelope stripped.
    ///
    /// One invocation is one transport session: the transport is acquired
    /// before the request goes out and released when the call concludes,
    /// on the error paths included.
    pub(crate) fn run_operation<Op: Operation>(&self, op: Op) -> Result<Value> {
        let envelope = RequestEnvelope {
            headers: RequestHeaders {
                server_version: self.server_version.get(),
                impersonated_mailbox: self.config.impersonation.clone(),
            },
            body: op,
        };
        let request_body = envelope.as_xml_document()?;

        // Loop in case we need to retry the request after a delay.
        let mut attempts_left = MAX_BUSY_ATTEMPTS;
        loop {
            attempts_left -= 1;

            let response_body = self.send_request(&request_body, Op::NAME)?;

            let envelope = match ResponseEnvelope::parse(&String::from_utf8_lossy(&response_body))
            {
                Ok(envelope) => envelope,

                // Check first to see if the request has been throttled and
                // needs to be retried after a delay.
                Err(ews_soap::Error::RequestFault(fault)) => match fault.back_off_milliseconds() {
                    Some(backoff_delay_ms) if attempts_left > 0 => {
                        log::debug!(
                            "{} request throttled, will retry after {backoff_delay_ms} milliseconds",
                            Op::NAME
                        );
                        thread::sleep(Duration::from_millis(backoff_delay_ms));
                        continue;
                    }
                    _ => return Err(ews_soap::Error::RequestFault(fault).into()),
                },

                Err(err) => return Err(err.into()),
            };

            // If the response specified a server version, update the one we
            // send with each request accordingly.
            if let Some(version) = envelope.server_version() {
                self.update_server_version(version);
            }

            let response = envelope.into_operation_response(Op::NAME)?;

            // A busy signal in the first response message is retried the
            // same way as a throttling fault.
            if let Some(delay_ms) = busy_back_off_delay_ms(&response, Op::NAME) {
                if attempts_left > 0 {
                    log::debug!(
                        "{} returned busy message, will retry after {delay_ms} milliseconds",
                        Op::NAME
                    );
                    thread::sleep(Duration::from_millis(delay_ms));
                    continue;
                }
            }

            return Ok(response);
        }
    }

    /// Sends one serialized request through the transport, bracketed by a
    /// session acquired for just this request.
    fn send_request(&self, request_body: &[u8], op_name: &str) -> Result<Vec<u8>> {
        let session = SessionGuard::acquire(&self.transport).map_err(map_transport_error)?;

        // Generate random id for logging purposes.
        let request_id = Uuid::new_v4();
        log::info!("Making operation request {request_id}: {op_name}");

        if env::var(LOG_NETWORK_PAYLOADS_ENV_VAR).is_ok() {
            // Also log the request body if requested.
            log::info!("C: {}", String::from_utf8_lossy(request_body));
        }

        let response_body = session
            .send(&self.config.endpoint, request_body)
            .map_err(map_transport_error)?;

        log::info!("Response received for request {request_id}: {op_name}");

        if env::var(LOG_NETWORK_PAYLOADS_ENV_VAR).is_ok() {
            // Also log the response body if requested.
            log::info!("S: {}", String::from_utf8_lossy(&response_body));
        }

        Ok(response_body)
    }

    /// Stores the version identifier reported by the server, for use in
    /// subsequent requests.
    fn update_server_version(&self, version: &str) {
        // Some servers leave the version attribute empty rather than
        // omitting it.
        if version.is_empty() {
            return;
        }

        let version = match ExchangeServerVersion::try_from(version) {
            Ok(version) => version,

            // An unknown identifier very likely means a server more recent
            // than the versions known here, so advertise the most recent
            // known one.
            Err(_) => ExchangeServerVersion::Exchange2013_SP1,
        };

        self.server_version.set(version);
    }

    /// Runs an operation that was given a single input, returning the
    /// content of its single response message.
    pub(crate) fn run_single<Op: Operation>(&self, op: Op) -> Result<Value> {
        let response = self.run_operation(op)?;
        let messages = response_messages(&response, Op::NAME)?;

        let message = single_response_or_error(messages)?;
        let message = process_response_message(Op::NAME, message)?;

        Ok(message.content().clone())
    }

    /// Runs an operation that was given several inputs, returning the
    /// content of every response message and failing on the first one whose
    /// class is an error.
    pub(crate) fn run_batch<Op: Operation>(&self, op: Op, expected: usize) -> Result<Vec<Value>> {
        let response = self.run_operation(op)?;
        let messages = response_messages(&response, Op::NAME)?;

        validate_response_message_count(&messages, expected)?;

        messages
            .into_iter()
            .map(|message| {
                process_response_message(Op::NAME, message)
                    .map(|message| message.content().clone())
            })
            .collect()
    }

    /// Resolves a folder against the configured delegate mailbox, when one
    /// is set.
    pub(crate) fn delegate_folder(&self, folder: BaseFolderId) -> BaseFolderId {
        match &self.config.delegate {
            Some(delegate) => folder.with_mailbox(delegate.clone()),
            None => folder,
        }
    }
}

/// Maps transport-layer failures into the client taxonomy, keeping
/// credential rejections distinct from network failures.
fn map_transport_error(err: ntlm_http::Error) -> Error {
    match err {
        ntlm_http::Error::Unauthorized => Error::Authentication,
        err => Error::Transport(err),
    }
}

/// The retry delay requested by the server, when the first response message
/// is a busy signal carrying one.
fn busy_back_off_delay_ms(response: &Value, op_name: &str) -> Option<u64> {
    let messages = response_messages(response, op_name).ok()?;
    let first = messages.first()?;

    if first.class() == ResponseClass::Error && first.response_code()?.is_server_busy() {
        first.back_off_milliseconds()
    } else {
        None
    }
}

/// Applies a response message's class: successes pass through, warnings
/// pass through with a log line, errors become [`Error::Response`].
fn process_response_message<'a>(
    op_name: &str,
    message: ResponseMessage<'a>,
) -> Result<ResponseMessage<'a>> {
    match message.class() {
        ResponseClass::Success => Ok(message),

        ResponseClass::Warning => {
            log::warn!("{op_name} operation encountered unknown warning");

            Ok(message)
        }

        ResponseClass::Error => Err(message.to_error()?.into()),
    }
}

/// For operations that expect a single response message, extracts that
/// message. A missing message is an error; extra messages are logged and
/// the first is used.
fn single_response_or_error<'a>(
    messages: Vec<ResponseMessage<'a>>,
) -> Result<ResponseMessage<'a>> {
    let messages_len = messages.len();

    let Some(message) = messages.into_iter().next() else {
        return Err(Error::Processing {
            message: "expected 1 response message, got none".to_string(),
        });
    };

    if messages_len != 1 {
        log::warn!("expected 1 response message, got {messages_len}");
    }

    Ok(message)
}

fn validate_response_message_count(
    messages: &[ResponseMessage<'_>],
    expected: usize,
) -> Result<()> {
    if messages.len() != expected {
        return Err(Error::UnexpectedResponseMessageCount {
            expected,
            actual: messages.len(),
        });
    }

    Ok(())
}
