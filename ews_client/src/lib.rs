/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! A client for mailbox automation against Exchange Web Services.
//!
//! The client speaks the EWS SOAP dialect over NTLM-authenticated HTTP and
//! exposes mailbox-level operations: listing and sending mail, managing
//! calendar events, fetching attachments, and walking the folder hierarchy.
//! Each operation opens an authenticated session, performs the request
//! (retrying when the server asks for a back off), and releases the session
//! before returning.
//!
//! ## Connecting and fetching mail
//!
//! ```no_run
//! use ews_client::{ClientConfig, ExchangeClient, MessageQuery};
//! use url::Url;
//!
//! # fn run() -> ews_client::Result<()> {
//! let config = ClientConfig::new(
//!     Url::parse("https://mail.example.com/EWS/Exchange.asmx").unwrap(),
//!     "EXAMPLE\\mailbot",
//!     "hunter2",
//! );
//!
//! let client = ExchangeClient::connect(config)?;
//! for message in client.get_messages(&MessageQuery::inbox().only_unread())? {
//!     println!("{}: {:?}", message.item.id, message.subject);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
#[cfg(test)]
mod test_utils;
mod transport;
mod types;

pub use client::{ClientConfig, ExchangeClient};
pub use error::{Error, Result, WorkflowStep};
pub use transport::{NtlmTransport, Transport};
pub use types::{
    AttachmentContent, EmailMessage, Event, FolderInfo, MessageQuery, NewEvent, OutgoingAttachment,
    OutgoingMessage,
};

pub use ews_soap::ops::delete_item::SendMeetingCancellations;
pub use ews_soap::{
    distinguished, BaseFolderId, BodyType, DateTime, DeleteType, ExchangeServerVersion,
    ItemReference, Mailbox, MessageBody,
};
