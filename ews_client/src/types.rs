/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Mailbox-level data types exchanged with client callers.

use std::fs;
use std::io;
use std::path::Path;

use base64::prelude::{Engine, BASE64_STANDARD};
use ews_soap::{
    distinguished, BaseFolderId, BodyType, DateTime, ItemReference, Mailbox, MessageBody, Value,
};

/// A calendar event to create.
#[derive(Clone, Debug)]
pub struct NewEvent {
    pub subject: String,
    pub start: DateTime,
    pub end: DateTime,
    pub body: Option<MessageBody>,
    pub location: Option<String>,
    pub all_day: bool,

    /// Whether invitations are mailed to the event's attendees when it is
    /// created.
    pub send_invitations: bool,
}

impl NewEvent {
    pub fn new(subject: impl Into<String>, start: DateTime, end: DateTime) -> Self {
        NewEvent {
            subject: subject.into(),
            start,
            end,
            body: None,
            location: None,
            all_day: false,
            send_invitations: false,
        }
    }
}

/// A calendar event read back from the server.
#[derive(Clone, Debug)]
pub struct Event {
    pub item: ItemReference,
    pub subject: Option<String>,
    pub start: Option<DateTime>,
    pub end: Option<DateTime>,
    pub location: Option<String>,
    pub organizer: Option<Mailbox>,
    pub attendees: Vec<Mailbox>,
}

impl Event {
    /// Everyone involved in the event, the organizer first.
    pub fn all_attendees(&self) -> impl Iterator<Item = &Mailbox> {
        self.organizer.iter().chain(self.attendees.iter())
    }

    /// Reads a `CalendarItem` element into an event.
    pub(crate) fn from_value(item: &Value) -> Option<Self> {
        let reference = item.get("ItemId").and_then(ItemReference::from_value)?;

        let organizer = item
            .get("Organizer")
            .and_then(|organizer| organizer.get("Mailbox"))
            .and_then(mailbox_from);

        // A single attendee arrives as a bare element rather than a list.
        let attendees = item
            .get("RequiredAttendees")
            .map(|attendees| {
                attendees
                    .sequence("Attendee")
                    .into_iter()
                    .filter_map(|attendee| attendee.get("Mailbox"))
                    .filter_map(mailbox_from)
                    .collect()
            })
            .unwrap_or_default();

        Some(Event {
            item: reference,
            subject: item.field_text("Subject").map(str::to_owned),
            start: date_time_from(item, "Start"),
            end: date_time_from(item, "End"),
            location: item.field_text("Location").map(str::to_owned),
            organizer,
            attendees,
        })
    }
}

/// A mail message read from a folder.
#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub item: ItemReference,
    pub subject: Option<String>,
    pub from: Option<Mailbox>,
    pub to_recipients: Vec<Mailbox>,
    pub cc_recipients: Vec<Mailbox>,
    pub body: Option<MessageBody>,
    pub is_read: bool,
    pub date_time_sent: Option<DateTime>,
    pub date_time_created: Option<DateTime>,

    /// The decoded MIME source of the message, when the server provided
    /// one.
    pub mime_content: Option<Vec<u8>>,

    /// The contents of the message's file attachments, fetched alongside
    /// the message itself.
    pub attachments: Vec<AttachmentContent>,
}

impl EmailMessage {
    /// Reads a `Message` element into a mail message. Attachment contents
    /// are fetched separately and start out empty.
    pub(crate) fn from_value(item: &Value) -> Option<Self> {
        let reference = item.get("ItemId").and_then(ItemReference::from_value)?;

        let body = item.get("Body").map(|body| MessageBody {
            body_type: BodyType::from_wire(body.attribute("BodyType").unwrap_or_default()),
            content: body.text().unwrap_or_default().to_owned(),
        });

        let mime_content = item
            .field_text("MimeContent")
            .and_then(|content| BASE64_STANDARD.decode(content).ok());

        Some(EmailMessage {
            item: reference,
            subject: item.field_text("Subject").map(str::to_owned),
            from: item
                .get("From")
                .and_then(|from| from.get("Mailbox"))
                .and_then(mailbox_from),
            to_recipients: recipients_from(item, "ToRecipients"),
            cc_recipients: recipients_from(item, "CcRecipients"),
            body,
            is_read: item.field_text("IsRead") == Some("true"),
            date_time_sent: date_time_from(item, "DateTimeSent"),
            date_time_created: date_time_from(item, "DateTimeCreated"),
            mime_content,
            attachments: Vec::new(),
        })
    }
}

/// Selection criteria for listing the messages in a folder.
#[derive(Clone, Debug)]
pub struct MessageQuery {
    pub folder: BaseFolderId,

    /// The maximum number of messages to return. Unlimited when absent.
    pub limit: Option<usize>,

    /// Keep only messages that have not been read yet.
    pub only_unread: bool,
}

impl MessageQuery {
    /// Queries the mailbox's inbox.
    pub fn inbox() -> Self {
        Self::folder(BaseFolderId::distinguished(distinguished::INBOX))
    }

    pub fn folder(folder: BaseFolderId) -> Self {
        MessageQuery {
            folder,
            limit: None,
            only_unread: false,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn only_unread(mut self) -> Self {
        self.only_unread = true;
        self
    }
}

/// The decoded content of a file attachment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentContent {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl AttachmentContent {
    /// Reads a `FileAttachment` element, decoding its base64 content.
    pub(crate) fn from_value(attachment: &Value) -> Option<Self> {
        Some(AttachmentContent {
            name: attachment
                .field_text("Name")
                .unwrap_or_default()
                .to_owned(),
            content_type: attachment.field_text("ContentType").map(str::to_owned),
            content: BASE64_STANDARD
                .decode(attachment.field_text("Content")?)
                .ok()?,
        })
    }
}

/// A mail message to send.
#[derive(Clone, Debug)]
pub struct OutgoingMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: MessageBody,
    pub attachments: Vec<OutgoingAttachment>,

    /// Whether a copy lands in the sent items folder after sending.
    pub save_to_sent_items: bool,

    /// Whether the saved copy is marked as already read.
    pub mark_as_read: bool,
}

impl OutgoingMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: MessageBody) -> Self {
        OutgoingMessage {
            to: vec![to.into()],
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: subject.into(),
            body,
            attachments: Vec::new(),
            save_to_sent_items: true,
            mark_as_read: true,
        }
    }

    pub fn attach(mut self, attachment: OutgoingAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// A file to attach to an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingAttachment {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl OutgoingAttachment {
    pub fn new(
        name: impl Into<String>,
        content_type: Option<String>,
        content: Vec<u8>,
    ) -> Self {
        OutgoingAttachment {
            name: name.into(),
            content_type,
            content,
        }
    }

    /// Reads an attachment from a file, naming it after the file and
    /// deriving the content type from its extension.
    ///
    /// A missing or unreadable file is reported here, before any part of
    /// the message reaches the server.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let content = fs::read(path)?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(OutgoingAttachment {
            name,
            content_type: guess_content_type(path).map(str::to_owned),
            content,
        })
    }

    pub(crate) fn encoded_content(&self) -> String {
        BASE64_STANDARD.encode(&self.content)
    }
}

/// A folder entry returned by a folder listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderInfo {
    pub id: String,
    pub change_key: Option<String>,
    pub display_name: String,
    pub total_count: Option<u32>,
    pub child_folder_count: Option<u32>,
    pub unread_count: Option<u32>,
}

impl FolderInfo {
    /// The folder's identifier, usable as a parent in further listings or
    /// as a move destination.
    pub fn folder_id(&self) -> BaseFolderId {
        BaseFolderId::FolderId {
            id: self.id.clone(),
            change_key: self.change_key.clone(),
        }
    }

    /// Reads a `Folder` element out of a folder listing.
    pub(crate) fn from_value(folder: &Value) -> Option<Self> {
        let folder_id = folder.get("FolderId")?;

        Some(FolderInfo {
            id: folder_id.attribute("Id")?.to_owned(),
            change_key: folder_id.attribute("ChangeKey").map(str::to_owned),
            display_name: folder
                .field_text("DisplayName")
                .unwrap_or_default()
                .to_owned(),
            total_count: count_from(folder, "TotalCount"),
            child_folder_count: count_from(folder, "ChildFolderCount"),
            unread_count: count_from(folder, "UnreadCount"),
        })
    }
}

/// Reads a `Mailbox` element. The display name is optional on the wire;
/// entries without an email address are not addressable and are dropped.
pub(crate) fn mailbox_from(value: &Value) -> Option<Mailbox> {
    Some(Mailbox {
        name: value.field_text("Name").map(str::to_owned),
        email_address: value.field_text("EmailAddress")?.to_owned(),
    })
}

fn recipients_from(item: &Value, name: &str) -> Vec<Mailbox> {
    item.get(name)
        .map(|recipients| {
            recipients
                .sequence("Mailbox")
                .into_iter()
                .filter_map(mailbox_from)
                .collect()
        })
        .unwrap_or_default()
}

fn date_time_from(item: &Value, name: &str) -> Option<DateTime> {
    item.field_text(name)
        .and_then(|text| DateTime::parse(text).ok())
}

fn count_from(folder: &Value, name: &str) -> Option<u32> {
    folder.field_text(name).and_then(|text| text.parse().ok())
}

/// Maps a file extension to the MIME type it conventionally carries.
/// Unrecognized extensions map to an octet stream; files without an
/// extension get no content type at all.
fn guess_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();

    let content_type = match extension.as_str() {
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "htm" | "html" => "text/html",
        "xml" => "text/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        "eml" => "message/rfc822",
        _ => "application/octet-stream",
    };

    Some(content_type)
}
