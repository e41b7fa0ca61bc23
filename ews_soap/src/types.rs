/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Data types shared between operations.

use time::format_description::well_known::Iso8601;

use crate::{
    value::{Object, Value},
    Error,
};

/// Well-known folder names understood by the server without a prior lookup.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/distinguishedfolderid>
pub mod distinguished {
    pub const MSG_FOLDER_ROOT: &str = "msgfolderroot";
    pub const INBOX: &str = "inbox";
    pub const DELETED_ITEMS: &str = "deleteditems";
    pub const DRAFTS: &str = "drafts";
    pub const OUTBOX: &str = "outbox";
    pub const SENT_ITEMS: &str = "sentitems";
    pub const JUNK_EMAIL: &str = "junkemail";
    pub const CALENDAR: &str = "calendar";
    pub const ARCHIVE: &str = "archive";
}

/// An identifier for a remote item, with the change key issued alongside it.
///
/// The change key is a version token: it is only valid against the exact
/// item state it was issued for, and every mutation of the item (update,
/// move, attach) issues a new one. Callers must thread the most recently
/// returned pair into any follow-up operation on the same item.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/itemid>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemReference {
    pub id: String,
    pub change_key: Option<String>,
}

impl ItemReference {
    pub fn new(id: impl Into<String>, change_key: Option<String>) -> Self {
        Self {
            id: id.into(),
            change_key,
        }
    }

    /// Builds the `ItemId` element for requests.
    pub(crate) fn to_value(&self) -> Value {
        Object::new()
            .attr("Id", self.id.clone())
            .opt_attr("ChangeKey", self.change_key.clone())
            .into()
    }

    /// Reads an `ItemId` element out of a response payload.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.attribute("Id").map(|id| Self {
            id: id.to_owned(),
            change_key: value.attribute("ChangeKey").map(str::to_owned),
        })
    }
}

/// An identifier for a remote folder, either a server-generated ID or a
/// well-known distinguished name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BaseFolderId {
    FolderId {
        id: String,
        change_key: Option<String>,
    },

    /// A well-known folder, optionally resolved against another mailbox.
    /// The mailbox annotation is how delegate access selects whose folder a
    /// distinguished name refers to; plain folder IDs are already globally
    /// unique and take no annotation.
    DistinguishedFolderId {
        id: String,
        mailbox: Option<String>,
    },
}

impl BaseFolderId {
    pub fn folder_id(id: impl Into<String>) -> Self {
        Self::FolderId {
            id: id.into(),
            change_key: None,
        }
    }

    pub fn distinguished(id: impl Into<String>) -> Self {
        Self::DistinguishedFolderId {
            id: id.into(),
            mailbox: None,
        }
    }

    /// Annotates a distinguished folder with the mailbox it belongs to.
    /// Has no effect on plain folder IDs.
    pub fn with_mailbox(self, email_address: impl Into<String>) -> Self {
        match self {
            Self::DistinguishedFolderId { id, .. } => Self::DistinguishedFolderId {
                id,
                mailbox: Some(email_address.into()),
            },
            other => other,
        }
    }

    pub(crate) fn element_name(&self) -> &'static str {
        match self {
            Self::FolderId { .. } => "FolderId",
            Self::DistinguishedFolderId { .. } => "DistinguishedFolderId",
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::FolderId { id, change_key } => Object::new()
                .attr("Id", id.clone())
                .opt_attr("ChangeKey", change_key.clone())
                .into(),

            Self::DistinguishedFolderId { id, mailbox } => Object::new()
                .attr("Id", id.clone())
                .opt_field(
                    "Mailbox",
                    mailbox
                        .as_ref()
                        .map(|email| Object::new().field("EmailAddress", email.clone())),
                )
                .into(),
        }
    }
}

/// The requested detail level for items or folders in a response.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/baseshape>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BaseShape {
    /// Include only the identifier of an item or folder.
    IdOnly,

    /// Include the identifier and a set of commonly used properties.
    #[default]
    Default,

    /// Include all properties.
    AllProperties,
}

impl BaseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseShape::IdOnly => "IdOnly",
            BaseShape::Default => "Default",
            BaseShape::AllProperties => "AllProperties",
        }
    }
}

/// Whether to search only directly contained entries or deleted/associated
/// ones as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Traversal {
    #[default]
    Shallow,
    SoftDeleted,
    Associated,
}

impl Traversal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Traversal::Shallow => "Shallow",
            Traversal::SoftDeleted => "SoftDeleted",
            Traversal::Associated => "Associated",
        }
    }
}

/// The manner in which items are deleted.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/deleteitem>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteType {
    HardDelete,
    MoveToDeletedItems,
    SoftDelete,
}

impl DeleteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteType::HardDelete => "HardDelete",
            DeleteType::MoveToDeletedItems => "MoveToDeletedItems",
            DeleteType::SoftDelete => "SoftDelete",
        }
    }
}

/// Whether a newly created message is sent, saved, or both.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitem#messagedisposition-attribute>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageDisposition {
    SaveOnly,
    SendOnly,
    SendAndSaveCopy,
}

impl MessageDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageDisposition::SaveOnly => "SaveOnly",
            MessageDisposition::SendOnly => "SendOnly",
            MessageDisposition::SendAndSaveCopy => "SendAndSaveCopy",
        }
    }
}

/// The content kind of a message body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyType {
    HTML,
    Text,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::HTML => "HTML",
            BodyType::Text => "Text",
        }
    }

    /// Maps a body type read off the wire, defaulting unknown markers to
    /// text.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "HTML" => BodyType::HTML,
            _ => BodyType::Text,
        }
    }
}

/// The shape of items to include in a response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemShape {
    pub base_shape: BaseShape,

    /// Requests the raw MIME source of each item alongside its properties.
    pub include_mime_content: bool,
}

impl ItemShape {
    pub(crate) fn to_value(&self) -> Value {
        let object = Object::new().field("BaseShape", self.base_shape.as_str());

        if self.include_mime_content {
            object.field("IncludeMimeContent", true).into()
        } else {
            object.into()
        }
    }
}

/// The shape of folders to include in a response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderShape {
    pub base_shape: BaseShape,
}

impl FolderShape {
    pub(crate) fn to_value(&self) -> Value {
        Object::new()
            .field("BaseShape", self.base_shape.as_str())
            .into()
    }
}

/// A window of calendar time to search, expressed as element attributes.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/calendarview>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarView {
    pub max_entries_returned: Option<u32>,
    pub start_date: DateTime,
    pub end_date: DateTime,
}

impl CalendarView {
    pub fn new(start_date: DateTime, end_date: DateTime) -> Self {
        Self {
            max_entries_returned: None,
            start_date,
            end_date,
        }
    }

    pub(crate) fn to_value(&self) -> Result<Value, Error> {
        Ok(Object::new()
            .opt_attr(
                "MaxEntriesReturned",
                self.max_entries_returned.map(|max| max.to_string()),
            )
            .attr("StartDate", self.start_date.to_wire()?)
            .attr("EndDate", self.end_date.to_wire()?)
            .into())
    }
}

/// An email address, optionally accompanied by a display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mailbox {
    pub name: Option<String>,
    pub email_address: String,
}

impl Mailbox {
    pub fn address(email_address: impl Into<String>) -> Self {
        Self {
            name: None,
            email_address: email_address.into(),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        Object::new()
            .opt_field("Name", self.name.clone())
            .field("EmailAddress", self.email_address.clone())
            .into()
    }
}

impl From<Mailbox> for Value {
    fn from(value: Mailbox) -> Self {
        value.to_value()
    }
}

/// A message body together with its content kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBody {
    pub body_type: BodyType,
    pub content: String,
}

impl MessageBody {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            body_type: BodyType::Text,
            content: content.into(),
        }
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self {
            body_type: BodyType::HTML,
            content: content.into(),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        Object::new()
            .attr("BodyType", self.body_type.as_str())
            .text(self.content.clone())
            .into()
    }
}

impl From<MessageBody> for Value {
    fn from(value: MessageBody) -> Self {
        value.to_value()
    }
}

/// A point in time, formatted on the wire as ISO 8601.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTime(pub time::OffsetDateTime);

impl DateTime {
    /// Formats the timestamp for a request payload.
    pub fn to_wire(&self) -> Result<String, Error> {
        Ok(self.0.format(&Iso8601::DEFAULT)?)
    }

    /// Parses a timestamp from a response payload.
    pub fn parse(value: &str) -> Result<Self, Error> {
        Ok(Self(time::OffsetDateTime::parse(value, &Iso8601::DEFAULT)?))
    }
}

impl From<time::OffsetDateTime> for DateTime {
    fn from(value: time::OffsetDateTime) -> Self {
        Self(value)
    }
}
