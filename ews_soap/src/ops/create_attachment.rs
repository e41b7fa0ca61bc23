/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::ItemReference,
    value::{Object, Value},
    Error,
};

use super::Operation;

/// A file attached to an item by content.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/fileattachment>
#[derive(Clone, Debug)]
pub struct FileAttachment {
    pub name: String,

    /// The MIME type describing the content, if known.
    pub content_type: Option<String>,

    /// The file's bytes in base64.
    pub content: String,
}

impl FileAttachment {
    fn to_value(&self) -> Value {
        Object::new()
            .field("Name", self.name.clone())
            .opt_field("ContentType", self.content_type.clone())
            .field("Content", self.content.clone())
            .into()
    }
}

/// A request to attach one or more files to an existing item.
///
/// Attaching to an item changes it; the response carries the item's new
/// change key, which must replace the one the caller holds.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createattachment>
#[derive(Clone, Debug)]
pub struct CreateAttachment {
    pub parent_item_id: ItemReference,
    pub attachments: Vec<FileAttachment>,
}

impl Operation for CreateAttachment {
    const NAME: &'static str = "CreateAttachment";

    fn to_value(&self) -> Result<Value, Error> {
        let mut attachments = Object::new();
        for attachment in &self.attachments {
            attachments = attachments.field("FileAttachment", attachment.to_value());
        }

        Ok(Object::new()
            .field("ParentItemId", self.parent_item_id.to_value())
            .field("Attachments", attachments)
            .into())
    }
}

/// The identifiers issued when an attachment is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentIdentifiers {
    /// The identifier of the new attachment itself.
    pub attachment_id: String,

    /// The parent item's identifier, unchanged by the attachment.
    pub root_item_id: String,

    /// The parent item's new change key.
    pub root_item_change_key: Option<String>,
}

/// Reads the created attachment's identifiers out of a
/// `CreateAttachmentResponseMessage`.
pub fn attachment_identifiers(message: &Value) -> Option<AttachmentIdentifiers> {
    let (_, attachment) = message.get("Attachments")?.entries().into_iter().next()?;
    let attachment_id = attachment.get("AttachmentId")?;

    Some(AttachmentIdentifiers {
        attachment_id: attachment_id.attribute("Id")?.to_owned(),
        root_item_id: attachment_id.attribute("RootItemId")?.to_owned(),
        root_item_change_key: attachment_id
            .attribute("RootItemChangeKey")
            .map(str::to_owned),
    })
}
