/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{BaseFolderId, ItemReference, MessageDisposition},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// Whether and to whom meeting invitations are sent when a calendar item is
/// created.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitem#sendmeetinginvitations-attribute>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendMeetingInvitations {
    SendToNone,
    SendOnlyToAll,
    SendToAllAndSaveCopy,
}

impl SendMeetingInvitations {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendMeetingInvitations::SendToNone => "SendToNone",
            SendMeetingInvitations::SendOnlyToAll => "SendOnlyToAll",
            SendMeetingInvitations::SendToAllAndSaveCopy => "SendToAllAndSaveCopy",
        }
    }
}

/// A request to create (and optionally send) one or more items.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitem>
#[derive(Clone, Debug)]
pub struct CreateItem {
    /// Whether the created message is saved, sent, or both.
    ///
    /// Required when creating message items, forbidden otherwise.
    pub message_disposition: Option<MessageDisposition>,

    /// Whether invitations go out to the attendees of a created calendar
    /// item.
    ///
    /// Required when creating calendar items, forbidden otherwise.
    pub send_meeting_invitations: Option<SendMeetingInvitations>,

    /// The folder the created item is saved in. When absent, the server
    /// picks the default folder for the item's class.
    pub saved_item_folder_id: Option<BaseFolderId>,

    /// The contents of the `Items` element, one child per item to create.
    pub items: Value,
}

impl Operation for CreateItem {
    const NAME: &'static str = "CreateItem";

    fn to_value(&self) -> Result<Value, Error> {
        let mut operation = Object::new()
            .opt_attr(
                "MessageDisposition",
                self.message_disposition.map(|disposition| disposition.as_str()),
            )
            .opt_attr(
                "SendMeetingInvitations",
                self.send_meeting_invitations.map(|invitations| invitations.as_str()),
            );

        if let Some(folder_id) = &self.saved_item_folder_id {
            operation = operation.field(
                "SavedItemFolderId",
                Object::new().field(folder_id.element_name(), folder_id.to_value()),
            );
        }

        Ok(operation.field("Items", self.items.clone()).into())
    }
}

/// Collects the identifiers issued for the created items out of a
/// `CreateItemResponseMessage`.
pub fn item_ids(message: &Value) -> Vec<ItemReference> {
    let Some(items) = message.get("Items") else {
        return Vec::new();
    };

    items
        .entries()
        .into_iter()
        .filter_map(|(_, item)| item.get("ItemId"))
        .filter_map(ItemReference::from_value)
        .collect()
}
