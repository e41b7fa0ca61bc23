/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{ItemReference, MessageDisposition},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// How an update is applied when the item changed on the server after the
/// change key was issued.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/updateitem#conflictresolution-attribute>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictResolution {
    NeverOverwrite,
    AutoResolve,
    AlwaysOverwrite,
}

impl ConflictResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictResolution::NeverOverwrite => "NeverOverwrite",
            ConflictResolution::AutoResolve => "AutoResolve",
            ConflictResolution::AlwaysOverwrite => "AlwaysOverwrite",
        }
    }
}

/// A single field update applied to an item.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/setitemfield>
#[derive(Clone, Debug)]
pub struct SetItemField {
    /// The well-known identifier of the field to set, e.g.
    /// `message:IsRead`.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/fielduri>
    pub field_uri: String,

    /// The name of the item element carrying the new value, matching the
    /// class of the item being changed.
    pub item_name: String,

    /// The new value, shaped as the named item element's content.
    pub item_content: Value,
}

impl SetItemField {
    fn to_value(&self) -> Value {
        Object::new()
            .field("FieldURI", Object::new().attr("FieldURI", self.field_uri.clone()))
            .field(self.item_name.clone(), self.item_content.clone())
            .into()
    }
}

/// The changes to apply to a single item.
#[derive(Clone, Debug)]
pub struct ItemChange {
    pub item_id: ItemReference,
    pub updates: Vec<SetItemField>,
}

impl ItemChange {
    fn to_value(&self) -> Value {
        let mut updates = Object::new();
        for update in &self.updates {
            updates = updates.field("SetItemField", update.to_value());
        }

        Object::new()
            .field("ItemId", self.item_id.to_value())
            .field("Updates", updates)
            .into()
    }
}

/// A request to change properties of one or more existing items.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/updateitem>
#[derive(Clone, Debug)]
pub struct UpdateItem {
    /// Whether the updated item is saved or sent. Message items are
    /// updated in place with `SaveOnly`.
    pub message_disposition: MessageDisposition,

    pub conflict_resolution: ConflictResolution,

    pub item_changes: Vec<ItemChange>,
}

impl Operation for UpdateItem {
    const NAME: &'static str = "UpdateItem";

    fn to_value(&self) -> Result<Value, Error> {
        let mut item_changes = Object::new();
        for change in &self.item_changes {
            item_changes = item_changes.field("ItemChange", change.to_value());
        }

        Ok(Object::new()
            .attr("MessageDisposition", self.message_disposition.as_str())
            .attr("ConflictResolution", self.conflict_resolution.as_str())
            .field("ItemChanges", item_changes)
            .into())
    }
}
