/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{BaseFolderId, CalendarView, ItemReference, ItemShape, Traversal},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// A request to find items contained in one or more folders.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/finditem>
#[derive(Clone, Debug)]
pub struct FindItem {
    pub traversal: Traversal,

    pub item_shape: ItemShape,

    /// Restricts the search to calendar items within a window of time,
    /// expanding recurrences into individual occurrences.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/calendarview>
    pub calendar_view: Option<CalendarView>,

    pub parent_folder_ids: Vec<BaseFolderId>,
}

impl Operation for FindItem {
    const NAME: &'static str = "FindItem";

    fn to_value(&self) -> Result<Value, Error> {
        let mut parent_folder_ids = Object::new();
        for folder_id in &self.parent_folder_ids {
            parent_folder_ids =
                parent_folder_ids.field(folder_id.element_name(), folder_id.to_value());
        }

        let mut operation = Object::new()
            .attr("Traversal", self.traversal.as_str())
            .field("ItemShape", self.item_shape.to_value());

        if let Some(view) = &self.calendar_view {
            operation = operation.field("CalendarView", view.to_value()?);
        }

        Ok(operation.field("ParentFolderIds", parent_folder_ids).into())
    }
}

/// Collects the identifiers of the found items out of a
/// `FindItemResponseMessage`.
///
/// Searches are made with an `IdOnly` shape and followed by `GetItem` for
/// the details, so identifiers are all a find result is read for.
pub fn item_ids(message: &Value) -> Vec<ItemReference> {
    let Some(items) = message.get("RootFolder").and_then(|root| root.get("Items")) else {
        return Vec::new();
    };

    items
        .entries()
        .into_iter()
        .filter_map(|(_, item)| item.get("ItemId"))
        .filter_map(ItemReference::from_value)
        .collect()
}
