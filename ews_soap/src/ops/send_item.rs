/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{BaseFolderId, ItemReference},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// A request to send one or more existing items, typically drafts.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/senditem>
#[derive(Clone, Debug)]
pub struct SendItem {
    /// Whether a copy of the sent item is saved.
    pub save_item_to_folder: bool,

    pub item_ids: Vec<ItemReference>,

    /// The folder the sent copy is saved in. Only meaningful when
    /// `save_item_to_folder` is set.
    pub saved_item_folder_id: Option<BaseFolderId>,
}

impl Operation for SendItem {
    const NAME: &'static str = "SendItem";

    fn to_value(&self) -> Result<Value, Error> {
        let mut item_ids = Object::new();
        for item_id in &self.item_ids {
            item_ids = item_ids.field("ItemId", item_id.to_value());
        }

        let mut operation = Object::new()
            .attr("SaveItemToFolder", self.save_item_to_folder.to_string())
            .field("ItemIds", item_ids);

        if let Some(folder_id) = &self.saved_item_folder_id {
            operation = operation.field(
                "SavedItemFolderId",
                Object::new().field(folder_id.element_name(), folder_id.to_value()),
            );
        }

        Ok(operation.into())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::assert_serialized_content;

    use super::*;

    #[test]
    fn serialize_send_item_saving_to_sent_items() {
        let send_item = SendItem {
            save_item_to_folder: true,
            item_ids: vec![ItemReference::new("AAMkAGIA", Some("CQAAABYB".to_owned()))],
            saved_item_folder_id: Some(BaseFolderId::distinguished("sentitems")),
        };

        let expected = r#"<m:SendItem SaveItemToFolder="true"><m:ItemIds><t:ItemId Id="AAMkAGIA" ChangeKey="CQAAABYB"/></m:ItemIds><m:SavedItemFolderId><t:DistinguishedFolderId Id="sentitems"/></m:SavedItemFolderId></m:SendItem>"#;

        assert_serialized_content(&send_item, expected);
    }

    #[test]
    fn serialize_send_item_without_saved_copy() {
        let send_item = SendItem {
            save_item_to_folder: false,
            item_ids: vec![ItemReference::new("AAMkAGIA", None)],
            saved_item_folder_id: None,
        };

        let expected = r#"<m:SendItem SaveItemToFolder="false"><m:ItemIds><t:ItemId Id="AAMkAGIA"/></m:ItemIds></m:SendItem>"#;

        assert_serialized_content(&send_item, expected);
    }
}
