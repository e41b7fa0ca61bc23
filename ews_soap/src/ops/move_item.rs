/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{BaseFolderId, ItemReference},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// A request to move one or more items to another folder.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/moveitem>
#[derive(Clone, Debug)]
pub struct MoveItem {
    pub to_folder_id: BaseFolderId,
    pub item_ids: Vec<ItemReference>,
}

impl Operation for MoveItem {
    const NAME: &'static str = "MoveItem";

    fn to_value(&self) -> Result<Value, Error> {
        let mut item_ids = Object::new();
        for item_id in &self.item_ids {
            item_ids = item_ids.field("ItemId", item_id.to_value());
        }

        Ok(Object::new()
            .field(
                "ToFolderId",
                Object::new().field(self.to_folder_id.element_name(), self.to_folder_id.to_value()),
            )
            .field("ItemIds", item_ids)
            .into())
    }
}

/// Collects the identifiers the moved items received in their destination
/// folder out of a `MoveItemResponseMessage`.
///
/// Moving an item invalidates its original identifier.
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

#[cfg(test)]
mod tests {
    use crate::test_utils::{assert_serialized_content, parse_response_message};

    use super::*;

    #[test]
    fn serialize_move_item() {
        let move_item = MoveItem {
            to_folder_id: BaseFolderId::folder_id("AQMkADAw"),
            item_ids: vec![ItemReference::new("AAMkAGIA", Some("CQAAABYA".to_owned()))],
        };

        let expected = r#"<m:MoveItem><m:ToFolderId><t:FolderId Id="AQMkADAw"/></m:ToFolderId><m:ItemIds><t:ItemId Id="AAMkAGIA" ChangeKey="CQAAABYA"/></m:ItemIds></m:MoveItem>"#;

        assert_serialized_content(&move_item, expected);
    }

    #[test]
    fn moved_item_ids_are_collected_from_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
                     <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                         <s:Body>
                             <m:MoveItemResponse
                                 xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                                 xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
                                 <m:ResponseMessages>
                                     <m:MoveItemResponseMessage ResponseClass="Success">
                                         <m:ResponseCode>NoError</m:ResponseCode>
                                         <m:Items>
                                             <t:Message>
                                                 <t:ItemId Id="AAMkAGRe" ChangeKey="CQAAABYR"/>
                                             </t:Message>
                                         </m:Items>
                                     </m:MoveItemResponseMessage>
                                 </m:ResponseMessages>
                             </m:MoveItemResponse>
                         </s:Body>
                     </s:Envelope>"#;

        let message = parse_response_message(xml, "MoveItem");

        assert_eq!(
            item_ids(&message),
            [ItemReference::new("AAMkAGRe", Some("CQAAABYR".to_owned()))]
        );
    }
}
