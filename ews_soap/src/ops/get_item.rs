/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{ItemReference, ItemShape},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// A request for the properties of one or more items.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/getitem>
#[derive(Clone, Debug)]
pub struct GetItem {
    pub item_shape: ItemShape,
    pub item_ids: Vec<ItemReference>,
}

impl Operation for GetItem {
    const NAME: &'static str = "GetItem";

    fn to_value(&self) -> Result<Value, Error> {
        let mut item_ids = Object::new();
        for item_id in &self.item_ids {
            item_ids = item_ids.field("ItemId", item_id.to_value());
        }

        Ok(Object::new()
            .field("ItemShape", self.item_shape.to_value())
            .field("ItemIds", item_ids)
            .into())
    }
}

/// Collects the items returned in a `GetItemResponseMessage`, whatever
/// their kind.
pub fn items(message: &Value) -> Vec<&Value> {
    let Some(items) = message.get("Items") else {
        return Vec::new();
    };

    items.entries().into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use crate::{
        test_utils::{assert_serialized_content, parse_response_message},
        types::BaseShape,
    };

    use super::*;

    #[test]
    fn serialize_get_item_with_mime_content() {
        let get_item = GetItem {
            item_shape: ItemShape {
                base_shape: BaseShape::Default,
                include_mime_content: true,
            },
            item_ids: vec![ItemReference::new("AAMkAGIA", Some("CQAAABYA".to_owned()))],
        };

        let expected = r#"<m:GetItem><m:ItemShape><t:BaseShape>Default</t:BaseShape><t:IncludeMimeContent>true</t:IncludeMimeContent></m:ItemShape><m:ItemIds><t:ItemId Id="AAMkAGIA" ChangeKey="CQAAABYA"/></m:ItemIds></m:GetItem>"#;

        assert_serialized_content(&get_item, expected);
    }

    #[test]
    fn serialize_get_item_batch() {
        let get_item = GetItem {
            item_shape: ItemShape::default(),
            item_ids: vec![
                ItemReference::new("AAMkAGIA", None),
                ItemReference::new("AAMkAGIB", None),
            ],
        };

        let expected = r#"<m:GetItem><m:ItemShape><t:BaseShape>Default</t:BaseShape></m:ItemShape><m:ItemIds><t:ItemId Id="AAMkAGIA"/><t:ItemId Id="AAMkAGIB"/></m:ItemIds></m:GetItem>"#;

        assert_serialized_content(&get_item, expected);
    }

    #[test]
    fn items_are_collected_from_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
                     <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                         <s:Body>
                             <m:GetItemResponse
                                 xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                                 xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
                                 <m:ResponseMessages>
                                     <m:GetItemResponseMessage ResponseClass="Success">
                                         <m:ResponseCode>NoError</m:ResponseCode>
                                         <m:Items>
                                             <t:Message>
                                                 <t:ItemId Id="AAMkAGIA" ChangeKey="CQAAABYA"/>
                                                 <t:Subject>Timesheets due</t:Subject>
                                                 <t:IsRead>false</t:IsRead>
                                             </t:Message>
                                         </m:Items>
                                     </m:GetItemResponseMessage>
                                 </m:ResponseMessages>
                             </m:GetItemResponse>
                         </s:Body>
                     </s:Envelope>"#;

        let message = parse_response_message(xml, "GetItem");
        let items = items(&message);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].field_text("Subject"), Some("Timesheets due"));
        assert_eq!(
            items[0].get("ItemId").and_then(|id| id.attribute("Id")),
            Some("AAMkAGIA")
        );
    }
}
