/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{BaseFolderId, FolderShape, Traversal},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// A request to find folders contained in one or more parent folders.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/findfolder>
#[derive(Clone, Debug)]
pub struct FindFolder {
    pub traversal: Traversal,
    pub folder_shape: FolderShape,
    pub parent_folder_ids: Vec<BaseFolderId>,
}

impl Operation for FindFolder {
    const NAME: &'static str = "FindFolder";

    fn to_value(&self) -> Result<Value, Error> {
        let mut parent_folder_ids = Object::new();
        for folder_id in &self.parent_folder_ids {
            parent_folder_ids =
                parent_folder_ids.field(folder_id.element_name(), folder_id.to_value());
        }

        Ok(Object::new()
            .attr("Traversal", self.traversal.as_str())
            .field("FolderShape", self.folder_shape.to_value())
            .field("ParentFolderIds", parent_folder_ids)
            .into())
    }
}

/// Collects the folder entries out of a `FindFolderResponseMessage`.
pub fn folders(message: &Value) -> Vec<&Value> {
    let Some(folders) = message
        .get("RootFolder")
        .and_then(|root| root.get("Folders"))
    else {
        return Vec::new();
    };

    folders
        .entries()
        .into_iter()
        .map(|(_, folder)| folder)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{
        test_utils::{assert_serialized_content, parse_response_message},
        types::BaseShape,
    };

    use super::*;

    #[test]
    fn serialize_find_folder_under_distinguished_parent() {
        let find_folder = FindFolder {
            traversal: Traversal::Shallow,
            folder_shape: FolderShape {
                base_shape: BaseShape::Default,
            },
            parent_folder_ids: vec![BaseFolderId::distinguished("msgfolderroot")],
        };

        let expected = r#"<m:FindFolder Traversal="Shallow"><m:FolderShape><t:BaseShape>Default</t:BaseShape></m:FolderShape><m:ParentFolderIds><t:DistinguishedFolderId Id="msgfolderroot"/></m:ParentFolderIds></m:FindFolder>"#;

        assert_serialized_content(&find_folder, expected);
    }

    #[test]
    fn folders_are_collected_from_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
                     <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                         <s:Body>
                             <m:FindFolderResponse
                                 xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                                 xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
                                 <m:ResponseMessages>
                                     <m:FindFolderResponseMessage ResponseClass="Success">
                                         <m:ResponseCode>NoError</m:ResponseCode>
                                         <m:RootFolder TotalItemsInView="2" IncludesLastItemInRange="true">
                                             <t:Folders>
                                                 <t:Folder>
                                                     <t:FolderId Id="AQMkADAa" ChangeKey="AQAAABYa"/>
                                                     <t:DisplayName>Projects</t:DisplayName>
                                                     <t:TotalCount>15</t:TotalCount>
                                                     <t:ChildFolderCount>2</t:ChildFolderCount>
                                                     <t:UnreadCount>4</t:UnreadCount>
                                                 </t:Folder>
                                                 <t:Folder>
                                                     <t:FolderId Id="AQMkADAb" ChangeKey="AQAAABYb"/>
                                                     <t:DisplayName>Receipts</t:DisplayName>
                                                 </t:Folder>
                                             </t:Folders>
                                         </m:RootFolder>
                                     </m:FindFolderResponseMessage>
                                 </m:ResponseMessages>
                             </m:FindFolderResponse>
                         </s:Body>
                     </s:Envelope>"#;

        let message = parse_response_message(xml, "FindFolder");
        let folders = folders(&message);

        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].field_text("DisplayName"), Some("Projects"));
        assert_eq!(folders[1].field_text("DisplayName"), Some("Receipts"));
    }
}
