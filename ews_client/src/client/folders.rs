/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Folder listing and lookup.

use ews_soap::ops::find_folder::{self, FindFolder};
use ews_soap::{BaseFolderId, BaseShape, FolderShape, Traversal};

use crate::error::Result;
use crate::transport::Transport;
use crate::types::FolderInfo;
use crate::ExchangeClient;

impl<T: Transport> ExchangeClient<T> {
    /// Lists the folders directly under the given parent.
    pub fn subfolders(&self, parent: &BaseFolderId) -> Result<Vec<FolderInfo>> {
        let find_folder = FindFolder {
            traversal: Traversal::Shallow,
            folder_shape: FolderShape {
                base_shape: BaseShape::Default,
            },
            parent_folder_ids: vec![parent.clone()],
        };

        let message = self.run_single(find_folder)?;

        Ok(find_folder::folders(&message)
            .into_iter()
            .filter_map(FolderInfo::from_value)
            .collect())
    }

    /// Returns the first subfolder whose display name satisfies the given
    /// predicate.
    pub fn find_folder(
        &self,
        parent: &BaseFolderId,
        mut predicate: impl FnMut(&str) -> bool,
    ) -> Result<Option<FolderInfo>> {
        Ok(self
            .subfolders(parent)?
            .into_iter()
            .find(|folder| predicate(&folder.display_name)))
    }
}

#[cfg(test)]
mod tests {
    use ews_soap::distinguished;

    use crate::test_utils::{operation_response, success_message, test_config, MockTransport};

    use super::*;

    fn folder_listing_reply() -> String {
        operation_response(
            "FindFolder",
            &success_message(
                "FindFolder",
                r#"<m:RootFolder TotalItemsInView="2" IncludesLastItemInRange="true"><t:Folders><t:Folder><t:FolderId Id="AQMkADAw" ChangeKey="AQAAABYA"/><t:DisplayName>Reports</t:DisplayName><t:TotalCount>12</t:TotalCount><t:ChildFolderCount>0</t:ChildFolderCount><t:UnreadCount>3</t:UnreadCount></t:Folder><t:Folder><t:FolderId Id="AQMkADAx"/><t:DisplayName>Receipts</t:DisplayName></t:Folder></t:Folders></m:RootFolder>"#,
            ),
        )
    }

    #[test]
    fn subfolders_are_listed_with_their_counts() {
        let transport = MockTransport::new().reply(folder_listing_reply());
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let folders = client
            .subfolders(&BaseFolderId::distinguished(distinguished::MSG_FOLDER_ROOT))
            .unwrap();

        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].display_name, "Reports");
        assert_eq!(folders[0].unread_count, Some(3));
        assert_eq!(folders[1].display_name, "Receipts");
        assert_eq!(folders[1].total_count, None);

        let request = &transport.requests()[0];
        assert!(request.contains(r#"<m:FindFolder Traversal="Shallow">"#));
        assert!(request.contains("<t:BaseShape>Default</t:BaseShape>"));
        assert!(request.contains(r#"<t:DistinguishedFolderId Id="msgfolderroot"/>"#));
    }

    #[test]
    fn find_folder_matches_display_names() {
        let transport = MockTransport::new()
            .reply(folder_listing_reply())
            .reply(folder_listing_reply());
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let parent = BaseFolderId::distinguished(distinguished::MSG_FOLDER_ROOT);

        let found = client
            .find_folder(&parent, |name| name.starts_with("Rec"))
            .unwrap();
        assert_eq!(found.map(|folder| folder.display_name), Some("Receipts".to_owned()));

        let missing = client.find_folder(&parent, |name| name == "Invoices").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn a_bare_single_folder_still_lists() {
        let transport = MockTransport::new().reply(operation_response(
            "FindFolder",
            &success_message(
                "FindFolder",
                r#"<m:RootFolder TotalItemsInView="1" IncludesLastItemInRange="true"><t:Folders><t:Folder><t:FolderId Id="AQMkADAw"/><t:DisplayName>Archive 2023</t:DisplayName></t:Folder></t:Folders></m:RootFolder>"#,
            ),
        ));
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let folders = client
            .subfolders(&BaseFolderId::folder_id("AQMkADAz"))
            .unwrap();

        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].display_name, "Archive 2023");
    }
}
