/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Message listing, fetching and bookkeeping operations.

use ews_soap::ops::delete_item::DeleteItem;
use ews_soap::ops::find_item::{self, FindItem};
use ews_soap::ops::get_attachment::{self, GetAttachment};
use ews_soap::ops::get_item::{self, GetItem};
use ews_soap::ops::move_item::{self, MoveItem};
use ews_soap::ops::update_item::{ConflictResolution, ItemChange, SetItemField, UpdateItem};
use ews_soap::{
    BaseFolderId, BaseShape, DeleteType, ItemReference, ItemShape, MessageDisposition, Object,
    Traversal, Value,
};

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{AttachmentContent, EmailMessage, MessageQuery};
use crate::ExchangeClient;

impl<T: Transport> ExchangeClient<T> {
    /// Lists the messages in a folder.
    ///
    /// The folder search returns identifiers only; each message's details
    /// are fetched with a follow-up request that includes the raw MIME
    /// source, and file attachment contents are fetched alongside. The
    /// query's unread filter applies to the fetched details, and its limit
    /// caps the number of messages returned.
    pub fn get_messages(&self, query: &MessageQuery) -> Result<Vec<EmailMessage>> {
        let find_item = FindItem {
            traversal: Traversal::Shallow,
            item_shape: ItemShape {
                base_shape: BaseShape::IdOnly,
                include_mime_content: false,
            },
            calendar_view: None,
            parent_folder_ids: vec![self.delegate_folder(query.folder.clone())],
        };

        let message = self.run_single(find_item)?;

        let mut messages = Vec::new();
        for reference in find_item::item_ids(&message) {
            if query.limit.is_some_and(|limit| messages.len() >= limit) {
                break;
            }

            let get_item = GetItem {
                item_shape: ItemShape {
                    base_shape: BaseShape::Default,
                    include_mime_content: true,
                },
                item_ids: vec![reference],
            };

            let response = self.run_single(get_item)?;

            for item in get_item::items(&response) {
                let Some(mut email) = EmailMessage::from_value(item) else {
                    continue;
                };

                if query.only_unread && email.is_read {
                    continue;
                }

                for attachment_id in attachment_ids(item) {
                    email.attachments.push(self.get_attachment(&attachment_id)?);
                }

                messages.push(email);
            }
        }

        Ok(messages)
    }

    /// Fetches one attachment's content by its identifier.
    pub fn get_attachment(&self, attachment_id: &str) -> Result<AttachmentContent> {
        let get_attachment = GetAttachment {
            attachment_ids: vec![attachment_id.to_owned()],
        };

        let message = self.run_single(get_attachment)?;

        get_attachment::attachments(&message)
            .into_iter()
            .next()
            .and_then(AttachmentContent::from_value)
            .ok_or_else(|| Error::Processing {
                message: "no attachment content in response".to_string(),
            })
    }

    /// Deletes a message.
    pub fn delete_message(&self, message: &ItemReference, delete_type: DeleteType) -> Result<()> {
        let delete_item = DeleteItem {
            delete_type,
            send_meeting_cancellations: None,
            item_ids: vec![message.clone()],
        };

        self.run_single(delete_item)?;

        Ok(())
    }

    /// Moves a message to another folder, returning the identifier it
    /// received there.
    ///
    /// The original identifier is no longer valid once the move completes.
    pub fn move_message(
        &self,
        message: &ItemReference,
        to_folder: BaseFolderId,
    ) -> Result<ItemReference> {
        let move_item = MoveItem {
            to_folder_id: to_folder,
            item_ids: vec![message.clone()],
        };

        let response = self.run_single(move_item)?;

        move_item::item_ids(&response)
            .into_iter()
            .next()
            .ok_or(Error::MissingIdInResponse)
    }

    /// Marks every given message as read, in a single request.
    pub fn mark_as_read(&self, messages: &[ItemReference]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let item_changes = messages
            .iter()
            .map(|message| ItemChange {
                item_id: message.clone(),
                updates: vec![SetItemField {
                    field_uri: "message:IsRead".to_owned(),
                    item_name: "Message".to_owned(),
                    item_content: Object::new().field("IsRead", true).into(),
                }],
            })
            .collect();

        let update_item = UpdateItem {
            message_disposition: MessageDisposition::SaveOnly,
            conflict_resolution: ConflictResolution::AlwaysOverwrite,
            item_changes,
        };

        self.run_batch(update_item, messages.len())?;

        Ok(())
    }
}

/// The identifiers of a message's file attachments.
///
/// Item attachments (attached mails or calendar items) carry no file
/// content and are not fetched.
fn attachment_ids(item: &Value) -> Vec<String> {
    if item.field_text("HasAttachments") != Some("true") {
        return Vec::new();
    }

    let Some(attachments) = item.get("Attachments") else {
        return Vec::new();
    };

    attachments
        .sequence("FileAttachment")
        .into_iter()
        .filter_map(|attachment| attachment.get("AttachmentId"))
        .filter_map(|id| id.attribute("Id"))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use base64::prelude::{Engine, BASE64_STANDARD};

    use crate::test_utils::{
        error_message, operation_response, success_message, test_config, MockTransport,
    };

    use super::*;

    fn find_reply(item_ids: &[&str]) -> String {
        let items: String = item_ids
            .iter()
            .map(|id| format!(r#"<t:Message><t:ItemId Id="{id}" ChangeKey="CQAAABYA"/></t:Message>"#))
            .collect();

        operation_response(
            "FindItem",
            &success_message(
                "FindItem",
                &format!(
                    r#"<m:RootFolder TotalItemsInView="{}" IncludesLastItemInRange="true"><t:Items>{items}</t:Items></m:RootFolder>"#,
                    item_ids.len()
                ),
            ),
        )
    }

    fn message_item(id: &str, is_read: bool, attachments: &str) -> String {
        format!(
            r#"<t:Message><t:ItemId Id="{id}" ChangeKey="CQAAABYA"/><t:Subject>Weekly report</t:Subject><t:Body BodyType="Text">Numbers attached.</t:Body><t:From><t:Mailbox><t:Name>Reports</t:Name><t:EmailAddress>reports@example.com</t:EmailAddress></t:Mailbox></t:From><t:ToRecipients><t:Mailbox><t:EmailAddress>team@example.com</t:EmailAddress></t:Mailbox></t:ToRecipients><t:IsRead>{is_read}</t:IsRead>{attachments}</t:Message>"#
        )
    }

    fn get_item_reply(item: &str) -> String {
        operation_response(
            "GetItem",
            &success_message("GetItem", &format!("<m:Items>{item}</m:Items>")),
        )
    }

    #[test]
    fn get_messages_fetches_details_and_attachments() {
        let attachments = r#"<t:HasAttachments>true</t:HasAttachments><t:Attachments><t:FileAttachment><t:AttachmentId Id="AAMkAGIAqy4AAA="/><t:Name>numbers.xls</t:Name></t:FileAttachment></t:Attachments>"#;
        let attachment_reply = operation_response(
            "GetAttachment",
            &success_message(
                "GetAttachment",
                &format!(
                    r#"<m:Attachments><t:FileAttachment><t:Name>numbers.xls</t:Name><t:ContentType>application/vnd.ms-excel</t:ContentType><t:Content>{}</t:Content></t:FileAttachment></m:Attachments>"#,
                    BASE64_STANDARD.encode("cells")
                ),
            ),
        );

        let transport = MockTransport::new()
            .reply(find_reply(&["AAMkAGIA"]))
            .reply(get_item_reply(&message_item("AAMkAGIA", false, attachments)))
            .reply(attachment_reply);
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let messages = client.get_messages(&MessageQuery::inbox()).unwrap();

        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.subject.as_deref(), Some("Weekly report"));
        assert_eq!(
            message.from.as_ref().map(|from| from.email_address.as_str()),
            Some("reports@example.com")
        );
        assert_eq!(message.to_recipients.len(), 1);
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].content, b"cells");

        // The detail fetch asks for the MIME source.
        let get_request = &transport.requests()[1];
        assert!(get_request.contains("<t:IncludeMimeContent>true</t:IncludeMimeContent>"));
    }

    #[test]
    fn get_messages_skips_read_messages_when_asked() {
        let transport = MockTransport::new()
            .reply(find_reply(&["AAMkAGIA", "AAMkAGIB"]))
            .reply(get_item_reply(&message_item("AAMkAGIA", true, "")))
            .reply(get_item_reply(&message_item("AAMkAGIB", false, "")));
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let query = MessageQuery::inbox().only_unread();
        let messages = client.get_messages(&query).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].item.id, "AAMkAGIB");
    }

    #[test]
    fn get_messages_stops_at_the_limit() {
        let transport = MockTransport::new()
            .reply(find_reply(&["AAMkAGIA", "AAMkAGIB", "AAMkAGIC"]))
            .reply(get_item_reply(&message_item("AAMkAGIA", false, "")))
            .reply(get_item_reply(&message_item("AAMkAGIB", false, "")));
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let query = MessageQuery::inbox().limit(2);
        let messages = client.get_messages(&query).unwrap();

        assert_eq!(messages.len(), 2);

        // No detail request goes out for items beyond the limit.
        assert_eq!(transport.request_count(), 3);
    }

    #[test]
    fn get_messages_searches_the_delegate_folder_when_configured() {
        let transport = MockTransport::new().reply(find_reply(&[]));
        let config = test_config().with_delegate("shared-mailbox@example.com");
        let client = ExchangeClient::with_transport(config, &transport);

        client.get_messages(&MessageQuery::inbox()).unwrap();

        let request = &transport.requests()[0];
        assert!(request.contains(r#"<t:DistinguishedFolderId Id="inbox">"#));
        assert!(request.contains(
            "<t:Mailbox><t:EmailAddress>shared-mailbox@example.com</t:EmailAddress></t:Mailbox>"
        ));
    }

    #[test]
    fn get_attachment_decodes_the_content() {
        let transport = MockTransport::new().reply(operation_response(
            "GetAttachment",
            &success_message(
                "GetAttachment",
                &format!(
                    r#"<m:Attachments><t:FileAttachment><t:Name>o2-1.jpg</t:Name><t:ContentType>image/jpeg</t:ContentType><t:Content>{}</t:Content></t:FileAttachment></m:Attachments>"#,
                    BASE64_STANDARD.encode([0xffu8, 0xd8, 0xff, 0xe0])
                ),
            ),
        ));
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let attachment = client.get_attachment("AAMkAGIAqy4AAA=").unwrap();

        assert_eq!(attachment.name, "o2-1.jpg");
        assert_eq!(attachment.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(attachment.content, [0xff, 0xd8, 0xff, 0xe0]);

        let request = &transport.requests()[0];
        assert!(request.contains(r#"<t:AttachmentId Id="AAMkAGIAqy4AAA="/>"#));
    }

    #[test]
    fn delete_message_states_no_cancellation_policy() {
        let transport = MockTransport::new().reply(operation_response(
            "DeleteItem",
            &success_message("DeleteItem", ""),
        ));
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let reference = ItemReference::new("AAMkAGIA", Some("CQAAABYA".to_owned()));
        client
            .delete_message(&reference, DeleteType::MoveToDeletedItems)
            .unwrap();

        let request = &transport.requests()[0];
        assert!(request.contains(r#"<m:DeleteItem DeleteType="MoveToDeletedItems">"#));
        assert!(!request.contains("SendMeetingCancellations"));
    }

    #[test]
    fn move_message_returns_the_new_reference() {
        let transport = MockTransport::new().reply(operation_response(
            "MoveItem",
            &success_message(
                "MoveItem",
                r#"<m:Items><t:Message><t:ItemId Id="AAMkAGRe" ChangeKey="CQAAABYR"/></t:Message></m:Items>"#,
            ),
        ));
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let reference = ItemReference::new("AAMkAGIA", Some("CQAAABYA".to_owned()));
        let moved = client
            .move_message(&reference, BaseFolderId::folder_id("AQMkADAw"))
            .unwrap();

        assert_eq!(moved, ItemReference::new("AAMkAGRe", Some("CQAAABYR".to_owned())));

        let request = &transport.requests()[0];
        assert!(request.contains(r#"<m:ToFolderId><t:FolderId Id="AQMkADAw"/></m:ToFolderId>"#));
    }

    #[test]
    fn mark_as_read_updates_every_message_in_one_request() {
        let update_reply = operation_response(
            "UpdateItem",
            &format!(
                "{}{}",
                success_message("UpdateItem", ""),
                success_message("UpdateItem", "")
            ),
        );

        let transport = MockTransport::new().reply(update_reply);
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let references = [
            ItemReference::new("AAMkAGIA", Some("CQAAABYA".to_owned())),
            ItemReference::new("AAMkAGIB", Some("CQAAABYB".to_owned())),
        ];
        client.mark_as_read(&references).unwrap();

        assert_eq!(transport.request_count(), 1);

        let request = &transport.requests()[0];
        assert!(request.contains(
            r#"<m:UpdateItem MessageDisposition="SaveOnly" ConflictResolution="AlwaysOverwrite">"#
        ));
        assert_eq!(request.matches("<t:ItemChange>").count(), 2);
        assert!(request.contains(r#"<t:FieldURI FieldURI="message:IsRead"/>"#));
    }

    #[test]
    fn mark_as_read_rejects_a_short_response() {
        let update_reply = operation_response(
            "UpdateItem",
            &success_message("UpdateItem", ""),
        );

        let transport = MockTransport::new().reply(update_reply);
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let references = [
            ItemReference::new("AAMkAGIA", None),
            ItemReference::new("AAMkAGIB", None),
        ];
        let err = client.mark_as_read(&references).unwrap_err();

        assert!(matches!(
            err,
            Error::UnexpectedResponseMessageCount {
                expected: 2,
                actual: 1,
            }
        ));
    }

    #[test]
    fn mark_as_read_with_no_messages_makes_no_request() {
        let transport = MockTransport::new();
        let client = ExchangeClient::with_transport(test_config(), &transport);

        client.mark_as_read(&[]).unwrap();

        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn failed_message_lookup_carries_the_server_code() {
        let transport = MockTransport::new()
            .reply(find_reply(&["AAMkAGIA"]))
            .reply(operation_response(
                "GetItem",
                &error_message(
                    "GetItem",
                    "ErrorItemNotFound",
                    "The specified object was not found in the store.",
                ),
            ));
        let client = ExchangeClient::with_transport(test_config(), &transport);

        let err = client.get_messages(&MessageQuery::inbox()).unwrap_err();

        match err {
            Error::Response(response) => {
                assert_eq!(response.response_code.as_str(), "ErrorItemNotFound")
            }
            other => panic!("expected a response error, got {other:?}"),
        }
    }
}
