/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Sending messages, including the multi-step workflow attachments need.
//!
//! A message without attachments goes out in a single request. With
//! attachments, the message is first saved as a draft, each file is
//! attached in turn, and the finished draft is sent. Attaching changes the
//! draft, so each step's response carries a new change key that must feed
//! the next step; the server rejects operations made with a stale key.

use ews_soap::ops::create_attachment::{self, CreateAttachment, FileAttachment};
use ews_soap::ops::create_item::{self, CreateItem};
use ews_soap::ops::send_item::SendItem;
use ews_soap::{
    distinguished, BaseFolderId, ItemReference, Mailbox, MessageDisposition, Object, Value,
};

use crate::error::{Error, Result, WorkflowStep};
use crate::transport::Transport;
use crate::types::{OutgoingAttachment, OutgoingMessage};
use crate::ExchangeClient;

impl<T: Transport> ExchangeClient<T> {
    /// Sends a message.
    ///
    /// A failure partway through the attachment workflow reports the step
    /// it occurred in. A draft created by an earlier step stays in the
    /// drafts folder; it is not rolled back.
    pub fn send_message(&self, message: &OutgoingMessage) -> Result<()> {
        if message.attachments.is_empty() {
            return self.send_in_one_request(message);
        }

        let mut reference = self
            .save_draft(message)
            .map_err(|err| err.in_step(WorkflowStep::SaveDraft))?;

        for (index, attachment) in message.attachments.iter().enumerate() {
            reference = self.attach_file(&reference, attachment).map_err(|err| {
                err.in_step(WorkflowStep::Attach {
                    index: index + 1,
                    name: attachment.name.clone(),
                })
            })?;
        }

        self.send_draft(message, reference)
            .map_err(|err| err.in_step(WorkflowStep::Send))
    }

    fn send_in_one_request(&self, message: &OutgoingMessage) -> Result<()> {
        let (message_disposition, saved_item_folder_id) = if message.save_to_sent_items {
            (
                MessageDisposition::SendAndSaveCopy,
                Some(BaseFolderId::distinguished(distinguished::SENT_ITEMS)),
            )
        } else {
            (MessageDisposition::SendOnly, None)
        };

        let create_item = CreateItem {
            message_disposition: Some(message_disposition),
            send_meeting_invitations: None,
            saved_item_folder_id,
            items: Object::new()
                .field("Message", self.message_value(message))
                .into(),
        };

        self.run_single(create_item)?;

        Ok(())
    }

    fn save_draft(&self, message: &OutgoingMessage) -> Result<ItemReference> {
        let create_item = CreateItem {
            message_disposition: Some(MessageDisposition::SaveOnly),
            send_meeting_invitations: None,
            saved_item_folder_id: Some(BaseFolderId::distinguished(distinguished::DRAFTS)),
            items: Object::new()
                .field("Message", self.message_value(message))
                .into(),
        };

        let response = self.run_single(create_item)?;

        create_item::item_ids(&response)
            .into_iter()
            .next()
            .ok_or(Error::MissingIdInResponse)
    }

    /// Attaches one file to the draft and returns the draft's new
    /// reference.
    fn attach_file(
        &self,
        draft: &ItemReference,
        attachment: &OutgoingAttachment,
    ) -> Result<ItemReference> {
        let create_attachment = CreateAttachment {
            parent_item_id: draft.clone(),
            attachments: vec![FileAttachment {
                name: attachment.name.clone(),
                content_type: attachment.content_type.clone(),
                content: attachment.encoded_content(),
            }],
        };

        let response = self.run_single(create_attachment)?;

        let identifiers = create_attachment::attachment_identifiers(&response)
            .ok_or(Error::MissingIdInResponse)?;

        Ok(ItemReference::new(
            identifiers.root_item_id,
            identifiers.root_item_change_key,
        ))
    }

    fn send_draft(&self, message: &OutgoingMessage, draft: ItemReference) -> Result<()> {
        let saved_item_folder_id = message
            .save_to_sent_items
            .then(|| BaseFolderId::distinguished(distinguished::SENT_ITEMS));

        let send_item = SendItem {
            save_item_to_folder: message.save_to_sent_items,
            item_ids: vec![draft],
            saved_item_folder_id,
        };

        self.run_single(send_item)?;

        Ok(())
    }

    /// Builds the `Message` element for creation requests.
    fn message_value(&self, message: &OutgoingMessage) -> Value {
        let mut item = Object::new()
            .field("ItemClass", "IPM.Note")
            .field("Subject", message.subject.clone())
            .field("Body", message.body.clone())
            .field("ToRecipients", recipients_value(&message.to));

        if !message.cc.is_empty() {
            item = item.field("CcRecipients", recipients_value(&message.cc));
        }

        if !message.bcc.is_empty() {
            item = item.field("BccRecipients", recipients_value(&message.bcc));
        }

        // The From address only appears when sending for another mailbox;
        // the server fills in the account's own address otherwise.
        if let Some(delegate) = &self.config.delegate {
            item = item.field(
                "From",
                Object::new().field("Mailbox", Mailbox::address(delegate.clone())),
            );
        }

        if message.mark_as_read {
            item = item.field("IsRead", true);
        }

        item.into()
    }
}

fn recipients_value(addresses: &[String]) -> Value {
    let mut recipients = Object::new();
    for address in addresses {
        recipients = recipients.field("Mailbox", Mailbox::address(address.clone()));
    }

    recipients.into()
}
