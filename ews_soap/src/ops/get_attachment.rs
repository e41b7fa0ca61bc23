/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    value::{Object, Value},
    Error,
};

use super::Operation;

/// A request for the content of one or more attachments.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/getattachment>
#[derive(Clone, Debug)]
pub struct GetAttachment {
    /// The identifiers of the attachments to fetch. Attachment identifiers
    /// are issued when an item with attachments is fetched or when an
    /// attachment is created.
    pub attachment_ids: Vec<String>,
}

impl Operation for GetAttachment {
    const NAME: &'static str = "GetAttachment";

    fn to_value(&self) -> Result<Value, Error> {
        let mut attachment_ids = Object::new();
        for id in &self.attachment_ids {
            attachment_ids = attachment_ids.field("AttachmentId", Object::new().attr("Id", id.clone()));
        }

        Ok(Object::new().field("AttachmentIds", attachment_ids).into())
    }
}

/// Collects the attachments returned in a `GetAttachmentResponseMessage`.
pub fn attachments(message: &Value) -> Vec<&Value> {
    let Some(attachments) = message.get("Attachments") else {
        return Vec::new();
    };

    attachments
        .entries()
        .into_iter()
        .map(|(_, attachment)| attachment)
        .collect()
}
