/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::{
    types::{DeleteType, ItemReference},
    value::{Object, Value},
    Error,
};

use super::Operation;

/// Whether to send meeting cancellations when deleting a calendar item.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/deleteitem#sendmeetingcancellations-attribute>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendMeetingCancellations {
    SendToNone,
    SendOnlyToAll,
    SendToAllAndSaveCopy,
}

impl SendMeetingCancellations {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendMeetingCancellations::SendToNone => "SendToNone",
            SendMeetingCancellations::SendOnlyToAll => "SendOnlyToAll",
            SendMeetingCancellations::SendToAllAndSaveCopy => "SendToAllAndSaveCopy",
        }
    }
}

/// A request to delete one or more items.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/deleteitem>
#[derive(Clone, Debug)]
pub struct DeleteItem {
    /// The method the server will use to perform the deletion.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/deleteitem#deletetype-attribute>
    pub delete_type: DeleteType,

    /// The action taken towards attendees when deleting a calendar item.
    ///
    /// Required when deleting calendar items, otherwise it has no effect.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/deleteitem#sendmeetingcancellations-attribute>
    pub send_meeting_cancellations: Option<SendMeetingCancellations>,

    /// A list of items to delete.
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/itemids>
    pub item_ids: Vec<ItemReference>,
}

impl Operation for DeleteItem {
    const NAME: &'static str = "DeleteItem";

    fn to_value(&self) -> Result<Value, Error> {
        let mut item_ids = Object::new();
        for item_id in &self.item_ids {
            item_ids = item_ids.field("ItemId", item_id.to_value());
        }

        Ok(Object::new()
            .attr("DeleteType", self.delete_type.as_str())
            .opt_attr(
                "SendMeetingCancellations",
                self.send_meeting_cancellations
                    .map(|cancellations| cancellations.as_str()),
            )
            .field("ItemIds", item_ids)
            .into())
    }
}
