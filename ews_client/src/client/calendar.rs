/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Calendar operations.

use ews_soap::ops::create_item::{self, CreateItem, SendMeetingInvitations};
use ews_soap::ops::delete_item::{DeleteItem, SendMeetingCancellations};
use ews_soap::ops::find_item::{self, FindItem};
use ews_soap::ops::get_item::{self, GetItem};
use ews_soap::{
    distinguished, BaseFolderId, BaseShape, CalendarView, DateTime, DeleteType, ItemReference,
    ItemShape, Object, Traversal,
};

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{Event, NewEvent};
use crate::ExchangeClient;

impl<T: Transport> ExchangeClient<T> {
    /// Creates a calendar event and returns its identifier.
    pub fn create_event(&self, event: &NewEvent) -> Result<ItemReference> {
        let send_meeting_invitations = if event.send_invitations {
            SendMeetingInvitations::SendToAllAndSaveCopy
        } else {
            SendMeetingInvitations::SendToNone
        };

        let mut item = Object::new().field("Subject", event.subject.clone());

        if let Some(body) = &event.body {
            item = item.field("Body", body.clone());
        }

        let item = item
            .field("Start", event.start.to_wire()?)
            .field("End", event.end.to_wire()?)
            .field("IsAllDayEvent", event.all_day)
            .field("LegacyFreeBusyStatus", "Busy")
            .opt_field("Location", event.location.clone());

        let create_item = CreateItem {
            message_disposition: None,
            send_meeting_invitations: Some(send_meeting_invitations),
            saved_item_folder_id: Some(
                self.delegate_folder(BaseFolderId::distinguished(distinguished::CALENDAR)),
            ),
            items: Object::new().field("CalendarItem", item).into(),
        };

        let message = self.run_single(create_item)?;

        create_item::item_ids(&message)
            .into_iter()
            .next()
            .ok_or(Error::MissingIdInResponse)
    }

    /// Lists the calendar events falling within a window of time.
    ///
    /// Recurring events are expanded into their individual occurrences. The
    /// search itself returns identifiers only; each event's details are
    /// fetched with a follow-up request. A window containing no events
    /// yields an empty list.
    pub fn get_events(&self, start: DateTime, end: DateTime) -> Result<Vec<Event>> {
        let find_item = FindItem {
            traversal: Traversal::Shallow,
            item_shape: ItemShape {
                base_shape: BaseShape::IdOnly,
                include_mime_content: false,
            },
            calendar_view: Some(CalendarView::new(start, end)),
            parent_folder_ids: vec![
                self.delegate_folder(BaseFolderId::distinguished(distinguished::CALENDAR)),
            ],
        };

        let message = self.run_single(find_item)?;

        let mut events = Vec::new();
        for reference in find_item::item_ids(&message) {
            let get_item = GetItem {
                item_shape: ItemShape::default(),
                item_ids: vec![reference],
            };

            let message = self.run_single(get_item)?;

            for item in get_item::items(&message) {
                events.extend(Event::from_value(item));
            }
        }

        Ok(events)
    }

    /// Deletes a calendar event.
    ///
    /// The server requires calendar deletions to state what attendees are
    /// told about the cancellation.
    pub fn delete_event(
        &self,
        event: &ItemReference,
        delete_type: DeleteType,
        cancellations: SendMeetingCancellations,
    ) -> Result<()> {
        let delete_item = DeleteItem {
            delete_type,
            send_meeting_cancellations: Some(cancellations),
            item_ids: vec![event.clone()],
        };

        self.run_single(delete_item)?;

        Ok(())
    }
}
