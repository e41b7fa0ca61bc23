/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! EWS operations and their request structures.
//!
//! Each module covers one operation: the request type, any vocabulary
//! specific to that operation, and accessors for pulling that operation's
//! results out of a response message.

pub mod create_attachment;
pub mod create_item;
pub mod delete_item;
pub mod find_folder;
pub mod find_item;
pub mod get_attachment;
pub mod get_item;
pub mod move_item;
pub mod send_item;
pub mod update_item;

use crate::{value::Value, Error};

/// An EWS operation that can be sent to a server.
pub trait Operation {
    /// The name of the element identifying this operation in a SOAP body.
    const NAME: &'static str;

    /// Builds the operation element's attributes and content.
    fn to_value(&self) -> Result<Value, Error>;
}
