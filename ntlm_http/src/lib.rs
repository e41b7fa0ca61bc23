/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! A blocking HTTP client which authenticates with NTLM over the
//! `Authorization: Negotiate` scheme.
//!
//! NTLM authenticates the underlying connection rather than individual
//! requests, so the client keeps a single connection per host and walks it
//! through the three message handshake: a negotiate message offered by the
//! client, a challenge returned by the server with a 401 status, and an
//! authenticate message carrying the LMv2 and NTLMv2 responses.
//!
//! ## Sending requests
//!
//! ```no_run
//! use ntlm_http::{Client, Credentials};
//! use url::Url;
//!
//! # fn run() -> ntlm_http::Result<()> {
//! let credentials = Credentials::new("EXAMPLE\\mailbot", "hunter2");
//! let client = Client::new(credentials)?;
//!
//! let url = Url::parse("https://mail.example.com/EWS/Exchange.asmx").unwrap();
//! client.negotiate(&url)?;
//!
//! let response = client.post(&url, b"<document/>", "text/xml; charset=utf-8")?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod client;
mod credentials;
mod error;
mod ntlm;
mod response;

pub use client::Client;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use response::{Response, StatusCode};
