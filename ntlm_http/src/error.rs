/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use crate::{Response, StatusCode};

/// An error that happened either when building a request, sending it, or
/// completing the authentication handshake.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided URL features a protocol scheme that is not supported (i.e.
    /// which is neither HTTP nor HTTPS).
    #[error("url scheme is not supported: {0}")]
    UnsupportedScheme(String),

    /// The request could not be sent, or its response could not be read.
    #[error("failed to perform HTTP request")]
    Network(#[from] reqwest::Error),

    /// The authentication handshake broke down before credentials could be
    /// verified, e.g. because the server's challenge was malformed.
    ///
    /// It includes a human-readable message that provides context on the
    /// step that failed.
    #[error("authentication handshake failed: {0}")]
    Handshake(&'static str),

    /// The server rejected the provided credentials.
    #[error("server rejected the provided credentials")]
    Unauthorized,

    /// The status of the response is either a client error or a server error
    /// (i.e. its status code is within the 400-599 range).
    #[error("HTTP error ({status})")]
    StatusCode {
        status: StatusCode,
        response: Response,
    },
}

/// A result which error type is always an [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
