/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::cell::RefCell;

use base64::prelude::{Engine, BASE64_STANDARD};
use reqwest::header;
use url::Url;

use crate::credentials::Credentials;
use crate::error::Error;
use crate::ntlm;
use crate::response::Response;

/// How far along the handshake the client's connection is.
enum AuthState {
    /// No handshake has been run, or the last one was discarded.
    Anonymous,

    /// The server has issued a challenge which has not been answered yet.
    Challenged(ntlm::Challenge),

    /// The connection has accepted an authenticated request.
    Authenticated,
}

/// An HTTP client which holds NTLM credentials and authenticates its
/// connection on demand.
pub struct Client {
    http: reqwest::blocking::Client,
    credentials: Credentials,
    state: RefCell<AuthState>,
}

impl Client {
    /// Creates a new client bound to the given credentials.
    pub fn new(credentials: Credentials) -> crate::Result<Client> {
        // NTLM authenticates the connection, not the request, so the pool
        // must keep a single reusable connection per host.
        let http = reqwest::blocking::Client::builder()
            .http1_only()
            .pool_max_idle_per_host(1)
            .build()?;

        Ok(Client {
            http,
            credentials,
            state: RefCell::new(AuthState::Anonymous),
        })
    }

    /// Runs the negotiate leg of the handshake against the given URL,
    /// parking the server's challenge for the next request.
    ///
    /// A server which answers with a success status does not require
    /// authentication, and the connection is usable as-is.
    pub fn negotiate(&self, url: &Url) -> crate::Result<()> {
        check_scheme(url)?;

        let token = BASE64_STANDARD.encode(ntlm::negotiate_message(&self.credentials));
        let response = self.execute(url, None, Some(&token))?;

        if !response.status().is_unauthorized() {
            response.error_from_status()?;
            *self.state.borrow_mut() = AuthState::Authenticated;

            return Ok(());
        }

        let token = challenge_token(&response).ok_or(Error::Handshake(
            "server did not issue an NTLM challenge",
        ))?;
        let message = BASE64_STANDARD
            .decode(token)
            .map_err(|_| Error::Handshake("authentication challenge is not valid base64"))?;
        let challenge = ntlm::Challenge::parse(&message)?;

        log::debug!("received NTLM challenge from {}", url.host_str().unwrap_or_default());
        *self.state.borrow_mut() = AuthState::Challenged(challenge);

        Ok(())
    }

    /// Sends a POST request with the given body, completing the handshake
    /// if a challenge is pending.
    ///
    /// If the server challenges a connection that was already
    /// authenticated, the handshake is replayed once before the request is
    /// reported as unauthorized.
    pub fn post(&self, url: &Url, body: &[u8], content_type: &str) -> crate::Result<Response> {
        check_scheme(url)?;

        let response = self.send_from_state(url, body, content_type)?;
        if !response.status().is_unauthorized() {
            *self.state.borrow_mut() = AuthState::Authenticated;

            return Ok(response);
        }

        log::debug!("server challenged the connection again, replaying the handshake");
        *self.state.borrow_mut() = AuthState::Anonymous;
        self.negotiate(url)?;

        let response = self.send_from_state(url, body, content_type)?;
        if response.status().is_unauthorized() {
            *self.state.borrow_mut() = AuthState::Anonymous;

            return Err(Error::Unauthorized);
        }

        *self.state.borrow_mut() = AuthState::Authenticated;

        Ok(response)
    }

    /// Discards any authentication state, forcing a full handshake on the
    /// next request.
    pub fn reset(&self) {
        *self.state.borrow_mut() = AuthState::Anonymous;
    }

    /// Sends a single POST request, answering the parked challenge if there
    /// is one. The caller is responsible for updating the state from the
    /// outcome.
    fn send_from_state(
        &self,
        url: &Url,
        body: &[u8],
        content_type: &str,
    ) -> crate::Result<Response> {
        let token = match self.state.replace(AuthState::Anonymous) {
            AuthState::Challenged(challenge) => Some(BASE64_STANDARD.encode(
                ntlm::authenticate_message(&self.credentials, &challenge),
            )),
            _ => None,
        };

        self.execute(url, Some((body, content_type)), token.as_deref())
    }

    /// Builds and sends one request, returning the buffered response.
    fn execute(
        &self,
        url: &Url,
        body: Option<(&[u8], &str)>,
        auth_token: Option<&str>,
    ) -> crate::Result<Response> {
        let mut request = self.http.post(url.clone());

        if let Some(token) = auth_token {
            request = request.header(header::AUTHORIZATION, format!("Negotiate {token}"));
        }

        if let Some((content, content_type)) = body {
            request = request
                .header(header::CONTENT_TYPE, content_type)
                .body(content.to_vec());
        }

        let response = request.send()?;
        let status = response.status().into();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Extracts the challenge token from a 401 response's `WWW-Authenticate`
/// headers. Servers advertise the scheme as either `Negotiate` or `NTLM`,
/// and may list both.
fn challenge_token(response: &Response) -> Option<&str> {
    response
        .headers
        .get_all(header::WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            value
                .strip_prefix("Negotiate ")
                .or_else(|| value.strip_prefix("NTLM "))
        })
        .map(str::trim)
}

/// We only support HTTP(S) URLs.
fn check_scheme(url: &Url) -> crate::Result<()> {
    // url.scheme() is always lower-cased.
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::UnsupportedScheme(url.scheme().into()));
    }

    Ok(())
}
