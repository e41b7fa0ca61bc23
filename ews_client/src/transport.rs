/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The HTTP capability a client drives its requests through.

use url::Url;

/// The operations a client needs from its HTTP layer.
///
/// The client takes the transport as an injected capability rather than
/// owning a concrete HTTP stack, so test doubles can serve canned responses
/// and count the session bracketing.
pub trait Transport {
    /// Prepares the transport for one protocol call, performing whatever
    /// authentication setup it requires.
    fn acquire(&self) -> Result<(), ntlm_http::Error>;

    /// Sends one serialized request and returns the raw response body.
    fn send(&self, endpoint: &Url, body: &[u8]) -> Result<Vec<u8>, ntlm_http::Error>;

    /// Discards any per-call transport state.
    ///
    /// Called exactly once for every call to [`Transport::acquire`],
    /// including calls that failed after installing partial state.
    fn release(&self);
}

impl<T: Transport + ?Sized> Transport for &T {
    fn acquire(&self) -> Result<(), ntlm_http::Error> {
        (**self).acquire()
    }

    fn send(&self, endpoint: &Url, body: &[u8]) -> Result<Vec<u8>, ntlm_http::Error> {
        (**self).send(endpoint, body)
    }

    fn release(&self) {
        (**self).release()
    }
}

/// Scopes transport acquisition to one protocol call.
///
/// The guard releases the transport on drop, so every exit path out of a
/// call releases exactly once, errors included. The guard is constructed
/// before acquisition is checked, so a failed acquisition still releases
/// whatever partial state it installed.
pub(crate) struct SessionGuard<'t, T: Transport + ?Sized> {
    transport: &'t T,
}

impl<'t, T: Transport + ?Sized> SessionGuard<'t, T> {
    pub(crate) fn acquire(transport: &'t T) -> Result<Self, ntlm_http::Error> {
        let guard = SessionGuard { transport };
        transport.acquire()?;

        Ok(guard)
    }

    pub(crate) fn send(&self, endpoint: &Url, body: &[u8]) -> Result<Vec<u8>, ntlm_http::Error> {
        self.transport.send(endpoint, body)
    }
}

impl<T: Transport + ?Sized> Drop for SessionGuard<'_, T> {
    fn drop(&mut self) {
        self.transport.release();
    }
}

/// A [`Transport`] speaking NTLM-authenticated HTTP to one endpoint.
pub struct NtlmTransport {
    client: ntlm_http::Client,
    endpoint: Url,
}

impl NtlmTransport {
    pub fn new(credentials: ntlm_http::Credentials, endpoint: Url) -> Result<Self, ntlm_http::Error> {
        Ok(NtlmTransport {
            client: ntlm_http::Client::new(credentials)?,
            endpoint,
        })
    }
}

impl Transport for NtlmTransport {
    fn acquire(&self) -> Result<(), ntlm_http::Error> {
        self.client.negotiate(&self.endpoint)
    }

    fn send(&self, endpoint: &Url, body: &[u8]) -> Result<Vec<u8>, ntlm_http::Error> {
        let response = self.client.post(endpoint, body, "text/xml; charset=utf-8")?;

        // A SOAP fault arrives as HTTP 500 with a fault document in the
        // body. It carries protocol content, so it passes through for
        // parsing rather than being rejected here.
        if response.status().is_server_error() && !response.body().is_empty() {
            return Ok(response.into_body());
        }

        match response.error_from_status() {
            Ok(response) => Ok(response.into_body()),
            Err(err) => {
                log::error!("request failed: {err}");

                Err(err)
            }
        }
    }

    fn release(&self) {
        self.client.reset();
    }
}
