/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt;

/// The credentials to use when authenticating against a server.
///
/// A user name of the form `DOMAIN\user` is split into its domain and
/// account parts. A user principal name (`user@example.com`) is used as-is,
/// with an empty domain.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
    domain: String,
    workstation: String,
}

impl Credentials {
    /// Creates credentials from a user name and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Credentials {
        let username = username.into();

        let (domain, username) = match username.split_once('\\') {
            Some((domain, account)) => (domain.to_owned(), account.to_owned()),
            None => (String::new(), username),
        };

        Credentials::with_domain(username, password, domain)
    }

    /// Creates credentials with an explicit authentication domain.
    pub fn with_domain(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Credentials {
        let workstation = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from("WORKSTATION"));

        Credentials {
            username: username.into(),
            password: password.into(),
            domain: domain.into(),
            workstation,
        }
    }

    /// The account name, without any domain prefix.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The authentication domain, which may be empty.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub(crate) fn workstation(&self) -> &str {
        &self.workstation
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The password must not leak into logs.
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .finish()
    }
}
