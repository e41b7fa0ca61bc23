/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Error types for mailbox operations.

use std::fmt;

use thiserror::Error;

/// An error that occurred while performing a mailbox operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("an error occurred during HTTP transport")]
    Transport(#[from] ntlm_http::Error),

    #[error("an error occurred while (de)serializing EWS traffic")]
    Soap(#[from] ews_soap::Error),

    /// The server processed the request and reported an error for it. The
    /// response code is preserved exactly as the server stated it.
    #[error("request resulted in an error: {0}")]
    Response(#[from] ews_soap::ResponseError),

    #[error("error in processing response")]
    Processing { message: String },

    #[error("missing item or folder ID in response from Exchange")]
    MissingIdInResponse,

    #[error("response contained an unexpected number of response messages: expected {expected}, got {actual}")]
    UnexpectedResponseMessageCount { expected: usize, actual: usize },

    #[error("failed to authenticate")]
    Authentication,

    /// A step of the send-with-attachments workflow failed. The draft
    /// created by any earlier step is left in place on the server.
    #[error("failed to {step}")]
    Workflow {
        step: WorkflowStep,

        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps this error with the workflow step it occurred in.
    pub(crate) fn in_step(self, step: WorkflowStep) -> Self {
        Error::Workflow {
            step,
            source: Box::new(self),
        }
    }
}

/// A result whose error type is always an [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The step of the send-with-attachments workflow an error occurred in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowStep {
    /// Saving the message as a draft.
    SaveDraft,

    /// Attaching one of the files to the draft. Attachments are numbered
    /// from 1 in the order they were supplied.
    Attach { index: usize, name: String },

    /// Sending the finished draft.
    Send,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStep::SaveDraft => write!(formatter, "save the draft"),
            WorkflowStep::Attach { index, name } => {
                write!(formatter, "attach {name:?} (attachment {index})")
            }
            WorkflowStep::Send => write!(formatter, "send the message"),
        }
    }
}
