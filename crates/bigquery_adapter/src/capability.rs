//! Operation classes BigQuery sources don't support.
//!
//! These are permanent. Every handler for them fails with the same error no
//! matter the arguments, without compiling or executing anything.
use std::fmt;

use crate::errors::{BigQueryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedOperation {
    Mutation,
    Subscription,
    SubscriptionExplain,
    RemoteRelationship,
}

impl UnsupportedOperation {
    pub const ALL: [UnsupportedOperation; 4] = [
        UnsupportedOperation::Mutation,
        UnsupportedOperation::Subscription,
        UnsupportedOperation::SubscriptionExplain,
        UnsupportedOperation::RemoteRelationship,
    ];

    pub fn message(&self) -> &'static str {
        match self {
            Self::Mutation => "Cannot run mutations on BigQuery sources",
            Self::Subscription => "Cannot currently perform subscriptions on BigQuery sources",
            Self::SubscriptionExplain => {
                "Cannot currently retrieve query execution plans for subscriptions on BigQuery sources"
            }
            Self::RemoteRelationship => {
                "BigQuery sources do not currently support joins with other sources"
            }
        }
    }
}

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for UnsupportedOperation {}

/// Fail with the error for `operation`.
///
/// `_args` are whatever the supported counterpart of the handler would take.
/// They're never looked at.
pub fn reject<A, T>(operation: UnsupportedOperation, _args: A) -> Result<T> {
    tracing::debug!(%operation, "rejecting unsupported operation");
    Err(BigQueryError::Unsupported(operation))
}
