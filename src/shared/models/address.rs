//! Opaque identifier newtypes.
//!
//! Addresses are interned as `Arc<str>` so they are cheap to clone across
//! the graph's adjacency indices, taint results, and cluster membership
//! sets.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

macro_rules! interned_string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Arc<str>);

        impl $name {
            pub fn new(value: impl Into<Arc<str>>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(Arc::from(value))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(Arc::from(value))
            }
        }
    };
}

interned_string_id!(Address);
interned_string_id!(IncidentId);
interned_string_id!(TxSignature);
interned_string_id!(ProgramId);

/// Monotonically increasing block height ordinal.
pub type Slot = u64;

/// Unix seconds. Signed so callers can represent "unknown" as a sentinel
/// if ever needed, but in practice always non-negative.
pub type UnixSeconds = i64;
