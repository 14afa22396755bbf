//! Typed identifiers.
//!
//! Identifiers owned by this system (automations, logs, quick automations)
//! are UUID-backed. Identifiers handed to us by collaborators (record ids,
//! table names, action ids authored in the builder, page ids) are opaque
//! strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

macro_rules! define_key {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw key.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw key.
            #[must_use]
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
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Automation`](crate::automation::Automation).
    AutomationId
);

define_id!(
    /// Unique identifier for an [`AutomationLog`](crate::log::AutomationLog).
    LogId
);

define_id!(
    /// Unique identifier for a [`QuickAutomation`](crate::quick::QuickAutomation).
    QuickAutomationId
);

define_key!(
    /// Stable identifier of an [`Action`](crate::automation::Action), used only
    /// for re-entrancy tracking.
    ActionId
);

define_key!(
    /// Identifier of a record inside a table of the record store.
    RecordId
);

define_key!(
    /// Name of a collection in the record store.
    TableRef
);

define_key!(
    /// Identifier of a UI page, target of navigation actions.
    PageId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = AutomationId::new();
        let b = AutomationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = LogId::new();
        let parsed: LogId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_return_error_when_parsing_invalid_uuid() {
        assert!(AutomationId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn should_serialize_keys_as_plain_strings() {
        let id = RecordId::new("t1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t1\"");
        let parsed: ActionId = serde_json::from_str("\"a-1\"").unwrap();
        assert_eq!(parsed.as_str(), "a-1");
    }

    #[test]
    fn should_compare_keys_by_value() {
        assert_eq!(TableRef::from("tasks"), TableRef::new("tasks".to_string()));
        assert_ne!(TableRef::from("tasks"), TableRef::from("leads"));
    }
}
