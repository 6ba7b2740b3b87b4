// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Stable, human-chosen identifiers.
//!
//! Unlike job/agent systems that mint UUIDs at runtime, services and MCP
//! servers here are declared in configuration with a name the user or the
//! setup coordinator picked. These newtypes keep that distinction visible in
//! the type system instead of passing bare `String`s around.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(ServiceKey, "Unique key for a declared ServiceDef (e.g. `n8n`, `comfyui`).");
string_id!(McpServerName, "Unique name for a registered MCP server.");
string_id!(ImageRef, "A concrete, resolved container image reference.");
string_id!(CallId, "Caller-supplied correlation id for an in-flight MCP tool call.");

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
