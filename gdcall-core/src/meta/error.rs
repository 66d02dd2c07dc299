/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

/// Represents errors that can occur when converting values received from the engine.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ConvertError {
    kind: ErrorKind,
    value: Option<String>,
}

impl ConvertError {
    /// Construct with a user-defined message.
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Custom(user_message.into()),
            value: None,
        }
    }

    pub(crate) fn with_kind_value(kind: ErrorKind, value: impl fmt::Debug) -> Self {
        Self {
            kind,
            value: Some(format!("{value:?}")),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Debug representation of the value that failed to convert, if one exists.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(value) = &self.value {
            write!(f, ": {value}")?;
        }

        Ok(())
    }
}

impl Error for ConvertError {}

/// Description of what went wrong in a conversion.
#[derive(Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An integer does not fit into the target type.
    IntOutOfRange { target: &'static str },

    /// An integer is not the ordinal of any enumerator.
    UnknownEnumOrd { enum_name: &'static str },

    /// Zero was received where a non-zero instance ID was expected.
    ZeroInstanceId,

    Custom(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntOutOfRange { target } => write!(f, "integer out of range for `{target}`"),
            Self::UnknownEnumOrd { enum_name } => write!(f, "invalid ordinal for enum `{enum_name}`"),
            Self::ZeroInstanceId => write!(f, "instance ID must not be zero"),
            Self::Custom(msg) => write!(f, "{msg}"),
        }
    }
}
