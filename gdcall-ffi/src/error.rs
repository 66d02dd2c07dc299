/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

use crate::GodotVersion;

/// Failure while binding to the engine.
///
/// All variants indicate a mismatch between this library and the running engine. None of them can be retried.
#[derive(Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub enum InitError {
    /// The engine passed a null interface pointer.
    NullInterface,

    /// A required interface function pointer is null.
    MissingInterfaceFn(&'static str),

    /// `classdb_get_method_bind` returned null for a declared method.
    MissingMethodBind {
        class: &'static str,
        method: &'static str,
        hash: i64,
    },

    /// The builtin constructor or destructor for a type is unavailable.
    MissingBuiltinLifecycle(&'static str),

    /// The engine is older than the configured minimum.
    IncompatibleVersion {
        required: (u32, u32),
        actual: GodotVersion,
    },
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullInterface => write!(f, "engine passed a null GDExtension interface"),
            Self::MissingInterfaceFn(name) => {
                write!(f, "GDExtension interface function `{name}` is not provided by the engine")
            }
            Self::MissingMethodBind { class, method, hash } => write!(
                f,
                "method bind {class}::{method} (hash {hash}) not found; engine and bindings are out of sync"
            ),
            Self::MissingBuiltinLifecycle(what) => write!(f, "engine provides no {what}"),
            Self::IncompatibleVersion { required, actual } => write!(
                f,
                "engine version {actual} is older than the required {}.{}",
                required.0, required.1
            ),
        }
    }
}

impl Error for InitError {}
