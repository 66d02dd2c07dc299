/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Conversions between Rust values and their engine representation.
//!
//! Every type that appears in an engine method signature implements [`GodotConvert`], naming the "via" type that is
//! actually staged in a [`CallFrame`][crate::sys::CallFrame]. Narrow integers travel as `i64`, `f32` as `f64` and
//! enums as their ordinal; conversions back from the engine are checked.

mod error;
mod impls;

pub use error::{ConvertError, ErrorKind};
pub use gdcall_ffi::{ClassName, MethodDecl};

use crate::sys::GodotFfi;

/// Indicates that a type can be passed to/from the engine, either directly or through an intermediate "via" type.
pub trait GodotConvert {
    /// The type through which `Self` is represented in the engine.
    type Via: GodotFfi;
}

/// Defines the canonical conversion to the engine for a type.
pub trait ToGodot: GodotConvert {
    /// Converts this type to the engine type by reference, usually by copying.
    fn to_godot(&self) -> Self::Via;
}

/// Defines the canonical conversion from the engine for a type.
///
/// Converting to the engine and back again must return a value equal to the starting value.
pub trait FromGodot: Sized + GodotConvert {
    /// Converts the engine representation to this type, returning `Err` on failure.
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError>;

    /// ⚠️ Converts the engine representation to this type.
    ///
    /// # Panics
    /// If the conversion fails.
    fn from_godot(via: Self::Via) -> Self {
        Self::try_from_godot(via).unwrap_or_else(|err| panic!("FromGodot::from_godot() failed: {err}"))
    }
}
