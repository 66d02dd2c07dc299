/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Built-in types like `Vector3`, `Transform3D` or `GString`.
//!
//! Math types are plain `#[repr(C)]` values with the engine's layout and are passed to ptrcalls by address.
//! `GString` owns engine memory and is released through the engine's destructor.

mod macros;

mod string;
mod transform;
mod vectors;

pub use string::GString;
pub use transform::{Basis, Transform3D};
pub use vectors::{Vector2, Vector3};

/// Tolerance used by `is_equal_approx()` functions.
pub const CMP_EPSILON: f32 = 0.00001;

/// Returns `true` if `a` and `b` are approximately equal, relative to their magnitude.
pub fn is_equal_approx(a: f32, b: f32) -> bool {
    if a == b {
        return true;
    }
    let tolerance = (CMP_EPSILON * a.abs()).max(CMP_EPSILON);
    (a - b).abs() < tolerance
}
