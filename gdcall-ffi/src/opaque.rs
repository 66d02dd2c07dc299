/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Stores an opaque engine value of a certain size, with very restricted operations.
///
/// Note: due to `align(4)` / `align(8)` and not `packed` repr, this type may be bigger than `N` bytes
/// (which should be OK since the engine just needs to read/write those `N` bytes reliably).
#[cfg_attr(target_pointer_width = "32", repr(C, align(4)))]
#[cfg_attr(target_pointer_width = "64", repr(C, align(8)))]
#[derive(Copy, Clone)]
pub struct Opaque<const N: usize> {
    storage: [u8; N],
    marker: std::marker::PhantomData<*const u8>, // disable Send/Sync
}

impl<const N: usize> Opaque<N> {
    pub const SIZE: usize = N;

    /// All-zero payload, used as the placeholder before the engine initializes a value.
    pub const fn zeroed() -> Self {
        Self {
            storage: [0; N],
            marker: std::marker::PhantomData,
        }
    }
}

impl<const N: usize> std::fmt::Debug for Opaque<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Opaque<{N}>(")?;
        for byte in &self.storage {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Engine-side payload of a `String`: one pointer.
pub type OpaqueString = Opaque<8>;
