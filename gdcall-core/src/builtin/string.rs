/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;
use std::fmt;
use std::mem::MaybeUninit;

use crate::meta::{ConvertError, FromGodot, GodotConvert, ToGodot};
use crate::sys;
use crate::sys::{ffi_methods, interface_fn, GodotFfi};

/// Engine-owned string (`String` in the engine's API).
///
/// The payload lives in engine memory; cloning calls the engine's copy constructor and dropping calls its destructor.
/// Each `GString` keeps the [`Binding`][sys::Binding] it was created through.
#[repr(C)]
pub struct GString {
    opaque: sys::OpaqueString,
    binding: &'static sys::Binding,
}

impl GString {
    /// Creates an engine string from UTF-8 text.
    pub fn from_str(binding: &'static sys::Binding, text: &str) -> Self {
        // SAFETY: string_new_with_utf8_chars_and_len initializes the uninitialized payload.
        unsafe {
            Self::new_with_uninit(binding, |string_ptr| {
                interface_fn!(binding, string_new_with_utf8_chars_and_len)(
                    string_ptr,
                    text.as_ptr() as *const c_char,
                    text.len() as sys::GDExtensionInt,
                )
            })
        }
    }

    /// Number of bytes in the UTF-8 representation.
    pub fn len(&self) -> usize {
        let len = unsafe {
            interface_fn!(self.binding, string_to_utf8_chars)(self.sys_const(), std::ptr::null_mut(), 0)
        };
        len.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn binding(&self) -> &'static sys::Binding {
        self.binding
    }

    fn from_opaque(opaque: sys::OpaqueString, binding: &'static sys::Binding) -> Self {
        Self { opaque, binding }
    }

    /// # Safety
    /// `init_fn` must initialize the payload it is given.
    unsafe fn new_with_uninit(
        binding: &'static sys::Binding,
        init_fn: impl FnOnce(sys::GDExtensionUninitializedTypePtr),
    ) -> Self {
        let mut opaque = MaybeUninit::<sys::OpaqueString>::uninit();
        init_fn(opaque.as_mut_ptr() as sys::GDExtensionUninitializedTypePtr);
        Self::from_opaque(opaque.assume_init(), binding)
    }

    fn to_rust_string(&self) -> String {
        let len = self.len();
        let mut bytes = vec![0u8; len];

        if len > 0 {
            unsafe {
                interface_fn!(self.binding, string_to_utf8_chars)(
                    self.sys_const(),
                    bytes.as_mut_ptr() as *mut c_char,
                    len as sys::GDExtensionInt,
                );
            }
        }

        String::from_utf8_lossy(&bytes).into_owned()
    }
}

// SAFETY: the engine payload is the field `opaque` at offset 0; from_opaque rebuilds the handle.
unsafe impl GodotFfi for GString {
    ffi_methods! { OpaquePtr }
}

impl Clone for GString {
    fn clone(&self) -> Self {
        let copy = self.binding.builtin_lifecycle().string_copy;

        // SAFETY: the copy constructor initializes the new payload from the argument array.
        unsafe {
            Self::new_with_uninit(self.binding, |string_ptr| {
                let args = [self.sys_const()];
                copy(string_ptr, args.as_ptr());
            })
        }
    }
}

impl Drop for GString {
    fn drop(&mut self) {
        let destroy = self.binding.builtin_lifecycle().string_destroy;
        unsafe { destroy(self.sys()) }
    }
}

impl fmt::Display for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rust_string())
    }
}

impl fmt::Debug for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GString({:?})", self.to_rust_string())
    }
}

impl PartialEq for GString {
    fn eq(&self, other: &Self) -> bool {
        self.to_rust_string() == other.to_rust_string()
    }
}

impl Eq for GString {}

impl PartialEq<str> for GString {
    fn eq(&self, other: &str) -> bool {
        self.to_rust_string() == other
    }
}

impl PartialEq<&str> for GString {
    fn eq(&self, other: &&str) -> bool {
        self.to_rust_string() == *other
    }
}

impl From<&GString> for String {
    fn from(string: &GString) -> Self {
        string.to_rust_string()
    }
}

impl GodotConvert for GString {
    type Via = GString;
}

impl ToGodot for GString {
    fn to_godot(&self) -> Self::Via {
        self.clone()
    }
}

impl FromGodot for GString {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
        Ok(via)
    }
}
