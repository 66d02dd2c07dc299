/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine strings: the 8-byte payload is a pointer to a heap-allocated `String`.

use std::ffi::c_char;

use gdcall_ffi as sys;

use crate::state::with_state;

/// Initializes the payload at `dst` with a copy of `text`.
///
/// # Safety
/// `dst` must point to 8 writable bytes.
pub(crate) unsafe fn write_new(dst: sys::GDExtensionUninitializedTypePtr, text: &str) {
    let boxed = Box::into_raw(Box::new(text.to_string()));
    std::ptr::write(dst as *mut *mut String, boxed);
    with_state(|s| s.stats.live_strings += 1);
}

/// # Safety
/// `src` must point to a payload initialized by [`write_new`], or to a null payload.
pub(crate) unsafe fn read(src: sys::GDExtensionConstTypePtr) -> String {
    let boxed = std::ptr::read(src as *const *const String);
    boxed.as_ref().cloned().unwrap_or_default()
}

pub(crate) unsafe extern "C" fn string_new_with_utf8_chars_and_len(
    dst: sys::GDExtensionUninitializedTypePtr,
    contents: *const c_char,
    size: sys::GDExtensionInt,
) {
    let bytes = if contents.is_null() || size <= 0 {
        &[][..]
    } else {
        std::slice::from_raw_parts(contents as *const u8, size as usize)
    };

    write_new(dst, &String::from_utf8_lossy(bytes));
}

pub(crate) unsafe extern "C" fn string_to_utf8_chars(
    src: sys::GDExtensionConstTypePtr,
    text: *mut c_char,
    max_write_length: sys::GDExtensionInt,
) -> sys::GDExtensionInt {
    let string = read(src);

    if !text.is_null() && max_write_length > 0 {
        let count = string.len().min(max_write_length as usize);
        std::ptr::copy_nonoverlapping(string.as_ptr(), text as *mut u8, count);
    }

    string.len() as sys::GDExtensionInt
}

pub(crate) unsafe extern "C" fn string_copy(
    dst: sys::GDExtensionUninitializedTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
) {
    let text = read(args.read());
    write_new(dst, &text);
}

pub(crate) unsafe extern "C" fn string_destroy(target: sys::GDExtensionTypePtr) {
    let slot = target as *mut *mut String;
    let boxed = std::ptr::replace(slot, std::ptr::null_mut());

    if boxed.is_null() {
        with_state(|s| s.error("String destructor called on an empty payload"));
        return;
    }

    drop(Box::from_raw(boxed));
    with_state(|s| s.stats.live_strings = s.stats.live_strings.saturating_sub(1));
}

pub(crate) unsafe extern "C" fn variant_get_ptr_constructor(
    variant_type: sys::GDExtensionVariantType,
    constructor: i32,
) -> sys::GDExtensionPtrConstructor {
    match (variant_type, constructor) {
        (t, sys::STRING_COPY_CONSTRUCTOR) if t == sys::VariantType::String.sys() => Some(string_copy),
        _ => None,
    }
}

pub(crate) unsafe extern "C" fn variant_get_ptr_destructor(
    variant_type: sys::GDExtensionVariantType,
) -> sys::GDExtensionPtrDestructor {
    if variant_type == sys::VariantType::String.sys() {
        Some(string_destroy)
    } else {
        None
    }
}
