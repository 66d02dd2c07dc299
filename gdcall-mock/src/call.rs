/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdcall_ffi as sys;

use crate::strings;

/// One ptrcall as seen by the engine: receiver, argument array and return slot.
///
/// Accessors read and write raw ABI memory. The caller of an accessor asserts that the argument at `index` exists and
/// has the given type, and that the return slot can hold the written value.
pub struct MockCall {
    object: sys::GDExtensionObjectPtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
}

impl MockCall {
    pub(crate) fn new(
        object: sys::GDExtensionObjectPtr,
        args: *const sys::GDExtensionConstTypePtr,
        ret: sys::GDExtensionTypePtr,
    ) -> Self {
        Self { object, args, ret }
    }

    pub fn object(&self) -> sys::GDExtensionObjectPtr {
        self.object
    }

    pub(crate) fn addr(&self) -> usize {
        self.object as usize
    }

    /// # Safety
    /// Argument `index` must be a `T` in ABI layout.
    pub unsafe fn arg<T: Copy>(&self, index: usize) -> T {
        std::ptr::read(self.args.add(index).read() as *const T)
    }

    /// # Safety
    /// Argument `index` must be an `int`.
    pub unsafe fn arg_i64(&self, index: usize) -> i64 {
        self.arg(index)
    }

    /// # Safety
    /// Argument `index` must be a `float`.
    pub unsafe fn arg_f64(&self, index: usize) -> f64 {
        self.arg(index)
    }

    /// # Safety
    /// Argument `index` must be a `bool`.
    pub unsafe fn arg_bool(&self, index: usize) -> bool {
        self.arg(index)
    }

    /// # Safety
    /// Argument `index` must be an object pointer (possibly null).
    pub unsafe fn arg_object(&self, index: usize) -> sys::GDExtensionObjectPtr {
        self.arg(index)
    }

    /// Copies the text of a `String` argument.
    ///
    /// # Safety
    /// Argument `index` must be a `String` created through this engine.
    pub unsafe fn arg_string(&self, index: usize) -> String {
        strings::read(self.args.add(index).read())
    }

    /// Writes `value` into the return slot. Does nothing for void calls.
    ///
    /// # Safety
    /// The return slot must be able to hold a `T`.
    pub unsafe fn ret<T>(&self, value: T) {
        if !self.ret.is_null() {
            std::ptr::write(self.ret as *mut T, value);
        }
    }

    /// Writes a new engine string into the return slot; ownership passes to the caller.
    ///
    /// # Safety
    /// The return slot must be an uninitialized `String`.
    pub unsafe fn ret_string(&self, text: &str) {
        if !self.ret.is_null() {
            strings::write_new(self.ret, text);
        }
    }
}
