/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;

/// Adds methods to convert from and to the engine's ABI representation of a type.
///
/// Values are exchanged through ptrcalls: the engine reads arguments through [`sys()`][Self::sys] pointers and writes
/// return values into uninitialized memory, from which [`from_sys()`][Self::from_sys] takes ownership.
///
/// # Safety
/// The ABI representation must be at offset 0 of `Self`, and `size_of::<Self>()` must be at least the ABI size.
/// [`sys()`][Self::sys] must return a pointer to that representation.
#[doc(hidden)] // shows up in implementors otherwise
pub unsafe trait GodotFfi: Sized {
    /// Takes ownership of a value that the engine wrote at `ptr`.
    ///
    /// # Safety
    /// `ptr` must point to an initialized ABI value of this type. Ownership of any engine resource moves to the result,
    /// so the memory at `ptr` must not be destroyed afterwards.
    unsafe fn from_sys(binding: &'static sys::Binding, ptr: sys::GDExtensionTypePtr) -> Self;

    /// Return type pointer, pointing to the ABI representation.
    fn sys(&self) -> sys::GDExtensionTypePtr;

    fn sys_const(&self) -> sys::GDExtensionConstTypePtr {
        self.sys()
    }

    /// Writes the ABI representation into `dst`, giving up ownership.
    ///
    /// # Safety
    /// `dst` must point to uninitialized memory large enough for the ABI representation.
    unsafe fn move_return_ptr(self, dst: sys::GDExtensionTypePtr);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Macros to choose a certain implementation of `GodotFfi` trait for GDExtensionTypePtr;
// or a free-standing `impl` for concrete sys pointers such as GDExtensionObjectPtr.

/// Implements a single unsafe `GodotFfi` method.
#[macro_export]
#[doc(hidden)]
macro_rules! ffi_methods_one {
    // Self is the ABI value: primitives, math types.
    (SelfPtr; from_sys) => {
        unsafe fn from_sys(_binding: &'static $crate::Binding, ptr: $crate::GDExtensionTypePtr) -> Self {
            std::ptr::read(ptr as *const Self)
        }
    };
    (SelfPtr; sys) => {
        fn sys(&self) -> $crate::GDExtensionTypePtr {
            self as *const Self as $crate::GDExtensionTypePtr
        }
    };
    (SelfPtr; move_return_ptr) => {
        unsafe fn move_return_ptr(self, dst: $crate::GDExtensionTypePtr) {
            std::ptr::write(dst as *mut Self, self)
        }
    };

    // Self stores the ABI value in a field `opaque` (at offset 0) and is rebuilt through `Self::from_opaque(opaque, binding)`.
    (OpaquePtr; from_sys) => {
        unsafe fn from_sys(binding: &'static $crate::Binding, ptr: $crate::GDExtensionTypePtr) -> Self {
            let opaque = std::ptr::read(ptr as *const _);
            Self::from_opaque(opaque, binding)
        }
    };
    (OpaquePtr; sys) => {
        fn sys(&self) -> $crate::GDExtensionTypePtr {
            &self.opaque as *const _ as $crate::GDExtensionTypePtr
        }
    };
    (OpaquePtr; move_return_ptr) => {
        unsafe fn move_return_ptr(self, dst: $crate::GDExtensionTypePtr) {
            std::ptr::write(dst as *mut _, self.opaque);
            std::mem::forget(self);
        }
    };
}

/// Provides "sys" style methods for FFI and ptrcall integration with the engine.
///
/// ```ignore
/// unsafe impl GodotFfi for Vector3 {
///     ffi_methods! { SelfPtr }
/// }
///
/// unsafe impl GodotFfi for GString {
///     ffi_methods! { OpaquePtr }
/// }
/// ```
///
/// * `SelfPtr`: `Self` is the ABI representation (`#[repr(C)]` math types, primitives). Requires `Copy` semantics
///   for `from_sys` to be meaningful.
/// * `OpaquePtr`: `Self` has a field `opaque` holding the engine payload at offset 0, plus a constructor
///   `from_opaque(opaque, binding)`. Values with destructors go through here.
#[macro_export]
macro_rules! ffi_methods {
    ($Impl:ident) => {
        $crate::ffi_methods_one!($Impl; from_sys);
        $crate::ffi_methods_one!($Impl; sys);
        $crate::ffi_methods_one!($Impl; move_return_ptr);
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Implementations for common types

macro_rules! impl_godot_as_self {
    ($($T:ty),* $(,)?) => {
        $(
            unsafe impl GodotFfi for $T {
                ffi_methods! { SelfPtr }
            }
        )*
    };
}

impl_godot_as_self!(bool, i64, f64);

// Object pointers: the ABI passes a pointer to the object pointer, and writes the object pointer into the return slot.
unsafe impl GodotFfi for sys::GDExtensionObjectPtr {
    ffi_methods! { SelfPtr }
}

unsafe impl GodotFfi for () {
    unsafe fn from_sys(_binding: &'static sys::Binding, _ptr: sys::GDExtensionTypePtr) -> Self {}

    fn sys(&self) -> sys::GDExtensionTypePtr {
        // ZST dummy pointer
        self as *const _ as sys::GDExtensionTypePtr
    }

    unsafe fn move_return_ptr(self, _dst: sys::GDExtensionTypePtr) {
        // Void return: nothing written.
    }
}
