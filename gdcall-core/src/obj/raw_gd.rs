/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::type_name;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;

use crate::obj::bounds::Memory;
use crate::obj::{EngineClass, GodotClass, ObjectHandle};
use crate::{out, sys};

/// How a [`Gd`][crate::obj::Gd] relates to the lifetime of the object it points to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Ownership {
    /// Someone else (usually the engine) owns the object. Dropping the handle does nothing.
    Borrowed,

    /// The handle holds one reference of a ref-counted object. Dropping it releases that reference.
    Shared,

    /// The object was created by or handed over to this handle. Dropping it destroys the object (manually managed) or
    /// releases the initial reference (ref-counted).
    Owned,
}

/// Untyped core of `Gd<T>`: a class wrapper plus the ownership of the handle.
///
/// Responsible for the reference-count and destruction protocol, see [`Memory`].
pub(crate) struct RawGd<T: GodotClass> {
    obj: T::Wrapper,
    ownership: Ownership,
    _marker: PhantomData<*const T>,
}

impl<T: GodotClass> RawGd<T> {
    /// # Safety
    /// `ptr` must be null or point to a live instance of `T` (or a subclass).
    unsafe fn new(binding: &'static sys::Binding, ptr: sys::GDExtensionObjectPtr, ownership: Ownership) -> Option<Self> {
        let handle = ObjectHandle::from_obj_sys(binding, ptr)?;
        Some(Self::from_handle(handle, ownership))
    }

    /// # Safety
    /// `handle` must refer to an instance of `T` (or a subclass).
    pub(crate) unsafe fn from_handle(handle: ObjectHandle, ownership: Ownership) -> Self {
        Self {
            obj: <T::Wrapper as EngineClass>::from_handle(handle),
            ownership,
            _marker: PhantomData,
        }
    }

    /// Pointer the engine keeps ownership of; dropping the result does not touch the object.
    ///
    /// # Safety
    /// See [`from_handle()`][Self::from_handle]; `ptr` may also be null.
    pub(crate) unsafe fn from_obj_sys_weak(binding: &'static sys::Binding, ptr: sys::GDExtensionObjectPtr) -> Option<Self> {
        Self::new(binding, ptr, Ownership::Borrowed)
    }

    /// Pointer returned by the engine without transferring ownership. Ref-counted instances gain a reference held by
    /// the result; manually managed ones are borrowed.
    ///
    /// # Safety
    /// See [`from_handle()`][Self::from_handle]; `ptr` may also be null.
    pub(crate) unsafe fn from_obj_sys(binding: &'static sys::Binding, ptr: sys::GDExtensionObjectPtr) -> Option<Self> {
        let mut raw = Self::new(binding, ptr, Ownership::Borrowed)?;
        if T::Memory::is_ref_counted(raw.handle()) {
            T::Memory::maybe_inc_ref(raw.handle());
            raw.ownership = Ownership::Shared;
        }
        Some(raw)
    }

    /// Pointer whose ownership the engine hands over, e.g. a freshly constructed object or a ref-counted return value
    /// whose reference was already taken for the caller.
    ///
    /// # Safety
    /// See [`from_handle()`][Self::from_handle]; `ptr` may also be null.
    pub(crate) unsafe fn from_obj_sys_transferred(
        binding: &'static sys::Binding,
        ptr: sys::GDExtensionObjectPtr,
    ) -> Option<Self> {
        Self::new(binding, ptr, Ownership::Owned)
    }

    /// Borrowed pointer that must be verified to be alive before use.
    ///
    /// # Panics
    /// If the engine no longer knows the object under its instance ID.
    ///
    /// # Safety
    /// See [`from_handle()`][Self::from_handle]; `ptr` may also be null.
    pub(crate) unsafe fn from_obj_sys_checked(
        binding: &'static sys::Binding,
        ptr: sys::GDExtensionObjectPtr,
    ) -> Option<Self> {
        let raw = Self::from_obj_sys_weak(binding, ptr)?;
        raw.handle().assert_valid_instance(format_args!("{} returned by engine", T::CLASS_NAME));
        Some(raw)
    }

    pub(crate) fn handle(&self) -> &ObjectHandle {
        self.obj.handle()
    }

    pub(crate) fn wrapper(&self) -> &T::Wrapper {
        &self.obj
    }

    pub(crate) fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Gives up this handle without running the drop protocol. Returns the raw handle and its former ownership.
    pub(crate) fn into_parts(self) -> (ObjectHandle, Ownership) {
        let this = ManuallyDrop::new(self);
        (*this.handle(), this.ownership)
    }

    /// Reinterprets the handle as pointing to a `U`, keeping its ownership.
    ///
    /// # Safety
    /// The object must be an instance of `U` (or a subclass).
    pub(crate) unsafe fn cast_unchecked<U: GodotClass>(self) -> RawGd<U> {
        let (handle, ownership) = self.into_parts();
        RawGd::from_handle(handle, ownership)
    }

    /// Second handle to the same object, following the memory strategy.
    ///
    /// # Panics
    /// If the object is ref-counted and already destroyed.
    pub(crate) fn clone_handle(&self) -> Self {
        let handle = *self.handle();

        let ownership = if self.ownership != Ownership::Borrowed && T::Memory::is_ref_counted(&handle) {
            handle.assert_valid_instance("Gd::clone()");
            T::Memory::maybe_inc_ref(&handle);
            Ownership::Shared
        } else {
            Ownership::Borrowed
        };

        // SAFETY: same object, same type.
        unsafe { Self::from_handle(handle, ownership) }
    }
}

impl<T: GodotClass> Drop for RawGd<T> {
    fn drop(&mut self) {
        if self.ownership == Ownership::Borrowed {
            return;
        }

        let handle = *self.handle();
        out!("RawGd::drop   <{}>  {:?}", type_name::<T>(), self.ownership);

        // The engine may have destroyed the object already, e.g. a node freed together with its parent.
        if !handle.is_instance_valid() {
            out!("  already destroyed: {}", handle.instance_id());
            return;
        }

        if T::Memory::is_ref_counted(&handle) {
            let is_last = T::Memory::maybe_dec_ref(&handle);
            if is_last {
                // SAFETY: the last reference was ours.
                unsafe { handle.destroy() };
            }
        } else if self.ownership == Ownership::Owned {
            // SAFETY: owned and alive.
            unsafe { handle.destroy() };
        }
    }
}
