/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Callbacks that are passed as function pointers to the engine upon class registration.
#![allow(clippy::missing_safety_doc)]

use std::any::type_name;
use std::ffi::{c_char, c_void, CStr};
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use crate::obj::{Base, GodotClass, ObjectHandle, UserClass};
use crate::private::handle_panic;
use crate::registry::{InstanceStorage, VirtualEntry, VirtualTable};
use crate::sys::interface_fn;
use crate::{godot_error, out, sys};

/// Data the engine passes back to every class-level callback: the binding and the overridden virtuals of `T`.
pub(crate) struct ClassUserdata<T: UserClass> {
    pub binding: &'static sys::Binding,
    pub virtuals: VirtualTable<T>,
}

unsafe fn class_userdata<'a, T: UserClass>(class_userdata: *mut c_void) -> &'a ClassUserdata<T> {
    &*(class_userdata as *const ClassUserdata<T>)
}

pub unsafe extern "C" fn create<T: UserClass>(class_userdata: *mut c_void) -> sys::GDExtensionObjectPtr {
    let binding = self::class_userdata::<T>(class_userdata).binding;

    handle_panic(
        binding,
        || format!("failed to create instance of {}", T::CLASS_NAME),
        || create_custom::<T>(binding),
    )
    .unwrap_or(std::ptr::null_mut())
}

fn create_custom<T: UserClass>(binding: &'static sys::Binding) -> sys::GDExtensionObjectPtr {
    let class_name = T::CLASS_NAME;
    let base_class_name = <T::Wrapper as GodotClass>::CLASS_NAME;

    let base_ptr = unsafe { interface_fn!(binding, classdb_construct_object)(base_class_name.as_sys()) };

    // SAFETY: freshly constructed by the engine.
    let handle = unsafe { ObjectHandle::from_obj_sys(binding, base_ptr) }
        .unwrap_or_else(|| panic!("engine failed to construct base {base_class_name} of {class_name}"));

    // User init may panic; the base object must not leak in that case.
    let user_instance = match catch_unwind(AssertUnwindSafe(|| T::init(unsafe { Base::from_handle(handle) }))) {
        Ok(instance) => instance,
        Err(payload) => {
            unsafe { handle.destroy() };
            resume_unwind(payload)
        }
    };

    let storage = Box::into_raw(Box::new(InstanceStorage::construct(user_instance, handle)));
    unsafe {
        interface_fn!(binding, object_set_instance)(base_ptr, class_name.as_sys(), storage as sys::GDExtensionClassInstancePtr);
        interface_fn!(binding, object_set_instance_binding)(base_ptr, binding.library(), storage as *mut c_void);
    }

    out!("create callback: {class_name}, id={}", handle.instance_id());
    base_ptr
}

pub unsafe extern "C" fn free<T: UserClass>(class_userdata: *mut c_void, instance: sys::GDExtensionClassInstancePtr) {
    let binding = self::class_userdata::<T>(class_userdata).binding;

    let _ = handle_panic(
        binding,
        || format!("failed to free instance of {}", T::CLASS_NAME),
        || {
            let storage = Box::from_raw(instance as *mut InstanceStorage<T>);
            if storage.is_bound() {
                godot_error!(
                    binding,
                    "Destroyed object {} while an instance of {} was still bound.",
                    storage.base().instance_id(),
                    type_name::<T>()
                );
            }
            drop(storage);
        },
    );
}

pub unsafe extern "C" fn get_virtual_call_data<T: UserClass>(
    class_userdata: *mut c_void,
    name: *const c_char,
) -> *mut c_void {
    let userdata = self::class_userdata::<T>(class_userdata);

    let Ok(name) = CStr::from_ptr(name).to_str() else {
        return std::ptr::null_mut();
    };

    match userdata.virtuals.lookup(name) {
        Some(entry) => {
            out!("virtual lookup: {}::{name} -> overridden", T::CLASS_NAME);
            entry as *const VirtualEntry<T> as *mut c_void
        }
        None => std::ptr::null_mut(),
    }
}

pub unsafe extern "C" fn call_virtual_with_data<T: UserClass>(
    instance: sys::GDExtensionClassInstancePtr,
    _name: *const c_char,
    call_data: *mut c_void,
    args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
) {
    let storage = &*(instance as *const InstanceStorage<T>);
    let entry = &*(call_data as *const VirtualEntry<T>);

    let _ = handle_panic(
        storage.binding(),
        || format!("{}::{}", T::CLASS_NAME, entry.method),
        || {
            let mut instance = storage.get_mut();
            entry.func.invoke(&mut instance, args)
        },
    );
}
