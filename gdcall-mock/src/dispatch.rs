/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Operations that may call back into the extension: construction, destruction, method and virtual calls.
//!
//! Each of them copies what it needs out of the state, releases it, and only then invokes extension callbacks.

use std::ffi::{c_void, CString};

use gdcall_ffi as sys;

use crate::call::MockCall;
use crate::state::{index_to_ptr, ptr_to_index, with_state};

/// Argument of a virtual call.
#[derive(Copy, Clone, Debug)]
pub(crate) enum VirtualArg {
    None,
    Delta(f64),
    What(i64),
}

enum Constructible {
    Native(String),
    Extension(sys::GDExtensionClassCreationInfo),
}

pub(crate) fn construct_object(class_name: &str) -> sys::GDExtensionObjectPtr {
    let target = with_state(|s| {
        let Some(class) = s.class(class_name) else {
            s.error(format!("classdb_construct_object(): unknown class `{class_name}`"));
            return None;
        };

        Some(match class.extension {
            Some(info) => Constructible::Extension(info),
            None => Constructible::Native(class.name.clone()),
        })
    });

    match target {
        None => std::ptr::null_mut(),
        Some(Constructible::Native(name)) => with_state(|s| s.create_object(&name)) as sys::GDExtensionObjectPtr,
        Some(Constructible::Extension(info)) => match info.create_instance_func {
            Some(create) => unsafe { create(info.class_userdata) },
            None => std::ptr::null_mut(),
        },
    }
}

/// Destroys `addr` and, for nodes, all its descendants. Calls the extension's free callback if the object has an
/// extension instance.
pub(crate) fn destroy_object(addr: usize) {
    let children = with_state(|s| match s.live_object(addr) {
        Some(obj) => Some(obj.children.clone()),
        None => {
            s.stats.double_frees += 1;
            s.error(format!("object_destroy(): object at {addr:#x} is not alive"));
            None
        }
    });
    let Some(children) = children else {
        return;
    };

    for child in children {
        destroy_object(child);
    }

    let free = with_state(|s| {
        s.detach(addr);
        s.queued_for_deletion.retain(|&queued| queued != addr);

        let obj = s.object_mut(addr)?;
        let ext = obj.extension.take()?;
        let info = s.class(&ext.class_name).and_then(|class| class.extension);

        match info {
            Some(info) => Some((info, ext.instance)),
            None => {
                s.error(format!("class `{}` unregistered before its instance was freed", ext.class_name));
                None
            }
        }
    });

    if let Some((info, instance)) = free {
        if let Some(free_instance) = info.free_instance_func {
            unsafe { free_instance(info.class_userdata, instance) };
        }
    }

    with_state(|s| {
        if let Some(obj) = s.object_mut(addr) {
            obj.alive = false;
            obj.instance_binding = None;
            let id = obj.id;
            s.by_id.remove(&id);
        }
        s.stats.objects_destroyed += 1;
    });
}

/// Executes the method behind `bind` on `object`.
pub(crate) unsafe extern "C" fn ptrcall(
    bind: sys::GDExtensionMethodBindPtr,
    object: sys::GDExtensionObjectPtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
) {
    let func = with_state(|s| {
        let Some(index) = ptr_to_index(bind).filter(|&index| index < s.methods.len()) else {
            s.error(format!("ptrcall with unknown method bind {bind:?}"));
            return None;
        };

        let (class, name) = (s.methods[index].class.clone(), s.methods[index].name.clone());
        if s.live_object(object as usize).is_none() {
            s.stats.calls_on_dead += 1;
            s.error(format!("{class}::{name} called on a destroyed object"));
            return None;
        }
        if !s.is_instance_of(object as usize, &class) {
            s.error(format!("{class}::{name} called on an object of another class"));
            return None;
        }

        let entry = &mut s.methods[index];
        entry.calls += 1;
        s.stats.method_calls += 1;
        entry.func.clone()
    });

    if let Some(func) = func {
        func(&MockCall::new(object, args, ret));
    }
}

/// Calls the virtual `name` on the extension instance of `addr`, if the class overrides it.
///
/// The call data is requested from the extension once per class and name, then cached.
pub(crate) fn call_virtual(addr: usize, name: &str, arg: VirtualArg) {
    let target = with_state(|s| {
        let obj = s.live_object(addr)?;
        let ext = obj.extension.as_ref()?;
        let info = s.class(&ext.class_name)?.extension?;
        let cached = s.virtual_cache.get(&(ext.class_name.clone(), name.to_string())).copied();

        Some((ext.class_name.clone(), ext.instance, info, cached))
    });
    let Some((class_name, instance, info, cached)) = target else {
        return;
    };

    let Ok(c_name) = CString::new(name) else {
        return;
    };

    let call_data = match cached {
        Some(data) => data as *mut c_void,
        None => {
            let data = match info.get_virtual_call_data_func {
                Some(get) => unsafe { get(info.class_userdata, c_name.as_ptr()) },
                None => std::ptr::null_mut(),
            };
            with_state(|s| {
                s.stats.virtual_lookups += 1;
                s.virtual_cache.insert((class_name, name.to_string()), data as usize);
            });
            data
        }
    };

    if call_data.is_null() {
        return;
    }
    let Some(call) = info.call_virtual_with_data_func else {
        return;
    };

    let (delta, what);
    let args: [sys::GDExtensionConstTypePtr; 1] = match arg {
        VirtualArg::None => [std::ptr::null()],
        VirtualArg::Delta(value) => {
            delta = value;
            [&delta as *const f64 as sys::GDExtensionConstTypePtr]
        }
        VirtualArg::What(value) => {
            what = value;
            [&what as *const i64 as sys::GDExtensionConstTypePtr]
        }
    };

    with_state(|s| s.stats.virtual_calls += 1);
    unsafe { call(instance, c_name.as_ptr(), call_data, args.as_ptr(), std::ptr::null_mut()) };
}

/// Tag of a registered class; null if unknown.
pub(crate) fn class_tag(class_name: &str) -> *mut c_void {
    with_state(|s| match s.class_index(class_name) {
        Some(index) => index_to_ptr(index) as *mut c_void,
        None => std::ptr::null_mut(),
    })
}
