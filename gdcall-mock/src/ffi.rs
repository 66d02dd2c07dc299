/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `extern "C"` functions of the mock interface.

use std::alloc::{alloc, dealloc, Layout};
use std::ffi::{c_char, c_void, CStr};

use gdcall_ffi as sys;

use crate::dispatch;
use crate::state::{index_to_ptr, ptr_to_index, with_state};
use crate::strings;

const ALLOC_HEADER: usize = 16;

unsafe fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

pub(crate) fn interface(version: (u32, u32, u32)) -> sys::GDExtensionInterface {
    sys::GDExtensionInterface {
        version_major: version.0,
        version_minor: version.1,
        version_patch: version.2,
        version_string: c"Mock Engine".as_ptr(),
        mem_alloc: Some(mem_alloc),
        mem_free: Some(mem_free),
        print_error: Some(print_error),
        print_warning: Some(print_warning),
        variant_get_ptr_constructor: Some(strings::variant_get_ptr_constructor),
        variant_get_ptr_destructor: Some(strings::variant_get_ptr_destructor),
        string_new_with_utf8_chars_and_len: Some(strings::string_new_with_utf8_chars_and_len),
        string_to_utf8_chars: Some(strings::string_to_utf8_chars),
        object_method_bind_ptrcall: Some(dispatch::ptrcall),
        object_destroy: Some(object_destroy),
        object_get_instance_from_id: Some(object_get_instance_from_id),
        object_get_instance_id: Some(object_get_instance_id),
        object_cast_to: Some(object_cast_to),
        object_set_instance: Some(object_set_instance),
        object_set_instance_binding: Some(object_set_instance_binding),
        object_get_instance_binding: Some(object_get_instance_binding),
        classdb_construct_object: Some(classdb_construct_object),
        classdb_get_method_bind: Some(classdb_get_method_bind),
        classdb_get_class_tag: Some(classdb_get_class_tag),
        classdb_register_extension_class: Some(classdb_register_extension_class),
        classdb_unregister_extension_class: Some(classdb_unregister_extension_class),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Memory and diagnostics

unsafe extern "C" fn mem_alloc(bytes: usize) -> *mut c_void {
    let Ok(layout) = Layout::from_size_align(bytes + ALLOC_HEADER, ALLOC_HEADER) else {
        return std::ptr::null_mut();
    };

    let base = alloc(layout);
    if base.is_null() {
        return std::ptr::null_mut();
    }

    (base as *mut usize).write(bytes);
    with_state(|s| s.stats.allocs += 1);
    base.add(ALLOC_HEADER) as *mut c_void
}

unsafe extern "C" fn mem_free(ptr: *mut c_void) {
    if ptr.is_null() {
        return;
    }

    let base = (ptr as *mut u8).sub(ALLOC_HEADER);
    let bytes = (base as *const usize).read();
    if let Ok(layout) = Layout::from_size_align(bytes + ALLOC_HEADER, ALLOC_HEADER) {
        dealloc(base, layout);
    }
    with_state(|s| s.stats.frees += 1);
}

unsafe extern "C" fn print_error(description: *const c_char, _function: *const c_char, _file: *const c_char, _line: i32) {
    let message = c_string(description);
    with_state(|s| s.errors.push(message));
}

unsafe extern "C" fn print_warning(description: *const c_char, _function: *const c_char, _file: *const c_char, _line: i32) {
    let message = c_string(description);
    with_state(|s| s.warnings.push(message));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

unsafe extern "C" fn object_destroy(obj: sys::GDExtensionObjectPtr) {
    dispatch::destroy_object(obj as usize);
}

unsafe extern "C" fn object_get_instance_from_id(id: sys::GDObjectInstanceID) -> sys::GDExtensionObjectPtr {
    with_state(|s| s.by_id.get(&id).copied().unwrap_or(0)) as sys::GDExtensionObjectPtr
}

unsafe extern "C" fn object_get_instance_id(obj: sys::GDExtensionConstObjectPtr) -> sys::GDObjectInstanceID {
    with_state(|s| s.object(obj as usize).map_or(0, |obj| obj.id))
}

unsafe extern "C" fn object_cast_to(obj: sys::GDExtensionConstObjectPtr, class_tag: *mut c_void) -> sys::GDExtensionObjectPtr {
    let matches = with_state(|s| {
        let Some(class) = ptr_to_index(class_tag).and_then(|index| s.classes.get(index)) else {
            return false;
        };
        let class = class.name.clone();

        s.live_object(obj as usize).is_some() && s.is_instance_of(obj as usize, &class)
    });

    if matches {
        obj as sys::GDExtensionObjectPtr
    } else {
        std::ptr::null_mut()
    }
}

unsafe extern "C" fn object_set_instance(
    obj: sys::GDExtensionObjectPtr,
    class_name: *const c_char,
    instance: sys::GDExtensionClassInstancePtr,
) {
    let class_name = c_string(class_name);

    with_state(|s| {
        if s.class(&class_name).and_then(|class| class.extension).is_none() {
            s.error(format!("object_set_instance(): `{class_name}` is not an extension class"));
            return;
        }

        match s.object_mut(obj as usize) {
            Some(data) => data.extension = Some(crate::state::ExtensionInstance { class_name, instance }),
            None => s.error("object_set_instance(): unknown object"),
        }
    });
}

unsafe extern "C" fn object_set_instance_binding(obj: sys::GDExtensionObjectPtr, token: *mut c_void, binding: *mut c_void) {
    with_state(|s| match s.object_mut(obj as usize) {
        Some(data) => data.instance_binding = Some((token as usize, binding as usize)),
        None => s.error("object_set_instance_binding(): unknown object"),
    });
}

unsafe extern "C" fn object_get_instance_binding(obj: sys::GDExtensionObjectPtr, token: *mut c_void) -> *mut c_void {
    let binding = with_state(|s| {
        let (bound_token, binding) = s.live_object(obj as usize)?.instance_binding?;
        (bound_token == token as usize).then_some(binding)
    });

    binding.unwrap_or(0) as *mut c_void
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Class database

unsafe extern "C" fn classdb_construct_object(class_name: *const c_char) -> sys::GDExtensionObjectPtr {
    dispatch::construct_object(&c_string(class_name))
}

unsafe extern "C" fn classdb_get_method_bind(
    class_name: *const c_char,
    method_name: *const c_char,
    _hash: sys::GDExtensionInt,
) -> sys::GDExtensionMethodBindPtr {
    let (class_name, method_name) = (c_string(class_name), c_string(method_name));

    match with_state(|s| s.method_bind(&class_name, &method_name)) {
        Some(index) => index_to_ptr(index),
        None => std::ptr::null(),
    }
}

unsafe extern "C" fn classdb_get_class_tag(class_name: *const c_char) -> *mut c_void {
    dispatch::class_tag(&c_string(class_name))
}

unsafe extern "C" fn classdb_register_extension_class(
    _library: sys::GDExtensionClassLibraryPtr,
    class_name: *const c_char,
    parent_class_name: *const c_char,
    info: *const sys::GDExtensionClassCreationInfo,
) {
    let (class_name, parent_class_name) = (c_string(class_name), c_string(parent_class_name));

    with_state(|s| {
        let Some(info) = info.as_ref().copied() else {
            s.error(format!("classdb_register_extension_class(): no creation info for `{class_name}`"));
            return;
        };

        if let Err(err) = s.register_extension_class(&class_name, &parent_class_name, info) {
            s.error(err);
        }
    });
}

unsafe extern "C" fn classdb_unregister_extension_class(_library: sys::GDExtensionClassLibraryPtr, class_name: *const c_char) {
    let class_name = c_string(class_name);

    with_state(|s| {
        if let Err(err) = s.unregister_extension_class(&class_name) {
            s.error(err);
        }
    });
}
