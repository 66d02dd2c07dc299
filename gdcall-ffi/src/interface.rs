/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! C ABI consumed from the engine.
//!
//! Names follow `gdextension_interface.h`. Only the subset needed for ptrcalls, object lifetime, strings and
//! extension classes is modeled; function pointers are nullable and validated once in [`Binding::new`][crate::Binding::new].

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_void};

pub type GDExtensionBool = u8;
pub type GDExtensionInt = i64;
pub type GDObjectInstanceID = u64;

pub type GDExtensionObjectPtr = *mut c_void;
pub type GDExtensionConstObjectPtr = *const c_void;
pub type GDExtensionTypePtr = *mut c_void;
pub type GDExtensionConstTypePtr = *const c_void;
pub type GDExtensionUninitializedTypePtr = *mut c_void;
pub type GDExtensionMethodBindPtr = *const c_void;
pub type GDExtensionClassLibraryPtr = *mut c_void;
pub type GDExtensionClassInstancePtr = *mut c_void;

pub type GDExtensionVariantType = u32;
pub type GDExtensionInitializationLevel = u32;

pub const GDEXTENSION_INITIALIZATION_CORE: GDExtensionInitializationLevel = 0;
pub const GDEXTENSION_INITIALIZATION_SERVERS: GDExtensionInitializationLevel = 1;
pub const GDEXTENSION_INITIALIZATION_SCENE: GDExtensionInitializationLevel = 2;
pub const GDEXTENSION_INITIALIZATION_EDITOR: GDExtensionInitializationLevel = 3;

/// Builtin types whose lifecycle is driven through the interface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u32)]
pub enum VariantType {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Vector2 = 5,
    Vector3 = 9,
    Basis = 17,
    Transform3D = 18,
    Object = 24,
}

impl VariantType {
    #[doc(hidden)]
    pub fn sys(self) -> GDExtensionVariantType {
        self as GDExtensionVariantType
    }
}

/// Index of the copy constructor in `variant_get_ptr_constructor` for `String`.
pub const STRING_COPY_CONSTRUCTOR: i32 = 1;

pub type GDExtensionPtrConstructor =
    Option<unsafe extern "C" fn(p_base: GDExtensionUninitializedTypePtr, p_args: *const GDExtensionConstTypePtr)>;
pub type GDExtensionPtrDestructor = Option<unsafe extern "C" fn(p_base: GDExtensionTypePtr)>;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Extension classes

pub type GDExtensionClassCreateInstance =
    Option<unsafe extern "C" fn(p_class_userdata: *mut c_void) -> GDExtensionObjectPtr>;
pub type GDExtensionClassFreeInstance =
    Option<unsafe extern "C" fn(p_class_userdata: *mut c_void, p_instance: GDExtensionClassInstancePtr)>;
pub type GDExtensionClassGetVirtualCallData =
    Option<unsafe extern "C" fn(p_class_userdata: *mut c_void, p_name: *const c_char) -> *mut c_void>;
pub type GDExtensionClassCallVirtualWithData = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_name: *const c_char,
        p_virtual_call_userdata: *mut c_void,
        p_args: *const GDExtensionConstTypePtr,
        r_ret: GDExtensionTypePtr,
    ),
>;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GDExtensionClassCreationInfo {
    pub is_virtual: GDExtensionBool,
    pub is_abstract: GDExtensionBool,
    pub create_instance_func: GDExtensionClassCreateInstance,
    pub free_instance_func: GDExtensionClassFreeInstance,
    pub get_virtual_call_data_func: GDExtensionClassGetVirtualCallData,
    pub call_virtual_with_data_func: GDExtensionClassCallVirtualWithData,
    pub class_userdata: *mut c_void,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Library initialization

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GDExtensionInitialization {
    pub minimum_initialization_level: GDExtensionInitializationLevel,
    pub userdata: *mut c_void,
    pub initialize: Option<unsafe extern "C" fn(userdata: *mut c_void, p_level: GDExtensionInitializationLevel)>,
    pub deinitialize: Option<unsafe extern "C" fn(userdata: *mut c_void, p_level: GDExtensionInitializationLevel)>,
}

impl Default for GDExtensionInitialization {
    fn default() -> Self {
        Self {
            minimum_initialization_level: GDEXTENSION_INITIALIZATION_CORE,
            userdata: std::ptr::null_mut(),
            initialize: None,
            deinitialize: None,
        }
    }
}

pub type GDExtensionInitializationFunction = unsafe extern "C" fn(
    p_interface: *const GDExtensionInterface,
    p_library: GDExtensionClassLibraryPtr,
    r_initialization: *mut GDExtensionInitialization,
) -> GDExtensionBool;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Interface

#[repr(C)]
#[derive(Copy, Clone)]
pub struct GDExtensionInterface {
    pub version_major: u32,
    pub version_minor: u32,
    pub version_patch: u32,
    pub version_string: *const c_char,

    pub mem_alloc: Option<unsafe extern "C" fn(p_bytes: usize) -> *mut c_void>,
    pub mem_free: Option<unsafe extern "C" fn(p_ptr: *mut c_void)>,

    pub print_error: Option<
        unsafe extern "C" fn(p_description: *const c_char, p_function: *const c_char, p_file: *const c_char, p_line: i32),
    >,
    pub print_warning: Option<
        unsafe extern "C" fn(p_description: *const c_char, p_function: *const c_char, p_file: *const c_char, p_line: i32),
    >,

    pub variant_get_ptr_constructor:
        Option<unsafe extern "C" fn(p_type: GDExtensionVariantType, p_constructor: i32) -> GDExtensionPtrConstructor>,
    pub variant_get_ptr_destructor: Option<unsafe extern "C" fn(p_type: GDExtensionVariantType) -> GDExtensionPtrDestructor>,

    pub string_new_with_utf8_chars_and_len: Option<
        unsafe extern "C" fn(r_dest: GDExtensionUninitializedTypePtr, p_contents: *const c_char, p_size: GDExtensionInt),
    >,
    pub string_to_utf8_chars: Option<
        unsafe extern "C" fn(
            p_self: GDExtensionConstTypePtr,
            r_text: *mut c_char,
            p_max_write_length: GDExtensionInt,
        ) -> GDExtensionInt,
    >,

    pub object_method_bind_ptrcall: Option<
        unsafe extern "C" fn(
            p_method_bind: GDExtensionMethodBindPtr,
            p_instance: GDExtensionObjectPtr,
            p_args: *const GDExtensionConstTypePtr,
            r_ret: GDExtensionTypePtr,
        ),
    >,
    pub object_destroy: Option<unsafe extern "C" fn(p_o: GDExtensionObjectPtr)>,
    pub object_get_instance_from_id: Option<unsafe extern "C" fn(p_instance_id: GDObjectInstanceID) -> GDExtensionObjectPtr>,
    pub object_get_instance_id: Option<unsafe extern "C" fn(p_object: GDExtensionConstObjectPtr) -> GDObjectInstanceID>,
    pub object_cast_to:
        Option<unsafe extern "C" fn(p_object: GDExtensionConstObjectPtr, p_class_tag: *mut c_void) -> GDExtensionObjectPtr>,
    pub object_set_instance: Option<
        unsafe extern "C" fn(p_o: GDExtensionObjectPtr, p_classname: *const c_char, p_instance: GDExtensionClassInstancePtr),
    >,
    pub object_set_instance_binding:
        Option<unsafe extern "C" fn(p_o: GDExtensionObjectPtr, p_token: *mut c_void, p_binding: *mut c_void)>,
    pub object_get_instance_binding: Option<unsafe extern "C" fn(p_o: GDExtensionObjectPtr, p_token: *mut c_void) -> *mut c_void>,

    pub classdb_construct_object: Option<unsafe extern "C" fn(p_classname: *const c_char) -> GDExtensionObjectPtr>,
    pub classdb_get_method_bind: Option<
        unsafe extern "C" fn(
            p_classname: *const c_char,
            p_methodname: *const c_char,
            p_hash: GDExtensionInt,
        ) -> GDExtensionMethodBindPtr,
    >,
    pub classdb_get_class_tag: Option<unsafe extern "C" fn(p_classname: *const c_char) -> *mut c_void>,
    pub classdb_register_extension_class: Option<
        unsafe extern "C" fn(
            p_library: GDExtensionClassLibraryPtr,
            p_class_name: *const c_char,
            p_parent_class_name: *const c_char,
            p_extension_funcs: *const GDExtensionClassCreationInfo,
        ),
    >,
    pub classdb_unregister_extension_class:
        Option<unsafe extern "C" fn(p_library: GDExtensionClassLibraryPtr, p_class_name: *const c_char)>,
}

/// Calls `$m!(field)` for every function pointer in [`GDExtensionInterface`].
#[doc(hidden)]
#[macro_export]
macro_rules! for_each_interface_fn {
    ($m:ident) => {
        $m!(mem_alloc);
        $m!(mem_free);
        $m!(print_error);
        $m!(print_warning);
        $m!(variant_get_ptr_constructor);
        $m!(variant_get_ptr_destructor);
        $m!(string_new_with_utf8_chars_and_len);
        $m!(string_to_utf8_chars);
        $m!(object_method_bind_ptrcall);
        $m!(object_destroy);
        $m!(object_get_instance_from_id);
        $m!(object_get_instance_id);
        $m!(object_cast_to);
        $m!(object_set_instance);
        $m!(object_set_instance_binding);
        $m!(object_get_instance_binding);
        $m!(classdb_construct_object);
        $m!(classdb_get_method_bind);
        $m!(classdb_get_class_tag);
        $m!(classdb_register_extension_class);
        $m!(classdb_unregister_extension_class);
    };
}
