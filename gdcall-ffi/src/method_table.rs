/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use crate as sys;
use crate::{out, ClassName, InitError};

/// Declaration of one engine method: the key under which its bind is resolved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDecl {
    pub class: ClassName,

    /// NUL-terminated method name, e.g. `"get_name\0"`.
    pub method: &'static str,

    /// Hash of the method signature, as listed in the engine's API description.
    pub hash: i64,
}

impl MethodDecl {
    pub const fn new(class: ClassName, method: &'static str, hash: i64) -> Self {
        Self { class, method, hash }
    }

    pub fn method_name(&self) -> &'static str {
        sys::strip_nul(self.method)
    }
}

/// Opaque native method pointer, obtained once from the engine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassMethodBind(sys::GDExtensionMethodBindPtr);

// SAFETY: the bind is an immutable handle into the engine's class database, valid for the whole process.
unsafe impl Send for ClassMethodBind {}
unsafe impl Sync for ClassMethodBind {}

impl ClassMethodBind {
    pub fn as_ptr(self) -> sys::GDExtensionMethodBindPtr {
        self.0
    }
}

/// Maps (class, method) to native method binds.
///
/// Filled once while the binding is created, read-only afterwards. Lookups never call into the engine.
pub struct MethodTable {
    classes: HashMap<&'static str, HashMap<&'static str, ClassMethodBind>>,
    method_count: usize,
}

impl MethodTable {
    /// Resolves every declared method through `classdb_get_method_bind`.
    ///
    /// # Safety
    /// `classdb_get_method_bind` must be a valid engine function.
    pub unsafe fn load(interface: &sys::GDExtensionInterface, decls: &[MethodDecl]) -> Result<Self, InitError> {
        let get_method_bind = interface
            .classdb_get_method_bind
            .ok_or(InitError::MissingInterfaceFn("classdb_get_method_bind"))?;

        let mut table = Self {
            classes: HashMap::new(),
            method_count: 0,
        };

        for decl in decls {
            let method = decl.method_name();
            let ptr = get_method_bind(decl.class.as_sys(), sys::c_str(decl.method.as_bytes()), decl.hash);

            if ptr.is_null() {
                return Err(InitError::MissingMethodBind {
                    class: decl.class.as_str(),
                    method,
                    hash: decl.hash,
                });
            }

            let previous = table
                .classes
                .entry(decl.class.as_str())
                .or_default()
                .insert(method, ClassMethodBind(ptr));

            if previous.is_none() {
                table.method_count += 1;
            }
        }

        out!("Loaded {} method binds for {} classes.", table.method_count, table.classes.len());
        Ok(table)
    }

    /// Returns the bind for `class::method`.
    ///
    /// # Panics
    /// If the method was never declared. This is a programming error, not an engine condition.
    pub fn bind_for(&self, class: &str, method: &str) -> ClassMethodBind {
        self.try_bind_for(class, method).unwrap_or_else(|| {
            panic!("method bind {class}::{method} was not declared during initialization")
        })
    }

    pub fn try_bind_for(&self, class: &str, method: &str) -> Option<ClassMethodBind> {
        self.classes.get(class)?.get(method).copied()
    }

    pub fn len(&self) -> usize {
        self.method_count
    }

    pub fn is_empty(&self) -> bool {
        self.method_count == 0
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Constructors and destructors of builtin types with engine-side storage.
#[derive(Copy, Clone)]
pub struct BuiltinLifecycleTable {
    pub string_copy: unsafe extern "C" fn(sys::GDExtensionUninitializedTypePtr, *const sys::GDExtensionConstTypePtr),
    pub string_destroy: unsafe extern "C" fn(sys::GDExtensionTypePtr),
}

impl BuiltinLifecycleTable {
    /// # Safety
    /// `variant_get_ptr_constructor` and `variant_get_ptr_destructor` must be valid engine functions.
    pub unsafe fn load(interface: &sys::GDExtensionInterface) -> Result<Self, InitError> {
        let get_constructor = interface
            .variant_get_ptr_constructor
            .ok_or(InitError::MissingInterfaceFn("variant_get_ptr_constructor"))?;
        let get_destructor = interface
            .variant_get_ptr_destructor
            .ok_or(InitError::MissingInterfaceFn("variant_get_ptr_destructor"))?;

        let string_type = sys::VariantType::String.sys();

        Ok(Self {
            string_copy: get_constructor(string_type, sys::STRING_COPY_CONSTRUCTOR)
                .ok_or(InitError::MissingBuiltinLifecycle("String copy constructor"))?,
            string_destroy: get_destructor(string_type)
                .ok_or(InitError::MissingBuiltinLifecycle("String destructor"))?,
        })
    }
}
