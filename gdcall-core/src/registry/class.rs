/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::type_name;
use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr;

use crate::meta::ClassName;
use crate::obj::{GodotClass, UserClass};
use crate::registry::callbacks::{self, ClassUserdata};
use crate::registry::VirtualTable;
use crate::sys::{interface_fn, InitLevel};
use crate::{godot_error, out, sys};

/// Class queued through [`ClassRegistry::register()`], not yet known to the engine.
#[derive(Debug)]
struct ClassRegistrationInfo {
    class_name: ClassName,
    parent_class_name: ClassName,
    init_level: InitLevel,
    rust_type: &'static str,
    make_params: fn(&'static sys::Binding) -> sys::GDExtensionClassCreationInfo,
    free_userdata: unsafe fn(*mut c_void),
}

/// Represents a class that is currently registered with the engine.
///
/// Besides the name, this type holds the class userdata that must be freed after deregistration.
struct LoadedClass {
    name: ClassName,
    userdata: *mut c_void,
    free_userdata: unsafe fn(*mut c_void),
}

/// User classes of one extension library, and their registration state in the engine.
///
/// Classes are queued with [`register()`][Self::register] and handed to the engine when their
/// [`InitLevel`] is initialized. They are unregistered in reverse order when the level is deinitialized.
pub struct ClassRegistry {
    binding: &'static sys::Binding,
    pending: Vec<ClassRegistrationInfo>,
    loaded: HashMap<InitLevel, Vec<LoadedClass>>,
}

impl ClassRegistry {
    pub(crate) fn new(binding: &'static sys::Binding) -> Self {
        Self {
            binding,
            pending: Vec::new(),
            loaded: HashMap::new(),
        }
    }

    pub fn binding(&self) -> &'static sys::Binding {
        self.binding
    }

    /// Queues `T` for registration at [`T::INIT_LEVEL`][GodotClass::INIT_LEVEL].
    ///
    /// # Panics
    /// If a class with the same name has already been queued.
    pub fn register<T: UserClass>(&mut self) -> &mut Self {
        let class_name = T::CLASS_NAME;
        assert!(
            !self.pending.iter().any(|info| info.class_name == class_name),
            "class `{class_name}` is registered multiple times; Rust type {}",
            type_name::<T>()
        );

        out!("Queue class {class_name} for level `{:?}`", T::INIT_LEVEL);
        self.pending.push(ClassRegistrationInfo {
            class_name,
            parent_class_name: <T::Wrapper as GodotClass>::CLASS_NAME,
            init_level: T::INIT_LEVEL,
            rust_type: type_name::<T>(),
            make_params: creation_info::<T>,
            free_userdata: free_class_userdata::<T>,
        });
        self
    }

    /// Number of queued classes, registered or not.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether `T` is currently registered with the engine.
    pub fn is_registered<T: GodotClass>(&self) -> bool {
        self.loaded
            .values()
            .flatten()
            .any(|loaded| loaded.name == T::CLASS_NAME)
    }

    /// Lets the engine know about all classes of `level`.
    pub(crate) fn load_level(&mut self, level: InitLevel) {
        out!("Register classes at level `{level:?}`...");

        let binding = self.binding;
        let loaded = self.loaded.entry(level).or_default();

        for info in self.pending.iter().filter(|info| info.init_level == level) {
            let class_name = info.class_name;

            let name_taken = unsafe { !interface_fn!(binding, classdb_get_class_tag)(class_name.as_sys()).is_null() };
            if name_taken {
                godot_error!(
                    binding,
                    "Failed to register class `{class_name}` ({}): a class with this name already exists",
                    info.rust_type
                );
                continue;
            }

            let params = (info.make_params)(binding);
            let registration_failed = unsafe {
                interface_fn!(binding, classdb_register_extension_class)(
                    binding.library(),
                    class_name.as_sys(),
                    info.parent_class_name.as_sys(),
                    ptr::addr_of!(params),
                );

                // Registration reports no errors apart from console output.
                interface_fn!(binding, classdb_get_class_tag)(class_name.as_sys()).is_null()
            };

            if registration_failed {
                godot_error!(
                    binding,
                    "Failed to register class `{class_name}` ({}); check preceding engine messages",
                    info.rust_type
                );
                unsafe { (info.free_userdata)(params.class_userdata) };
                continue;
            }

            out!("Class {class_name} loaded");
            loaded.push(LoadedClass {
                name: class_name,
                userdata: params.class_userdata,
                free_userdata: info.free_userdata,
            });
        }
    }

    /// Unregisters all classes of `level`, in reverse registration order.
    pub(crate) fn unload_level(&mut self, level: InitLevel) {
        let binding = self.binding;
        let loaded = self.loaded.remove(&level).unwrap_or_default();

        out!("Unregistering classes of level {level:?}...");
        for class in loaded.into_iter().rev() {
            unsafe {
                interface_fn!(binding, classdb_unregister_extension_class)(binding.library(), class.name.as_sys());
                (class.free_userdata)(class.userdata);
            }
            out!("Class {} unloaded", class.name);
        }
    }

    /// Unregisters the classes of every level that is still loaded, highest level first.
    pub(crate) fn unregister_all(&mut self) {
        let mut levels = self.loaded.keys().copied().collect::<Vec<_>>();
        levels.sort_unstable_by(|a, b| b.cmp(a));

        for level in levels {
            self.unload_level(level);
        }
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("pending", &self.pending)
            .field("loaded", &self.loaded.values().flatten().map(|c| c.name).collect::<Vec<_>>())
            .finish()
    }
}

fn creation_info<T: UserClass>(binding: &'static sys::Binding) -> sys::GDExtensionClassCreationInfo {
    let mut virtuals = VirtualTable::<T>::new();
    T::register_virtuals(&mut virtuals);

    let userdata = Box::new(ClassUserdata { binding, virtuals });

    sys::GDExtensionClassCreationInfo {
        is_virtual: false as sys::GDExtensionBool,
        is_abstract: false as sys::GDExtensionBool,
        create_instance_func: Some(callbacks::create::<T>),
        free_instance_func: Some(callbacks::free::<T>),
        get_virtual_call_data_func: Some(callbacks::get_virtual_call_data::<T>),
        call_virtual_with_data_func: Some(callbacks::call_virtual_with_data::<T>),
        class_userdata: Box::into_raw(userdata) as *mut c_void,
    }
}

unsafe fn free_class_userdata<T: UserClass>(userdata: *mut c_void) {
    drop(Box::from_raw(userdata as *mut ClassUserdata<T>));
}
