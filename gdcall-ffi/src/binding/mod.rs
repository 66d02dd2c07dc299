/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;
use crate::{
    out, BindingConfig, BuiltinLifecycleTable, ClassMethodBind, GodotVersion, InitError, MethodDecl, MethodTable,
};

/// Everything needed to talk to one running engine: its interface, the library token, and the resolved method binds.
///
/// Created once while the extension is loaded, then leaked with [`leak()`][Self::leak]. All wrappers carry a
/// `&'static Binding`, so there is no process-wide state and initialization order is explicit.
pub struct Binding {
    interface: sys::GDExtensionInterface,
    library: sys::GDExtensionClassLibraryPtr,
    method_table: MethodTable,
    builtin_lifecycle: BuiltinLifecycleTable,
    config: BindingConfig,
}

// SAFETY: after construction the binding is immutable. The engine serializes access to the objects that are
// reached through it; the binding itself holds only function pointers and opaque tokens.
unsafe impl Sync for Binding {}
unsafe impl Send for Binding {}

impl Binding {
    /// Validates the interface and resolves all declared method binds.
    ///
    /// # Safety
    /// `interface` must be null or point to a valid interface struct whose function pointers stay valid for as long as the
    /// binding is used. `library` must be the token the engine passed at load time.
    pub unsafe fn new(
        interface: *const sys::GDExtensionInterface,
        library: sys::GDExtensionClassLibraryPtr,
        method_decls: &[MethodDecl],
        config: BindingConfig,
    ) -> Result<Self, InitError> {
        let interface = interface.as_ref().copied().ok_or(InitError::NullInterface)?;

        macro_rules! require {
            ($name:ident) => {
                if interface.$name.is_none() {
                    return Err(InitError::MissingInterfaceFn(stringify!($name)));
                }
            };
        }
        crate::for_each_interface_fn!(require);

        let version = GodotVersion::new(
            interface.version_major,
            interface.version_minor,
            interface.version_patch,
        );
        if !version.is_at_least(config.min_godot_version) {
            return Err(InitError::IncompatibleVersion {
                required: config.min_godot_version,
                actual: version,
            });
        }

        let builtin_lifecycle = BuiltinLifecycleTable::load(&interface)?;
        let method_table = MethodTable::load(&interface, method_decls)?;

        out!("Binding to engine {version} with {:?}.", config.safeguards);
        Ok(Self {
            interface,
            library,
            method_table,
            builtin_lifecycle,
            config,
        })
    }

    /// Moves the binding to the heap for the rest of the process.
    pub fn leak(self) -> &'static Binding {
        Box::leak(Box::new(self))
    }

    pub fn interface(&self) -> &sys::GDExtensionInterface {
        &self.interface
    }

    pub fn library(&self) -> sys::GDExtensionClassLibraryPtr {
        self.library
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    pub fn version(&self) -> GodotVersion {
        GodotVersion::new(
            self.interface.version_major,
            self.interface.version_minor,
            self.interface.version_patch,
        )
    }

    pub fn method_table(&self) -> &MethodTable {
        &self.method_table
    }

    pub fn builtin_lifecycle(&self) -> &BuiltinLifecycleTable {
        &self.builtin_lifecycle
    }

    /// Cached bind for `class::method`; see [`MethodTable::bind_for`].
    pub fn bind_for(&self, class: &str, method: &str) -> ClassMethodBind {
        self.method_table.bind_for(class, method)
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("version", &self.version())
            .field("library", &self.library)
            .field("methods", &self.method_table.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Extracts a function pointer from the binding's interface.
///
/// Every pointer is checked in [`Binding::new`], so this never yields a null function.
#[macro_export]
macro_rules! interface_fn {
    ($binding:expr, $name:ident) => {{
        unsafe { $binding.interface().$name.unwrap_unchecked() }
    }};
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::ffi::{c_char, c_void};

    pub(crate) fn empty_interface() -> sys::GDExtensionInterface {
        sys::GDExtensionInterface {
            version_major: 4,
            version_minor: 3,
            version_patch: 0,
            version_string: std::ptr::null(),
            mem_alloc: None,
            mem_free: None,
            print_error: None,
            print_warning: None,
            variant_get_ptr_constructor: None,
            variant_get_ptr_destructor: None,
            string_new_with_utf8_chars_and_len: None,
            string_to_utf8_chars: None,
            object_method_bind_ptrcall: None,
            object_destroy: None,
            object_get_instance_from_id: None,
            object_get_instance_id: None,
            object_cast_to: None,
            object_set_instance: None,
            object_set_instance_binding: None,
            object_get_instance_binding: None,
            classdb_construct_object: None,
            classdb_get_method_bind: None,
            classdb_get_class_tag: None,
            classdb_register_extension_class: None,
            classdb_unregister_extension_class: None,
        }
    }

    // Minimal engine stand-in: heap via std::alloc with a size header, no objects.
    pub(crate) mod fake {
        use super::*;
        use std::alloc::{alloc, dealloc, Layout};
        use std::cell::Cell;

        const HEADER: usize = 16;

        thread_local! {
            pub static ALLOCS: Cell<usize> = const { Cell::new(0) };
            pub static FREES: Cell<usize> = const { Cell::new(0) };
        }

        pub unsafe extern "C" fn mem_alloc(bytes: usize) -> *mut c_void {
            ALLOCS.with(|c| c.set(c.get() + 1));
            let layout = Layout::from_size_align(bytes + HEADER, 16).expect("layout");
            let base = alloc(layout);
            (base as *mut usize).write(bytes);
            base.add(HEADER) as *mut c_void
        }

        pub unsafe extern "C" fn mem_free(ptr: *mut c_void) {
            FREES.with(|c| c.set(c.get() + 1));
            let base = (ptr as *mut u8).sub(HEADER);
            let bytes = (base as *const usize).read();
            dealloc(base, Layout::from_size_align(bytes + HEADER, 16).expect("layout"));
        }

        pub unsafe extern "C" fn print(_: *const c_char, _: *const c_char, _: *const c_char, _: i32) {}

        unsafe extern "C" fn noop_construct(_: sys::GDExtensionUninitializedTypePtr, _: *const sys::GDExtensionConstTypePtr) {}
        unsafe extern "C" fn noop_destroy(_: sys::GDExtensionTypePtr) {}

        pub unsafe extern "C" fn get_constructor(_: sys::GDExtensionVariantType, _: i32) -> sys::GDExtensionPtrConstructor {
            Some(noop_construct)
        }

        pub unsafe extern "C" fn get_destructor(_: sys::GDExtensionVariantType) -> sys::GDExtensionPtrDestructor {
            Some(noop_destroy)
        }

        unsafe extern "C" fn string_new(_: sys::GDExtensionUninitializedTypePtr, _: *const c_char, _: sys::GDExtensionInt) {}
        unsafe extern "C" fn string_to_utf8(_: sys::GDExtensionConstTypePtr, _: *mut c_char, _: sys::GDExtensionInt) -> sys::GDExtensionInt {
            0
        }

        // Echoes the first i64 argument (if any) into the return slot.
        unsafe extern "C" fn ptrcall(
            _bind: sys::GDExtensionMethodBindPtr,
            _obj: sys::GDExtensionObjectPtr,
            args: *const sys::GDExtensionConstTypePtr,
            ret: sys::GDExtensionTypePtr,
        ) {
            if !ret.is_null() && !args.is_null() {
                let first = *(args.read() as *const i64);
                (ret as *mut i64).write(first);
            }
        }

        unsafe extern "C" fn destroy(_: sys::GDExtensionObjectPtr) {}
        unsafe extern "C" fn from_id(_: sys::GDObjectInstanceID) -> sys::GDExtensionObjectPtr {
            std::ptr::null_mut()
        }
        unsafe extern "C" fn get_id(_: sys::GDExtensionConstObjectPtr) -> sys::GDObjectInstanceID {
            0
        }
        unsafe extern "C" fn cast_to(_: sys::GDExtensionConstObjectPtr, _: *mut c_void) -> sys::GDExtensionObjectPtr {
            std::ptr::null_mut()
        }
        unsafe extern "C" fn set_instance(_: sys::GDExtensionObjectPtr, _: *const c_char, _: sys::GDExtensionClassInstancePtr) {}
        unsafe extern "C" fn set_binding(_: sys::GDExtensionObjectPtr, _: *mut c_void, _: *mut c_void) {}
        unsafe extern "C" fn get_binding(_: sys::GDExtensionObjectPtr, _: *mut c_void) -> *mut c_void {
            std::ptr::null_mut()
        }
        unsafe extern "C" fn construct(_: *const c_char) -> sys::GDExtensionObjectPtr {
            std::ptr::null_mut()
        }
        unsafe extern "C" fn get_method_bind(_: *const c_char, _: *const c_char, _: sys::GDExtensionInt) -> sys::GDExtensionMethodBindPtr {
            0x10 as sys::GDExtensionMethodBindPtr
        }
        unsafe extern "C" fn get_class_tag(_: *const c_char) -> *mut c_void {
            std::ptr::null_mut()
        }
        unsafe extern "C" fn register_class(
            _: sys::GDExtensionClassLibraryPtr,
            _: *const c_char,
            _: *const c_char,
            _: *const sys::GDExtensionClassCreationInfo,
        ) {
        }
        unsafe extern "C" fn unregister_class(_: sys::GDExtensionClassLibraryPtr, _: *const c_char) {}

        pub fn interface() -> sys::GDExtensionInterface {
            sys::GDExtensionInterface {
                mem_alloc: Some(mem_alloc),
                mem_free: Some(mem_free),
                print_error: Some(print),
                print_warning: Some(print),
                variant_get_ptr_constructor: Some(get_constructor),
                variant_get_ptr_destructor: Some(get_destructor),
                string_new_with_utf8_chars_and_len: Some(string_new),
                string_to_utf8_chars: Some(string_to_utf8),
                object_method_bind_ptrcall: Some(ptrcall),
                object_destroy: Some(destroy),
                object_get_instance_from_id: Some(from_id),
                object_get_instance_id: Some(get_id),
                object_cast_to: Some(cast_to),
                object_set_instance: Some(set_instance),
                object_set_instance_binding: Some(set_binding),
                object_get_instance_binding: Some(get_binding),
                classdb_construct_object: Some(construct),
                classdb_get_method_bind: Some(get_method_bind),
                classdb_get_class_tag: Some(get_class_tag),
                classdb_register_extension_class: Some(register_class),
                classdb_unregister_extension_class: Some(unregister_class),
                ..empty_interface()
            }
        }

        pub fn binding() -> &'static Binding {
            let interface = interface();
            let decls = [sys::MethodDecl::new(sys::ClassName::new("Object\0"), "echo\0", 0)];
            unsafe { Binding::new(&interface, std::ptr::null_mut(), &decls, BindingConfig::default()) }
                .expect("fake interface is complete")
                .leak()
        }
    }

    #[test]
    fn null_interface_is_rejected() {
        let result = unsafe { Binding::new(std::ptr::null(), std::ptr::null_mut(), &[], BindingConfig::default()) };
        assert_eq!(result.err(), Some(InitError::NullInterface));
    }

    #[test]
    fn missing_function_is_reported_by_name() {
        let mut interface = fake::interface();
        interface.object_cast_to = None;

        let result = unsafe { Binding::new(&interface, std::ptr::null_mut(), &[], BindingConfig::default()) };
        assert_eq!(result.err(), Some(InitError::MissingInterfaceFn("object_cast_to")));
    }

    #[test]
    fn old_engine_is_rejected() {
        let mut interface = fake::interface();
        interface.version_minor = 0;

        let config = BindingConfig {
            min_godot_version: (4, 1),
            ..BindingConfig::default()
        };
        let result = unsafe { Binding::new(&interface, std::ptr::null_mut(), &[], config) };
        assert_eq!(
            result.err(),
            Some(InitError::IncompatibleVersion {
                required: (4, 1),
                actual: GodotVersion::new(4, 0, 0),
            })
        );
    }

    #[test]
    fn complete_interface_binds() {
        let binding = fake::binding();
        assert_eq!(binding.version(), GodotVersion::new(4, 3, 0));
        assert_eq!(binding.method_table().len(), 1);
        assert!(binding.method_table().try_bind_for("Object", "echo").is_some());
    }
}
