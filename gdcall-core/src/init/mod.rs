/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Entry point of an extension library.

use std::cell::RefCell;
use std::ffi::c_void;

use crate::log::{print_with_interface, Severity};
use crate::private::handle_panic;
use crate::registry::ClassRegistry;
use crate::{classes, out, sys};

pub use sys::{BindingConfig, InitError, InitLevel, Safeguards};

/// Defines the entry point for a GDExtension Rust library.
///
/// Every library should have exactly one implementation of this trait. It is used together with the
/// [`gdextension!`][crate::gdextension] macro, which exports the `extern "C"` init function.
///
/// ```ignore
/// struct MyExtension;
///
/// unsafe impl ExtensionLibrary for MyExtension {
///     fn register_classes(registry: &mut ClassRegistry) {
///         registry.register::<Player>();
///     }
/// }
///
/// gdextension!(MyExtension);
/// ```
///
/// # Safety
/// The library cannot enforce any safety guarantees outside Rust code. Objects passed in by the engine or by other
/// extensions are trusted to be what their class says.
pub unsafe trait ExtensionLibrary: 'static {
    /// Determines the initialization level at which the extension is loaded (`Scene` by default).
    fn min_level() -> InitLevel {
        InitLevel::Scene
    }

    /// Runtime configuration of the binding, read once when the library is loaded.
    fn config() -> BindingConfig {
        BindingConfig::default()
    }

    /// Queues all user classes of this library. Called once, before any level is initialized.
    #[allow(unused_variables)]
    fn register_classes(registry: &mut ClassRegistry) {
        // Nothing by default.
    }

    /// Custom logic when a certain init-level of the engine is loaded.
    ///
    /// Invoked for levels >= [`Self::min_level()`], in ascending order, after the classes of that level are registered.
    #[allow(unused_variables)]
    fn on_level_init(ctx: &InitContext) {
        // Nothing by default.
    }

    /// Custom logic when a certain init-level of the engine is unloaded.
    ///
    /// Invoked for levels >= [`Self::min_level()`], in descending order, before the classes of that level are unregistered.
    #[allow(unused_variables)]
    fn on_level_deinit(ctx: &InitContext) {
        // Nothing by default.
    }
}

/// Passed to the level hooks of [`ExtensionLibrary`].
#[derive(Copy, Clone, Debug)]
pub struct InitContext {
    binding: &'static sys::Binding,
    level: InitLevel,
}

impl InitContext {
    pub fn binding(&self) -> &'static sys::Binding {
        self.binding
    }

    pub fn level(&self) -> InitLevel {
        self.level
    }
}

/// Validates the engine interface and resolves the method binds of all engine classes.
///
/// The returned binding lives for the rest of the process.
///
/// # Safety
/// `interface` and `library` must be the pointers the engine passed to the entry point.
pub unsafe fn bind_engine(
    interface: *const sys::GDExtensionInterface,
    library: sys::GDExtensionClassLibraryPtr,
    config: BindingConfig,
) -> Result<&'static sys::Binding, InitError> {
    let method_decls = classes::method_decls();
    let binding = sys::Binding::new(interface, library, &method_decls, config)?;

    out!("Bound {} engine methods.", method_decls.len());
    Ok(binding.leak())
}

struct InitUserdata {
    binding: &'static sys::Binding,
    registry: RefCell<ClassRegistry>,
}

/// `extern "C"` init function of the library `L`; see [`gdextension!`][crate::gdextension].
///
/// # Safety
/// Must only be called by the engine, with the arguments it passes to an extension's entry symbol.
#[doc(hidden)]
pub unsafe extern "C" fn entry_point<L: ExtensionLibrary>(
    interface: *const sys::GDExtensionInterface,
    library: sys::GDExtensionClassLibraryPtr,
    init: *mut sys::GDExtensionInitialization,
) -> sys::GDExtensionBool {
    let binding = match bind_engine(interface, library, L::config()) {
        Ok(binding) => binding,
        Err(err) => {
            report_init_error(interface, &err);
            return false as sys::GDExtensionBool;
        }
    };

    let ctx = || "error when loading GDExtension library";
    let is_success = handle_panic(binding, ctx, || {
        let mut registry = ClassRegistry::new(binding);
        L::register_classes(&mut registry);

        let userdata = Box::new(InitUserdata {
            binding,
            registry: RefCell::new(registry),
        });

        *init = sys::GDExtensionInitialization {
            minimum_initialization_level: L::min_level().to_sys(),
            userdata: Box::into_raw(userdata) as *mut c_void,
            initialize: Some(ffi_initialize_layer::<L>),
            deinitialize: Some(ffi_deinitialize_layer::<L>),
        };

        true as sys::GDExtensionBool
    });

    is_success.unwrap_or(false as sys::GDExtensionBool)
}

fn report_init_error(interface: *const sys::GDExtensionInterface, err: &InitError) {
    let message = format!("Failed to load GDExtension library: {err}");

    // SAFETY: the engine passes either null or a valid interface.
    match unsafe { interface.as_ref() } {
        Some(interface) => print_with_interface(interface, Severity::Error, &message, concat!(file!(), "\0"), line!()),
        None => eprintln!("{message}"),
    }
}

unsafe extern "C" fn ffi_initialize_layer<L: ExtensionLibrary>(
    userdata: *mut c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let userdata = &*(userdata as *const InitUserdata);
    let level = InitLevel::from_sys(init_level);
    let ctx = || format!("failed to initialize GDExtension level `{level:?}`");

    // Swallow panics.
    let _ = handle_panic(userdata.binding, ctx, || {
        userdata.registry.borrow_mut().load_level(level);

        L::on_level_init(&InitContext {
            binding: userdata.binding,
            level,
        });
    });
}

unsafe extern "C" fn ffi_deinitialize_layer<L: ExtensionLibrary>(
    userdata: *mut c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let level = InitLevel::from_sys(init_level);
    let binding = (*(userdata as *const InitUserdata)).binding;
    let ctx = || format!("failed to deinitialize GDExtension level `{level:?}`");

    // Swallow panics.
    let _ = handle_panic(binding, ctx, || {
        {
            let userdata = &*(userdata as *const InitUserdata);

            L::on_level_deinit(&InitContext { binding, level });
            userdata.registry.borrow_mut().unload_level(level);
        }

        // Lowest level is deinitialized last; no more callbacks follow.
        if level <= L::min_level() {
            let userdata = Box::from_raw(userdata as *mut InitUserdata);
            userdata.registry.borrow_mut().unregister_all();
            out!("GDExtension library unloaded.");
        }
    });
}

/// Exports the init function of an [`ExtensionLibrary`] under the given symbol (default `gdext_rust_init`).
///
/// The symbol must match `entry_symbol` in the library's `.gdextension` file.
///
/// ```ignore
/// gdextension!(MyExtension);
/// gdextension!(MyExtension, my_custom_init);
/// ```
#[macro_export]
macro_rules! gdextension {
    ($Library:ty) => {
        $crate::gdextension!($Library, gdext_rust_init);
    };
    ($Library:ty, $entry_point:ident) => {
        #[no_mangle]
        pub unsafe extern "C" fn $entry_point(
            interface: *const $crate::sys::GDExtensionInterface,
            library: $crate::sys::GDExtensionClassLibraryPtr,
            init: *mut $crate::sys::GDExtensionInitialization,
        ) -> $crate::sys::GDExtensionBool {
            $crate::init::entry_point::<$Library>(interface, library, init)
        }

        const _: $crate::sys::GDExtensionInitializationFunction = $entry_point;
    };
}

pub use crate::gdextension;
