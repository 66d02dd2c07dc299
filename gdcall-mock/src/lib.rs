/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! In-process stand-in for the engine side of the GDExtension ABI.
//!
//! [`MockEngine`] hands out a complete `GDExtensionInterface` whose functions operate on a small, thread-local object
//! model: the classes `Object`, `RefCounted`, `Resource`, `Node` and `Node3D` with the methods the bindings declare,
//! reference counting, parent/child ownership of nodes, engine strings, and registration of extension classes with
//! virtual dispatch. Every misuse an engine would report (double free, calls on destroyed objects, unbalanced
//! reference counts) is recorded and can be inspected by tests.
//!
//! One engine exists per thread; creating a new [`MockEngine`] resets it.

mod call;
mod dispatch;
mod ffi;
mod native;
mod state;
mod strings;

use std::ffi::c_void;
use std::rc::Rc;

use gdcall_ffi as sys;

pub use call::MockCall;

use dispatch::VirtualArg;
use state::with_state;

/// Counters of engine-side events since the engine was created.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct MockStats {
    pub objects_created: usize,
    pub objects_destroyed: usize,
    pub live_strings: usize,
    pub allocs: usize,
    pub frees: usize,
    pub double_frees: usize,
    pub calls_on_dead: usize,
    pub method_calls: usize,
    pub virtual_lookups: usize,
    pub virtual_calls: usize,
}

impl MockStats {
    /// Objects created and not yet destroyed.
    pub fn live_objects(&self) -> usize {
        self.objects_created - self.objects_destroyed
    }
}

/// Engine of the current thread, as seen by tests.
///
/// ```ignore
/// let engine = MockEngine::new();
/// let binding = unsafe { bind_engine(engine.interface(), engine.library(), BindingConfig::default()) }?;
///
/// let node = Node::new_alloc(binding);
/// node.set_name("root");
/// assert_eq!(engine.name_of(node.handle().obj_sys()).as_deref(), Some("root"));
/// ```
pub struct MockEngine {
    interface: &'static sys::GDExtensionInterface,
    library: sys::GDExtensionClassLibraryPtr,
    loaded: Option<sys::GDExtensionInitialization>,
}

impl MockEngine {
    /// Resets the engine of this thread and reports version 4.3.0.
    pub fn new() -> Self {
        Self::with_version(4, 3, 0)
    }

    pub fn with_version(major: u32, minor: u32, patch: u32) -> Self {
        state::reset();

        Self {
            interface: Box::leak(Box::new(ffi::interface((major, minor, patch)))),
            library: Box::into_raw(Box::new(0u8)) as sys::GDExtensionClassLibraryPtr,
            loaded: None,
        }
    }

    pub fn interface(&self) -> *const sys::GDExtensionInterface {
        self.interface
    }

    /// Copy of the interface, e.g. to null out individual functions.
    pub fn interface_copy(&self) -> sys::GDExtensionInterface {
        *self.interface
    }

    /// Library token that identifies the extension.
    pub fn library(&self) -> sys::GDExtensionClassLibraryPtr {
        self.library
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Extension lifecycle

    /// Calls the extension's init function, then initializes every level from its minimum up to `Scene`.
    ///
    /// Returns `false` if the init function reports failure; no level is initialized then.
    pub fn load_extension(&mut self, entry: sys::GDExtensionInitializationFunction) -> bool {
        let mut init = sys::GDExtensionInitialization::default();
        let success = unsafe { entry(self.interface, self.library, &mut init) } != 0;
        if !success {
            return false;
        }

        if let Some(initialize) = init.initialize {
            for level in init.minimum_initialization_level..=sys::GDEXTENSION_INITIALIZATION_SCENE {
                unsafe { initialize(init.userdata, level) };
            }
        }

        self.loaded = Some(init);
        true
    }

    /// Deinitializes all levels of a loaded extension, from `Scene` down to its minimum.
    pub fn unload_extension(&mut self) {
        let Some(init) = self.loaded.take() else {
            return;
        };

        if let Some(deinitialize) = init.deinitialize {
            for level in (init.minimum_initialization_level..=sys::GDEXTENSION_INITIALIZATION_SCENE).rev() {
                unsafe { deinitialize(init.userdata, level) };
            }
        }
    }

    pub fn is_extension_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Main loop

    /// Runs `_process(delta)` on every live node with an extension instance, in creation order, then destroys the
    /// nodes queued with `queue_free()`. Nodes with process mode `Disabled` are skipped.
    pub fn process_frame(&self, delta: f64) {
        for node in Self::processable_nodes() {
            dispatch::call_virtual(node, "_process", VirtualArg::Delta(delta));
        }
        native::flush_deletion_queue();
    }

    /// Runs `_physics_process(delta)` like [`process_frame()`][Self::process_frame], without flushing the deletion queue.
    pub fn physics_frame(&self, delta: f64) {
        for node in Self::processable_nodes() {
            dispatch::call_virtual(node, "_physics_process", VirtualArg::Delta(delta));
        }
    }

    /// Sends `_notification(what)` to the extension instance of `obj`.
    pub fn notify(&self, obj: sys::GDExtensionObjectPtr, what: i64) {
        dispatch::call_virtual(obj as usize, "_notification", VirtualArg::What(what));
    }

    fn processable_nodes() -> Vec<usize> {
        const PROCESS_MODE_DISABLED: i64 = 4;

        with_state(|s| {
            s.creation_order
                .iter()
                .copied()
                .filter(|&addr| {
                    s.live_object(addr).is_some_and(|obj| {
                        obj.extension.is_some() && obj.process_mode != PROCESS_MODE_DISABLED
                    })
                })
                .filter(|&addr| s.is_instance_of(addr, "Node"))
                .collect()
        })
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Methods

    /// Replaces the implementation of `class::method`, or adds the method if the engine does not know it.
    ///
    /// Binds that were resolved earlier call the new implementation.
    pub fn stub_method(&self, class: &str, method: &str, func: impl Fn(&MockCall) + 'static) {
        with_state(|s| s.add_method(class, method, Rc::new(func)));
    }

    /// Makes `classdb_get_method_bind` return null for `class::method`.
    pub fn remove_method(&self, class: &str, method: &str) {
        with_state(|s| {
            if let Some(&index) = s.method_index.get(&(class.to_string(), method.to_string())) {
                s.methods[index].func = None;
            }
        });
    }

    /// How often `class::method` was called through ptrcall.
    pub fn call_count(&self, class: &str, method: &str) -> usize {
        with_state(|s| {
            s.method_index
                .get(&(class.to_string(), method.to_string()))
                .map_or(0, |&index| s.methods[index].calls)
        })
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Inspection

    pub fn stats(&self) -> MockStats {
        with_state(|s| s.stats)
    }

    /// Messages passed to `print_error`, and errors the engine detected itself.
    pub fn errors(&self) -> Vec<String> {
        with_state(|s| s.errors.clone())
    }

    pub fn warnings(&self) -> Vec<String> {
        with_state(|s| s.warnings.clone())
    }

    pub fn is_alive(&self, obj: sys::GDExtensionObjectPtr) -> bool {
        with_state(|s| s.live_object(obj as usize).is_some())
    }

    /// Reference count of a live ref-counted object.
    pub fn refcount(&self, obj: sys::GDExtensionObjectPtr) -> Option<u32> {
        with_state(|s| {
            let obj = s.live_object(obj as usize)?;
            s.class(&obj.native_class)?.ref_counted.then_some(obj.refcount)
        })
    }

    pub fn class_of(&self, obj: sys::GDExtensionObjectPtr) -> Option<String> {
        with_state(|s| s.dynamic_class(obj as usize))
    }

    pub fn name_of(&self, obj: sys::GDExtensionObjectPtr) -> Option<String> {
        with_state(|s| s.live_object(obj as usize).map(|obj| obj.name.clone()))
    }

    pub fn parent_of(&self, obj: sys::GDExtensionObjectPtr) -> Option<sys::GDExtensionObjectPtr> {
        with_state(|s| s.live_object(obj as usize)?.parent).map(|addr| addr as sys::GDExtensionObjectPtr)
    }

    pub fn children_of(&self, obj: sys::GDExtensionObjectPtr) -> Vec<sys::GDExtensionObjectPtr> {
        with_state(|s| {
            s.live_object(obj as usize)
                .map(|obj| obj.children.iter().map(|&c| c as sys::GDExtensionObjectPtr).collect())
                .unwrap_or_default()
        })
    }

    /// Whether an extension class `name` is currently registered.
    pub fn has_class(&self, name: &str) -> bool {
        with_state(|s| s.class(name).is_some_and(|class| class.extension.is_some()))
    }

    /// Instance binding attached to `obj` for `token`; null if none.
    pub fn instance_binding(&self, obj: sys::GDExtensionObjectPtr, token: *mut c_void) -> *mut c_void {
        with_state(|s| {
            s.live_object(obj as usize)
                .and_then(|obj| obj.instance_binding)
                .filter(|&(bound, _)| bound == token as usize)
                .map_or(0, |(_, binding)| binding)
        }) as *mut c_void
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.unload_extension();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_char;

    fn construct(engine: &MockEngine, class: &str) -> sys::GDExtensionObjectPtr {
        let name = std::ffi::CString::new(class).expect("no NUL");
        unsafe { engine.interface_copy().classdb_construct_object.expect("present")(name.as_ptr()) }
    }

    fn bind(engine: &MockEngine, class: &str, method: &str) -> sys::GDExtensionMethodBindPtr {
        let class = std::ffi::CString::new(class).expect("no NUL");
        let method = std::ffi::CString::new(method).expect("no NUL");
        unsafe { engine.interface_copy().classdb_get_method_bind.expect("present")(class.as_ptr(), method.as_ptr(), 0) }
    }

    unsafe fn call<R: Copy + Default>(
        engine: &MockEngine,
        bind: sys::GDExtensionMethodBindPtr,
        obj: sys::GDExtensionObjectPtr,
        args: &[sys::GDExtensionConstTypePtr],
    ) -> R {
        let mut ret = R::default();
        engine.interface_copy().object_method_bind_ptrcall.expect("present")(
            bind,
            obj,
            args.as_ptr(),
            &mut ret as *mut R as sys::GDExtensionTypePtr,
        );
        ret
    }

    #[test]
    fn ref_counted_ids_carry_the_high_bit() {
        let engine = MockEngine::new();
        let node = construct(&engine, "Node");
        let resource = construct(&engine, "Resource");

        let get_id = engine.interface_copy().object_get_instance_id.expect("present");
        let (node_id, resource_id) = unsafe { (get_id(node), get_id(resource)) };

        assert_eq!(node_id >> 63, 0);
        assert_eq!(resource_id >> 63, 1);
        assert_eq!(engine.refcount(resource), Some(1));
        assert_eq!(engine.refcount(node), None);
    }

    #[test]
    fn destroying_a_parent_destroys_its_children() {
        let engine = MockEngine::new();
        let parent = construct(&engine, "Node");
        let child = construct(&engine, "Node3D");

        let add_child = bind(&engine, "Node", "add_child");
        let (force, internal) = (false, 0i64);
        let args = [
            &child as *const _ as sys::GDExtensionConstTypePtr,
            &force as *const bool as sys::GDExtensionConstTypePtr,
            &internal as *const i64 as sys::GDExtensionConstTypePtr,
        ];
        unsafe { call::<()>(&engine, add_child, parent, &args) };
        assert_eq!(engine.parent_of(child), Some(parent));

        let destroy = engine.interface_copy().object_destroy.expect("present");
        unsafe { destroy(parent) };

        assert!(!engine.is_alive(parent));
        assert!(!engine.is_alive(child));
        assert_eq!(engine.stats().live_objects(), 0);

        unsafe { destroy(child) };
        assert_eq!(engine.stats().double_frees, 1);
    }

    #[test]
    fn strings_are_counted() {
        let engine = MockEngine::new();
        let interface = engine.interface_copy();
        let text = "hello";

        let mut payload = 0u64;
        let dst = &mut payload as *mut u64 as sys::GDExtensionUninitializedTypePtr;
        unsafe {
            interface.string_new_with_utf8_chars_and_len.expect("present")(dst, text.as_ptr() as *const c_char, 5);
            assert_eq!(engine.stats().live_strings, 1);
            assert_eq!(interface.string_to_utf8_chars.expect("present")(dst, std::ptr::null_mut(), 0), 5);

            strings::string_destroy(dst);
        }
        assert_eq!(engine.stats().live_strings, 0);
    }

    #[test]
    fn calls_on_destroyed_objects_are_recorded() {
        let engine = MockEngine::new();
        let node = construct(&engine, "Node");
        let get_count = bind(&engine, "Node", "get_child_count");
        let include_internal = false;
        let args = [&include_internal as *const bool as sys::GDExtensionConstTypePtr];

        unsafe {
            assert_eq!(call::<i64>(&engine, get_count, node, &args), 0);
            engine.interface_copy().object_destroy.expect("present")(node);
            call::<i64>(&engine, get_count, node, &args);
        }

        assert_eq!(engine.stats().calls_on_dead, 1);
        assert_eq!(engine.call_count("Node", "get_child_count"), 1);
    }
}
