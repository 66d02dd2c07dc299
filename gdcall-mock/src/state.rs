/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine-side bookkeeping: classes, objects, method binds, strings.
//!
//! The state lives in a thread-local, because interface functions receive no context pointer. Borrows are always
//! released before the mock calls back into the extension, so callbacks may call into the engine again.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gdcall_ffi as sys;

use crate::call::MockCall;
use crate::native::{self, NativeClass};
use crate::MockStats;

pub(crate) type MethodFn = Rc<dyn Fn(&MockCall)>;

thread_local! {
    static STATE: RefCell<EngineState> = RefCell::new(EngineState::new());
}

/// Runs `f` with exclusive access to the engine state of this thread.
///
/// Must not be nested, and `f` must not call into the extension.
pub(crate) fn with_state<R>(f: impl FnOnce(&mut EngineState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

pub(crate) fn reset() {
    STATE.with(|state| *state.borrow_mut() = EngineState::new());
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

pub(crate) struct ClassInfo {
    pub name: String,
    pub parent: Option<String>,
    pub ref_counted: bool,
    pub is_node: bool,
    pub extension: Option<sys::GDExtensionClassCreationInfo>,
    pub registered: bool,
}

pub(crate) struct ExtensionInstance {
    pub class_name: String,
    pub instance: sys::GDExtensionClassInstancePtr,
}

/// Spatial state of a `Node3D`: row-major basis and origin.
#[derive(Copy, Clone, PartialEq, Debug)]
#[repr(C)]
pub(crate) struct MockTransform {
    pub rows: [[f32; 3]; 3],
    pub origin: [f32; 3],
}

impl MockTransform {
    pub const IDENTITY: Self = Self {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        origin: [0.0; 3],
    };
}

pub(crate) struct ObjectData {
    pub id: u64,
    pub native_class: String,
    pub extension: Option<ExtensionInstance>,
    pub alive: bool,
    pub refcount: u32,
    pub refcount_init: bool,
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub process_mode: i64,
    pub transform: MockTransform,
    pub instance_binding: Option<(usize, usize)>,
}

pub(crate) struct MethodEntry {
    pub class: String,
    pub name: String,
    pub func: Option<MethodFn>,
    pub calls: usize,
}

pub(crate) struct EngineState {
    pub classes: Vec<ClassInfo>,
    pub objects: HashMap<usize, ObjectData>,
    pub creation_order: Vec<usize>,
    pub by_id: HashMap<u64, usize>,
    pub next_id: u64,
    pub methods: Vec<MethodEntry>,
    pub method_index: HashMap<(String, String), usize>,
    pub virtual_cache: HashMap<(String, String), usize>,
    pub queued_for_deletion: Vec<usize>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: MockStats,
}

impl EngineState {
    fn new() -> Self {
        let mut state = Self {
            classes: Vec::new(),
            objects: HashMap::new(),
            creation_order: Vec::new(),
            by_id: HashMap::new(),
            next_id: 1,
            methods: Vec::new(),
            method_index: HashMap::new(),
            virtual_cache: HashMap::new(),
            queued_for_deletion: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: MockStats::default(),
        };

        for &NativeClass { name, parent, ref_counted } in native::CLASSES {
            state.classes.push(ClassInfo {
                name: name.to_string(),
                parent: parent.map(str::to_string),
                ref_counted,
                is_node: name == "Node" || parent.is_some_and(|p| p == "Node"),
                extension: None,
                registered: true,
            });
        }

        for (class, name, func) in native::methods() {
            state.add_method(class, name, func);
        }

        state
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Classes

    /// Index of the currently registered class `name`. The index plus one serves as the class tag.
    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.classes.iter().rposition(|class| class.registered && class.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.class_index(name).map(|index| &self.classes[index])
    }

    /// `name` and all its ancestors, most derived first.
    pub fn class_chain(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(name.to_string());

        while let Some(name) = current {
            current = self.class(&name).and_then(|class| class.parent.clone());
            chain.push(name);
        }
        chain
    }

    pub fn register_extension_class(
        &mut self,
        name: &str,
        parent: &str,
        info: sys::GDExtensionClassCreationInfo,
    ) -> Result<(), String> {
        if self.class(name).is_some() {
            return Err(format!("class `{name}` is already registered"));
        }
        let Some(parent_info) = self.class(parent) else {
            return Err(format!("parent class `{parent}` of `{name}` does not exist"));
        };

        let class = ClassInfo {
            name: name.to_string(),
            parent: Some(parent.to_string()),
            ref_counted: parent_info.ref_counted,
            is_node: parent_info.is_node,
            extension: Some(info),
            registered: true,
        };
        self.classes.push(class);
        Ok(())
    }

    pub fn unregister_extension_class(&mut self, name: &str) -> Result<(), String> {
        let index = self.class_index(name).ok_or_else(|| format!("class `{name}` is not registered"))?;
        if self.classes[index].extension.is_none() {
            return Err(format!("cannot unregister engine class `{name}`"));
        }

        let live = self
            .objects
            .values()
            .filter(|obj| obj.alive)
            .filter(|obj| obj.extension.as_ref().is_some_and(|ext| ext.class_name == name))
            .count();
        if live > 0 {
            self.warnings.push(format!("class `{name}` unregistered with {live} live instance(s)"));
        }

        self.classes[index].registered = false;
        self.virtual_cache.retain(|(class, _), _| class != name);
        Ok(())
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Objects

    /// Creates an instance of the engine class `native_class`. Objects are never deallocated, so addresses stay unique.
    pub fn create_object(&mut self, native_class: &str) -> usize {
        let ref_counted = self.class(native_class).is_some_and(|class| class.ref_counted);

        let addr = Box::into_raw(Box::new(0u64)) as usize;
        let mut id = self.next_id;
        self.next_id += 1;
        if ref_counted {
            id |= 1 << 63;
        }

        self.objects.insert(
            addr,
            ObjectData {
                id,
                native_class: native_class.to_string(),
                extension: None,
                alive: true,
                refcount: 1,
                refcount_init: true,
                name: String::new(),
                parent: None,
                children: Vec::new(),
                process_mode: 0,
                transform: MockTransform::IDENTITY,
                instance_binding: None,
            },
        );
        self.by_id.insert(id, addr);
        self.creation_order.push(addr);
        self.stats.objects_created += 1;
        addr
    }

    pub fn object(&self, addr: usize) -> Option<&ObjectData> {
        self.objects.get(&addr)
    }

    pub fn object_mut(&mut self, addr: usize) -> Option<&mut ObjectData> {
        self.objects.get_mut(&addr)
    }

    pub fn live_object(&self, addr: usize) -> Option<&ObjectData> {
        self.object(addr).filter(|obj| obj.alive)
    }

    /// Most derived class of the object: its extension class if it has one.
    pub fn dynamic_class(&self, addr: usize) -> Option<String> {
        let obj = self.object(addr)?;
        Some(match &obj.extension {
            Some(ext) => ext.class_name.clone(),
            None => obj.native_class.clone(),
        })
    }

    pub fn is_instance_of(&self, addr: usize, class: &str) -> bool {
        self.dynamic_class(addr)
            .is_some_and(|dynamic| self.class_chain(&dynamic).iter().any(|c| c == class))
    }

    pub fn attach_child(&mut self, parent: usize, child: usize) -> Result<(), String> {
        if parent == child {
            return Err("cannot add a node as a child of itself".to_string());
        }
        if self.live_object(child).is_none() {
            return Err("add_child(): child is not a live object".to_string());
        }
        if !self.is_instance_of(child, "Node") {
            return Err("add_child(): child is not a Node".to_string());
        }
        if let Some(existing) = self.objects[&child].parent {
            return Err(format!(
                "add_child(): child already has a parent (ID {})",
                self.objects[&existing].id
            ));
        }

        if let Some(obj) = self.objects.get_mut(&child) {
            obj.parent = Some(parent);
        }
        if let Some(obj) = self.objects.get_mut(&parent) {
            obj.children.push(child);
        }
        Ok(())
    }

    pub fn detach_child(&mut self, parent: usize, child: usize) -> Result<(), String> {
        let is_child = self.object(child).is_some_and(|obj| obj.parent == Some(parent));
        if !is_child {
            return Err("remove_child(): node is not a child of this node".to_string());
        }

        self.detach(child);
        Ok(())
    }

    /// Removes `addr` from its parent's children, if it has a parent.
    pub fn detach(&mut self, addr: usize) {
        let Some(parent) = self.objects.get_mut(&addr).and_then(|obj| obj.parent.take()) else {
            return;
        };
        if let Some(parent) = self.objects.get_mut(&parent) {
            parent.children.retain(|&c| c != addr);
        }
    }

    /// `addr` and its descendants, parents before children.
    pub fn subtree_preorder(&self, addr: usize) -> Vec<usize> {
        let mut out = vec![addr];
        if let Some(obj) = self.object(addr) {
            for &child in &obj.children {
                out.extend(self.subtree_preorder(child));
            }
        }
        out
    }

    /// `addr` and its descendants, children before parents.
    pub fn subtree_postorder(&self, addr: usize) -> Vec<usize> {
        let mut out = Vec::new();
        if let Some(obj) = self.object(addr) {
            for &child in &obj.children {
                out.extend(self.subtree_postorder(child));
            }
        }
        out.push(addr);
        out
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Methods

    pub fn add_method(&mut self, class: &str, name: &str, func: MethodFn) -> usize {
        let key = (class.to_string(), name.to_string());
        if let Some(&index) = self.method_index.get(&key) {
            self.methods[index].func = Some(func);
            return index;
        }

        let index = self.methods.len();
        self.methods.push(MethodEntry {
            class: class.to_string(),
            name: name.to_string(),
            func: Some(func),
            calls: 0,
        });
        self.method_index.insert(key, index);
        index
    }

    pub fn method_bind(&self, class: &str, name: &str) -> Option<usize> {
        let index = *self.method_index.get(&(class.to_string(), name.to_string()))?;
        self.methods[index].func.as_ref().map(|_| index)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Bind pointers and class tags are indices, offset by one so they are never null.

pub(crate) fn index_to_ptr(index: usize) -> *const std::ffi::c_void {
    (index + 1) as *const std::ffi::c_void
}

pub(crate) fn ptr_to_index(ptr: *const std::ffi::c_void) -> Option<usize> {
    (ptr as usize).checked_sub(1)
}
