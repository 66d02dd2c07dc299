/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::meta::{ClassName, FromGodot};
use crate::obj::InstanceId;
use crate::sys::{interface_fn, CallFrame};
use crate::{out, sys};

/// Raw reference to an engine object: its pointer, its instance ID and the binding of the engine that owns it.
///
/// A handle carries no ownership. It is embedded in every class wrapper; [`Gd`][crate::obj::Gd] adds the
/// ownership semantics on top.
#[derive(Copy, Clone)]
pub struct ObjectHandle {
    obj: sys::GDExtensionObjectPtr,
    instance_id: InstanceId,
    binding: &'static sys::Binding,
}

impl ObjectHandle {
    /// Reads the instance ID of `obj`. Returns `None` for null pointers or objects without ID.
    ///
    /// # Safety
    /// `obj` must be null or point to a live engine object.
    pub(crate) unsafe fn from_obj_sys(binding: &'static sys::Binding, obj: sys::GDExtensionObjectPtr) -> Option<Self> {
        if obj.is_null() {
            return None;
        }

        let id = interface_fn!(binding, object_get_instance_id)(obj);
        let instance_id = InstanceId::try_from_u64(id)?;

        Some(Self {
            obj,
            instance_id,
            binding,
        })
    }

    pub fn obj_sys(&self) -> sys::GDExtensionObjectPtr {
        self.obj
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn binding(&self) -> &'static sys::Binding {
        self.binding
    }

    /// Returns `true` if the engine still knows this object under the same instance ID.
    ///
    /// Pointers can be reused after an object is destroyed; the ID comparison makes this check reliable.
    pub fn is_instance_valid(&self) -> bool {
        let ptr = unsafe { interface_fn!(self.binding, object_get_instance_from_id)(self.instance_id.to_u64()) };
        ptr == self.obj
    }

    /// ⚠️ Panics if the object is no longer alive.
    pub fn assert_valid_instance(&self, context: impl fmt::Display) {
        assert!(
            self.is_instance_valid(),
            "{context}: object with ID {} has been destroyed",
            self.instance_id
        );
    }

    /// Returns `true` if the object is an instance of `class` or one of its subclasses.
    pub fn is_of_class(&self, class: ClassName) -> bool {
        unsafe {
            let tag = interface_fn!(self.binding, classdb_get_class_tag)(class.as_sys());
            !tag.is_null() && !interface_fn!(self.binding, object_cast_to)(self.obj, tag).is_null()
        }
    }

    /// Calls `class::method` on this object with the arguments staged in `frame`, converting the result.
    ///
    /// The frame is released before this returns, also on panic.
    ///
    /// # Panics
    /// If the object is dead (and liveness checks are enabled), the method was not declared, or the result cannot be
    /// converted.
    pub(crate) fn call<R: FromGodot>(&self, class: ClassName, method: &'static str, frame: CallFrame) -> R {
        let via = self.call_raw::<R::Via>(class, method, frame);
        R::from_godot(via)
    }

    /// Like [`call()`][Self::call], but returns the ABI value directly.
    pub(crate) fn call_raw<V: sys::GodotFfi>(&self, class: ClassName, method: &'static str, frame: CallFrame) -> V {
        self.check_callable(class, method);

        let bind = self.binding.bind_for(class.as_str(), method);
        out!("  call {class}::{method}  <{}>", self.instance_id);

        // SAFETY: the bind was resolved for `class`, and the wrappers stage arguments matching its signature.
        unsafe { frame.ptrcall::<V>(bind, self.obj) }
    }

    /// Runs the liveness and class checks that precede every call of `class::method`, as configured in the binding's
    /// [`Safeguards`][sys::Safeguards].
    pub(crate) fn check_callable(&self, class: ClassName, method: &str) {
        let safeguards = self.binding.config().safeguards;

        if safeguards.checks_liveness() {
            self.assert_valid_instance(format_args!("{class}::{method}()"));
        }

        if safeguards.checks_class() {
            assert!(
                self.is_of_class(class),
                "{class}::{method}(): object with ID {} is not of class {class}",
                self.instance_id
            );
        }
    }

    /// # Safety
    /// The object must be alive, and no other party may destroy it afterwards.
    pub(crate) unsafe fn destroy(&self) {
        out!("  ObjectHandle::destroy  <{}>", self.instance_id);
        interface_fn!(self.binding, object_destroy)(self.obj);
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.obj == other.obj && self.instance_id == other.instance_id
    }
}

impl Eq for ObjectHandle {}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("obj", &self.obj)
            .field("id", &self.instance_id)
            .finish()
    }
}
