/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine classes known to the mock and the behavior of their methods.

use std::rc::Rc;

use glam::{Mat3, Vec3};

use crate::call::MockCall;
use crate::dispatch::{call_virtual, destroy_object, VirtualArg};
use crate::state::{with_state, MethodFn, MockTransform};

pub(crate) struct NativeClass {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub ref_counted: bool,
}

pub(crate) const CLASSES: &[NativeClass] = &[
    NativeClass { name: "Object", parent: None, ref_counted: false },
    NativeClass { name: "RefCounted", parent: Some("Object"), ref_counted: true },
    NativeClass { name: "Resource", parent: Some("RefCounted"), ref_counted: true },
    NativeClass { name: "Node", parent: Some("Object"), ref_counted: false },
    NativeClass { name: "Node3D", parent: Some("Node"), ref_counted: false },
];

macro_rules! methods {
    ($( $class:literal :: $name:ident => $func:path, )*) => {
        vec![ $( ($class, stringify!($name), Rc::new(|call: &MockCall| unsafe { $func(call) }) as MethodFn), )* ]
    };
}

pub(crate) fn methods() -> Vec<(&'static str, &'static str, MethodFn)> {
    methods! {
        "Object"::get_class => object_get_class,
        "Object"::is_class => object_is_class,

        "RefCounted"::init_ref => ref_counted_init_ref,
        "RefCounted"::reference => ref_counted_reference,
        "RefCounted"::unreference => ref_counted_unreference,
        "RefCounted"::get_reference_count => ref_counted_get_reference_count,

        "Resource"::set_name => set_name,
        "Resource"::get_name => get_name,
        "Resource"::duplicate => resource_duplicate,

        "Node"::set_name => set_name,
        "Node"::get_name => get_name,
        "Node"::add_child => node_add_child,
        "Node"::remove_child => node_remove_child,
        "Node"::get_child_count => node_get_child_count,
        "Node"::get_child => node_get_child,
        "Node"::get_parent => node_get_parent,
        "Node"::queue_free => node_queue_free,
        "Node"::set_process_mode => node_set_process_mode,
        "Node"::get_process_mode => node_get_process_mode,

        "Node3D"::set_position => node3d_set_position,
        "Node3D"::get_position => node3d_get_position,
        "Node3D"::set_transform => node3d_set_transform,
        "Node3D"::get_transform => node3d_get_transform,
        "Node3D"::rotate => node3d_rotate,
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Object

unsafe fn object_get_class(call: &MockCall) {
    let class = with_state(|s| s.dynamic_class(call.addr())).unwrap_or_default();
    call.ret_string(&class);
}

unsafe fn object_is_class(call: &MockCall) {
    let class = call.arg_string(0);
    let result = with_state(|s| s.is_instance_of(call.addr(), &class));
    call.ret(result);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// RefCounted

unsafe fn ref_counted_init_ref(call: &MockCall) {
    let ok = with_state(|s| match s.object_mut(call.addr()) {
        // The first reference is already counted at construction.
        Some(obj) if obj.refcount_init => {
            obj.refcount_init = false;
            true
        }
        Some(obj) => {
            obj.refcount += 1;
            true
        }
        None => false,
    });
    call.ret(ok);
}

unsafe fn ref_counted_reference(call: &MockCall) {
    let ok = with_state(|s| match s.object_mut(call.addr()) {
        Some(obj) => {
            obj.refcount += 1;
            obj.refcount_init = false;
            true
        }
        None => false,
    });
    call.ret(ok);
}

unsafe fn ref_counted_unreference(call: &MockCall) {
    let die = with_state(|s| {
        let Some(obj) = s.object_mut(call.addr()) else {
            return false;
        };
        if let Some(count) = obj.refcount.checked_sub(1) {
            obj.refcount = count;
            return count == 0;
        }

        s.error("unreference() on an object whose reference count is already zero");
        false
    });
    call.ret(die);
}

unsafe fn ref_counted_get_reference_count(call: &MockCall) {
    let count = with_state(|s| s.object(call.addr()).map_or(0, |obj| obj.refcount));
    call.ret(count as i64);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Resource

unsafe fn set_name(call: &MockCall) {
    let name = call.arg_string(0);
    with_state(|s| {
        if let Some(obj) = s.object_mut(call.addr()) {
            obj.name = name;
        }
    });
}

unsafe fn get_name(call: &MockCall) {
    let name = with_state(|s| s.object(call.addr()).map(|obj| obj.name.clone())).unwrap_or_default();
    call.ret_string(&name);
}

unsafe fn resource_duplicate(call: &MockCall) {
    let _subresources = call.arg_bool(0);

    let copy = with_state(|s| {
        let (class, name) = {
            let obj = s.object(call.addr())?;
            (obj.native_class.clone(), obj.name.clone())
        };

        let copy = s.create_object(&class);
        if let Some(obj) = s.object_mut(copy) {
            obj.name = name;
            // Returned with the caller's reference already taken.
            obj.refcount_init = false;
        }
        Some(copy)
    });

    call.ret(copy.unwrap_or(0) as *mut std::ffi::c_void);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Node

unsafe fn node_add_child(call: &MockCall) {
    let parent = call.addr();
    let child = call.arg_object(0) as usize;
    let _force_readable_name = call.arg_bool(1);
    let _internal = call.arg_i64(2);

    let attached = with_state(|s| match s.attach_child(parent, child) {
        Ok(()) => Some((s.subtree_preorder(child), s.subtree_postorder(child))),
        Err(err) => {
            s.error(err);
            None
        }
    });

    if let Some((preorder, postorder)) = attached {
        for node in preorder {
            call_virtual(node, "_enter_tree", VirtualArg::None);
        }
        for node in postorder {
            call_virtual(node, "_ready", VirtualArg::None);
        }
    }
}

unsafe fn node_remove_child(call: &MockCall) {
    let child = call.arg_object(0) as usize;

    let detached = with_state(|s| {
        let postorder = s.subtree_postorder(child);
        match s.detach_child(call.addr(), child) {
            Ok(()) => Some(postorder),
            Err(err) => {
                s.error(err);
                None
            }
        }
    });

    for node in detached.into_iter().flatten() {
        call_virtual(node, "_exit_tree", VirtualArg::None);
    }
}

unsafe fn node_get_child_count(call: &MockCall) {
    let _include_internal = call.arg_bool(0);
    let count = with_state(|s| s.object(call.addr()).map_or(0, |obj| obj.children.len()));
    call.ret(count as i64);
}

unsafe fn node_get_child(call: &MockCall) {
    let index = call.arg_i64(0);
    let _include_internal = call.arg_bool(1);

    let child = with_state(|s| {
        let children = s.object(call.addr()).map(|obj| obj.children.clone()).unwrap_or_default();
        let len = children.len() as i64;
        let resolved = if index < 0 { index + len } else { index };

        if (0..len).contains(&resolved) {
            Some(children[resolved as usize])
        } else {
            s.error(format!("get_child(): index {index} out of bounds (child count {len})"));
            None
        }
    });

    call.ret(child.unwrap_or(0) as *mut std::ffi::c_void);
}

unsafe fn node_get_parent(call: &MockCall) {
    let parent = with_state(|s| s.object(call.addr()).and_then(|obj| obj.parent));
    call.ret(parent.unwrap_or(0) as *mut std::ffi::c_void);
}

unsafe fn node_queue_free(call: &MockCall) {
    with_state(|s| {
        if !s.queued_for_deletion.contains(&call.addr()) {
            s.queued_for_deletion.push(call.addr());
        }
    });
}

unsafe fn node_set_process_mode(call: &MockCall) {
    let mode = call.arg_i64(0);
    with_state(|s| {
        if let Some(obj) = s.object_mut(call.addr()) {
            obj.process_mode = mode;
        }
    });
}

unsafe fn node_get_process_mode(call: &MockCall) {
    let mode = with_state(|s| s.object(call.addr()).map_or(0, |obj| obj.process_mode));
    call.ret(mode);
}

/// Destroys all nodes queued through `queue_free()`.
pub(crate) fn flush_deletion_queue() {
    let queued = with_state(|s| std::mem::take(&mut s.queued_for_deletion));

    for node in queued {
        let alive = with_state(|s| s.live_object(node).is_some());
        if alive {
            destroy_object(node);
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Node3D

fn with_transform<R>(call: &MockCall, f: impl FnOnce(&mut MockTransform) -> R) -> Option<R> {
    with_state(|s| s.object_mut(call.addr()).map(|obj| f(&mut obj.transform)))
}

unsafe fn node3d_set_position(call: &MockCall) {
    let position = call.arg::<[f32; 3]>(0);
    with_transform(call, |t| t.origin = position);
}

unsafe fn node3d_get_position(call: &MockCall) {
    let position = with_transform(call, |t| t.origin).unwrap_or_default();
    call.ret(position);
}

unsafe fn node3d_set_transform(call: &MockCall) {
    let transform = call.arg::<MockTransform>(0);
    with_transform(call, |t| *t = transform);
}

unsafe fn node3d_get_transform(call: &MockCall) {
    let transform = with_transform(call, |t| *t).unwrap_or(MockTransform::IDENTITY);
    call.ret(transform);
}

unsafe fn node3d_rotate(call: &MockCall) {
    let angle = call.arg_f64(1) as f32;
    let Some(axis) = Vec3::from_array(call.arg::<[f32; 3]>(0)).try_normalize() else {
        with_state(|s| s.error("rotate(): axis must not be zero"));
        return;
    };

    with_transform(call, |t| {
        // Rows passed as columns yield the transpose.
        let basis = Mat3::from_cols_array_2d(&t.rows).transpose();
        let rotated = Mat3::from_axis_angle(axis, angle) * basis;
        t.rows = rotated.transpose().to_cols_array_2d();
    });
}
