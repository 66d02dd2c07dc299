/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Ownership, reference counting and casts of object handles.

mod common;

use std::panic::{catch_unwind, AssertUnwindSafe};

use gdcall::obj::Ownership;
use gdcall::prelude::*;
use gdcall::sys;
use gdcall_mock::MockEngine;
use proptest::prelude::*;

use common::{assert_no_engine_errors, bind};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Manually managed objects

#[test]
fn owned_node_is_destroyed_on_drop() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let ptr = {
        let node = Node::new_alloc(binding);
        assert_eq!(node.ownership(), Ownership::Owned);
        assert!(!node.instance_id().is_ref_counted());
        node.handle().obj_sys()
    };

    assert!(!engine.is_alive(ptr));
    assert_eq!(engine.stats().live_objects(), 0);
    assert_no_engine_errors(&engine);
}

#[test]
fn clone_of_manual_object_is_borrowed() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node::new_alloc(binding);
    let ptr = node.handle().obj_sys();

    let view = node.clone();
    assert_eq!(view.ownership(), Ownership::Borrowed);
    assert_eq!(view, node);

    drop(view);
    assert!(engine.is_alive(ptr));

    drop(node);
    assert!(!engine.is_alive(ptr));
    assert_eq!(engine.stats().double_frees, 0);
}

#[test]
fn child_is_owned_by_parent_after_transfer() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let parent = Node::new_alloc(binding);
    let child = Node3D::new_alloc(binding);
    let child_ptr = child.handle().obj_sys();

    parent.add_child(child);
    assert_eq!(engine.parent_of(child_ptr), Some(parent.handle().obj_sys()));
    assert_eq!(parent.get_child_count(), 1);

    let borrowed = parent.get_child(0).expect("child was added");
    assert_eq!(borrowed.ownership(), Ownership::Borrowed);
    assert_eq!(borrowed.handle().obj_sys(), child_ptr);
    assert_eq!(borrowed.get_parent().map(|p| p.instance_id()), Some(parent.instance_id()));
    drop(borrowed);
    assert!(engine.is_alive(child_ptr));

    let stale = parent.get_child(-1).expect("negative index counts from the end");
    parent.free();

    assert!(!engine.is_alive(child_ptr));
    assert!(!stale.is_instance_valid());
    assert_eq!(engine.stats().double_frees, 0);
    assert_no_engine_errors(&engine);
}

#[test]
fn call_on_destroyed_object_panics() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let parent = Node::new_alloc(binding);
    parent.add_child(Node::new_alloc(binding));
    let stale = parent.get_child(0).expect("child was added");
    parent.free();

    let frames_before = sys::frame_stats();
    let result = catch_unwind(AssertUnwindSafe(|| stale.get_name()));

    let message = result.expect_err("call must not reach the engine");
    let message = message.downcast_ref::<String>().cloned().unwrap_or_default();
    assert!(message.contains("Node::get_name()"), "{message}");
    assert!(message.contains("has been destroyed"), "{message}");

    assert_eq!(sys::frame_stats().since(frames_before).released, 1);
    assert_eq!(engine.stats().calls_on_dead, 0);
}

#[test]
fn out_of_bounds_child_is_none() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node::new_alloc(binding);
    assert!(node.get_child(0).is_none());
    assert!(node.get_parent().is_none());
    assert!(node.get_children().is_empty());
    node.free();
}

#[test]
fn removed_child_becomes_orphan() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let parent = Node::new_alloc(binding);
    parent.add_child(Node::new_alloc(binding));
    let child = parent.get_child(0).expect("child was added");

    parent.remove_child(&child);
    assert_eq!(parent.get_child_count(), 0);
    assert!(child.get_parent().is_none());

    parent.free();
    assert!(child.is_instance_valid());
    child.free();
    assert_eq!(engine.stats().live_objects(), 0);
}

#[test]
#[should_panic(expected = "has been destroyed")]
fn freeing_twice_panics() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node::new_alloc(binding);
    let second = node.clone();

    node.free();
    second.free();
}

#[test]
fn only_owning_handle_can_transfer_to_engine() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let parent = Node::new_alloc(binding);
    let child = Node::new_alloc(binding);
    let child_ptr = child.handle().obj_sys();

    let view = child.clone();
    let result = catch_unwind(AssertUnwindSafe(|| parent.add_child(view)));

    let message = result.expect_err("borrowed handle must not transfer ownership");
    let message = message.downcast_ref::<String>().cloned().unwrap_or_default();
    assert!(message.contains("is not owned by this handle"), "{message}");
    assert_eq!(parent.get_child_count(), 0);
    assert!(engine.is_alive(child_ptr));

    // The owner can still transfer; afterwards the parent alone destroys the child.
    parent.add_child(child);
    assert_eq!(engine.parent_of(child_ptr), Some(parent.handle().obj_sys()));

    parent.free();
    assert!(!engine.is_alive(child_ptr));
    assert_eq!(engine.stats().double_frees, 0);
    assert_no_engine_errors(&engine);
}

#[test]
fn borrowed_child_handle_cannot_be_reparented() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let first = Node::new_alloc(binding);
    let second = Node::new_alloc(binding);
    first.add_child(Node::new_alloc(binding));

    let child = first.get_child(0).expect("child was added");
    let result = catch_unwind(AssertUnwindSafe(|| second.add_child(child)));

    assert!(result.is_err());
    assert_eq!(first.get_child_count(), 1);
    assert_eq!(second.get_child_count(), 0);

    first.free();
    second.free();
    assert_eq!(engine.stats().live_objects(), 0);
    assert_no_engine_errors(&engine);
}

#[test]
fn child_stays_with_caller_when_parent_is_dead() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let parent = Node::new_alloc(binding);
    let stale = parent.clone();
    parent.free();

    let child = Node::new_alloc(binding);
    let child_ptr = child.handle().obj_sys();
    let result = catch_unwind(AssertUnwindSafe(|| stale.add_child(child)));

    let message = result.expect_err("call on a destroyed parent must panic");
    let message = message.downcast_ref::<String>().cloned().unwrap_or_default();
    assert!(message.contains("Node::add_child()"), "{message}");

    // Ownership never left the child's Gd, which destroyed it while unwinding.
    assert!(!engine.is_alive(child_ptr));
    assert_eq!(engine.stats().live_objects(), 0);
    assert_eq!(engine.stats().calls_on_dead, 0);
}

#[test]
fn manual_object_freed_through_object_handle() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let object: Gd<Object> = Node::new_alloc(binding).upcast();
    let ptr = object.handle().obj_sys();

    object.free();
    assert!(!engine.is_alive(ptr));
    assert_eq!(engine.stats().double_frees, 0);
    assert_no_engine_errors(&engine);
}

#[test]
#[should_panic(expected = "which is ref-counted")]
fn freeing_ref_counted_object_panics() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let object: Gd<Object> = Resource::new_gd(binding).upcast();
    object.free();
}

#[test]
fn queued_node_is_destroyed_at_end_of_frame() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let parent = Node::new_alloc(binding);
    parent.add_child(Node::new_alloc(binding));
    let child = parent.get_child(0).expect("child was added");
    let child_ptr = child.handle().obj_sys();

    child.queue_free();
    assert!(engine.is_alive(child_ptr));

    engine.process_frame(0.016);
    assert!(!engine.is_alive(child_ptr));
    assert_eq!(parent.get_child_count(), 0);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Reference-counted objects

#[test]
fn ref_counted_object_lives_while_referenced() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let resource = Resource::new_gd(binding);
    let ptr = resource.handle().obj_sys();
    assert!(resource.instance_id().is_ref_counted());
    assert_eq!(resource.get_reference_count(), 1);

    let shared = resource.clone();
    assert_eq!(shared.ownership(), Ownership::Shared);
    assert_eq!(engine.refcount(ptr), Some(2));

    drop(resource);
    assert_eq!(engine.refcount(ptr), Some(1));
    assert!(engine.is_alive(ptr));

    drop(shared);
    assert!(!engine.is_alive(ptr));
    assert_no_engine_errors(&engine);
}

#[test]
fn duplicate_returns_owned_reference() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let original = Resource::new_gd(binding);
    original.set_name("texture");

    let copy = original.duplicate(false);
    assert_ne!(copy, original);
    assert_eq!(copy.ownership(), Ownership::Owned);
    assert_eq!(copy.get_reference_count(), 1);
    assert_eq!(copy.get_name(), "texture");

    let copy_ptr = copy.handle().obj_sys();
    drop(copy);
    assert!(!engine.is_alive(copy_ptr));
    assert_no_engine_errors(&engine);
}

#[test]
fn ref_counted_seen_as_object_keeps_counting() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let resource = Resource::new_gd(binding);
    let ptr = resource.handle().obj_sys();

    let object: Gd<Object> = resource.clone().upcast();
    assert_eq!(object.ownership(), Ownership::Shared);
    assert_eq!(engine.refcount(ptr), Some(2));

    let object_copy = object.clone();
    assert_eq!(engine.refcount(ptr), Some(3));

    drop(object);
    drop(object_copy);
    assert_eq!(engine.refcount(ptr), Some(1));
}

#[derive(Clone, Debug)]
enum RefOp {
    Clone(usize),
    Drop(usize),
    Upcast(usize),
}

fn ref_ops() -> impl Strategy<Value = Vec<RefOp>> {
    let op = prop_oneof![
        (0..8usize).prop_map(RefOp::Clone),
        (0..8usize).prop_map(RefOp::Drop),
        (0..8usize).prop_map(RefOp::Upcast),
    ];
    prop::collection::vec(op, 0..48)
}

proptest! {
    #[test]
    fn refcount_equals_live_handles(ops in ref_ops()) {
        let engine = MockEngine::new();
        let binding = bind(&engine);

        let resource = Resource::new_gd(binding);
        let ptr = resource.handle().obj_sys();
        let mut resources = vec![resource];
        let mut objects: Vec<Gd<Object>> = Vec::new();

        for op in ops {
            match op {
                RefOp::Clone(i) if !resources.is_empty() => {
                    let copy = resources[i % resources.len()].clone();
                    resources.push(copy);
                }
                RefOp::Drop(i) if resources.len() > 1 => {
                    resources.swap_remove(i % resources.len());
                }
                RefOp::Drop(i) if !objects.is_empty() => {
                    objects.swap_remove(i % objects.len());
                }
                RefOp::Upcast(i) if !resources.is_empty() => {
                    let copy = resources[i % resources.len()].clone();
                    objects.push(copy.upcast());
                }
                _ => {}
            }

            let live = (resources.len() + objects.len()) as u32;
            prop_assert_eq!(engine.refcount(ptr), Some(live));
        }

        drop(objects);
        drop(resources);
        prop_assert!(!engine.is_alive(ptr));
        prop_assert!(engine.errors().is_empty());
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Casts and lookup

#[test]
fn upcast_keeps_pointer_and_id() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node3d = Node3D::new_alloc(binding);
    let ptr = node3d.handle().obj_sys();
    let id = node3d.instance_id();
    let calls_before = engine.stats().method_calls;

    let as_object: &Object = node3d.upcast_ref();
    assert_eq!(as_object.handle().obj_sys(), ptr);

    let node: Gd<Node> = node3d.upcast();
    assert_eq!(node.handle().obj_sys(), ptr);
    assert_eq!(node.instance_id(), id);
    assert_eq!(node.ownership(), Ownership::Owned);

    let object: Gd<Object> = node.upcast();
    assert_eq!(object.handle().obj_sys(), ptr);
    assert_eq!(object.instance_id(), id);
    assert_eq!(engine.stats().method_calls, calls_before);

    let back = object.cast::<Node3D>();
    assert_eq!(back.handle().obj_sys(), ptr);
    assert_eq!(back.get_class(), "Node3D");
    back.free();
}

#[test]
fn failed_downcast_returns_original() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node: Gd<Node> = Node::new_alloc(binding);
    let id = node.instance_id();

    let node = node.try_cast::<Node3D>().expect_err("plain Node is no Node3D");
    assert_eq!(node.instance_id(), id);
    assert_eq!(node.ownership(), Ownership::Owned);
    assert!(node.is_class("Object"));
    assert!(!node.is_class("Resource"));
    node.free();
}

#[test]
fn lookup_by_instance_id_checks_class() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node::new_alloc(binding);
    let id = node.instance_id();

    let found = Gd::<Node>::try_from_instance_id(binding, id).expect("node is alive");
    assert_eq!(found, node);
    assert_eq!(found.ownership(), Ownership::Borrowed);

    assert!(Gd::<Node3D>::try_from_instance_id(binding, id).is_none());
    assert!(Gd::<Object>::try_from_instance_id(binding, id).is_some());

    drop(found);
    node.free();
    assert!(Gd::<Node>::try_from_instance_id(binding, id).is_none());
}

#[test]
fn display_names_class_and_id() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node3D::new_alloc(binding);
    let id = node.instance_id();

    assert_eq!(node.to_string(), format!("<Node3D#{id}>"));
    node.free();
}
