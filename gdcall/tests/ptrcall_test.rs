/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Calls through call frames and method binds, against the mock engine.

mod common;

use std::f32::consts::FRAC_PI_2;

use gdcall::meta::{ClassName, MethodDecl};
use gdcall::prelude::*;
use gdcall::sys;
use gdcall::sys::GodotFfi;
use gdcall_mock::MockEngine;
use proptest::prelude::*;

use common::{assert_no_engine_errors, bind, checked_config};

const OBJECT: ClassName = ClassName::new("Object\0");

const ECHO_METHODS: [MethodDecl; 4] = [
    MethodDecl::new(OBJECT, "echo_int\0", 1),
    MethodDecl::new(OBJECT, "echo_float\0", 2),
    MethodDecl::new(OBJECT, "echo_bool\0", 3),
    MethodDecl::new(OBJECT, "echo_transform\0", 4),
];

/// Binding that additionally knows `Object::echo_*` methods, which return their first argument.
fn bind_with_echo(engine: &MockEngine) -> &'static sys::Binding {
    engine.stub_method("Object", "echo_int", |call| unsafe { call.ret(call.arg_i64(0)) });
    engine.stub_method("Object", "echo_float", |call| unsafe { call.ret(call.arg_f64(0)) });
    engine.stub_method("Object", "echo_bool", |call| unsafe { call.ret(call.arg_bool(0)) });
    engine.stub_method("Object", "echo_transform", |call| unsafe {
        call.ret(call.arg::<Transform3D>(0))
    });

    let mut decls = gdcall::classes::method_decls();
    decls.extend(ECHO_METHODS);

    let binding = unsafe { sys::Binding::new(engine.interface(), engine.library(), &decls, checked_config()) }
        .unwrap_or_else(|err| panic!("echo methods are stubbed: {err}"));
    binding.leak()
}

fn echo<T: GodotFfi>(receiver: &Gd<Node>, method: &str, value: T) -> T {
    let binding = receiver.binding();
    let bind = binding.bind_for("Object", method);

    let mut frame = sys::CallFrame::new(binding);
    frame.arg(value);
    unsafe { frame.ptrcall::<T>(bind, receiver.handle().obj_sys()) }
}

#[test]
fn stubbed_get_name_uses_one_frame() {
    let engine = MockEngine::new();
    engine.stub_method("Node", "get_name", |call| unsafe { call.ret_string("Player") });
    let binding = bind(&engine);

    let node = Node::new_alloc(binding);
    let before = sys::frame_stats();

    let name = node.get_name();

    let delta = sys::frame_stats().since(before);
    assert_eq!(name, "Player");
    assert_eq!(delta.acquired, 1);
    assert_eq!(delta.released, 1);
    assert_eq!(delta.spilled, 0);
    assert_eq!(sys::frame_stats().live(), 0);
    assert_eq!(engine.call_count("Node", "get_name"), 1);

    drop(name);
    node.free();

    assert_eq!(engine.stats().live_strings, 0);
    assert_no_engine_errors(&engine);
}

#[test]
fn string_arguments_are_released_after_the_call() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node::new_alloc(binding);
    node.set_name("Enemy");

    assert_eq!(engine.name_of(node.handle().obj_sys()).as_deref(), Some("Enemy"));
    assert_eq!(node.get_name(), "Enemy");
    assert_eq!(engine.stats().live_strings, 0);
}

#[test]
fn large_values_spill_and_are_freed() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node3D::new_alloc(binding);
    let transform = Transform3D::new(
        Basis::from_axis_angle(Vector3::UP, 0.5),
        Vector3::new(1.0, 2.0, 3.0),
    );

    let before = engine.stats();
    let frames_before = sys::frame_stats();

    node.set_transform(transform);
    let result = node.get_transform();

    let after = engine.stats();
    assert_eq!(result, transform);
    assert_eq!(after.allocs - before.allocs, 2, "argument of set, return slot of get");
    assert_eq!(after.frees - before.frees, 2);
    assert_eq!(sys::frame_stats().since(frames_before).spilled, 2);

    node.free();
    assert_no_engine_errors(&engine);
}

#[test]
fn small_values_stay_inline() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node3D::new_alloc(binding);
    let before = engine.stats();

    node.set_position(Vector3::new(4.0, -1.0, 0.5));
    assert_eq!(node.get_position(), Vector3::new(4.0, -1.0, 0.5));

    assert_eq!(engine.stats().allocs, before.allocs);
    node.free();
}

#[test]
fn rotate_keeps_position() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node3D::new_alloc(binding);
    node.set_position(Vector3::new(1.0, 0.0, 0.0));
    node.rotate(Vector3::UP, FRAC_PI_2);

    let transform = node.get_transform();
    assert!(transform.basis.is_equal_approx(&Basis::from_axis_angle(Vector3::UP, FRAC_PI_2)));
    assert_eq!(transform.origin, Vector3::new(1.0, 0.0, 0.0));

    node.free();
    assert_no_engine_errors(&engine);
}

#[test]
fn enum_arguments_travel_as_ordinals() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let node = Node::new_alloc(binding);
    assert_eq!(node.get_process_mode(), ProcessMode::Inherit);

    node.set_process_mode(ProcessMode::WhenPaused);
    assert_eq!(node.get_process_mode(), ProcessMode::WhenPaused);

    node.free();
}

#[test]
fn bind_lookup_is_stable() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    let first = binding.bind_for("Node", "get_name");
    let second = binding.bind_for("Node", "get_name");

    assert_eq!(first, second);
    assert_eq!(binding.method_table().try_bind_for("Node", "get_name"), Some(first));
    assert_ne!(first, binding.bind_for("Resource", "get_name"));
    assert_eq!(binding.method_table().len(), gdcall::classes::method_decls().len());
    assert_eq!(binding.method_table().try_bind_for("Node", "get_node"), None);
}

#[test]
#[should_panic(expected = "method bind Node::get_node was not declared")]
fn undeclared_bind_panics() {
    let engine = MockEngine::new();
    let binding = bind(&engine);

    binding.bind_for("Node", "get_node");
}

#[test]
fn method_of_unrelated_class_is_rejected_by_strict_checks() {
    let engine = MockEngine::new();
    let config = gdcall::init::BindingConfig {
        safeguards: gdcall::init::Safeguards::Strict,
        ..checked_config()
    };
    let binding = unsafe { gdcall::init::bind_engine(engine.interface(), engine.library(), config) }
        .unwrap_or_else(|err| panic!("{err}"));

    let resource = Resource::new_gd(binding);
    let object: Gd<Object> = resource.upcast();

    // Object claims to be a Node; the class tag check catches it before the call.
    let node = unsafe { <Node as EngineClass>::from_handle(*object.handle()) };
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| node.get_child_count()));

    assert!(result.is_err());
    assert_eq!(engine.call_count("Node", "get_child_count"), 0);
    assert_eq!(sys::frame_stats().live(), 0);
}

proptest! {
    #[test]
    fn ints_round_trip(value in any::<i64>()) {
        let engine = MockEngine::new();
        let node = Node::new_alloc(bind_with_echo(&engine));

        prop_assert_eq!(echo(&node, "echo_int", value), value);
        node.free();
    }

    #[test]
    fn floats_and_bools_round_trip(value in -1.0e12f64..1.0e12, flag in any::<bool>()) {
        let engine = MockEngine::new();
        let node = Node::new_alloc(bind_with_echo(&engine));

        prop_assert_eq!(echo(&node, "echo_float", value), value);
        prop_assert_eq!(echo(&node, "echo_bool", flag), flag);
        node.free();
    }

    #[test]
    fn spilled_values_round_trip_without_leaks(
        rows in prop::array::uniform9(-100.0f32..100.0),
        origin in prop::array::uniform3(-100.0f32..100.0),
    ) {
        let engine = MockEngine::new();
        let node = Node::new_alloc(bind_with_echo(&engine));

        let transform = Transform3D::new(
            Basis::from_rows(
                Vector3::new(rows[0], rows[1], rows[2]),
                Vector3::new(rows[3], rows[4], rows[5]),
                Vector3::new(rows[6], rows[7], rows[8]),
            ),
            Vector3::new(origin[0], origin[1], origin[2]),
        );

        prop_assert_eq!(echo(&node, "echo_transform", transform), transform);

        let stats = engine.stats();
        prop_assert_eq!(stats.allocs, 2);
        prop_assert_eq!(stats.allocs, stats.frees);
        node.free();
    }
}
