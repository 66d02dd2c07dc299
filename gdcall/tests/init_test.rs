/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Binding to the engine: interface validation and method bind resolution.

mod common;

use gdcall::init::{bind_engine, InitError};
use gdcall::sys::GodotVersion;
use gdcall_mock::MockEngine;

use common::checked_config;

#[test]
fn null_interface_is_rejected() {
    let engine = MockEngine::new();
    let result = unsafe { bind_engine(std::ptr::null(), engine.library(), checked_config()) };

    assert_eq!(result.map(|_| ()), Err(InitError::NullInterface));
}

#[test]
fn missing_interface_function_is_named() {
    let engine = MockEngine::new();
    let mut interface = engine.interface_copy();
    interface.object_cast_to = None;

    let result = unsafe { bind_engine(&interface, engine.library(), checked_config()) };

    assert_eq!(result.map(|_| ()), Err(InitError::MissingInterfaceFn("object_cast_to")));
}

#[test]
fn missing_method_bind_fails_binding() {
    let engine = MockEngine::new();
    engine.remove_method("Node", "get_name");

    let err = unsafe { bind_engine(engine.interface(), engine.library(), checked_config()) }
        .map(|_| ())
        .expect_err("Node::get_name is unavailable");

    assert!(
        matches!(err, InitError::MissingMethodBind { class: "Node", method: "get_name", .. }),
        "{err:?}"
    );
    assert!(err.to_string().contains("Node::get_name"));
}

#[test]
fn other_class_with_same_method_name_is_unaffected() {
    let engine = MockEngine::new();
    engine.remove_method("Resource", "get_name");

    let err = unsafe { bind_engine(engine.interface(), engine.library(), checked_config()) }
        .map(|_| ())
        .expect_err("Resource::get_name is unavailable");

    assert!(matches!(err, InitError::MissingMethodBind { class: "Resource", .. }), "{err:?}");
}

#[test]
fn old_engine_is_rejected() {
    let engine = MockEngine::with_version(4, 0, 2);
    let result = unsafe { bind_engine(engine.interface(), engine.library(), checked_config()) };

    assert_eq!(
        result.map(|_| ()),
        Err(InitError::IncompatibleVersion {
            required: (4, 1),
            actual: GodotVersion::new(4, 0, 2),
        })
    );
}

#[test]
fn binding_reports_engine_version() {
    let engine = MockEngine::with_version(4, 2, 1);
    let binding = unsafe { bind_engine(engine.interface(), engine.library(), checked_config()) }
        .unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(binding.version(), GodotVersion::new(4, 2, 1));
    assert_eq!(binding.library(), engine.library());
    assert_eq!(binding.config(), &checked_config());
    assert!(!binding.method_table().is_empty());
}
