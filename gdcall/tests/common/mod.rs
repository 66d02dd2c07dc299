/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#![allow(dead_code)] // Not every test binary uses every helper.

use gdcall::init::{bind_engine, BindingConfig, Safeguards};
use gdcall::sys;
use gdcall_mock::MockEngine;

/// Config with liveness checks, independent of build profile and features.
pub fn checked_config() -> BindingConfig {
    BindingConfig {
        safeguards: Safeguards::Balanced,
        ..BindingConfig::default()
    }
}

/// Binds to `engine` with all engine classes of the crate.
pub fn bind(engine: &MockEngine) -> &'static sys::Binding {
    unsafe { bind_engine(engine.interface(), engine.library(), checked_config()) }
        .unwrap_or_else(|err| panic!("mock engine must provide every declared method: {err}"))
}

/// Asserts that the engine did not report any error so far.
pub fn assert_no_engine_errors(engine: &MockEngine) {
    let errors = engine.errors();
    assert!(errors.is_empty(), "engine reported errors: {errors:#?}");
}
