/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Printing messages to the engine's error and warning output.
//!
//! All macros take the [`Binding`][crate::sys::Binding] of the engine to print to as their first argument.

/// Pushes a warning message to the engine's output, with file and line of the call site.
///
/// ```ignore
/// godot_warn!(binding, "node {} has no parent", node.instance_id());
/// ```
#[macro_export]
macro_rules! godot_warn {
    ($binding:expr, $fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::log::print_to_engine(
            $binding,
            $crate::log::Severity::Warning,
            &format!($fmt $(, $args)*),
            concat!(file!(), "\0"),
            line!(),
        )
    };
}

/// Pushes an error message to the engine's output, with file and line of the call site.
#[macro_export]
macro_rules! godot_error {
    ($binding:expr, $fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::log::print_to_engine(
            $binding,
            $crate::log::Severity::Error,
            &format!($fmt $(, $args)*),
            concat!(file!(), "\0"),
            line!(),
        )
    };
}

pub use crate::{godot_error, godot_warn};

use crate::sys;
use std::ffi::c_char;

#[doc(hidden)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Severity {
    Warning,
    Error,
}

#[doc(hidden)]
pub fn print_to_engine(binding: &sys::Binding, severity: Severity, message: &str, file: &'static str, line: u32) {
    print_with_interface(binding.interface(), severity, message, file, line);
}

/// Prints through a raw interface. Used before a binding exists, e.g. to report why initialization failed.
///
/// Falls back to stderr if the interface has no matching print function.
#[doc(hidden)]
pub fn print_with_interface(
    interface: &sys::GDExtensionInterface,
    severity: Severity,
    message: &str,
    file: &'static str,
    line: u32,
) {
    let print_fn = match severity {
        Severity::Warning => interface.print_warning,
        Severity::Error => interface.print_error,
    };

    let Some(print_fn) = print_fn else {
        eprintln!("[{severity:?}] {message}");
        return;
    };

    // Interior NUL bytes would truncate the message.
    let msg = format!("{}\0", message.replace('\0', "\\0"));
    let file = if file.ends_with('\0') { file } else { "<unknown>\0" };

    unsafe {
        print_fn(
            msg.as_ptr() as *const c_char,
            "<function unset>\0".as_ptr() as *const c_char,
            file.as_ptr() as *const c_char,
            line as i32,
        );
    }
}
