/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::{godot_error, sys};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Panic handling

pub(crate) fn extract_panic_message(err: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        format!("(panic of type ID {:?})", err.type_id())
    }
}

fn format_panic_message(msg: String) -> String {
    // If the message contains newlines, print all of the lines after a line break, and indent them.
    let lbegin = "\n  ";
    let indented = msg.replace('\n', lbegin);

    if indented.len() != msg.len() {
        format!("[panic]{lbegin}{indented}")
    } else {
        format!("[panic]  {msg}")
    }
}

/// Executes `code`. If it panics, the panic is caught and reported to the engine, and `Err` with the message is returned.
///
/// Used at every boundary where the engine calls into Rust: unwinding across `extern "C"` is not allowed.
pub fn handle_panic<E, F, R, S>(binding: &'static sys::Binding, error_context: E, code: F) -> Result<R, String>
where
    E: FnOnce() -> S,
    F: FnOnce() -> R,
    S: Display,
{
    match catch_unwind(AssertUnwindSafe(code)) {
        Ok(result) => Ok(result),
        Err(err) => {
            let msg = format_panic_message(extract_panic_message(err));
            godot_error!(binding, "Rust function panicked.\n  Context: {}\n  {}", error_context(), msg);
            Err(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_panic_message() {
        assert_eq!(format_panic_message("boom".to_string()), "[panic]  boom");
    }

    #[test]
    fn multi_line_panic_message_is_indented() {
        assert_eq!(
            format_panic_message("first\nsecond".to_string()),
            "[panic]\n  first\n  second"
        );
    }

    #[test]
    fn payload_types() {
        assert_eq!(extract_panic_message(Box::new("static")), "static");
        assert_eq!(extract_panic_message(Box::new(String::from("owned"))), "owned");
        assert!(extract_panic_message(Box::new(17u8)).starts_with("(panic of type ID"));
    }
}
