/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;
use std::fmt;

/// Name of an engine or extension class, usable both from Rust and across the C ABI.
///
/// Constructed from a `'static` NUL-terminated literal, e.g. `ClassName::new("Node3D\0")`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClassName {
    nul_terminated: &'static str,
}

impl ClassName {
    /// # Panics
    /// If `nul_terminated` does not end in `\0`. In constant context this is a compile error.
    pub const fn new(nul_terminated: &'static str) -> Self {
        let bytes = nul_terminated.as_bytes();
        assert!(
            bytes.len() > 1 && bytes[bytes.len() - 1] == 0,
            "class name must be non-empty and NUL-terminated"
        );

        Self { nul_terminated }
    }

    pub fn as_str(&self) -> &'static str {
        &self.nul_terminated[..self.nul_terminated.len() - 1]
    }

    /// Pointer to the NUL-terminated name, valid for the whole program.
    pub fn as_sys(&self) -> *const c_char {
        crate::c_str(self.nul_terminated.as_bytes())
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassName({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE: ClassName = ClassName::new("Node\0");

    #[test]
    fn strips_terminator() {
        assert_eq!(NODE.as_str(), "Node");
        assert_eq!(NODE.to_string(), "Node");
    }

    #[test]
    fn sys_pointer_is_nul_terminated() {
        let c = unsafe { std::ffi::CStr::from_ptr(NODE.as_sys()) };
        assert_eq!(c.to_bytes(), b"Node");
    }

    #[test]
    #[should_panic(expected = "NUL-terminated")]
    fn rejects_missing_terminator() {
        let name = String::from("Node").leak();
        ClassName::new(name);
    }
}
