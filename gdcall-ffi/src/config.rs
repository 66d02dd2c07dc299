/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// How much validation is performed around each engine call.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Safeguards {
    /// Only the checks that cannot be skipped: returned objects whose instance ID must be asserted.
    Disengaged,

    /// Additionally verifies before every call that the receiver is still alive.
    Balanced,

    /// Additionally verifies the dynamic class of the receiver through its class tag.
    Strict,
}

impl Safeguards {
    /// Level selected through the `debug-checks-*` Cargo features.
    ///
    /// Without an explicit feature, debug builds use [`Balanced`][Self::Balanced] and release builds
    /// [`Disengaged`][Self::Disengaged].
    pub const fn from_features() -> Self {
        if cfg!(feature = "debug-checks-paranoid") {
            Self::Strict
        } else if cfg!(feature = "debug-checks-fast-unsafe") {
            Self::Disengaged
        } else if cfg!(feature = "debug-checks-balanced") || cfg!(debug_assertions) {
            Self::Balanced
        } else {
            Self::Disengaged
        }
    }

    pub fn checks_liveness(self) -> bool {
        self >= Self::Balanced
    }

    pub fn checks_class(self) -> bool {
        self >= Self::Strict
    }
}

impl Default for Safeguards {
    fn default() -> Self {
        Self::from_features()
    }
}

/// Runtime configuration of a [`Binding`][crate::Binding].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BindingConfig {
    pub safeguards: Safeguards,

    /// Oldest engine (major, minor) the library accepts.
    pub min_godot_version: (u32, u32),
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            safeguards: Safeguards::default(),
            min_godot_version: (4, 1),
        }
    }
}

/// Engine version as reported by the interface.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct GodotVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GodotVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    pub fn is_at_least(self, (major, minor): (u32, u32)) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

impl fmt::Display for GodotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
