/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::{is_equal_approx, CMP_EPSILON};
use crate::sys;

/// Vector used for 2D math using floating point coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector2 {
    /// The vector's X component.
    pub x: f32,
    /// The vector's Y component.
    pub y: f32,
}

impl Vector2 {
    /// Vector with all components set to `0.0`.
    pub const ZERO: Self = Self::splat(0.0);

    /// Vector with all components set to `1.0`.
    pub const ONE: Self = Self::splat(1.0);

    /// Unit vector in -Y direction, i.e. up in 2D screen coordinates.
    pub const UP: Self = Self::new(0.0, -1.0);

    /// Unit vector in +X direction.
    pub const RIGHT: Self = Self::new(1.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns a new `Vector2` with all components set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v)
    }

    fn from_glam(v: glam::Vec2) -> Self {
        Self::new(v.x, v.y)
    }

    fn to_glam(self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }

    /// Angle of the vector relative to the +X axis, in radians.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn dot(self, with: Self) -> f32 {
        self.to_glam().dot(with.to_glam())
    }

    pub fn length(self) -> f32 {
        self.to_glam().length()
    }

    pub fn length_squared(self) -> f32 {
        self.to_glam().length_squared()
    }

    /// Returns the vector scaled to unit length, or zero if the vector has no length.
    pub fn normalized(self) -> Self {
        Self::from_glam(self.to_glam().normalize_or_zero())
    }

    pub fn distance_to(self, to: Self) -> f32 {
        (to - self).length()
    }

    pub fn lerp(self, to: Self, weight: f32) -> Self {
        Self::from_glam(self.to_glam().lerp(to.to_glam(), weight))
    }

    /// Rotates the vector by `angle` radians, counter-clockwise in a Y-up system.
    pub fn rotated(self, angle: f32) -> Self {
        Self::from_glam(glam::Mat2::from_angle(angle) * self.to_glam())
    }

    /// Returns `true` if this vector and `to` are approximately equal, by running
    /// [`is_equal_approx`] on each component.
    pub fn is_equal_approx(self, to: Self) -> bool {
        is_equal_approx(self.x, to.x) && is_equal_approx(self.y, to.y)
    }

    pub fn is_normalized(self) -> bool {
        is_equal_approx(self.length_squared(), 1.0)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl_vector_operators!(Vector2, f32, (x, y));
impl_builtin_as_self!(Vector2);

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Vector used for 3D math using floating point coordinates.
///
/// 3-element structure that can be used to represent positions in 3D space or any other triple of
/// numeric values. Uses 32-bit components, like the engine in its default single-precision build.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector3 {
    /// The vector's X component.
    pub x: f32,
    /// The vector's Y component.
    pub y: f32,
    /// The vector's Z component.
    pub z: f32,
}

impl Vector3 {
    /// Vector with all components set to `0.0`.
    pub const ZERO: Self = Self::splat(0.0);

    /// Vector with all components set to `1.0`.
    pub const ONE: Self = Self::splat(1.0);

    /// Unit vector in -X direction. Can be interpreted as left in an untransformed 3D world.
    pub const LEFT: Self = Self::new(-1.0, 0.0, 0.0);

    /// Unit vector in +X direction. Can be interpreted as right in an untransformed 3D world.
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit vector in +Y direction. Typically interpreted as up in a 3D world.
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit vector in -Y direction. Typically interpreted as down in a 3D world.
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);

    /// Unit vector in -Z direction. Can be interpreted as "into the screen" in an untransformed 3D world.
    pub const FORWARD: Self = Self::new(0.0, 0.0, -1.0);

    /// Unit vector in +Z direction. Can be interpreted as "out of the screen" in an untransformed 3D world.
    pub const BACK: Self = Self::new(0.0, 0.0, 1.0);

    /// Returns a `Vector3` with the given components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns a new `Vector3` with all components set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub(crate) fn from_glam(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub(crate) fn to_glam(self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.y, self.z)
    }

    pub fn angle_to(self, to: Self) -> f32 {
        self.to_glam().angle_between(to.to_glam())
    }

    pub fn cross(self, with: Self) -> Self {
        Self::from_glam(self.to_glam().cross(with.to_glam()))
    }

    pub fn dot(self, with: Self) -> f32 {
        self.to_glam().dot(with.to_glam())
    }

    pub fn length(self) -> f32 {
        self.to_glam().length()
    }

    pub fn length_squared(self) -> f32 {
        self.to_glam().length_squared()
    }

    /// Returns the vector scaled to unit length, or zero if the vector has no length.
    pub fn normalized(self) -> Self {
        Self::from_glam(self.to_glam().normalize_or_zero())
    }

    pub fn distance_to(self, to: Self) -> f32 {
        (to - self).length()
    }

    pub fn lerp(self, to: Self, weight: f32) -> Self {
        Self::from_glam(self.to_glam().lerp(to.to_glam(), weight))
    }

    /// Rotates this vector around `axis` by `angle` radians. `axis` must be normalized.
    pub fn rotated(self, axis: Self, angle: f32) -> Self {
        Self::from_glam(glam::Quat::from_axis_angle(axis.to_glam(), angle) * self.to_glam())
    }

    /// Returns `true` if this vector and `to` are approximately equal, by running
    /// [`is_equal_approx`] on each component.
    pub fn is_equal_approx(self, to: Self) -> bool {
        is_equal_approx(self.x, to.x) && is_equal_approx(self.y, to.y) && is_equal_approx(self.z, to.z)
    }

    pub fn is_normalized(self) -> bool {
        (self.length_squared() - 1.0).abs() < CMP_EPSILON * 10.0
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl_vector_operators!(Vector3, f32, (x, y, z));
impl_builtin_as_self!(Vector3);

sys::static_assert_eq_size!(Vector2, [f32; 2]);
sys::static_assert_eq_size!(Vector3, [f32; 3]);
