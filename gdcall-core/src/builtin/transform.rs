/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::ops::Mul;

use crate::builtin::Vector3;
use crate::sys;

/// A 3x3 matrix, typically used as an orthogonal basis for [`Transform3D`].
///
/// Stored row-major, as the engine does: `rows[1].x` is the element in the second row, first column. The basis
/// vectors (the axes) are the columns.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Basis {
    pub rows: [Vector3; 3],
}

impl Basis {
    /// The identity basis, with no rotation or scaling applied.
    pub const IDENTITY: Self = Self::from_diagonal(1.0, 1.0, 1.0);

    /// The basis that will flip something along the X axis when used in a transformation.
    pub const FLIP_X: Self = Self::from_diagonal(-1.0, 1.0, 1.0);

    pub const fn from_rows(x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self { rows: [x, y, z] }
    }

    pub const fn from_diagonal(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows(
            Vector3::new(x, 0.0, 0.0),
            Vector3::new(0.0, y, 0.0),
            Vector3::new(0.0, 0.0, z),
        )
    }

    /// Rotation of `angle` radians around `axis`, which must be normalized.
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        Self::from_glam(glam::Mat3::from_axis_angle(axis.to_glam(), angle))
    }

    pub fn from_scale(scale: Vector3) -> Self {
        Self::from_diagonal(scale.x, scale.y, scale.z)
    }

    fn from_glam(mat: glam::Mat3) -> Self {
        let rows = mat.transpose();
        Self::from_rows(
            Vector3::from_glam(rows.x_axis),
            Vector3::from_glam(rows.y_axis),
            Vector3::from_glam(rows.z_axis),
        )
    }

    fn to_glam(self) -> glam::Mat3 {
        glam::Mat3::from_cols(self.rows[0].to_glam(), self.rows[1].to_glam(), self.rows[2].to_glam()).transpose()
    }

    /// Column `index`, i.e. the basis vector of that axis.
    pub fn col(&self, index: usize) -> Vector3 {
        Vector3::from_glam(self.to_glam().col(index))
    }

    pub fn determinant(&self) -> f32 {
        self.to_glam().determinant()
    }

    pub fn transposed(self) -> Self {
        Self::from_glam(self.to_glam().transpose())
    }

    /// Returns the inverse of the matrix.
    ///
    /// # Panics
    /// If the determinant is zero.
    pub fn inverse(self) -> Self {
        let det = self.determinant();
        assert!(det != 0.0, "cannot invert a basis with determinant zero");
        Self::from_glam(self.to_glam().inverse())
    }

    /// Returns the orthonormalized version of the basis: axes are unit length and perpendicular to each other.
    pub fn orthonormalized(self) -> Self {
        let x = self.col(0).normalized();
        let y = (self.col(1) - x * x.dot(self.col(1))).normalized();
        let z = (self.col(2) - x * x.dot(self.col(2)) - y * y.dot(self.col(2))).normalized();

        Self::from_glam(glam::Mat3::from_cols(x.to_glam(), y.to_glam(), z.to_glam()))
    }

    /// Returns `true` if this basis and `other` are approximately equal, by comparing each component.
    pub fn is_equal_approx(&self, other: &Self) -> bool {
        self.rows
            .iter()
            .zip(other.rows.iter())
            .all(|(a, b)| a.is_equal_approx(*b))
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.rows;
        write!(f, "[{a}, {b}, {c}]")
    }
}

impl Mul for Basis {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::from_glam(self.to_glam() * rhs.to_glam())
    }
}

impl Mul<Vector3> for Basis {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        Vector3::from_glam(self.to_glam() * rhs.to_glam())
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Affine 3D transform: a [`Basis`] (rotation, scale, shear) followed by a translation.
///
/// The engine stores the basis first and the origin last; 48 bytes in single precision.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Transform3D {
    /// The basis is a matrix containing 3 vectors as its columns. They can be interpreted as the basis vectors of
    /// local coordinate system travelling with the object.
    pub basis: Basis,

    /// The translation offset of this transform.
    pub origin: Vector3,
}

impl Transform3D {
    /// The identity transform, with no translation, rotation or scaling applied.
    pub const IDENTITY: Self = Self::new(Basis::IDENTITY, Vector3::ZERO);

    pub const fn new(basis: Basis, origin: Vector3) -> Self {
        Self { basis, origin }
    }

    pub const fn from_origin(origin: Vector3) -> Self {
        Self::new(Basis::IDENTITY, origin)
    }

    /// Transforms a point: rotate/scale by the basis, then translate.
    pub fn xform(&self, point: Vector3) -> Vector3 {
        self.basis * point + self.origin
    }

    /// Inverse of the transform, assuming the basis is invertible.
    pub fn affine_inverse(&self) -> Self {
        let basis = self.basis.inverse();
        Self::new(basis, basis * -self.origin)
    }

    /// Rotates the transform around `axis` by `angle` radians, relative to the parent space. The origin is rotated too.
    pub fn rotated(&self, axis: Vector3, angle: f32) -> Self {
        let rotation = Basis::from_axis_angle(axis, angle);
        Self::new(rotation * self.basis, rotation * self.origin)
    }

    /// Moves the transform by `offset`, relative to the parent space.
    pub fn translated(&self, offset: Vector3) -> Self {
        Self::new(self.basis, self.origin + offset)
    }

    pub fn is_equal_approx(&self, other: &Self) -> bool {
        self.basis.is_equal_approx(&other.basis) && self.origin.is_equal_approx(other.origin)
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Transform3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[basis: {}, origin: {}]", self.basis, self.origin)
    }
}

impl Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.basis * rhs.basis, self.xform(rhs.origin))
    }
}

impl Mul<Vector3> for Transform3D {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        self.xform(rhs)
    }
}

impl_builtin_as_self!(Basis, Transform3D);

sys::static_assert_eq_size!(Basis, [f32; 9]);
sys::static_assert_eq_size!(Transform3D, [f32; 12]);
