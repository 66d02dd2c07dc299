/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#![macro_use]

/// Implements a component-wise binary operator, between two vectors and between a vector and a scalar.
macro_rules! impl_vector_binary_operator {
    ($Vector:ty, $Scalar:ty, ($($components:ident),*), $Operator:ident, $func:ident, $AssignOperator:ident, $assign_func:ident) => {
        impl std::ops::$Operator for $Vector {
            type Output = Self;
            fn $func(mut self, rhs: $Vector) -> Self::Output {
                $(
                    self.$components = self.$components.$func(rhs.$components);
                )*
                self
            }
        }

        impl std::ops::$Operator<$Scalar> for $Vector {
            type Output = Self;
            fn $func(mut self, rhs: $Scalar) -> Self::Output {
                $(
                    self.$components = self.$components.$func(rhs);
                )*
                self
            }
        }

        impl std::ops::$AssignOperator for $Vector {
            fn $assign_func(&mut self, rhs: $Vector) {
                $(
                    self.$components.$assign_func(rhs.$components);
                )*
            }
        }

        impl std::ops::$AssignOperator<$Scalar> for $Vector {
            fn $assign_func(&mut self, rhs: $Scalar) {
                $(
                    self.$components.$assign_func(rhs);
                )*
            }
        }
    };
}

/// Implements all common arithmetic operators on a built-in vector type.
macro_rules! impl_vector_operators {
    (
        // Name of the vector type to be implemented, for example `Vector2`.
        $Vector:ty,
        // Type of each individual component, for example `f32`.
        $Scalar:ty,
        // Names of the components, with parentheses, for example `(x, y)`.
        ($($components:ident),*)
    ) => {
        impl std::ops::Neg for $Vector {
            type Output = Self;
            fn neg(mut self) -> Self::Output {
                $(
                    self.$components = -self.$components;
                )*
                self
            }
        }

        impl std::ops::Mul<$Vector> for $Scalar {
            type Output = $Vector;
            fn mul(self, mut rhs: $Vector) -> Self::Output {
                $(
                    rhs.$components *= self;
                )*
                rhs
            }
        }

        impl_vector_binary_operator!($Vector, $Scalar, ($($components),*), Add, add, AddAssign, add_assign);
        impl_vector_binary_operator!($Vector, $Scalar, ($($components),*), Sub, sub, SubAssign, sub_assign);
        impl_vector_binary_operator!($Vector, $Scalar, ($($components),*), Mul, mul, MulAssign, mul_assign);
        impl_vector_binary_operator!($Vector, $Scalar, ($($components),*), Div, div, DivAssign, div_assign);
    };
}

/// Builtins that the engine passes by value: the Rust struct is the ABI representation.
macro_rules! impl_builtin_as_self {
    ($($T:ty),* $(,)?) => {
        $(
            // SAFETY: #[repr(C)] with the engine's field order and sizes.
            unsafe impl $crate::sys::GodotFfi for $T {
                $crate::sys::ffi_methods! { SelfPtr }
            }

            impl $crate::meta::GodotConvert for $T {
                type Via = $T;
            }

            impl $crate::meta::ToGodot for $T {
                fn to_godot(&self) -> Self::Via {
                    *self
                }
            }

            impl $crate::meta::FromGodot for $T {
                fn try_from_godot(via: Self::Via) -> Result<Self, $crate::meta::ConvertError> {
                    Ok(via)
                }
            }
        )*
    };
}
