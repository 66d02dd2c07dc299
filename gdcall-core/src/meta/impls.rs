/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::meta::error::ErrorKind;
use crate::meta::{ConvertError, FromGodot, GodotConvert, ToGodot};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Types represented as themselves

macro_rules! impl_godot_as_self {
    ($($T:ty),* $(,)?) => {
        $(
            impl GodotConvert for $T {
                type Via = $T;
            }

            impl ToGodot for $T {
                #[inline]
                fn to_godot(&self) -> Self::Via {
                    *self
                }
            }

            impl FromGodot for $T {
                #[inline]
                fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
                    Ok(via)
                }
            }
        )*
    };
}

impl_godot_as_self!(bool, i64, f64, ());

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Integers narrower than the engine's 64-bit int

macro_rules! impl_godot_via_i64 {
    ($($T:ty),* $(,)?) => {
        $(
            impl GodotConvert for $T {
                type Via = i64;
            }

            impl ToGodot for $T {
                #[inline]
                fn to_godot(&self) -> i64 {
                    i64::from(*self)
                }
            }

            impl FromGodot for $T {
                fn try_from_godot(via: i64) -> Result<Self, ConvertError> {
                    <$T>::try_from(via).map_err(|_| {
                        ConvertError::with_kind_value(ErrorKind::IntOutOfRange { target: stringify!($T) }, via)
                    })
                }
            }
        )*
    };
}

impl_godot_via_i64!(i8, i16, i32, u8, u16, u32);

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Floats

impl GodotConvert for f32 {
    type Via = f64;
}

impl ToGodot for f32 {
    #[inline]
    fn to_godot(&self) -> f64 {
        f64::from(*self)
    }
}

impl FromGodot for f32 {
    // Precision loss is inherent to the engine's float arguments; not an error.
    #[inline]
    fn try_from_godot(via: f64) -> Result<Self, ConvertError> {
        Ok(via as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_ints_widen_and_round_trip() {
        assert_eq!(i32::MIN.to_godot(), i32::MIN as i64);
        assert_eq!(i32::from_godot(-5), -5);
        assert_eq!(u8::from_godot(255), 255);
    }

    #[test]
    fn out_of_range_int_is_an_error() {
        let err = u8::try_from_godot(256).expect_err("256 does not fit in u8");

        assert_eq!(err.kind(), &ErrorKind::IntOutOfRange { target: "u8" });
        assert_eq!(err.to_string(), "integer out of range for `u8`: 256");
    }

    #[test]
    #[should_panic(expected = "FromGodot::from_godot() failed")]
    fn from_godot_panics_on_error() {
        i16::from_godot(i64::MAX);
    }

    #[test]
    fn f32_travels_as_f64() {
        assert_eq!(1.5f32.to_godot(), 1.5f64);
        assert_eq!(f32::from_godot(0.25), 0.25f32);
    }
}
