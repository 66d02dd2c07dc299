/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Declares an engine class wrapper deriving from `$Base`, with all ancestors of `$Base` listed after it.
///
/// Generates the struct, [`GodotClass`][crate::obj::GodotClass], [`EngineClass`][crate::obj::EngineClass], `Deref`
/// to the base, the [`Inherits`][crate::obj::Inherits] impls and the method declaration table.
macro_rules! engine_class {
    (
        $( #[$attr:meta] )*
        pub struct $Class:ident : $Base:ident $(, $Ancestor:ident)* ;
        memory = $Memory:ident;
        methods = [ $( $method:ident = $hash:literal ),* $(,)? ];
    ) => {
        $( #[$attr] )*
        pub struct $Class {
            base: $Base,
        }

        impl $crate::obj::GodotClass for $Class {
            type Memory = $crate::obj::$Memory;
            type Wrapper = Self;
            const CLASS_NAME: $crate::meta::ClassName = $crate::meta::ClassName::new(concat!(stringify!($Class), "\0"));
        }

        impl $crate::obj::EngineClass for $Class {
            fn handle(&self) -> &$crate::obj::ObjectHandle {
                $crate::obj::EngineClass::handle(&self.base)
            }

            unsafe fn from_handle(handle: $crate::obj::ObjectHandle) -> Self {
                Self {
                    base: <$Base as $crate::obj::EngineClass>::from_handle(handle),
                }
            }
        }

        impl std::ops::Deref for $Class {
            type Target = $Base;

            fn deref(&self) -> &$Base {
                &self.base
            }
        }

        // SAFETY: the wrapper of the direct base is embedded as field.
        unsafe impl $crate::obj::Inherits<$Base> for $Class {
            fn as_base(&self) -> &$Base {
                &self.base
            }
        }

        $(
            // SAFETY: transitively through the direct base.
            unsafe impl $crate::obj::Inherits<$Ancestor> for $Class {
                fn as_base(&self) -> &$Ancestor {
                    <$Base as $crate::obj::Inherits<$Ancestor>>::as_base(&self.base)
                }
            }
        )*

        impl $Class {
            const CLASS: $crate::meta::ClassName = <Self as $crate::obj::GodotClass>::CLASS_NAME;

            pub(crate) const METHODS: &'static [$crate::meta::MethodDecl] = &[
                $(
                    $crate::meta::MethodDecl::new(Self::CLASS, concat!(stringify!($method), "\0"), $hash),
                )*
            ];

            pub(crate) const INFO: $crate::classes::EngineClassInfo = $crate::classes::EngineClassInfo {
                name: Self::CLASS,
                parent: Some(<$Base as $crate::obj::GodotClass>::CLASS_NAME),
                methods: Self::METHODS,
            };

            fn ptrcall<R: $crate::meta::FromGodot>(&self, method: &'static str, frame: $crate::sys::CallFrame) -> R {
                $crate::obj::EngineClass::handle(self).call(Self::CLASS, method, frame)
            }

            #[allow(dead_code)]
            fn ptrcall_object(&self, method: &'static str, frame: $crate::sys::CallFrame) -> $crate::sys::GDExtensionObjectPtr {
                $crate::obj::EngineClass::handle(self).call_raw(Self::CLASS, method, frame)
            }

            #[allow(dead_code)]
            fn frame(&self) -> $crate::sys::CallFrame {
                $crate::obj::EngineClass::call_frame(self)
            }
        }

        impl std::fmt::Debug for $Class {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let handle = $crate::obj::EngineClass::handle(self);
                f.debug_struct(stringify!($Class))
                    .field("id", &handle.instance_id())
                    .finish()
            }
        }
    };
}

/// Declares an engine enum, passed through ptrcalls as its `i64` ordinal.
macro_rules! engine_enum {
    (
        $( #[$attr:meta] )*
        pub enum $Enum:ident {
            $(
                $( #[$variant_attr:meta] )*
                $Variant:ident = $ord:literal
            ),* $(,)?
        }
    ) => {
        $( #[$attr] )*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum $Enum {
            $(
                $( #[$variant_attr] )*
                $Variant = $ord,
            )*
        }

        impl $Enum {
            /// All enumerators, in ordinal order.
            pub const ALL: &'static [Self] = &[ $( Self::$Variant ),* ];

            pub fn ord(self) -> i64 {
                self as i64
            }

            pub fn try_from_ord(ord: i64) -> Option<Self> {
                match ord {
                    $( $ord => Some(Self::$Variant), )*
                    _ => None,
                }
            }
        }

        impl $crate::meta::GodotConvert for $Enum {
            type Via = i64;
        }

        impl $crate::meta::ToGodot for $Enum {
            fn to_godot(&self) -> i64 {
                self.ord()
            }
        }

        impl $crate::meta::FromGodot for $Enum {
            fn try_from_godot(via: i64) -> Result<Self, $crate::meta::ConvertError> {
                Self::try_from_ord(via).ok_or_else(|| {
                    $crate::meta::ConvertError::with_kind_value(
                        $crate::meta::ErrorKind::UnknownEnumOrd { enum_name: stringify!($Enum) },
                        via,
                    )
                })
            }
        }
    };
}
