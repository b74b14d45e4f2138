//! Enum registries with forward-compatible decoding.
//!
//! Protocol revisions add enum values over time. A controller built against
//! an older revision must keep decoding commands from newer firmware, so a
//! wire value missing from the registry decodes to [`EnumValue::Unknown`]
//! instead of failing.
//!
//! Encoders only accept the known enum type, never an [`EnumValue`], so the
//! unknown case cannot be transmitted.

use std::fmt;

/// A closed set of named values with fixed wire integers.
///
/// Implement this with the [`wire_enum!`](crate::wire_enum) macro, which also
/// checks that wire values are distinct and within `0..64`.
pub trait WireEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Enum name, for diagnostics
    const NAME: &'static str;

    /// Every declared variant in ascending wire-value order
    const VARIANTS: &'static [Self];

    /// Wire integer of this variant.
    fn to_wire(self) -> i32;

    /// Map a wire integer to a variant. Never fails.
    fn from_wire(value: i32) -> EnumValue<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.to_wire() == value)
            .map_or(EnumValue::Unknown(value), EnumValue::Known)
    }
}

/// A decoded enum argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValue<E> {
    /// Value declared in this build's registry
    Known(E),
    /// Value absent from the registry, with the raw wire integer
    Unknown(i32),
}

impl<E: WireEnum> EnumValue<E> {
    /// The known variant, if any.
    pub fn known(self) -> Option<E> {
        match self {
            Self::Known(variant) => Some(variant),
            Self::Unknown(_) => None,
        }
    }

    /// Whether the wire value was missing from the registry.
    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// The integer this value was decoded from.
    pub fn wire_value(self) -> i32 {
        match self {
            Self::Known(variant) => variant.to_wire(),
            Self::Unknown(raw) => raw,
        }
    }
}

impl<E: WireEnum> From<E> for EnumValue<E> {
    fn from(variant: E) -> Self {
        Self::Known(variant)
    }
}

impl<E: WireEnum> PartialEq<E> for EnumValue<E> {
    fn eq(&self, other: &E) -> bool {
        matches!(self, Self::Known(variant) if variant == other)
    }
}

impl<E: WireEnum> fmt::Display for EnumValue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(variant) => write!(f, "{variant:?}"),
            Self::Unknown(raw) => write!(f, "{}::Unknown({raw})", E::NAME),
        }
    }
}

/// Declare a wire enum and its registry.
///
/// Generates a `#[repr(i32)]` enum deriving `Debug`, `Clone`, `Copy`,
/// `PartialEq`, `Eq` and `Hash`, plus its [`WireEnum`] implementation.
/// Variants must be listed in ascending wire order with values in `0..64`,
/// so every variant has a bit in a [`Bitfield`](crate::Bitfield).
///
/// ```
/// arsdk_proto::wire_enum! {
///     /// Gimbal axis
///     pub enum Axis {
///         /// Horizontal
///         Yaw = 0,
///         /// Vertical
///         Pitch = 1,
///     }
/// }
///
/// use arsdk_proto::{EnumValue, WireEnum};
/// assert_eq!(Axis::from_wire(1), EnumValue::Known(Axis::Pitch));
/// assert_eq!(Axis::from_wire(7), EnumValue::Unknown(7));
/// ```
///
/// A value without a bitfield slot is rejected at compile time:
///
/// ```compile_fail
/// arsdk_proto::wire_enum! {
///     /// Too wide
///     pub enum Channel {
///         /// Bit 64 does not exist
///         Overflow = 64,
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant = $value,
            )+
        }

        const _: () = {
            let values: &[i32] = &[$($value),+];
            let mut i = 0;
            while i < values.len() {
                assert!(values[i] >= 0, "wire enum values must be non-negative");
                assert!(values[i] < 64, "wire enum values must fit a 64-bit bitfield");
                if i > 0 {
                    assert!(values[i - 1] < values[i], "wire enum values must ascend");
                }
                i += 1;
            }
        };

        impl $crate::enums::WireEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn to_wire(self) -> i32 {
                self as i32
            }

            fn from_wire(value: i32) -> $crate::enums::EnumValue<Self> {
                match value {
                    $($value => $crate::enums::EnumValue::Known(Self::$variant),)+
                    other => $crate::enums::EnumValue::Unknown(other),
                }
            }
        }
    };
}
