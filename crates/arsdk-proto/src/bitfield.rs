//! Sets of enum variants encoded as bitmasks.
//!
//! Bit N of a bitfield is set when the variant with wire value N is a member.
//! Bits with no registered variant can arrive from newer firmware; they are
//! kept in the raw value but never reported by membership tests or
//! iteration, since a set has no slot for an unknown member.

use std::{fmt, marker::PhantomData};

use crate::enums::WireEnum;

/// Encoded width of a bitfield argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitfieldWidth {
    /// Every declared wire value is below 32
    U32,
    /// At least one declared wire value is 32 or above
    U64,
}

impl BitfieldWidth {
    /// Width needed by the registry of `E`.
    pub fn of<E: WireEnum>() -> Self {
        if E::VARIANTS.iter().all(|variant| variant.to_wire() < 32) { Self::U32 } else { Self::U64 }
    }

    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }
}

/// A set of `E` variants in wire form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitfield<E> {
    bits: u64,
    _variant: PhantomData<fn() -> E>,
}

impl<E: WireEnum> Bitfield<E> {
    /// The empty set.
    pub const fn empty() -> Self {
        Self { bits: 0, _variant: PhantomData }
    }

    /// Wrap bits received from the wire, including unrecognized ones.
    pub const fn from_wire(bits: u64) -> Self {
        Self { bits, _variant: PhantomData }
    }

    /// Raw bits for encoding.
    pub const fn to_wire(self) -> u64 {
        self.bits
    }

    /// Whether `variant` is a member.
    pub fn is_set(self, variant: E) -> bool {
        bit_of(variant).is_some_and(|bit| self.bits & bit != 0)
    }

    /// Add `variant` to the set.
    pub fn insert(&mut self, variant: E) {
        if let Some(bit) = bit_of(variant) {
            self.bits |= bit;
        }
    }

    /// Copy of the set with `variant` added.
    #[must_use]
    pub fn with(mut self, variant: E) -> Self {
        self.insert(variant);
        self
    }

    /// Iterate over members in ascending wire-value order.
    pub fn iter(self) -> Iter<E> {
        Iter { bits: self.bits, next_bit: 0, _variant: PhantomData }
    }

    /// Call `f` once per member in ascending wire-value order.
    pub fn for_each_set(self, f: impl FnMut(E)) {
        self.iter().for_each(f);
    }

    /// Number of registered members.
    pub fn len(self) -> usize {
        self.iter().count()
    }

    /// Whether no registered member is set.
    pub fn is_empty(self) -> bool {
        self.iter().next().is_none()
    }

    /// Set bits with no registered variant.
    pub fn unrecognized_bits(self) -> u64 {
        let known = E::VARIANTS
            .iter()
            .filter_map(|variant| bit_of(*variant))
            .fold(0, |acc, bit| acc | bit);
        self.bits & !known
    }
}

/// Whether `variant` is set in the raw `bitfield`.
pub fn is_set<E: WireEnum>(variant: E, bitfield: u64) -> bool {
    Bitfield::<E>::from_wire(bitfield).is_set(variant)
}

/// Call `f` for every registered variant set in the raw `bitfield`, in
/// ascending wire-value order.
pub fn for_each_set<E: WireEnum>(bitfield: u64, f: impl FnMut(E)) {
    Bitfield::<E>::from_wire(bitfield).for_each_set(f);
}

fn bit_of<E: WireEnum>(variant: E) -> Option<u64> {
    u32::try_from(variant.to_wire()).ok().and_then(|shift| 1u64.checked_shl(shift))
}

impl<E: WireEnum> Default for Bitfield<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: WireEnum> FromIterator<E> for Bitfield<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl<E: WireEnum> IntoIterator for Bitfield<E> {
    type Item = E;
    type IntoIter = Iter<E>;

    fn into_iter(self) -> Iter<E> {
        self.iter()
    }
}

impl<E: WireEnum> fmt::Debug for Bitfield<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        set.entries(self.iter());
        let extra = self.unrecognized_bits();
        if extra != 0 {
            set.entry(&format_args!("unrecognized=0x{extra:x}"));
        }
        set.finish()
    }
}

/// Iterator over the registered members of a [`Bitfield`].
#[derive(Debug, Clone)]
pub struct Iter<E> {
    bits: u64,
    next_bit: u32,
    _variant: PhantomData<fn() -> E>,
}

impl<E: WireEnum> Iterator for Iter<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        while self.next_bit < u64::BITS {
            let bit = self.next_bit;
            self.next_bit += 1;
            if self.bits & (1 << bit) == 0 {
                continue;
            }
            if let Some(variant) = E::from_wire(bit as i32).known() {
                return Some(variant);
            }
        }
        None
    }
}
