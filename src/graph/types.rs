//! Identifier and weight types threaded through every graph layout.

use core::fmt::Debug;
use core::hash::Hash;

use num_traits::{AsPrimitive, NumCast, PrimInt, Unsigned};

/// A fixed-width unsigned vertex or edge identifier.
///
/// Blanket-implemented for `u8`, `u16`, `u32`, `u64`, and `usize`.
pub trait GraphIndex:
    PrimInt + Unsigned + Hash + Debug + Default + Send + Sync + AsPrimitive<usize> + 'static
{
    /// The identifier as an array index.
    #[inline(always)]
    fn index(self) -> usize {
        self.as_()
    }

    /// Builds an identifier from an array index. Truncates if `i` does not fit;
    /// use [`GraphIndex::try_from_index`] where `i` is not already bounded by an
    /// identifier of this type.
    fn from_index(i: usize) -> Self;

    /// Builds an identifier from an array index, or `None` if it does not fit.
    #[inline]
    fn try_from_index(i: usize) -> Option<Self> {
        <Self as NumCast>::from(i)
    }
}

impl<T> GraphIndex for T
where
    T: PrimInt + Unsigned + Hash + Debug + Default + Send + Sync + AsPrimitive<usize> + 'static,
    usize: AsPrimitive<T>,
{
    #[inline(always)]
    fn from_index(i: usize) -> Self {
        i.as_()
    }
}

/// An edge weight with a lossless 64-bit encoding.
///
/// The encoding lets the dynamic graph keep weights in plain atomic words next
/// to the neighbor slots.
pub trait Weight: Copy + Default + PartialEq + PartialOrd + Debug + NumCast + Send + Sync + 'static {
    /// Encodes the weight into a 64-bit word.
    fn to_bits(self) -> u64;
    /// Decodes a word produced by [`Weight::to_bits`].
    fn from_bits(bits: u64) -> Self;
}

macro_rules! impl_weight_unsigned {
    ($($t:ty),*) => {$(
        impl Weight for $t {
            #[inline(always)]
            fn to_bits(self) -> u64 {
                self as u64
            }

            #[inline(always)]
            #[allow(clippy::cast_possible_truncation)]
            fn from_bits(bits: u64) -> Self {
                bits as $t
            }
        }
    )*};
}

macro_rules! impl_weight_signed {
    ($($t:ty),*) => {$(
        impl Weight for $t {
            #[inline(always)]
            #[allow(clippy::cast_sign_loss)]
            fn to_bits(self) -> u64 {
                <i64 as From<$t>>::from(self) as u64
            }

            #[inline(always)]
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            fn from_bits(bits: u64) -> Self {
                bits as i64 as $t
            }
        }
    )*};
}

impl_weight_unsigned!(u8, u16, u32, u64, usize);
impl_weight_signed!(i8, i16, i32, i64);

impl Weight for f32 {
    #[inline(always)]
    fn to_bits(self) -> u64 {
        <u64 as From<u32>>::from(f32::to_bits(self))
    }

    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl Weight for f64 {
    #[inline(always)]
    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }

    #[inline(always)]
    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}
