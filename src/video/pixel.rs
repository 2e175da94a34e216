//! Traits for generic code over low and high bit depth planes.
//!
//! Borrowed from rav1e.

use num_traits::{AsPrimitive, PrimInt};
use std::fmt::{Debug, Display};

/// Defines a type which supports being cast to from a generic integer type.
///
/// Intended for casting to and from a [`Pixel`](trait.Pixel.html).
pub trait CastFromPrimitive<T>: Copy + 'static {
    /// Cast from a generic integer type to the given type.
    fn cast_from(v: T) -> Self;
}

macro_rules! impl_cast_from_primitive {
  ( $T:ty => $U:ty ) => {
    impl CastFromPrimitive<$U> for $T {
      #[inline(always)]
      fn cast_from(v: $U) -> Self { v as Self }
    }
  };
  ( $T:ty => { $( $U:ty ),* } ) => {
    $( impl_cast_from_primitive!($T => $U); )*
  };
}

// casts to { u8, u16 } are implemented separately using Pixel, so that the
// compiler understands that CastFromPrimitive<T: Pixel> is always implemented
impl_cast_from_primitive!(u8 => { u32, u64, usize });
impl_cast_from_primitive!(u16 => { u32, u64, usize });

/// A trait for types which may represent a pixel in a plane.
/// Currently implemented for `u8` and `u16`.
/// `u8` should be used for low-bit-depth planes, and `u16`
/// for high-bit-depth planes.
pub trait Pixel:
    PrimInt
    + Into<u32>
    + AsPrimitive<u8>
    + AsPrimitive<u16>
    + AsPrimitive<u32>
    + AsPrimitive<usize>
    + CastFromPrimitive<u8>
    + CastFromPrimitive<u16>
    + CastFromPrimitive<u32>
    + CastFromPrimitive<usize>
    + Debug
    + Display
    + Send
    + Sync
    + 'static
{
}

impl Pixel for u8 {}
impl Pixel for u16 {}

macro_rules! impl_cast_from_pixel_to_primitive {
    ( $T:ty ) => {
        impl<T: Pixel> CastFromPrimitive<T> for $T {
            #[inline(always)]
            fn cast_from(v: T) -> Self {
                v.as_()
            }
        }
    };
}

impl_cast_from_pixel_to_primitive!(u8);
impl_cast_from_pixel_to_primitive!(u16);
impl_cast_from_pixel_to_primitive!(u32);

#[cfg(test)]
mod tests {
    use super::*;

    // Exercises every pixel-to-primitive cast through a generic bound, the
    // way plane readers and grid conversion use them.
    fn round_trip<T: Pixel>(v: T) -> (u8, u16, u32) {
        (u8::cast_from(v), u16::cast_from(v), u32::cast_from(v))
    }

    #[test]
    fn casts_through_generic_pixels() {
        assert_eq!(round_trip(200u8), (200, 200, 200));
        assert_eq!(round_trip(1023u16), (255, 1023, 1023));
        assert_eq!(u8::cast_from(300usize), 44);
        assert_eq!(u16::cast_from(70000u32), 4464);
    }
}
