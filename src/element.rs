//! Element-type capability surface.
//!
//! Everything the matrix needs from its scalar type in one bound: the
//! arithmetic identities, a fixed-width native-endian byte codec for the
//! binary format, the text form, the default fill sequence and random
//! sampling. Primitive numerics get their impls from a macro; `f16` is
//! implemented by hand.

use half::f16;
use num_traits::{FromPrimitive, One, Zero};
use rand::Rng;
use std::fmt::Display;

pub trait Element:
    Copy + PartialEq + Display + Zero + One + FromPrimitive + 'static
{
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Encode into the first `SIZE` bytes of `buf`, native byte order.
    fn to_ne(self, buf: &mut [u8]);

    /// Decode from the first `SIZE` bytes of `buf`, native byte order.
    fn from_ne(buf: &[u8]) -> Self;

    /// Draw one value from `rng`.
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Value the default fill sequence writes at flat position `k`.
    /// Positions past the representable range collapse to zero.
    #[inline]
    fn seq(k: usize) -> Self {
        Self::from_usize(k).unwrap_or_else(Self::zero)
    }
}

macro_rules! element_impl {
    ($($t:ident),*) => {
        $(impl Element for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            #[inline]
            fn to_ne(self, buf: &mut [u8]) {
                buf[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }

            #[inline]
            fn from_ne(buf: &[u8]) -> Self {
                let mut b = [0u8; std::mem::size_of::<$t>()];
                b.copy_from_slice(&buf[..Self::SIZE]);
                <$t>::from_ne_bytes(b)
            }

            #[inline]
            fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
                rng.gen()
            }
        })*
    };
}

element_impl!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Element for f16 {
    const SIZE: usize = 2;

    #[inline]
    fn to_ne(self, buf: &mut [u8]) {
        buf[..2].copy_from_slice(&self.to_ne_bytes());
    }

    #[inline]
    fn from_ne(buf: &[u8]) -> Self {
        f16::from_ne_bytes([buf[0], buf[1]])
    }

    #[inline]
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        f16::from_f32(rng.gen::<f32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_round_trip() {
        let mut buf = [0u8; 8];
        1234.5f64.to_ne(&mut buf);
        assert_eq!(f64::from_ne(&buf), 1234.5);

        (-7i32).to_ne(&mut buf);
        assert_eq!(i32::from_ne(&buf), -7);

        f16::from_f32(0.25).to_ne(&mut buf);
        assert_eq!(f16::from_ne(&buf), f16::from_f32(0.25));
    }

    #[test]
    fn test_seq() {
        assert_eq!(f64::seq(0), 0.0);
        assert_eq!(f64::seq(5), 5.0);
        assert_eq!(u8::seq(7), 7);
        // past the representable range: zero
        assert_eq!(u8::seq(300), 0);
    }

    #[test]
    fn test_sample_deterministic_with_seed() {
        use rand::SeedableRng;
        use rand_xoshiro::Xoshiro256PlusPlus;

        let mut a = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut b = Xoshiro256PlusPlus::seed_from_u64(42);
        for _ in 0..16 {
            assert_eq!(f32::sample(&mut a), f32::sample(&mut b));
        }
    }
}
