use core::ops::{Index, IndexMut};

/// An index that is known to be lower than `LENGTH`, so it can be
/// used for accessing arrays of that length without bounds checks.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundedIndex<const LENGTH: usize>(usize);

impl<const LENGTH: usize> BoundedIndex<LENGTH> {
    pub const fn assert_range_ok(value: usize) {
        assert!(value < LENGTH, "Value out of bounds");
    }

    pub const fn from_const<const N: usize>() -> Self {
        const {
            Self::assert_range_ok(N);
        }

        Self(N)
    }

    pub const fn from_value(val: usize) -> Option<Self> {
        if val < LENGTH { Some(Self(val)) } else { None }
    }

    /// Iterates over every valid index, in increasing order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..LENGTH).map(Self)
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl<A, const LENGTH: usize> Index<BoundedIndex<LENGTH>> for [A; LENGTH] {
    type Output = A;

    fn index(&self, index: BoundedIndex<LENGTH>) -> &Self::Output {
        unsafe {
            // SAFETY: index < LENGTH asserted at construction.
            self.get_unchecked(index.0)
        }
    }
}

impl<A, const LENGTH: usize> IndexMut<BoundedIndex<LENGTH>> for [A; LENGTH] {
    fn index_mut(&mut self, index: BoundedIndex<LENGTH>) -> &mut Self::Output {
        unsafe {
            // SAFETY: index < LENGTH asserted at construction.
            self.get_unchecked_mut(index.0)
        }
    }
}
