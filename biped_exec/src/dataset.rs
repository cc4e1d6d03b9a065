//! # Dataset
//!
//! A dataset is an ordered, fixed-arity group of data blocks. Each block is a
//! plain struct held in shared storage, so that a model, the controller
//! feeding it and any composite controller built on top can all view the same
//! numbers without copying them.
//!
//! Blocks are addressed by a zero-based index known at compile time:
//!
//! ```
//! use biped_lib::dataset::{Dataset, Shared};
//! use biped_lib::subdata;
//!
//! #[derive(Clone, Default)]
//! struct A { a: f64 }
//! #[derive(Clone, Default)]
//! struct B { b: f64 }
//!
//! let data: Dataset<(Shared<A>, Shared<B>)> = Dataset::new();
//! data.get_mut::<1>().b = 2.0;
//!
//! // A sub-dataset aliases the blocks of its parent.
//! let sub = subdata!(data; 1);
//! assert_eq!(sub.get::<0>().b, 2.0);
//! ```
//!
//! The storage is single threaded. Callers sequence the writers so that no
//! block is borrowed mutably through two views at once.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Shared storage for one data block.
pub type Shared<T> = Rc<RefCell<T>>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A tuple of shared blocks, `(Shared<T0>, Shared<T1>, ...)`.
pub trait Blocks {
    /// Number of blocks in the tuple.
    const LEN: usize;
}

/// Block tuples which can be created with every block at its default value.
pub trait DefaultBlocks: Blocks {
    fn default_blocks() -> Self;
}

/// Block tuples which can be copied into fresh, unshared storage.
pub trait DetachBlocks: Blocks {
    fn detach_blocks(&self) -> Self;
}

/// Access to the block at index `I`.
pub trait BlockAt<const I: usize> {
    type Block;

    fn block(&self) -> &Shared<Self::Block>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An indexed group of shared data blocks.
///
/// Cloning a dataset produces another view of the same blocks, use
/// [`Dataset::detached`] to copy the values instead.
#[derive(Debug, Clone)]
pub struct Dataset<B> {
    blocks: B,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<B: Blocks> Dataset<B> {
    /// Build a dataset sharing the given blocks.
    pub fn from_blocks(blocks: B) -> Self {
        Self { blocks }
    }

    /// Number of blocks in the dataset.
    pub fn len(&self) -> usize {
        B::LEN
    }

    pub fn is_empty(&self) -> bool {
        B::LEN == 0
    }

    /// Get a new handle on the storage of block `I`.
    pub fn ptr<const I: usize>(&self) -> Shared<<B as BlockAt<I>>::Block>
    where
        B: BlockAt<I>,
    {
        Rc::clone(<B as BlockAt<I>>::block(&self.blocks))
    }

    /// Borrow block `I`.
    ///
    /// # Panics
    /// - If the block is currently borrowed mutably through any view.
    pub fn get<const I: usize>(&self) -> Ref<'_, <B as BlockAt<I>>::Block>
    where
        B: BlockAt<I>,
    {
        <B as BlockAt<I>>::block(&self.blocks).borrow()
    }

    /// Mutably borrow block `I`.
    ///
    /// # Panics
    /// - If the block is currently borrowed through any view.
    pub fn get_mut<const I: usize>(&self) -> RefMut<'_, <B as BlockAt<I>>::Block>
    where
        B: BlockAt<I>,
    {
        <B as BlockAt<I>>::block(&self.blocks).borrow_mut()
    }

    /// Overwrite the value of block `I`.
    pub fn set<const I: usize>(&self, value: <B as BlockAt<I>>::Block)
    where
        B: BlockAt<I>,
    {
        *self.get_mut::<I>() = value;
    }

    /// True if block `I` of this dataset and block `J` of `other` are the
    /// same storage.
    pub fn shares<Other, const I: usize, const J: usize>(&self, other: &Dataset<Other>) -> bool
    where
        B: BlockAt<I>,
        Other: BlockAt<J, Block = <B as BlockAt<I>>::Block>,
    {
        Rc::ptr_eq(
            <B as BlockAt<I>>::block(&self.blocks),
            <Other as BlockAt<J>>::block(&other.blocks),
        )
    }

    /// Copy the value of block `S` of `src` into block `D` of this dataset.
    ///
    /// The blocks keep their own storage, only the contents are copied. If
    /// both indices already name the same storage nothing happens.
    pub fn copy_block<Src, const D: usize, const S: usize>(&self, src: &Dataset<Src>)
    where
        B: BlockAt<D>,
        Src: BlockAt<S, Block = <B as BlockAt<D>>::Block>,
        <B as BlockAt<D>>::Block: Clone,
    {
        let dst = <B as BlockAt<D>>::block(&self.blocks);
        let from = <Src as BlockAt<S>>::block(&src.blocks);

        if Rc::ptr_eq(dst, from) {
            return;
        }

        let value = from.borrow().clone();
        *dst.borrow_mut() = value;
    }
}

impl<B: DefaultBlocks> Dataset<B> {
    /// Create a dataset with every block in new storage at its default value.
    pub fn new() -> Self {
        Self::from_blocks(B::default_blocks())
    }
}

impl<B: DefaultBlocks> Default for Dataset<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: DetachBlocks> Dataset<B> {
    /// Copy the dataset into new storage which is not shared with `self`.
    pub fn detached(&self) -> Self {
        Self::from_blocks(self.blocks.detach_blocks())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Put a value into new shared storage.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

// ---------------------------------------------------------------------------
// MACROS
// ---------------------------------------------------------------------------

/// Build a dataset aliasing a subset of another dataset's blocks.
///
/// The blocks appear in the order the indices are listed, so
/// `subdata!(data; 3, 1)` gives a two block dataset whose block 0 is block 3
/// of `data`.
#[macro_export]
macro_rules! subdata {
    ($data:expr; $($idx:tt),+ $(,)?) => {{
        let data = &$data;
        $crate::dataset::Dataset::from_blocks(($(data.ptr::<$idx>(),)+))
    }};
}

/// Copy block values between two datasets at paired indices.
///
/// `copy_blocks!(dst, [0, 1] <- src, [3, 4])` copies block 3 of `src` into
/// block 0 of `dst` and block 4 into block 1. The index lists must have the
/// same length.
#[macro_export]
macro_rules! copy_blocks {
    ($dst:expr, [$($d:tt),+] <- $src:expr, [$($s:tt),+]) => {{
        let dst = &$dst;
        let src = &$src;
        $( dst.copy_block::<_, $d, $s>(src); )+
    }};
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_block_at {
    ([$($T:ident),+] $idx:tt $B:ident) => {
        impl<$($T),+> BlockAt<$idx> for ($(Shared<$T>,)+) {
            type Block = $B;

            fn block(&self) -> &Shared<$B> {
                &self.$idx
            }
        }
    };
}

macro_rules! impl_blocks_common {
    ([$($T:ident),+] [$($idx:tt),+]) => {
        impl<$($T),+> Blocks for ($(Shared<$T>,)+) {
            const LEN: usize = count!($($T)+);
        }

        impl<$($T: Default),+> DefaultBlocks for ($(Shared<$T>,)+) {
            fn default_blocks() -> Self {
                ($(shared($T::default()),)+)
            }
        }

        impl<$($T: Clone),+> DetachBlocks for ($(Shared<$T>,)+) {
            fn detach_blocks(&self) -> Self {
                ($(shared(self.$idx.borrow().clone()),)+)
            }
        }
    };
}

macro_rules! impl_blocks {
    ($all:tt; $($idx:tt => $B:ident),+) => {
        $( impl_block_at!($all $idx $B); )+
        impl_blocks_common!($all [$($idx),+]);
    };
}

impl_blocks!([T0]; 0 => T0);
impl_blocks!([T0, T1]; 0 => T0, 1 => T1);
impl_blocks!([T0, T1, T2]; 0 => T0, 1 => T1, 2 => T2);
impl_blocks!([T0, T1, T2, T3]; 0 => T0, 1 => T1, 2 => T2, 3 => T3);
impl_blocks!([T0, T1, T2, T3, T4]; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4);
impl_blocks!(
    [T0, T1, T2, T3, T4, T5];
    0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5
);
impl_blocks!(
    [T0, T1, T2, T3, T4, T5, T6];
    0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6
);
impl_blocks!(
    [T0, T1, T2, T3, T4, T5, T6, T7];
    0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7
);
impl_blocks!(
    [T0, T1, T2, T3, T4, T5, T6, T7, T8];
    0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7, 8 => T8
);
impl_blocks!(
    [T0, T1, T2, T3, T4, T5, T6, T7, T8, T9];
    0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7, 8 => T8,
    9 => T9
);

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Raw1 {
        a: f64,
        b: f64,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Raw2 {
        id: i32,
        x: f64,
        y: f64,
    }

    type TestDataset = Dataset<(Shared<Raw1>, Shared<Raw2>)>;

    #[derive(Debug, Clone, Default)]
    struct A(f64);
    #[derive(Debug, Clone, Default)]
    struct B(f64);
    #[derive(Debug, Clone, Default)]
    struct C(f64);
    #[derive(Debug, Clone, Default)]
    struct D(f64);
    #[derive(Debug, Clone, Default)]
    struct E(f64);

    type SampleDataset = Dataset<(Shared<A>, Shared<B>, Shared<C>, Shared<D>, Shared<E>)>;

    #[test]
    fn test_default_ctor() {
        let data = TestDataset::new();
        assert_eq!(data.len(), 2);
        assert_eq!(*data.get::<0>(), Raw1::default());
        assert_eq!(*data.get::<1>(), Raw2::default());
    }

    #[test]
    fn test_from_blocks_shares_storage() {
        let p1 = shared(Raw1::default());
        let p2 = shared(Raw2::default());
        let data = TestDataset::from_blocks((p1.clone(), p2.clone()));

        assert!(Rc::ptr_eq(&data.ptr::<0>(), &p1));
        assert!(Rc::ptr_eq(&data.ptr::<1>(), &p2));

        p1.borrow_mut().a = 4.0;
        assert_eq!(data.get::<0>().a, 4.0);
    }

    #[test]
    fn test_access_elements() {
        let data = TestDataset::new();
        data.get_mut::<0>().a = 0.25;
        data.get_mut::<1>().x = -3.0;
        let mut raw2 = data.get::<1>().clone();
        raw2.id = 7;
        data.set::<1>(raw2);

        assert_eq!(data.get::<0>().a, 0.25);
        assert_eq!(data.get::<1>().x, -3.0);
        assert_eq!(data.get::<1>().id, 7);
    }

    #[test]
    fn test_subdata_aliases_in_requested_order() {
        let data = SampleDataset::new();

        let sub1 = subdata!(data; 0, 1);
        let sub2 = subdata!(data; 3, 1, 4);

        assert_eq!(sub1.len(), 2);
        assert_eq!(sub2.len(), 3);

        assert!(Rc::ptr_eq(&sub1.ptr::<0>(), &data.ptr::<0>()));
        assert!(Rc::ptr_eq(&sub1.ptr::<1>(), &data.ptr::<1>()));

        assert!(Rc::ptr_eq(&sub2.ptr::<0>(), &data.ptr::<3>()));
        assert!(Rc::ptr_eq(&sub2.ptr::<1>(), &data.ptr::<1>()));
        assert!(Rc::ptr_eq(&sub2.ptr::<2>(), &data.ptr::<4>()));
        assert!(sub2.shares::<_, 2, 4>(&data));

        // Writes through either view are visible through the other
        sub2.get_mut::<0>().0 = 1.5;
        assert_eq!(data.get::<3>().0, 1.5);
        data.get_mut::<1>().0 = -2.0;
        assert_eq!(sub1.get::<1>().0, -2.0);
        assert_eq!(sub2.get::<1>().0, -2.0);
    }

    #[test]
    fn test_copy_blocks_copies_values() {
        let src = SampleDataset::new();
        let dst = Dataset::<(Shared<D>, Shared<B>)>::new();

        src.get_mut::<3>().0 = 3.0;
        src.get_mut::<1>().0 = 1.0;

        copy_blocks!(dst, [0, 1] <- src, [3, 1]);

        assert_eq!(dst.get::<0>().0, 3.0);
        assert_eq!(dst.get::<1>().0, 1.0);

        // The storage is still independent
        assert!(!dst.shares::<_, 0, 3>(&src));
        src.get_mut::<3>().0 = 5.0;
        assert_eq!(dst.get::<0>().0, 3.0);
    }

    #[test]
    fn test_copy_block_onto_itself() {
        let data = SampleDataset::new();
        let sub = subdata!(data; 2);
        data.get_mut::<2>().0 = 9.0;

        sub.copy_block::<_, 0, 2>(&data);
        assert_eq!(sub.get::<0>().0, 9.0);
    }

    #[test]
    fn test_detached() {
        let data = TestDataset::new();
        data.get_mut::<0>().b = 2.0;

        let copy = data.detached();
        assert_eq!(copy.get::<0>().b, 2.0);
        assert!(!copy.shares::<_, 0, 0>(&data));

        copy.get_mut::<0>().b = 8.0;
        assert_eq!(data.get::<0>().b, 2.0);
    }

    #[test]
    fn test_clone_is_a_view() {
        let data = TestDataset::new();
        let view = data.clone();
        view.get_mut::<1>().y = 6.0;
        assert_eq!(data.get::<1>().y, 6.0);
    }
}
