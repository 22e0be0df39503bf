#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A key-value map built on the chained hash table.
///
/// This module provides a `HashMap` that wraps the `HashTable` with key
/// hashing and the standard put/get/remove map contract.
pub mod hash_map;

/// The separate-chaining storage layer shared by the map and set.
///
/// This module provides a raw `HashTable` that takes precomputed hashes and
/// equality predicates instead of hashing for you.
pub mod hash_table;

/// A unique-element set built on the map.
///
/// This module provides a `HashSet` that delegates every operation to a
/// `HashMap` with unit values.
pub mod hash_set;

pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
pub use hash_table::LoadFactorError;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        ///
        /// With the `foldhash` feature (on by default) this is foldhash's
        /// fast `RandomState`, which also works without `std`.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        ///
        /// Without the `foldhash` feature this falls back to the standard
        /// library's `RandomState`.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// Placeholder hasher builder for builds with neither `foldhash` nor
        /// `std`. It cannot be constructed; supply a hasher builder
        /// explicitly via the `with_hasher` constructors.
        pub enum DefaultHashBuilder {}
    }
}
