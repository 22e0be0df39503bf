use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::HashMap;
use crate::hash_table::LoadFactorError;

/// A hash set implemented as a thin facade over [`HashMap`].
///
/// `HashSet<T, S>` stores each element as a key mapped to the unit value, so
/// uniqueness, growth, and clearing all follow directly from the map's
/// unique-key contract. The set adds no bookkeeping of its own.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use chain_hash::HashSet;
///
/// let mut set = HashSet::new();
/// assert!(set.insert("a"));
/// assert!(!set.insert("a"));
/// assert_eq!(set.len(), 1);
/// assert!(set.contains(&"a"));
/// # }
/// ```
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    map: HashMap<T, (), S>,
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut set = f.debug_set();
        self.map.for_each_entry(|value, _| {
            set.entry(value);
        });
        set.finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a set with the default capacity (16) and load factor (0.75),
    /// using the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: HashMap::with_hasher(hash_builder),
        }
    }

    /// Creates a set with the specified capacity, the default load factor,
    /// and the given hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Creates a set with the specified capacity and load factor, using the
    /// given hasher builder.
    ///
    /// # Errors
    ///
    /// Returns [`LoadFactorError`] if `load_factor` is not a positive number.
    pub fn with_load_factor_and_hasher(
        capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Result<Self, LoadFactorError> {
        Ok(Self {
            map: HashMap::with_load_factor_and_hasher(capacity, load_factor, hash_builder)?,
        })
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the current number of buckets in the set's table.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Adds a value to the set.
    ///
    /// Returns `true` if the value was not already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Removes a value from the set. Returns `true` if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// set.insert(2);
    /// assert!(set.remove(&2));
    /// assert!(!set.remove(&2));
    /// # }
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        self.map.remove(value).is_some()
    }

    /// Returns `true` if the set contains the given value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// # }
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Removes all elements, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<T> HashSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    /// Creates an empty set with the default capacity (16), load factor
    /// (0.75), and hasher.
    ///
    /// Implemented on the default hasher concretely so type inference works
    /// without an annotation; use [`with_hasher`](Self::with_hasher) to pick
    /// a different hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty set with the specified capacity and the default load
    /// factor.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Creates an empty set with the specified capacity and load factor.
    ///
    /// # Errors
    ///
    /// Returns [`LoadFactorError`] if `load_factor` is not a positive number.
    pub fn with_load_factor(capacity: usize, load_factor: f32) -> Result<Self, LoadFactorError> {
        Self::with_load_factor_and_hasher(capacity, load_factor, DefaultHashBuilder::default())
    }
}

impl<T, S> Default for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}
