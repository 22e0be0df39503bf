use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::mem;

use crate::DefaultHashBuilder;
use crate::hash_table::DEFAULT_CAPACITY;
use crate::hash_table::HashTable;
use crate::hash_table::LoadFactorError;

/// A hash map implemented on top of the chained [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq`, using a configurable hasher builder `S` to hash keys. Pairs
/// live in the table's bucket chains; a key's hash is computed once on
/// insertion and cached alongside the pair.
///
/// Unlike `std::collections::HashMap`, the growth policy is explicit: the
/// map holds `capacity * load_factor` entries before its bucket array
/// doubles, and both knobs are settable at construction.
///
/// There is no iteration API. The public contract is purely keyed access:
/// insert, get, remove, containment, and size bookkeeping.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use chain_hash::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
/// map.insert("a", 3);
///
/// assert_eq!(map.get(&"a"), Some(&3));
/// assert_eq!(map.len(), 2);
/// # }
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        self.table.for_each(|(k, v)| {
            map.entry(k, v);
        });
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a map with the default capacity (16) and load factor (0.75),
    /// using the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use siphasher::sip::SipHasher;
    /// # use core::hash::BuildHasherDefault;
    /// #
    /// use chain_hash::HashMap;
    ///
    /// let map: HashMap<i32, String, _> =
    ///     HashMap::with_hasher(BuildHasherDefault::<SipHasher>::default());
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hash_builder)
    }

    /// Creates a map with the specified capacity, the default load factor,
    /// and the given hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Creates a map with the specified capacity and load factor, using the
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
            table: HashTable::with_load_factor(capacity, load_factor)?,
            hash_builder,
        })
    }

    /// Returns the number of key-value pairs in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no key-value pairs.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the current number of buckets in the map's table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the map's load factor.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the entry count at which the next insertion doubles the
    /// bucket array.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Removes all key-value pairs, keeping the allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was not present, `None` is returned. If the key was
    /// present, the value is replaced in place and the previous value is
    /// returned; the stored key is left untouched. The `Option` return
    /// distinguishes "not present" from any stored value, so there is no
    /// ambiguity for value types with their own notion of absence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        if let Some((_, previous)) = self.table.find_mut(hash, |(k, _)| k == &key) {
            return Some(mem::replace(previous, value));
        }
        self.table.insert_unique(hash, (key, value));
        None
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// # }
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// if let Some(value) = map.get_mut(&1) {
    ///     *value = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// # }
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// # }
    /// ```
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` if some key maps to the given value, scanning every
    /// chain in the table. O(len), unlike the hashed lookups.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_value(&"a"));
    /// assert!(!map.contains_value(&"b"));
    /// # }
    /// ```
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.any(|(_, v)| v == value)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// Never shrinks the table; capacity only grows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// # }
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Visits every key-value pair. Used by the set facade's `Debug` impl.
    pub(crate) fn for_each_entry(&self, mut f: impl FnMut(&K, &V)) {
        self.table.for_each(|(k, v)| f(k, v));
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty map with the default capacity (16), load factor
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
    /// use chain_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 16);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty map with the specified capacity and the default load
    /// factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::with_capacity(64);
    /// assert_eq!(map.capacity(), 64);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Creates an empty map with the specified capacity and load factor.
    ///
    /// # Errors
    ///
    /// Returns [`LoadFactorError`] if `load_factor` is not a positive number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::with_load_factor(16, 0.5).unwrap();
    /// assert_eq!(map.threshold(), 8);
    ///
    /// assert!(HashMap::<i32, String>::with_load_factor(16, -0.5).is_err());
    /// # }
    /// ```
    pub fn with_load_factor(capacity: usize, load_factor: f32) -> Result<Self, LoadFactorError> {
        Self::with_load_factor_and_hasher(capacity, load_factor, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Hashes everything to zero, forcing every key into one chain.
    #[derive(Clone, Default)]
    struct ConstantHashBuilder;

    struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for ConstantHashBuilder {
        type Hasher = ConstantHasher;

        fn build_hasher(&self) -> Self::Hasher {
            ConstantHasher
        }
    }

    #[test]
    #[cfg(any(feature = "std", feature = "foldhash"))]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.threshold(), 12);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.capacity(), 16);
    }

    #[test]
    #[cfg(any(feature = "std", feature = "foldhash"))]
    fn test_new_needs_no_annotations() {
        // The constructors pin the default hasher, so a bare `new` followed
        // by an insert is enough to infer every type parameter.
        let mut map = HashMap::new();
        map.insert("a", 1);
        assert_eq!(map.get(&"a"), Some(&1));

        let map = HashMap::<u8, u8>::with_capacity(64);
        assert_eq!(map.capacity(), 64);
    }

    #[test]
    fn test_with_load_factor() {
        let map =
            HashMap::<i32, i32, _>::with_load_factor_and_hasher(32, 0.5, SipHashBuilder::default())
                .unwrap();
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.load_factor(), 0.5);
        assert_eq!(map.threshold(), 16);

        let builder = SipHashBuilder::default();
        assert!(
            HashMap::<i32, i32, _>::with_load_factor_and_hasher(32, 0.0, builder.clone()).is_err()
        );
        assert!(
            HashMap::<i32, i32, _>::with_load_factor_and_hasher(32, f32::NAN, builder).is_err()
        );
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert_eq!(
            map.insert(1, "world".to_string()),
            Some("hello".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"world".to_string()));
    }

    #[test]
    fn test_last_insert_wins() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);

        assert_eq!(map.get(&"a"), Some(&3));
        assert_eq!(map.get(&"b"), Some(&2));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_contains_key() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert!(!map.contains_key(&1));

        map.insert(1, "value".to_string());
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_contains_value() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert!(!map.contains_value(&10));

        map.insert(1, 10);
        map.insert(2, 20);
        assert!(map.contains_value(&10));
        assert!(map.contains_value(&20));
        assert!(!map.contains_value(&30));

        map.remove(&1);
        assert!(!map.contains_value(&10));
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        let capacity = map.capacity();
        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert!(!map.contains_key(&1));
        assert!(!map.contains_key(&2));
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn test_growth_scenario() {
        // Defaults: capacity 16, threshold 12. Fifteen distinct keys push
        // the table through exactly one doubling.
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 3);
        assert_eq!(map.len(), 2);

        for i in 0..13 {
            map.insert(alloc::format!("key_{i}"), i + 100);
        }
        assert_eq!(map.len(), 15);
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.threshold(), 24);

        assert_eq!(map.get(&"a".to_string()), Some(&3));
        assert_eq!(map.get(&"b".to_string()), Some(&2));
        for i in 0..13 {
            assert_eq!(map.get(&alloc::format!("key_{i}")), Some(&(i + 100)));
        }
    }

    #[test]
    fn test_option_keys_round_trip() {
        // A nullable key is just an Option-typed key.
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        map.insert(Some("k".to_string()), 1);
        map.insert(None::<String>, 2);

        assert_eq!(map.get(&None), Some(&2));
        assert_eq!(map.get(&Some("k".to_string())), Some(&1));
        assert_eq!(map.len(), 2);

        assert_eq!(map.insert(None, 3), Some(2));
        assert_eq!(map.remove(&None), Some(3));
        assert_eq!(map.get(&None), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_all_keys_in_one_chain() {
        // A constant hasher degenerates the map into a single chain; every
        // operation must still honor the key contract.
        let mut map = HashMap::with_hasher(ConstantHashBuilder);

        for i in 0..20 {
            assert_eq!(map.insert(i, i * 2), None);
        }
        assert_eq!(map.len(), 20);

        for i in 0..20 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..20).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }
        assert_eq!(map.len(), 10);

        for i in 0..20 {
            let expected = if i % 2 == 0 { None } else { Some(i * 2) };
            assert_eq!(map.get(&i).copied(), expected);
        }
    }

    #[test]
    fn test_many_insertions_across_resizes() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        for i in 0..1000 {
            map.insert(i, i * 2);
        }
        assert_eq!(map.len(), 1000);
        assert!(map.capacity() >= 1024);

        for i in 0..1000 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..1000).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }
        assert_eq!(map.len(), 500);

        for i in (1..1000).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
    }

    #[test]
    fn test_string_keys() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);
        map.insert("rust".to_string(), 3);

        assert_eq!(map.get(&"hello".to_string()), Some(&1));
        assert_eq!(map.get(&"world".to_string()), Some(&2));
        assert_eq!(map.get(&"rust".to_string()), Some(&3));
        assert_eq!(map.get(&"missing".to_string()), None);
    }

    #[test]
    fn test_default_trait() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_clone() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());

        let mut cloned = map.clone();
        cloned.insert(2, "two".to_string());

        assert_eq!(map.len(), 1);
        assert_eq!(cloned.len(), 2);
        assert_eq!(map.get(&2), None);
        assert_eq!(cloned.get(&1), Some(&"one".to_string()));
    }

    #[test]
    fn test_debug_output() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, 10);
        assert_eq!(alloc::format!("{map:?}"), "{1: 10}");
    }

    #[test]
    fn test_load_factor_error_display() {
        let err =
            HashMap::<i32, i32, _>::with_load_factor_and_hasher(16, -2.0, SipHashBuilder::default())
                .unwrap_err();
        assert_eq!(
            alloc::format!("{err}"),
            "load factor must be a positive number, got -2"
        );
    }
}
