use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;

/// Number of buckets allocated when a table is created without an explicit
/// capacity, and the size an empty table grows to on its first insertion.
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor used by constructors that do not take one explicitly.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Error returned when constructing a table with a load factor that is not a
/// positive number.
///
/// A load factor of zero or below would trigger a resize on every insertion,
/// and NaN makes the growth threshold meaningless, so both are rejected at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadFactorError {
    /// The rejected load factor.
    pub load_factor: f32,
}

impl fmt::Display for LoadFactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "load factor must be a positive number, got {}",
            self.load_factor
        )
    }
}

impl core::error::Error for LoadFactorError {}

/// One entry in a bucket's chain. The chain owns its tail through `next`.
struct Entry<T> {
    hash: u64,
    element: T,
    next: Link<T>,
}

type Link<T> = Option<Box<Entry<T>>>;

fn alloc_buckets<T>(capacity: usize) -> Vec<Link<T>> {
    let mut buckets = Vec::new();
    buckets.resize_with(capacity, || None);
    buckets
}

/// `capacity * load_factor`, truncated. The float-to-int cast saturates, so
/// an unbounded load factor simply disables growth rather than overflowing.
fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    (capacity as f32 * load_factor) as usize
}

/// Walks the chain by moving the mutable cursor into each entry's `next`
/// link. Iterative, so a degenerate chain cannot exhaust the stack.
fn chain_find_mut<'a, T>(
    mut link: &'a mut Link<T>,
    hash: u64,
    eq: &mut impl FnMut(&T) -> bool,
) -> Option<&'a mut T> {
    while let Some(entry) = link {
        if entry.hash == hash && eq(&entry.element) {
            return Some(&mut entry.element);
        }
        link = &mut entry.next;
    }
    None
}

/// Splices the first matching entry out of the chain, leaving the rest of the
/// chain linked through the removed entry's predecessor.
fn chain_remove<T>(
    mut link: &mut Link<T>,
    hash: u64,
    eq: &mut impl FnMut(&T) -> bool,
) -> Option<T> {
    loop {
        let matched = match link.as_deref() {
            Some(entry) => entry.hash == hash && eq(&entry.element),
            None => return None,
        };
        if matched {
            let entry = *link.take()?;
            *link = entry.next;
            return Some(entry.element);
        }
        match link {
            Some(entry) => link = &mut entry.next,
            None => return None,
        }
    }
}

/// A hash table using separate chaining with a configurable load factor.
///
/// `HashTable<T>` stores elements of type `T` and resolves hash collisions by
/// linking colliding entries into a per-bucket chain. Like the raw table in
/// `hashbrown`, it does not hash for you: every operation takes the element's
/// hash and an equality predicate, which lets [`HashMap`](crate::HashMap) and
/// [`HashSet`](crate::HashSet) share one storage implementation.
///
/// Each entry caches its hash, so lookups compare hashes before touching the
/// element and resizes never recompute them. When the number of elements
/// reaches `capacity * load_factor`, the bucket array doubles and every chain
/// is relinked against the new capacity.
///
/// ## Example
///
/// ```rust
/// use chain_hash::hash_table::HashTable;
///
/// // Using the key itself as its hash for brevity.
/// let mut table: HashTable<(u64, &str)> = HashTable::with_capacity(8);
/// table.insert_unique(1, (1, "one"));
/// table.insert_unique(2, (2, "two"));
///
/// assert_eq!(table.find(1, |&(k, _)| k == 1), Some(&(1, "one")));
/// assert_eq!(table.remove(2, |&(k, _)| k == 2), Some((2, "two")));
/// assert_eq!(table.len(), 1);
/// ```
pub struct HashTable<T> {
    buckets: Vec<Link<T>>,
    len: usize,
    threshold: usize,
    load_factor: f32,
}

impl<T> HashTable<T> {
    /// Creates a table with the given number of buckets and the default load
    /// factor of 0.75.
    ///
    /// A capacity of zero is valid; the table allocates nothing until the
    /// first insertion, which grows it to [`DEFAULT_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<u32> = HashTable::with_capacity(16);
    /// assert_eq!(table.capacity(), 16);
    /// assert_eq!(table.threshold(), 12);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: alloc_buckets(capacity),
            len: 0,
            threshold: threshold_for(capacity, DEFAULT_LOAD_FACTOR),
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Creates a table with the given number of buckets and load factor.
    ///
    /// # Errors
    ///
    /// Returns [`LoadFactorError`] if `load_factor` is not a positive number
    /// (zero, negative, or NaN).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<u32> = HashTable::with_load_factor(16, 0.5).unwrap();
    /// assert_eq!(table.threshold(), 8);
    ///
    /// assert!(HashTable::<u32>::with_load_factor(16, 0.0).is_err());
    /// assert!(HashTable::<u32>::with_load_factor(16, f32::NAN).is_err());
    /// ```
    pub fn with_load_factor(capacity: usize, load_factor: f32) -> Result<Self, LoadFactorError> {
        if load_factor <= 0.0 || load_factor.is_nan() {
            return Err(LoadFactorError { load_factor });
        }
        Ok(Self {
            buckets: alloc_buckets(capacity),
            len: 0,
            threshold: threshold_for(capacity, load_factor),
            load_factor,
        })
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the table's load factor.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the element count at which the next insertion doubles the
    /// bucket array.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Bucket for a hash at the current capacity. Callers check for an empty
    /// bucket array first.
    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Returns a reference to the first element whose cached hash equals
    /// `hash` and for which `eq` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<(u64, i32)> = HashTable::with_capacity(8);
    /// table.insert_unique(7, (7, -7));
    ///
    /// assert_eq!(table.find(7, |&(k, _)| k == 7), Some(&(7, -7)));
    /// assert_eq!(table.find(8, |&(k, _)| k == 8), None);
    /// ```
    pub fn find(&self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> Option<&T> {
        if self.buckets.is_empty() {
            return None;
        }
        let mut cursor = self.buckets[self.bucket_index(hash)].as_deref();
        while let Some(entry) = cursor {
            if entry.hash == hash && eq(&entry.element) {
                return Some(&entry.element);
            }
            cursor = entry.next.as_deref();
        }
        None
    }

    /// Returns a mutable reference to the first matching element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<(u64, i32)> = HashTable::with_capacity(8);
    /// table.insert_unique(7, (7, 0));
    ///
    /// if let Some(element) = table.find_mut(7, |&(k, _)| k == 7) {
    ///     element.1 = 42;
    /// }
    /// assert_eq!(table.find(7, |&(k, _)| k == 7), Some(&(7, 42)));
    /// ```
    pub fn find_mut(&mut self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> Option<&mut T> {
        if self.buckets.is_empty() {
            return None;
        }
        let index = self.bucket_index(hash);
        chain_find_mut(&mut self.buckets[index], hash, &mut eq)
    }

    /// Inserts an element at the head of its bucket's chain without checking
    /// whether an equal element is already present.
    ///
    /// The caller is responsible for upholding uniqueness, typically by
    /// calling [`find_mut`](Self::find_mut) first; inserting a duplicate
    /// leaves both entries in the chain. Increments the length, and doubles
    /// the bucket array if the length has reached the growth threshold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::with_capacity(4);
    /// table.insert_unique(1, 1);
    /// table.insert_unique(2, 2);
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn insert_unique(&mut self, hash: u64, element: T) {
        if self.buckets.is_empty() {
            self.resize(DEFAULT_CAPACITY);
        }
        let index = self.bucket_index(hash);
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry {
            hash,
            element,
            next,
        }));
        self.len += 1;
        if self.len >= self.threshold {
            let doubled = self
                .buckets
                .len()
                .checked_mul(2)
                .expect("capacity overflow");
            self.resize(doubled);
        }
    }

    /// Removes and returns the first matching element, splicing it out of its
    /// chain so the remaining entries stay linked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::with_capacity(8);
    /// table.insert_unique(3, 3);
    ///
    /// assert_eq!(table.remove(3, |&v| v == 3), Some(3));
    /// assert_eq!(table.remove(3, |&v| v == 3), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> Option<T> {
        if self.buckets.is_empty() {
            return None;
        }
        let index = self.bucket_index(hash);
        let removed = chain_remove(&mut self.buckets[index], hash, &mut eq);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Returns `true` if `pred` holds for any element, scanning every chain
    /// in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::with_capacity(8);
    /// table.insert_unique(1, 10);
    /// table.insert_unique(2, 20);
    ///
    /// assert!(table.any(|&v| v == 20));
    /// assert!(!table.any(|&v| v == 30));
    /// ```
    pub fn any(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        for head in &self.buckets {
            let mut cursor = head.as_deref();
            while let Some(entry) = cursor {
                if pred(&entry.element) {
                    return true;
                }
                cursor = entry.next.as_deref();
            }
        }
        false
    }

    /// Visits every element in bucket order. Backs the `Debug` impls of the
    /// map and set facades.
    pub(crate) fn for_each(&self, mut f: impl FnMut(&T)) {
        for head in &self.buckets {
            let mut cursor = head.as_deref();
            while let Some(entry) = cursor {
                f(&entry.element);
                cursor = entry.next.as_deref();
            }
        }
    }

    /// Removes all elements, keeping the current capacity and threshold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::with_capacity(8);
    /// table.insert_unique(1, 1);
    /// table.clear();
    ///
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 8);
    /// ```
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            // Unlink entries one at a time so dropping a long chain cannot
            // recurse through the nested boxes.
            let mut cursor = bucket.take();
            while let Some(mut entry) = cursor {
                cursor = entry.next.take();
            }
        }
        self.len = 0;
    }

    /// Replaces the bucket array with one of `new_capacity` buckets and
    /// relinks every entry against the new capacity. Prepending reverses
    /// intra-bucket order, which is not part of any contract. Cached hashes
    /// make this a pointer-shuffling pass with no rehashing.
    fn resize(&mut self, new_capacity: usize) {
        let old_buckets = core::mem::replace(&mut self.buckets, alloc_buckets(new_capacity));
        for head in old_buckets {
            let mut cursor = head;
            while let Some(mut entry) = cursor {
                cursor = entry.next.take();
                let index = (entry.hash % new_capacity as u64) as usize;
                entry.next = self.buckets[index].take();
                self.buckets[index] = Some(entry);
            }
        }
        self.threshold = threshold_for(new_capacity, self.load_factor);
    }
}

impl<T: Clone> Clone for HashTable<T> {
    fn clone(&self) -> Self {
        let mut buckets = alloc_buckets(self.buckets.len());
        for (bucket, head) in buckets.iter_mut().zip(&self.buckets) {
            // Clone entry by entry; a derived Clone would recurse through the
            // nested boxes and overflow the stack on a degenerate chain.
            // Prepending reverses intra-bucket order, which is not part of
            // any contract.
            let mut cursor = head.as_deref();
            while let Some(entry) = cursor {
                *bucket = Some(Box::new(Entry {
                    hash: entry.hash,
                    element: entry.element.clone(),
                    next: bucket.take(),
                }));
                cursor = entry.next.as_deref();
            }
        }
        Self {
            buckets,
            len: self.len,
            threshold: self.threshold,
            load_factor: self.load_factor,
        }
    }
}

impl<T> Drop for HashTable<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for HashTable<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<T: Debug> Debug for HashTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        self.for_each(|element| {
            set.entry(element);
        });
        set.finish()
    }
}
