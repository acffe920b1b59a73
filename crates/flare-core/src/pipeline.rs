//! Ordered, keyed pipelines
//!
//! A [`Pipeline`] is an ordered sequence of `(key, value)` entries where
//! insertion order is semantically meaningful: it defines dispatch order
//! for reporters and matchers, and merge order for data extensions and
//! filters. Entries may be realized lazily via [`LazyValue`], so heavyweight
//! components (an HTTP client, an open file) are not constructed until the
//! first event actually reaches them.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Key / PipelineRef
// ---------------------------------------------------------------------------

/// Identifier for a pipeline entry.
///
/// Keys are short symbolic names (`"file"`, `"redact-passwords"`) or, when a
/// component is added without an explicit key, its type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s)
    }
}

/// A position reference: either a literal index or a key to resolve.
#[derive(Debug, Clone, Copy)]
pub enum PipelineRef<'a> {
    /// A literal position in the pipeline
    Index(usize),
    /// A key, resolved by linear scan to the first matching entry
    Key(&'a str),
}

impl From<usize> for PipelineRef<'static> {
    fn from(i: usize) -> Self {
        PipelineRef::Index(i)
    }
}

impl<'a> From<&'a str> for PipelineRef<'a> {
    fn from(k: &'a str) -> Self {
        PipelineRef::Key(k)
    }
}

impl<'a> From<&'a Key> for PipelineRef<'a> {
    fn from(k: &'a Key) -> Self {
        PipelineRef::Key(k.as_str())
    }
}

impl fmt::Display for PipelineRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineRef::Index(i) => write!(f, "{}", i),
            PipelineRef::Key(k) => f.write_str(k),
        }
    }
}

// ---------------------------------------------------------------------------
// LazyValue
// ---------------------------------------------------------------------------

/// A compute-once lazy cell.
///
/// Wraps either an already-realized value or a deferred initializer that
/// runs at most once on first access. Clones share the underlying cell, so
/// a value realized through one clone (for example inside a merged pipeline)
/// is visible through all of them.
pub struct LazyValue<T> {
    inner: Arc<LazyInner<T>>,
}

struct LazyInner<T> {
    cell: OnceLock<T>,
    init: Mutex<Option<Box<dyn FnOnce() -> T + Send>>>,
}

impl<T> LazyValue<T> {
    /// Wraps an already-constructed value.
    pub fn ready(value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        LazyValue {
            inner: Arc::new(LazyInner {
                cell,
                init: Mutex::new(None),
            }),
        }
    }

    /// Defers construction until the first call to [`LazyValue::get`].
    pub fn deferred(init: impl FnOnce() -> T + Send + 'static) -> Self {
        LazyValue {
            inner: Arc::new(LazyInner {
                cell: OnceLock::new(),
                init: Mutex::new(Some(Box::new(init))),
            }),
        }
    }

    /// Returns the value, realizing it on first access.
    pub fn get(&self) -> &T {
        self.inner.cell.get_or_init(|| {
            let init = self
                .inner
                .init
                .lock()
                .expect("lazy value initializer lock poisoned")
                .take();
            // get_or_init guarantees this closure runs at most once, so the
            // initializer is always still present here.
            (init.expect("lazy value initializer already consumed"))()
        })
    }

    /// Whether the value has been realized yet.
    pub fn is_realized(&self) -> bool {
        self.inner.cell.get().is_some()
    }
}

impl<T> Clone for LazyValue<T> {
    fn clone(&self) -> Self {
        LazyValue {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.cell.get() {
            Some(v) => f.debug_tuple("LazyValue").field(v).finish(),
            None => f.write_str("LazyValue(<deferred>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

struct Entry<T> {
    key: Key,
    value: LazyValue<T>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Entry {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// An ordered, keyed sequence of pipeline entries.
///
/// All mutating operations either succeed completely or leave the pipeline
/// untouched: referencing a missing key fails with
/// [`Error::UnknownKey`] before anything is changed.
pub struct Pipeline<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Pipeline {
            entries: self.entries.clone(),
        }
    }
}

impl<T> Pipeline<T> {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Pipeline {
            entries: Vec::new(),
        }
    }

    /// Appends an entry with an already-constructed value.
    pub fn add(&mut self, key: impl Into<Key>, value: T) {
        self.entries.push(Entry {
            key: key.into(),
            value: LazyValue::ready(value),
        });
    }

    /// Appends an entry whose value is constructed on first access.
    ///
    /// The key is queryable immediately, before the value is realized.
    pub fn add_lazy(&mut self, key: impl Into<Key>, init: impl FnOnce() -> T + Send + 'static) {
        self.entries.push(Entry {
            key: key.into(),
            value: LazyValue::deferred(init),
        });
    }

    /// Inserts an entry before the given position (index or key).
    ///
    /// An index equal to `len()` appends. Also exposed as
    /// [`Pipeline::insert_before`].
    pub fn insert<'a>(
        &mut self,
        position: impl Into<PipelineRef<'a>>,
        key: impl Into<Key>,
        value: T,
    ) -> Result<()> {
        let position = position.into();
        let index = self.resolve(position)?;
        self.entries.insert(
            index,
            Entry {
                key: key.into(),
                value: LazyValue::ready(value),
            },
        );
        Ok(())
    }

    /// Alias for [`Pipeline::insert`].
    pub fn insert_before<'a>(
        &mut self,
        position: impl Into<PipelineRef<'a>>,
        key: impl Into<Key>,
        value: T,
    ) -> Result<()> {
        self.insert(position, key, value)
    }

    /// Inserts an entry immediately after the entry with the given key.
    pub fn insert_after(&mut self, after: &str, key: impl Into<Key>, value: T) -> Result<()> {
        let index = self.index_of(after).ok_or_else(|| Error::UnknownKey {
            key: after.to_string(),
        })?;
        self.entries.insert(
            index + 1,
            Entry {
                key: key.into(),
                value: LazyValue::ready(value),
            },
        );
        Ok(())
    }

    /// Replaces the entry with the given key, keeping its position.
    pub fn swap(&mut self, key: &str, new_key: impl Into<Key>, value: T) -> Result<()> {
        let index = self.index_of(key).ok_or_else(|| Error::UnknownKey {
            key: key.to_string(),
        })?;
        self.entries[index] = Entry {
            key: new_key.into(),
            value: LazyValue::ready(value),
        };
        Ok(())
    }

    /// Removes the entry at the given position (index or key).
    ///
    /// Deleting a missing key is an error, consistent with
    /// [`Pipeline::insert_after`] and [`Pipeline::swap`].
    pub fn delete<'a>(&mut self, position: impl Into<PipelineRef<'a>>) -> Result<()> {
        let position = position.into();
        let index = match position {
            PipelineRef::Index(i) if i < self.entries.len() => i,
            PipelineRef::Index(i) => {
                return Err(Error::UnknownKey { key: i.to_string() });
            }
            PipelineRef::Key(k) => self.index_of(k).ok_or_else(|| Error::UnknownKey {
                key: k.to_string(),
            })?,
        };
        self.entries.remove(index);
        Ok(())
    }

    /// Resolves a reference to the position of the first matching entry.
    ///
    /// A literal index resolves to itself when it is within bounds
    /// (`len()` is permitted as an append position).
    pub fn index<'a>(&self, position: impl Into<PipelineRef<'a>>) -> Option<usize> {
        match position.into() {
            PipelineRef::Index(i) if i <= self.entries.len() => Some(i),
            PipelineRef::Index(_) => None,
            PipelineRef::Key(k) => self.index_of(k),
        }
    }

    /// Returns the realized value at the given position, if present.
    pub fn get<'a>(&self, position: impl Into<PipelineRef<'a>>) -> Option<&T> {
        let index = match position.into() {
            PipelineRef::Index(i) => i,
            PipelineRef::Key(k) => self.index_of(k)?,
        };
        self.entries.get(index).map(|e| e.value.get())
    }

    /// Returns the entry keys in pipeline order.
    pub fn keys(&self) -> Vec<&Key> {
        self.entries.iter().map(|e| &e.key).collect()
    }

    /// Iterates over `(key, realized value)` pairs in pipeline order.
    ///
    /// Deferred values are forced at this point.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &T)> {
        self.entries.iter().map(|e| (&e.key, e.value.get()))
    }

    /// Whether the pipeline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns a new pipeline with this pipeline's entries followed by
    /// `other`'s entries. Neither input is mutated; realized state is
    /// shared with the originals.
    pub fn merge(&self, other: &Self) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + other.entries.len());
        entries.extend(self.entries.iter().cloned());
        entries.extend(other.entries.iter().cloned());
        Pipeline { entries }
    }

    fn resolve(&self, position: PipelineRef<'_>) -> Result<usize> {
        match position {
            PipelineRef::Index(i) if i <= self.entries.len() => Ok(i),
            PipelineRef::Index(i) => Err(Error::UnknownKey { key: i.to_string() }),
            PipelineRef::Key(k) => self.index_of(k).ok_or_else(|| Error::UnknownKey {
                key: k.to_string(),
            }),
        }
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key.as_str() == key)
    }
}

impl<T: Clone> Pipeline<T> {
    /// Returns the realized values in pipeline order.
    ///
    /// Deferred values are forced at this point.
    pub fn values(&self) -> Vec<T> {
        self.entries.iter().map(|e| e.value.get().clone()).collect()
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Pipeline::new()
    }
}

// Debug prints keys only: values are often trait objects without Debug.
impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.key))
            .finish()
    }
}
