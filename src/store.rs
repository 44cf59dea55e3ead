use bytes::{Bytes, BytesMut};
use num_traits::{CheckedAdd, Zero};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// The Store holds the two keyspaces served by the database: plain string keys and hashes.
///
/// Each keyspace sits behind its own read/write lock, so hash commands never wait on string
/// commands and the other way around. The store is cheap to clone and every clone refers to the
/// same underlying tables, which is how connections share it.
///
/// No command needs both tables at once. Anything that does in the future must take the string
/// lock before the hash lock.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<InnerStore>,
}

#[derive(Default)]
struct InnerStore {
    strings: RwLock<Strings>,
    hashes: RwLock<Hashes>,
}

impl Store {
    pub fn new() -> Store {
        Self::default()
    }

    pub fn strings(&self) -> RwLockReadGuard<'_, Strings> {
        self.inner.strings.read()
    }

    pub fn strings_mut(&self) -> RwLockWriteGuard<'_, Strings> {
        self.inner.strings.write()
    }

    pub fn hashes(&self) -> RwLockReadGuard<'_, Hashes> {
        self.inner.hashes.read()
    }

    pub fn hashes_mut(&self) -> RwLockWriteGuard<'_, Hashes> {
        self.inner.hashes.write()
    }
}

#[derive(Debug, PartialEq)]
pub enum IncrError {
    NotAnInteger,
    Overflow,
}

impl IncrError {
    pub fn message(&self) -> &'static str {
        match self {
            IncrError::NotAnInteger => "ERR value is not an integer or out of range",
            IncrError::Overflow => "ERR increment or decrement would overflow",
        }
    }
}

/// Parses `current` (absent counts as zero), adds `increment` and returns the new value.
fn checked_incr<T>(current: Option<&Bytes>, increment: T) -> Result<T, IncrError>
where
    T: FromStr + CheckedAdd + Zero,
{
    let value = match current {
        Some(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse::<T>().ok())
            .ok_or(IncrError::NotAnInteger)?,
        None => T::zero(),
    };

    value.checked_add(&increment).ok_or(IncrError::Overflow)
}

type Key = String;

/// Key to string value table.
#[derive(Default)]
pub struct Strings {
    keys: HashMap<Key, Bytes>,
}

impl Strings {
    pub fn get(&self, key: &str) -> Option<&Bytes> {
        self.keys.get(key)
    }

    pub fn set(&mut self, key: Key, data: Bytes) {
        self.keys.insert(key, data);
    }

    pub fn remove(&mut self, key: &str) -> Option<Bytes> {
        self.keys.remove(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.keys.keys()
    }

    pub fn append(&mut self, key: Key, data: &[u8]) {
        let value = match self.keys.remove(&key) {
            Some(existing) => {
                let mut value = BytesMut::with_capacity(existing.len() + data.len());
                value.extend_from_slice(&existing);
                value.extend_from_slice(data);
                value.freeze()
            }
            None => Bytes::copy_from_slice(data),
        };

        self.keys.insert(key, value);
    }

    /// Moves the value under `from` to `to`. A missing `from` leaves `to` holding an empty
    /// string, the same thing a lookup miss reads as.
    pub fn rename(&mut self, from: &str, to: Key) {
        let value = self.keys.remove(from).unwrap_or_default();
        self.keys.insert(to, value);
    }

    pub fn incr_by<T>(&mut self, key: &str, increment: T) -> Result<T, IncrError>
    where
        T: FromStr + ToString + CheckedAdd + Zero,
    {
        let value = checked_incr(self.get(key), increment)?;
        self.set(key.to_string(), value.to_string().into());

        Ok(value)
    }
}

/// Hash name to field table. A hash stays around once created, even when all of its fields are
/// deleted.
#[derive(Default)]
pub struct Hashes {
    hashes: HashMap<Key, HashMap<String, Bytes>>,
}

impl Hashes {
    pub fn get(&self, hash: &str) -> Option<&HashMap<String, Bytes>> {
        self.hashes.get(hash)
    }

    pub fn get_field(&self, hash: &str, field: &str) -> Option<&Bytes> {
        self.hashes.get(hash).and_then(|fields| fields.get(field))
    }

    pub fn set_field(&mut self, hash: Key, field: String, data: Bytes) {
        self.hashes.entry(hash).or_default().insert(field, data);
    }

    /// Removes a field without ever creating the hash.
    pub fn remove_field(&mut self, hash: &str, field: &str) -> Option<Bytes> {
        self.hashes
            .get_mut(hash)
            .and_then(|fields| fields.remove(field))
    }

    pub fn field_exists(&self, hash: &str, field: &str) -> bool {
        self.get_field(hash, field).is_some()
    }

    pub fn exists(&self, hash: &str) -> bool {
        self.hashes.contains_key(hash)
    }

    pub fn size(&self) -> usize {
        self.hashes.len()
    }

    pub fn incr_field_by<T>(&mut self, hash: &str, field: &str, increment: T) -> Result<T, IncrError>
    where
        T: FromStr + ToString + CheckedAdd + Zero,
    {
        let value = checked_incr(self.get_field(hash, field), increment)?;
        self.set_field(hash.to_string(), field.to_string(), value.to_string().into());

        Ok(value)
    }
}
