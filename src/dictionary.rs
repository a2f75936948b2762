use indexmap::IndexMap;

use crate::error::Result;
use crate::object::Object;
use crate::Error;

/// A PDF dictionary: `/Name` keys mapping to `Object` values.
///
/// Semantically a set, but an [`indexmap::IndexMap`] is used so that the
/// writer can emit keys in their original insertion order (some downstream
/// readers are sensitive to key order even though the spec is not).
/// Equality and lookups never depend on that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary(IndexMap<Vec<u8>, Object>);

impl Dictionary {
    pub fn new() -> Self {
        Dictionary(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, key: &[u8]) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &[u8]) -> Result<&Object> {
        self.0.get(key).ok_or(Error::MissingRequiredEntry("dictionary key"))
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Result<&mut Object> {
        self.0.get_mut(key).ok_or(Error::MissingRequiredEntry("dictionary key"))
    }

    pub fn set<K, V>(&mut self, key: K, value: V) -> Option<Object>
    where
        K: Into<Vec<u8>>,
        V: Into<Object>,
    {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Object> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &Object)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Vec<u8>, &mut Object)> {
        self.0.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.0.keys()
    }

    /// Value of `/Type`, if present, as a bare name.
    pub fn get_type(&self) -> Result<&[u8]> {
        self.get(b"Type").and_then(Object::as_name)
    }

    pub fn has_type(&self, type_name: &[u8]) -> bool {
        matches!(self.get_type(), Ok(t) if t == type_name)
    }

    /// Value of `/Subtype`, if present, as a bare name.
    pub fn get_subtype(&self) -> Result<&[u8]> {
        self.get(b"Subtype").and_then(Object::as_name)
    }
}

impl IntoIterator for Dictionary {
    type Item = (Vec<u8>, Object);
    type IntoIter = indexmap::map::IntoIter<Vec<u8>, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Build a [`Dictionary`] with a map-literal-like syntax.
///
/// ```ignore
/// let dict = dictionary! {
///     "Type" => "Page",
///     "Count" => 3,
/// };
/// ```
#[macro_export]
macro_rules! dictionary {
    () => { $crate::Dictionary::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut dict = $crate::Dictionary::new();
        $(dict.set($key, $value);)*
        dict
    }};
}
