//! Construction-input values: the dynamic arguments and options a component
//! is built from.
//!
//! A component constructor receives a list of positional [`Value`]s plus an
//! [`OptionsMap`] of keyed values. Specs declared on the component's class
//! pick these apart at construction time; whatever is left over becomes plain
//! html attributes. `Symbol` is kept distinct from `Str` — bare atoms like
//! `sym("active")` are the usual currency of argument matching, while strings
//! normally carry free text.

/// A dynamically typed construction value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A bare atom, e.g. `sym("large")`. Compares unequal to `Str`.
    Symbol(String),
    /// Free text.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A keyed map of values.
    Map(OptionsMap),
}

/// The capability tag of a [`Value`], used by type conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Symbol,
    Str,
    List,
    Map,
}

impl Value {
    /// The capability tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Symbol(_) => Kind::Symbol,
            Self::Str(_) => Kind::Str,
            Self::List(_) => Kind::List,
            Self::Map(_) => Kind::Map,
        }
    }

    /// The textual form of this value, as seen by pattern conditions.
    pub fn text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Symbol(s) | Self::Str(s) => s.clone(),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::text).collect();
                parts.join(" ")
            }
            Self::Map(_) => String::new(),
        }
    }

    /// Whether this value counts as truthy (everything except `Bool(false)`).
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Bool(false))
    }

    /// Whether this value is "empty" for the purpose of attribute cleanup:
    /// empty strings, lists, and maps.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Symbol(s) | Self::Str(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            _ => false,
        }
    }
}

/// Shorthand for `Value::Symbol`.
pub fn sym(name: &str) -> Value {
    Value::Symbol(name.to_owned())
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<OptionsMap> for Value {
    fn from(map: OptionsMap) -> Self {
        Self::Map(map)
    }
}

// ---------------------------------------------------------------------------
// OptionsMap
// ---------------------------------------------------------------------------

/// An insertion-ordered, string-keyed map of [`Value`]s.
///
/// Option resolution and attribute serialization both depend on stable key
/// order, so this is a small ordered map rather than a hash map. Keys are
/// unique; inserting an existing key overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsMap {
    entries: Vec<(String, Value)>,
}

impl OptionsMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the map contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value, overwriting in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Remove and return the value under `key`, if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// The keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into `self`, overwriting existing keys.
    pub fn merge(&mut self, other: OptionsMap) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Drop entries whose values are empty (see [`Value::is_empty`]).
    pub fn drop_empty(&mut self) {
        self.entries.retain(|(_, v)| !v.is_empty());
    }
}

impl FromIterator<(String, Value)> for OptionsMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for OptionsMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Whether `name` is a plain identifier: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Spec names, section names, and child helper names must be identifiers.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ===========================================================================
// Tests
// ===========================================================================
