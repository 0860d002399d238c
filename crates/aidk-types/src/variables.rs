//! Settable variables: named [`TypedValue`]s exposed by the AI service.
//!
//! - [`VariableSet`] – plain name → value map.  Used both for what the
//!   service reports and for what the caller wants to change.
//! - [`SettableVariables`] – read-only snapshot of the service's current
//!   values.  Its kinds form the schema that every request is validated
//!   against before submission.
//! - [`Response`] – structured `{error_code, error_msg}` acknowledgement.
//!
//! # Example
//!
//! ```
//! use aidk_types::variables::{SettableVariables, VariableSet};
//!
//! let current = VariableSet::new()
//!     .with("extern_scalar", 1.0_f32)
//!     .with("extern_text", String::from("hello"));
//! let vars = SettableVariables::new(current);
//!
//! // Double for a float declaration is accepted.
//! let ok = VariableSet::new().with("extern_scalar", 3.141592653589793_f64);
//! assert!(vars.request(&ok).is_ok());
//!
//! // Text for a float declaration is rejected.
//! let bad = VariableSet::new().with("extern_scalar", String::from("abc"));
//! assert_ne!(vars.request(&bad).error_code, 0);
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::AidkError;
use crate::value::{Primitive, TypedValue, ValueKind};

// ────────────────────────────────────────────────────────────────────────────
// Response
// ────────────────────────────────────────────────────────────────────────────

/// Acknowledgement returned by variable submission and other service calls.
///
/// `error_code == 0` means success.  The default is a generic failure, so a
/// response that was never filled in does not read as success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub error_code: i32,
    pub error_msg: String,
}

impl Response {
    /// Successful acknowledgement with an empty message.
    pub fn ok() -> Self {
        Self {
            error_code: 0,
            error_msg: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error_code == 0
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            error_code: 1,
            error_msg: String::new(),
        }
    }
}

impl From<AidkError> for Response {
    fn from(err: AidkError) -> Self {
        Self {
            error_code: err.code(),
            error_msg: err.to_string(),
        }
    }
}

impl From<Result<(), AidkError>> for Response {
    fn from(result: Result<(), AidkError>) -> Self {
        match result {
            Ok(()) => Response::ok(),
            Err(e) => e.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// VariableSet
// ────────────────────────────────────────────────────────────────────────────

/// Mapping from variable name to [`TypedValue`].  Names are unique; order is
/// irrelevant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet {
    values: HashMap<String, TypedValue>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a primitive value.
    pub fn with<T: Primitive>(mut self, name: impl Into<String>, value: T) -> Self {
        self.set(name, value);
        self
    }

    /// Set `name` to `value`, replacing any previous entry.
    pub fn set<T: Primitive>(&mut self, name: impl Into<String>, value: T) {
        self.values.entry(name.into()).or_default().set(value);
    }

    /// Insert an already-built value.  Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: TypedValue) -> Option<TypedValue> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Variable names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<(String, TypedValue)> for VariableSet {
    fn from_iter<I: IntoIterator<Item = (String, TypedValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for VariableSet {
    type Item = (String, TypedValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, TypedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SettableVariables
// ────────────────────────────────────────────────────────────────────────────

/// Snapshot of the service's settable variables, as last fetched.
///
/// The kind of each current value is that variable's declared kind.  A
/// variable reported without a value declares no kind and rejects every
/// submission.
#[derive(Debug, Clone, Default)]
pub struct SettableVariables {
    current: VariableSet,
}

impl SettableVariables {
    pub fn new(current: VariableSet) -> Self {
        Self { current }
    }

    /// The values reported by the service.  Not live: reflects only the last
    /// fetch.
    pub fn current_values(&self) -> &VariableSet {
        &self.current
    }

    /// Declared kind per variable name.
    pub fn schema(&self) -> BTreeMap<&str, Option<ValueKind>> {
        self.current.iter().map(|(name, v)| (name, v.kind())).collect()
    }

    /// Check every entry of `request` against the schema.
    ///
    /// Entries are checked in name order and the first failure is returned.
    ///
    /// # Errors
    ///
    /// - [`AidkError::UnknownVariable`] – a name the service did not declare.
    /// - [`AidkError::VariableTypeMismatch`] – a value whose kind the
    ///   declaration does not accept (empty values included).
    /// - [`AidkError::VariableOutOfRange`] – a numeric value that is not
    ///   finite or does not fit the declared kind.
    pub fn validate(&self, request: &VariableSet) -> Result<(), AidkError> {
        self.coerce_all(request).map(drop)
    }

    /// Validate `request` and, if every entry passes, write it into the
    /// snapshot.  Numeric values are converted to the declared kind.  Nothing
    /// is written when validation fails.
    ///
    /// # Errors
    ///
    /// Same as [`SettableVariables::validate`].
    pub fn apply(&mut self, request: &VariableSet) -> Result<(), AidkError> {
        for (name, value) in self.coerce_all(request)? {
            self.current.insert(name, value);
        }
        Ok(())
    }

    /// Every request entry converted to its declared kind, in name order.
    fn coerce_all(&self, request: &VariableSet) -> Result<Vec<(String, TypedValue)>, AidkError> {
        let mut entries: Vec<(&str, &TypedValue)> = request.iter().collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
            .into_iter()
            .map(|(name, value)| self.coerce_one(name, value).map(|v| (name.to_string(), v)))
            .collect()
    }

    fn coerce_one(&self, name: &str, submitted: &TypedValue) -> Result<TypedValue, AidkError> {
        let declared = self
            .current
            .get(name)
            .ok_or_else(|| AidkError::UnknownVariable(name.to_string()))?
            .kind();
        match (declared, submitted.kind()) {
            (Some(kind), Some(found)) if kind.accepts(found) => {
                submitted.coerced(kind).ok_or_else(|| AidkError::VariableOutOfRange {
                    name: name.to_string(),
                    declared: kind,
                    value: submitted.to_string(),
                })
            }
            (declared, found) => Err(AidkError::VariableTypeMismatch {
                name: name.to_string(),
                declared,
                submitted: found,
            }),
        }
    }

    pub fn into_current(self) -> VariableSet {
        self.current
    }

    /// Validate `request` and report the outcome as a [`Response`].
    ///
    /// All-or-nothing: a single invalid entry voids the whole batch.
    pub fn request(&self, request: &VariableSet) -> Response {
        self.validate(request).into()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
