//! Code for handling IDs
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::fmt::Display;
use std::hash::Hash;

/// A trait alias for ID types
pub trait IDLike: Eq + Hash + Borrow<str> + Clone + Display + From<String> {}
impl<T> IDLike for T where T: Eq + Hash + Borrow<str> + Clone + Display + From<String> {}

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            std::hash::Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            serde::Deserialize,
            Debug,
            serde::Serialize,
        )]
        /// An ID type (e.g. `ResourceID`, `ProductID`, etc.)
        pub struct $name(pub std::rc::Rc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl $name {
            /// Create a new ID from a string slice
            pub fn new(id: &str) -> Self {
                $name(std::rc::Rc::from(id))
            }
        }
    };
}
pub(crate) use define_id_type;

#[cfg(test)]
define_id_type!(GenericID);

/// A data structure keyed by IDs
pub trait IDCollection<ID: IDLike> {
    /// Get the ID from the collection by its string representation.
    ///
    /// # Arguments
    ///
    /// * `id` - The string representation of the ID
    ///
    /// # Returns
    ///
    /// A copy of the ID in `self`, or an error if not found.
    fn get_id(&self, id: &str) -> Result<ID>;
}

impl<ID: IDLike, V> IDCollection<ID> for IndexMap<ID, V> {
    fn get_id(&self, id: &str) -> Result<ID> {
        let (found, _) = self
            .get_key_value(id)
            .with_context(|| format!("Unknown ID {id} found"))?;
        Ok(found.clone())
    }
}

/// Build an [`IndexMap`] keyed by ID, checking that IDs are non-empty and unique.
///
/// # Arguments
///
/// * `iter` - The items to collect, along with their IDs
/// * `kind` - A description of the items for error messages (e.g. "resource")
pub fn collect_unique<ID, V, I>(iter: I, kind: &str) -> Result<IndexMap<ID, V>>
where
    ID: IDLike,
    I: IntoIterator<Item = (ID, V)>,
{
    let mut map = IndexMap::new();
    for (id, value) in iter {
        let id_str: &str = id.borrow();
        ensure!(!id_str.trim().is_empty(), "Empty {kind} ID found");
        ensure!(!map.contains_key(id_str), "Duplicate {kind} ID found: {id}");
        map.insert(id, value);
    }

    Ok(map)
}
