//! Hierarchical identifiers for elements and their states/parameters.
//!
//! An element nested in a unit nested in a node is addressed by the full
//! path of ids (`node-1/unit-1/R`). State and parameter names stay local to
//! the element and are only qualified when viewed from outside, so two
//! reservoirs called `R` in different units never collide.

use core::fmt;

use crate::error::{CoreError, CoreResult};

/// Separator used when a path is rendered as text.
pub const PATH_SEPARATOR: char = '/';

/// Separator between a path and a local name in a [`QualifiedKey`].
pub const KEY_SEPARATOR: char = ':';

/// Ordered list of element ids from the outermost container to the element.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementPath(Vec<String>);

impl ElementPath {
    /// Path consisting of a single id.
    pub fn root(id: impl Into<String>) -> CoreResult<Self> {
        let id = validate_id(id.into())?;
        Ok(Self(vec![id]))
    }

    /// Path of an element contained in `self`.
    pub fn child(&self, id: impl Into<String>) -> CoreResult<Self> {
        let id = validate_id(id.into())?;
        let mut segments = self.0.clone();
        segments.push(id);
        Ok(Self(segments))
    }

    /// Re-root this path under `parent` (used when an element is placed in a container).
    pub fn nested_in(&self, parent: &ElementPath) -> Self {
        let mut segments = parent.0.clone();
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// Innermost id.
    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// True if `other` is this path or lies below it.
    pub fn contains(&self, other: &ElementPath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// Qualify a local state/parameter name with this path.
    pub fn key(&self, name: impl Into<String>) -> QualifiedKey {
        QualifiedKey {
            path: self.clone(),
            name: name.into(),
        }
    }
}

fn validate_id(id: String) -> CoreResult<String> {
    if id.is_empty() {
        return Err(CoreError::InvalidId {
            id,
            what: "id must not be empty",
        });
    }
    if id.contains(PATH_SEPARATOR) || id.contains(KEY_SEPARATOR) {
        return Err(CoreError::InvalidId {
            id,
            what: "id must not contain '/' or ':'",
        });
    }
    Ok(id)
}

impl fmt::Debug for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementPath({self})")
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Local state or parameter name scoped by the owning element's path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedKey {
    pub path: ElementPath,
    pub name: String,
}

impl QualifiedKey {
    /// Parse `a/b/c:name`.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let (path, name) = text
            .rsplit_once(KEY_SEPARATOR)
            .ok_or_else(|| CoreError::InvalidId {
                id: text.to_string(),
                what: "qualified key must look like 'path:name'",
            })?;
        if name.is_empty() {
            return Err(CoreError::InvalidId {
                id: text.to_string(),
                what: "qualified key has an empty name",
            });
        }
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next().unwrap_or("");
        let mut element = ElementPath::root(first)?;
        for segment in segments {
            element = element.child(segment)?;
        }
        Ok(element.key(name))
    }

    /// True if the key belongs to the element at `path` exactly.
    pub fn belongs_to(&self, path: &ElementPath) -> bool {
        &self.path == path
    }
}

impl fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.path, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths_render_outermost_first() {
        let node = ElementPath::root("node-1").unwrap();
        let r = node.child("unit-1").unwrap().child("R").unwrap();
        assert_eq!(r.to_string(), "node-1/unit-1/R");
        assert_eq!(r.id(), "R");
        assert_eq!(r.depth(), 3);
        assert!(node.contains(&r));
        assert!(!r.contains(&node));
    }

    #[test]
    fn same_local_name_in_different_units_does_not_collide() {
        let a = ElementPath::root("unit-1").unwrap().child("R").unwrap();
        let b = ElementPath::root("unit-2").unwrap().child("R").unwrap();
        assert_ne!(a.key("S0"), b.key("S0"));
        assert_eq!(a.key("S0").name, b.key("S0").name);
    }

    #[test]
    fn ids_with_separators_are_rejected() {
        assert!(ElementPath::root("").is_err());
        assert!(ElementPath::root("a/b").is_err());
        assert!(ElementPath::root("a:b").is_err());
        // underscores are fine: keys are never split on them
        assert!(ElementPath::root("fast_reservoir").is_ok());
    }

    #[test]
    fn qualified_key_round_trips_through_text() {
        let key = ElementPath::root("node-1")
            .unwrap()
            .child("UR")
            .unwrap()
            .key("S0");
        let parsed = QualifiedKey::parse(&key.to_string()).unwrap();
        assert_eq!(parsed, key);
        assert!(QualifiedKey::parse("no-separator").is_err());
        assert!(QualifiedKey::parse("a/b:").is_err());
    }

    #[test]
    fn nested_in_prepends_parent() {
        let r = ElementPath::root("R").unwrap();
        let unit = ElementPath::root("unit-1").unwrap();
        assert_eq!(r.nested_in(&unit).to_string(), "unit-1/R");
    }
}
