//! Ordered object paths from the document root.

use serde::{Serialize, Serializer};
use std::fmt;

/// Separator used when rendering paths in messages.
const PATH_SEPARATOR: &str = ">";

/// Ordered sequence of object names from the document root, e.g.
/// `Scenario>Site>PV`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(Vec<String>);

impl ObjectPath {
    /// Empty path addressing the document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path made of a single label that is not an object name (`Top Level`).
    pub fn label(label: impl Into<String>) -> Self {
        Self(vec![label.into()])
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Return a new path with `name` appended.
    pub fn child(&self, name: &str) -> Self {
        let mut names = self.0.clone();
        names.push(name.to_string());
        Self(names)
    }

    /// Path of the enclosing object, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Last object name in the path.
    pub fn tail(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn push(&mut self, name: &str) {
        self.0.push(name.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(PATH_SEPARATOR))
    }
}

impl Serialize for ObjectPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_with_angle_separator() {
        let path = ObjectPath::from_names(["Scenario", "Site", "PV"]);
        assert_eq!(path.to_string(), "Scenario>Site>PV");
        assert_eq!(path.tail(), Some("PV"));
        assert_eq!(
            path.parent().map(|p| p.to_string()),
            Some("Scenario>Site".to_string())
        );
    }

    #[test]
    fn root_has_no_parent() {
        assert_eq!(ObjectPath::root().parent(), None);
        assert_eq!(ObjectPath::root().to_string(), "");
    }
}
