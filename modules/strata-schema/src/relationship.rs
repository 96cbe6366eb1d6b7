//! Parent/child links between attributes.

use crate::error::SchemaError;
use crate::references::SchemaObjectReference;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    OneToOne,
    #[default]
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// The child side of a relationship: one attribute or a joint set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipChild {
    #[serde(rename = "child")]
    Single(SchemaObjectReference),
    #[serde(rename = "jointChild")]
    Joint(Vec<SchemaObjectReference>),
}

impl RelationshipChild {
    /// Same attribute, or same set of attributes, compared by object id.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) => a.object_id == b.object_id,
            (Self::Joint(a), Self::Joint(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| y.object_id == x.object_id))
            }
            _ => false,
        }
    }

    /// Printable name of the child, `[a, b]` for joint children.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Single(child) => child.label().to_owned(),
            Self::Joint(children) => {
                let names: Vec<_> = children.iter().map(SchemaObjectReference::label).collect();
                format!("[{}]", names.join(", "))
            }
        }
    }

    #[must_use]
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::Joint(_))
    }
}

/// One parent/child link, with the table that relates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship_type: RelationshipType,
    pub relationship_table: SchemaObjectReference,
    pub parent: SchemaObjectReference,
    #[serde(flatten)]
    pub child: RelationshipChild,
}

impl Relationship {
    #[must_use]
    pub fn new(
        relationship_type: RelationshipType,
        relationship_table: SchemaObjectReference,
        parent: SchemaObjectReference,
        child: RelationshipChild,
    ) -> Self {
        Self {
            relationship_type,
            relationship_table,
            parent,
            child,
        }
    }
}

/// Selects the child side of a relationship to add or remove.
///
/// Exactly one of `child` and `joint_child` must be given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildSelector {
    pub child: Option<SchemaObjectReference>,
    pub joint_child: Option<Vec<SchemaObjectReference>>,
}

impl ChildSelector {
    #[must_use]
    pub fn child(child: SchemaObjectReference) -> Self {
        Self {
            child: Some(child),
            joint_child: None,
        }
    }

    #[must_use]
    pub fn joint(children: Vec<SchemaObjectReference>) -> Self {
        Self {
            child: None,
            joint_child: Some(children),
        }
    }

    /// # Errors
    /// Returns `SchemaError::InvalidInput` unless exactly one side is given.
    pub fn resolve(self) -> Result<RelationshipChild, SchemaError> {
        match (self.child, self.joint_child) {
            (Some(child), None) => Ok(RelationshipChild::Single(child)),
            (None, Some(children)) if !children.is_empty() => Ok(RelationshipChild::Joint(children)),
            _ => Err(SchemaError::invalid_input(
                "Please specify either 'child' or 'joint_child' parameter.",
            )),
        }
    }
}

/// Outcome of a relationship mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipChange {
    /// The relationship list was changed and republished.
    Applied,
    /// The relationship already existed; nothing was sent.
    Skipped,
    /// No matching relationship to remove; nothing was sent.
    NotFound,
}
