//! Column expressions of attribute forms.

use crate::references::SchemaObjectReference;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the server renders expressions in responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionFormat {
    #[default]
    Tree,
    Tokens,
}

impl ExpressionFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Tokens => "tokens",
        }
    }
}

impl std::fmt::Display for ExpressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expression as the modeling service returns it.
///
/// The tree and token forms are kept as raw JSON; the SDK only moves them
/// between the server and the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Value>>,
}

impl Expression {
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// An expression together with the tables it can be evaluated on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub expression: Expression,
    #[serde(default)]
    pub tables: Vec<SchemaObjectReference>,
}

impl FactExpression {
    #[must_use]
    pub fn new(expression: Expression, tables: Vec<SchemaObjectReference>) -> Self {
        Self {
            id: None,
            expression,
            tables,
        }
    }

    #[must_use]
    pub fn uses_table(&self, table: &SchemaObjectReference) -> bool {
        self.tables.iter().any(|t| t.object_id == table.object_id)
    }
}
