//! Value objects that point at schema objects and attribute forms.

use serde::{Deserialize, Serialize};

/// Modeling subtype of a schema object, as the modeling routes spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectSubType {
    Attribute,
    AttributeRole,
    AttributeTransformation,
    AttributeAbstract,
    AttributeRecursive,
    AttributeFormSystem,
    AttributeFormNormal,
    LogicalTable,
    PhysicalTable,
    Column,
    Fact,
    Folder,
    /// Any subtype this SDK does not model.
    #[serde(other)]
    Unknown,
}

/// Reference to another metadata object (table, attribute, column).
///
/// Plain value: equal when every field is equal, hashable so that table
/// sets can be deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObjectReference {
    pub object_id: String,
    pub sub_type: ObjectSubType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_embedded: bool,
}

impl SchemaObjectReference {
    #[must_use]
    pub fn new(object_id: impl Into<String>, sub_type: ObjectSubType) -> Self {
        Self {
            object_id: object_id.into(),
            sub_type,
            name: None,
            is_embedded: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name when known, object id otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.object_id)
    }
}

/// Pointer to an attribute form by id, by name, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FormReference {
    #[must_use]
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Two references point at the same form if either their ids or their
    /// names match.
    #[must_use]
    pub fn same_form(&self, other: &Self) -> bool {
        let ids = matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b);
        let names = matches!((&self.name, &other.name), (Some(a), Some(b)) if a == b);
        ids || names
    }
}

/// Forms shown in reports and while browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDisplays {
    #[serde(default)]
    pub report_displays: Vec<FormReference>,
    #[serde(default)]
    pub browse_displays: Vec<FormReference>,
}

impl AttributeDisplays {
    #[must_use]
    pub fn new(report_displays: Vec<FormReference>, browse_displays: Vec<FormReference>) -> Self {
        Self {
            report_displays,
            browse_displays,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSort {
    pub form: FormReference,
    #[serde(default = "ascending_default")]
    pub ascending: bool,
}

fn ascending_default() -> bool {
    true
}

impl AttributeSort {
    #[must_use]
    pub fn ascending(form: FormReference) -> Self {
        Self {
            form,
            ascending: true,
        }
    }

    #[must_use]
    pub fn descending(form: FormReference) -> Self {
        Self {
            form,
            ascending: false,
        }
    }
}

/// Report and browse sort orders. Either list may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSorts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_sorts: Option<Vec<AttributeSort>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browse_sorts: Option<Vec<AttributeSort>>,
}

impl AttributeSorts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.report_sorts.is_none() && self.browse_sorts.is_none()
    }

    /// Form references of both lists.
    pub fn forms(&self) -> impl Iterator<Item = &FormReference> {
        self.report_sorts
            .iter()
            .chain(self.browse_sorts.iter())
            .flatten()
            .map(|sort| &sort.form)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Integer,
    Unsigned,
    Numeric,
    Decimal,
    Real,
    Double,
    Float,
    Char,
    VarChar,
    LongVarChar,
    Binary,
    VarBin,
    Date,
    Time,
    TimeStamp,
    NChar,
    NVarChar,
    Bool,
    BigDecimal,
    Int64,
    #[serde(other)]
    Unknown,
}

/// SQL column type of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataType {
    #[serde(rename = "type")]
    pub kind: DataKind,
    pub precision: u32,
    pub scale: i32,
}
