//! Attribute definitions to be created or written, and the request bodies
//! built from them.

use crate::error::SchemaError;
use crate::expression::ExpressionFormat;
use crate::form::AttributeForm;
use crate::references::{
    AttributeDisplays, AttributeSorts, FormReference, ObjectSubType, SchemaObjectReference,
};
use crate::validation::{validate_displays, validate_key_form, validate_sorts};
use serde::Serialize;
use serde_json::Value;
use strata_sdk::json::to_body;

/// Full definition of an attribute, used by `create`, `create_many` and
/// `update_many`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeData {
    pub name: String,
    pub sub_type: ObjectSubType,
    pub destination_folder_id: String,
    pub forms: Vec<AttributeForm>,
    /// Derived automatically when there is a single form.
    pub key_form: Option<FormReference>,
    /// Filled with every form when absent.
    pub displays: Option<AttributeDisplays>,
    pub description: Option<String>,
    pub is_embedded: bool,
    pub attribute_lookup_table: Option<SchemaObjectReference>,
    pub sorts: Option<AttributeSorts>,
    pub show_expression_as: ExpressionFormat,
    /// Only `Some(true)` causes a follow-up write; new attributes are visible.
    pub hidden: Option<bool>,
}

impl AttributeData {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        destination_folder_id: impl Into<String>,
        forms: Vec<AttributeForm>,
    ) -> Self {
        Self {
            name: name.into(),
            sub_type: ObjectSubType::Attribute,
            destination_folder_id: destination_folder_id.into(),
            forms,
            key_form: None,
            displays: None,
            description: None,
            is_embedded: false,
            attribute_lookup_table: None,
            sorts: None,
            show_expression_as: ExpressionFormat::default(),
            hidden: None,
        }
    }

    #[must_use]
    pub fn key_form(mut self, key_form: FormReference) -> Self {
        self.key_form = Some(key_form);
        self
    }

    #[must_use]
    pub fn displays(mut self, displays: AttributeDisplays) -> Self {
        self.displays = Some(displays);
        self
    }

    #[must_use]
    pub fn sorts(mut self, sorts: AttributeSorts) -> Self {
        self.sorts = Some(sorts);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn lookup_table(mut self, table: SchemaObjectReference) -> Self {
        self.attribute_lookup_table = Some(table);
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    #[must_use]
    pub fn show_expression_as(mut self, format: ExpressionFormat) -> Self {
        self.show_expression_as = format;
        self
    }

    /// Validate the definition and build the request body.
    ///
    /// # Errors
    /// Returns `SchemaError::Validation` if forms, key form, displays and
    /// sorts do not fit together.
    pub fn to_body(&self) -> Result<Value, SchemaError> {
        let key_form = validate_key_form(self.key_form.as_ref(), &self.forms, None)?;
        let displays = validate_displays(self.displays.clone(), &self.forms)?;
        let sorts = validate_sorts(self.sorts.clone(), &self.forms)?;

        AttributeBody {
            information: InformationBody {
                name: Some(self.name.clone()),
                sub_type: Some(self.sub_type),
                is_embedded: Some(self.is_embedded),
                description: self.description.clone(),
                destination_folder_id: Some(self.destination_folder_id.clone()),
            },
            forms: Some(self.forms.clone()),
            attribute_lookup_table: self.attribute_lookup_table.clone(),
            key_form: Some(key_form),
            displays: Some(displays),
            sorts,
        }
        .into_json()
    }
}

/// Validated create request of one attribute in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAttributeDto {
    pub body: Value,
    pub show_expression_as: ExpressionFormat,
}

impl TryFrom<&AttributeData> for CreateAttributeDto {
    type Error = SchemaError;

    fn try_from(data: &AttributeData) -> Result<Self, Self::Error> {
        Ok(Self {
            body: data.to_body()?,
            show_expression_as: data.show_expression_as,
        })
    }
}

/// Validated update request of one existing attribute in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttributeDto {
    pub id: String,
    pub body: Value,
    pub show_expression_as: ExpressionFormat,
}

impl UpdateAttributeDto {
    /// # Errors
    /// Returns `SchemaError::Validation` if `data` is inconsistent.
    pub fn new(id: impl Into<String>, data: &AttributeData) -> Result<Self, SchemaError> {
        Ok(Self {
            id: id.into(),
            body: data.to_body()?,
            show_expression_as: data.show_expression_as,
        })
    }
}

/// Body of the attribute create and update routes.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttributeBody {
    #[serde(skip_serializing_if = "InformationBody::is_empty")]
    pub information: InformationBody,
    pub forms: Option<Vec<AttributeForm>>,
    pub attribute_lookup_table: Option<SchemaObjectReference>,
    pub key_form: Option<FormReference>,
    pub displays: Option<AttributeDisplays>,
    pub sorts: Option<AttributeSorts>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InformationBody {
    pub name: Option<String>,
    pub sub_type: Option<ObjectSubType>,
    pub is_embedded: Option<bool>,
    pub description: Option<String>,
    pub destination_folder_id: Option<String>,
}

impl InformationBody {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl AttributeBody {
    /// Serialize with every `null` removed.
    pub(crate) fn into_json(self) -> Result<Value, SchemaError> {
        Ok(to_body(&self)?)
    }
}
