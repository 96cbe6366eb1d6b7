use super::data::AttributeBody;
use super::{Attribute, Write};
use crate::error::SchemaError;
use crate::expression::{Expression, FactExpression};
use crate::form::{AttributeForm, FormUpdate, NewForm, missing_form_source};
use crate::references::{FormReference, SchemaObjectReference};
use crate::validation::{remove_form_from_displays, remove_form_from_sorts, validate_key_form};

const REPLACE_KEY_FORM_MESSAGE: &str =
    "You are trying to delete the current key form. Please choose new key form.";

/// A form to add: complete, or built from fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FormSource {
    Prebuilt(AttributeForm),
    New(NewForm),
}

impl From<AttributeForm> for FormSource {
    fn from(form: AttributeForm) -> Self {
        Self::Prebuilt(form)
    }
}

impl From<NewForm> for FormSource {
    fn from(form: NewForm) -> Self {
        Self::New(form)
    }
}

impl Attribute {
    /// Form of the loaded definition, by id or else by name.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` if neither is given.
    pub fn get_form(
        &self,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<&AttributeForm>, SchemaError> {
        let forms = self.forms();
        match (id, name) {
            (Some(id), _) => Ok(forms.iter().find(|f| f.id.as_deref() == Some(id))),
            (None, Some(name)) => Ok(forms.iter().find(|f| f.name == name)),
            (None, None) => Err(SchemaError::invalid_input("Provide id or name.")),
        }
    }

    /// Fact expression `expression_id` of the form selected by id or name.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` if neither form id nor name is given.
    pub fn get_fact_expression(
        &self,
        expression_id: &str,
        form_id: Option<&str>,
        form_name: Option<&str>,
    ) -> Result<Option<&FactExpression>, SchemaError> {
        Ok(self
            .get_form(form_id, form_name)?
            .and_then(|form| form.get_fact_expression(expression_id)))
    }

    /// Add a form and republish the forms.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` if a new form lacks expressions or
    /// lookup table.
    pub async fn add_form(&mut self, source: impl Into<FormSource>) -> Result<(), SchemaError> {
        let form = match source.into() {
            FormSource::Prebuilt(form) => form,
            FormSource::New(new) => AttributeForm::local_create(new)?,
        };
        self.ensure_definition().await?;
        let mut forms = self.forms().to_vec();
        forms.push(form);
        self.publish_forms(forms).await
    }

    /// Remove form `form_id`, and its first reference in each display and
    /// sort list.
    ///
    /// Removing the key form requires `new_key_form`; with a single form
    /// left, that form becomes the key form.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` for an unknown form and
    /// `SchemaError::Validation` when removing the last form or the key form
    /// without a valid replacement.
    pub async fn remove_form(
        &mut self,
        form_id: &str,
        new_key_form: Option<FormReference>,
    ) -> Result<(), SchemaError> {
        self.ensure_definition().await?;

        let (removed, remaining): (Vec<_>, Vec<_>) = self
            .forms()
            .iter()
            .cloned()
            .partition(|form| form.id.as_deref() == Some(form_id));
        let Some(removed) = removed.into_iter().next() else {
            return Err(SchemaError::invalid_input(format!(
                "Attribute with ID {} does not contain attribute form with ID {form_id}.",
                self.id
            )));
        };
        if remaining.is_empty() {
            return Err(SchemaError::validation("You can not delete the last attribute form"));
        }

        let current_key = self.key_form().cloned();
        let removes_key = current_key
            .as_ref()
            .is_some_and(|key| removed.is_referenced_by(key));
        let candidate = new_key_form.or(current_key);
        let message = removes_key.then_some(REPLACE_KEY_FORM_MESSAGE);
        let key_form = validate_key_form(candidate.as_ref(), &remaining, message)?;

        let displays = remove_form_from_displays(&removed, &remaining, self.displays().cloned())?;
        let sorts = remove_form_from_sorts(&removed, &remaining, self.sorts().cloned())?;

        let body = AttributeBody {
            forms: Some(remaining),
            key_form: Some(key_form),
            displays: Some(displays),
            sorts,
            ..AttributeBody::default()
        }
        .into_json()?;
        self.write(Write {
            definition: Some(body),
            ..Write::default()
        })
        .await
    }

    /// Change properties of form `form_id` and republish the forms.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` for an unknown form.
    pub async fn alter_form(&mut self, form_id: &str, update: FormUpdate) -> Result<(), SchemaError> {
        self.alter_form_with_id(form_id, |form| {
            form.local_alter(update);
            Ok(())
        })
        .await
    }

    /// # Errors
    /// Returns `SchemaError::InvalidInput` for an unknown form or expression.
    pub async fn alter_fact_expression(
        &mut self,
        form_id: &str,
        fact_expression_id: &str,
        expression: Option<Expression>,
        tables: Option<Vec<SchemaObjectReference>>,
    ) -> Result<(), SchemaError> {
        self.alter_form_with_id(form_id, |form| {
            form.alter_fact_expression(fact_expression_id, expression, tables)
        })
        .await
    }

    /// # Errors
    /// Returns `SchemaError::InvalidInput` for an unknown form or a duplicate
    /// expression id.
    pub async fn add_fact_expression(
        &mut self,
        form_id: &str,
        expression: FactExpression,
    ) -> Result<(), SchemaError> {
        self.alter_form_with_id(form_id, |form| form.add_fact_expression(expression))
            .await
    }

    /// Remove a fact expression from form `form_id`.
    ///
    /// `new_lookup_table` is required when the remaining expressions no
    /// longer use the form's lookup table.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` for an unknown form or expression,
    /// or when the lookup table cannot be kept.
    pub async fn remove_fact_expression(
        &mut self,
        form_id: &str,
        fact_expression_id: &str,
        new_lookup_table: Option<SchemaObjectReference>,
    ) -> Result<(), SchemaError> {
        self.alter_form_with_id(form_id, |form| {
            form.remove_fact_expression(fact_expression_id, new_lookup_table)
        })
        .await
    }

    async fn alter_form_with_id(
        &mut self,
        form_id: &str,
        change: impl FnOnce(&mut AttributeForm) -> Result<(), SchemaError>,
    ) -> Result<(), SchemaError> {
        self.ensure_definition().await?;
        let mut forms = self.forms().to_vec();
        let form = forms
            .iter_mut()
            .find(|form| form.id.as_deref() == Some(form_id))
            .ok_or_else(|| {
                SchemaError::invalid_input(format!(
                    "Attribute Form with ID: {form_id} has not been found."
                ))
            })?;
        change(form)?;
        self.publish_forms(forms).await
    }

    async fn publish_forms(&mut self, forms: Vec<AttributeForm>) -> Result<(), SchemaError> {
        if forms.is_empty() {
            return Err(missing_form_source());
        }
        let body = AttributeBody {
            forms: Some(forms),
            ..AttributeBody::default()
        }
        .into_json()?;
        self.write(Write {
            definition: Some(body),
            ..Write::default()
        })
        .await
    }
}
