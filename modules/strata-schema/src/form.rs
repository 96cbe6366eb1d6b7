//! Attribute forms and their local mutations.
//!
//! Mutations here only change the in-memory form. [`Attribute`] republishes
//! the whole forms collection afterwards.
//!
//! [`Attribute`]: crate::attribute::Attribute

use crate::error::SchemaError;
use crate::expression::{Expression, FactExpression};
use crate::references::{DataType, FormReference, SchemaObjectReference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    Number,
    Text,
    Picture,
    Url,
    Email,
    HtmlTag,
    Date,
    Time,
    Symbol,
    BigDecimal,
    PhoneNumber,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeographicalRole {
    None,
    City,
    State,
    Country,
    ZipCode,
    Latitude,
    Longitude,
    Location,
    County,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRole {
    None,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    Hour,
    Minute,
    Second,
    #[serde(other)]
    Unknown,
}

/// One form (ID, DESC, ...) of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeForm {
    /// Absent for forms built locally and not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reusable form category. Immutable once the form exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_format: Option<DisplayFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub expressions: Vec<FactExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_table: Option<SchemaObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_forms: Option<Vec<FormReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographical_role: Option<GeographicalRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_role: Option<TimeRole>,
    #[serde(default)]
    pub is_form_group: bool,
    #[serde(default)]
    pub is_multilingual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Fields of a form to be built locally by [`AttributeForm::local_create`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewForm {
    pub name: String,
    pub expressions: Vec<FactExpression>,
    /// Must be one of the tables used by `expressions`.
    pub lookup_table: Option<SchemaObjectReference>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub display_format: Option<DisplayFormat>,
    pub data_type: Option<DataType>,
    pub alias: Option<String>,
    pub child_forms: Option<Vec<FormReference>>,
    pub geographical_role: Option<GeographicalRole>,
    pub time_role: Option<TimeRole>,
    pub is_form_group: bool,
    pub is_multilingual: bool,
}

impl NewForm {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        expressions: Vec<FactExpression>,
        lookup_table: SchemaObjectReference,
    ) -> Self {
        Self {
            name: name.into(),
            expressions,
            lookup_table: Some(lookup_table),
            ..Self::default()
        }
    }
}

/// Partial change of a form. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_format: Option<DisplayFormat>,
    pub data_type: Option<DataType>,
    pub expressions: Option<Vec<FactExpression>>,
    pub alias: Option<String>,
    pub lookup_table: Option<SchemaObjectReference>,
    pub child_forms: Option<Vec<FormReference>>,
    pub geographical_role: Option<GeographicalRole>,
    pub time_role: Option<TimeRole>,
    pub is_form_group: Option<bool>,
    pub is_multilingual: Option<bool>,
    pub comments: Option<String>,
}

impl AttributeForm {
    /// Build a form that does not exist on the server yet.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` if no expression or lookup table is
    /// given, or if the lookup table is not used by any expression.
    pub fn local_create(new: NewForm) -> Result<Self, SchemaError> {
        let Some(lookup_table) = new.lookup_table else {
            return Err(missing_form_source());
        };
        if new.expressions.is_empty() {
            return Err(missing_form_source());
        }
        if !new.expressions.iter().any(|e| e.uses_table(&lookup_table)) {
            return Err(SchemaError::invalid_input(format!(
                "lookup table '{}' is not used by any expression of form '{}'",
                lookup_table.label(),
                new.name
            )));
        }
        Ok(Self {
            id: None,
            name: new.name,
            description: new.description,
            category: new.category,
            display_format: new.display_format,
            data_type: new.data_type,
            expressions: new.expressions,
            lookup_table: Some(lookup_table),
            alias: new.alias,
            child_forms: new.child_forms,
            geographical_role: new.geographical_role,
            time_role: new.time_role,
            is_form_group: new.is_form_group,
            is_multilingual: new.is_multilingual,
            comments: None,
        })
    }

    /// Whether `reference` points at this form, by id or by name.
    #[must_use]
    pub fn is_referenced_by(&self, reference: &FormReference) -> bool {
        let this = FormReference {
            id: self.id.clone(),
            name: Some(self.name.clone()),
        };
        this.same_form(reference)
    }

    /// Reference to this form: by id once saved, by name before.
    #[must_use]
    pub fn to_reference(&self) -> FormReference {
        match &self.id {
            Some(id) => FormReference::by_id(id.clone()),
            None => FormReference::by_name(self.name.clone()),
        }
    }

    /// Apply every supplied field of `update`.
    pub fn local_alter(&mut self, update: FormUpdate) {
        let FormUpdate {
            name,
            description,
            display_format,
            data_type,
            expressions,
            alias,
            lookup_table,
            child_forms,
            geographical_role,
            time_role,
            is_form_group,
            is_multilingual,
            comments,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(expressions) = expressions {
            self.expressions = expressions;
        }
        if let Some(is_form_group) = is_form_group {
            self.is_form_group = is_form_group;
        }
        if let Some(is_multilingual) = is_multilingual {
            self.is_multilingual = is_multilingual;
        }
        replace(&mut self.description, description);
        replace(&mut self.display_format, display_format);
        replace(&mut self.data_type, data_type);
        replace(&mut self.alias, alias);
        replace(&mut self.lookup_table, lookup_table);
        replace(&mut self.child_forms, child_forms);
        replace(&mut self.geographical_role, geographical_role);
        replace(&mut self.time_role, time_role);
        replace(&mut self.comments, comments);
    }

    #[must_use]
    pub fn get_fact_expression(&self, expression_id: &str) -> Option<&FactExpression> {
        self.expressions
            .iter()
            .find(|e| e.id.as_deref() == Some(expression_id))
    }

    /// # Errors
    /// Returns `SchemaError::InvalidInput` if an expression with the same id
    /// is already present.
    pub fn add_fact_expression(&mut self, expression: FactExpression) -> Result<(), SchemaError> {
        if let Some(id) = &expression.id
            && self.get_fact_expression(id).is_some()
        {
            return Err(SchemaError::invalid_input(format!(
                "Fact expression with ID: {id} already exists in form '{}'.",
                self.name
            )));
        }
        self.expressions.push(expression);
        Ok(())
    }

    /// Replace the expression and/or the tables of one fact expression.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` if the expression does not exist.
    pub fn alter_fact_expression(
        &mut self,
        expression_id: &str,
        expression: Option<Expression>,
        tables: Option<Vec<SchemaObjectReference>>,
    ) -> Result<(), SchemaError> {
        let name = self.name.clone();
        let target = self
            .expressions
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(expression_id))
            .ok_or_else(|| expression_not_found(expression_id, &name))?;
        if let Some(expression) = expression {
            target.expression = expression;
        }
        if let Some(tables) = tables {
            target.tables = tables;
        }
        Ok(())
    }

    /// Remove one fact expression.
    ///
    /// When the remaining expressions no longer use the form's lookup table,
    /// `new_lookup_table` must name one of the tables they do use.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` if the expression does not exist,
    /// is the last one, or the lookup table cannot be kept or replaced.
    pub fn remove_fact_expression(
        &mut self,
        expression_id: &str,
        new_lookup_table: Option<SchemaObjectReference>,
    ) -> Result<(), SchemaError> {
        let index = self
            .expressions
            .iter()
            .position(|e| e.id.as_deref() == Some(expression_id))
            .ok_or_else(|| expression_not_found(expression_id, &self.name))?;
        if self.expressions.len() == 1 {
            return Err(SchemaError::invalid_input(format!(
                "You can not remove the last fact expression of form '{}'.",
                self.name
            )));
        }

        let remaining: Vec<_> = self
            .expressions
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, e)| e)
            .collect();
        let used = |table: &SchemaObjectReference| remaining.iter().any(|e| e.uses_table(table));

        let lookup_table = match (new_lookup_table, &self.lookup_table) {
            (Some(new), _) if used(&new) => Some(new),
            (Some(new), _) => {
                return Err(SchemaError::invalid_input(format!(
                    "New lookup table '{}' is not used by the remaining expressions.",
                    new.label()
                )));
            }
            (None, Some(current)) if !used(current) => {
                return Err(SchemaError::invalid_input(format!(
                    "Lookup table '{}' is no longer used by form '{}'. Please provide new lookup table.",
                    current.label(),
                    self.name
                )));
            }
            (None, current) => current.clone(),
        };

        self.expressions.remove(index);
        self.lookup_table = lookup_table;
        Ok(())
    }

    /// Distinct tables used by the form's expressions.
    #[must_use]
    pub fn tables(&self) -> Vec<&SchemaObjectReference> {
        let mut tables: Vec<&SchemaObjectReference> = Vec::new();
        for table in self.expressions.iter().flat_map(|e| &e.tables) {
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        tables
    }
}

fn replace<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

pub(crate) fn missing_form_source() -> SchemaError {
    SchemaError::invalid_input("Please provide either `form` or `expressions` and `lookup_table`")
}

fn expression_not_found(expression_id: &str, form: &str) -> SchemaError {
    SchemaError::invalid_input(format!(
        "Fact expression with ID: {expression_id} has not been found in form '{form}'."
    ))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::references::ObjectSubType;

    fn table(id: &str) -> SchemaObjectReference {
        SchemaObjectReference::new(id, ObjectSubType::LogicalTable).with_name(format!("LU_{id}"))
    }

    fn expression(id: &str, tables: &[&str]) -> FactExpression {
        FactExpression {
            id: Some(id.to_owned()),
            expression: Expression::from_text("REGION_ID"),
            tables: tables.iter().map(|t| table(t)).collect(),
        }
    }

    fn form() -> AttributeForm {
        AttributeForm::local_create(NewForm::new(
            "ID",
            vec![expression("E1", &["T1", "T2"]), expression("E2", &["T3"])],
            table("T1"),
        ))
        .unwrap()
    }

    #[test]
    fn test_local_create_requires_expressions_and_lookup() {
        let err = AttributeForm::local_create(NewForm {
            name: "ID".to_owned(),
            ..NewForm::default()
        })
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidInput(_)));

        let err = AttributeForm::local_create(NewForm::new(
            "ID",
            vec![expression("E1", &["T1"])],
            table("T9"),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("LU_T9"));
    }

    #[test]
    fn test_is_referenced_by() {
        let mut saved = form();
        saved.id = Some("F1".to_owned());
        assert!(saved.is_referenced_by(&FormReference::by_id("F1")));
        assert!(saved.is_referenced_by(&FormReference::by_name("ID")));
        // a stale id does not hide a matching name
        assert!(saved.is_referenced_by(&FormReference {
            id: Some("F2".to_owned()),
            name: Some("ID".to_owned()),
        }));
        assert!(!saved.is_referenced_by(&FormReference {
            id: Some("F2".to_owned()),
            name: Some("DESC".to_owned()),
        }));
        assert!(!form().is_referenced_by(&FormReference::by_id("F1")));
        assert_eq!(form().to_reference(), FormReference::by_name("ID"));
    }

    #[test]
    fn test_local_alter_only_touches_supplied_fields() {
        let mut f = form();
        f.local_alter(FormUpdate {
            description: Some("Region key".to_owned()),
            is_multilingual: Some(true),
            ..FormUpdate::default()
        });
        assert_eq!(f.description.as_deref(), Some("Region key"));
        assert!(f.is_multilingual);
        assert_eq!(f.name, "ID");
        assert_eq!(f.expressions.len(), 2);
    }

    #[test]
    fn test_remove_fact_expression_keeps_used_lookup() {
        let mut f = form();
        f.remove_fact_expression("E2", None).unwrap();
        assert_eq!(f.expressions.len(), 1);
        assert_eq!(f.lookup_table.as_ref().unwrap().object_id, "T1");
    }

    #[test]
    fn test_remove_fact_expression_needs_new_lookup() {
        let mut f = form();
        let err = f.remove_fact_expression("E1", None).unwrap_err();
        assert!(err.to_string().contains("Please provide new lookup table"));
        assert_eq!(f.expressions.len(), 2);

        assert!(f.remove_fact_expression("E1", Some(table("T1"))).is_err());
        f.remove_fact_expression("E1", Some(table("T3"))).unwrap();
        assert_eq!(f.lookup_table.as_ref().unwrap().object_id, "T3");
    }

    #[test]
    fn test_remove_last_or_missing_expression_fails() {
        let mut f = form();
        assert!(f.remove_fact_expression("nope", None).is_err());
        f.remove_fact_expression("E2", None).unwrap();
        assert!(f.remove_fact_expression("E1", None).is_err());
    }

    #[test]
    fn test_add_and_alter_fact_expression() {
        let mut f = form();
        assert!(f.add_fact_expression(expression("E1", &["T1"])).is_err());
        f.add_fact_expression(expression("E3", &["T4"])).unwrap();
        f.alter_fact_expression("E3", None, Some(vec![table("T5")]))
            .unwrap();
        assert_eq!(f.get_fact_expression("E3").unwrap().tables[0].object_id, "T5");
        assert!(f.alter_fact_expression("E9", None, None).is_err());
    }

    #[test]
    fn test_tables_are_distinct() {
        let mut f = form();
        f.add_fact_expression(expression("E3", &["T1"])).unwrap();
        let tables = f.tables();
        let ids: Vec<_> = tables.iter().map(|t| t.object_id.as_str()).collect();
        assert_eq!(ids, ["T1", "T2", "T3"]);
    }
}
