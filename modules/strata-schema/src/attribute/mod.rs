//! The attribute entity.
//!
//! An [`Attribute`] is a local copy of a server attribute. Definition fields
//! (forms, key form, displays, sorts, relationships) and generic object
//! metadata are loaded lazily and tracked as [`Field`]s. Every mutating
//! method validates locally first, then writes through the modeling routes
//! inside a changeset, then refreshes the local copy from the response.

mod data;
mod forms;
mod list;
mod relationships;

pub use data::{AttributeData, CreateAttributeDto, UpdateAttributeDto};
pub use forms::FormSource;
pub use list::{ListAttributesQuery, list_attributes, list_attributes_json};
pub use relationships::RelationshipCandidates;

use crate::api::changesets::Changeset;
use crate::api::{attributes as attributes_api, hierarchies};
use crate::error::SchemaError;
use crate::expression::ExpressionFormat;
use crate::form::AttributeForm;
use crate::references::{
    AttributeDisplays, AttributeSorts, FormReference, ObjectSubType, SchemaObjectReference,
};
use crate::relationship::Relationship;
use crate::validation::{validate_displays, validate_key_form, validate_sorts};
use data::{AttributeBody, InformationBody};
use serde::Deserialize;
use serde_json::Value;
use strata_sdk::objects::{self, ObjectInfo, ObjectInfoUpdate, ObjectType, UserRef};
use strata_sdk::{Connection, Field, SdkError};

#[derive(Debug, Clone)]
pub struct Attribute {
    conn: Connection,
    id: String,
    name: String,
    show_expression_as: ExpressionFormat,
    sub_type: Field<ObjectSubType>,
    is_embedded: Field<bool>,
    description: Field<String>,
    destination_folder_id: Field<String>,
    forms: Field<Vec<AttributeForm>>,
    attribute_lookup_table: Field<SchemaObjectReference>,
    key_form: Field<FormReference>,
    displays: Field<AttributeDisplays>,
    sorts: Field<AttributeSorts>,
    relationships: Field<Vec<Relationship>>,
    info: Field<ObjectInfo>,
}

/// Changes for [`Attribute::alter`]. `None` leaves a property untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeAlter {
    pub sub_type: Option<ObjectSubType>,
    pub name: Option<String>,
    pub is_embedded: Option<bool>,
    pub description: Option<String>,
    pub destination_folder_id: Option<String>,
    pub forms: Option<Vec<AttributeForm>>,
    pub attribute_lookup_table: Option<SchemaObjectReference>,
    pub key_form: Option<FormReference>,
    pub displays: Option<AttributeDisplays>,
    pub sorts: Option<AttributeSorts>,
    pub relationships: Option<Vec<Relationship>>,
    /// Moves the attribute to another folder.
    pub folder_id: Option<String>,
    pub hidden: Option<bool>,
    pub comments: Option<String>,
    /// Id of the new owner.
    pub owner: Option<String>,
}

impl AttributeAlter {
    #[must_use]
    pub fn hidden(hidden: bool) -> Self {
        Self {
            hidden: Some(hidden),
            ..Self::default()
        }
    }

    fn touches_definition(&self) -> bool {
        self.sub_type.is_some()
            || self.name.is_some()
            || self.is_embedded.is_some()
            || self.description.is_some()
            || self.destination_folder_id.is_some()
            || self.forms.is_some()
            || self.attribute_lookup_table.is_some()
            || self.key_form.is_some()
            || self.displays.is_some()
            || self.sorts.is_some()
    }
}

/// Attribute as returned by the modeling routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeDefinition {
    information: DefinitionInformation,
    #[serde(default)]
    forms: Field<Vec<AttributeForm>>,
    #[serde(default)]
    attribute_lookup_table: Field<SchemaObjectReference>,
    #[serde(default)]
    key_form: Field<FormReference>,
    #[serde(default)]
    displays: Field<AttributeDisplays>,
    #[serde(default)]
    sorts: Field<AttributeSorts>,
    #[serde(default)]
    relationships: Field<Vec<Relationship>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionInformation {
    object_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sub_type: Field<ObjectSubType>,
    #[serde(default)]
    is_embedded: Field<bool>,
    #[serde(default)]
    description: Field<String>,
    #[serde(default)]
    destination_folder_id: Field<String>,
}

/// A definition key missing from a full response means "not set".
fn loaded<T>(field: Field<T>) -> Field<T> {
    field.or(Field::Null)
}

/// Pending writes of one changeset.
#[derive(Default)]
struct Write {
    definition: Option<Value>,
    relationships: Option<Vec<Relationship>>,
}

/// Results of a committed [`Write`].
struct Written {
    definition: Option<Value>,
    relationships: Option<Vec<Relationship>>,
}

impl Attribute {
    fn from_definition(
        conn: Connection,
        definition: Value,
        show_expression_as: ExpressionFormat,
    ) -> Result<Self, SchemaError> {
        let mut attribute = Self::unloaded(conn, String::new(), String::new(), show_expression_as);
        attribute.apply_definition(definition)?;
        Ok(attribute)
    }

    fn unloaded(
        conn: Connection,
        id: String,
        name: String,
        show_expression_as: ExpressionFormat,
    ) -> Self {
        Self {
            conn,
            id,
            name,
            show_expression_as,
            sub_type: Field::Unset,
            is_embedded: Field::Unset,
            description: Field::Unset,
            destination_folder_id: Field::Unset,
            forms: Field::Unset,
            attribute_lookup_table: Field::Unset,
            key_form: Field::Unset,
            displays: Field::Unset,
            sorts: Field::Unset,
            relationships: Field::Unset,
            info: Field::Unset,
        }
    }

    /// Replace the definition fields with a full server response.
    fn apply_definition(&mut self, definition: Value) -> Result<(), SchemaError> {
        let AttributeDefinition {
            information,
            forms,
            attribute_lookup_table,
            key_form,
            displays,
            sorts,
            relationships,
        } = serde_json::from_value(definition)?;

        self.id = information.object_id;
        if let Some(name) = information.name {
            self.name = name;
        }
        self.sub_type = loaded(information.sub_type);
        self.is_embedded = loaded(information.is_embedded);
        self.description = loaded(information.description);
        self.destination_folder_id = loaded(information.destination_folder_id);
        self.forms = loaded(forms);
        self.attribute_lookup_table = loaded(attribute_lookup_table);
        self.key_form = loaded(key_form);
        self.displays = loaded(displays);
        self.sorts = loaded(sorts);
        self.relationships = loaded(relationships);
        Ok(())
    }

    /// Fetch an attribute by id.
    ///
    /// # Errors
    /// Returns `SdkError::Api` (wrapped) for server errors, e.g. an unknown id.
    pub async fn fetch(
        conn: &Connection,
        id: &str,
        show_expression_as: ExpressionFormat,
    ) -> Result<Self, SchemaError> {
        let definition = attributes_api::get_attribute(conn, id, show_expression_as).await?;
        Self::from_definition(conn.clone(), definition, show_expression_as)
    }

    /// Fetch the attribute whose name is exactly `name`.
    ///
    /// # Errors
    /// Returns `SdkError::NotFound` (wrapped) if no attribute has that name.
    pub async fn find_by_name(
        conn: &Connection,
        name: &str,
        show_expression_as: ExpressionFormat,
    ) -> Result<Self, SchemaError> {
        let query = ListAttributesQuery::exact_name(name);
        let found = list_attributes_json(conn, &query).await?;
        let id = found
            .iter()
            .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
            .and_then(|item| item.get("id").and_then(Value::as_str))
            .ok_or_else(|| SdkError::not_found("attribute", name))?;
        Self::fetch(conn, id, show_expression_as).await
    }

    /// Create an attribute on the server.
    ///
    /// The definition is validated before any request. The attribute is
    /// written inside its own changeset; when `data.hidden` is `Some(true)`
    /// it is hidden with a second call afterwards.
    ///
    /// # Errors
    /// Returns `SchemaError::Validation` for an inconsistent definition and
    /// wrapped `SdkError`s for server failures.
    pub async fn create(conn: &Connection, data: AttributeData) -> Result<Self, SchemaError> {
        let body = data.to_body()?;
        let changeset = Changeset::open(conn).await?;
        let result =
            attributes_api::create_attribute(conn, body, data.show_expression_as, changeset.id())
                .await
                .map_err(SchemaError::from);
        let created = changeset.finish(conn, result).await?;

        let mut attribute = Self::from_definition(conn.clone(), created, data.show_expression_as)?;
        if conn.verbose() {
            tracing::info!(name = %attribute.name, id = %attribute.id, "created attribute");
        }
        if data.hidden == Some(true) {
            attribute.alter(AttributeAlter::hidden(true)).await?;
        }
        Ok(attribute)
    }

    /// Create several attributes in one changeset.
    ///
    /// Every definition is validated before the first request. When
    /// `changeset_id` is `None` a changeset is opened for the batch and
    /// committed at the end; otherwise the caller's changeset is used and
    /// left open. Results are in input order.
    ///
    /// # Errors
    /// Returns the first validation or server error. Attributes created
    /// before a failure in a caller-owned changeset stay staged there.
    pub async fn create_many(
        conn: &Connection,
        data: &[AttributeData],
        changeset_id: Option<&str>,
    ) -> Result<Vec<Self>, SchemaError> {
        let dtos = data
            .iter()
            .map(CreateAttributeDto::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let created = in_batch_changeset(conn, changeset_id, async |changeset_id: &str| {
            let mut created = Vec::with_capacity(dtos.len());
            for dto in &dtos {
                let body = dto.body.clone();
                created.push(
                    attributes_api::create_attribute(conn, body, dto.show_expression_as, changeset_id)
                        .await?,
                );
            }
            Ok::<_, SdkError>(created)
        })
        .await?;

        Self::finish_batch(conn, created, data, "created attribute").await
    }

    /// Overwrite several attributes in one changeset.
    ///
    /// `attributes[i]` is written with `data[i]`. Changeset handling is the
    /// same as for [`create_many`](Self::create_many).
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` if the lists differ in length,
    /// before any request is sent.
    pub async fn update_many(
        conn: &Connection,
        attributes: &[Self],
        data: &[AttributeData],
        changeset_id: Option<&str>,
    ) -> Result<Vec<Self>, SchemaError> {
        if attributes.len() != data.len() {
            return Err(SchemaError::invalid_input(
                "Length of attributes list must match length of attributes_data list",
            ));
        }
        let dtos = attributes
            .iter()
            .zip(data)
            .map(|(attribute, data)| UpdateAttributeDto::new(attribute.id.clone(), data))
            .collect::<Result<Vec<_>, _>>()?;

        let updated = in_batch_changeset(conn, changeset_id, async |changeset_id: &str| {
            let mut updated = Vec::with_capacity(dtos.len());
            for dto in &dtos {
                let body = dto.body.clone();
                updated.push(
                    attributes_api::update_attribute(
                        conn,
                        &dto.id,
                        body,
                        dto.show_expression_as,
                        changeset_id,
                    )
                    .await?,
                );
            }
            Ok::<_, SdkError>(updated)
        })
        .await?;

        Self::finish_batch(conn, updated, data, "updated attribute").await
    }

    /// Build entities from batch responses and apply `hidden` per record.
    async fn finish_batch(
        conn: &Connection,
        responses: Vec<Value>,
        data: &[AttributeData],
        action: &'static str,
    ) -> Result<Vec<Self>, SchemaError> {
        let mut attributes = Vec::with_capacity(responses.len());
        for (response, data) in responses.into_iter().zip(data) {
            let mut attribute = Self::from_definition(conn.clone(), response, data.show_expression_as)?;
            if conn.verbose() {
                tracing::info!(name = %attribute.name, id = %attribute.id, "{action}");
            }
            if data.hidden == Some(true) {
                attribute.alter(AttributeAlter::hidden(true)).await?;
            }
            attributes.push(attribute);
        }
        Ok(attributes)
    }

    /// Change attribute properties.
    ///
    /// Definition changes are validated against the current forms, key form,
    /// displays and sorts (supplied values take precedence) before anything
    /// is sent. `hidden` is skipped when it already has the requested value.
    ///
    /// # Errors
    /// Returns `SchemaError::Validation` for an inconsistent definition and
    /// wrapped `SdkError`s for server failures.
    pub async fn alter(&mut self, changes: AttributeAlter) -> Result<(), SchemaError> {
        let definition = if changes.touches_definition() {
            self.ensure_definition().await?;
            Some(self.definition_patch(&changes)?)
        } else {
            None
        };

        let AttributeAlter {
            relationships,
            folder_id,
            hidden,
            comments,
            owner,
            ..
        } = changes;
        let info_update = ObjectInfoUpdate {
            folder_id,
            hidden: hidden.filter(|h| self.hidden() != Some(*h)),
            comments,
            owner: owner.map(|id| UserRef { id, name: None }),
            ..ObjectInfoUpdate::default()
        };

        self.write(Write {
            definition,
            relationships,
        })
        .await?;

        if !info_update.is_empty() {
            let info =
                objects::update_object_info(&self.conn, &self.id, ObjectType::Attribute, &info_update)
                    .await?;
            self.info = Field::Value(info);
        }
        Ok(())
    }

    fn definition_patch(&self, changes: &AttributeAlter) -> Result<Value, SchemaError> {
        let forms = changes.forms.as_deref().unwrap_or(self.forms());
        let key_form = validate_key_form(
            changes.key_form.as_ref().or(self.key_form.value()),
            forms,
            None,
        )?;
        let displays = validate_displays(
            changes.displays.clone().or_else(|| self.displays.value().cloned()),
            forms,
        )?;
        let sorts = validate_sorts(
            changes.sorts.clone().or_else(|| self.sorts.value().cloned()),
            forms,
        )?;

        AttributeBody {
            information: InformationBody {
                name: Some(changes.name.clone().unwrap_or_else(|| self.name.clone())),
                sub_type: changes.sub_type,
                is_embedded: changes.is_embedded,
                description: changes.description.clone(),
                destination_folder_id: changes.destination_folder_id.clone(),
            },
            forms: changes.forms.clone(),
            attribute_lookup_table: changes.attribute_lookup_table.clone(),
            key_form: Some(key_form),
            displays: Some(displays),
            sorts,
        }
        .into_json()
    }

    /// Send pending modeling writes in one changeset, then refresh.
    async fn write(&mut self, write: Write) -> Result<(), SchemaError> {
        if write.definition.is_none() && write.relationships.is_none() {
            return Ok(());
        }
        let changeset = Changeset::open(&self.conn).await?;
        let result = self.send_write(write, changeset.id()).await;
        let written = changeset.finish(&self.conn, result).await?;

        if let Some(definition) = written.definition {
            self.apply_definition(definition)?;
        }
        if let Some(relationships) = written.relationships {
            self.relationships = Field::Value(relationships);
        }
        if self.conn.verbose() {
            tracing::info!(name = %self.name, id = %self.id, "updated attribute");
        }
        Ok(())
    }

    async fn send_write(&self, write: Write, changeset_id: &str) -> Result<Written, SchemaError> {
        let definition = match write.definition {
            Some(body) => Some(
                attributes_api::update_attribute(
                    &self.conn,
                    &self.id,
                    body,
                    self.show_expression_as,
                    changeset_id,
                )
                .await?,
            ),
            None => None,
        };
        let relationships = match write.relationships {
            Some(relationships) => Some(
                hierarchies::update_attribute_relationships(
                    &self.conn,
                    &self.id,
                    &relationships,
                    changeset_id,
                )
                .await?,
            ),
            None => None,
        };
        Ok(Written {
            definition,
            relationships,
        })
    }

    /// Load the definition if it has not been fetched yet.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn ensure_definition(&mut self) -> Result<(), SchemaError> {
        if self.forms.is_unset() {
            let definition =
                attributes_api::get_attribute(&self.conn, &self.id, self.show_expression_as).await?;
            self.apply_definition(definition)?;
        }
        Ok(())
    }

    /// Load (or reload) the generic object metadata, see [`info`](Self::info).
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn load_info(&mut self) -> Result<(), SchemaError> {
        let info = objects::get_object_info(&self.conn, &self.id, ObjectType::Attribute).await?;
        self.info = Field::Value(info);
        Ok(())
    }

    /// Delete the attribute on the server.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn delete(self) -> Result<(), SchemaError> {
        objects::delete_object(&self.conn, &self.id, ObjectType::Attribute).await?;
        Ok(())
    }

    /// Reference to this attribute, as used in relationships.
    #[must_use]
    pub fn reference(&self) -> SchemaObjectReference {
        SchemaObjectReference::new(
            self.id.clone(),
            self.sub_type.value().copied().unwrap_or(ObjectSubType::Attribute),
        )
        .with_name(self.name.clone())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn show_expression_as(&self) -> ExpressionFormat {
        self.show_expression_as
    }

    /// Whether the definition has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.forms.is_unset()
    }

    #[must_use]
    pub fn sub_type(&self) -> Option<ObjectSubType> {
        self.sub_type.value().copied()
    }

    #[must_use]
    pub fn is_embedded(&self) -> Option<bool> {
        self.is_embedded.value().copied()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.value().map(String::as_str)
    }

    #[must_use]
    pub fn destination_folder_id(&self) -> Option<&str> {
        self.destination_folder_id.value().map(String::as_str)
    }

    /// Loaded forms; empty before the definition is loaded.
    #[must_use]
    pub fn forms(&self) -> &[AttributeForm] {
        self.forms.value().map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn attribute_lookup_table(&self) -> Option<&SchemaObjectReference> {
        self.attribute_lookup_table.value()
    }

    #[must_use]
    pub fn key_form(&self) -> Option<&FormReference> {
        self.key_form.value()
    }

    #[must_use]
    pub fn displays(&self) -> Option<&AttributeDisplays> {
        self.displays.value()
    }

    #[must_use]
    pub fn sorts(&self) -> Option<&AttributeSorts> {
        self.sorts.value()
    }

    /// Loaded relationships; empty before the definition is loaded.
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        self.relationships.value().map_or(&[], Vec::as_slice)
    }

    /// Generic object metadata, once loaded.
    #[must_use]
    pub fn info(&self) -> Option<&ObjectInfo> {
        self.info.value()
    }

    #[must_use]
    pub fn hidden(&self) -> Option<bool> {
        self.info.value().and_then(|info| info.hidden)
    }
}

/// Run `writes` in `changeset_id`, or in a changeset opened and committed
/// for the batch when none is given.
async fn in_batch_changeset<T>(
    conn: &Connection,
    changeset_id: Option<&str>,
    writes: impl AsyncFnOnce(&str) -> Result<T, SdkError>,
) -> Result<T, SchemaError> {
    match changeset_id {
        Some(id) => Ok(writes(id).await?),
        None => {
            let changeset = Changeset::open(conn).await?;
            let result = writes(changeset.id()).await.map_err(SchemaError::from);
            changeset.finish(conn, result).await
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;
    use std::sync::Arc;
    use strata_sdk::testing::MockTransport;

    pub(super) const ATTR_PATH: &str = "/api/model/attributes/A1";

    pub(super) fn definition() -> Value {
        json!({
            "information": {
                "objectId": "A1",
                "subType": "attribute",
                "name": "Region",
                "isEmbedded": false,
                "destinationFolderId": "F1"
            },
            "forms": [
                {
                    "id": "FA", "name": "ID",
                    "expressions": [{"id": "E1", "expression": {"text": "REGION_ID"},
                        "tables": [{"objectId": "T1", "subType": "logical_table", "name": "LU_REGION"}]}],
                    "lookupTable": {"objectId": "T1", "subType": "logical_table", "name": "LU_REGION"}
                },
                {
                    "id": "FB", "name": "DESC",
                    "expressions": [{"id": "E2", "expression": {"text": "REGION_NAME"},
                        "tables": [{"objectId": "T1", "subType": "logical_table", "name": "LU_REGION"}]}],
                    "lookupTable": {"objectId": "T1", "subType": "logical_table", "name": "LU_REGION"}
                }
            ],
            "attributeLookupTable": {"objectId": "T1", "subType": "logical_table", "name": "LU_REGION"},
            "keyForm": {"id": "FA"},
            "displays": {"reportDisplays": [{"id": "FA"}, {"id": "FB"}], "browseDisplays": [{"id": "FB"}]},
            "sorts": {"reportSorts": [{"form": {"id": "FA"}, "ascending": true}]},
            "relationships": [{
                "relationshipType": "one_to_many",
                "relationshipTable": {"objectId": "T1", "subType": "logical_table"},
                "parent": {"objectId": "A1", "subType": "attribute", "name": "Region"},
                "child": {"objectId": "A2", "subType": "attribute", "name": "City"}
            }]
        })
    }

    pub(super) fn setup() -> (Arc<MockTransport>, Connection) {
        setup_with(&definition())
    }

    pub(super) fn setup_with(definition: &Value) -> (Arc<MockTransport>, Connection) {
        let mock = MockTransport::new();
        mock.ok(Method::GET, ATTR_PATH, definition)
            .ok(Method::POST, "/api/model/changesets", &json!({"id": "CS1"}))
            .ok(Method::POST, "/api/model/changesets/CS1/commit", &json!({"id": "CS1"}));
        let conn = Connection::with_transport(mock.clone()).with_project("P1");
        (mock, conn)
    }

    #[tokio::test]
    async fn test_fetch_loads_definition() {
        let (mock, conn) = setup();
        let attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        assert_eq!(attribute.id(), "A1");
        assert_eq!(attribute.name(), "Region");
        assert_eq!(attribute.forms().len(), 2);
        assert_eq!(attribute.key_form(), Some(&FormReference::by_id("FA")));
        assert_eq!(attribute.relationships().len(), 1);
        assert_eq!(attribute.description(), None);
        assert!(attribute.description.is_null());
        assert!(attribute.is_loaded());
        assert!(attribute.info().is_none());
        assert_eq!(mock.requests()[0].query_value("showExpressionAs"), Some("tree"));
    }

    #[tokio::test]
    async fn test_alter_without_changes_sends_nothing() {
        let (mock, conn) = setup();
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();
        attribute.alter(AttributeAlter::default()).await.unwrap();
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_alter_name_revalidates_and_patches() {
        let (mock, conn) = setup();
        let mut renamed = definition();
        renamed["information"]["name"] = json!("Sales Region");
        mock.ok(Method::PATCH, ATTR_PATH, &renamed);
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        attribute
            .alter(AttributeAlter {
                name: Some("Sales Region".to_owned()),
                ..AttributeAlter::default()
            })
            .await
            .unwrap();

        assert_eq!(attribute.name(), "Sales Region");
        let patch = &mock.requests_to(&Method::PATCH, ATTR_PATH)[0];
        assert_eq!(patch.header_value("X-Changeset-ID"), Some("CS1"));
        let body = patch.body.as_ref().unwrap();
        assert_eq!(body["information"]["name"], "Sales Region");
        assert_eq!(body["keyForm"], json!({"id": "FA"}));
        assert!(body.get("forms").is_none());
        assert_eq!(body["displays"]["browseDisplays"], json!([{"id": "FB"}]));
    }

    #[tokio::test]
    async fn test_alter_rejects_dangling_key_before_writing() {
        let (mock, conn) = setup();
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        let err = attribute
            .alter(AttributeAlter {
                key_form: Some(FormReference::by_id("NOPE")),
                ..AttributeAlter::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SchemaError::Validation(_)));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_alter_hidden_skips_unchanged_value() {
        let (mock, conn) = setup();
        mock.ok(Method::GET, "/api/objects/A1", &json!({"id": "A1", "name": "Region", "hidden": true}));
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();
        attribute.load_info().await.unwrap();

        attribute.alter(AttributeAlter::hidden(true)).await.unwrap();

        assert!(mock.requests_to(&Method::PUT, "/api/objects/A1").is_empty());
        assert_eq!(attribute.hidden(), Some(true));
    }

    #[tokio::test]
    async fn test_alter_info_fields_use_object_route() {
        let (mock, conn) = setup();
        mock.ok(
            Method::PUT,
            "/api/objects/A1",
            &json!({"id": "A1", "name": "Region", "hidden": false, "comments": "checked"}),
        );
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        attribute
            .alter(AttributeAlter {
                comments: Some("checked".to_owned()),
                owner: Some("U1".to_owned()),
                ..AttributeAlter::default()
            })
            .await
            .unwrap();

        let put = &mock.requests_to(&Method::PUT, "/api/objects/A1")[0];
        assert_eq!(put.query_value("type"), Some("12"));
        assert_eq!(put.body, Some(json!({"comments": "checked", "owner": {"id": "U1"}})));
        assert!(mock.requests_to(&Method::POST, "/api/model/changesets").is_empty());
        assert_eq!(attribute.info().unwrap().comments.as_deref(), Some("checked"));
    }

    #[tokio::test]
    async fn test_unloaded_attribute_fetches_definition_on_demand() {
        let (mock, conn) = setup();
        let mut attribute =
            Attribute::unloaded(conn, "A1".to_owned(), "Region".to_owned(), ExpressionFormat::Tree);
        assert!(!attribute.is_loaded());
        attribute.ensure_definition().await.unwrap();
        attribute.ensure_definition().await.unwrap();
        assert_eq!(mock.requests_to(&Method::GET, ATTR_PATH).len(), 1);
        assert_eq!(attribute.forms().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_uses_object_route() {
        let (mock, conn) = setup();
        mock.respond(Method::DELETE, "/api/objects/A1", 204, &Value::Null);
        let attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();
        attribute.delete().await.unwrap();
        assert_eq!(mock.requests_to(&Method::DELETE, "/api/objects/A1").len(), 1);
    }
}
