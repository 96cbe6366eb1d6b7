use super::{Attribute, Write};
use crate::api::tables;
use crate::error::SchemaError;
use crate::references::SchemaObjectReference;
use crate::relationship::{
    ChildSelector, Relationship, RelationshipChange, RelationshipChild, RelationshipType,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Attributes that could become parents or children, per lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipCandidates {
    by_table: BTreeMap<String, Vec<SchemaObjectReference>>,
}

impl RelationshipCandidates {
    /// Candidates keyed by table name.
    #[must_use]
    pub fn by_table(&self) -> &BTreeMap<String, Vec<SchemaObjectReference>> {
        &self.by_table
    }

    /// Every candidate once, whatever table it was found on.
    #[must_use]
    pub fn into_flat(self) -> Vec<SchemaObjectReference> {
        let mut seen = HashSet::new();
        self.by_table
            .into_values()
            .flatten()
            .filter(|candidate| seen.insert(candidate.object_id.clone()))
            .collect()
    }
}

impl Attribute {
    /// Add a child (or a joint set of children) to this attribute.
    ///
    /// The attribute is the parent. The relationship type defaults to one to
    /// many and the table to the attribute lookup table. An existing child
    /// is skipped with a warning.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` unless exactly one of child and
    /// joint child is given, or when no table is known.
    pub async fn add_child(
        &mut self,
        selector: ChildSelector,
        relationship_type: Option<RelationshipType>,
        table: Option<SchemaObjectReference>,
    ) -> Result<RelationshipChange, SchemaError> {
        let child = selector.resolve()?;
        self.ensure_definition().await?;

        if self.relationships().iter().any(|rel| rel.child.same_target(&child)) {
            let kind = if child.is_joint() { "joint_child" } else { "child" };
            tracing::warn!(
                "{} already is a {kind} of the attribute '{}' and will be omitted.",
                child.label(),
                self.id
            );
            return Ok(RelationshipChange::Skipped);
        }

        let relationship = Relationship::new(
            relationship_type.unwrap_or_default(),
            self.relationship_table(table)?,
            self.reference(),
            child,
        );
        self.publish_relationships(|rels| rels.push(relationship)).await
    }

    /// Add a parent to this attribute.
    ///
    /// Skipped with a warning when `parent` already is the parent of any of
    /// the attribute's relationships, including ones where this attribute
    /// itself is the parent.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` when no table is known.
    pub async fn add_parent(
        &mut self,
        parent: SchemaObjectReference,
        relationship_type: Option<RelationshipType>,
        table: Option<SchemaObjectReference>,
    ) -> Result<RelationshipChange, SchemaError> {
        self.ensure_definition().await?;

        if self
            .relationships()
            .iter()
            .any(|rel| rel.parent.object_id == parent.object_id)
        {
            tracing::warn!(
                "{} already is a parent of the attribute '{}' and will be omitted.",
                parent.label(),
                self.id
            );
            return Ok(RelationshipChange::Skipped);
        }

        let relationship = Relationship::new(
            relationship_type.unwrap_or_default(),
            self.relationship_table(table)?,
            parent,
            RelationshipChild::Single(self.reference()),
        );
        self.publish_relationships(|rels| rels.push(relationship)).await
    }

    /// Remove the first relationship with the given child or joint child.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidInput` unless exactly one of child and
    /// joint child is given.
    pub async fn remove_child(
        &mut self,
        selector: ChildSelector,
    ) -> Result<RelationshipChange, SchemaError> {
        let child = selector.resolve()?;
        self.ensure_definition().await?;

        match self
            .relationships()
            .iter()
            .position(|rel| rel.child.same_target(&child))
        {
            Some(index) => {
                self.publish_relationships(|rels| {
                    rels.remove(index);
                })
                .await
            }
            None => {
                tracing::warn!(
                    "{} is not a child/joint_child of the attribute '{}' and will be omitted.",
                    child.label(),
                    self.id
                );
                Ok(RelationshipChange::NotFound)
            }
        }
    }

    /// Remove the first relationship whose parent is `parent`.
    ///
    /// `parent` must be another attribute; this attribute is never removed
    /// as a parent of its own children.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn remove_parent(
        &mut self,
        parent: &SchemaObjectReference,
    ) -> Result<RelationshipChange, SchemaError> {
        self.ensure_definition().await?;

        let position = self.relationships().iter().position(|rel| {
            rel.parent.object_id == parent.object_id && parent.object_id != self.id
        });
        match position {
            Some(index) => {
                self.publish_relationships(|rels| {
                    rels.remove(index);
                })
                .await
            }
            None => {
                tracing::warn!(
                    "{} is not a parent of the attribute '{}' and will be omitted.",
                    parent.label(),
                    self.id
                );
                Ok(RelationshipChange::NotFound)
            }
        }
    }

    /// Attributes that share a lookup table with the key form.
    ///
    /// Every table used by the key form's expressions is read and its
    /// attributes, except this one, are returned. With `already_used` set to
    /// `false`, current parents and children are left out.
    ///
    /// # Errors
    /// Returns wrapped `SdkError`s for server failures.
    pub async fn list_relationship_candidates(
        &mut self,
        already_used: bool,
    ) -> Result<RelationshipCandidates, SchemaError> {
        self.ensure_definition().await?;

        let key_form = self.key_form().cloned();
        let mut key_tables: Vec<SchemaObjectReference> = Vec::new();
        for form in self
            .forms()
            .iter()
            .filter(|form| key_form.as_ref().is_some_and(|key| form.is_referenced_by(key)))
        {
            for table in form.tables() {
                if !key_tables.contains(table) {
                    key_tables.push(table.clone());
                }
            }
        }

        let used = if already_used {
            HashSet::new()
        } else {
            self.related_ids()
        };

        let mut candidates = RelationshipCandidates::default();
        for table in key_tables {
            let definition = tables::get_table(&self.conn, &table.object_id).await?;
            let mut found = Vec::new();
            for attribute in table_attributes(definition) {
                let reference: SchemaObjectReference = serde_json::from_value(attribute)?;
                if reference.object_id != self.id {
                    found.push(reference);
                }
            }
            if found.is_empty() {
                continue;
            }
            found.retain(|candidate| !used.contains(candidate.object_id.as_str()));
            candidates
                .by_table
                .insert(table.label().to_owned(), found);
        }
        Ok(candidates)
    }

    /// Distinct tables used by the expressions of all forms, or only by the
    /// expression `expression_id`.
    #[must_use]
    pub fn list_tables(&self, expression_id: Option<&str>) -> Vec<SchemaObjectReference> {
        let mut result: Vec<SchemaObjectReference> = Vec::new();
        let expressions = self
            .forms()
            .iter()
            .flat_map(|form| &form.expressions)
            .filter(|expr| expression_id.is_none_or(|id| expr.id.as_deref() == Some(id)));
        for table in expressions.flat_map(|expr| &expr.tables) {
            if !result.contains(table) {
                result.push(table.clone());
            }
        }
        result
    }

    /// Ids of current parents and children, excluding this attribute.
    fn related_ids(&self) -> HashSet<&str> {
        let mut ids = HashSet::new();
        for rel in self.relationships() {
            match &rel.child {
                RelationshipChild::Single(child) => {
                    ids.insert(child.object_id.as_str());
                }
                RelationshipChild::Joint(children) => {
                    ids.extend(children.iter().map(|c| c.object_id.as_str()));
                }
            }
            ids.insert(rel.parent.object_id.as_str());
        }
        ids.remove(self.id.as_str());
        ids
    }

    fn relationship_table(
        &self,
        table: Option<SchemaObjectReference>,
    ) -> Result<SchemaObjectReference, SchemaError> {
        table
            .or_else(|| self.attribute_lookup_table().cloned())
            .ok_or_else(|| {
                SchemaError::invalid_input(format!(
                    "Attribute '{}' has no lookup table; provide the relationship table.",
                    self.id
                ))
            })
    }

    /// Apply `change` to a copy of the relationships and republish all of them.
    async fn publish_relationships(
        &mut self,
        change: impl FnOnce(&mut Vec<Relationship>),
    ) -> Result<RelationshipChange, SchemaError> {
        let mut relationships = self.relationships().to_vec();
        change(&mut relationships);
        self.write(Write {
            relationships: Some(relationships),
            ..Write::default()
        })
        .await?;
        Ok(RelationshipChange::Applied)
    }
}

/// Attribute entries of a table, with `id` renamed to `objectId` and the
/// `information` block flattened.
fn table_attributes(table: Value) -> Vec<Value> {
    let Value::Object(mut table) = table else {
        return Vec::new();
    };
    let Some(Value::Array(attributes)) = table.remove("attributes") else {
        return Vec::new();
    };
    attributes
        .into_iter()
        .map(|mut attribute| {
            if let Value::Object(map) = &mut attribute {
                if let Some(id) = map.remove("id") {
                    map.insert("objectId".to_owned(), id);
                }
                if let Some(Value::Object(information)) = map.remove("information") {
                    map.extend(information);
                }
            }
            attribute
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::tests::{ATTR_PATH, setup};
    use super::*;
    use crate::expression::ExpressionFormat;
    use crate::references::ObjectSubType;
    use http::Method;
    use serde_json::json;
    use tracing_test::traced_test;

    const RELATIONSHIPS_PATH: &str = "/api/model/attributes/A1/relationships";

    fn attr(id: &str, name: &str) -> SchemaObjectReference {
        SchemaObjectReference::new(id, ObjectSubType::Attribute).with_name(name)
    }

    #[tokio::test]
    #[traced_test]
    async fn test_add_existing_child_is_skipped() {
        let (mock, conn) = setup();
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        let change = attribute
            .add_child(ChildSelector::child(attr("A2", "City")), None, None)
            .await
            .unwrap();

        assert_eq!(change, RelationshipChange::Skipped);
        assert_eq!(attribute.relationships().len(), 1);
        assert!(mock.requests_to(&Method::PUT, RELATIONSHIPS_PATH).is_empty());
        assert!(logs_contain("City already is a child of the attribute 'A1'"));
    }

    #[tokio::test]
    async fn test_add_child_republishes_full_list() {
        let (mock, conn) = setup();
        mock.ok(Method::PUT, RELATIONSHIPS_PATH, &Value::Null);
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        let change = attribute
            .add_child(ChildSelector::child(attr("A3", "Store")), None, None)
            .await
            .unwrap();

        assert_eq!(change, RelationshipChange::Applied);
        assert_eq!(attribute.relationships().len(), 2);
        let put = &mock.requests_to(&Method::PUT, RELATIONSHIPS_PATH)[0];
        let sent = put.body.as_ref().unwrap()["relationships"].as_array().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1]["parent"]["objectId"], "A1");
        assert_eq!(sent[1]["child"]["objectId"], "A3");
        assert_eq!(sent[1]["relationshipType"], "one_to_many");
        assert_eq!(sent[1]["relationshipTable"]["objectId"], "T1");
        assert_eq!(put.header_value("X-Changeset-ID"), Some("CS1"));
    }

    #[tokio::test]
    async fn test_add_child_rejects_ambiguous_selector() {
        let (mock, conn) = setup();
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();
        let both = ChildSelector {
            child: Some(attr("A3", "Store")),
            joint_child: Some(vec![attr("A4", "Zip")]),
        };
        let err = attribute.add_child(both, None, None).await.unwrap_err();
        assert!(matches!(err, SchemaError::InvalidInput(_)));
        assert!(attribute.remove_child(ChildSelector::default()).await.is_err());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_add_parent_twice_is_idempotent() {
        let (mock, conn) = setup();
        let mut with_parent = super::super::tests::definition();
        with_parent["relationships"]
            .as_array_mut()
            .unwrap()
            .push(json!({
                "relationshipType": "one_to_many",
                "relationshipTable": {"objectId": "T1", "subType": "logical_table"},
                "parent": {"objectId": "A0", "subType": "attribute", "name": "Country"},
                "child": {"objectId": "A1", "subType": "attribute", "name": "Region"}
            }));
        mock.ok(Method::PUT, RELATIONSHIPS_PATH, &json!({"relationships": with_parent["relationships"]}));
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        let first = attribute.add_parent(attr("A0", "Country"), None, None).await.unwrap();
        let second = attribute.add_parent(attr("A0", "Country"), None, None).await.unwrap();

        assert_eq!(first, RelationshipChange::Applied);
        assert_eq!(second, RelationshipChange::Skipped);
        assert_eq!(attribute.relationships().len(), 2);
        assert_eq!(mock.requests_to(&Method::PUT, RELATIONSHIPS_PATH).len(), 1);
    }

    #[tokio::test]
    async fn test_self_as_parent_is_asymmetric() {
        let (mock, conn) = setup();
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();
        let me = attribute.reference();

        // add_parent sees itself as the parent of City and skips
        assert_eq!(
            attribute.add_parent(me.clone(), None, None).await.unwrap(),
            RelationshipChange::Skipped
        );
        // remove_parent never matches itself
        assert_eq!(
            attribute.remove_parent(&me).await.unwrap(),
            RelationshipChange::NotFound
        );
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_child_applied_and_not_found() {
        let (mock, conn) = setup();
        mock.ok(Method::PUT, RELATIONSHIPS_PATH, &json!({"relationships": []}));
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        let missing = attribute
            .remove_child(ChildSelector::joint(vec![attr("A2", "City"), attr("A3", "Store")]))
            .await
            .unwrap();
        assert_eq!(missing, RelationshipChange::NotFound);

        let removed = attribute
            .remove_child(ChildSelector::child(attr("A2", "City")))
            .await
            .unwrap();
        assert_eq!(removed, RelationshipChange::Applied);
        assert!(attribute.relationships().is_empty());
        let put = &mock.requests_to(&Method::PUT, RELATIONSHIPS_PATH)[0];
        assert_eq!(put.body, Some(json!({"relationships": []})));
    }

    #[tokio::test]
    async fn test_list_relationship_candidates() {
        let (mock, conn) = setup();
        mock.ok(
            Method::GET,
            "/api/model/tables/T1",
            &json!({
                "information": {"objectId": "T1", "name": "LU_REGION"},
                "attributes": [
                    {"id": "A1", "information": {"name": "Region", "subType": "attribute"}},
                    {"id": "A2", "information": {"name": "City", "subType": "attribute"}},
                    {"id": "A5", "information": {"name": "Manager", "subType": "attribute"}}
                ]
            }),
        );
        let mut attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();

        let all = attribute.list_relationship_candidates(true).await.unwrap();
        let ids: Vec<_> = all.by_table()["LU_REGION"]
            .iter()
            .map(|r| r.object_id.as_str())
            .collect();
        assert_eq!(ids, ["A2", "A5"]);

        let unused = attribute.list_relationship_candidates(false).await.unwrap();
        let flat = unused.into_flat();
        assert_eq!(flat, vec![attr("A5", "Manager")]);
        assert_eq!(mock.requests_to(&Method::GET, ATTR_PATH).len(), 1);
    }

    #[tokio::test]
    async fn test_list_tables() {
        let (_mock, conn) = setup();
        let attribute = Attribute::fetch(&conn, "A1", ExpressionFormat::Tree).await.unwrap();
        let tables = attribute.list_tables(None);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].object_id, "T1");
        assert_eq!(attribute.list_tables(Some("E2")).len(), 1);
        assert!(attribute.list_tables(Some("E9")).is_empty());
    }
}
