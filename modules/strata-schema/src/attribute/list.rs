use super::Attribute;
use crate::error::SchemaError;
use crate::expression::ExpressionFormat;
use crate::references::ObjectSubType;
use serde_json::Value;
use strata_sdk::objects::{ObjectInfo, ObjectType};
use strata_sdk::search::{MetadataSearch, SearchPattern};
use strata_sdk::{Connection, Field};

/// Filters of an attribute search.
#[derive(Debug, Clone, PartialEq)]
pub struct ListAttributesQuery {
    pub name: Option<String>,
    pub pattern: SearchPattern,
    /// Only attributes of this subtype.
    pub subtype: Option<ObjectSubType>,
    pub limit: Option<usize>,
    /// Extra server-side filters, e.g. `("ownerId", "...")`.
    pub filters: Vec<(String, String)>,
    /// Expression format of the `Attribute`s built from the results.
    pub show_expression_as: ExpressionFormat,
}

impl Default for ListAttributesQuery {
    fn default() -> Self {
        Self {
            name: None,
            pattern: SearchPattern::Contains,
            subtype: None,
            limit: None,
            filters: Vec::new(),
            show_expression_as: ExpressionFormat::default(),
        }
    }
}

impl ListAttributesQuery {
    #[must_use]
    pub fn exact_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            pattern: SearchPattern::Exactly,
            ..Self::default()
        }
    }

    fn search(&self) -> MetadataSearch {
        let mut search = MetadataSearch::new(ObjectType::Attribute);
        if let Some(name) = &self.name {
            search = search.name(name.clone(), self.pattern);
        }
        if let Some(code) = self.subtype.and_then(subtype_code) {
            search = search.filter("subtype", code.to_string());
        }
        for (name, value) in &self.filters {
            search = search.filter(name.clone(), value.clone());
        }
        search
    }
}

/// Numeric codes of attribute subtypes on the search route.
fn subtype_code(subtype: ObjectSubType) -> Option<u32> {
    match subtype {
        ObjectSubType::Attribute => Some(3072),
        ObjectSubType::AttributeRole => Some(3073),
        ObjectSubType::AttributeTransformation => Some(3074),
        ObjectSubType::AttributeAbstract => Some(3075),
        ObjectSubType::AttributeRecursive => Some(3076),
        _ => None,
    }
}

/// Search attributes and return the raw search results.
///
/// # Errors
/// Returns wrapped `SdkError`s for server failures.
pub async fn list_attributes_json(
    conn: &Connection,
    query: &ListAttributesQuery,
) -> Result<Vec<Value>, SchemaError> {
    conn.require_project()?;
    Ok(query.search().run(conn, query.limit).await?)
}

/// Search attributes.
///
/// Results carry the search metadata only; the definition is fetched on the
/// first call that needs it.
///
/// # Errors
/// Returns wrapped `SdkError`s for server failures or malformed results.
pub async fn list_attributes(
    conn: &Connection,
    query: &ListAttributesQuery,
) -> Result<Vec<Attribute>, SchemaError> {
    list_attributes_json(conn, query)
        .await?
        .into_iter()
        .map(|item| {
            let info: ObjectInfo = serde_json::from_value(item)?;
            let mut attribute = Attribute::unloaded(
                conn.clone(),
                info.id.clone(),
                info.name.clone(),
                query.show_expression_as,
            );
            attribute.description = Field::supplied(info.description.clone());
            attribute.info = Field::Value(info);
            Ok(attribute)
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;
    use std::sync::Arc;
    use strata_sdk::testing::MockTransport;

    const RESULTS: &str = "/api/metadataSearches/results";

    fn setup() -> (Arc<MockTransport>, Connection) {
        let mock = MockTransport::new();
        mock.ok(Method::POST, RESULTS, &json!({"id": "S1"})).ok(
            Method::GET,
            RESULTS,
            &json!([
                {"id": "A1", "name": "Region", "description": "Sales region", "type": 12},
                {"id": "A2", "name": "Region Manager", "type": 12}
            ]),
        );
        let conn = Connection::with_transport(mock.clone()).with_project("P1");
        (mock, conn)
    }

    #[tokio::test]
    async fn test_list_builds_unloaded_attributes() {
        let (mock, conn) = setup();
        let query = ListAttributesQuery {
            name: Some("Region".to_owned()),
            subtype: Some(ObjectSubType::AttributeRole),
            filters: vec![("ownerId".to_owned(), "U1".to_owned())],
            ..ListAttributesQuery::default()
        };

        let attributes = list_attributes(&conn, &query).await.unwrap();

        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].id(), "A1");
        assert_eq!(attributes[0].description(), Some("Sales region"));
        assert!(!attributes[0].is_loaded());
        assert!(attributes[1].description.is_unset());
        assert_eq!(attributes[1].info().unwrap().name, "Region Manager");

        let start = &mock.requests_to(&Method::POST, RESULTS)[0];
        assert_eq!(start.query_value("name"), Some("Region"));
        assert_eq!(start.query_value("pattern"), Some("4"));
        assert_eq!(start.query_value("type"), Some("12"));
        assert_eq!(start.query_value("subtype"), Some("3073"));
        assert_eq!(start.query_value("ownerId"), Some("U1"));
    }

    #[tokio::test]
    async fn test_find_by_name_requires_exact_match() {
        let (mock, conn) = setup();
        let err = Attribute::find_by_name(&conn, "Regio", ExpressionFormat::Tree)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "attribute 'Regio' not found");
        let start = &mock.requests_to(&Method::POST, RESULTS)[0];
        assert_eq!(start.query_value("pattern"), Some("2"));
    }

    #[tokio::test]
    async fn test_list_requires_project() {
        let mock = MockTransport::new();
        let conn = Connection::with_transport(mock.clone());
        assert!(list_attributes_json(&conn, &ListAttributesQuery::default()).await.is_err());
        assert_eq!(mock.request_count(), 0);
    }
}
