//! GraphQL request types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GraphQL operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// A query operation (read-only).
    #[default]
    Query,
    /// A mutation operation (modifies data).
    Mutation,
    /// A subscription operation (real-time updates).
    Subscription,
}

/// A GraphQL request.
///
/// Represents one GraphQL operation document with optional variables and
/// operation name. The request is handed unchanged to the transport; this
/// crate never parses the document beyond inferring the operation type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLRequest {
    /// The GraphQL document text.
    pub query: String,

    /// Optional variables for the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,

    /// Optional operation name (for documents with multiple operations).
    #[serde(skip_serializing_if = "Option::is_none", rename = "operationName")]
    pub operation_name: Option<String>,

    /// Extensions (implementation-specific metadata).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,

    /// The operation type (not serialized, used internally).
    #[serde(skip)]
    operation_type: OperationType,
}

impl GraphQLRequest {
    /// Create a new query request.
    pub fn query(query: impl Into<String>) -> Self {
        Self::with_type(query, OperationType::Query)
    }

    /// Create a new mutation request.
    pub fn mutation(query: impl Into<String>) -> Self {
        Self::with_type(query, OperationType::Mutation)
    }

    /// Create a new subscription request.
    pub fn subscription(query: impl Into<String>) -> Self {
        Self::with_type(query, OperationType::Subscription)
    }

    /// Create a new request from a raw document string.
    ///
    /// The operation type is inferred from the document text if possible,
    /// defaulting to a query.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let operation_type = Self::infer_operation_type(&query);
        Self::with_type(query, operation_type)
    }

    fn with_type(query: impl Into<String>, operation_type: OperationType) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
            extensions: None,
            operation_type,
        }
    }

    /// Set a single variable value.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = GraphQLRequest::query("query($id: ID!) { user(id: $id) { name } }")
    ///     .variable("id", "123");
    /// ```
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let variables = self
            .variables
            .get_or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(map) = variables
            && let Ok(value) = serde_json::to_value(value)
        {
            map.insert(name.into(), value);
        }
        self
    }

    /// Set all variables from a serializable value.
    pub fn variables(mut self, variables: impl Serialize) -> Self {
        self.variables = serde_json::to_value(variables).ok();
        self
    }

    /// Set the operation name.
    ///
    /// Required when the document contains multiple operations.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Set extensions (implementation-specific metadata).
    pub fn extensions(mut self, extensions: impl Serialize) -> Self {
        self.extensions = serde_json::to_value(extensions).ok();
        self
    }

    /// Get the operation type.
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Check if this is a subscription.
    pub fn is_subscription(&self) -> bool {
        self.operation_type == OperationType::Subscription
    }

    fn infer_operation_type(query: &str) -> OperationType {
        let trimmed = query.trim_start();
        if trimmed.starts_with("subscription") || trimmed.contains("subscription ") {
            OperationType::Subscription
        } else if trimmed.starts_with("mutation") || trimmed.contains("mutation ") {
            OperationType::Mutation
        } else {
            OperationType::Query
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_operation_type() {
        assert_eq!(
            GraphQLRequest::query("{ users { id } }").operation_type(),
            OperationType::Query
        );
        assert_eq!(
            GraphQLRequest::mutation("mutation { createUser { id } }").operation_type(),
            OperationType::Mutation
        );
        let subscription = GraphQLRequest::subscription("subscription { userCreated { id } }");
        assert_eq!(subscription.operation_type(), OperationType::Subscription);
        assert!(subscription.is_subscription());
    }

    #[test]
    fn test_infer_operation_type() {
        assert_eq!(
            GraphQLRequest::new("query { users }").operation_type(),
            OperationType::Query
        );
        assert_eq!(
            GraphQLRequest::new("mutation { create }").operation_type(),
            OperationType::Mutation
        );
        assert_eq!(
            GraphQLRequest::new("subscription { events }").operation_type(),
            OperationType::Subscription
        );
    }

    #[test]
    fn test_variables() {
        let request = GraphQLRequest::query("query($id: ID!) { user(id: $id) { name } }")
            .variable("id", "123")
            .variable("limit", 10);

        let vars = request.variables.unwrap();
        assert_eq!(vars["id"], "123");
        assert_eq!(vars["limit"], 10);
    }

    #[test]
    fn test_operation_name() {
        let request =
            GraphQLRequest::query("query GetUser { user { id } }").operation_name("GetUser");
        assert_eq!(request.operation_name, Some("GetUser".to_string()));
    }

    #[test]
    fn test_serialization_skips_internal_fields() {
        let request = GraphQLRequest::subscription("subscription { events { id } }");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("operationName").is_none());
        assert!(json.get("variables").is_none());
        assert_eq!(json["query"], "subscription { events { id } }");
    }
}
