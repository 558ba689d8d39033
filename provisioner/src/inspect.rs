//! Read-only queries against provisioned resources

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    backend::ResourceBackend,
    errors::QueryError,
    placeholder::{Resolver, Variables},
    registry::ResolvedRegistry,
};

/// A query to run against one resource
#[derive(Clone, Debug, PartialEq)]
pub struct QueryRequest {
    /// A resource name, or a placeholder template such as `${var:token}`
    pub target: String,
    /// The query message, possibly containing placeholders
    pub query: Value,
}

impl QueryRequest {
    /// Build a query request
    pub fn new(target: impl Into<String>, query: Value) -> Self {
        Self {
            target: target.into(),
            query,
        }
    }
}

/// The outcome of one query
#[derive(Clone, Debug, PartialEq)]
pub struct QueryResult {
    /// Position of the request in the submitted sequence
    pub index: usize,
    /// The request's target as submitted
    pub target: String,
    /// The resolved query that was sent, if resolution succeeded
    pub query: Option<Value>,
    /// The backend's answer, or why there is none
    pub outcome: Result<Value, QueryError>,
}

impl QueryResult {
    /// Whether the query succeeded
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run `requests` in order, reporting each outcome.
///
/// A failed query never stops the ones after it.
pub async fn run_queries<B: ResourceBackend + ?Sized>(
    registry: &ResolvedRegistry,
    variables: &Variables,
    requests: &[QueryRequest],
    backend: &B,
) -> Vec<QueryResult> {
    let resolver = Resolver::new(registry, variables);
    let mut results = Vec::with_capacity(requests.len());

    for (index, request) in requests.iter().enumerate() {
        let resolved = resolver
            .resolve_target(&request.target)
            .and_then(|address| Ok((address, resolver.resolve_value(&request.query)?)));

        let (query, outcome) = match resolved {
            Ok((address, query)) => {
                let outcome = backend
                    .query(&address, &query)
                    .await
                    .map_err(QueryError::Backend);
                (Some(query), outcome)
            }
            Err(e) => (None, Err(QueryError::from(e))),
        };

        match &outcome {
            Ok(response) => info!(index, resource = %request.target, response = %response, "query"),
            Err(e) => warn!(index, resource = %request.target, error = %e, "query failed"),
        }

        results.push(QueryResult {
            index,
            target: request.target.clone(),
            query,
            outcome,
        });
    }

    results
}
