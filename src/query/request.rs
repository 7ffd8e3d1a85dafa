use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::IndexId;
use crate::query::constraint::WireConstraint;
use crate::schema::mapping::MappingKind;
use crate::schema::schema::CollectionSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

/// Count is the only aggregate the service computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub by_index: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub of_index: String,
    pub aggregate: Aggregate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order: Vec<OrderBy>,
    pub aggregation: Vec<Aggregation>,
    pub skip_results: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        QueryOptions::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, index_name: &str, direction: Direction) -> Self {
        self.order.push(OrderBy {
            by_index: index_name.to_string(),
            direction,
        });
        self
    }

    pub fn count(mut self, index_name: &str) -> Self {
        self.aggregation.push(Aggregation {
            of_index: index_name.to_string(),
            aggregate: Aggregate::Count,
        });
        self
    }

    pub fn skip_results(mut self) -> Self {
        self.skip_results = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingRequest {
    pub index_id: IndexId,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub index_id: IndexId,
    #[serde(rename = "type")]
    pub aggregate: Aggregate,
}

/// Everything the service needs to run one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub limit: u32,
    pub offset: Option<u32>,
    pub constraints: Vec<WireConstraint>,
    pub aggregates: Vec<AggregateRequest>,
    pub ordering: Vec<OrderingRequest>,
    pub skip_results: bool,
}

impl QueryRequest {
    /// Resolves index names in `options` to ids. A zero or absent limit
    /// falls back to `default_limit`. Ordering needs a range index.
    pub fn build(
        schema: &CollectionSchema,
        options: &QueryOptions,
        constraints: Vec<WireConstraint>,
        default_limit: u32,
    ) -> Result<Self> {
        let ordering = options
            .order
            .iter()
            .map(|order| {
                let (mapping, meta) = schema.index(&order.by_index)?;
                if mapping.kind() != MappingKind::Range {
                    return Err(Error::new(
                        ErrorKind::InvalidQuery,
                        format!(
                            "cannot order by {} index '{}' of collection '{}'; ordering needs a range index",
                            mapping.kind(),
                            order.by_index,
                            schema.name()
                        ),
                    ));
                }
                Ok(OrderingRequest {
                    index_id: meta.index_id,
                    direction: order.direction,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let aggregates = options
            .aggregation
            .iter()
            .map(|agg| {
                Ok(AggregateRequest {
                    index_id: schema.index_id(&agg.of_index)?,
                    aggregate: agg.aggregate,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryRequest {
            limit: options.limit.filter(|l| *l > 0).unwrap_or(default_limit),
            offset: options.offset,
            constraints,
            aggregates,
            ordering,
            skip_results: options.skip_results,
        })
    }
}
