use serde_json::{Value, json};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Branch descriptors
// ---------------------------------------------------------------------------

/// Window and settings applied to the data branch of a pipeline.
///
/// `skip` is applied before `limit`; both are `None` when pagination is
/// disabled for the request. Sort applies to this branch only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataBranch {
    pub sort: Option<Value>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub allow_disk_use: bool,
    /// Opaque passthrough settings: never interpreted by this crate.
    pub collation: Option<Value>,
    pub projection: Option<Value>,
    pub select: Option<Value>,
    pub lean: bool,
    pub raw_options: Option<Value>,
}

/// Settings for the count branch. The count branch is never sorted and
/// never windowed; it sees the same disk-use and passthrough settings as
/// the data branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountBranch {
    pub allow_disk_use: bool,
    pub collation: Option<Value>,
    pub raw_options: Option<Value>,
}

// ---------------------------------------------------------------------------
// Executor boundary
// ---------------------------------------------------------------------------

/// The black-box query boundary. Implementations own pipeline execution,
/// transport, and document (de)serialization; this crate only decides the
/// window handed to each branch and interprets the two results.
///
/// The two branches share no state and have no ordering dependency, so an
/// implementation may run them in parallel or sequentially with identical
/// results. A failure on either branch aborts the whole operation.
pub trait AggregateExecutor {
    /// Run the pipeline with the data-branch window applied and return the
    /// resulting document sequence, in order.
    fn run_data(&self, pipeline: &[Value], branch: &DataBranch) -> Result<Vec<Value>>;

    /// Run the pipeline wrapped in a count-grouping stage and return the
    /// total row count (0 when the pipeline matches nothing).
    fn run_count(&self, pipeline: &[Value], branch: &CountBranch) -> Result<u64>;
}

/// The canonical stage a count branch appends to the caller's pipeline:
/// one group over everything, summing 1 per row.
pub fn count_group_stage() -> Value {
    json!({"$group": {"_id": null, "count": {"$sum": 1}}})
}

/// Extract the total from the rows produced by [`count_group_stage`]: the
/// first row's `count`, or 0 when the group emitted no rows because the
/// pipeline matched nothing.
pub fn count_from_group_rows(rows: &[Value]) -> u64 {
    rows.first()
        .and_then(|row| row.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

// ===========================================================================
// Tests
// ===========================================================================
