use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::executor::AggregateExecutor;
use crate::labels::{LabelSet, MetaField};
use crate::options::{AddressingMode, PaginateOptions, ResolvedOptions};

// ---------------------------------------------------------------------------
// Raw result
// ---------------------------------------------------------------------------

/// The two raw results the executor hands back: the windowed document
/// sequence from the data branch and the total row count from the count
/// branch.
#[derive(Debug, Clone, Default)]
pub struct RawQueryResult {
    pub docs: Vec<Value>,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Page metadata
// ---------------------------------------------------------------------------

/// Pagination metadata, computed before any output labels are applied.
///
/// Always derived from the inputs on every call; nothing here is
/// persisted or supplied independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total_docs: u64,
    /// Effective page size: the requested limit, or the total count when
    /// pagination is disabled.
    pub limit: u64,
    /// Current 1-based page. In offset mode this is derived from the
    /// offset for display purposes.
    pub page: u64,
    /// None when the effective limit is 0 (pagination disabled over an
    /// empty result); otherwise at least 1, even for zero rows.
    pub total_pages: Option<u64>,
    /// Present only in offset addressing mode.
    pub offset: Option<u64>,
    /// 1-based ordinal of the first row on the current page.
    pub paging_counter: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl PageMeta {
    /// Derive the metadata for `count` total rows under the resolved
    /// options. Pure arithmetic, total over all inputs.
    pub fn compute(count: u64, resolved: &ResolvedOptions) -> PageMeta {
        // Pagination disabled: the whole result is page 1 of 1, whatever
        // addressing the caller asked for.
        let (limit, mode) = if resolved.pagination {
            (resolved.limit, resolved.mode)
        } else {
            (count, AddressingMode::Page(1))
        };

        let total_pages = if limit == 0 {
            None
        } else {
            Some(count.div_ceil(limit).max(1))
        };

        // Saturating throughout: extreme offsets and page numbers must
        // degrade, not overflow.
        let (page, offset, paging_counter) = match mode {
            AddressingMode::Offset(offset) => {
                // ceil((offset + 1) / limit)
                let page = if limit == 0 {
                    1
                } else {
                    (offset / limit).saturating_add(1)
                };
                (page, Some(offset), offset.saturating_add(1))
            }
            AddressingMode::Page(page) => {
                let counter = (page - 1).saturating_mul(limit).saturating_add(1);
                (page, None, counter)
            }
            AddressingMode::Default => (1, None, 1),
        };

        let has_prev_page = page > 1;
        let has_next_page = total_pages.is_some_and(|pages| page < pages);

        PageMeta {
            total_docs: count,
            limit,
            page,
            total_pages,
            offset,
            paging_counter,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
        }
    }

    /// Render the metadata fields into `out`, applying the label mapping.
    /// The `offset` field keeps its literal key; it has no label.
    fn render_into(&self, out: &mut Map<String, Value>, labels: &LabelSet) {
        let null_or = |v: Option<u64>| match v {
            Some(n) => json!(n),
            None => Value::Null,
        };
        let mut put = |field: MetaField, value: Value| {
            out.insert(labels.key(field).to_string(), value);
        };
        put(MetaField::TotalDocs, json!(self.total_docs));
        put(MetaField::Limit, json!(self.limit));
        put(MetaField::Page, json!(self.page));
        put(MetaField::TotalPages, null_or(self.total_pages));
        put(MetaField::PagingCounter, json!(self.paging_counter));
        put(MetaField::HasPrevPage, json!(self.has_prev_page));
        put(MetaField::HasNextPage, json!(self.has_next_page));
        put(MetaField::PrevPage, null_or(self.prev_page));
        put(MetaField::NextPage, null_or(self.next_page));
        if let Some(offset) = self.offset {
            out.insert("offset".to_string(), json!(offset));
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope assembly
// ---------------------------------------------------------------------------

/// Assemble the result envelope from the two raw results. Pure: no I/O,
/// never fails.
///
/// The document list sits under the docs label. Metadata fields sit flat
/// next to it, unless a meta label is configured, in which case they all
/// nest under that single key.
pub fn compute_envelope(raw: RawQueryResult, resolved: &ResolvedOptions) -> Value {
    let meta = PageMeta::compute(raw.count, resolved);
    let labels = &resolved.labels;

    let mut fields = Map::new();
    meta.render_into(&mut fields, labels);

    let mut envelope = Map::new();
    envelope.insert(labels.docs_key().to_string(), Value::Array(raw.docs));
    match labels.meta_key() {
        Some(meta_key) => {
            envelope.insert(meta_key.to_string(), Value::Object(fields));
        }
        None => envelope.extend(fields),
    }
    Value::Object(envelope)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Pagination entry point carrying a global default options layer, applied
/// beneath each call's own options (built-in defaults sit below both).
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    defaults: PaginateOptions,
}

impl Paginator {
    pub fn new() -> Paginator {
        Paginator::default()
    }

    /// Install a global override layer: above the built-in defaults,
    /// below every per-call option set.
    pub fn with_defaults(defaults: PaginateOptions) -> Paginator {
        Paginator { defaults }
    }

    /// Run both branches of `pipeline` through `executor` and assemble
    /// the result envelope. A failure on either branch aborts the whole
    /// call; no partial envelope is returned.
    pub fn paginate<E: AggregateExecutor>(
        &self,
        executor: &E,
        pipeline: &[Value],
        options: &PaginateOptions,
    ) -> Result<Value> {
        let resolved = PaginateOptions::resolve(&self.defaults, options);
        let docs = executor.run_data(pipeline, &resolved.data_branch())?;
        let count = executor.run_count(pipeline, &resolved.count_branch())?;
        Ok(compute_envelope(RawQueryResult { docs, count }, &resolved))
    }
}

/// [`Paginator::paginate`] without a global override layer.
pub fn aggregate_paginate<E: AggregateExecutor>(
    executor: &E,
    pipeline: &[Value],
    options: &PaginateOptions,
) -> Result<Value> {
    Paginator::new().paginate(executor, pipeline, options)
}

// ===========================================================================
// Tests
// ===========================================================================
