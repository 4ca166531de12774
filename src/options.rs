use serde_json::Value;

use crate::executor::{CountBranch, DataBranch};
use crate::labels::{CustomLabels, LabelSet};

/// Page size used when the caller supplies no usable limit.
pub const DEFAULT_LIMIT: u64 = 10;

// ---------------------------------------------------------------------------
// Raw options
// ---------------------------------------------------------------------------

/// Pagination options as supplied by the caller, one layer of the stack.
/// Every field is optional; an unset field inherits from the layer below
/// it (a global override layer, then the built-in defaults).
///
/// `page` and `offset` are mutually exclusive in intent: when both are
/// supplied, `offset` wins (see [`AddressingMode`]). `collation`,
/// `projection`, `select`, `options` and `lean` are passthrough for the
/// executor and are never interpreted here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginateOptions {
    pub page: Option<i64>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub pagination: Option<bool>,
    pub sort: Option<Value>,
    pub allow_disk_use: Option<bool>,
    pub custom_labels: Option<CustomLabels>,
    pub collation: Option<Value>,
    pub projection: Option<Value>,
    pub select: Option<Value>,
    pub options: Option<Value>,
    pub lean: Option<bool>,
}

/// Parse an integer option value. Accepts numbers (truncating floats) and
/// decimal strings; anything else is treated as unset.
fn parse_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn parse_labels(v: &Value) -> CustomLabels {
    let mut labels = CustomLabels::default();
    let Some(obj) = v.as_object() else {
        return labels;
    };
    let get = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    labels.total_docs = get("totalDocs");
    labels.limit = get("limit");
    labels.page = get("page");
    labels.total_pages = get("totalPages");
    labels.docs = get("docs");
    labels.next_page = get("nextPage");
    labels.prev_page = get("prevPage");
    labels.has_next_page = get("hasNextPage");
    labels.has_prev_page = get("hasPrevPage");
    labels.paging_counter = get("pagingCounter");
    labels.meta = get("meta");
    labels
}

impl PaginateOptions {
    /// Parse options from a loose JSON object.
    ///
    /// Total: malformed values degrade to their defaults instead of
    /// failing. A malformed `page` or `offset` still marks the key as
    /// present (it selects the addressing mode) but degrades to 1 and 0
    /// respectively; a malformed `limit` falls back to [`DEFAULT_LIMIT`]
    /// at resolve time. Non-object input yields empty options.
    pub fn from_json(request: &Value) -> PaginateOptions {
        let mut opts = PaginateOptions::default();
        let Some(obj) = request.as_object() else {
            return opts;
        };

        if let Some(v) = obj.get("page") {
            opts.page = Some(parse_int(v).unwrap_or(1));
        }
        if let Some(v) = obj.get("offset") {
            opts.offset = Some(parse_int(v).unwrap_or(0));
        }
        if let Some(v) = obj.get("limit") {
            opts.limit = parse_int(v);
        }
        if let Some(v) = obj.get("pagination") {
            opts.pagination = v.as_bool();
        }
        if let Some(v) = obj.get("allowDiskUse") {
            opts.allow_disk_use = v.as_bool();
        }
        if let Some(v) = obj.get("lean") {
            opts.lean = v.as_bool();
        }
        if let Some(v) = obj.get("customLabels") {
            opts.custom_labels = Some(parse_labels(v));
        }
        for (key, slot) in [
            ("sort", &mut opts.sort),
            ("collation", &mut opts.collation),
            ("projection", &mut opts.projection),
            ("select", &mut opts.select),
            ("options", &mut opts.options),
        ] {
            if let Some(v) = obj.get(key) {
                if !v.is_null() {
                    *slot = Some(v.clone());
                }
            }
        }

        opts
    }

    /// Overlay `self` on top of `base`: fields set here win, unset fields
    /// inherit. Custom labels merge field by field.
    pub fn overlay(&self, base: &PaginateOptions) -> PaginateOptions {
        let pick = |hi: &Option<Value>, lo: &Option<Value>| hi.clone().or_else(|| lo.clone());
        PaginateOptions {
            page: self.page.or(base.page),
            offset: self.offset.or(base.offset),
            limit: self.limit.or(base.limit),
            pagination: self.pagination.or(base.pagination),
            sort: pick(&self.sort, &base.sort),
            allow_disk_use: self.allow_disk_use.or(base.allow_disk_use),
            custom_labels: match (&self.custom_labels, &base.custom_labels) {
                (Some(hi), Some(lo)) => Some(hi.overlay(lo)),
                (Some(hi), None) => Some(hi.clone()),
                (None, lo) => lo.clone(),
            },
            collation: pick(&self.collation, &base.collation),
            projection: pick(&self.projection, &base.projection),
            select: pick(&self.select, &base.select),
            options: pick(&self.options, &base.options),
            lean: self.lean.or(base.lean),
        }
    }

    /// Collapse the layer stack (built-in defaults < `global` < `call`)
    /// and apply the coercion table:
    ///
    /// - `limit`: positive value kept, anything else becomes
    ///   [`DEFAULT_LIMIT`]
    /// - `page`: values below 1 become 1
    /// - `offset`: negative values become 0
    /// - `pagination`: defaults to true
    pub fn resolve(global: &PaginateOptions, call: &PaginateOptions) -> ResolvedOptions {
        let merged = call.overlay(global);

        let limit = match merged.limit {
            Some(n) if n > 0 => n as u64,
            _ => DEFAULT_LIMIT,
        };

        // Addressing-mode priority: offset, then page, then default.
        let mode = if let Some(offset) = merged.offset {
            AddressingMode::Offset(offset.max(0) as u64)
        } else if let Some(page) = merged.page {
            AddressingMode::Page(page.max(1) as u64)
        } else {
            AddressingMode::Default
        };

        // Saturating: an absurdly large page must degrade, not overflow.
        let skip = match mode {
            AddressingMode::Offset(offset) => offset,
            AddressingMode::Page(page) => (page - 1).saturating_mul(limit),
            AddressingMode::Default => 0,
        };

        let labels = match &merged.custom_labels {
            Some(overrides) => LabelSet::resolve(&[overrides]),
            None => LabelSet::default(),
        };

        ResolvedOptions {
            mode,
            limit,
            skip,
            pagination: merged.pagination.unwrap_or(true),
            sort: merged.sort,
            allow_disk_use: merged.allow_disk_use.unwrap_or(false),
            labels,
            collation: merged.collation,
            projection: merged.projection,
            select: merged.select,
            raw_options: merged.options,
            lean: merged.lean.unwrap_or(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

/// Which of the mutually exclusive addressing modes a request selected.
/// Exactly one is active per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// `offset` key supplied: absolute zero-based row offset.
    Offset(u64),
    /// `page` key supplied (and `offset` was not): 1-based page number.
    Page(u64),
    /// Neither supplied: page 1, offset 0.
    Default,
}

/// Options after layering and coercion: everything the executor handoff
/// and the envelope computation need, with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub mode: AddressingMode,
    /// Requested page size. The effective size differs only when
    /// pagination is disabled, in which case it becomes the total count.
    pub limit: u64,
    /// Rows to drop before the window, per the addressing mode.
    pub skip: u64,
    pub pagination: bool,
    pub sort: Option<Value>,
    pub allow_disk_use: bool,
    pub labels: LabelSet,
    pub collation: Option<Value>,
    pub projection: Option<Value>,
    pub select: Option<Value>,
    pub raw_options: Option<Value>,
    pub lean: bool,
}

impl ResolvedOptions {
    /// Window for the data branch. Skip/limit are withheld when
    /// pagination is disabled.
    pub fn data_branch(&self) -> DataBranch {
        let (skip, limit) = if self.pagination {
            (Some(self.skip), Some(self.limit))
        } else {
            (None, None)
        };
        DataBranch {
            sort: self.sort.clone(),
            skip,
            limit,
            allow_disk_use: self.allow_disk_use,
            collation: self.collation.clone(),
            projection: self.projection.clone(),
            select: self.select.clone(),
            lean: self.lean,
            raw_options: self.raw_options.clone(),
        }
    }

    /// Settings for the count branch: no sort, no window.
    pub fn count_branch(&self) -> CountBranch {
        CountBranch {
            allow_disk_use: self.allow_disk_use,
            collation: self.collation.clone(),
            raw_options: self.raw_options.clone(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::MetaField;
    use serde_json::json;

    fn resolve(call: PaginateOptions) -> ResolvedOptions {
        PaginateOptions::resolve(&PaginateOptions::default(), &call)
    }

    // -----------------------------------------------------------------------
    // Coercion
    // -----------------------------------------------------------------------

    #[test]
    fn limit_coercion_table() {
        let from = |v: Value| resolve(PaginateOptions::from_json(&json!({ "limit": v }))).limit;
        assert_eq!(from(json!(25)), 25);
        assert_eq!(from(json!("25")), 25);
        assert_eq!(from(json!("abc")), DEFAULT_LIMIT);
        assert_eq!(from(json!(-3)), DEFAULT_LIMIT);
        assert_eq!(from(json!("-3")), DEFAULT_LIMIT);
        assert_eq!(from(json!(0)), DEFAULT_LIMIT);
        assert_eq!(from(json!(null)), DEFAULT_LIMIT);
    }

    #[test]
    fn page_coercion() {
        assert_eq!(
            resolve(PaginateOptions::from_json(&json!({"page": 0}))).mode,
            AddressingMode::Page(1)
        );
        assert_eq!(
            resolve(PaginateOptions::from_json(&json!({"page": "3"}))).mode,
            AddressingMode::Page(3)
        );
        // malformed page still selects page mode
        assert_eq!(
            resolve(PaginateOptions::from_json(&json!({"page": "x"}))).mode,
            AddressingMode::Page(1)
        );
    }

    #[test]
    fn offset_coercion() {
        let resolved = resolve(PaginateOptions::from_json(&json!({"offset": -4})));
        assert_eq!(resolved.mode, AddressingMode::Offset(0));
        // malformed offset still selects offset mode
        let resolved = resolve(PaginateOptions::from_json(&json!({"offset": "x"})));
        assert_eq!(resolved.mode, AddressingMode::Offset(0));
    }

    #[test]
    fn from_json_is_total_on_garbage() {
        assert_eq!(PaginateOptions::from_json(&json!("nope")), PaginateOptions::default());
        assert_eq!(PaginateOptions::from_json(&json!(null)), PaginateOptions::default());
        let opts = PaginateOptions::from_json(&json!({"pagination": "yes", "customLabels": 7}));
        assert_eq!(opts.pagination, None);
        assert_eq!(opts.custom_labels, Some(CustomLabels::default()));
    }

    // -----------------------------------------------------------------------
    // Addressing mode & skip
    // -----------------------------------------------------------------------

    #[test]
    fn offset_wins_over_page() {
        let resolved = resolve(PaginateOptions {
            offset: Some(20),
            page: Some(5),
            limit: Some(10),
            ..Default::default()
        });
        assert_eq!(resolved.mode, AddressingMode::Offset(20));
        assert_eq!(resolved.skip, 20);
    }

    #[test]
    fn page_mode_skip() {
        let resolved = resolve(PaginateOptions {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        });
        assert_eq!(resolved.mode, AddressingMode::Page(3));
        assert_eq!(resolved.skip, 20);
    }

    #[test]
    fn huge_page_saturates_skip() {
        let resolved = resolve(PaginateOptions {
            page: Some(i64::MAX),
            limit: Some(10),
            ..Default::default()
        });
        assert_eq!(resolved.mode, AddressingMode::Page(i64::MAX as u64));
        assert_eq!(resolved.skip, u64::MAX);
    }

    #[test]
    fn default_mode_when_nothing_supplied() {
        let resolved = resolve(PaginateOptions::default());
        assert_eq!(resolved.mode, AddressingMode::Default);
        assert_eq!(resolved.skip, 0);
        assert_eq!(resolved.limit, DEFAULT_LIMIT);
        assert!(resolved.pagination);
    }

    // -----------------------------------------------------------------------
    // Layering
    // -----------------------------------------------------------------------

    #[test]
    fn global_layer_applies_and_call_shadows() {
        let global = PaginateOptions {
            limit: Some(50),
            allow_disk_use: Some(true),
            ..Default::default()
        };
        let inherited = PaginateOptions::resolve(&global, &PaginateOptions::default());
        assert_eq!(inherited.limit, 50);
        assert!(inherited.allow_disk_use);

        let call = PaginateOptions {
            limit: Some(5),
            ..Default::default()
        };
        let shadowed = PaginateOptions::resolve(&global, &call);
        assert_eq!(shadowed.limit, 5);
        assert!(shadowed.allow_disk_use);
    }

    #[test]
    fn label_layers_merge_across_options() {
        let global = PaginateOptions {
            custom_labels: Some(CustomLabels {
                docs: Some("rows".into()),
                limit: Some("pageSize".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let call = PaginateOptions {
            custom_labels: Some(CustomLabels {
                docs: Some("items".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let resolved = PaginateOptions::resolve(&global, &call);
        assert_eq!(resolved.labels.docs_key(), "items");
        assert_eq!(resolved.labels.key(MetaField::Limit), "pageSize");
    }

    // -----------------------------------------------------------------------
    // Branch handoff
    // -----------------------------------------------------------------------

    #[test]
    fn data_branch_carries_window_when_paginating() {
        let resolved = resolve(PaginateOptions {
            page: Some(2),
            limit: Some(10),
            sort: Some(json!({"name": 1})),
            ..Default::default()
        });
        let branch = resolved.data_branch();
        assert_eq!(branch.skip, Some(10));
        assert_eq!(branch.limit, Some(10));
        assert_eq!(branch.sort, Some(json!({"name": 1})));
    }

    #[test]
    fn data_branch_unwindowed_when_pagination_disabled() {
        let resolved = resolve(PaginateOptions {
            page: Some(2),
            limit: Some(10),
            pagination: Some(false),
            ..Default::default()
        });
        let branch = resolved.data_branch();
        assert_eq!(branch.skip, None);
        assert_eq!(branch.limit, None);
    }

    #[test]
    fn count_branch_never_sorted_or_windowed() {
        let resolved = resolve(PaginateOptions {
            sort: Some(json!({"name": 1})),
            allow_disk_use: Some(true),
            ..Default::default()
        });
        let branch = resolved.count_branch();
        assert!(branch.allow_disk_use);
        // CountBranch has no sort/skip/limit fields at all; only shared
        // settings cross over.
        assert_eq!(branch.raw_options, None);
    }
}
