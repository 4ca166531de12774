use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Logical metadata fields
// ---------------------------------------------------------------------------

/// The metadata fields of a result envelope. Each one maps to an output
/// key through a [`LabelSet`]; the mapping is applied exactly once, when
/// the envelope is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    TotalDocs,
    Limit,
    Page,
    TotalPages,
    NextPage,
    PrevPage,
    HasNextPage,
    HasPrevPage,
    PagingCounter,
}

impl MetaField {
    /// Built-in output key for this field.
    pub fn default_key(self) -> &'static str {
        match self {
            MetaField::TotalDocs => "totalDocs",
            MetaField::Limit => "limit",
            MetaField::Page => "page",
            MetaField::TotalPages => "totalPages",
            MetaField::NextPage => "nextPage",
            MetaField::PrevPage => "prevPage",
            MetaField::HasNextPage => "hasNextPage",
            MetaField::HasPrevPage => "hasPrevPage",
            MetaField::PagingCounter => "pagingCounter",
        }
    }

    /// Position of this field in [`META_FIELDS`] and in `LabelSet::keys`.
    const fn index(self) -> usize {
        match self {
            MetaField::TotalDocs => 0,
            MetaField::Limit => 1,
            MetaField::Page => 2,
            MetaField::TotalPages => 3,
            MetaField::NextPage => 4,
            MetaField::PrevPage => 5,
            MetaField::HasNextPage => 6,
            MetaField::HasPrevPage => 7,
            MetaField::PagingCounter => 8,
        }
    }
}

/// Default key for the document list.
pub const DEFAULT_DOCS_KEY: &str = "docs";

// ---------------------------------------------------------------------------
// Caller overrides
// ---------------------------------------------------------------------------

/// Caller-chosen output key overrides. Unset fields fall back to the
/// built-in defaults. `meta` is special: unset means a flat envelope,
/// set means every metadata field nests under that key next to the
/// document list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomLabels {
    pub total_docs: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub total_pages: Option<String>,
    pub docs: Option<String>,
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub has_next_page: Option<String>,
    pub has_prev_page: Option<String>,
    pub paging_counter: Option<String>,
    pub meta: Option<String>,
}

impl CustomLabels {
    /// Overlay `self` on top of `base`: fields set here win, unset fields
    /// inherit from `base`.
    pub fn overlay(&self, base: &CustomLabels) -> CustomLabels {
        let pick = |hi: &Option<String>, lo: &Option<String>| hi.clone().or_else(|| lo.clone());
        CustomLabels {
            total_docs: pick(&self.total_docs, &base.total_docs),
            limit: pick(&self.limit, &base.limit),
            page: pick(&self.page, &base.page),
            total_pages: pick(&self.total_pages, &base.total_pages),
            docs: pick(&self.docs, &base.docs),
            next_page: pick(&self.next_page, &base.next_page),
            prev_page: pick(&self.prev_page, &base.prev_page),
            has_next_page: pick(&self.has_next_page, &base.has_next_page),
            has_prev_page: pick(&self.has_prev_page, &base.has_prev_page),
            paging_counter: pick(&self.paging_counter, &base.paging_counter),
            meta: pick(&self.meta, &base.meta),
        }
    }

    fn get(&self, field: MetaField) -> &Option<String> {
        match field {
            MetaField::TotalDocs => &self.total_docs,
            MetaField::Limit => &self.limit,
            MetaField::Page => &self.page,
            MetaField::TotalPages => &self.total_pages,
            MetaField::NextPage => &self.next_page,
            MetaField::PrevPage => &self.prev_page,
            MetaField::HasNextPage => &self.has_next_page,
            MetaField::HasPrevPage => &self.has_prev_page,
            MetaField::PagingCounter => &self.paging_counter,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved label set
// ---------------------------------------------------------------------------

const META_FIELDS: [MetaField; 9] = [
    MetaField::TotalDocs,
    MetaField::Limit,
    MetaField::Page,
    MetaField::TotalPages,
    MetaField::NextPage,
    MetaField::PrevPage,
    MetaField::HasNextPage,
    MetaField::HasPrevPage,
    MetaField::PagingCounter,
];

/// Fully resolved output keys: every metadata field has a concrete key,
/// plus the docs key and the optional meta nesting key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    keys: [String; 9],
    docs: String,
    meta: Option<String>,
}

impl LabelSet {
    /// Collapse a stack of override layers onto the built-in defaults.
    /// Later layers win over earlier ones; unset fields in a later layer
    /// never shadow a set field below it.
    pub fn resolve(layers: &[&CustomLabels]) -> LabelSet {
        let keys = META_FIELDS.map(|field| {
            layers
                .iter()
                .rev()
                .find_map(|layer| layer.get(field).clone())
                .unwrap_or_else(|| field.default_key().to_string())
        });
        let docs = layers
            .iter()
            .rev()
            .find_map(|layer| layer.docs.clone())
            .unwrap_or_else(|| DEFAULT_DOCS_KEY.to_string());
        let meta = layers.iter().rev().find_map(|layer| layer.meta.clone());
        LabelSet { keys, docs, meta }
    }

    /// Output key for a metadata field.
    pub fn key(&self, field: MetaField) -> &str {
        &self.keys[field.index()]
    }

    /// Output key for the document list.
    pub fn docs_key(&self) -> &str {
        &self.docs
    }

    /// Nesting key for the metadata, if one was configured.
    pub fn meta_key(&self) -> Option<&str> {
        self.meta.as_deref()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        LabelSet::resolve(&[])
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_keys() {
        let labels = LabelSet::default();
        assert_eq!(labels.key(MetaField::TotalDocs), "totalDocs");
        assert_eq!(labels.key(MetaField::PagingCounter), "pagingCounter");
        assert_eq!(labels.docs_key(), "docs");
        assert_eq!(labels.meta_key(), None);
    }

    #[test]
    fn single_layer_override() {
        let layer = CustomLabels {
            docs: Some("items".into()),
            total_docs: Some("itemCount".into()),
            ..Default::default()
        };
        let labels = LabelSet::resolve(&[&layer]);
        assert_eq!(labels.docs_key(), "items");
        assert_eq!(labels.key(MetaField::TotalDocs), "itemCount");
        // untouched fields keep their defaults
        assert_eq!(labels.key(MetaField::Limit), "limit");
    }

    #[test]
    fn later_layer_wins_but_unset_fields_inherit() {
        let global = CustomLabels {
            docs: Some("rows".into()),
            limit: Some("pageSize".into()),
            ..Default::default()
        };
        let call = CustomLabels {
            docs: Some("items".into()),
            ..Default::default()
        };
        let labels = LabelSet::resolve(&[&global, &call]);
        assert_eq!(labels.docs_key(), "items");
        assert_eq!(labels.key(MetaField::Limit), "pageSize");
    }

    #[test]
    fn overlay_merges_field_by_field() {
        let base = CustomLabels {
            page: Some("current".into()),
            meta: Some("paginator".into()),
            ..Default::default()
        };
        let top = CustomLabels {
            page: Some("pageNumber".into()),
            ..Default::default()
        };
        let merged = top.overlay(&base);
        assert_eq!(merged.page.as_deref(), Some("pageNumber"));
        assert_eq!(merged.meta.as_deref(), Some("paginator"));
    }

    #[test]
    fn meta_label_resolves_to_nesting_key() {
        let layer = CustomLabels {
            meta: Some("pageInfo".into()),
            ..Default::default()
        };
        let labels = LabelSet::resolve(&[&layer]);
        assert_eq!(labels.meta_key(), Some("pageInfo"));
    }

    #[test]
    fn deserializes_from_camel_case_json() {
        let labels: CustomLabels = serde_json::from_value(serde_json::json!({
            "totalDocs": "total",
            "pagingCounter": "serial",
            "meta": "pageInfo"
        }))
        .unwrap();
        assert_eq!(labels.total_docs.as_deref(), Some("total"));
        assert_eq!(labels.paging_counter.as_deref(), Some("serial"));
        assert_eq!(labels.meta.as_deref(), Some("pageInfo"));
        assert_eq!(labels.docs, None);
    }
}
