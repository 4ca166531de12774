pub mod error;
pub mod executor;
pub mod labels;
pub mod options;
pub mod paginate;

pub use error::{Error, Result};
pub use executor::{AggregateExecutor, CountBranch, DataBranch};
pub use labels::{CustomLabels, LabelSet, MetaField};
pub use options::{AddressingMode, DEFAULT_LIMIT, PaginateOptions, ResolvedOptions};
pub use paginate::{PageMeta, Paginator, RawQueryResult, aggregate_paginate, compute_envelope};
