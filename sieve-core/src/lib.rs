//! SIEVE Core - Query Model Types
//!
//! Field descriptors and paths, filter trees, data queries, dates and paged
//! sequences. Everything here is plain data plus the traits collaborators
//! implement; expression compilation lives in `sieve-odata`.

pub mod config;
pub mod date;
pub mod enums;
pub mod error;
pub mod field;
pub mod filter;
pub mod page;
pub mod query;

pub use config::GeneratorConfig;
pub use date::{
    Clock, DateFilter, DateFilterOption, DateTimeConverter, OffsetDateTimeConverter, SystemClock,
};
pub use enums::{Conjunction, DateDisplayMode, FieldKind, FilterOperator};
pub use error::{CoreError, CoreResult};
pub use field::{FieldAccessor, FieldDefinition, FieldPath, ListItem, ValueType, ViewModel};
pub use filter::{DataQueryFilter, FilterGroup, FilterNode, FilterValue};
pub use page::{data_page_stream, page_stream, source_stream, DataResponse, Page, PageSource};
pub use query::{DataQuery, SortSpec};
