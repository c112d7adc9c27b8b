//! SIEVE OData - Query Compiler
//!
//! Compiles `sieve-core` data queries into OData v4 system query options:
//! - `operators`: which filter operators a field offers
//! - `generator`: `$filter` and `$orderby` expressions
//! - `flatten`: search form fields from view model metadata
//! - `params`: URL query strings
//! - `snapshot`: compact, URL-safe query snapshots

pub mod error;
pub mod flatten;
pub mod generator;
pub mod literal;
pub mod operators;
pub mod params;
pub mod snapshot;

pub use error::{GenerateError, GenerateResult};
pub use flatten::{filterable_fields, flatten, SearchFields};
pub use generator::ODataGenerator;
pub use literal::{format_utc, UTC_DATE_TIME_FORMAT};
pub use operators::{default_operator, supported_operators};
pub use params::ODataParams;
pub use snapshot::{decode_query, encode_query, QuerySnapshot, MAX_SNAPSHOT_BYTES};
