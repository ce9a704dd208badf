//! Ngopi Core -- canonical query model, alias normalization, query
//! compilation, predicate translation, and pagination for the cafe
//! catalog. Pure and I/O-free; shared by the server and the client.

pub mod alias;
pub mod compile;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod page;
pub mod predicate;
pub mod query;
pub mod resources;
pub mod spec;

pub use envelope::{ErrorEnvelope, ListEnvelope};
pub use error::ValidationError;
pub use page::{PageResult, Pagination};
pub use predicate::{translate, OrderBy, Predicate, PredicateSet};
pub use query::{CanonicalQuery, FilterValue, RawQuery, SortDirection};
pub use spec::{FieldKind, FieldSpec, ResourceSpec, SortableField};
