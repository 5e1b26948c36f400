//! Relational store: schema, full-rebuild loader, and the read-only lookup
//! surface consumed by the report tooling.

pub mod builder;
pub mod lookup;
pub mod schema;

pub use builder::build;
pub use lookup::LookupDb;
pub use schema::initialize_schema;
