/// Active word query entity module
pub mod active_query;
/// Completed word query entity module
pub mod completed_query;

pub use active_query::Entity as ActiveQuery;
pub use completed_query::Entity as CompletedQuery;
