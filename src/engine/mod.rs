mod query;
mod suggest;
#[cfg(test)]
mod tests;

pub use query::{apply, AggregateTotals, DerivedView};
pub use suggest::{default_catalog, suggest, Suggester, Suggestions, MIN_QUERY_CHARS, SUGGESTION_DEBOUNCE};
