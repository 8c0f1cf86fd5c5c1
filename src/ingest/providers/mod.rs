pub mod static_table;
pub mod web_search;

pub use static_table::StaticProvider;
pub use web_search::{QueryProvider, QuerySettings};
