pub mod schema;

pub use schema::{build_schema, MoodSchema};
