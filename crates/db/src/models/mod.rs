//! Row structs mapping database tables to core domain types.

pub mod annotation;
