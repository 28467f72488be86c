pub mod admin;
pub mod annotation;
pub mod catalog;
