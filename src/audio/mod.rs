pub mod metadata;
pub mod scan;
