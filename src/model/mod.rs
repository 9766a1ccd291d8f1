pub mod assay;
pub mod record;
pub mod summary;
