pub mod filename;
pub mod paths;
