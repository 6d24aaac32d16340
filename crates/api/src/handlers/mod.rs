pub mod admin;
pub mod annotations;
pub mod stats;
