//! Output artifacts: the device plan and the verified script listing.
pub mod json;
pub mod script;
