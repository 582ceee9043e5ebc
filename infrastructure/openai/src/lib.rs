pub mod client;
pub mod structured_extraction;
