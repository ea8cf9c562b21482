//! CSV as a flat substrate: every row is one flattened value, the header row holds
//! the rendered paths.
//!
//! `null` leaves are written as empty cells and empty cells read back as `null`. All
//! other leaves come back as strings, since CSV carries no types.
pub mod read;
pub mod write;
