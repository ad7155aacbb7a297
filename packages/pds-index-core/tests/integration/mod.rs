//! Integration test suite for label loading and index reading.
//!
//! 1. Label loading from disk
//! 2. Reading paired data files
//! 3. Folder collections and HiRISE repair

pub mod collection_tests;
pub mod helpers;
pub mod label_tests;
pub mod reader_tests;
