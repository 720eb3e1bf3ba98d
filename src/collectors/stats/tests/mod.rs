//! Test module organization for statistic extraction
//!
//! Property-style checks over the classifier live here; the unit tests for
//! individual helpers stay next to the code in `extractor.rs`.
