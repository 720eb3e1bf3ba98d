//! Test module organization for controller access
//!
//! - `client_tests`: response parsing and URL construction
//! - `probe_tests`: device probe behaviour against a scripted controller
