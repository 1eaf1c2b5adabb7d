//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the stub catalog data changes, update only this file.

// ============================================================================
// Stub Catalog Works
// ============================================================================

/// External ID of "Dune" by Frank Herbert
pub const DUNE_EXTERNAL_ID: &str = "OL893415W";

/// ISBN-13 reported for "Dune"
pub const DUNE_ISBN: &str = "9780441013593";

/// Cover image id reported for "Dune"
pub const DUNE_COVER_ID: i64 = 11481354;

/// External ID of "Dune Messiah" by Frank Herbert
pub const DUNE_MESSIAH_EXTERNAL_ID: &str = "OL893526W";

/// External ID of "The Left Hand of Darkness" by Ursula K. Le Guin
pub const LEFT_HAND_EXTERNAL_ID: &str = "OL59863W";

// ============================================================================
// Stub Catalog Behaviour
// ============================================================================

/// Query that makes the stub catalog answer with HTTP 500
pub const FAILING_QUERY: &str = "explode";

/// Query that makes the stub catalog answer with a body that is not JSON
pub const MALFORMED_QUERY: &str = "garbled";

/// Query that makes the stub catalog answer with JSON missing the `docs` field
pub const WRONG_SHAPE_QUERY: &str = "shapeless";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Default HTTP request timeout (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Timeout the server uses for stub catalog requests (seconds)
pub const CATALOG_TIMEOUT_SECS: u64 = 2;

/// Request body limit configured on the test server (bytes)
pub const TEST_MAX_BODY_BYTES: usize = 16 * 1024;
