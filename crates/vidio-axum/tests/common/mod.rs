//! Shared fixtures for vidio-axum integration tests.

// Not every test binary uses every fake.
#[allow(dead_code)]
pub mod fakes;
