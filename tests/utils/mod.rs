pub mod assertions;
pub mod client;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{assert_refused, assert_succeeded, wait_until};
#[allow(unused_imports)]
pub use client::{MemberClient, NamespaceClient};
#[allow(unused_imports)]
pub use setup::{FakeBackend, TestServer};
