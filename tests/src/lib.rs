//! # Business-Network Test Suite
//!
//! Cross-party membership flows on an in-process network of nodes.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs             # N authorised + M regular nodes
//!     ├── request_membership.rs  # Admission checks
//!     ├── management.rs          # Activate, suspend, revoke, roles
//!     ├── membership_sync.rs     # Who learns about whom
//!     └── lifecycle.rs           # End-to-end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bn-tests
//! cargo test -p bn-tests integration::membership_sync::
//! ```

pub mod integration;
