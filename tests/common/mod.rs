#![allow(dead_code)]
//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestEnv, OWNER_USERNAME};
//!
//! #[tokio::test]
//! async fn test_list_songs() {
//!     let env = TestEnv::new();
//!     let playlist_id = env.service.add_playlist("Mine", &env.owner_id).unwrap();
//! }
//! ```

mod constants;
mod fixtures;
mod publisher;

pub use constants::*;
pub use fixtures::TestEnv;
pub use publisher::RecordingPublisher;
