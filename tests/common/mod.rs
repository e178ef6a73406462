// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod harness;

// Re-export commonly used test utilities
pub use builders::{entry, sample_context};
pub use harness::{init_tracing, FailingAnswerer, RecordingAnswerer, ScriptedProvider};
