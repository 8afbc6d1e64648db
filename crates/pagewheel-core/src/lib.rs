// # pagewheel-core
//
// Core library for randomized page rotation.
//
// ## Architecture Overview
//
// - **parser**: Operator text → `AddressList` (scheme correction, comments, blanks)
// - **SitemapResolver**: Index document address → `AddressList`, through an
//   ordered retrieval chain that always degrades to something startable
// - **RotationScheduler**: Start/stop state machine, random pick and dwell,
//   countdown feedback, status events
// - **Display** / **Fetcher**: Injected capabilities for output and retrieval
//
// ## Design Principles
//
// 1. **Library-First**: The daemon is a thin wrapper; everything lives here
// 2. **Injected I/O**: No display technology or HTTP client is hard-wired
// 3. **Single Owner**: Session state is mutated by one task only
// 4. **Graceful Degradation**: Resolution never fails; bad input is rejected
//    before any state transition

pub mod config;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod scheduler;
pub mod traits;

// Re-export core types for convenience
pub use config::{PagewheelConfig, ResolverConfig, SchedulerConfig, StrategyConfig};
pub use error::{Error, Result};
pub use parser::AddressList;
pub use resolver::{Provenance, Resolution, SitemapResolver};
pub use scheduler::{RotationScheduler, SchedulerEvent, SchedulerState, Session};
pub use traits::{Display, FetchResponse, Fetcher};
