// # Display Trait
//
// Defines the sink the rotation scheduler drives.
//
// ## Implementations
//
// - Logging display: `pagewheeld` writes each address to the log
// - Embedders: a browser frame, a kiosk window, a test recorder
//
// ## Usage
//
// ```rust,ignore
// use pagewheel_core::Display;
//
// struct Frame;
//
// #[async_trait::async_trait]
// impl Display for Frame {
//     async fn show(&self, address: &str) {
//         println!("now showing {}", address);
//     }
//
//     async fn clear(&self) {}
// }
// ```

use async_trait::async_trait;

/// Passive sink for rotation output
///
/// The scheduler calls [`Display::show`] once per rotation step and
/// [`Display::clear`] once when a running session stops.
///
/// # Failure Semantics
///
/// Neither method returns a value. A target that refuses to load (for
/// example one that forbids embedding) is a presentation concern: the
/// scheduler neither detects nor retries it.
///
/// # Timing
///
/// Calls happen on the scheduler's task. Implementations should return
/// promptly; a slow `show` delays arming of the next dwell timer.
#[async_trait]
pub trait Display: Send + Sync {
    /// Show the given absolute address
    async fn show(&self, address: &str);

    /// Clear whatever is currently shown
    async fn clear(&self);
}
