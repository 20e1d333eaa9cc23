//! Carebrief — progressive medical knowledge consolidation.
//!
//! Three cooperating stages turn untrusted AI extraction output into one
//! coherent, disclaimed health summary:
//! - `intake`: accept/reject verdicts over raw document extractions
//! - `merge`: fold accepted deltas into per-stream rolling narratives
//! - `overall`: combine profile + both narratives into a cached artifact
//!
//! The generative backend is consumed through `synthesis::SynthesisPort`;
//! persistence goes through `store::KnowledgeStore`. Both are traits so the
//! invariant logic is testable with deterministic fakes.

pub mod config;
pub mod constants;
pub mod intake;
pub mod merge;
pub mod overall;
pub mod store;
pub mod synthesis;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding this crate.
///
/// Honors RUST_LOG; falls back to the crate default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{} logging initialized", config::APP_NAME, config::APP_VERSION);
}
