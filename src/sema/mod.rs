// src/sema/mod.rs
pub mod caches;
pub mod call_info;
pub mod host;
pub mod well_known;
pub mod wrappers;

pub use caches::ResolutionState;
pub use call_info::CallInfo;
pub use host::ResolveHost;
pub use well_known::WellKnown;
pub use wrappers::CallAdapter;

/// Driver-level switches for call-site adaptation.
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Warn at every call that takes the promotion path.
    pub report_promotion: bool,
    /// Generate the static/dynamic fast-follower probes alongside each
    /// promotion wrapper family.
    pub fast_follower_checks: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig {
            report_promotion: false,
            fast_follower_checks: true,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;
