//! `PolicyKind` — configuration-level selector for the built-in policies.

use crate::adaptive::AdaptiveParams;
use crate::balanced::BalancedPolicy;
use crate::eager::EagerPolicy;
use crate::error::PolicyResult;
use crate::fair::FairPolicy;
use crate::lazy::LazyPolicy;
use crate::model::ContactPolicy;
use crate::relay::RelayPolicy;

/// A built-in policy and its tunables.
///
/// With the `serde` feature this is the `policies:` entry of a scenario file:
///
/// ```yaml
/// policies:
///   - kind: eager
///   - kind: balanced
///     alpha: 1.5
///   - kind: fair
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PolicyKind {
    Eager,
    Lazy,
    Relay,
    Balanced {
        #[cfg_attr(feature = "serde", serde(default = "default_alpha"))]
        alpha: f64,
        #[cfg_attr(feature = "serde", serde(default = "default_beta"))]
        beta:  f64,
    },
    Fair {
        #[cfg_attr(feature = "serde", serde(default = "default_alpha"))]
        alpha: f64,
        #[cfg_attr(feature = "serde", serde(default = "default_beta"))]
        beta:  f64,
    },
}

#[cfg(feature = "serde")]
fn default_alpha() -> f64 {
    AdaptiveParams::DEFAULT_ALPHA
}

#[cfg(feature = "serde")]
fn default_beta() -> f64 {
    AdaptiveParams::DEFAULT_BETA
}

impl PolicyKind {
    /// `Balanced` with the default tunables.
    pub fn balanced() -> Self {
        PolicyKind::Balanced { alpha: AdaptiveParams::DEFAULT_ALPHA, beta: AdaptiveParams::DEFAULT_BETA }
    }

    /// `Fair` with the default tunables.
    pub fn fair() -> Self {
        PolicyKind::Fair { alpha: AdaptiveParams::DEFAULT_ALPHA, beta: AdaptiveParams::DEFAULT_BETA }
    }

    /// Every built-in policy, adaptive ones with default tunables.
    pub fn all() -> [PolicyKind; 5] {
        [PolicyKind::Eager, PolicyKind::Lazy, PolicyKind::Relay, Self::balanced(), Self::fair()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Eager            => "eager",
            PolicyKind::Lazy             => "lazy",
            PolicyKind::Relay            => "relay",
            PolicyKind::Balanced { .. }  => "balanced",
            PolicyKind::Fair { .. }      => "fair",
        }
    }

    /// Instantiate a fresh policy.  Fails on invalid tunables.
    pub fn build(&self) -> PolicyResult<Box<dyn ContactPolicy + Send>> {
        Ok(match *self {
            PolicyKind::Eager => Box::new(EagerPolicy::new()),
            PolicyKind::Lazy  => Box::new(LazyPolicy::new()),
            PolicyKind::Relay => Box::new(RelayPolicy::new()),
            PolicyKind::Balanced { alpha, beta } => {
                Box::new(BalancedPolicy::new(AdaptiveParams::new(alpha, beta)?))
            }
            PolicyKind::Fair { alpha, beta } => {
                Box::new(FairPolicy::new(AdaptiveParams::new(alpha, beta)?))
            }
        })
    }
}
