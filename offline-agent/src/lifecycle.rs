//! Lifecycle State Machine
//!
//! Coordinates install → activate → control-takeover. Installation runs
//! the precache; activation reaps every cache generation other than the
//! current one and claims all open clients. A fully successful install
//! requests immediate activation instead of waiting for old instances to
//! release control.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::cache::CacheStorage;
use crate::clients::ClientRegistry;
use crate::config::AgentConfig;
use crate::net::NetworkFetch;
use crate::precache::{precache, PrecacheReport};

/// Agent lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Initial state, not yet installing.
    Parsed,
    /// Install signal being handled (precache in flight).
    Installing,
    /// Installed, waiting to activate.
    Installed,
    /// Activate signal being handled (reaper in flight).
    Activating,
    /// Active and controlling clients.
    Activated,
    /// Replaced or failed; no longer serving.
    Redundant,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::Parsed
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Lifecycle error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LifecycleError {
    /// Requested transition is not in the state machine.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// State before the attempt.
        from: AgentState,
        /// Requested state.
        to: AgentState,
    },
}

/// Check if a state transition is valid.
fn is_valid_transition(from: AgentState, to: AgentState) -> bool {
    use AgentState::*;

    matches!(
        (from, to),
        // Normal lifecycle
        (Parsed, Installing) |
        (Installing, Installed) |
        (Installing, Redundant) |  // Install failed
        (Installed, Activating) |
        (Activating, Activated) |
        (Activating, Redundant) |  // Activate failed
        (Activated, Redundant) // Replaced by a new generation
    )
}

/// Drives lifecycle transitions and owns the install/activate barriers.
pub struct LifecycleController {
    config: Arc<AgentConfig>,
    cache: CacheStorage,
    network: Arc<dyn NetworkFetch>,
    state: AgentState,
    /// Set by a complete install or a `SKIP_WAITING` message; cleared on
    /// activation.
    skip_waiting_requested: bool,
}

impl LifecycleController {
    /// Create a controller in the initial state.
    pub fn new(
        config: Arc<AgentConfig>,
        cache: CacheStorage,
        network: Arc<dyn NetworkFetch>,
    ) -> Self {
        Self {
            config,
            cache,
            network,
            state: AgentState::Parsed,
            skip_waiting_requested: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Whether the agent is installed and waiting to activate.
    pub fn is_waiting(&self) -> bool {
        self.state == AgentState::Installed
    }

    /// Whether the agent is active.
    pub fn is_active(&self) -> bool {
        self.state == AgentState::Activated
    }

    /// Whether immediate activation has been requested.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting_requested
    }

    fn transition(&mut self, to: AgentState) -> Result<(), LifecycleError> {
        if !is_valid_transition(self.state, to) {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!("lifecycle: {} -> {to}", self.state);
        self.state = to;
        Ok(())
    }

    /// Handle the install signal.
    ///
    /// Runs the precache to completion (the install barrier) and reports
    /// it. Precache failure never blocks installation: the agent ends up
    /// `Installed` either way, but only a complete precache requests
    /// immediate activation.
    pub async fn install(&mut self) -> Result<PrecacheReport, LifecycleError> {
        self.transition(AgentState::Installing)?;
        info!("lifecycle: installing, cache '{}'", self.config.cache_name);

        let report = precache(&self.cache, self.network.as_ref(), &self.config).await;
        if report.complete() {
            // Trade a brief window of mixed generations for faster
            // rollout: don't wait for old instances to release control.
            self.skip_waiting_requested = true;
        } else {
            warn!(
                "lifecycle: precache incomplete ({} failures), staying in waiting",
                report.failures.len()
            );
        }

        self.transition(AgentState::Installed)?;
        Ok(report)
    }

    /// Handle the activate signal.
    ///
    /// Reaps every store whose name differs from the current version tag,
    /// then takes control of all open clients. Activation completes only
    /// after every deletion attempt has resolved and control is claimed.
    pub async fn activate(
        &mut self,
        clients: &mut ClientRegistry,
    ) -> Result<(), LifecycleError> {
        self.transition(AgentState::Activating)?;

        let current = self.config.cache_name.clone();
        for name in self.cache.keys().await {
            if name == current {
                continue;
            }
            match self.cache.delete(&name).await {
                Ok(true) => info!("lifecycle: reaped stale cache '{name}'"),
                Ok(false) => {}
                // Leaked until a future activation; no retry is scheduled.
                Err(e) => warn!("lifecycle: failed to delete cache '{name}': {e}"),
            }
        }

        self.transition(AgentState::Activated)?;
        self.skip_waiting_requested = false;

        let claimed = clients.claim();
        info!("lifecycle: activated '{current}', claimed {claimed} clients");
        Ok(())
    }

    /// Record an external `SKIP_WAITING` request.
    ///
    /// Only meaningful while waiting; the caller (the agent dispatch)
    /// follows up by running [`activate`](Self::activate). Returns whether
    /// the request applies in the current state.
    pub fn skip_waiting(&mut self) -> bool {
        if self.is_waiting() {
            info!("lifecycle: skip-waiting requested");
            self.skip_waiting_requested = true;
            true
        } else {
            debug!("lifecycle: skip-waiting ignored in state {}", self.state);
            false
        }
    }

    /// Mark this agent generation as replaced.
    pub fn retire(&mut self) -> Result<(), LifecycleError> {
        self.transition(AgentState::Redundant)
    }
}
