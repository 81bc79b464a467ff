//! Navigation error types.

use std::error::Error;
use std::fmt;
use wend_core::AgentId;

/// Errors surfaced to the host by the navigation layer.
///
/// Everything else degrades in place: an incomplete search is reported
/// on the outcome, an unresolvable obstruction falls back to a replan.
/// Only a goal that stays unreachable after the replan becomes an
/// error, so the host can idle the agent for the step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavError {
    /// No move sequence could be produced for the agent's goal.
    NoPathFound {
        /// The agent left without a path.
        agent: AgentId,
    },
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPathFound { agent } => write!(f, "no path found for agent {agent}"),
        }
    }
}

impl Error for NavError {}
