//! Pod status resolution
//!
//! A pod's displayed status starts as its lifecycle phase and is overwritten,
//! container by container in order, by any waiting or terminated reason.
//! The last container that is waiting or terminated wins; the two states
//! carry no priority over each other.

use k8s_openapi::api::core::v1::ContainerStatus;
use serde::{Deserialize, Serialize};

/// Runtime state of a single container, reduced to what status resolution needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContainerCondition {
    Waiting { reason: String },
    Terminated { reason: String },
    /// Running, or no state reported yet. Leaves the status untouched.
    Running,
}

impl ContainerCondition {
    pub fn from_status(status: &ContainerStatus) -> Self {
        let Some(state) = status.state.as_ref() else {
            return ContainerCondition::Running;
        };

        if let Some(waiting) = &state.waiting {
            ContainerCondition::Waiting {
                reason: waiting
                    .reason
                    .clone()
                    .unwrap_or_else(|| "Waiting".to_string()),
            }
        } else if let Some(terminated) = &state.terminated {
            ContainerCondition::Terminated {
                reason: terminated
                    .reason
                    .clone()
                    .unwrap_or_else(|| "Terminated".to_string()),
            }
        } else {
            ContainerCondition::Running
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ContainerCondition::Waiting { reason } | ContainerCondition::Terminated { reason } => {
                Some(reason)
            }
            ContainerCondition::Running => None,
        }
    }
}

/// Resolve the status shown for a pod.
pub fn resolve_status(phase: &str, containers: &[ContainerCondition]) -> String {
    containers
        .iter()
        .filter_map(ContainerCondition::reason)
        .last()
        .unwrap_or(phase)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        ContainerState, ContainerStateRunning, ContainerStateTerminated, ContainerStateWaiting,
    };

    fn waiting(reason: &str) -> ContainerCondition {
        ContainerCondition::Waiting {
            reason: reason.to_string(),
        }
    }

    fn terminated(reason: &str) -> ContainerCondition {
        ContainerCondition::Terminated {
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_no_containers_returns_phase() {
        assert_eq!(resolve_status("Pending", &[]), "Pending");
        assert_eq!(resolve_status("", &[]), "");
    }

    #[test]
    fn test_running_containers_keep_phase() {
        let containers = vec![ContainerCondition::Running, ContainerCondition::Running];
        assert_eq!(resolve_status("Running", &containers), "Running");
    }

    #[test]
    fn test_last_reason_wins() {
        let containers = vec![
            waiting("ImagePullBackOff"),
            ContainerCondition::Running,
            terminated("Error"),
            ContainerCondition::Running,
        ];
        assert_eq!(resolve_status("Running", &containers), "Error");
    }

    #[test]
    fn test_position_beats_severity() {
        let containers = vec![terminated("OOMKilled"), waiting("ContainerCreating")];
        assert_eq!(resolve_status("Pending", &containers), "ContainerCreating");

        let reversed = vec![waiting("ContainerCreating"), terminated("OOMKilled")];
        assert_eq!(resolve_status("Pending", &reversed), "OOMKilled");
    }

    #[test]
    fn test_from_status_waiting_before_terminated() {
        let status = ContainerStatus {
            name: "app".to_string(),
            state: Some(ContainerState {
                waiting: Some(ContainerStateWaiting {
                    reason: Some("CrashLoopBackOff".to_string()),
                    message: None,
                }),
                terminated: Some(ContainerStateTerminated {
                    reason: Some("Error".to_string()),
                    exit_code: 1,
                    ..Default::default()
                }),
                running: None,
            }),
            ..Default::default()
        };
        assert_eq!(
            ContainerCondition::from_status(&status),
            waiting("CrashLoopBackOff")
        );
    }

    #[test]
    fn test_from_status_missing_reason_uses_state_name() {
        let status = ContainerStatus {
            name: "app".to_string(),
            state: Some(ContainerState {
                terminated: Some(ContainerStateTerminated {
                    reason: None,
                    exit_code: 0,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            ContainerCondition::from_status(&status),
            terminated("Terminated")
        );
    }

    #[test]
    fn test_from_status_running_or_absent() {
        let running = ContainerStatus {
            name: "app".to_string(),
            state: Some(ContainerState {
                running: Some(ContainerStateRunning { started_at: None }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            ContainerCondition::from_status(&running),
            ContainerCondition::Running
        );

        let absent = ContainerStatus {
            name: "app".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ContainerCondition::from_status(&absent),
            ContainerCondition::Running
        );
    }
}
