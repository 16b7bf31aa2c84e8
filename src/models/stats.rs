use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationState {
    Stopped,
    Running,
}

/// Read-only view of a simulator, produced on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityStats {
    pub running: bool,
    /// Unix seconds when the current worker was started
    pub started_at: Option<i64>,
    pub cycles_completed: u64,
    pub failed_steps: u64,
    /// Unix seconds when the last cycle finished
    pub last_cycle_at: Option<i64>,
}

impl ActivityStats {
    pub fn state(&self) -> SimulationState {
        if self.running {
            SimulationState::Running
        } else {
            SimulationState::Stopped
        }
    }

    /// Seconds the worker has been running as of `now`
    pub fn uptime_secs(&self, now: i64) -> Option<i64> {
        self.started_at.map(|started| (now - started).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_is_clamped() {
        let stats = ActivityStats {
            running: true,
            started_at: Some(100),
            cycles_completed: 0,
            failed_steps: 0,
            last_cycle_at: None,
        };
        assert_eq!(stats.uptime_secs(160), Some(60));
        assert_eq!(stats.uptime_secs(50), Some(0));
        assert_eq!(stats.state(), SimulationState::Running);
    }

    #[test]
    fn test_serializes_state_lowercase() {
        let json = serde_json::to_string(&SimulationState::Stopped).unwrap();
        assert_eq!(json, "\"stopped\"");
    }
}
