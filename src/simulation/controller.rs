//! Wall-clock driver on the tokio runtime
//!
//! The tick loop is a spawned task on a `tokio::time::interval`; each
//! repair runs in its own task that sleeps for the repair delay. The
//! simulator sits behind a mutex shared by all of them.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::simulation::config::{ConfigError, RedundancyConfig, SimulationTiming};
use crate::simulation::engine::RedundancySimulator;
use crate::simulation::repair::RepairTicket;
use crate::simulation::snapshot::SimulationSnapshot;

/// Owns the timers driving a shared [`RedundancySimulator`]
pub struct SimulationController {
    sim: Arc<Mutex<RedundancySimulator>>,
    timing: SimulationTiming,
    tick_task: Option<JoinHandle<()>>,
}

impl SimulationController {
    pub fn new(sim: RedundancySimulator, timing: SimulationTiming) -> Result<Self, ConfigError> {
        timing.validate()?;

        Ok(Self {
            sim: Arc::new(Mutex::new(sim)),
            timing,
            tick_task: None,
        })
    }

    /// Shared handle to the simulator, for readers such as a UI
    pub fn simulator(&self) -> Arc<Mutex<RedundancySimulator>> {
        self.sim.clone()
    }

    pub async fn snapshot(&self) -> SimulationSnapshot {
        self.sim.lock().await.snapshot()
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_task.is_some()
    }

    /// Start ticking. The first tick fires one period from now.
    pub async fn start(&mut self) {
        if self.tick_task.is_some() {
            return;
        }
        self.sim.lock().await.start();

        let sim = self.sim.clone();
        let timing = self.timing;
        self.tick_task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(timing.tick_period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let outcome = {
                    let mut sim = sim.lock().await;
                    // Paused or reset through the shared handle
                    if !sim.is_running() {
                        continue;
                    }
                    sim.tick()
                };
                if let Some(ticket) = outcome.repair {
                    spawn_repair(sim.clone(), ticket, timing);
                }
            }
        }));
        info!("Tick loop started ({:?} period)", self.timing.tick_period);
    }

    /// Stop ticking. In-flight repairs still complete.
    pub async fn pause(&mut self) {
        self.stop_ticking();
        self.sim.lock().await.pause();
    }

    /// Stop ticking and reset. In-flight repairs become no-ops.
    pub async fn reset(&mut self) {
        self.stop_ticking();
        self.sim.lock().await.reset();
    }

    pub async fn reconfigure(&mut self, config: RedundancyConfig) -> Result<(), ConfigError> {
        self.sim.lock().await.reconfigure(config)
    }

    fn stop_ticking(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
            debug!("Tick loop stopped");
        }
    }
}

impl Drop for SimulationController {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}

fn spawn_repair(sim: Arc<Mutex<RedundancySimulator>>, ticket: RepairTicket, timing: SimulationTiming) {
    tokio::spawn(async move {
        tokio::time::sleep(timing.repair_delay).await;
        sim.lock().await.complete_repair(ticket);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStatus;
    use std::time::Duration;

    fn quiet_controller() -> SimulationController {
        let config = RedundancyConfig::default().with_failure_rate(0.0);
        let sim = RedundancySimulator::with_seed(config, 11).unwrap();
        SimulationController::new(sim, SimulationTiming::default()).unwrap()
    }

    async fn fail_nodes(controller: &SimulationController, ids: &[usize]) {
        let sim = controller.simulator();
        let mut sim = sim.lock().await;
        for &id in ids {
            sim.nodes_mut()[id].set_status(NodeStatus::Failed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_period() {
        let mut controller = quiet_controller();
        controller.start().await;

        tokio::time::sleep(Duration::from_millis(1900)).await;
        assert_eq!(controller.snapshot().await.tick, 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.snapshot().await.tick, 1);

        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(controller.snapshot().await.tick, 3);
    }

    #[test]
    fn test_zero_tick_period_is_rejected() {
        let sim = RedundancySimulator::with_seed(RedundancyConfig::default(), 11).unwrap();
        let timing = SimulationTiming {
            tick_period: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            SimulationController::new(sim, timing),
            Err(ConfigError::ZeroTickPeriod)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_through_shared_handle_skips_ticks() {
        let mut controller = quiet_controller();
        controller.start().await;
        tokio::time::sleep(Duration::from_millis(2100)).await;

        controller.simulator().lock().await.pause();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.run_state, crate::simulation::RunState::Stopped);

        // Restarting through the handle resumes on the same interval
        controller.simulator().lock().await.start();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(controller.snapshot().await.tick, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_keeps_state() {
        let mut controller = quiet_controller();
        controller.start().await;
        tokio::time::sleep(Duration::from_millis(4100)).await;
        controller.pause().await;
        assert!(!controller.is_ticking());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.tick, 2);
        assert_eq!(snapshot.generation, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repair_completes_after_delay() {
        let mut controller = quiet_controller();
        fail_nodes(&controller, &[0, 1, 2, 3]).await;
        controller.start().await;

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(controller.snapshot().await.recovery.repairing_nodes, 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.recovery.repairing_nodes, 0);
        assert_eq!(snapshot.stats.repairs_completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_invalidates_in_flight_repair() {
        let mut controller = quiet_controller();
        fail_nodes(&controller, &[0, 1, 2, 3]).await;
        controller.start().await;

        tokio::time::sleep(Duration::from_millis(2100)).await;
        controller.reset().await;
        {
            let sim = controller.simulator();
            let mut sim = sim.lock().await;
            for node in sim.nodes_mut() {
                node.set_status(NodeStatus::Repairing);
            }
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.recovery.repairing_nodes, 12);
        assert_eq!(snapshot.stats.repairs_completed, 0);
    }
}
