//! Periodic driver for the traffic model.
//!
//! One tokio task owns the engine and the current snapshot. Each tick covers
//! `1000ms x multiplier` of simulated time and fires every
//! `1000ms / multiplier` of wall time. Snapshots are published as
//! `Arc<TrafficModel>` so readers keep a consistent view while the next tick
//! is computed.

use crate::error::{Result, SimulationError};
use crate::model::{TickReport, TrafficEngine, TrafficModel};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

/// Simulation speed, 1x to 100x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpeedMultiplier(u32);

impl SpeedMultiplier {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;

    pub fn new(multiplier: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&multiplier) {
            Ok(Self(multiplier))
        } else {
            Err(SimulationError::InvalidSpeedMultiplier(multiplier))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Wall-clock time between ticks
    pub fn period(self) -> Duration {
        Duration::from_secs(1) / self.0
    }

    /// Simulated milliseconds covered by one tick
    pub fn elapsed_per_tick_ms(self) -> f64 {
        1000.0 * f64::from(self.0)
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self(10)
    }
}

/// A published snapshot
#[derive(Debug, Clone)]
pub struct SimulationFrame {
    pub tick: u64,
    /// Simulated time since the clock started
    pub simulated_ms: f64,
    pub produced_at: DateTime<Utc>,
    pub model: Arc<TrafficModel>,
    pub report: TickReport,
}

/// Clock configuration, consumed by [`SimulationClock::start`].
pub struct SimulationClock {
    engine: TrafficEngine,
    speed: SpeedMultiplier,
}

impl SimulationClock {
    pub fn new(engine: TrafficEngine, speed: SpeedMultiplier) -> Self {
        Self { engine, speed }
    }

    /// Spawn the clock task on the current tokio runtime.
    pub fn start(self, initial: TrafficModel) -> ClockHandle {
        let model = Arc::new(initial);
        let (speed_tx, speed_rx) = watch::channel(self.speed);
        let (frame_tx, frame_rx) = watch::channel(SimulationFrame {
            tick: 0,
            simulated_ms: 0.0,
            produced_at: Utc::now(),
            model: Arc::clone(&model),
            report: TickReport::default(),
        });

        info!(speed = self.speed.get(), flights = model.flights.len(), "Starting simulation clock");
        let task = tokio::spawn(run(self.engine, model, speed_rx, frame_tx));

        ClockHandle {
            speed_tx,
            frames: frame_rx,
            task,
        }
    }
}

/// Control surface of a running clock.
pub struct ClockHandle {
    speed_tx: watch::Sender<SpeedMultiplier>,
    frames: watch::Receiver<SimulationFrame>,
    task: JoinHandle<TrafficModel>,
}

impl ClockHandle {
    /// Change the simulation speed. The running interval is replaced, never
    /// doubled.
    pub fn set_speed_multiplier(&self, multiplier: u32) -> Result<()> {
        let speed = SpeedMultiplier::new(multiplier)?;
        self.speed_tx.send_replace(speed);
        Ok(())
    }

    pub fn speed(&self) -> SpeedMultiplier {
        *self.speed_tx.borrow()
    }

    /// Most recent frame
    pub fn latest(&self) -> SimulationFrame {
        self.frames.borrow().clone()
    }

    /// Receiver notified on every new frame
    pub fn subscribe(&self) -> watch::Receiver<SimulationFrame> {
        self.frames.clone()
    }

    /// Stop ticking and return the last snapshot.
    pub async fn stop(self) -> Result<TrafficModel> {
        let ClockHandle { speed_tx, task, .. } = self;
        drop(speed_tx);
        Ok(task.await?)
    }
}

fn ticker(speed: SpeedMultiplier) -> Interval {
    let period = speed.period();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run(
    mut engine: TrafficEngine,
    mut model: Arc<TrafficModel>,
    mut speed_rx: watch::Receiver<SpeedMultiplier>,
    frame_tx: watch::Sender<SimulationFrame>,
) -> TrafficModel {
    let mut speed = *speed_rx.borrow_and_update();
    let mut interval = ticker(speed);
    let mut tick: u64 = 0;
    let mut simulated_ms = 0.0;

    loop {
        tokio::select! {
            biased;

            changed = speed_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let requested = *speed_rx.borrow_and_update();
                if requested != speed {
                    info!(from = speed.get(), to = requested.get(), "Simulation speed changed");
                    speed = requested;
                    interval = ticker(speed);
                }
            }

            _ = interval.tick() => {
                let elapsed_ms = speed.elapsed_per_tick_ms();
                let (next, report) = engine.step(&model, elapsed_ms);
                model = Arc::new(next);
                tick += 1;
                simulated_ms += elapsed_ms;

                debug!(
                    tick,
                    flights = model.flights.len(),
                    arrived = report.arrived.len(),
                    spawned = report.spawned.is_some(),
                    "Tick"
                );

                frame_tx.send_replace(SimulationFrame {
                    tick,
                    simulated_ms,
                    produced_at: Utc::now(),
                    model: Arc::clone(&model),
                    report,
                });
            }
        }
    }

    info!(tick, "Simulation clock stopped");
    Arc::unwrap_or_clone(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationProfile, SimulationRules};
    use tokio::time::sleep;

    fn start(speed: u32) -> ClockHandle {
        let mut engine = TrafficEngine::seeded(SimulationRules::default(), GenerationProfile::default(), 31);
        let model = engine.generate_initial_model(1000.0, 1000.0).unwrap();
        SimulationClock::new(engine, SpeedMultiplier::new(speed).unwrap()).start(model)
    }

    #[test]
    fn test_speed_multiplier_bounds() {
        assert!(SpeedMultiplier::new(0).is_err());
        assert!(matches!(
            SpeedMultiplier::new(101),
            Err(SimulationError::InvalidSpeedMultiplier(101))
        ));

        let slow = SpeedMultiplier::new(1).unwrap();
        assert_eq!(slow.period(), Duration::from_secs(1));
        assert_eq!(slow.elapsed_per_tick_ms(), 1000.0);

        let fast = SpeedMultiplier::new(100).unwrap();
        assert_eq!(fast.period(), Duration::from_millis(10));
        assert_eq!(fast.elapsed_per_tick_ms(), 100_000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_period() {
        let handle = start(10);
        assert_eq!(handle.latest().tick, 0);

        sleep(Duration::from_millis(1050)).await;
        let frame = handle.latest();
        assert_eq!(frame.tick, 10);
        assert_eq!(frame.simulated_ms, 100_000.0);
        assert!(frame.model.flights.len() <= 10);

        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_change_replaces_interval() {
        let handle = start(1);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(handle.latest().tick, 0);

        handle.set_speed_multiplier(100).unwrap();
        assert_eq!(handle.speed().get(), 100);

        sleep(Duration::from_millis(1005)).await;
        let frame = handle.latest();
        assert_eq!(frame.tick, 100);
        // Only 100x ticks ran, the 1x interval never fired
        assert_eq!(frame.simulated_ms, frame.tick as f64 * 100_000.0);

        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_speed_keeps_running_speed() {
        let handle = start(5);
        assert!(handle.set_speed_multiplier(0).is_err());
        assert!(handle.set_speed_multiplier(250).is_err());
        assert_eq!(handle.speed().get(), 5);
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_returns_last_snapshot() {
        let handle = start(20);
        let mut frames = handle.subscribe();

        frames.changed().await.unwrap();
        let first = frames.borrow_and_update().clone();
        assert_eq!(first.tick, 1);

        sleep(Duration::from_millis(200)).await;
        let last = handle.latest();
        let model = handle.stop().await.unwrap();
        assert_eq!(&model, last.model.as_ref());
    }
}
