//! The dedicated physics thread (spec 4.H): fixed-step integration at
//! `dt/oversampling`, `scene.move`-equivalent pose/advance-time handover
//! under a scene lock, frame pacing with residual-time reporting, and
//! cooperative cancellation via an atomic flag.

use crate::input::Focuses;
use mlib_physics::PhysicsEngine;
use mlib_scene::Scene;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Paces a loop to a fixed `dt`, reporting how far behind schedule each
/// iteration finished (spec 4.H step 4 "set-fps helper"). Pausing freezes
/// the deadline rather than letting debt accumulate while frozen, which is
/// what makes `Focuses`' MENU-over-SCENE pause read as exactly zero
/// elapsed game time.
pub struct FramePacer {
    dt: Duration,
    max_residual_time: Duration,
    print_residual_time: bool,
    next_deadline: Instant,
    paused_since: Option<Instant>,
}

impl FramePacer {
    pub fn new(dt_seconds: f32, max_residual_time: f32, print_residual_time: bool) -> Self {
        Self {
            dt: Duration::from_secs_f32(dt_seconds.max(0.0)),
            max_residual_time: Duration::from_secs_f32(max_residual_time.max(0.0)),
            print_residual_time,
            next_deadline: Instant::now(),
            paused_since: None,
        }
    }

    pub fn pause(&mut self) {
        if self.paused_since.is_none() {
            self.paused_since = Some(Instant::now());
        }
    }

    /// Shifts the deadline forward by exactly the paused duration, so a
    /// paused interval contributes zero elapsed time to the pacer.
    pub fn resume(&mut self) {
        if let Some(paused_since) = self.paused_since.take() {
            self.next_deadline += paused_since.elapsed();
        }
    }

    /// Sleeps until the next deadline (advancing it by `dt`), returning how
    /// far behind schedule this call found itself, if at all.
    pub fn pace(&mut self) -> Duration {
        self.next_deadline += self.dt;
        let now = Instant::now();
        if self.next_deadline > now {
            std::thread::sleep(self.next_deadline - now);
            Duration::ZERO
        } else {
            let residual = now - self.next_deadline;
            if self.print_residual_time && residual > self.max_residual_time {
                log::warn!("physics loop fell behind schedule by {residual:?}");
            }
            residual
        }
    }
}

/// Runs exactly one physics tick: integrate, tick scene advance-time
/// observers, flush deferred deletions. Split out from the threaded loop
/// so it can be driven directly (by tests, or a single-shot CLI render)
/// without spawning a thread.
pub fn run_one_tick(
    engine: &mut PhysicsEngine,
    scene: &mut Scene,
    dt: f32,
) -> Result<(), mlib_physics::PhysicsError> {
    engine.step()?;
    scene.advance_time(dt);
    scene.flush_deferred_deletions();
    Ok(())
}

/// Handle to a running physics thread; dropping it without calling
/// [`Self::shutdown`] leaks the thread (it keeps running detached), so
/// callers that care about clean shutdown must call it explicitly.
pub struct PhysicsLoopHandle {
    exit: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl PhysicsLoopHandle {
    /// Signals the loop to stop after its current iteration and waits for
    /// it to finish (spec 4.H "shutdown waits for the last sub-step").
    pub fn shutdown(mut self) {
        self.exit.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join().ok();
        }
    }
}

/// Spawns the dedicated physics thread. `pose_sync` runs under the scene
/// write-lock right after `engine.step()`, the generalized hook for
/// whatever "replace beacon* nodes from the collected list" means for a
/// given scene (gameplay-specific node bookkeeping is out of scope here -
/// see DESIGN.md).
pub fn spawn_physics_loop(
    engine: Arc<Mutex<PhysicsEngine>>,
    scene: Arc<RwLock<Scene>>,
    focuses: Arc<Mutex<Focuses>>,
    dt: f32,
    max_residual_time: f32,
    print_residual_time: bool,
    pose_sync: impl Fn(&PhysicsEngine, &mut Scene) + Send + 'static,
) -> PhysicsLoopHandle {
    let exit = Arc::new(AtomicBool::new(false));
    let exit_for_thread = exit.clone();
    let join = std::thread::spawn(move || {
        let mut pacer = FramePacer::new(dt, max_residual_time, print_residual_time);
        while !exit_for_thread.load(Ordering::SeqCst) {
            if focuses.lock().is_physics_paused() {
                pacer.pause();
                std::thread::sleep(Duration::from_millis(1));
                continue;
            }
            pacer.resume();

            let step_result = {
                let mut engine = engine.lock();
                engine.step()
            };
            if let Err(error) = step_result {
                log::error!("physics integrator error, terminating physics thread: {error}");
                break;
            }

            {
                let engine = engine.lock();
                let mut scene = scene.write();
                pose_sync(&engine, &mut scene);
                scene.advance_time(dt);
                scene.flush_deferred_deletions();
            }

            pacer.pace();
        }
    });
    PhysicsLoopHandle {
        exit,
        join: Some(join),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlib_scene::{NodeKind, SceneNode};

    #[test]
    fn pause_then_resume_does_not_push_the_deadline_back() {
        let mut pacer = FramePacer::new(1.0 / 60.0, 0.5, false);
        let deadline_before = pacer.next_deadline;
        pacer.pause();
        std::thread::sleep(Duration::from_millis(5));
        pacer.resume();
        assert!(pacer.next_deadline >= deadline_before);
        assert!(pacer.paused_since.is_none());
    }

    #[test]
    fn resume_without_pause_is_a_no_op() {
        let mut pacer = FramePacer::new(1.0 / 60.0, 0.5, false);
        let before = pacer.next_deadline;
        pacer.resume();
        assert_eq!(pacer.next_deadline, before);
    }

    #[test]
    fn run_one_tick_flushes_scheduled_deletions() {
        let mut engine = PhysicsEngine::new(mlib_physics::PhysicsEngineConfig::default());
        let mut scene = Scene::new();
        let handle = scene
            .add_root_node(SceneNode::new("temp", NodeKind::Empty))
            .unwrap();
        scene.schedule_delete(handle);
        run_one_tick(&mut engine, &mut scene, 1.0 / 60.0).unwrap();
        assert!(scene.node(handle).is_none());
    }
}
