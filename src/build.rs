//! Background level compilation: subdivide, build the tree, light it.
//!
//! A [`BackgroundBuild`] runs the whole pipeline on one worker thread. The
//! worker owns the triangles, the tree and the patches for the duration of
//! the build and hands the finished [`BuiltLevel`] back through its join
//! handle. State, progress and the cancel flag live in atomics. While the
//! lighting runs, the worker also sends [`BuildUpdate`]s over a channel: one
//! unlit copy of the tree, then vertex-color snapshots every
//! `bake_interval` iterations, so a renderer can show the lighting refine.

use crate::config::BakeConfig;
use crate::errors::{BuildError, Cancelled};
use crate::mesh::bsp::{BspBuilder, BspTree};
use crate::mesh::material::{Color, MaterialSet};
use crate::mesh::subdivide::subdivide;
use crate::mesh::triangle::Triangle;
use crate::radiosity::Radiosity;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

/// Fraction of the progress bar reached once subdivision is done.
const PROGRESS_SUBDIVIDED: f32 = 0.1;
/// Fraction of the progress bar reached once the tree is built.
const PROGRESS_TREE_BUILT: f32 = 0.3;

/// Where the build pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuildState {
    Idle = 0,
    BuildingBsp = 1,
    CalcRadiosity = 2,
    Ready = 3,
}

impl BuildState {
    const fn from_u8(v: u8) -> Self {
        match v {
            1 => BuildState::BuildingBsp,
            2 => BuildState::CalcRadiosity,
            3 => BuildState::Ready,
            _ => BuildState::Idle,
        }
    }

    /// True while a worker is compiling or lighting.
    pub const fn is_busy(self) -> bool {
        matches!(self, BuildState::BuildingBsp | BuildState::CalcRadiosity)
    }
}

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub triangles: Vec<Triangle>,
    pub materials: MaterialSet,
    pub config: BakeConfig,
}

/// Output of a completed build.
#[derive(Debug, Clone)]
pub struct BuiltLevel {
    /// Compiled tree with baked vertex colors.
    pub tree: BspTree,
    pub patch_count: usize,
    /// Shooting iterations performed.
    pub iterations: usize,
}

/// Intermediate output of a running build.
#[derive(Debug, Clone)]
pub enum BuildUpdate {
    /// The compiled tree before lighting. Sent once, when lighting starts.
    Tree(BspTree),
    /// Baked vertex colors of the tree sent in [`BuildUpdate::Tree`], three
    /// per triangle in [`BspTree::triangles`] order.
    Colors(Vec<Color>),
}

impl BuildUpdate {
    /// Snapshot the vertex colors of `tree`.
    fn colors_of(tree: &BspTree) -> Self {
        BuildUpdate::Colors(
            tree.triangles()
                .flat_map(|t| t.vertices.iter().map(|v| v.color))
                .collect(),
        )
    }
}

/// Write a [`BuildUpdate::Colors`] snapshot back onto a tree of the same shape.
/// Extra or missing colors are ignored.
pub fn apply_colors(tree: &mut BspTree, colors: &[Color]) {
    let vertices = tree.triangles_mut().flat_map(|t| t.vertices.iter_mut());
    for (v, c) in vertices.zip(colors) {
        v.color = *c;
    }
}

/// State observable from both sides of the worker boundary.
#[derive(Debug)]
pub(crate) struct BuildShared {
    state: AtomicU8,
    progress: AtomicU32,
    cancel: AtomicBool,
    /// Set by the worker when it sends a color snapshot, cleared when the
    /// owner receives it. At most one snapshot is in flight.
    snapshot_pending: AtomicBool,
}

impl BuildShared {
    pub(crate) fn new() -> Self {
        BuildShared {
            state: AtomicU8::new(BuildState::Idle as u8),
            progress: AtomicU32::new(0f32.to_bits()),
            cancel: AtomicBool::new(false),
            snapshot_pending: AtomicBool::new(false),
        }
    }

    fn state(&self) -> BuildState {
        BuildState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: BuildState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn progress(&self) -> f32 {
        f32::from_bits(self.progress.load(Ordering::Relaxed))
    }

    fn set_progress(&self, p: f32) {
        self.progress.store(p.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn check_cancel(&self) -> Result<(), Cancelled> {
        if self.cancelled() { Err(Cancelled) } else { Ok(()) }
    }

    /// Clear the flags of a previous build.
    fn reset(&self) {
        self.cancel.store(false, Ordering::Relaxed);
        self.snapshot_pending.store(false, Ordering::Release);
        self.set_progress(0.0);
    }
}

/// Run every phase on the calling thread, publishing state and progress
/// through `shared`. Stops with `Err(Cancelled)` as soon as the cancel flag
/// is observed.
///
/// With `updates`, the unlit tree and periodic color snapshots are sent
/// there. Without it no intermediate bake is done, as nobody could see it.
pub(crate) fn run_pipeline(
    job: BuildJob,
    shared: &BuildShared,
    updates: Option<&Sender<BuildUpdate>>,
) -> Result<BuiltLevel, Cancelled> {
    let BuildJob {
        triangles,
        materials,
        config,
    } = job;

    shared.check_cancel()?;
    shared.set_state(BuildState::BuildingBsp);
    shared.set_progress(0.0);
    log::info!("building BSP from {} triangles", triangles.len());

    let patches = subdivide(&triangles, &config.subdivide);
    drop(triangles);
    log::debug!("subdivided into {} triangles", patches.len());
    shared.set_progress(PROGRESS_SUBDIVIDED);

    shared.check_cancel()?;
    let mut tree = BspBuilder::new(&config.bsp).build_cancellable(patches, &shared.cancel)?;
    log::debug!(
        "BSP built: {} nodes, {} leaves, depth {}",
        tree.len(),
        tree.leaf_count(),
        tree.depth()
    );
    shared.set_progress(PROGRESS_TREE_BUILT);

    shared.check_cancel()?;
    shared.set_state(BuildState::CalcRadiosity);
    log::info!("calculating radiosity");

    // A dropped receiver just means nobody is watching
    let updates = match updates {
        Some(tx) if tx.send(BuildUpdate::Tree(tree.clone())).is_ok() => Some(tx),
        _ => None,
    };

    let rad_config = &config.radiosity;
    let mut radiosity = Radiosity::prepare(&tree, &materials, rad_config);
    log::debug!("{} patches, {:.4} initial unshot energy", radiosity.len(), radiosity.total_unshot());

    let max = rad_config.max_iterations;
    let interval = rad_config.bake_interval.max(1);
    for i in 0..max {
        shared.check_cancel()?;
        if !radiosity.iterate(&tree) {
            break;
        }
        shared.set_progress(PROGRESS_TREE_BUILT + (1.0 - PROGRESS_TREE_BUILT) * i as f32 / max as f32);

        if let Some(tx) = updates {
            if (i + 1) % interval == 0 && !shared.snapshot_pending.load(Ordering::Acquire) {
                radiosity.bake(&mut tree);
                shared.snapshot_pending.store(true, Ordering::Release);
                if tx.send(BuildUpdate::colors_of(&tree)).is_err() {
                    log::trace!("color snapshot dropped, receiver gone");
                }
            }
        }
    }
    radiosity.bake(&mut tree);

    log::info!(
        "radiosity done after {} iterations, {:.4} energy left unshot",
        radiosity.iterations(),
        radiosity.total_unshot()
    );
    shared.set_progress(1.0);
    shared.set_state(BuildState::Ready);

    Ok(BuiltLevel {
        tree,
        patch_count: radiosity.len(),
        iterations: radiosity.iterations(),
    })
}

/// Owner side of a background build.
#[derive(Debug)]
pub struct BackgroundBuild {
    shared: Arc<BuildShared>,
    worker: Option<JoinHandle<Option<BuiltLevel>>>,
    updates: Option<Receiver<BuildUpdate>>,
}

impl Default for BackgroundBuild {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundBuild {
    pub fn new() -> Self {
        BackgroundBuild {
            shared: Arc::new(BuildShared::new()),
            worker: None,
            updates: None,
        }
    }

    /// Join a previous worker, if any, dropping its unclaimed result.
    fn retire_worker(&mut self) {
        self.updates = None;
        if let Some(old) = self.worker.take() {
            if old.join().is_err() {
                log::error!("previous build worker panicked");
            }
        }
    }

    /// Start compiling `job` on a fresh worker thread.
    ///
    /// Refused with [`BuildError::AlreadyRunning`] while another build is in
    /// the `BuildingBsp` or `CalcRadiosity` state; nothing is touched then.
    /// A previous finished build is joined and its unclaimed result dropped.
    pub fn start(&mut self, job: BuildJob) -> Result<(), BuildError> {
        if self.is_running() && self.state().is_busy() {
            log::warn!("build requested while one is already running; ignored");
            return Err(BuildError::AlreadyRunning);
        }

        self.retire_worker();
        self.shared.reset();
        self.shared.set_state(BuildState::BuildingBsp);

        let (tx, rx) = channel();
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("bsp-radiosity-build".into())
            .spawn(move || match run_pipeline(job, &shared, Some(&tx)) {
                Ok(level) => Some(level),
                Err(Cancelled) => {
                    log::info!("build cancelled");
                    shared.set_state(BuildState::Idle);
                    None
                },
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.updates = Some(rx);
                Ok(())
            },
            Err(e) => {
                self.shared.set_state(BuildState::Idle);
                Err(BuildError::Spawn(e))
            },
        }
    }

    /// Run `job` to completion on the calling thread, reporting through the
    /// same state and progress as a background build.
    ///
    /// ## Errors
    /// [`BuildError::AlreadyRunning`] while a background build is busy.
    pub fn run_blocking(&mut self, job: BuildJob) -> Result<BuiltLevel, BuildError> {
        if self.is_running() && self.state().is_busy() {
            log::warn!("blocking build requested while one is already running; ignored");
            return Err(BuildError::AlreadyRunning);
        }

        self.retire_worker();
        self.shared.reset();
        Ok(run_pipeline(job, &self.shared, None)?)
    }

    pub fn state(&self) -> BuildState {
        self.shared.state()
    }

    /// Overall completion in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.shared.progress()
    }

    /// Ask the worker to stop at its next checkpoint. Does not wait.
    pub fn cancel(&self) {
        self.shared.cancel.store(true, Ordering::Relaxed);
    }

    /// True while a worker thread exists and has not returned.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Everything the worker has sent since the last call, oldest first.
    pub fn take_updates(&mut self) -> Vec<BuildUpdate> {
        let Some(rx) = &self.updates else {
            return Vec::new();
        };
        let updates: Vec<_> = rx.try_iter().collect();
        if updates.iter().any(|u| matches!(u, BuildUpdate::Colors(_))) {
            self.shared.snapshot_pending.store(false, Ordering::Release);
        }
        updates
    }

    /// Collect the result of a finished build. `None` while the worker is
    /// still running, when there is nothing to collect, or when the build
    /// was cancelled. Updates not yet taken are discarded.
    pub fn take_result(&mut self) -> Option<BuiltLevel> {
        if !self.worker.as_ref().is_some_and(JoinHandle::is_finished) {
            return None;
        }
        let handle = self.worker.take()?;
        self.join(handle)
    }

    /// Block until the current worker (if any) returns and collect its result.
    pub fn wait(&mut self) -> Option<BuiltLevel> {
        let handle = self.worker.take()?;
        self.join(handle)
    }

    fn join(&mut self, handle: JoinHandle<Option<BuiltLevel>>) -> Option<BuiltLevel> {
        self.updates = None;
        match handle.join() {
            Ok(result) => result,
            Err(_) => {
                log::error!("build worker panicked");
                self.shared.set_state(BuildState::Idle);
                None
            },
        }
    }
}

impl Drop for BackgroundBuild {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn job() -> BuildJob {
        BuildJob {
            triangles: vec![Triangle::from_points(
                [
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(0.0, 0.0, 1.0),
                    Point3::new(1.0, 0.0, 0.0),
                ],
                0,
            )],
            materials: MaterialSet::default(),
            config: BakeConfig::default(),
        }
    }

    #[test]
    fn state_round_trips_through_u8() {
        for s in [
            BuildState::Idle,
            BuildState::BuildingBsp,
            BuildState::CalcRadiosity,
            BuildState::Ready,
        ] {
            assert_eq!(BuildState::from_u8(s as u8), s);
        }
    }

    #[test]
    fn pipeline_reaches_ready() {
        let shared = BuildShared::new();
        let level = run_pipeline(job(), &shared, None).expect("not cancelled");
        assert_eq!(shared.state(), BuildState::Ready);
        assert_eq!(shared.progress(), 1.0);
        assert!(level.patch_count >= 1);
        assert_eq!(level.tree.triangle_count(), level.patch_count);
    }

    #[test]
    fn pre_cancelled_pipeline_does_nothing() {
        let shared = BuildShared::new();
        shared.cancel.store(true, Ordering::Relaxed);
        assert_eq!(run_pipeline(job(), &shared, None).unwrap_err(), Cancelled);
        assert_eq!(shared.state(), BuildState::Idle);
    }

    #[test]
    fn background_build_completes() {
        let mut build = BackgroundBuild::new();
        build.start(job()).expect("spawn");
        let level = build.wait().expect("finished");
        assert_eq!(build.state(), BuildState::Ready);
        assert!(level.tree.triangle_count() > 0);
    }

    #[test]
    fn pipeline_sends_tree_then_one_snapshot_until_received() {
        let shared = BuildShared::new();
        let (tx, rx) = channel();
        let level = run_pipeline(job(), &shared, Some(&tx)).expect("not cancelled");
        assert!(level.iterations > 0);

        let updates: Vec<_> = rx.try_iter().collect();
        assert_eq!(updates.len(), 2, "nobody took the first snapshot");
        let BuildUpdate::Tree(preview) = &updates[0] else {
            panic!("tree must come first");
        };
        assert_eq!(preview.triangle_count(), level.tree.triangle_count());
        let BuildUpdate::Colors(colors) = &updates[1] else {
            panic!("expected a color snapshot");
        };
        assert_eq!(colors.len(), 3 * preview.triangle_count());
        assert!(shared.snapshot_pending.load(Ordering::Acquire));
    }

    #[test]
    fn snapshot_colors_apply_in_triangle_order() {
        let mut tree = BspBuilder::default().build(job().triangles);
        let colors = vec![Color::rgb(0.1, 0.2, 0.3), Color::WHITE, Color::rgb(0.5, 0.5, 0.5)];
        apply_colors(&mut tree, &colors);
        let BuildUpdate::Colors(read_back) = BuildUpdate::colors_of(&tree) else {
            unreachable!()
        };
        assert_eq!(read_back, colors);
    }

    #[test]
    fn blocking_run_reports_through_shared_state() {
        let mut build = BackgroundBuild::new();
        assert_eq!(build.state(), BuildState::Idle);
        let level = build.run_blocking(job()).expect("finished");
        assert_eq!(build.state(), BuildState::Ready);
        assert_eq!(build.progress(), 1.0);
        assert!(level.tree.triangle_count() > 0);
        assert!(build.take_updates().is_empty());
    }

    #[test]
    fn panicked_worker_returns_to_idle_on_wait() {
        let mut build = BackgroundBuild::new();
        build.shared.set_state(BuildState::CalcRadiosity);
        build.worker = Some(thread::spawn(|| -> Option<BuiltLevel> { panic!("worker failure") }));
        assert!(build.wait().is_none());
        assert_eq!(build.state(), BuildState::Idle);
        build.start(job()).expect("a new build may start");
        assert!(build.wait().is_some());
    }
}
