//! A loaded level: source geometry, its compiled tree and the build driving it.

use crate::build::{BackgroundBuild, BuildJob, BuildState, BuildUpdate, BuiltLevel, apply_colors};
use crate::collision::build_trimesh;
use crate::config::BakeConfig;
use crate::errors::{BuildError, CollisionError, LevelError};
use crate::float_types::Real;
use crate::float_types::parry3d::shape::TriMesh;
use crate::mesh::bsp::{BspTree, DebugMode, DrawTarget};
use crate::mesh::material::MaterialSet;
use crate::mesh::triangle::Triangle;
use nalgebra::Point3;

/// Owns the ingested triangles and materials.
///
/// While a background build is lighting, [`Level::poll`] installs its unlit
/// tree and then refreshes the vertex colors as snapshots arrive, so
/// [`Level::render`] shows the lighting converge. Before the first build
/// reaches that point [`Level::tree`] is `None` and nothing is drawn.
#[derive(Debug)]
pub struct Level {
    triangles: Vec<Triangle>,
    materials: MaterialSet,
    config: BakeConfig,
    build: BackgroundBuild,
    tree: Option<BspTree>,
    last_build: Option<BuildSummary>,
}

/// Statistics of the build whose tree is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub node_count: usize,
    pub triangle_count: usize,
    pub patch_count: usize,
    pub iterations: usize,
}

impl Level {
    /// Validate and take ownership of the level data.
    ///
    /// ## Errors
    /// An invalid `config`, or a triangle whose material index is not in `materials`.
    pub fn new(triangles: Vec<Triangle>, materials: MaterialSet, config: BakeConfig) -> Result<Self, LevelError> {
        config.validate()?;
        if let Some((i, tri)) = triangles
            .iter()
            .enumerate()
            .find(|(_, t)| t.material >= materials.len())
        {
            return Err(LevelError::MaterialOutOfRange {
                triangle: i,
                material: tri.material,
                available: materials.len(),
            });
        }

        Ok(Level {
            triangles,
            materials,
            config,
            build: BackgroundBuild::new(),
            tree: None,
            last_build: None,
        })
    }

    fn job(&self) -> BuildJob {
        BuildJob {
            triangles: self.triangles.clone(),
            materials: self.materials.clone(),
            config: self.config.clone(),
        }
    }

    /// Compile and light the level on a worker thread.
    /// The currently installed tree stays usable until the new one is polled in.
    pub fn start_background_build(&mut self) -> Result<(), BuildError> {
        let job = self.job();
        self.build.start(job)
    }

    pub fn state(&self) -> BuildState {
        self.build.state()
    }

    pub fn progress(&self) -> f32 {
        self.build.progress()
    }

    /// Ask a running build to stop.
    pub fn cancel_build(&self) {
        self.build.cancel();
    }

    /// Apply intermediate lighting from a running build and install the
    /// result of a finished one.
    /// Returns `true` when a finished build was installed by this call.
    pub fn poll(&mut self) -> bool {
        for update in self.build.take_updates() {
            match update {
                BuildUpdate::Tree(tree) => {
                    log::debug!("showing unlit tree while lighting runs");
                    self.tree = Some(tree);
                },
                BuildUpdate::Colors(colors) => {
                    if let Some(tree) = &mut self.tree {
                        apply_colors(tree, &colors);
                    }
                },
            }
        }

        match self.build.take_result() {
            Some(built) => {
                self.install(built);
                true
            },
            None => false,
        }
    }

    /// Block until the running background build finishes and install its result.
    pub fn wait(&mut self) -> bool {
        match self.build.wait() {
            Some(built) => {
                self.install(built);
                true
            },
            None => false,
        }
    }

    /// Run the whole pipeline on the calling thread and install the result.
    /// [`Level::state`] and [`Level::progress`] end at `Ready` and 1.0, as
    /// after a background build.
    ///
    /// ## Errors
    /// [`BuildError::AlreadyRunning`] while a background build is busy.
    pub fn build_blocking(&mut self) -> Result<(), BuildError> {
        let job = self.job();
        let built = self.build.run_blocking(job)?;
        self.install(built);
        Ok(())
    }

    fn install(&mut self, built: BuiltLevel) {
        let summary = BuildSummary {
            node_count: built.tree.len(),
            triangle_count: built.tree.triangle_count(),
            patch_count: built.patch_count,
            iterations: built.iterations,
        };
        log::debug!("installing level tree: {:?}", summary);
        self.tree = Some(built.tree);
        self.last_build = Some(summary);
    }

    /// The installed tree: the last finished build, or the one currently
    /// being lit if [`Level::poll`] has picked it up.
    pub fn tree(&self) -> Option<&BspTree> {
        self.tree.as_ref()
    }

    pub fn last_build(&self) -> Option<BuildSummary> {
        self.last_build
    }

    /// The source triangles, before subdivision.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn materials(&self) -> &MaterialSet {
        &self.materials
    }

    /// Draw the installed tree back to front as seen from `camera`.
    pub fn render<T: DrawTarget + ?Sized>(&self, camera: &Point3<Real>, mode: DebugMode, target: &mut T) {
        if let Some(tree) = &self.tree {
            tree.render(camera, mode, target);
        }
    }

    /// Static collision mesh from the source (unsubdivided) triangles.
    pub fn collision_mesh(&self) -> Result<TriMesh, CollisionError> {
        build_trimesh(&self.triangles)
    }
}
