// main.rs
//
// Compile and light a small room with a glowing ceiling panel in the
// background, report progress, then walk the finished tree back to front.

use bsp_radiosity::shapes::{Face, quad, room};
use bsp_radiosity::{
    BakeConfig, BuildState, Color, DebugMode, DrawTarget, Level, Material, MaterialSet, NodeInfo, Triangle,
};
use nalgebra::Point3;
use std::error::Error;
use std::thread;
use std::time::Duration;

/// Counts what would have been sent to a graphics device.
#[derive(Default)]
struct DrawStats {
    calls: usize,
    triangles: usize,
    leaves: usize,
    brightest: f64,
}

impl DrawTarget for DrawStats {
    fn draw_triangles(&mut self, triangles: &[Triangle], node: NodeInfo) {
        self.calls += 1;
        self.triangles += triangles.len();
        if node.is_leaf {
            self.leaves += 1;
        }
        for v in triangles.iter().flat_map(|t| t.vertices.iter()) {
            let luminance = (v.color.r + v.color.g + v.color.b) as f64 / 3.0;
            self.brightest = self.brightest.max(luminance);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::init_with_level(log::Level::Info)?;

    let materials = MaterialSet::new(vec![
        Material::grey(0.6),
        Material::new(Color::rgb(0.8, 0.3, 0.3), Color::BLACK),
        Material::new(Color::BLACK, Color::rgb(1.0, 0.95, 0.8)).with_power(4.0),
    ]);

    let mut triangles = room(4.0, 4.0, 3.0, |face| match face {
        Face::Left => 1,
        _ => 0,
    });
    // Light panel just below the ceiling, facing down
    triangles.extend(quad(
        [
            Point3::new(1.5, 1.5, 2.95),
            Point3::new(1.5, 2.5, 2.95),
            Point3::new(2.5, 2.5, 2.95),
            Point3::new(2.5, 1.5, 2.95),
        ],
        2,
    ));

    let mut level = Level::new(triangles, materials, BakeConfig::default())?;
    level.start_background_build()?;

    // A cancelled or failed worker drops back to Idle instead of reaching Ready
    while !level.poll() {
        if level.state() == BuildState::Idle {
            return Err("build stopped before finishing".into());
        }
        log::info!("{:?}: {:>5.1}%", level.state(), level.progress() * 100.0);
        thread::sleep(Duration::from_millis(250));
    }

    if let Some(summary) = level.last_build() {
        log::info!("{:?}", summary);
    }

    let camera = Point3::new(2.0, 0.5, 1.5);
    let mut stats = DrawStats::default();
    level.render(&camera, DebugMode::None, &mut stats);
    log::info!(
        "{} draw calls, {} triangles in {} leaves, brightest vertex {:.3}",
        stats.calls,
        stats.triangles,
        stats.leaves,
        stats.brightest
    );

    let collision = level.collision_mesh()?;
    log::info!("collision mesh: {} triangles", collision.indices().len());
    Ok(())
}
