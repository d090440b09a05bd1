//! Debug panel for tuning lights and fog at runtime

use crate::animation::FrameEvent;
use crate::config::DebugParams;
use crate::gfx::scene::SceneStatistics;

/// Frames per second implied by a frame's delta
pub fn frame_rate(frame: &FrameEvent) -> Option<f64> {
    (frame.delta > f64::EPSILON).then(|| 1.0 / frame.delta)
}

/// Draws the debug panel
///
/// Edits `params` in place and returns true when any value changed. The
/// caller decides when to apply them to the scene.
pub fn debug_panel(
    ui: &imgui::Ui,
    params: &mut DebugParams,
    frame: Option<FrameEvent>,
    stats: &SceneStatistics,
) -> bool {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return false;
    }

    let mut changed = false;

    ui.window("Haunted House")
        .size([340.0, 0.0], imgui::Condition::FirstUseEver)
        .position([16.0, 16.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(true)
        .build(|| {
            match frame {
                Some(frame) => {
                    ui.text(format!("Frame {}  t = {:.2}s", frame.index, frame.elapsed));
                    if let Some(fps) = frame_rate(&frame) {
                        ui.text(format!("{:.1} fps ({:.2} ms)", fps, frame.delta * 1000.0));
                    }
                }
                None => ui.text("Waiting for first frame"),
            }
            ui.text(format!(
                "{} objects, {} triangles, {} point lights",
                stats.object_count, stats.total_triangles, stats.point_light_count
            ));

            ui.separator();
            ui.text("Lights");
            changed |= ui.slider("Ambient", 0.0, 3.0, &mut params.ambient_intensity);
            changed |= ui.slider("Moon", 0.0, 3.0, &mut params.moon_intensity);
            changed |= imgui::Drag::new("Moon position")
                .range(-10.0, 10.0)
                .speed(0.05)
                .build_array(ui, &mut params.moon_position);
            changed |= ui.slider("Door light", 0.0, 20.0, &mut params.door_light_intensity);
            for (i, intensity) in params.ghost_intensities.iter_mut().enumerate() {
                changed |= ui.slider(format!("Ghost {}", i + 1), 0.0, 20.0, intensity);
            }

            ui.separator();
            ui.text("Fog");
            changed |= ui.slider("Density", 0.0, 0.5, &mut params.fog_density);

            ui.separator();
            ui.text_disabled("H toggles this panel");
        });

    changed
}
