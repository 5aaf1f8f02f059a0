// src/ui/panel.rs
//! Debug panel for the scene controls

use crate::{
    gfx::scene::controls::{
        SceneControls, LIGHT_POSITION_RANGE, ROTATION_RANGE, SHININESS_RANGE,
        SPECULAR_STRENGTH_RANGE,
    },
    performance::FrameTimer,
};

pub const SCENE_CONTROLS_TITLE: &str = "Scene Controls";

/// Window editing the light, material and model rotation
///
/// Slider ranges bound what the panel can produce; values typed in with
/// ctrl+click are clamped back into the same ranges afterwards.
pub fn scene_controls_panel(ui: &imgui::Ui, controls: &mut SceneControls, timer: &FrameTimer) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window(SCENE_CONTROLS_TITLE)
        .size([520.0, 420.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            if ui.collapsing_header("Light", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                ui.checkbox("Light enabled", &mut controls.light_enabled);
                ui.color_edit3("Light color", &mut controls.light_color);
                ui.slider_config("Light position", LIGHT_POSITION_RANGE.0, LIGHT_POSITION_RANGE.1)
                    .build_array(&mut controls.light_position);
            }

            if ui.collapsing_header("Material", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                ui.slider(
                    "Specular strength",
                    SPECULAR_STRENGTH_RANGE.0,
                    SPECULAR_STRENGTH_RANGE.1,
                    &mut controls.specular_strength,
                );
                ui.slider(
                    "Shininess",
                    SHININESS_RANGE.0,
                    SHININESS_RANGE.1,
                    &mut controls.shininess,
                );
            }

            if ui.collapsing_header("Model", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                ui.slider_config("Rotation", ROTATION_RANGE.0, ROTATION_RANGE.1)
                    .build_array(&mut controls.model_rotation);
            }

            ui.separator();
            ui.text(format!(
                "{:.3} ms/frame ({:.1} FPS)",
                timer.frame_time_ms(),
                timer.fps()
            ));
        });

    controls.clamp_to_ui_ranges();
}
