use cgmath::Vector3;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::fly_camera::FlyCamera;

/// Degrees of rotation per unit of cursor movement
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.05;
/// World units per second
pub const DEFAULT_MOVEMENT_SPEED: f32 = 3.5;
/// Pixel scroll deltas are converted to wheel "lines" with this factor
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

const QUIT_KEY: KeyCode = KeyCode::KeyQ;
const TOGGLE_KEY: KeyCode = KeyCode::Escape;

/// Who owns the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Cursor hidden and grabbed, mouse movement steers the camera
    Captured,
    /// Cursor visible, mouse drives the debug panel
    Free,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::Captured => InputMode::Free,
            InputMode::Free => InputMode::Captured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// Requests the controller cannot fulfil itself and hands to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Quit,
    InputModeChanged(InputMode),
}

#[derive(Debug, Default, Clone, Copy)]
struct HeldKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

/// Turns keyboard, pointer and scroll input into camera changes
///
/// Discrete events (cursor moves, scrolls, key presses) are applied as they
/// arrive. Held movement keys are only recorded here and turned into motion by
/// [`CameraController::update_camera`] once per frame.
pub struct CameraController {
    pub mouse_sensitivity: f32,
    pub movement_speed: f32,
    mode: InputMode,
    first_mouse: bool,
    last_cursor: (f64, f64),
    virtual_cursor: (f64, f64),
    held: HeldKeys,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(DEFAULT_MOUSE_SENSITIVITY, DEFAULT_MOVEMENT_SPEED)
    }
}

impl CameraController {
    pub fn new(mouse_sensitivity: f32, movement_speed: f32) -> Self {
        Self {
            mouse_sensitivity,
            movement_speed,
            mode: InputMode::Captured,
            first_mouse: true,
            last_cursor: (0.0, 0.0),
            virtual_cursor: (0.0, 0.0),
            held: HeldKeys::default(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_captured(&self) -> bool {
        self.mode == InputMode::Captured
    }

    /// True until the next cursor sample has been taken as the reference point
    pub fn awaiting_first_sample(&self) -> bool {
        self.first_mouse
    }

    /// Switches between captured and free pointer modes
    ///
    /// The next cursor sample after a switch only sets the reference point, so
    /// the platform warping the cursor does not turn into a camera jump.
    pub fn toggle_mode(&mut self) -> InputMode {
        self.mode = self.mode.toggled();
        self.first_mouse = true;
        log::debug!("Input mode changed to {:?}", self.mode);
        self.mode
    }

    /// Steers the camera from an absolute cursor position (captured mode only)
    pub fn process_cursor(&mut self, x: f64, y: f64, camera: &mut FlyCamera) {
        if !self.is_captured() {
            return;
        }

        if self.first_mouse {
            self.last_cursor = (x, y);
            self.first_mouse = false;
        }

        let x_offset = (x - self.last_cursor.0) as f32 * self.mouse_sensitivity;
        // Screen y grows downwards, pitch grows upwards
        let y_offset = (self.last_cursor.1 - y) as f32 * self.mouse_sensitivity;
        self.last_cursor = (x, y);

        camera.add_yaw(x_offset);
        camera.add_pitch(y_offset);
    }

    /// Feeds raw device motion through an unbounded virtual cursor
    pub fn process_mouse_motion(&mut self, delta: (f64, f64), camera: &mut FlyCamera) {
        self.virtual_cursor.0 += delta.0;
        self.virtual_cursor.1 += delta.1;
        let (x, y) = self.virtual_cursor;
        self.process_cursor(x, y, camera);
    }

    /// Zooms by a wheel delta in lines; positive values scroll "up" and zoom in
    pub fn process_scroll(&mut self, y_offset: f32, camera: &mut FlyCamera) {
        camera.zoom(y_offset);
    }

    pub fn process_scroll_delta(&mut self, delta: &MouseScrollDelta, camera: &mut FlyCamera) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                (*y / PIXELS_PER_SCROLL_LINE) as f32
            }
        };
        self.process_scroll(lines, camera);
    }

    pub fn process_keyboard(&mut self, event: &KeyEvent) -> Option<ControlAction> {
        match event.physical_key {
            PhysicalKey::Code(code) => self.process_key(code, event.state, event.repeat),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    /// Handles one key transition
    ///
    /// Quit and mode toggle fire on the press edge only; movement keys track
    /// their held state.
    pub fn process_key(
        &mut self,
        code: KeyCode,
        state: ElementState,
        repeat: bool,
    ) -> Option<ControlAction> {
        let pressed = state == ElementState::Pressed;
        match code {
            QUIT_KEY if pressed && !repeat => Some(ControlAction::Quit),
            TOGGLE_KEY if pressed && !repeat => {
                Some(ControlAction::InputModeChanged(self.toggle_mode()))
            }
            _ => {
                if let Some(direction) = movement_for_key(code) {
                    self.set_movement(direction, pressed);
                }
                None
            }
        }
    }

    pub fn set_movement(&mut self, direction: MoveDirection, held: bool) {
        match direction {
            MoveDirection::Forward => self.held.forward = held,
            MoveDirection::Backward => self.held.backward = held,
            MoveDirection::Left => self.held.left = held,
            MoveDirection::Right => self.held.right = held,
        }
    }

    /// Clears held movement keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held = HeldKeys::default();
    }

    /// Moves the camera for every held direction key
    ///
    /// Runs every frame in both input modes. `dt` is the elapsed time since
    /// the previous frame in seconds.
    pub fn update_camera(&self, camera: &mut FlyCamera, dt: f32) {
        let step = self.movement_speed * dt;
        let mut offset = Vector3::new(0.0, 0.0, 0.0);

        if self.held.forward {
            offset += camera.front * step;
        }
        if self.held.backward {
            offset -= camera.front * step;
        }
        if self.held.left {
            offset -= camera.right() * step;
        }
        if self.held.right {
            offset += camera.right() * step;
        }

        camera.translate(offset);
    }
}

fn movement_for_key(code: KeyCode) -> Option<MoveDirection> {
    match code {
        KeyCode::KeyW => Some(MoveDirection::Forward),
        KeyCode::KeyS => Some(MoveDirection::Backward),
        KeyCode::KeyA => Some(MoveDirection::Left),
        KeyCode::KeyD => Some(MoveDirection::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn press(controller: &mut CameraController, code: KeyCode) -> Option<ControlAction> {
        controller.process_key(code, ElementState::Pressed, false)
    }

    #[test]
    fn test_starts_captured_awaiting_first_sample() {
        let controller = CameraController::default();
        assert_eq!(controller.mode(), InputMode::Captured);
        assert!(controller.awaiting_first_sample());
    }

    #[test]
    fn test_first_sample_sets_reference_only() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        controller.process_cursor(400.0, 300.0, &mut camera);
        assert_eq!(camera.yaw, -90.0);
        assert_eq!(camera.pitch, 0.0);

        controller.process_cursor(420.0, 280.0, &mut camera);
        assert!((camera.yaw - -89.0).abs() < 1e-5);
        assert!((camera.pitch - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cursor_ignored_while_free() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        controller.toggle_mode();
        controller.process_cursor(0.0, 0.0, &mut camera);
        controller.process_cursor(1000.0, 1000.0, &mut camera);
        assert_eq!(camera.yaw, -90.0);
        assert_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn test_double_toggle_restores_mode_and_resets_first_sample() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        controller.process_cursor(10.0, 10.0, &mut camera);
        controller.process_cursor(20.0, 10.0, &mut camera);
        assert!(!controller.awaiting_first_sample());
        let yaw = camera.yaw;

        assert_eq!(
            press(&mut controller, KeyCode::Escape),
            Some(ControlAction::InputModeChanged(InputMode::Free))
        );
        assert_eq!(
            press(&mut controller, KeyCode::Escape),
            Some(ControlAction::InputModeChanged(InputMode::Captured))
        );
        assert!(controller.awaiting_first_sample());

        // A far-away sample right after re-capturing must not move the camera
        controller.process_cursor(900.0, -600.0, &mut camera);
        assert_eq!(camera.yaw, yaw);
        assert_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn test_toggle_fires_on_press_edge_only() {
        let mut controller = CameraController::default();
        assert!(controller
            .process_key(KeyCode::Escape, ElementState::Pressed, true)
            .is_none());
        assert!(controller
            .process_key(KeyCode::Escape, ElementState::Released, false)
            .is_none());
        assert_eq!(controller.mode(), InputMode::Captured);
    }

    #[test]
    fn test_quit_key() {
        let mut controller = CameraController::default();
        assert_eq!(press(&mut controller, KeyCode::KeyQ), Some(ControlAction::Quit));
    }

    #[test]
    fn test_pitch_stays_clamped_under_any_motion() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        let deltas = [
            (0.0, -5000.0),
            (13.0, 7000.0),
            (-400.0, -12000.0),
            (2.0, 3.0),
            (0.0, 90000.0),
        ];
        for delta in deltas {
            controller.process_mouse_motion(delta, &mut camera);
            assert!((-89.0..=89.0).contains(&camera.pitch));
        }
    }

    #[test]
    fn test_scroll_zoom_scenario() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        assert_eq!(camera.fov, 45.0);

        for _ in 0..10 {
            controller.process_scroll(1.0, &mut camera);
        }
        assert!((camera.fov - 35.0).abs() < 1e-5);

        for _ in 0..40 {
            controller.process_scroll(1.0, &mut camera);
        }
        assert_eq!(camera.fov, 1.0);
    }

    #[test]
    fn test_scroll_works_in_free_mode() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        controller.toggle_mode();
        controller.process_scroll_delta(&MouseScrollDelta::LineDelta(0.0, 2.0), &mut camera);
        assert_eq!(camera.fov, 43.0);
    }

    #[test]
    fn test_movement_scales_with_frame_time() {
        let mut controller = CameraController::default();
        press(&mut controller, KeyCode::KeyW);

        let mut short = FlyCamera::default();
        let mut long = FlyCamera::default();
        controller.update_camera(&mut short, 0.016);
        controller.update_camera(&mut long, 0.032);

        let start = FlyCamera::default().position;
        let short_distance = (short.position - start).magnitude();
        let long_distance = (long.position - start).magnitude();
        assert!((short_distance - DEFAULT_MOVEMENT_SPEED * 0.016).abs() < 1e-5);
        assert!((long_distance - 2.0 * short_distance).abs() < 1e-5);
    }

    #[test]
    fn test_strafe_and_release() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        press(&mut controller, KeyCode::KeyD);
        controller.update_camera(&mut camera, 1.0);
        assert!((camera.position.x - DEFAULT_MOVEMENT_SPEED).abs() < 1e-5);

        controller.process_key(KeyCode::KeyD, ElementState::Released, false);
        let before = camera.position;
        controller.update_camera(&mut camera, 1.0);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn test_movement_applies_in_free_mode() {
        let mut controller = CameraController::default();
        let mut camera = FlyCamera::default();
        controller.toggle_mode();
        press(&mut controller, KeyCode::KeyS);
        controller.update_camera(&mut camera, 1.0);
        assert!((camera.position.z - (3.0 + DEFAULT_MOVEMENT_SPEED)).abs() < 1e-5);
    }
}
