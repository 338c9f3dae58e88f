use crate::core::math::transform::TransformFactory;
use crate::io::config::ControlsConfig;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window};
use nalgebra::{Matrix4, Vector3};

/// Viewer actions bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    ScaleUp,
    ScaleDown,
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Quit,
}

impl ControlKey {
    /// `+`/`-` scale, W/S move along z, A/D and the left/right arrows along x,
    /// up/down arrows along y, Escape quits.
    pub fn from_key(key: Key) -> Option<Self> {
        Some(match key {
            Key::Equal | Key::NumPadPlus => ControlKey::ScaleUp,
            Key::Minus | Key::NumPadMinus => ControlKey::ScaleDown,
            Key::W => ControlKey::Forward,
            Key::S => ControlKey::Backward,
            Key::A | Key::Left => ControlKey::Left,
            Key::D | Key::Right => ControlKey::Right,
            Key::Up => ControlKey::Up,
            Key::Down => ControlKey::Down,
            Key::Escape => ControlKey::Quit,
            _ => return None,
        })
    }
}

/// Window events, decoupled from the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Resized { width: usize, height: usize },
    KeyPressed(ControlKey),
    LeftClick,
    MouseMoved { x: f32, y: f32 },
}

/// Rigid transform the user applies to every mesh (never to cameras or lights).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserTransform {
    pub translation: Vector3<f32>,
    /// Degrees.
    pub rotate_x: f32,
    /// Degrees.
    pub rotate_y: f32,
    pub scale: f32,
}

impl Default for UserTransform {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotate_x: 0.0,
            rotate_y: 0.0,
            scale: 1.0,
        }
    }
}

impl UserTransform {
    /// `T * Rx * Ry * S`.
    pub fn matrix(&self) -> Matrix4<f32> {
        TransformFactory::translation(&self.translation)
            * TransformFactory::rotation_x(self.rotate_x.to_radians())
            * TransformFactory::rotation_y(self.rotate_y.to_radians())
            * TransformFactory::scaling(self.scale)
    }
}

/// Keyboard and mouse state of the viewer.
#[derive(Debug, Clone)]
pub struct ViewerControls {
    pub transform: UserTransform,
    /// Mouse motion rotates the meshes while on; toggled by a left click.
    pub mouse_rotation: bool,
    pub viewport: (usize, usize),
    pub quit: bool,
    settings: ControlsConfig,
}

impl ViewerControls {
    pub fn new(settings: ControlsConfig, width: usize, height: usize) -> Self {
        Self {
            transform: UserTransform::default(),
            mouse_rotation: false,
            viewport: (width, height),
            quit: false,
            settings,
        }
    }

    /// Applies one event. Returns true if the user transform changed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        let before = self.transform;
        let step = self.settings.step;
        let t = &mut self.transform;

        match event {
            InputEvent::Resized { width, height } => self.viewport = (width, height),
            InputEvent::KeyPressed(key) => match key {
                ControlKey::ScaleUp => t.scale += self.settings.scale_step,
                ControlKey::ScaleDown => {
                    t.scale = (t.scale - self.settings.scale_step).max(self.settings.min_scale)
                }
                ControlKey::Forward => t.translation.z -= step,
                ControlKey::Backward => t.translation.z += step,
                ControlKey::Left => t.translation.x -= step,
                ControlKey::Right => t.translation.x += step,
                ControlKey::Up => t.translation.y += step,
                ControlKey::Down => t.translation.y -= step,
                ControlKey::Quit => self.quit = true,
            },
            InputEvent::LeftClick => self.mouse_rotation = !self.mouse_rotation,
            InputEvent::MouseMoved { x, y } => {
                if self.mouse_rotation {
                    let cx = (self.viewport.0 / 2) as f32;
                    let cy = (self.viewport.1 / 2) as f32;
                    t.rotate_y = (x - cx) * self.settings.mouse_sensitivity;
                    t.rotate_x = (y - cy) * self.settings.mouse_sensitivity;
                }
            }
        }

        self.transform != before
    }
}

/// Turns minifb's polled window state into [`InputEvent`]s.
#[derive(Debug, Default)]
pub struct EventPoller {
    size: (usize, usize),
    left_down: bool,
    mouse: Option<(f32, f32)>,
}

impl EventPoller {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            size: (width, height),
            ..Default::default()
        }
    }

    pub fn poll(&mut self, window: &Window) -> Vec<InputEvent> {
        let mut events = Vec::new();

        let size = window.get_size();
        if size != self.size && size.0 > 0 && size.1 > 0 {
            self.size = size;
            events.push(InputEvent::Resized {
                width: size.0,
                height: size.1,
            });
        }

        events.extend(
            window
                .get_keys_pressed(KeyRepeat::Yes)
                .into_iter()
                .filter_map(ControlKey::from_key)
                .map(InputEvent::KeyPressed),
        );

        let left_down = window.get_mouse_down(MouseButton::Left);
        if left_down && !self.left_down {
            events.push(InputEvent::LeftClick);
        }
        self.left_down = left_down;

        if let Some(pos) = window.get_mouse_pos(MouseMode::Discard)
            && self.mouse != Some(pos)
        {
            self.mouse = Some(pos);
            events.push(InputEvent::MouseMoved { x: pos.0, y: pos.1 });
        }

        events
    }
}
