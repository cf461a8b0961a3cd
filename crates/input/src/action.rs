use glam::Vec2;

/// A high-level action produced from user input.
///
/// Cameras consume the view actions; the driving loop consumes the run
/// controls. Both ignore what they do not understand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pan by a pointer drag between two window positions (y up).
    Translate { from: Vec2, to: Vec2 },
    /// Rotate around the look-at center: azimuth and polar increments, radians.
    Orbit { du: f32, dv: f32 },
    /// Scroll by `delta` notches in a window `window_height` pixels tall.
    Zoom { delta: f32, window_height: f32 },
    /// Look along the x axis.
    LookAtX,
    /// Look along the y axis.
    LookAtY,
    /// Look down the z axis.
    LookAtZ,
    /// Turn both camera angles by half a revolution.
    LookAtMinus,
    TogglePause,
    /// Advance the simulation by exactly one tick.
    StepOnce,
    TogglePanel,
    /// Input with no binding.
    Noop,
}

impl Action {
    /// Whether the action changes the camera.
    pub fn is_camera(&self) -> bool {
        matches!(
            self,
            Self::Translate { .. }
                | Self::Orbit { .. }
                | Self::Zoom { .. }
                | Self::LookAtX
                | Self::LookAtY
                | Self::LookAtZ
                | Self::LookAtMinus
        )
    }
}

/// Keys with a binding. Apps map their platform key codes onto this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    X,
    Y,
    Z,
    M,
    S,
    Space,
    F1,
    Other,
}

impl Key {
    /// Action bound to a key press.
    pub fn action(self) -> Action {
        match self {
            Self::X => Action::LookAtX,
            Self::Y => Action::LookAtY,
            Self::Z => Action::LookAtZ,
            Self::M => Action::LookAtMinus,
            Self::S => Action::StepOnce,
            Self::Space => Action::TogglePause,
            Self::F1 => Action::TogglePanel,
            Self::Other => Action::Noop,
        }
    }
}
