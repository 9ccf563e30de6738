//! Interactive preview window
//!
//! Renders the scene on the CPU into a framebuffer and shows it as a
//! nearest-filtered texture. Besides orbiting the camera, the window edits
//! the scene in place: pick a cube, move, rotate or scale it, add new ones,
//! move the eye and change the field of view. The frame is only re-rendered
//! when something changed.

use std::f64::consts::PI;
use std::path::PathBuf;

use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, get_frame_time, is_key_down, is_key_pressed,
    next_frame, screen_height, screen_width, vec2, Color, DrawTextureParams, FilterMode, KeyCode,
    Texture2D, WHITE,
};

use cube_raster::rasterizer::{
    render_scene, Cube, Framebuffer, Material, RenderSettings, RenderStats, Scene, Vec3,
};
use cube_raster::world::{save_png, SceneDescriptor, MAX_CUBES};

/// Radians per second while an arrow key is held
const ORBIT_SPEED: f64 = 1.5;
const ZOOM_STEP: f64 = 0.9;
/// World units per second for cube and eye movement
const MOVE_SPEED: f64 = 2.0;
/// Radians per second for cube rotation
const ROTATE_SPEED: f64 = 1.5;
/// Scale units per second
const SCALE_SPEED: f64 = 1.0;
/// Degrees per second
const FOV_SPEED: f64 = 30.0;

const POSITION_LIMIT: f64 = 5.0;
const EYE_LIMIT: f64 = 10.0;
const SCALE_MIN: f64 = 0.1;
const SCALE_MAX: f64 = 3.0;
const FOV_MIN: f64 = 30.0;
const FOV_MAX: f64 = 120.0;

const BG_COLOR: Color = Color::new(0.10, 0.10, 0.12, 1.0);
const TEXT_COLOR: Color = Color::new(0.9, 0.9, 0.9, 1.0);

/// Number keys select cubes 1..9 and 10
const SELECT_KEYS: [KeyCode; MAX_CUBES] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
    KeyCode::Key0,
];

/// Something the user asked the viewer to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerAction {
    /// Yaw and pitch deltas in radians
    Orbit(f64, f64),
    /// Multiply the eye distance
    Zoom(f64),
    /// Translate the eye, keeping the look-at point
    MoveEye(Vec3),
    /// Field of view delta in degrees
    ChangeFov(f64),
    SelectCube(usize),
    /// Translate the selected cube
    MoveCube(Vec3),
    /// Euler angle deltas for the selected cube
    RotateCube(Vec3),
    /// Scale delta for the selected cube
    ScaleCube(f64),
    /// Append a grey cube at the origin and select it
    AddCube,
    ToggleShading,
    Snapshot,
}

/// Viewer state, independent of the window
pub struct ViewerState {
    pub scene: Scene,
    pub settings: RenderSettings,
    pub fb: Framebuffer,
    pub stats: RenderStats,
    /// Cube the edit actions apply to
    pub selected: Option<usize>,
    /// Re-render before the next draw
    pub dirty: bool,
    snapshots: usize,
}

fn clamp_vec(v: Vec3, limit: f64) -> Vec3 {
    Vec3::new(
        v.x.clamp(-limit, limit),
        v.y.clamp(-limit, limit),
        v.z.clamp(-limit, limit),
    )
}

/// Wrap an angle into [-pi, pi]
fn wrap_angle(a: f64) -> f64 {
    (a + PI).rem_euclid(2.0 * PI) - PI
}

/// The cube `AddCube` appends
pub fn new_cube() -> Cube {
    Cube {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: 1.0,
        material: Material {
            color: Vec3::new(0.5, 0.5, 0.5),
            ka: 0.1,
            kd: 0.7,
            ks: 0.3,
            shininess: 32.0,
        },
    }
}

/// Framebuffer size as a macroquad texture size, if it fits
pub fn texture_size(width: usize, height: usize) -> Option<(u16, u16)> {
    Some((u16::try_from(width).ok()?, u16::try_from(height).ok()?))
}

impl ViewerState {
    pub fn new(desc: &SceneDescriptor) -> Self {
        let scene = desc.to_scene();
        let selected = if scene.cubes.is_empty() { None } else { Some(0) };
        Self {
            scene,
            settings: desc.settings(),
            fb: Framebuffer::new(desc.width, desc.height),
            stats: RenderStats::default(),
            selected,
            dirty: true,
            snapshots: 0,
        }
    }

    fn selected_cube(&mut self) -> Option<&mut Cube> {
        self.selected.and_then(|i| self.scene.cubes.get_mut(i))
    }

    /// Apply an edit to the selected cube, marking the frame dirty
    fn edit_selected(&mut self, edit: impl FnOnce(&mut Cube)) {
        if let Some(cube) = self.selected_cube() {
            edit(cube);
            self.dirty = true;
        }
    }

    pub fn apply(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::Orbit(yaw, pitch) => {
                self.scene.camera.orbit(yaw, pitch);
                self.dirty = true;
            }
            ViewerAction::Zoom(factor) => {
                self.scene.camera.zoom(factor);
                self.dirty = true;
            }
            ViewerAction::MoveEye(delta) => {
                let mut camera = self.scene.camera;
                camera.eye = clamp_vec(camera.eye + delta, EYE_LIMIT);
                // Refuse positions that collapse the view basis
                if camera.has_valid_basis() {
                    self.scene.camera = camera;
                    self.dirty = true;
                }
            }
            ViewerAction::ChangeFov(delta) => {
                let camera = &mut self.scene.camera;
                camera.fov_y = (camera.fov_y + delta).clamp(FOV_MIN, FOV_MAX);
                self.dirty = true;
            }
            ViewerAction::SelectCube(index) => {
                if index < self.scene.cubes.len() {
                    self.selected = Some(index);
                }
            }
            ViewerAction::MoveCube(delta) => {
                self.edit_selected(|cube| cube.position = clamp_vec(cube.position + delta, POSITION_LIMIT));
            }
            ViewerAction::RotateCube(delta) => {
                self.edit_selected(|cube| {
                    let r = cube.rotation + delta;
                    cube.rotation = Vec3::new(wrap_angle(r.x), wrap_angle(r.y), wrap_angle(r.z));
                });
            }
            ViewerAction::ScaleCube(delta) => {
                self.edit_selected(|cube| cube.scale = (cube.scale + delta).clamp(SCALE_MIN, SCALE_MAX));
            }
            ViewerAction::AddCube => {
                if self.scene.cubes.len() >= MAX_CUBES {
                    log::warn!("scene already holds {} cubes", MAX_CUBES);
                    return;
                }
                self.scene.cubes.push(new_cube());
                self.selected = Some(self.scene.cubes.len() - 1);
                self.dirty = true;
            }
            ViewerAction::ToggleShading => {
                self.settings.shading = self.settings.shading.toggled();
                log::info!("shading: {}", self.settings.shading.label());
                self.dirty = true;
            }
            ViewerAction::Snapshot => {
                self.snapshots += 1;
                let path = PathBuf::from(format!("snapshot_{:03}.png", self.snapshots));
                match save_png(&self.fb, &path) {
                    Ok(()) => log::info!("saved {}", path.display()),
                    Err(e) => log::warn!("snapshot failed: {}", e),
                }
            }
        }
    }

    /// Re-render if needed. Returns true when the framebuffer changed.
    pub fn refresh(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.fb.clear(self.settings.background);
        self.stats = render_scene(&self.scene, &mut self.fb, &self.settings);
        self.dirty = false;
        true
    }
}

/// -1, 0 or +1 from a pair of held keys
fn axis(negative: KeyCode, positive: KeyCode) -> f64 {
    let mut v = 0.0;
    if is_key_down(negative) {
        v -= 1.0;
    }
    if is_key_down(positive) {
        v += 1.0;
    }
    v
}

/// Collect this frame's keyboard input
///
/// Arrows orbit, Shift+arrows and PageUp/PageDown move the eye.
/// J/L, I/K, U/O move the selected cube along X, Y, Z; with Shift they
/// rotate it. [ and ] scale it, , and . change the field of view.
fn poll_actions(dt: f64) -> Vec<ViewerAction> {
    let mut actions = Vec::new();
    let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);

    let horizontal = axis(KeyCode::Left, KeyCode::Right);
    let vertical = axis(KeyCode::Down, KeyCode::Up);
    if shift {
        let depth = axis(KeyCode::PageDown, KeyCode::PageUp);
        let delta = Vec3::new(horizontal, vertical, depth) * (MOVE_SPEED * dt);
        if delta != Vec3::ZERO {
            actions.push(ViewerAction::MoveEye(delta));
        }
    } else if horizontal != 0.0 || vertical != 0.0 {
        actions.push(ViewerAction::Orbit(horizontal * ORBIT_SPEED * dt, vertical * ORBIT_SPEED * dt));
    }

    let cube_axes = Vec3::new(
        axis(KeyCode::J, KeyCode::L),
        axis(KeyCode::K, KeyCode::I),
        axis(KeyCode::U, KeyCode::O),
    );
    if cube_axes != Vec3::ZERO {
        actions.push(if shift {
            ViewerAction::RotateCube(cube_axes * (ROTATE_SPEED * dt))
        } else {
            ViewerAction::MoveCube(cube_axes * (MOVE_SPEED * dt))
        });
    }

    let grow = axis(KeyCode::LeftBracket, KeyCode::RightBracket);
    if grow != 0.0 {
        actions.push(ViewerAction::ScaleCube(grow * SCALE_SPEED * dt));
    }
    let widen = axis(KeyCode::Comma, KeyCode::Period);
    if widen != 0.0 {
        actions.push(ViewerAction::ChangeFov(widen * FOV_SPEED * dt));
    }

    for (i, key) in SELECT_KEYS.iter().enumerate() {
        if is_key_pressed(*key) {
            actions.push(ViewerAction::SelectCube(i));
        }
    }
    if is_key_pressed(KeyCode::N) {
        actions.push(ViewerAction::AddCube);
    }
    if is_key_pressed(KeyCode::Equal) {
        actions.push(ViewerAction::Zoom(ZOOM_STEP));
    }
    if is_key_pressed(KeyCode::Minus) {
        actions.push(ViewerAction::Zoom(1.0 / ZOOM_STEP));
    }
    if is_key_pressed(KeyCode::Tab) {
        actions.push(ViewerAction::ToggleShading);
    }
    if is_key_pressed(KeyCode::S) {
        actions.push(ViewerAction::Snapshot);
    }

    actions
}

/// Main loop of the preview window
pub async fn run(desc: SceneDescriptor) {
    let Some((tex_w, tex_h)) = texture_size(desc.width, desc.height) else {
        log::error!("{}x{} is too large for a window texture", desc.width, desc.height);
        return;
    };
    let mut state = ViewerState::new(&desc);
    let mut texture: Option<Texture2D> = None;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        for action in poll_actions(get_frame_time() as f64) {
            state.apply(action);
        }

        if state.refresh() || texture.is_none() {
            let tex = Texture2D::from_rgba8(tex_w, tex_h, &state.fb.to_rgba8());
            tex.set_filter(FilterMode::Nearest);
            texture = Some(tex);
        }

        clear_background(BG_COLOR);

        // Fit the framebuffer into the window, keeping its aspect ratio
        let (sw, sh) = (screen_width(), screen_height());
        let scale = (sw / tex_w as f32).min(sh / tex_h as f32);
        let (draw_w, draw_h) = (tex_w as f32 * scale, tex_h as f32 * scale);
        let (draw_x, draw_y) = (((sw - draw_w) / 2.0).round(), ((sh - draw_h) / 2.0).round());

        if let Some(tex) = &texture {
            draw_texture_ex(
                tex,
                draw_x,
                draw_y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(draw_w, draw_h)),
                    ..Default::default()
                },
            );
        }

        let camera = &state.scene.camera;
        let selected = match state.selected {
            Some(i) => format!("cube {}/{}", i + 1, state.scene.cubes.len()),
            None => "no cube".to_string(),
        };
        draw_text(
            &format!(
                "Eye: ({:.2}, {:.2}, {:.2}) | FOV {:.0} | {} | {} | {} tris, {} culled",
                camera.eye.x,
                camera.eye.y,
                camera.eye.z,
                camera.fov_y,
                selected,
                state.settings.shading.label(),
                state.stats.rasterized,
                state.stats.backface_culled,
            ),
            10.0,
            20.0,
            18.0,
            TEXT_COLOR,
        );
        draw_text(
            "Arrows: orbit  Shift+Arrows/PgUp/PgDn: eye  1-0: select  JLIKUO: move (Shift: rotate)  [ ]: scale  , .: fov  N: add  +/-: zoom  Tab: shading  S: snapshot",
            10.0,
            sh - 10.0,
            16.0,
            TEXT_COLOR,
        );

        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_raster::rasterizer::ShadingMode;

    fn small_demo() -> SceneDescriptor {
        SceneDescriptor { width: 80, height: 60, ..SceneDescriptor::demo() }
    }

    #[test]
    fn test_refresh_only_when_dirty() {
        let mut state = ViewerState::new(&small_demo());
        assert!(state.refresh());
        assert!(!state.refresh());
        assert!(state.stats.rasterized > 0);
    }

    #[test]
    fn test_toggle_shading_rerenders() {
        let mut state = ViewerState::new(&small_demo());
        state.refresh();
        assert_eq!(state.settings.shading, ShadingMode::Phong);
        state.apply(ViewerAction::ToggleShading);
        assert_eq!(state.settings.shading, ShadingMode::Flat);
        assert!(state.refresh());
    }

    #[test]
    fn test_orbit_and_zoom_move_eye() {
        let mut state = ViewerState::new(&small_demo());
        state.refresh();
        let before = state.scene.camera.eye;
        state.apply(ViewerAction::Orbit(0.4, 0.1));
        assert!(state.dirty);
        assert!(!state.scene.camera.eye.approx_eq(before, 1e-6));

        let r = (state.scene.camera.eye - state.scene.camera.center).len();
        state.apply(ViewerAction::Zoom(0.5));
        let r2 = (state.scene.camera.eye - state.scene.camera.center).len();
        assert!((r2 - r * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_select_cube_ignores_missing_index() {
        let mut state = ViewerState::new(&small_demo());
        assert_eq!(state.selected, Some(0));
        state.apply(ViewerAction::SelectCube(2));
        assert_eq!(state.selected, Some(2));
        state.apply(ViewerAction::SelectCube(7));
        assert_eq!(state.selected, Some(2));
    }

    #[test]
    fn test_edit_selected_cube() {
        let mut state = ViewerState::new(&small_demo());
        state.refresh();
        state.apply(ViewerAction::SelectCube(1));
        let before = state.scene.cubes[1];
        let untouched = state.scene.cubes[0];

        state.apply(ViewerAction::MoveCube(Vec3::new(0.5, -0.25, 1.0)));
        assert!(state.dirty);
        let moved = state.scene.cubes[1].position;
        assert!(moved.approx_eq(before.position + Vec3::new(0.5, -0.25, 1.0), 1e-12));

        state.apply(ViewerAction::RotateCube(Vec3::new(0.0, 0.2, 0.0)));
        assert!((state.scene.cubes[1].rotation.y - (before.rotation.y + 0.2)).abs() < 1e-12);

        state.apply(ViewerAction::ScaleCube(0.5));
        assert!((state.scene.cubes[1].scale - 1.5).abs() < 1e-12);

        assert_eq!(state.scene.cubes[0], untouched);
    }

    #[test]
    fn test_edits_stay_in_range() {
        let mut state = ViewerState::new(&small_demo());
        state.apply(ViewerAction::MoveCube(Vec3::new(100.0, -100.0, 0.0)));
        assert!(state.scene.cubes[0].position.approx_eq(Vec3::new(POSITION_LIMIT, -POSITION_LIMIT, 0.0), 1e-12));

        state.apply(ViewerAction::ScaleCube(-10.0));
        assert_eq!(state.scene.cubes[0].scale, SCALE_MIN);
        state.apply(ViewerAction::ScaleCube(10.0));
        assert_eq!(state.scene.cubes[0].scale, SCALE_MAX);

        state.apply(ViewerAction::RotateCube(Vec3::new(4.0, 0.0, 0.0)));
        let rx = state.scene.cubes[0].rotation.x;
        assert!((-PI..=PI).contains(&rx));
    }

    #[test]
    fn test_add_cube_respects_limit() {
        let mut state = ViewerState::new(&small_demo());
        state.refresh();
        state.apply(ViewerAction::AddCube);
        assert_eq!(state.scene.cubes.len(), 4);
        assert_eq!(state.selected, Some(3));
        assert_eq!(state.scene.cubes[3], new_cube());
        assert!((state.scene.cubes[3].material.color.x - 0.5).abs() < 1e-12);
        assert!(state.dirty);

        for _ in 0..20 {
            state.apply(ViewerAction::AddCube);
        }
        assert_eq!(state.scene.cubes.len(), MAX_CUBES);
        assert_eq!(state.selected, Some(MAX_CUBES - 1));
        state.refresh();
        assert_eq!(state.stats.cubes, MAX_CUBES);
    }

    #[test]
    fn test_fov_and_eye_changes() {
        let mut state = ViewerState::new(&small_demo());
        state.refresh();
        state.apply(ViewerAction::ChangeFov(15.0));
        assert!((state.scene.camera.fov_y - 75.0).abs() < 1e-12);
        assert!(state.dirty);
        state.apply(ViewerAction::ChangeFov(500.0));
        assert_eq!(state.scene.camera.fov_y, FOV_MAX);
        state.apply(ViewerAction::ChangeFov(-500.0));
        assert_eq!(state.scene.camera.fov_y, FOV_MIN);

        state.apply(ViewerAction::MoveEye(Vec3::new(1.0, 0.0, 0.0)));
        assert!(state.scene.camera.eye.approx_eq(Vec3::new(4.0, 2.0, 4.0), 1e-12));

        // Straight above the look-at point the basis collapses; the move is refused
        let eye = state.scene.camera.eye;
        state.apply(ViewerAction::MoveEye(Vec3::new(-eye.x, 0.0, -eye.z)));
        assert!(state.scene.camera.eye.approx_eq(eye, 1e-12));
    }

    #[test]
    fn test_empty_scene_has_no_selection() {
        let desc = SceneDescriptor { cubes: Vec::new(), ..small_demo() };
        let mut state = ViewerState::new(&desc);
        assert_eq!(state.selected, None);
        state.apply(ViewerAction::MoveCube(Vec3::ONE));
        assert!(state.scene.cubes.is_empty());
        state.apply(ViewerAction::AddCube);
        assert_eq!(state.selected, Some(0));
    }

    #[test]
    fn test_texture_size_limits() {
        assert_eq!(texture_size(800, 600), Some((800, 600)));
        assert_eq!(texture_size(65535, 1), Some((65535, 1)));
        assert_eq!(texture_size(65536, 1), None);
        assert_eq!(texture_size(1, 70000), None);
    }
}
