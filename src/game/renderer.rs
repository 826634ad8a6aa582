//! Renderer
//!
//! Captures what a frame needs from the world into a `FrameSnapshot`, then
//! draws the snapshot with macroquad's 3D immediate mode. Capture is plain
//! data so it can be tested without a window.

use macroquad::prelude as mq;
use crate::math::Vec3;
use crate::world::TILE_SIZE;
use super::components::{Contacts, Model};
use super::world::{CameraView, World};

/// A drawable box, axis-aligned after rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxView {
    pub center: Vec3,
    pub size: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightView {
    pub position: Vec3,
    /// Brightness as seen from the camera
    pub intensity: f32,
    pub color: [f32; 3],
}

/// Everything one frame draws
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub camera: CameraView,
    pub blocks: Vec<BoxView>,
    pub models: Vec<BoxView>,
    pub lights: Vec<LightView>,
    /// Collider bounds, only captured while collision debugging is on
    pub colliders: Vec<(Vec3, Vec3)>,
    pub floor_size: (f32, f32),
    pub hud: HudInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudInfo {
    pub level: String,
    pub ticks: u64,
    pub paused: bool,
    pub debug_collisions: bool,
    pub contacts: usize,
    /// Player contact flags from the last tick
    pub player_contacts: Contacts,
}

impl FrameSnapshot {
    pub fn capture(world: &World, paused: bool) -> Self {
        let camera = world.camera;

        let blocks = world
            .grid()
            .iter()
            .filter(|t| t.tile_type.is_solid())
            .map(|t| {
                let (min, max) = t.bounds();
                BoxView {
                    center: (min + max) * 0.5,
                    size: max - min,
                }
            })
            .collect();

        let models = world
            .entities()
            .iter()
            .filter(|e| e.capabilities().drawable())
            .filter_map(|e| {
                let model = e.model?;
                Some(BoxView {
                    center: e.position,
                    size: rotated_size(model, e.rotation.y),
                })
            })
            .collect();

        let lights = world
            .lights()
            .iter()
            .map(|l| LightView {
                position: l.position,
                intensity: l.intensity_from(camera.position),
                color: l.color,
            })
            .collect();

        let colliders = if world.debug_collisions {
            world
                .entities()
                .iter()
                .filter_map(|e| e.collider.map(|c| c.bounds_at(e.position)))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            camera,
            blocks,
            models,
            lights,
            colliders,
            floor_size: (
                world.grid().width() as f32 * TILE_SIZE,
                world.grid().height() as f32 * TILE_SIZE,
            ),
            hud: HudInfo {
                level: world.name.clone(),
                ticks: world.ticks(),
                paused,
                debug_collisions: world.debug_collisions,
                contacts: world.events.contacts.len(),
                player_contacts: world.player().contacts,
            },
        }
    }
}

/// Model size rotated about Y, as an axis-aligned extent
fn rotated_size(model: Model, yaw: f32) -> Vec3 {
    let size = model.size();
    let (sin, cos) = yaw.sin_cos();
    Vec3::new(
        (size.x * cos).abs() + (size.z * sin).abs(),
        size.y,
        (size.x * sin).abs() + (size.z * cos).abs(),
    )
}

fn to_mq(v: Vec3) -> mq::Vec3 {
    mq::vec3(v.x, v.y, v.z)
}

fn shade(base: [f32; 3], brightness: f32) -> mq::Color {
    let b = brightness.clamp(0.0, 1.0);
    mq::Color::new(base[0] * b, base[1] * b, base[2] * b, 1.0)
}

/// Draw one frame
pub fn draw_frame(frame: &FrameSnapshot) {
    mq::clear_background(mq::Color::from_rgba(20, 22, 28, 255));

    let eye = to_mq(frame.camera.position);
    mq::set_camera(&mq::Camera3D {
        position: eye,
        target: eye + to_mq(frame.camera.direction),
        up: to_mq(Vec3::UP),
        ..Default::default()
    });

    // Overall brightness from the lights the camera can see
    let cap = TILE_SIZE * 0.2;
    let light_level = frame.lights.iter().map(|l| l.intensity / cap).fold(0.25, f32::max);

    let (w, d) = frame.floor_size;
    mq::draw_plane(
        mq::vec3(w * 0.5, 0.0, d * 0.5),
        mq::vec2(w * 0.5, d * 0.5),
        None,
        shade([0.35, 0.33, 0.3], light_level),
    );

    let wall = shade([0.6, 0.6, 0.65], light_level);
    for block in &frame.blocks {
        mq::draw_cube(to_mq(block.center), to_mq(block.size), None, wall);
        mq::draw_cube_wires(to_mq(block.center), to_mq(block.size), mq::Color::from_rgba(30, 30, 36, 255));
    }

    let door = shade([0.25, 0.45, 0.9], light_level);
    for model in &frame.models {
        mq::draw_cube(to_mq(model.center), to_mq(model.size), None, door);
    }

    for light in &frame.lights {
        let b = light.intensity / cap;
        mq::draw_sphere(to_mq(light.position), TILE_SIZE * 0.1, None, shade(light.color, 0.5 + b * 0.5));
    }

    for (min, max) in &frame.colliders {
        let center = (*min + *max) * 0.5;
        mq::draw_cube_wires(to_mq(center), to_mq(*max - *min), mq::Color::from_rgba(80, 255, 80, 255));
    }

    mq::set_default_camera();
    draw_hud(&frame.hud);
}

fn draw_hud(hud: &HudInfo) {
    let text = format!("{}  tick {}  fps {}", hud.level, hud.ticks, mq::get_fps());
    mq::draw_text(&text, 10.0, 20.0, 18.0, mq::Color::from_rgba(150, 150, 160, 200));

    if hud.debug_collisions {
        let text = format!("collision debug  contacts {}", hud.contacts);
        mq::draw_text(&text, 10.0, 40.0, 18.0, mq::Color::from_rgba(80, 255, 80, 220));
        let c = hud.player_contacts;
        let flags = [
            ("ground", c.grounded()),
            ("left", c.collide_left()),
            ("right", c.collide_right()),
            ("top", c.collide_top()),
            ("back", c.collide_back()),
            ("front", c.collide_front()),
        ];
        let text = flags
            .iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(" ");
        mq::draw_text(&format!("player: {}", text), 10.0, 60.0, 18.0, mq::Color::from_rgba(80, 255, 80, 220));
    }

    if hud.paused {
        let x = mq::screen_width() * 0.5 - 40.0;
        let y = mq::screen_height() * 0.5;
        mq::draw_text("PAUSED", x, y, 32.0, mq::Color::from_rgba(200, 200, 210, 255));
    }

    mq::draw_text(
        "WASD move, mouse look, P pause, F3 collision debug",
        10.0,
        mq::screen_height() - 12.0,
        14.0,
        mq::Color::from_rgba(100, 100, 110, 180),
    );
}
