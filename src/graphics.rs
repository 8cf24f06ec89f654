//! Demo camera and gizmo drawing for the water surface and floating bodies.

use crate::water::{FloatingShape, Ocean, WaterContact, WaterReference};
use bevy::prelude::*;

/// World units per pixel of the demo camera.
pub const CAMERA_SCALE: f32 = 0.05;

/// Marker for the entity the camera follows horizontally.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CameraTarget;

/// Setup camera for 2D rendering.
///
/// The camera doubles as the water window's reference point.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::from(OrthographicProjection {
            scale: CAMERA_SCALE,
            ..OrthographicProjection::default_2d()
        }),
        WaterReference,
    ));
    info!("Camera spawned");
}

/// Track the target horizontally; the vertical stays on the waterline.
pub fn camera_follow_system(
    q_target: Query<&Transform, With<CameraTarget>>,
    mut q_camera: Query<&mut Transform, (With<Camera>, Without<CameraTarget>)>,
) {
    let Ok(target) = q_target.single() else {
        return;
    };
    let Ok(mut cam) = q_camera.single_mut() else {
        return;
    };

    cam.translation.x = target.translation.x;
}

/// Surface polyline plus the decimated collider outline.
pub fn surface_gizmo_system(ocean: Option<Res<Ocean>>, mut gizmos: Gizmos) {
    let Some(ocean) = ocean else {
        return;
    };

    gizmos.linestrip_2d(ocean.surface_points(), Color::srgb(0.3, 0.7, 1.0));

    let outline = ocean.collider_outline();
    for (i, &p1) in outline.iter().enumerate() {
        let p2 = outline[(i + 1) % outline.len()];
        gizmos.line_2d(p1, p2, Color::srgba(0.2, 0.4, 0.8, 0.35));
    }
}

/// Footprint rectangle of every floating body; brighter while wet.
pub fn body_gizmo_system(
    q: Query<(&Transform, &FloatingShape, Option<&WaterContact>)>,
    mut gizmos: Gizmos,
) {
    for (transform, shape, contact) in q.iter() {
        let center = transform.translation.truncate();
        let rotation = transform.rotation.to_euler(EulerRot::XYZ).2;
        let corners = crate::water::geometry::rect_corners(center, shape.0.footprint(), rotation);

        let color = if contact.is_some_and(|c| c.wet) {
            Color::srgb(1.0, 0.85, 0.3)
        } else {
            Color::srgb(0.7, 0.7, 0.7)
        };
        for i in 0..corners.len() {
            gizmos.line_2d(corners[i], corners[(i + 1) % corners.len()], color);
        }
    }
}
