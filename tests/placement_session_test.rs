use brick_placer::{
    PlacerConfig, Point3, Vector3,
    camera::{OrbitCamera, Projection},
    data_structures::brick::Color3,
    pick::{PickTarget, Ray},
    placement::Workspace,
    upload::BrickRecord,
};
use cgmath::Deg;

fn grey() -> Color3 {
    Color3::new(0.5, 0.5, 0.5)
}

fn pointer_ray(x: f64, y: f64) -> Ray {
    let config = PlacerConfig::default();
    let camera = OrbitCamera::from(&config.camera);
    let projection = Projection::new(800, 600, Deg(config.camera.fovy_degrees), 0.1, 500.0);
    camera.cast_ray_from_mouse((x, y).into(), 800.0, 600.0, &projection)
}

fn straight_down(x: f32, z: f32) -> Ray {
    Ray::new(Point3::new(x, 30.0, z), Vector3::new(0.0, -1.0, 0.0))
}

#[test]
fn pointer_at_the_screen_center_lands_on_the_floor_in_front_of_the_camera() {
    let mut workspace = Workspace::new(&PlacerConfig::default(), grey());
    let hit = workspace.pick(&pointer_ray(400.0, 300.0)).unwrap();
    assert_eq!(hit.target, PickTarget::Floor);
    assert!(hit.picked_point.z < 0.0);

    workspace.update_in_hand(&pointer_ray(400.0, 300.0));
    let position = workspace.in_hand().position();
    assert_eq!(position.y, 1.0);
    assert_eq!(position.x, 0.0);
    assert_eq!((position.z * 2.0).fract(), 0.0);
}

#[test]
fn building_a_small_wall_and_submitting_it() {
    let mut workspace = Workspace::new(&PlacerConfig::default(), grey());

    // Two bricks side by side on the floor.
    workspace.update_in_hand(&straight_down(-1.0, 0.0));
    workspace.commit(grey());
    workspace.update_in_hand(&straight_down(1.0, 0.0));
    workspace.commit(grey());

    // A third one pointed at the seam lands on top of both.
    workspace.update_in_hand(&straight_down(0.0, 0.0));
    assert_eq!(workspace.in_hand().position(), Point3::new(0.0, 2.0, 0.0));
    workspace.commit(grey());

    // A turned brick next to the wall.
    workspace.toggle_rotation();
    workspace.update_in_hand(&straight_down(4.0, 4.0));
    workspace.commit(grey());

    let expected = vec![
        BrickRecord { x: -1.0, y: 1.0, z: 0.0, rotated: false },
        BrickRecord { x: 1.0, y: 1.0, z: 0.0, rotated: false },
        BrickRecord { x: 0.0, y: 2.0, z: 0.0, rotated: false },
        BrickRecord { x: 4.0, y: 1.0, z: 4.0, rotated: true },
    ];
    assert_eq!(workspace.records(), expected);

    let submitted = workspace.submit(grey());
    assert_eq!(submitted, expected);
    assert!(workspace.placed().is_empty());
    assert_eq!(workspace.in_hand().position(), Point3::new(0.0, 1.0, 0.0));

    // The payload is a JSON array of plain objects in commit order.
    let json = serde_json::to_string(&submitted).unwrap();
    assert!(json.starts_with(r#"[{"x":-1.0,"y":1.0,"z":0.0,"rotated":false}"#), "{}", json);
}

#[test]
fn in_hand_brick_is_never_picked() {
    let mut workspace = Workspace::new(&PlacerConfig::default(), grey());
    workspace.update_in_hand(&straight_down(2.0, 2.0));
    let hit = workspace.pick(&straight_down(2.0, 2.0)).unwrap();
    assert_eq!(hit.target, PickTarget::Floor);

    workspace.commit(grey());
    let committed = workspace.placed()[0].id();
    let hit = workspace.pick(&straight_down(2.0, 2.0)).unwrap();
    assert_eq!(hit.target, PickTarget::Brick(committed));
}
