use hello_cube::{ViewerConfig, config::Spin};

use crate::common::test_utils::{assert_close, default_scene};

mod common;

#[test]
fn should_spin_by_fixed_increments_every_frame() {
    let mut scene = default_scene(512, 512);
    let spin = Spin::default();
    assert_eq!(scene.cube.rotation.x.0, 0.0);
    assert_eq!(scene.cube.rotation.y.0, 0.0);

    let mut previous = scene.cube.rotation;
    for _ in 0..100 {
        scene.animate();
        let current = scene.cube.rotation;
        assert_close(current.x.0 - previous.x.0, spin.x);
        assert_close(current.y.0 - previous.y.0, spin.y);
        assert!(current.x > previous.x);
        assert!(current.y > previous.y);
        assert_eq!(current.z, previous.z);
        previous = current;
    }
    assert_eq!(scene.frames(), 100);
    assert!((scene.cube.rotation.x.0 - 0.4).abs() < 1e-4);
    assert!((scene.cube.rotation.y.0 - 0.45).abs() < 1e-4);
}

#[test]
fn should_use_configured_spin() {
    let config = ViewerConfig::from_query("spin=0.1,0.2").expect("valid query");
    let mut scene = hello_cube::CubeScene::new(hello_cube::SurfaceSize::new(10, 10), &config);
    scene.animate();
    scene.animate();
    assert_close(scene.cube.rotation.x.0, 0.2);
    assert_close(scene.cube.rotation.y.0, 0.4);
}

#[test]
fn should_rotate_the_cube_around_its_centre() {
    let mut scene = default_scene(512, 512);
    for _ in 0..250 {
        scene.animate();
    }
    let model = scene.cube_instance().model();
    let centre = model * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_close(centre.x, 0.0);
    assert_close(centre.y, 0.0);
    assert_close(centre.z, 0.0);

    // rotation keeps the corner on the circumscribed sphere
    let corner = model * cgmath::Vector4::new(0.5, 0.5, 0.5, 1.0);
    let radius = (corner.x * corner.x + corner.y * corner.y + corner.z * corner.z).sqrt();
    assert_close(radius, 0.75f32.sqrt());
}
