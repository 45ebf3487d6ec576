use hello_cube::{Renderer, SurfaceSize, ViewerConfig};

use crate::common::test_utils::{assert_close, default_scene, to_ndc};

mod common;

#[test]
fn should_resize_surface_and_camera_together() {
    let config = ViewerConfig::default();
    let initial = SurfaceSize::new(512, 512);
    let mut scene = default_scene(initial.width, initial.height);
    let mut renderer = Renderer::new(initial, config.clear_colour);
    assert_close(scene.projection.aspect, 1.0);

    let resized = SurfaceSize::from_logical(800.0, 450.0, 2.0);
    renderer.resize(resized);
    scene.resize(resized);

    assert_eq!(renderer.size(), SurfaceSize::new(1600, 900));
    assert_eq!(scene.size(), SurfaceSize::new(1600, 900));
    assert_close(scene.projection.aspect, 1600.0 / 900.0);
}

#[test]
fn should_ignore_zero_sized_viewports() {
    let config = ViewerConfig::default();
    let size = SurfaceSize::new(640, 480);
    let mut scene = default_scene(size.width, size.height);
    let mut renderer = Renderer::new(size, config.clear_colour);

    for degenerate in [SurfaceSize::new(0, 480), SurfaceSize::new(640, 0), SurfaceSize::new(0, 0)] {
        renderer.resize(degenerate);
        scene.resize(degenerate);
    }

    assert_eq!(renderer.size(), size);
    assert_eq!(scene.size(), size);
    assert_close(scene.projection.aspect, 640.0 / 480.0);
}

#[test]
fn should_convert_logical_sizes_with_the_pixel_ratio() {
    assert_eq!(SurfaceSize::from_logical(512.0, 512.0, 1.0), SurfaceSize::new(512, 512));
    assert_eq!(SurfaceSize::from_logical(300.5, 200.0, 1.5), SurfaceSize::new(451, 300));
    assert!(!SurfaceSize::from_logical(0.2, 100.0, 1.0).is_drawable());
}

#[test]
fn should_keep_the_cube_square_on_wide_viewports() {
    let mut scene = default_scene(512, 512);
    scene.resize(SurfaceSize::new(2000, 1000));

    // a unit step along x and along y must cover the same number of pixels
    let x = to_ndc(&scene, [0.5, 0.0, 0.0]);
    let y = to_ndc(&scene, [0.0, 0.5, 0.0]);
    let x_pixels = x[0] * 2000.0 / 2.0;
    let y_pixels = y[1] * 1000.0 / 2.0;
    assert!((x_pixels - y_pixels).abs() < 0.01, "{} vs {}", x_pixels, y_pixels);
}

#[test]
fn should_project_the_origin_to_the_centre_inside_the_depth_range() {
    let scene = default_scene(800, 600);
    let ndc = to_ndc(&scene, [0.0, 0.0, 0.0]);
    assert_close(ndc[0], 0.0);
    assert_close(ndc[1], 0.0);
    assert!(ndc[2] > 0.0 && ndc[2] < 1.0, "depth {} outside wgpu clip space", ndc[2]);
}
