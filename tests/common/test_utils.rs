use hello_cube::{CubeScene, SurfaceSize, ViewerConfig};

pub(crate) const EPSILON: f32 = 1e-5;

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "expected {} but got {}",
        expected,
        actual
    );
}

pub(crate) fn default_scene(width: u32, height: u32) -> CubeScene {
    CubeScene::new(SurfaceSize::new(width, height), &ViewerConfig::default())
}

/// Project a world-space point with the scene's camera into normalised device coordinates.
#[allow(dead_code)]
pub(crate) fn to_ndc(scene: &CubeScene, point: [f32; 3]) -> [f32; 3] {
    let clip = scene.camera_uniform().view_proj() * cgmath::Vector4::new(point[0], point[1], point[2], 1.0);
    [clip.x / clip.w, clip.y / clip.w, clip.z / clip.w]
}

#[cfg(feature = "integration-tests")]
pub(crate) fn headless(size: SurfaceSize, scene: &CubeScene) -> hello_cube::context::Context {
    futures::executor::block_on(hello_cube::context::Context::headless(size, scene))
        .expect("Failed to create a headless graphics context")
}

#[cfg(feature = "integration-tests")]
pub(crate) fn capture(renderer: &hello_cube::Renderer) -> image::RgbaImage {
    futures::executor::block_on(renderer.capture()).expect("Failed to read back the frame")
}

/// Allow off-by-one differences from sRGB round trips.
#[cfg(feature = "integration-tests")]
pub(crate) fn assert_pixel_near(actual: &image::Rgba<u8>, expected: [u8; 3]) {
    for (channel, (a, e)) in actual.0.iter().zip(expected).enumerate() {
        assert!(
            (*a as i16 - e as i16).abs() <= 1,
            "channel {} differs: {:?} vs {:?}",
            channel,
            actual,
            expected
        );
    }
}
