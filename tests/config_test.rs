use hello_cube::{
    Rgb, ViewerConfig,
    config::{LightConfig, Spin},
};

#[test]
fn should_describe_the_stock_scene_by_default() {
    let config = ViewerConfig::default();
    assert_eq!(config.initial_size, (512, 512));
    assert_eq!(config.clear_colour, Rgb(0x1a, 0x1a, 0x4a));
    assert_eq!(config.cube_colour, Rgb(0x00, 0xff, 0x00));
    assert_eq!(config.spin, Spin { x: 0.004, y: 0.0045 });
    assert_eq!(config.light, LightConfig::default());
    assert_eq!(config.light.position, [0.0, 1.5, 2.0]);
    assert_eq!(config.camera_distance, 3.0);
    assert_eq!(config.fov_degrees, 75.0);
}

#[test]
fn should_parse_colours_in_common_notations() {
    assert_eq!(Rgb::parse("#1a1a4a").unwrap(), Rgb(0x1a, 0x1a, 0x4a));
    assert_eq!(Rgb::parse("00FF00").unwrap(), Rgb(0, 255, 0));
    assert_eq!(Rgb::parse("0xffffff").unwrap(), Rgb(255, 255, 255));
    assert!(Rgb::parse("#fff").is_err());
    assert!(Rgb::parse("#gggggg").is_err());
    assert!(Rgb::parse("#+fffff").is_err());
    assert!(Rgb::parse("-fffff").is_err());
}

#[test]
fn should_convert_colours_to_linear_space() {
    assert_eq!(Rgb(0, 0, 0).to_linear(), [0.0, 0.0, 0.0]);
    for channel in Rgb(255, 255, 255).to_linear() {
        assert!((channel - 1.0).abs() < 1e-6);
    }
    let [r, _, _] = Rgb(0x80, 0, 0).to_linear();
    assert!((r - 0.2158605).abs() < 1e-5);
}

#[test]
fn should_apply_query_overrides() {
    let config = ViewerConfig::from_query(
        "?width=800&height=600&clear=%23000000&colour=ff0000&spin=0.01,0.02&fov=60&distance=5&container=viewer",
    )
    .expect("valid query");
    assert_eq!(config.initial_size, (800, 600));
    assert_eq!(config.clear_colour, Rgb(0, 0, 0));
    assert_eq!(config.cube_colour, Rgb(255, 0, 0));
    assert_eq!(config.spin, Spin { x: 0.01, y: 0.02 });
    assert_eq!(config.fov_degrees, 60.0);
    assert_eq!(config.camera_distance, 5.0);
    assert_eq!(config.container_id, "viewer");
}

#[test]
fn should_keep_defaults_for_empty_and_unknown_options() {
    assert_eq!(ViewerConfig::from_query("").unwrap(), ViewerConfig::default());
    assert_eq!(ViewerConfig::from_query("?").unwrap(), ViewerConfig::default());
    assert_eq!(
        ViewerConfig::from_query("theme=dark").unwrap(),
        ViewerConfig::default()
    );
}

#[test]
fn should_reject_malformed_values() {
    for query in [
        "width=0",
        "width=wide",
        "clear=blue",
        "spin=0.1",
        "spin=NaN,inf",
        "spin=0.1,-0.1",
        "spin=inf,0",
        "fov=180",
        "distance=-1",
        "flag",
        "width=",
    ] {
        assert!(ViewerConfig::from_query(query).is_err(), "{} was accepted", query);
    }
}

#[test]
fn should_name_the_offending_option() {
    let err = ViewerConfig::from_query("fov=abc").unwrap_err();
    assert!(format!("{:#}", err).contains("fov"));
}

#[test]
fn should_decode_escaped_values() {
    let config = ViewerConfig::from_query("container=my+viewer%2F%C3%A9&colour=%230000ff").unwrap();
    assert_eq!(config.container_id, "my viewer/\u{e9}");
    assert_eq!(config.cube_colour, Rgb(0, 0, 255));
}

#[test]
fn should_keep_the_spin_finite_while_animating() {
    let config = ViewerConfig::from_query("spin=0,0.5").unwrap();
    let mut scene = hello_cube::CubeScene::new(hello_cube::SurfaceSize::new(64, 64), &config);
    for _ in 0..4 {
        scene.animate();
    }
    assert_eq!(scene.cube.rotation.x.0, 0.0);
    assert_eq!(scene.cube.rotation.y.0, 2.0);
}
