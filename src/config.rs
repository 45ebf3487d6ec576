//! Viewer configuration.
//!
//! [`ViewerConfig::default`] describes the stock scene: a green unit cube on a
//! dark blue background, lit by a white point light. Every value can be
//! overridden from a `key=value&key=value` string. On the web that string is
//! the page's query string, natively it is read from the `HELLO_CUBE`
//! environment variable.

use anyhow::{Context as _, anyhow, bail};
use url::form_urlencoded;

/// Name of the environment variable holding native overrides.
pub const ENV_VAR: &str = "HELLO_CUBE";

/// An 8-bit per channel RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Parse `#rrggbb`, `rrggbb` or `0xrrggbb`.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("expected six hex digits in colour '{}'", s);
        }
        let hex = u32::from_str_radix(digits, 16)
            .with_context(|| format!("invalid hex colour '{}'", s))?;
        Ok(Self::from_hex(hex))
    }

    /// Linear-space channels in `[0, 1]`, as expected by an sRGB render target.
    pub fn to_linear(self) -> [f32; 3] {
        let conv = |c: u8| {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [conv(self.0), conv(self.1), conv(self.2)]
    }
}

impl From<Rgb> for wgpu::Color {
    fn from(rgb: Rgb) -> Self {
        let [r, g, b] = rgb.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

/// Per-frame rotation increments of the cube, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub x: f32,
    pub y: f32,
}

impl Default for Spin {
    fn default() -> Self {
        Self { x: 0.004, y: 0.0045 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub colour: Rgb,
    pub intensity: f32,
    /// Distance at which the light contribution reaches zero.
    pub range: f32,
    pub decay: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1.5, 2.0],
            colour: Rgb::from_hex(0xffffff),
            intensity: 1.0,
            range: 100.0,
            decay: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Logical size used until the host reports its real viewport.
    pub initial_size: (u32, u32),
    pub clear_colour: Rgb,
    pub cube_colour: Rgb,
    pub specular: Rgb,
    pub shininess: f32,
    pub spin: Spin,
    pub light: LightConfig,
    /// Camera distance from the origin along +z.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Id of the DOM element the canvas is inserted into (web only).
    pub container_id: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_size: (512, 512),
            clear_colour: Rgb::from_hex(0x1a1a4a),
            cube_colour: Rgb::from_hex(0x00ff00),
            specular: Rgb::from_hex(0x111111),
            shininess: 30.0,
            spin: Spin::default(),
            light: LightConfig::default(),
            camera_distance: 3.0,
            fov_degrees: 75.0,
            container_id: "hello-cube".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Apply overrides from a query string such as `clear=%23000000&spin=0.01,0`.
    ///
    /// A leading `?` is accepted. Unknown keys are skipped with a warning,
    /// malformed values are errors.
    pub fn from_query(query: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_query(query)?;
        Ok(config)
    }

    pub fn apply_query(&mut self, query: &str) -> anyhow::Result<()> {
        let query = query.trim().trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                bail!("missing value for option '{}'", key);
            }
            self.apply(&key, &value)
                .with_context(|| format!("invalid value for '{}'", key))?;
        }
        Ok(())
    }

    /// Read overrides from [`ENV_VAR`], falling back to the defaults when unset.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(ENV_VAR) {
            Ok(query) => Self::from_query(&query),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Read overrides from the page URL.
    #[cfg(target_arch = "wasm32")]
    pub fn from_location() -> anyhow::Result<Self> {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        Self::from_query(&search)
    }

    fn apply(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "width" => self.initial_size.0 = parse_positive(value)?,
            "height" => self.initial_size.1 = parse_positive(value)?,
            "clear" => self.clear_colour = Rgb::parse(value)?,
            "colour" | "color" => self.cube_colour = Rgb::parse(value)?,
            "spin" => {
                let (x, y) = value
                    .split_once(',')
                    .ok_or_else(|| anyhow!("expected 'x,y'"))?;
                self.spin = Spin {
                    x: parse_increment(x)?,
                    y: parse_increment(y)?,
                };
            }
            "fov" => {
                let fov: f32 = value.parse()?;
                if !(fov > 0.0 && fov < 180.0) {
                    bail!("field of view must be within (0, 180) degrees");
                }
                self.fov_degrees = fov;
            }
            "distance" => {
                let distance: f32 = value.parse()?;
                if !(distance > 0.0) {
                    bail!("camera distance must be positive");
                }
                self.camera_distance = distance;
            }
            "container" => self.container_id = value.to_string(),
            unknown => log::warn!("ignoring unknown option '{}'", unknown),
        }
        Ok(())
    }
}

fn parse_positive(value: &str) -> anyhow::Result<u32> {
    let v: u32 = value.parse()?;
    if v == 0 {
        bail!("must be greater than zero");
    }
    Ok(v)
}

/// Spin increments are finite and non-negative: the cube only ever turns forward.
fn parse_increment(value: &str) -> anyhow::Result<f32> {
    let v: f32 = value.trim().parse()?;
    if !v.is_finite() || v < 0.0 {
        bail!("spin increments must be finite and non-negative, got '{}'", value.trim());
    }
    Ok(v)
}
