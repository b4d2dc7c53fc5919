use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Construct-time options. Analog channel selectors default to -1, which
/// selects the autonomous (sensor-free) source for that axis; pin selectors
/// default to -1, which disables that button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Analog input for horizontal eye position (-1 = autonomous gaze)
    #[serde(default = "default_unset")]
    pub joystick_x_chan: i32,

    /// Analog input for vertical eye position
    #[serde(default = "default_unset")]
    pub joystick_y_chan: i32,

    /// Analog input for pupil control (-1 = fractal dilation)
    #[serde(default = "default_unset")]
    pub pupil_chan: i32,

    #[serde(default)]
    pub joystick_x_flip: bool,

    #[serde(default)]
    pub joystick_y_flip: bool,

    #[serde(default)]
    pub pupil_flip: bool,

    /// If > 0, low-pass filter the pupil input by this level
    #[serde(default = "default_pupil_smooth")]
    pub pupil_smooth: u32,

    /// Eyelids track the vertical gaze
    #[serde(default = "default_true")]
    pub tracking: bool,

    /// Eyes blink autonomously
    #[serde(default = "default_true")]
    pub autoblink: bool,

    /// GPIO pin for the blink button, both eyes (-1 = none)
    #[serde(default = "default_unset")]
    pub blink_pin: i32,

    /// GPIO pin for the left-eye wink button
    #[serde(default = "default_unset")]
    pub wink_l_pin: i32,

    /// GPIO pin for the right-eye wink button
    #[serde(default = "default_unset")]
    pub wink_r_pin: i32,

    /// Render a single centered eye instead of a pair
    #[serde(default)]
    pub cyclops: bool,

    /// Eye size in pixels used for the built-in profile
    #[serde(default = "default_eye_radius")]
    pub eye_radius: f32,

    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            joystick_x_chan: default_unset(),
            joystick_y_chan: default_unset(),
            pupil_chan: default_unset(),
            joystick_x_flip: false,
            joystick_y_flip: false,
            pupil_flip: false,
            pupil_smooth: default_pupil_smooth(),
            tracking: default_true(),
            autoblink: default_true(),
            blink_pin: default_unset(),
            wink_l_pin: default_unset(),
            wink_r_pin: default_unset(),
            cyclops: false,
            eye_radius: default_eye_radius(),
            fps_cap: default_fps_cap(),
        }
    }
}

fn default_unset() -> i32 {
    -1
}

fn default_true() -> bool {
    true
}

fn default_pupil_smooth() -> u32 {
    16
}

fn default_eye_radius() -> f32 {
    128.0
}

fn default_fps_cap() -> u32 {
    60
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("oculi").join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_dir = config_dir.join("oculi");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }
}
