use std::fs;
use std::path::Path;

use eframe::egui::{Pos2, pos2};
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 600.0,
        }
    }
}

impl CanvasConfig {
    pub fn center(&self) -> Pos2 {
        pos2(self.width * 0.5, self.height * 0.5)
    }
}

/// Tuning for the force simulation. Every field has a default so a config file
/// only needs to name what it overrides.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub canvas: CanvasConfig,
    pub link_distance: f32,
    pub charge_strength: f32,
    pub center_strength: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub collision_iterations: usize,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub velocity_decay: f32,
    pub time_step: f32,
    pub max_ticks: usize,
    pub theta: f32,
    pub seed_jitter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            link_distance: 200.0,
            charge_strength: -400.0,
            center_strength: 0.05,
            collision_radius: 40.0,
            collision_strength: 1.0,
            collision_iterations: 2,
            alpha_decay: 0.05,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            time_step: 1.0,
            max_ticks: 300,
            theta: 0.9,
            seed_jitter: 10.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_canvas(mut self, width: Option<f32>, height: Option<f32>) -> Self {
        if let Some(width) = width {
            self.canvas.width = width;
        }
        if let Some(height) = height {
            self.canvas.height = height;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        }

        positive("canvas.width", self.canvas.width)?;
        positive("canvas.height", self.canvas.height)?;
        positive("link_distance", self.link_distance)?;
        positive("collision_radius", self.collision_radius)?;
        positive("time_step", self.time_step)?;
        positive("theta", self.theta)?;

        if !self.charge_strength.is_finite() || !self.center_strength.is_finite() {
            return Err(ConfigError::Invalid(
                "charge_strength and center_strength must be finite".to_owned(),
            ));
        }
        if !(self.alpha_decay > 0.0 && self.alpha_decay < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha_decay must lie in (0, 1), got {}",
                self.alpha_decay
            )));
        }
        if !(self.alpha_min > 0.0 && self.alpha_min <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha_min must lie in (0, 1], got {}",
                self.alpha_min
            )));
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(ConfigError::Invalid(format!(
                "velocity_decay must lie in [0, 1], got {}",
                self.velocity_decay
            )));
        }
        if !(0.0..=1.0).contains(&self.collision_strength) {
            return Err(ConfigError::Invalid(format!(
                "collision_strength must lie in [0, 1], got {}",
                self.collision_strength
            )));
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::Invalid("max_ticks must be at least 1".to_owned()));
        }
        if !self.seed_jitter.is_finite() || self.seed_jitter < 0.0 {
            return Err(ConfigError::Invalid(
                "seed_jitter must be a non-negative number".to_owned(),
            ));
        }

        Ok(())
    }
}
