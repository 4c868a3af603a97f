//! Calibration values for the hand-receipt template and their on-disk store.

use handreceipt_layout::StandardFont;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown calibration field '{0}'")]
    UnknownField(String),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[error("failed to write layout file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
    }
}

/// Where every overlay element is drawn, in PDF points from the bottom-left
/// corner of the template page, plus the fonts and row capacities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub font_name: String,
    pub font_size: f32,
    pub font_size_hdr: f32,

    pub x_from: f32,
    pub y_from: f32,
    pub x_to: f32,
    pub y_to: f32,
    pub to_contact_offset: f32,
    pub contact_max_width: f32,

    pub x_page_right: f32,
    pub y_identifier: f32,

    pub item_desc_x: f32,
    pub item_desc_max_width: f32,
    pub qty_auth_x: f32,
    pub item_start_y_first: f32,
    pub item_start_y_next: f32,
    pub line_spacing: f32,
    pub second_line_offset: f32,

    pub rows_first: usize,
    pub rows_next: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_name: StandardFont::Helvetica.postscript_name().to_string(),
            font_size: 9.0,
            font_size_hdr: 10.0,
            x_from: 260.0,
            y_from: 590.0,
            x_to: 710.0,
            y_to: 590.0,
            to_contact_offset: 12.0,
            contact_max_width: 300.0,
            x_page_right: 575.0,
            y_identifier: 717.0,
            item_desc_x: 226.0,
            item_desc_max_width: 430.0,
            qty_auth_x: 591.0,
            item_start_y_first: 493.0,
            item_start_y_next: 640.0,
            line_spacing: 23.0,
            second_line_offset: 11.0,
            rows_first: 16,
            rows_next: 20,
        }
    }
}

impl LayoutConfig {
    /// Every real-valued field by name.
    fn numbers_mut(&mut self) -> [(&'static str, &mut f32); 17] {
        [
            ("font_size", &mut self.font_size),
            ("font_size_hdr", &mut self.font_size_hdr),
            ("x_from", &mut self.x_from),
            ("y_from", &mut self.y_from),
            ("x_to", &mut self.x_to),
            ("y_to", &mut self.y_to),
            ("to_contact_offset", &mut self.to_contact_offset),
            ("contact_max_width", &mut self.contact_max_width),
            ("x_page_right", &mut self.x_page_right),
            ("y_identifier", &mut self.y_identifier),
            ("item_desc_x", &mut self.item_desc_x),
            ("item_desc_max_width", &mut self.item_desc_max_width),
            ("qty_auth_x", &mut self.qty_auth_x),
            ("item_start_y_first", &mut self.item_start_y_first),
            ("item_start_y_next", &mut self.item_start_y_next),
            ("line_spacing", &mut self.line_spacing),
            ("second_line_offset", &mut self.second_line_offset),
        ]
    }

    fn capacities_mut(&mut self) -> [(&'static str, &mut usize); 2] {
        [("rows_first", &mut self.rows_first), ("rows_next", &mut self.rows_next)]
    }

    /// Names of all calibration fields, in file order.
    pub fn field_names() -> Vec<&'static str> {
        let mut cfg = LayoutConfig::default();
        let mut names = vec!["font_name"];
        names.extend(cfg.numbers_mut().map(|(name, _)| name));
        names.extend(cfg.capacities_mut().map(|(name, _)| name));
        names
    }

    /// The configured font.
    pub fn font(&self) -> Result<StandardFont, ConfigError> {
        self.font_name
            .parse()
            .map_err(|err| ConfigError::invalid("font_name", format!("{err}")))
    }

    /// Builds a configuration from a parsed layout file.
    ///
    /// Each recognised key that holds a usable value overrides the compiled
    /// default; everything else keeps the default and is logged.
    pub fn from_json(value: &Value) -> Self {
        let mut cfg = LayoutConfig::default();
        match value.as_object() {
            Some(map) => cfg.merge(map),
            None => log::warn!("Layout file is not a JSON object; using defaults."),
        }
        cfg
    }

    fn merge(&mut self, map: &Map<String, Value>) {
        let known = LayoutConfig::field_names();
        for key in map.keys() {
            if !known.iter().any(|name| name == key) {
                log::debug!("Ignoring unknown layout key '{}'", key);
            }
        }

        if let Some(value) = map.get("font_name") {
            match value.as_str().map(str::parse::<StandardFont>) {
                Some(Ok(font)) => self.font_name = font.postscript_name().to_string(),
                _ => keep_default("font_name", value),
            }
        }
        for (name, slot) in self.numbers_mut() {
            if let Some(value) = map.get(name) {
                match value.as_f64().map(|n| check_number(name, n as f32)) {
                    Some(Ok(number)) => *slot = number,
                    _ => keep_default(name, value),
                }
            }
        }
        for (name, slot) in self.capacities_mut() {
            if let Some(value) = map.get(name) {
                match capacity(value) {
                    Some(count) => *slot = count,
                    None => keep_default(name, value),
                }
            }
        }
    }

    /// Sets one field from its textual form, as typed on a command line.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        if name == "font_name" {
            let font: StandardFont = value
                .parse()
                .map_err(|err| ConfigError::invalid(name, format!("{err}")))?;
            self.font_name = font.postscript_name().to_string();
            return Ok(());
        }
        if let Some((_, slot)) = self.numbers_mut().into_iter().find(|(field, _)| *field == name) {
            let number = value
                .parse::<f32>()
                .map_err(|_| ConfigError::invalid(name, format!("'{value}' is not a number")))?;
            *slot =
                check_number(name, number).map_err(|reason| ConfigError::invalid(name, reason))?;
            return Ok(());
        }
        let capacity_slot = self.capacities_mut().into_iter().find(|(field, _)| *field == name);
        if let Some((_, slot)) = capacity_slot {
            let count = value.parse::<usize>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                ConfigError::invalid(name, format!("'{value}' is not a whole number of at least 1"))
            })?;
            *slot = count;
            return Ok(());
        }
        Err(ConfigError::UnknownField(name.to_string()))
    }

    /// Checks a configuration that did not come through [`LayoutStore::load`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.font()?;
        let mut cfg = self.clone();
        for (name, value) in cfg.numbers_mut() {
            check_number(name, *value).map_err(|reason| ConfigError::invalid(name, reason))?;
        }
        for (name, count) in cfg.capacities_mut() {
            if *count == 0 {
                return Err(ConfigError::invalid(name, "must be at least 1"));
            }
        }
        Ok(())
    }
}

/// Fields that must stay strictly positive.
const FONT_SIZE_FIELDS: [&str; 2] = ["font_size", "font_size_hdr"];

/// The rule every real-valued field obeys, wherever its value came from.
fn check_number(name: &str, number: f32) -> Result<f32, &'static str> {
    if !number.is_finite() {
        return Err("must be a finite number");
    }
    if FONT_SIZE_FIELDS.contains(&name) && number <= 0.0 {
        return Err("must be greater than zero");
    }
    Ok(number)
}

fn keep_default(name: &str, value: &Value) {
    log::warn!("Layout key '{}' has unusable value {}; keeping default.", name, value);
}

fn capacity(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok().filter(|n| *n >= 1);
    }
    value
        .as_f64()
        .filter(|n| n.is_finite() && n.fract() == 0.0 && *n >= 1.0 && *n <= u32::MAX as f64)
        .map(|n| n as usize)
}

/// Persistent home of the calibration.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    path: PathBuf,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

impl LayoutStore {
    pub const DEFAULT_PATH: &'static str = "layout.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored calibration merged over the defaults.
    ///
    /// Never fails: a missing or unreadable file yields the defaults.
    pub fn load(&self) -> LayoutConfig {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No layout file at {}; using default calibration.", self.path.display());
                return LayoutConfig::default();
            }
            Err(err) => {
                log::warn!(
                    "Could not read layout file {}: {}; using defaults.",
                    self.path.display(),
                    err
                );
                return LayoutConfig::default();
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => LayoutConfig::from_json(&value),
            Err(err) => {
                log::warn!(
                    "Layout file {} is malformed: {}; using defaults.",
                    self.path.display(),
                    err
                );
                LayoutConfig::default()
            }
        }
    }

    /// Writes the full calibration, replacing the file in one step.
    pub fn save(&self, cfg: &LayoutConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        let write_err = |source: io::Error| ConfigError::Write { path: self.path.clone(), source };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        serde_json::to_writer_pretty(&mut tmp, cfg)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|err| write_err(err.error))?;

        log::info!("Saved calibration to {}", self.path.display());
        Ok(())
    }

    /// Restores and persists the compiled defaults.
    pub fn reset(&self) -> Result<LayoutConfig, ConfigError> {
        let cfg = LayoutConfig::default();
        self.save(&cfg)?;
        Ok(cfg)
    }
}
