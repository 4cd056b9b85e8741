//! Engine options

use crate::error::{EngineError, EngineResult};
use std::fmt;

/// Declared option and its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOption {
    /// Checkbox option
    Check { name: String, default: bool },

    /// Spin (numeric) option
    Spin {
        name: String,
        default: i64,
        min: i64,
        max: i64,
    },

    /// Free-text option
    Text { name: String, default: String },

    /// Button option (action trigger)
    Button { name: String },
}

impl EngineOption {
    pub fn check(name: impl Into<String>, default: bool) -> Self {
        EngineOption::Check { name: name.into(), default }
    }

    pub fn spin(name: impl Into<String>, default: i64, min: i64, max: i64) -> Self {
        EngineOption::Spin { name: name.into(), default, min, max }
    }

    pub fn text(name: impl Into<String>, default: impl Into<String>) -> Self {
        EngineOption::Text { name: name.into(), default: default.into() }
    }

    pub fn button(name: impl Into<String>) -> Self {
        EngineOption::Button { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            EngineOption::Check { name, .. }
            | EngineOption::Spin { name, .. }
            | EngineOption::Text { name, .. }
            | EngineOption::Button { name } => name,
        }
    }

    fn default_value(&self) -> OptionValue {
        match self {
            EngineOption::Check { default, .. } => OptionValue::Bool(*default),
            EngineOption::Spin { default, .. } => OptionValue::Int(*default),
            EngineOption::Text { default, .. } => OptionValue::Text(default.clone()),
            EngineOption::Button { .. } => OptionValue::Trigger,
        }
    }

    /// Validate a raw `setoption` value against the declaration
    fn parse_value(&self, value: Option<&str>) -> EngineResult<OptionValue> {
        let invalid = || EngineError::InvalidOptionValue {
            name: self.name().to_string(),
            value: value.unwrap_or_default().to_string(),
        };
        match self {
            EngineOption::Check { .. } => match value.map(str::to_ascii_lowercase).as_deref() {
                Some("true") => Ok(OptionValue::Bool(true)),
                Some("false") => Ok(OptionValue::Bool(false)),
                _ => Err(invalid()),
            },
            EngineOption::Spin { min, max, .. } => value
                .and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| (*min..=*max).contains(v))
                .map(OptionValue::Int)
                .ok_or_else(invalid),
            EngineOption::Text { .. } => Ok(OptionValue::Text(value.unwrap_or_default().to_string())),
            EngineOption::Button { .. } => Ok(OptionValue::Trigger),
        }
    }
}

impl fmt::Display for EngineOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineOption::Check { name, default } => {
                write!(f, "option name {name} type check default {default}")
            }
            EngineOption::Spin { name, default, min, max } => {
                write!(f, "option name {name} type spin default {default} min {min} max {max}")
            }
            EngineOption::Text { name, default } => {
                let shown = if default.is_empty() { "<empty>" } else { default.as_str() };
                write!(f, "option name {name} type string default {shown}")
            }
            EngineOption::Button { name } => write!(f, "option name {name} type button"),
        }
    }
}

/// Current value of an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
    /// Buttons carry no value
    Trigger,
}

/// Ordered option registry with case-insensitive lookup
#[derive(Debug, Clone)]
pub struct OptionsMap {
    entries: Vec<(EngineOption, OptionValue)>,
}

impl OptionsMap {
    pub fn new(options: Vec<EngineOption>) -> Self {
        let entries = options
            .into_iter()
            .map(|o| {
                let value = o.default_value();
                (o, value)
            })
            .collect();
        Self { entries }
    }

    /// The options every engine instance exposes
    pub fn engine_defaults(max_threads: i64) -> Self {
        Self::new(vec![
            EngineOption::spin("Threads", 1, 1, max_threads),
            EngineOption::spin("Hash", 16, 1, 33_554_432),
            EngineOption::button("Clear Hash"),
            EngineOption::check("Ponder", false),
            EngineOption::spin("MultiPV", 1, 1, 128),
            EngineOption::spin("Move Overhead", 10, 0, 5000),
            EngineOption::check("UCI_ShowWDL", false),
        ])
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(o, _)| o.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.find(name).map(|i| &self.entries[i].1)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Validate and store a value; returns the canonical option name
    pub fn set(&mut self, name: &str, value: Option<&str>) -> EngineResult<String> {
        let index = self
            .find(name)
            .ok_or_else(|| EngineError::UnknownOption(name.trim().to_string()))?;
        let (option, slot) = &mut self.entries[index];
        *slot = option.parse_value(value)?;
        Ok(option.name().to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineOption> {
        self.entries.iter().map(|(o, _)| o)
    }
}

impl fmt::Display for OptionsMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, option) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{option}")?;
        }
        Ok(())
    }
}
