use crate::cpu::SEGMENT_WINDOWS;
use crate::cpu::MAX_INSTRUCTION_LENGTH;
use crate::error::ConfigError;
use crate::memory::MEMORY_SIZE;

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// Session settings, usually read from a TOML file
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// size of the flat memory in bytes
    pub memory_size: usize,

    /// number of INT3 bytes appended after a loaded program
    pub halt_sentinel_len: usize,

    pub segment_windows: SegmentWindows,

    /// log every decoded and executed instruction
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            memory_size: MEMORY_SIZE,
            halt_sentinel_len: 3,
            segment_windows: SegmentWindows::default(),
            trace: false,
        }
    }
}

/// Flat memory offsets of the words backing the segment registers
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmentWindows {
    pub es: u32,
    pub cs: u32,
    pub ss: u32,
    pub ds: u32,
}

impl Default for SegmentWindows {
    fn default() -> Self {
        SegmentWindows {
            es: SEGMENT_WINDOWS[0],
            cs: SEGMENT_WINDOWS[1],
            ss: SEGMENT_WINDOWS[2],
            ds: SEGMENT_WINDOWS[3],
        }
    }
}

impl SegmentWindows {
    /// in register order: es, cs, ss, ds
    pub fn to_array(&self) -> [u32; 4] {
        [self.es, self.cs, self.ss, self.ds]
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Config, ConfigError> {
        let cfg: Config = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size < MEMORY_SIZE {
            return Err(ConfigError::Invalid(format!(
                "memory_size {} is below the minimum of {}", self.memory_size, MEMORY_SIZE)));
        }
        if self.halt_sentinel_len == 0 || self.halt_sentinel_len > MAX_INSTRUCTION_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "halt_sentinel_len {} must be between 1 and {}", self.halt_sentinel_len, MAX_INSTRUCTION_LENGTH)));
        }

        let windows = self.segment_windows.to_array();
        for (i, &w) in windows.iter().enumerate() {
            if w as usize + 2 > self.memory_size {
                return Err(ConfigError::Invalid(format!(
                    "segment window {:05X} lies outside of memory", w)));
            }
            for &other in &windows[i + 1..] {
                if w.max(other) - w.min(other) < 2 {
                    return Err(ConfigError::Invalid(format!(
                        "segment windows {:05X} and {:05X} overlap", w, other)));
                }
            }
        }
        Ok(())
    }
}
