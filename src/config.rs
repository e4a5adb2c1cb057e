//! Engine configuration: board size, palette and optional RNG seed.

use crate::board::Color;
use crate::error::ConfigError;

/// The Color Assigner excludes at most two colours per cell (one per axis),
/// so the palette needs one more than that.
pub const MIN_PALETTE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub size: usize,
    pub palette: Vec<Color>,
    /// Fixed seed for reproducible boards; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size: 8,
            palette: Color::CLASSIC.to_vec(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidSize);
        }
        if self.palette.len() < MIN_PALETTE {
            return Err(ConfigError::PaletteTooSmall {
                len: self.palette.len(),
                required: MIN_PALETTE,
            });
        }
        for (i, color) in self.palette.iter().enumerate() {
            if self.palette[..i].contains(color) {
                return Err(ConfigError::DuplicateColor(*color));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_size() {
        let config = EngineConfig {
            size: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSize));
    }

    #[test]
    fn test_palette_too_small() {
        let config = EngineConfig {
            palette: vec![Color::Red, Color::Blue],
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::PaletteTooSmall { len: 2, required: 3 })
        );
    }

    #[test]
    fn test_duplicate_color() {
        let config = EngineConfig {
            palette: vec![Color::Red, Color::Blue, Color::Red],
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DuplicateColor(Color::Red)));
    }
}
