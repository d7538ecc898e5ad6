use serde::{Deserialize, Serialize};

/// How strongly the output should follow the character and scene text, 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Influence(u8);

impl Influence {
    pub const MAX: u8 = 100;

    /// Values above 100 are clamped.
    pub fn new(level: u8) -> Self {
        Influence(level.min(Self::MAX))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn band(&self) -> InfluenceBand {
        InfluenceBand::from_level(self.0)
    }
}

impl Default for Influence {
    fn default() -> Self {
        Influence(50)
    }
}

impl From<u8> for Influence {
    fn from(level: u8) -> Self {
        Influence::new(level)
    }
}

impl From<Influence> for u8 {
    fn from(influence: Influence) -> Self {
        influence.0
    }
}

/// Three non-overlapping bands; each lower bound is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfluenceBand {
    /// 0..=30
    LooseInspiration,
    /// 31..=70
    StrongReference,
    /// 71..=100
    AdhereClosely,
}

impl InfluenceBand {
    pub fn from_level(level: u8) -> Self {
        if level > 70 {
            InfluenceBand::AdhereClosely
        } else if level > 30 {
            InfluenceBand::StrongReference
        } else {
            InfluenceBand::LooseInspiration
        }
    }
}

/// Deserializes from any string through [`Quality::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Quality {
    High,
    #[default]
    Standard,
}

impl From<String> for Quality {
    fn from(selector: String) -> Self {
        Quality::parse(&selector)
    }
}

impl Quality {
    /// Only the exact selector `"high"` picks HD output; everything else is standard.
    pub fn parse(selector: &str) -> Self {
        if selector == "high" {
            Quality::High
        } else {
            Quality::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Standard => "standard",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptParams {
    pub base_style: String,
    #[serde(default)]
    pub influence: Influence,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub scene: String,
    #[serde(default)]
    pub quality: Quality,
}

impl PromptParams {
    pub fn new(base_style: impl Into<String>) -> Self {
        Self {
            base_style: base_style.into(),
            ..Default::default()
        }
    }

    pub fn with_influence(mut self, level: u8) -> Self {
        self.influence = Influence::new(level);
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = character.into();
        self
    }

    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = scene.into();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}
