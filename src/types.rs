use serde::{Deserialize, Serialize};

/// Skin generation stored in the catalog. Only classic (`.wsz`) skins
/// are eligible for archive upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkinType {
    Classic,
    Modern,
}

impl SkinType {
    pub fn as_str(&self) -> &str {
        match self {
            SkinType::Classic => "CLASSIC",
            SkinType::Modern => "MODERN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CLASSIC" => Some(SkinType::Classic),
            "MODERN" => Some(SkinType::Modern),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}
