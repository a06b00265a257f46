use serde::{Deserialize, Serialize};

/// File mode recorded in trees and index entries.
///
/// Trees are flat path → blob maps, so only file modes exist; directories
/// are implied by the path components.
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum FileMode {
    #[default]
    #[serde(rename = "100644")]
    Regular,
    #[serde(rename = "100755")]
    Executable,
}

impl FileMode {
    pub fn as_str(&self) -> &str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            FileMode::Regular => 0o100644,
            FileMode::Executable => 0o100755,
        }
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, FileMode::Executable)
    }
}

impl TryFrom<u32> for FileMode {
    type Error = anyhow::Error;

    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0o100644 => Ok(FileMode::Regular),
            0o100755 => Ok(FileMode::Executable),
            _ => Err(anyhow::anyhow!("Invalid file mode: {:o}", mode)),
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
