//! Feature flags configuration
//!
//! Optional menu controls. Defaults come from the menu's definition
//! (every flag off), the file overrides them per flag.

use crate::component::{FeatureFlags, FlagName, DEFINITION};
use serde::Deserialize;

/// Feature flags as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileFeatures {
    pub upload_file: Option<bool>,
    pub recording: Option<bool>,
    pub export_drawing: Option<bool>,
    pub load_project: Option<bool>,
    pub save_project: Option<bool>,
}

impl FileFeatures {
    fn get(&self, flag: FlagName) -> Option<bool> {
        match flag {
            FlagName::UploadFile => self.upload_file,
            FlagName::Recording => self.recording,
            FlagName::ExportDrawing => self.export_drawing,
            FlagName::LoadProject => self.load_project,
            FlagName::SaveProject => self.save_project,
        }
    }
}

impl FeatureFlags {
    /// Create from file config over the definition's defaults
    pub fn from_file(file: Option<FileFeatures>) -> Self {
        let file = file.unwrap_or_default();
        let mut flags = DEFINITION.flags;
        for flag in FlagName::ALL {
            if let Some(value) = file.get(flag) {
                flags.set(flag, value);
            }
        }
        flags
    }
}
