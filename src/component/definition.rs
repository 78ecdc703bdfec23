//! Menu component definition
//!
//! The definition is a `const`: it exists before anything is mounted and is
//! never mutated. Feature flags are a plain struct rather than a map so the
//! set of flag keys is fixed at compile time.

use std::fmt;
use std::str::FromStr;

/// Namespace under which the menu's strings are registered with the i18n catalog
pub const NAMESPACE: &str = "menu";

/// Identifier of another component this one may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub &'static str);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Component dependencies, split by whether the host must provide them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependencies {
    pub required: &'static [ComponentId],
    pub optional: &'static [ComponentId],
}

impl Dependencies {
    /// First dependency listed as both required and optional
    ///
    /// The two sets must be disjoint; `None` means they are.
    pub fn conflict(&self) -> Option<ComponentId> {
        self.required
            .iter()
            .find(|required| self.optional.contains(required))
            .copied()
    }
}

/// Names of the feature toggles the menu understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlagName {
    UploadFile,
    Recording,
    ExportDrawing,
    LoadProject,
    SaveProject,
}

impl FlagName {
    pub const ALL: [FlagName; 5] = [
        FlagName::UploadFile,
        FlagName::Recording,
        FlagName::ExportDrawing,
        FlagName::LoadProject,
        FlagName::SaveProject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagName::UploadFile => "uploadFile",
            FlagName::Recording => "recording",
            FlagName::ExportDrawing => "exportDrawing",
            FlagName::LoadProject => "loadProject",
            FlagName::SaveProject => "saveProject",
        }
    }
}

impl fmt::Display for FlagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlagName::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| format!("unknown feature flag '{}'", s))
    }
}

/// Feature toggles for the optional menu controls (opt-in: default disabled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// File upload into local storage
    pub upload_file: bool,

    /// Start/stop recording controls
    pub recording: bool,

    /// Export of the current drawing
    pub export_drawing: bool,

    /// Project load from a file
    pub load_project: bool,

    /// Project save
    pub save_project: bool,
}

impl FeatureFlags {
    /// Every flag disabled
    pub const NONE: FeatureFlags = FeatureFlags {
        upload_file: false,
        recording: false,
        export_drawing: false,
        load_project: false,
        save_project: false,
    };

    /// Every flag enabled
    pub const ALL: FeatureFlags = FeatureFlags {
        upload_file: true,
        recording: true,
        export_drawing: true,
        load_project: true,
        save_project: true,
    };

    pub fn get(&self, flag: FlagName) -> bool {
        match flag {
            FlagName::UploadFile => self.upload_file,
            FlagName::Recording => self.recording,
            FlagName::ExportDrawing => self.export_drawing,
            FlagName::LoadProject => self.load_project,
            FlagName::SaveProject => self.save_project,
        }
    }

    pub fn set(&mut self, flag: FlagName, value: bool) {
        let slot = match flag {
            FlagName::UploadFile => &mut self.upload_file,
            FlagName::Recording => &mut self.recording,
            FlagName::ExportDrawing => &mut self.export_drawing,
            FlagName::LoadProject => &mut self.load_project,
            FlagName::SaveProject => &mut self.save_project,
        };
        *slot = value;
    }

    /// All flags with their values, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (FlagName, bool)> + '_ {
        FlagName::ALL
            .into_iter()
            .map(move |flag| (flag, self.get(flag)))
    }

    /// Names of the enabled flags (for banners and logs)
    pub fn enabled(&self) -> Vec<FlagName> {
        self.iter()
            .filter_map(|(flag, on)| on.then_some(flag))
            .collect()
    }
}

/// Static descriptor of a mountable component
#[derive(Debug, Clone, Copy)]
pub struct ComponentDefinition {
    pub dependencies: Dependencies,
    pub flags: FeatureFlags,
    /// Localizable strings as `(key, display text)` pairs
    pub strings: &'static [(&'static str, &'static str)],
}

impl ComponentDefinition {
    /// Look up a string by key
    #[cfg(test)]
    pub fn string(&self, key: &str) -> Option<&'static str> {
        self.strings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| *text)
    }
}

const STRINGS: &[(&str, &str)] = &[
    ("run", "run button - to start the program execution"),
    ("stop", "stop button - to stop the program execution"),
    ("reset", "reset button - clear program states"),
    ("uploadFile", "upload button - store a file in local storage"),
    ("startRecording", "record button - start recording"),
    ("stopRecording", "record button - stop recording"),
    ("exportDrawing", "export button - save the drawing as an image"),
    ("loadProject", "load button - open a project file"),
    ("saveProject", "save button - save the current project"),
];

/// The menu's definition
pub const DEFINITION: ComponentDefinition = ComponentDefinition {
    dependencies: Dependencies {
        required: &[],
        optional: &[],
    },
    flags: FeatureFlags::NONE,
    strings: STRINGS,
};
