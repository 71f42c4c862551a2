use super::fields::{FieldSpec, Schema, SchemaEnum};
use crate::config::SUPPORTED_DOCUMENT_VERSION;
use serde::Serialize;
use std::fmt;

/// The top level object in `installData.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallDataDefinition {
    /// Incremented every time a breaking change is made that earlier installers would misparse
    pub version: i64,
    pub mods: Vec<ModDefinition>,
}

impl InstallDataDefinition {
    /// An installer can use a listing when the listing is not newer than what it was built against.
    pub fn is_supported_by(&self, installer_version: i64) -> bool {
        self.version <= installer_version
    }

    pub fn is_supported(&self) -> bool {
        self.is_supported_by(SUPPORTED_DOCUMENT_VERSION)
    }
}

impl Schema for InstallDataDefinition {
    const TYPE_NAME: &'static str = "InstallDataDefinition";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("version"),
        FieldSpec::required("mods"),
    ];
}

/// One mod for a game.
///
/// A user is expected to have one of each mod installed, but only one submod of a given mod.
/// Himatsubushi and the Console Arcs are separate mods even though they target the same game,
/// while a voice-only patch and a full patch are submods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModDefinition {
    /// Decides how the installer runs, since the two families have very different layouts
    pub family: ModFamily,
    /// Displayed to the user
    pub name: String,
    /// The game this mod installs onto
    pub target: String,
    /// The folder containing the game data (e.g. HigurashiEp02_Data)
    #[serde(rename = "dataname")]
    pub data_name: String,
    /// Filenames that, if found in a folder, mark it as this mod's target
    pub identifiers: Vec<String>,
    pub submods: Vec<SubmodDefinition>,
    #[serde(rename = "modOptionGroups", skip_serializing_if = "Option::is_none")]
    pub mod_option_groups: Option<Vec<ModOptionGroup>>,
    /// macOS only: replaces the CFBundleName of the target application
    #[serde(rename = "CFBundleName", skip_serializing_if = "Option::is_none")]
    pub bundle_name: Option<String>,
    /// macOS only: replaces the CFBundleIdentifier, which moves the Higurashi save directory
    #[serde(rename = "CFBundleIdentifier", skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Option<String>,
}

impl ModDefinition {
    pub fn option_groups(&self) -> &[ModOptionGroup] {
        self.mod_option_groups.as_deref().unwrap_or(&[])
    }
}

impl Schema for ModDefinition {
    const TYPE_NAME: &'static str = "ModDefinition";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("family"),
        FieldSpec::required("name"),
        FieldSpec::required("target"),
        FieldSpec::required("dataname"),
        FieldSpec::required("identifiers"),
        FieldSpec::required("submods"),
        FieldSpec::optional("modOptionGroups"),
        FieldSpec::optional("CFBundleName"),
        FieldSpec::optional("CFBundleIdentifier"),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModFamily {
    Higurashi,
    Umineko,
}

impl SchemaEnum for ModFamily {
    const TYPE_NAME: &'static str = "ModFamily";
    const VALUES: &'static [&'static str] = &["higurashi", "umineko"];

    fn as_str(&self) -> &'static str {
        match self {
            ModFamily::Higurashi => "higurashi",
            ModFamily::Umineko => "umineko",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "higurashi" => Some(ModFamily::Higurashi),
            "umineko" => Some(ModFamily::Umineko),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmodDefinition {
    pub name: String,
    /// Which description the web GUI shows; the text itself lives on the webpage
    #[serde(rename = "descriptionID", skip_serializing_if = "Option::is_none")]
    pub description_id: Option<String>,
    /// The base set of files for this submod
    pub files: Vec<FileDefinition>,
    /// Platform-specific overrides of entries in `files`
    #[serde(rename = "fileOverrides")]
    pub file_overrides: Vec<FileOverrideDefinition>,
}

impl SubmodDefinition {
    pub fn overrides_for<'a>(
        &'a self,
        file_name: &'a str,
    ) -> impl Iterator<Item = &'a FileOverrideDefinition> + 'a {
        self.file_overrides.iter().filter(move |o| o.name == file_name)
    }
}

impl Schema for SubmodDefinition {
    const TYPE_NAME: &'static str = "SubmodDefinition";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::optional("descriptionID"),
        FieldSpec::required("files"),
        FieldSpec::required("fileOverrides"),
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDefinition {
    /// Identifies this file for use in overrides
    pub name: String,
    /// If null, this file must be overridden or the install will fail
    pub url: Option<String>,
    /// Higher priority files are installed later, so they overwrite lower priority files
    pub priority: i64,
    #[serde(rename = "relativeExtractionPath", skip_serializing_if = "Option::is_none")]
    pub relative_extraction_path: Option<String>,
}

impl FileDefinition {
    pub fn requires_override(&self) -> bool {
        self.url.is_none()
    }
}

impl Schema for FileDefinition {
    const TYPE_NAME: &'static str = "FileDefinition";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::optional("url"),
        FieldSpec::required("priority"),
        FieldSpec::optional("relativeExtractionPath"),
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOverrideDefinition {
    /// Replaces the file with the same name; it must exist in the submod's `files`
    pub name: String,
    /// Unique among the overrides of a submod (e.g. "movie-unix")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub os: Vec<Os>,
    /// Higurashi only: restricts the override to the given Unity version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unity: Option<String>,
    /// `Some(true)` for Steam builds only, `Some(false)` for non-Steam builds only, `None` for both
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam: Option<bool>,
    pub url: String,
    /// The override is only accepted when one of these files exists with the given checksum
    #[serde(rename = "targetChecksums", skip_serializing_if = "Option::is_none")]
    pub target_checksums: Option<Vec<TargetChecksum>>,
    #[serde(rename = "relativeExtractionPath", skip_serializing_if = "Option::is_none")]
    pub relative_extraction_path: Option<String>,
}

impl FileOverrideDefinition {
    /// Whether this override replaces its file for a user on `os` with the given purchase channel
    pub fn applies_to(&self, os: Os, is_steam: bool) -> bool {
        self.os.contains(&os) && self.steam.map_or(true, |steam| steam == is_steam)
    }
}

impl Schema for FileOverrideDefinition {
    const TYPE_NAME: &'static str = "FileOverrideDefinition";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::optional("id"),
        FieldSpec::required("os"),
        FieldSpec::optional("unity"),
        FieldSpec::optional("steam"),
        FieldSpec::required("url"),
        FieldSpec::optional("targetChecksums"),
        FieldSpec::optional("relativeExtractionPath"),
    ];
}

/// A `[path, checksum]` pair, encoded as a two element JSON array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetChecksum(pub String, pub String);

impl TargetChecksum {
    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn checksum(&self) -> &str {
        &self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Mac,
    Linux,
    Windows,
}

impl Os {
    pub const ALL: [Os; 3] = [Os::Mac, Os::Linux, Os::Windows];
}

impl SchemaEnum for Os {
    const TYPE_NAME: &'static str = "OS";
    const VALUES: &'static [&'static str] = &["mac", "linux", "windows"];

    fn as_str(&self) -> &'static str {
        match self {
            Os::Mac => "mac",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "mac" => Some(Os::Mac),
            "linux" => Some(Os::Linux),
            "windows" => Some(Os::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModOptionGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub option_type: ModOptionType,
    /// Radio button entries; mutually exclusive with `check_box`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio: Option<Vec<ModOptionEntry>>,
    /// Checkbox entries; mutually exclusive with `radio`
    #[serde(rename = "checkBox", skip_serializing_if = "Option::is_none")]
    pub check_box: Option<Vec<ModOptionEntry>>,
    /// Names of the submods this group applies to (all submods when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submods: Option<Vec<String>>,
}

impl ModOptionGroup {
    pub fn entries(&self) -> impl Iterator<Item = &ModOptionEntry> {
        self.radio
            .iter()
            .chain(self.check_box.iter())
            .flat_map(|entries| entries.iter())
    }
}

impl Schema for ModOptionGroup {
    const TYPE_NAME: &'static str = "ModOptionGroup";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::required("type"),
        FieldSpec::optional("radio"),
        FieldSpec::optional("checkBox"),
        FieldSpec::optional("submods"),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModOptionType {
    DownloadAndExtract,
}

impl SchemaEnum for ModOptionType {
    const TYPE_NAME: &'static str = "ModOptionType";
    const VALUES: &'static [&'static str] = &["downloadAndExtract"];

    fn as_str(&self) -> &'static str {
        match self {
            ModOptionType::DownloadAndExtract => "downloadAndExtract",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "downloadAndExtract" => Some(ModOptionType::DownloadAndExtract),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModOptionEntry {
    pub name: String,
    /// A longer description, only used for display
    pub description: String,
    /// What to download when selected. Null marks a radio entry that only means "none of the others"
    pub data: Option<ModOptionFileDefinition>,
    /// Remembered across game families when set
    #[serde(rename = "isGlobal", skip_serializing_if = "Option::is_none")]
    pub is_global: Option<bool>,
}

impl Schema for ModOptionEntry {
    const TYPE_NAME: &'static str = "ModOptionEntry";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::required("description"),
        FieldSpec::optional("data"),
        FieldSpec::optional("isGlobal"),
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModOptionFileDefinition {
    pub url: String,
    /// Relative to the *top-level game directory* (so it should contain HigurashiEp##_Data for Higurashi)
    #[serde(rename = "relativeExtractionPath")]
    pub relative_extraction_path: String,
    /// Same priority system as `FileDefinition::priority`
    pub priority: i64,
}

impl Schema for ModOptionFileDefinition {
    const TYPE_NAME: &'static str = "ModOptionFileDefinition";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("url"),
        FieldSpec::required("relativeExtractionPath"),
        FieldSpec::required("priority"),
    ];
}
