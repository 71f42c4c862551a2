//! Consistency checks over a decoded listing.
//!
//! Every check runs regardless of what the others found, and every violation is returned.

pub mod options;
pub mod overrides;
pub mod urls;

pub use urls::{collect_urls, UrlIndex};

use crate::decode::KeyPath;
use crate::schema::{InstallDataDefinition, Os};

/// How `url: null` files are checked for override coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverageMode {
    /// Report every (os, steam) combination that no override covers
    Any,
    /// Additionally call out an OS where only one purchase channel is covered
    #[default]
    Symmetric,
}

impl std::str::FromStr for CoverageMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(CoverageMode::Any),
            "symmetric" => Ok(CoverageMode::Symmetric),
            _ => Err(anyhow::anyhow!("Unknown coverage mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub coverage: CoverageMode,
}

fn steam_channel(with_steam: &bool) -> &'static str {
    if *with_steam {
        "with Steam"
    } else {
        "without Steam"
    }
}

fn group_shape(has_radio: &bool) -> &'static str {
    if *has_radio {
        "has both"
    } else {
        "has neither"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("{mod_name} {submod_name} {file_name} must be overridden but a user with the os {os} and steam {steam} will have no overrides available")]
    UncoveredOverride {
        mod_name: String,
        submod_name: String,
        file_name: String,
        os: Os,
        steam: bool,
    },

    #[error("{mod_name} {submod_name} {file_name} must be overridden but on {os} an override is only available {}", steam_channel(.with_steam))]
    SteamOnlyOverride {
        mod_name: String,
        submod_name: String,
        file_name: String,
        os: Os,
        with_steam: bool,
    },

    #[error("Multiple files were specified with the name \"{file_name}\" in {mod_name} {submod_name}")]
    DuplicateFileName {
        mod_name: String,
        submod_name: String,
        file_name: String,
    },

    #[error("Override {override_name} must override a file in the file list of {mod_name} {submod_name}")]
    DanglingOverride {
        mod_name: String,
        submod_name: String,
        override_name: String,
    },

    #[error("Override id \"{id}\" is used more than once in {mod_name} {submod_name}")]
    DuplicateOverrideId {
        mod_name: String,
        submod_name: String,
        id: String,
    },

    #[error("Option group \"{group_name}\" of {mod_name} must have exactly one of radio or checkBox, but {}", group_shape(.has_radio))]
    OptionGroupShape {
        mod_name: String,
        group_name: String,
        has_radio: bool,
        has_check_box: bool,
    },

    #[error("Checkbox option \"{entry_name}\" in group \"{group_name}\" of {mod_name} has no data to download")]
    MissingOptionData {
        mod_name: String,
        group_name: String,
        entry_name: String,
    },

    #[error("Option group \"{group_name}\" of {mod_name} refers to submod \"{submod_name}\", which doesn't exist")]
    UnknownOptionSubmod {
        mod_name: String,
        group_name: String,
        submod_name: String,
    },

    #[error("The url \"{url}\" at the {} was invalid: {reason}", .path.describe())]
    InvalidUrl {
        url: String,
        path: KeyPath,
        reason: String,
    },
}

/// Run every consistency check over `document`
pub fn check_document(document: &InstallDataDefinition, options: &CheckOptions) -> Vec<Violation> {
    let mut violations = Vec::new();

    for mod_def in &document.mods {
        for submod in &mod_def.submods {
            violations.extend(overrides::check_coverage(mod_def, submod, options.coverage));
            violations.extend(overrides::check_unique_file_names(mod_def, submod));
            violations.extend(overrides::check_override_targets(mod_def, submod));
            violations.extend(overrides::check_unique_override_ids(mod_def, submod));
        }
        violations.extend(options::check_option_groups(mod_def));
    }

    violations.extend(urls::check_url_syntax(&collect_urls(document)));

    log::info!(
        "Consistency check finished: {} mod(s), {} violation(s)",
        document.mods.len(),
        violations.len()
    );
    violations
}
