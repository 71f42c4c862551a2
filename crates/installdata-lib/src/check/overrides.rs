use super::{CoverageMode, Violation};
use crate::schema::{FileDefinition, ModDefinition, Os, SubmodDefinition};
use std::collections::HashSet;

/// Every file without a url must be overridden for every (os, steam) combination.
/// Unity-gated and checksum-gated overrides count as coverage.
pub fn check_coverage(
    mod_def: &ModDefinition,
    submod: &SubmodDefinition,
    mode: CoverageMode,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for file in submod.files.iter().filter(|f| f.requires_override()) {
        for os in Os::ALL {
            let covered = |steam: bool| submod.overrides_for(&file.name).any(|o| o.applies_to(os, steam));
            let with_steam = covered(true);
            let without_steam = covered(false);

            match (mode, with_steam, without_steam) {
                (_, true, true) => {}
                (CoverageMode::Symmetric, true, false) | (CoverageMode::Symmetric, false, true) => {
                    violations.push(Violation::SteamOnlyOverride {
                        mod_name: mod_def.name.clone(),
                        submod_name: submod.name.clone(),
                        file_name: file.name.clone(),
                        os,
                        with_steam,
                    });
                }
                _ => {
                    for (steam, is_covered) in [(true, with_steam), (false, without_steam)] {
                        if !is_covered {
                            violations.push(uncovered(mod_def, submod, file, os, steam));
                        }
                    }
                }
            }
        }
    }

    violations
}

fn uncovered(
    mod_def: &ModDefinition,
    submod: &SubmodDefinition,
    file: &FileDefinition,
    os: Os,
    steam: bool,
) -> Violation {
    Violation::UncoveredOverride {
        mod_name: mod_def.name.clone(),
        submod_name: submod.name.clone(),
        file_name: file.name.clone(),
        os,
        steam,
    }
}

/// One violation per name that appears more than once
pub fn check_unique_file_names(mod_def: &ModDefinition, submod: &SubmodDefinition) -> Vec<Violation> {
    duplicates(submod.files.iter().map(|f| f.name.as_str()))
        .into_iter()
        .map(|name| Violation::DuplicateFileName {
            mod_name: mod_def.name.clone(),
            submod_name: submod.name.clone(),
            file_name: name.to_string(),
        })
        .collect()
}

pub fn check_override_targets(mod_def: &ModDefinition, submod: &SubmodDefinition) -> Vec<Violation> {
    let files: HashSet<&str> = submod.files.iter().map(|f| f.name.as_str()).collect();
    submod
        .file_overrides
        .iter()
        .filter(|o| !files.contains(o.name.as_str()))
        .map(|o| Violation::DanglingOverride {
            mod_name: mod_def.name.clone(),
            submod_name: submod.name.clone(),
            override_name: o.name.clone(),
        })
        .collect()
}

pub fn check_unique_override_ids(mod_def: &ModDefinition, submod: &SubmodDefinition) -> Vec<Violation> {
    duplicates(submod.file_overrides.iter().filter_map(|o| o.id.as_deref()))
        .into_iter()
        .map(|id| Violation::DuplicateOverrideId {
            mod_name: mod_def.name.clone(),
            submod_name: submod.name.clone(),
            id: id.to_string(),
        })
        .collect()
}

/// Names seen more than once, in order of their second appearance
fn duplicates<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            out.push(name);
        }
    }
    out
}
