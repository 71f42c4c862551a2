use super::Violation;
use crate::schema::{ModDefinition, ModOptionGroup, ModOptionType};

pub fn check_option_groups(mod_def: &ModDefinition) -> Vec<Violation> {
    let mut violations = Vec::new();
    for group in mod_def.option_groups() {
        violations.extend(check_exclusive(mod_def, group));
        violations.extend(check_entry_data(mod_def, group));
        violations.extend(check_submod_references(mod_def, group));
    }
    violations
}

/// Exactly one of `radio` and `checkBox` must be present
fn check_exclusive(mod_def: &ModDefinition, group: &ModOptionGroup) -> Option<Violation> {
    let has_radio = group.radio.is_some();
    let has_check_box = group.check_box.is_some();
    if has_radio != has_check_box {
        return None;
    }
    Some(Violation::OptionGroupShape {
        mod_name: mod_def.name.clone(),
        group_name: group.name.clone(),
        has_radio,
        has_check_box,
    })
}

/// A checkbox under `downloadAndExtract` has nothing to do without data.
/// Radio entries may leave it null to mean "none of the others".
fn check_entry_data(mod_def: &ModDefinition, group: &ModOptionGroup) -> Vec<Violation> {
    let check_box = match (&group.option_type, &group.radio, &group.check_box) {
        (ModOptionType::DownloadAndExtract, None, Some(entries)) => entries,
        _ => return Vec::new(),
    };
    check_box
        .iter()
        .filter(|entry| entry.data.is_none())
        .map(|entry| Violation::MissingOptionData {
            mod_name: mod_def.name.clone(),
            group_name: group.name.clone(),
            entry_name: entry.name.clone(),
        })
        .collect()
}

fn check_submod_references(mod_def: &ModDefinition, group: &ModOptionGroup) -> Vec<Violation> {
    let Some(submods) = &group.submods else {
        return Vec::new();
    };
    submods
        .iter()
        .filter(|name| !mod_def.submods.iter().any(|s| &s.name == *name))
        .map(|name| Violation::UnknownOptionSubmod {
            mod_name: mod_def.name.clone(),
            group_name: group.name.clone(),
            submod_name: name.clone(),
        })
        .collect()
}
