use super::Violation;
use crate::decode::KeyPath;
use crate::key_path;
use crate::schema::InstallDataDefinition;
use std::collections::BTreeMap;
use url::Url;

/// Every distinct url in a listing, with every path that references it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlIndex {
    entries: BTreeMap<String, Vec<KeyPath>>,
}

impl UrlIndex {
    pub fn insert(&mut self, url: &str, path: KeyPath) {
        self.entries.entry(url.to_string()).or_default().push(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self, url: &str) -> &[KeyPath] {
        self.entries.get(url).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[KeyPath])> {
        self.entries.iter().map(|(url, paths)| (url.as_str(), paths.as_slice()))
    }
}

pub fn collect_urls(document: &InstallDataDefinition) -> UrlIndex {
    let mut index = UrlIndex::default();

    for (mi, mod_def) in document.mods.iter().enumerate() {
        for (si, submod) in mod_def.submods.iter().enumerate() {
            for (fi, file) in submod.files.iter().enumerate() {
                if let Some(url) = &file.url {
                    index.insert(url, key_path!["mods", mi, "submods", si, "files", fi, "url"]);
                }
            }
            for (oi, file_override) in submod.file_overrides.iter().enumerate() {
                index.insert(
                    &file_override.url,
                    key_path!["mods", mi, "submods", si, "fileOverrides", oi, "url"],
                );
            }
        }

        for (gi, group) in mod_def.option_groups().iter().enumerate() {
            let lists = [("radio", &group.radio), ("checkBox", &group.check_box)];
            for (list_key, entries) in lists {
                let Some(entries) = entries else { continue };
                for (ei, entry) in entries.iter().enumerate() {
                    if let Some(data) = &entry.data {
                        index.insert(
                            &data.url,
                            key_path!["mods", mi, "modOptionGroups", gi, list_key, ei, "data", "url"],
                        );
                    }
                }
            }
        }
    }

    index
}

/// Parse a url string the way the installer will, rejecting anything that isn't absolute
pub fn parse_url(url: &str) -> Result<Url, String> {
    if url.chars().any(char::is_whitespace) {
        return Err("contains whitespace".to_string());
    }
    Url::parse(url).map_err(|e| e.to_string())
}

/// One violation per occurrence of a malformed url
pub fn check_url_syntax(index: &UrlIndex) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (url, paths) in index.iter() {
        if let Err(reason) = parse_url(url) {
            for path in paths {
                violations.push(Violation::InvalidUrl {
                    url: url.to_string(),
                    path: path.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_urls_are_rejected() {
        assert!(parse_url("rikachama/graphics/Onikakushi-CG.7z").is_err());
        assert!(parse_url("https://07th-mod.com/ui.php?chapter=onikakushi&os=win").is_ok());
    }

    #[test]
    fn whitespace_is_rejected() {
        assert_eq!(
            parse_url("https://07th-mod.com/some file.7z").unwrap_err(),
            "contains whitespace"
        );
    }

    #[test]
    fn index_groups_paths_by_url() {
        let mut index = UrlIndex::default();
        index.insert("https://a/x", key_path!["first"]);
        index.insert("https://a/x", key_path!["second"]);
        index.insert("https://a/y", key_path!["third"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.paths("https://a/x").len(), 2);
        assert!(index.paths("https://a/z").is_empty());
    }
}
