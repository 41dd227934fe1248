//! Connection profiles: load/save simple JSON mapping of profile name -> { url, tls_ca, rate_mode }
//! Stored under XDG config dir: $XDG_CONFIG_HOME/sentrytop/profiles.json (fallback ~/.config/sentrytop/profiles.json)

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::rate::RateMode;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProfileEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_mode: Option<RateMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("sentrytop")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sentrytop")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

pub fn load_profiles() -> ProfilesFile {
    let path = profiles_path();
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable profiles file");
            ProfilesFile::default()
        }),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> std::io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p)?;
    fs::write(path, data)
}

#[derive(Debug, PartialEq)]
pub enum ResolveProfile {
    /// Use the provided runtime inputs (maybe persisted by the caller).
    Direct(ProfileEntry),
    /// Loaded from existing profile entry
    Loaded(ProfileEntry),
    /// Should prompt user to select among profile names
    PromptSelect(Vec<String>),
    /// Should prompt user to create a new profile (name)
    PromptCreate(String),
    /// No profile could be resolved (e.g., missing arguments)
    None,
}

pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub tls_ca: Option<String>,
    pub rate_mode: Option<RateMode>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        match (self.url, self.profile_name) {
            // URL given -> direct (maybe later saved by caller)
            (Some(url), _) => ResolveProfile::Direct(ProfileEntry {
                url,
                tls_ca: self.tls_ca,
                rate_mode: self.rate_mode,
            }),
            // Only profile name given -> try load; a CLI rate mode still wins
            (None, Some(name)) => match pf.profiles.get(&name) {
                Some(entry) => ResolveProfile::Loaded(ProfileEntry {
                    rate_mode: self.rate_mode.or(entry.rate_mode),
                    ..entry.clone()
                }),
                None => ResolveProfile::PromptCreate(name),
            },
            // Nothing provided -> maybe prompt select if profiles exist
            (None, None) if pf.profiles.is_empty() => ResolveProfile::None,
            (None, None) => ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(name: &str, url: &str) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(
            name.into(),
            ProfileEntry {
                url: url.into(),
                tls_ca: None,
                rate_mode: Some(RateMode::Derived),
            },
        );
        pf
    }

    fn req(name: Option<&str>, url: Option<&str>) -> ProfileRequest {
        ProfileRequest {
            profile_name: name.map(Into::into),
            url: url.map(Into::into),
            tls_ca: None,
            rate_mode: None,
        }
    }

    #[test]
    fn name_only_loads_existing_entry() {
        let pf = file_with("lab", "ws://lab:5000/ws");
        match req(Some("lab"), None).resolve(&pf) {
            ResolveProfile::Loaded(e) => {
                assert_eq!(e.url, "ws://lab:5000/ws");
                assert_eq!(e.rate_mode, Some(RateMode::Derived));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_name_prompts_create() {
        let pf = ProfilesFile::default();
        assert_eq!(
            req(Some("new"), None).resolve(&pf),
            ResolveProfile::PromptCreate("new".into())
        );
    }

    #[test]
    fn nothing_given_selects_or_gives_up() {
        assert_eq!(req(None, None).resolve(&ProfilesFile::default()), ResolveProfile::None);
        let pf = file_with("a", "ws://a/ws");
        assert_eq!(
            req(None, None).resolve(&pf),
            ResolveProfile::PromptSelect(vec!["a".into()])
        );
    }

    #[test]
    fn rate_mode_round_trips_through_json() {
        let pf = file_with("lab", "ws://lab/ws");
        let js = serde_json::to_string(&pf).unwrap();
        assert!(js.contains("\"rate_mode\":\"derived\""), "{js}");
        let back: ProfilesFile = serde_json::from_str(&js).unwrap();
        assert_eq!(back.profiles["lab"], pf.profiles["lab"]);
    }
}
