use anyhow::{Context, Result, anyhow};
use directories::UserDirs;
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};

use super::Profile;

pub fn default_profile_text() -> &'static str {
    include_str!("../../profiles/default.toml")
}

/// Profiles on disk: `<dir>/profiles/<name>.toml` plus an `active` pointer.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    config_dir: PathBuf,
    profiles_dir: PathBuf,
    active_ptr: PathBuf,
}

impl ProfileStore {
    /// Opens `~/.config/radialpad`, installing the default profile on first use.
    pub fn open() -> Result<Self> {
        let home = UserDirs::new()
            .ok_or_else(|| anyhow!("cannot determine the home directory"))?
            .home_dir()
            .to_path_buf();
        Self::at(home.join(".config").join("radialpad"))
    }

    pub fn at(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        let profiles_dir = config_dir.join("profiles");
        fs::create_dir_all(&profiles_dir)
            .with_context(|| format!("failed to create {}", profiles_dir.display()))?;

        let def_path = profiles_dir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = config_dir.join("active");
        if !active_ptr.exists() {
            fs::write(&active_ptr, b"default")?;
        }

        Ok(Self {
            config_dir,
            profiles_dir,
            active_ptr,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    pub fn active_name(&self) -> Result<String> {
        let name = fs::read_to_string(&self.active_ptr)
            .with_context(|| format!("failed to read {}", self.active_ptr.display()))?;
        Ok(name.trim().to_string())
    }

    pub fn set_active(&self, name: &str) -> Result<()> {
        // refuse to point at something that would not load
        self.load(name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        info!("active profile is now '{name}'");
        Ok(())
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.toml"))
    }

    pub fn list(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn load(&self, name: &str) -> Result<Profile> {
        let path = self.path_of(name);
        if !path.exists() {
            return Err(anyhow!("profile not found: {}", path.display()));
        }
        let txt = fs::read_to_string(&path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        Profile::parse(&txt).map_err(|e| anyhow!("failed to load {}: {e}", path.display()))
    }

    /// Loads `name`, or the active profile when `None`.
    pub fn load_named_or_active(&self, name: Option<&str>) -> Result<(String, Profile)> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self.active_name()?,
        };
        let profile = self.load(&name)?;
        Ok((name, profile))
    }
}
