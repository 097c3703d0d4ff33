use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOCAL_SETTINGS_FILE: &str = "thermokit.toml";
pub const USER_SETTINGS_FILE: &str = "settings.toml";

/// Per-user settings file, e.g. `~/.config/thermokit/settings.toml` on Linux.
pub fn user_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "thermokit", "thermokit")
        .map(|dirs| dirs.config_dir().join(USER_SETTINGS_FILE))
}

/// Picks the settings file for this run: an explicit path, else `./thermokit.toml`, else the
/// per-user file. Implicit candidates are only used when they exist.
pub fn settings_path(explicit: Option<&Path>, no_settings: bool) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    select_settings_path(explicit, no_settings, cwd.as_deref(), user_settings_path())
}

fn select_settings_path(
    explicit: Option<&Path>,
    no_settings: bool,
    cwd: Option<&Path>,
    user: Option<PathBuf>,
) -> Option<PathBuf> {
    if no_settings {
        return None;
    }
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = cwd.map(|dir| dir.join(LOCAL_SETTINGS_FILE));
    let found = local
        .into_iter()
        .chain(user)
        .find(|candidate| candidate.is_file());
    if let Some(path) = &found {
        debug!("Using settings file {}", path.display());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn no_settings_wins_over_everything() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LOCAL_SETTINGS_FILE), "").unwrap();
        let chosen = select_settings_path(Some(Path::new("x.toml")), true, Some(dir.path()), None);
        assert_eq!(chosen, None);
    }

    #[test]
    fn explicit_path_is_used_even_if_missing() {
        let chosen = select_settings_path(Some(Path::new("missing.toml")), false, None, None);
        assert_eq!(chosen, Some(PathBuf::from("missing.toml")));
    }

    #[test]
    fn local_file_precedes_user_file() {
        let cwd = tempdir().unwrap();
        let home = tempdir().unwrap();
        let local = cwd.path().join(LOCAL_SETTINGS_FILE);
        let user = home.path().join(USER_SETTINGS_FILE);
        fs::write(&local, "").unwrap();
        fs::write(&user, "").unwrap();

        let chosen = select_settings_path(None, false, Some(cwd.path()), Some(user.clone()));
        assert_eq!(chosen, Some(local));

        fs::remove_file(cwd.path().join(LOCAL_SETTINGS_FILE)).unwrap();
        let chosen = select_settings_path(None, false, Some(cwd.path()), Some(user.clone()));
        assert_eq!(chosen, Some(user));
    }

    #[test]
    fn absent_candidates_yield_none() {
        let cwd = tempdir().unwrap();
        let user = cwd.path().join("nowhere").join(USER_SETTINGS_FILE);
        assert_eq!(select_settings_path(None, false, Some(cwd.path()), Some(user)), None);
    }
}
