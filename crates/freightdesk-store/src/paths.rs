//! Where the ledger database lives when no `--db-path` is given:
//! `$XDG_DATA_HOME/freightdesk/freightdesk.sqlite3`, falling back to
//! `~/.local/share/freightdesk/`.

use crate::error::{Result, StoreError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const LEDGER_DIR: &str = "freightdesk";
const LEDGER_FILE: &str = "freightdesk.sqlite3";

/// An explicit path wins and is used as given. The default location has its
/// directory created owner-only.
pub fn resolve_db_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = custom {
        if path.as_os_str().is_empty() {
            return Err(StoreError::InvalidDataPath(path));
        }
        return Ok(path);
    }

    let dir = ledger_home(env::var_os("XDG_DATA_HOME").map(PathBuf::from))?;
    create_private_dir(&dir)?;
    Ok(dir.join(LEDGER_FILE))
}

fn ledger_home(xdg_data_home: Option<PathBuf>) -> Result<PathBuf> {
    let base = match xdg_data_home {
        Some(base) if base.as_os_str().is_empty() => {
            return Err(StoreError::InvalidDataPath(base))
        }
        Some(base) => base,
        None => dirs::home_dir()
            .ok_or(StoreError::MissingHomeDir)?
            .join(".local/share"),
    };
    Ok(base.join(LEDGER_DIR))
}

fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{create_private_dir, ledger_home, resolve_db_path};
    use crate::error::StoreErrorKind;
    use std::path::PathBuf;

    #[test]
    fn explicit_path_is_used_verbatim() {
        let path = PathBuf::from("/tmp/ledger.sqlite3");
        assert_eq!(resolve_db_path(Some(path.clone())).unwrap(), path);

        let err = resolve_db_path(Some(PathBuf::new())).unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::InvalidDataPath);
    }

    #[test]
    fn ledger_home_sits_under_xdg_data_home() {
        let home = ledger_home(Some(PathBuf::from("/srv/data"))).unwrap();
        assert_eq!(home, PathBuf::from("/srv/data/freightdesk"));

        let err = ledger_home(Some(PathBuf::new())).unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::InvalidDataPath);
    }

    #[cfg(unix)]
    #[test]
    fn ledger_dir_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("nested/freightdesk");
        create_private_dir(&dir).expect("create dir");
        let mode = std::fs::metadata(&dir).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
