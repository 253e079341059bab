// Session credentials - cookie jar restored from the environment at startup

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{info, warn};

/// Environment variable carrying the base64-encoded cookie jar
pub const COOKIES_ENV_VAR: &str = "COOKIES_B64";

/// Where the decoded jar is materialized
const COOKIE_FILE_PATH: &str = "cookies.txt";

/// Immutable snapshot of the session-cookie artifact.
///
/// Produced once at startup and passed into the resolver by parameter;
/// nothing reads the environment at request time. Absence means only
/// publicly accessible content resolves, which is not an error.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    cookie_file: Option<PathBuf>,
}

impl Credentials {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_cookie_file(path: PathBuf) -> Self {
        Self {
            cookie_file: Some(path),
        }
    }

    /// Materialize the cookie jar from the environment, if present.
    pub fn from_env() -> Self {
        match env::var(COOKIES_ENV_VAR) {
            Ok(payload) => Self::materialize(&payload, Path::new(COOKIE_FILE_PATH)),
            Err(_) => {
                info!(
                    "no {} in environment, resolving unauthenticated content only",
                    COOKIES_ENV_VAR
                );
                Self::none()
            }
        }
    }

    /// Decode `payload` into `path` unless the file already exists.
    ///
    /// Decode and write failures degrade to running without credentials
    /// rather than refusing to start.
    pub fn materialize(payload: &str, path: &Path) -> Self {
        if path.exists() {
            info!(path = %path.display(), "cookie jar already present, leaving it untouched");
            return Self::with_cookie_file(path.to_path_buf());
        }

        let decoded = match STANDARD.decode(payload.trim()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "cookie payload is not valid base64, continuing without credentials");
                return Self::none();
            }
        };

        if let Err(err) = fs::write(path, &decoded) {
            warn!(path = %path.display(), error = %err, "failed to write cookie jar, continuing without credentials");
            return Self::none();
        }

        info!(path = %path.display(), bytes = decoded.len(), "cookie jar materialized");
        Self::with_cookie_file(path.to_path_buf())
    }

    pub fn cookie_file(&self) -> Option<&Path> {
        self.cookie_file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    #[test]
    fn payload_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        let payload = STANDARD.encode("# Netscape HTTP Cookie File\n");

        let credentials = Credentials::materialize(&payload, &path);
        assert_eq!(credentials.cookie_file(), Some(path.as_path()));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Netscape HTTP Cookie File\n"
        );
    }

    #[test]
    fn existing_jar_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        fs::write(&path, "original contents").unwrap();

        let payload = STANDARD.encode("replacement contents");
        let credentials = Credentials::materialize(&payload, &path);

        assert_eq!(credentials.cookie_file(), Some(path.as_path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original contents");
    }

    #[test]
    fn invalid_base64_degrades_to_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");

        let credentials = Credentials::materialize("%%% not base64 %%%", &path);
        assert!(credentials.cookie_file().is_none());
        assert!(!path.exists());
    }
}
