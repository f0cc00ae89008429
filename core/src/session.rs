//! Explicit session context handed to the transport wrapper.
//!
//! Holds the bearer token read from persisted storage and the navigator used
//! to send the user to the login route when the backend answers 401.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Moves the user to another view.
pub trait Navigator {
    fn navigate(&self, route: &str);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        warn!(route, "redirecting to login");
    }
}

#[derive(Clone)]
pub struct Session {
    token: Option<String>,
    login_route: String,
    navigator: Rc<dyn Navigator>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("login_route", &self.login_route)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            token: None,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            navigator: Rc::new(LogNavigator),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self::anonymous().token(Some(token.into()))
    }

    /// Blank tokens are treated as absent.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn navigator(mut self, navigator: Rc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn redirect_to_login(&self) {
        self.navigator.navigate(&self.login_route);
    }
}

/// Token persisted in a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/clientes/token`, falling back to the working directory.
    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("clientes").join("token"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means no token.
    pub fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        // mode() only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.trim().as_bytes())?;
        debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
