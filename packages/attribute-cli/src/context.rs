//! Application context with shared state and utilities

use std::sync::Arc;

use anyhow::Result;
use attribute_extraction::{Credential, FileStore, HttpProviderFactory, Session};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::config::Config;

/// Application context passed to all commands
pub struct AppContext {
    pub quiet: bool,
    pub config: Config,
    pub store: FileStore,
    pub session: Session,
}

impl AppContext {
    pub fn new(quiet: bool) -> Result<Self> {
        let config = Config::from_env();
        Self::with_config(quiet, config)
    }

    pub fn with_config(quiet: bool, config: Config) -> Result<Self> {
        let store = config.store()?;
        let factory = HttpProviderFactory::new(config.endpoints.clone());
        Ok(Self {
            quiet,
            store,
            session: Session::new(Arc::new(factory)),
            config,
        })
    }

    /// Put a credential into the session: an explicit key first, then
    /// `ATTRX_API_KEY`, then the credential store. Returns whether one was found.
    pub fn resolve_credential(&mut self, explicit: Option<&str>) -> Result<bool> {
        let from_args = [explicit, self.config.api_key.as_deref()]
            .into_iter()
            .flatten()
            .map(Credential::new)
            .find(|c| !c.is_empty());

        match from_args {
            Some(credential) => {
                self.session.set_credential(credential);
                Ok(true)
            }
            None => Ok(self.session.restore_credential(&self.store)?),
        }
    }

    pub fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.quiet {
            return Ok(default);
        }
        Ok(Confirm::with_theme(&self.theme())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    pub fn print_header(&self, msg: &str) {
        if !self.quiet {
            println!();
            println!("{}", style(msg).bold());
        }
    }

    pub fn print_success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).green());
        }
    }

    pub fn print_warning(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).yellow());
        }
    }

    pub fn print_info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).cyan());
        }
    }

    /// Errors are shown even in quiet mode.
    pub fn print_error(&self, msg: &str) {
        eprintln!("{}", style(msg).red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attribute_extraction::{KeyValueStore, ProviderIdentity, CREDENTIAL_KEY};
    use pretty_assertions::assert_eq;

    fn context(dir: &tempfile::TempDir, api_key: Option<&str>) -> AppContext {
        let config = Config {
            store_path: Some(dir.path().join("store.json")),
            api_key: api_key.map(str::to_string),
            ..Config::default()
        };
        AppContext::with_config(true, config).unwrap()
    }

    #[test]
    fn test_explicit_key_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, Some("pplx-env"));
        ctx.store.set(CREDENTIAL_KEY, "pplx-stored").unwrap();

        assert!(ctx.resolve_credential(Some("AIzaExplicit")).unwrap());
        assert_eq!(ctx.session.provider(), Some(ProviderIdentity::Gemini));
    }

    #[test]
    fn test_env_key_before_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, Some("pplx-env"));
        ctx.store.set(CREDENTIAL_KEY, "AIzaStored").unwrap();

        assert!(ctx.resolve_credential(None).unwrap());
        assert_eq!(ctx.session.credential().unwrap().expose(), "pplx-env");
    }

    #[test]
    fn test_falls_back_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, None);

        assert!(!ctx.resolve_credential(Some("   ")).unwrap());

        ctx.store.set(CREDENTIAL_KEY, "AIzaStored").unwrap();
        assert!(ctx.resolve_credential(None).unwrap());
        assert_eq!(ctx.session.credential().unwrap().expose(), "AIzaStored");
        assert!(!ctx.session.is_validated());
    }
}
