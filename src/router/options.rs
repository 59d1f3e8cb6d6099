use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pattern::PathParserOptions;

const DEFAULT_MAX_REDIRECTS: usize = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouterOptions {
    /// Default for routes that do not set `sensitive` themselves.
    pub case_sensitive: bool,
    /// Default for routes that do not set `strict` themselves.
    pub strict_trailing_slash: bool,
    /// Redirects one navigation may follow before it is reported as a loop.
    pub max_redirects: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            strict_trailing_slash: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl RouterOptions {
    pub fn builder() -> RouterOptionsBuilder {
        RouterOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), RouterConfigError> {
        if self.max_redirects == 0 {
            return Err(RouterConfigError::MaxRedirectsInvalid {
                provided: self.max_redirects,
            });
        }
        Ok(())
    }

    pub fn path_options(&self) -> PathParserOptions {
        PathParserOptions {
            strict: self.strict_trailing_slash,
            sensitive: self.case_sensitive,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RouterOptionsBuilder {
    options: RouterOptions,
}

impl RouterOptionsBuilder {
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.options.case_sensitive = value;
        self
    }

    pub fn strict_trailing_slash(mut self, value: bool) -> Self {
        self.options.strict_trailing_slash = value;
        self
    }

    pub fn max_redirects(mut self, value: usize) -> Self {
        self.options.max_redirects = value;
        self
    }

    pub fn build(self) -> Result<RouterOptions, RouterConfigError> {
        let options = self.options;
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterConfigError {
    #[error("max_redirects must be at least 1 (got {provided})")]
    MaxRedirectsInvalid { provided: usize },
}
