//! Configuration, template and action errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while loading or querying a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the document from disk failed.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: SmolStr,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML/JSON for the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(SmolStr),

    /// `buttons_per_page` must be positive.
    #[error("invalid buttons_per_page {0} (must be greater than zero)")]
    InvalidButtonsPerPage(usize),

    /// A static action could not be parsed.
    #[error("invalid {interaction} on {location}: {source}")]
    InvalidAction {
        location: SmolStr,
        interaction: SmolStr,
        #[source]
        source: ActionError,
    },

    /// A `system_buttons` key that is not a navigation action.
    #[error("unknown system button '{0}'")]
    UnknownSystemButton(SmolStr),

    /// Page id not present in the document.
    #[error("unknown page '{0}'")]
    UnknownPage(SmolStr),

    /// Structurally unreadable part of the document.
    #[error("invalid document: {0}")]
    InvalidDocument(SmolStr),
}

/// Errors raised while evaluating a template. Never escape the evaluator;
/// they are logged and replaced with `#BUG`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Syntax(#[from] deck_syntax::ParseError),

    #[error("unknown function '{0}'")]
    UnknownFunction(SmolStr),

    #[error("unknown filter '{0}'")]
    UnknownFilter(SmolStr),

    #[error("invalid arguments for '{name}': {message}")]
    Arguments { name: SmolStr, message: SmolStr },

    #[error("type error: {0}")]
    Type(SmolStr),
}

/// Errors raised while parsing an action specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The spec has no `action` name.
    #[error("missing action name")]
    Missing,

    /// The name is neither a navigation action nor `domain.service`.
    #[error("malformed action '{0}'")]
    Malformed(SmolStr),

    /// `$page.go_to` without a page id.
    #[error("'$page.go_to' requires a target page")]
    MissingTarget,
}
