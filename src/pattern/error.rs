use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("route path '{pattern}' must start with '/' (did you mean '/{pattern}'?)")]
    MissingLeadingSlash { pattern: String },
    #[error("custom pattern for parameter '{name}' in '{pattern}' is not terminated")]
    UnterminatedParameterConstraint { pattern: String, name: String },
    #[error("parameter in '{pattern}' at index {index} is missing a name")]
    ParameterMissingName { pattern: String, index: usize },
    #[error("lone escape character at the end of '{pattern}'")]
    LoneEscapeCharacter { pattern: String },
    #[error("repeatable parameter '{name}' in '{pattern}' must be alone in its segment")]
    RepeatableParamNotAlone { pattern: String, name: String },
    #[error("optional parameter '{name}' in '{pattern}' must be alone in its segment")]
    OptionalParamNotAlone { pattern: String, name: String },
    #[error("invalid custom pattern for parameter '{name}' in '{pattern}': {error}")]
    RegexConstraintInvalid {
        pattern: String,
        name: String,
        error: String,
    },
    #[error("duplicate parameter name '{param}' in path '{pattern}'")]
    DuplicateParamName { param: String, pattern: String },
    #[error("missing required parameter '{name}'")]
    MissingRequiredParam { name: String },
    #[error("parameter '{name}' is a list but it is not repeatable (use '+' or '*')")]
    ParamNotRepeatable { name: String },
}

pub type PatternResult<T> = Result<T, PatternError>;
