mod ast;
mod compiled;
mod error;
mod parser;
mod scoring;

pub use ast::{ParamToken, Token, TokenSegment};
pub use compiled::{
    CompiledPattern, DEFAULT_PARAM_PATTERN, ParamKey, PathParserOptions, compile_pattern,
};
pub use error::{PatternError, PatternResult};
pub use parser::tokenize_path;
pub use scoring::{PathScore, compare_path_score, compare_score_array};

/// Tokenizes and compiles `path` in one step.
pub fn parse_path(path: &str, options: PathParserOptions) -> PatternResult<CompiledPattern> {
    compile_pattern(tokenize_path(path)?, options)
}
