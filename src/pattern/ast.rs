use smallvec::SmallVec;

/// Tokens of one path segment. Most segments hold a single token, mixed
/// segments such as `prefix-:id` hold several.
pub type TokenSegment = SmallVec<[Token; 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Static { value: String },
    Param(ParamToken),
}

impl Token {
    pub fn root() -> Self {
        Token::Static {
            value: String::new(),
        }
    }

    pub fn is_repeatable(&self) -> bool {
        matches!(self, Token::Param(param) if param.repeatable)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Token::Param(param) if param.optional)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
    pub name: String,
    pub custom_pattern: Option<String>,
    pub optional: bool,
    pub repeatable: bool,
}

impl ParamToken {
    pub fn new(name: String, custom_pattern: Option<String>, modifier: Option<char>) -> Self {
        Self {
            name,
            custom_pattern,
            optional: matches!(modifier, Some('?' | '*')),
            repeatable: matches!(modifier, Some('+' | '*')),
        }
    }
}
