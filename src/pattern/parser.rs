use smallvec::smallvec;

use crate::pattern::ast::{ParamToken, Token, TokenSegment};
use crate::pattern::{PatternError, PatternResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenizerState {
    Static,
    Param,
    ParamRegExp,
    ParamRegExpEnd,
    EscapeNext,
}

/// Splits a route path into segments of static and parameter tokens.
///
/// `""` yields a single empty segment (used by children that share their
/// parent's path) and `"/"` yields the root token. A repeatable or optional
/// parameter must be the only token of its segment.
#[tracing::instrument(level = "trace", fields(pattern=%path))]
pub fn tokenize_path(path: &str) -> PatternResult<Vec<TokenSegment>> {
    if path.is_empty() {
        return Ok(vec![TokenSegment::new()]);
    }

    if path == "/" {
        return Ok(vec![smallvec![Token::root()]]);
    }

    if !path.starts_with('/') {
        return Err(PatternError::MissingLeadingSlash {
            pattern: path.to_string(),
        });
    }

    let mut tokenizer = PathTokenizer::new(path);
    tokenizer.run()?;
    Ok(tokenizer.segments)
}

struct PathTokenizer<'a> {
    pattern: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    state: TokenizerState,
    previous_state: TokenizerState,
    buffer: String,
    custom_pattern: String,
    param_start: usize,
    segment: TokenSegment,
    started: bool,
    segments: Vec<TokenSegment>,
}

impl<'a> PathTokenizer<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            chars: pattern.char_indices().collect(),
            index: 0,
            state: TokenizerState::Static,
            previous_state: TokenizerState::Static,
            buffer: String::new(),
            custom_pattern: String::new(),
            param_start: 0,
            segment: TokenSegment::new(),
            started: false,
            segments: Vec::new(),
        }
    }

    fn run(&mut self) -> PatternResult<()> {
        while let Some(ch) = self.next() {
            if ch == '\\' && self.state != TokenizerState::ParamRegExp {
                self.previous_state = self.state;
                self.state = TokenizerState::EscapeNext;
                continue;
            }

            match self.state {
                TokenizerState::Static => match ch {
                    '/' => {
                        self.consume_buffer(None)?;
                        self.finalize_segment()?;
                    }
                    ':' => {
                        self.consume_buffer(None)?;
                        self.param_start = self.previous_byte_index();
                        self.state = TokenizerState::Param;
                    }
                    _ => self.buffer.push(ch),
                },
                TokenizerState::EscapeNext => {
                    self.buffer.push(ch);
                    self.state = self.previous_state;
                }
                TokenizerState::Param => {
                    if ch == '(' {
                        self.state = TokenizerState::ParamRegExp;
                    } else if ch.is_ascii_alphanumeric() || ch == '_' {
                        self.buffer.push(ch);
                    } else {
                        self.end_param(ch)?;
                    }
                }
                TokenizerState::ParamRegExp => {
                    if ch == ')' {
                        // `\)` keeps the parenthesis inside the custom pattern
                        if self.custom_pattern.ends_with('\\') {
                            self.custom_pattern.pop();
                            self.custom_pattern.push(ch);
                        } else {
                            self.state = TokenizerState::ParamRegExpEnd;
                        }
                    } else {
                        self.custom_pattern.push(ch);
                    }
                }
                TokenizerState::ParamRegExpEnd => {
                    self.end_param(ch)?;
                    self.custom_pattern.clear();
                }
            }
        }

        match self.state {
            TokenizerState::ParamRegExp => {
                return Err(PatternError::UnterminatedParameterConstraint {
                    pattern: self.pattern.to_string(),
                    name: self.buffer.clone(),
                });
            }
            TokenizerState::EscapeNext => {
                return Err(PatternError::LoneEscapeCharacter {
                    pattern: self.pattern.to_string(),
                });
            }
            _ => {}
        }

        self.consume_buffer(None)?;
        self.finalize_segment()
    }

    /// Closes the parameter being read. A modifier is consumed, any other
    /// character is handed back to the static state.
    fn end_param(&mut self, ch: char) -> PatternResult<()> {
        let modifier = matches!(ch, '*' | '?' | '+').then_some(ch);
        self.consume_buffer(modifier)?;
        self.state = TokenizerState::Static;
        if modifier.is_none() {
            self.index -= 1;
        }
        Ok(())
    }

    fn consume_buffer(&mut self, modifier: Option<char>) -> PatternResult<()> {
        match self.state {
            TokenizerState::Static => {
                if !self.buffer.is_empty() {
                    let value = std::mem::take(&mut self.buffer);
                    self.segment.push(Token::Static { value });
                }
            }
            TokenizerState::Param
            | TokenizerState::ParamRegExp
            | TokenizerState::ParamRegExpEnd => {
                if self.buffer.is_empty() {
                    return Err(PatternError::ParameterMissingName {
                        pattern: self.pattern.to_string(),
                        index: self.param_start,
                    });
                }
                let name = std::mem::take(&mut self.buffer);
                let custom_pattern =
                    (!self.custom_pattern.is_empty()).then(|| self.custom_pattern.clone());
                self.segment.push(Token::Param(ParamToken::new(
                    name,
                    custom_pattern,
                    modifier,
                )));
            }
            TokenizerState::EscapeNext => {}
        }
        Ok(())
    }

    fn finalize_segment(&mut self) -> PatternResult<()> {
        let segment = std::mem::take(&mut self.segment);

        if segment.len() > 1 {
            if let Some(Token::Param(param)) = segment.iter().find(|token| token.is_repeatable()) {
                return Err(PatternError::RepeatableParamNotAlone {
                    pattern: self.pattern.to_string(),
                    name: param.name.clone(),
                });
            }
            if let Some(Token::Param(param)) = segment.iter().find(|token| token.is_optional()) {
                return Err(PatternError::OptionalParamNotAlone {
                    pattern: self.pattern.to_string(),
                    name: param.name.clone(),
                });
            }
        }

        if self.started {
            self.segments.push(segment);
        }
        self.started = true;
        Ok(())
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.chars.get(self.index).map(|(_, ch)| *ch);
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    fn previous_byte_index(&self) -> usize {
        self.index
            .checked_sub(1)
            .and_then(|idx| self.chars.get(idx))
            .map(|(idx, _)| *idx)
            .unwrap_or(0)
    }
}
