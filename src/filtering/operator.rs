/// Comparison operator carried by a bracket prefix in search text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchOperator {
    /// Equality (`[=]`, the default)
    #[default]
    Eq,
    /// Not equal (`[!=]`)
    Neq,
    /// Case-insensitive substring match (`[%]`)
    Like,
    /// Less than (`[<]`)
    Lt,
    /// Greater than (`[>]`)
    Gt,
}

impl SearchOperator {
    /// Parse an operator from its bracket token content.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Neq),
            "%" => Some(Self::Like),
            "<" => Some(Self::Lt),
            ">" => Some(Self::Gt),
            _ => None,
        }
    }

    /// The token for this operator, as written between brackets.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Like => "%",
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }
}

/// Extract an optional leading `[op]` token from raw search text.
///
/// Returns the operator and the remainder with the whole bracket token
/// stripped. Text without a recognized token comes back unchanged under
/// `default`; malformed brackets and unknown operator characters are
/// literal search text, not an error.
#[must_use]
pub fn parse_operator(text: &str, default: SearchOperator) -> (SearchOperator, &str) {
    if let Some(rest) = text.strip_prefix('[')
        && let Some((token, remainder)) = rest.split_once(']')
        && let Some(operator) = SearchOperator::from_token(token)
    {
        return (operator, remainder);
    }
    (default, text)
}
