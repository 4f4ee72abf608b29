//! Categorization expression parser and evaluator.
//!
//! Category values (and hierarchical source levels) are computed by a small
//! string-valued expression language evaluated against the compose context:
//!
//! ```text
//! 'production'                      — string literal
//! name                              — the node name
//! facts.os.family                   — fact lookup by dotted path
//! osfamily                          — shorthand for facts.osfamily
//! facts.environment | 'production'  — fallback if left side is undefined
//! 'eu-' + facts.region              — concatenation
//! ```
//!
//! Grammar (informal):
//! ```text
//! expr  = term ("|" term)*
//! term  = atom ("+" atom)*
//! atom  = STRING | "name" | IDENT ("." IDENT)*
//! ```

use strata_core::ComposeContext;

/// A parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A string literal.
    Lit(String),
    /// The node name.
    NodeName,
    /// A fact lookup by dotted path.
    Fact(String),
    /// String concatenation.
    Concat(Box<Expr>, Box<Expr>),
    /// Left side if defined and non-empty, otherwise right side.
    Fallback(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluate against a context. Undefined fact lookups yield `Null`;
    /// whether a non-string result is an error is up to the caller (the
    /// category evaluator rejects them, naming the offending category).
    pub fn evaluate(&self, ctx: &ComposeContext) -> serde_json::Value {
        match self {
            Expr::Lit(s) => serde_json::Value::String(s.clone()),
            Expr::NodeName => serde_json::Value::String(ctx.node.clone()),
            Expr::Fact(path) => ctx
                .fact(path)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
            Expr::Concat(a, b) => {
                let left = a.evaluate(ctx);
                let right = b.evaluate(ctx);
                match (left, right) {
                    (serde_json::Value::String(l), serde_json::Value::String(r)) => {
                        serde_json::Value::String(format!("{l}{r}"))
                    }
                    // Surface the non-string operand so the caller's type
                    // error names what was actually seen.
                    (serde_json::Value::String(_), other) | (other, _) => other,
                }
            }
            Expr::Fallback(a, b) => {
                let left = a.evaluate(ctx);
                if is_defined(&left) {
                    left
                } else {
                    b.evaluate(ctx)
                }
            }
        }
    }
}

/// A value counts as defined unless it is `Null` or the empty string.
fn is_defined(value: &serde_json::Value) -> bool {
    !value.is_null() && value.as_str() != Some("")
}

/// Parse an expression string into an [`Expr`] tree.
pub fn parse_expression(input: &str) -> Result<Expr, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty expression".into());
    }
    let tokens = tokenize(input)?;
    let (expr, rest) = parse_fallback(&tokens)?;
    if !rest.is_empty() {
        return Err(format!("unexpected tokens after expression: {rest:?}"));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Pipe,
    Plus,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => {
                            if let Some(escaped) = chars.next() {
                                s.push(escaped);
                            }
                        }
                        Some(ch) if ch == quote => break,
                        Some(ch) => s.push(ch),
                        None => return Err("unterminated string literal".into()),
                    }
                }
                tokens.push(Token::Str(s));
            }
            _ if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(&wc) = chars.peek() {
                    if wc.is_alphanumeric() || wc == '_' || wc == '.' {
                        word.push(wc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(word));
            }
            _ => return Err(format!("unexpected character: {c}")),
        }
    }

    Ok(tokens)
}

fn parse_fallback(tokens: &[Token]) -> Result<(Expr, &[Token]), String> {
    let (mut left, mut rest) = parse_concat(tokens)?;
    while rest.first() == Some(&Token::Pipe) {
        let (right, remaining) = parse_concat(&rest[1..])?;
        left = Expr::Fallback(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_concat(tokens: &[Token]) -> Result<(Expr, &[Token]), String> {
    let (mut left, mut rest) = parse_atom(tokens)?;
    while rest.first() == Some(&Token::Plus) {
        let (right, remaining) = parse_atom(&rest[1..])?;
        left = Expr::Concat(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_atom(tokens: &[Token]) -> Result<(Expr, &[Token]), String> {
    match tokens.first() {
        Some(Token::Str(s)) => Ok((Expr::Lit(s.clone()), &tokens[1..])),
        Some(Token::Ident(word)) => {
            let expr = if word == "name" {
                Expr::NodeName
            } else if let Some(path) = word.strip_prefix("facts.") {
                if path.is_empty() {
                    return Err("fact lookup needs a path after 'facts.'".into());
                }
                Expr::Fact(path.to_string())
            } else {
                // Bare identifier is a top-level fact lookup.
                Expr::Fact(word.clone())
            };
            Ok((expr, &tokens[1..]))
        }
        other => Err(format!("expected a value, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ComposeContext;

    fn ctx() -> ComposeContext {
        ComposeContext::new("web01", "/etc/strata").with_facts(serde_json::json!({
            "osfamily": "Debian",
            "cpus": 8,
            "os": { "family": "debian" }
        }))
    }

    #[test]
    fn literal_evaluates_to_itself() {
        let e = parse_expression("'true'").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("true"));
    }

    #[test]
    fn name_evaluates_to_node() {
        let e = parse_expression("name").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("web01"));
    }

    #[test]
    fn fact_lookup_dotted() {
        let e = parse_expression("facts.os.family").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("debian"));
    }

    #[test]
    fn bare_ident_is_fact_shorthand() {
        let e = parse_expression("osfamily").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("Debian"));
    }

    #[test]
    fn missing_fact_is_null() {
        let e = parse_expression("facts.nope").unwrap();
        assert!(e.evaluate(&ctx()).is_null());
    }

    #[test]
    fn fallback_on_missing() {
        let e = parse_expression("facts.environment | 'production'").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("production"));
    }

    #[test]
    fn fallback_prefers_defined_left() {
        let e = parse_expression("facts.osfamily | 'unknown'").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("Debian"));
    }

    #[test]
    fn empty_string_counts_as_undefined() {
        let e = parse_expression("'' | 'fallback'").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("fallback"));
    }

    #[test]
    fn concatenation() {
        let e = parse_expression("'family-' + facts.os.family").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!("family-debian"));
    }

    #[test]
    fn concat_with_non_string_surfaces_operand() {
        let e = parse_expression("'cpus-' + facts.cpus").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!(8));
    }

    #[test]
    fn non_string_fact_passes_through() {
        let e = parse_expression("facts.cpus").unwrap();
        assert_eq!(e.evaluate(&ctx()), serde_json::json!(8));
    }

    #[test]
    fn parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("'unterminated").is_err());
        assert!(parse_expression("facts.").is_err());
        assert!(parse_expression("a + ").is_err());
        assert!(parse_expression("| 'x'").is_err());
        assert!(parse_expression("a ~ b").is_err());
    }
}
