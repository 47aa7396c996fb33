//! Arithmetic expressions for `POST /calculate`.
//!
//! Expressions are whitelisted, normalized and then evaluated by repeatedly
//! rewriting the expression string, one operation at a time.

mod body;
mod eval;
mod format;

use thiserror::Error;

pub use body::extract_expression;
pub use format::{format_significant, round_significant};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Empty expression")]
    EmptyExpression,

    #[error("Invalid character '{symbol}' at position {position} in expression: '{expression}'")]
    InvalidCharacter {
        symbol: char,
        position: usize,
        expression: String,
    },

    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid expression")]
    InvalidExpression,
}

/// A successful calculation: the rounded value and the expression it was
/// computed from, after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub result: f64,
    pub expression: String,
}

#[inline]
fn is_allowed(symbol: char) -> bool {
    symbol.is_ascii_digit()
        || matches!(
            symbol,
            '+' | '-' | '*' | '/' | '(' | ')' | '.' | 'e' | 'E' | 'x'
        )
}

/// Strips whitespace, rejects symbols outside the arithmetic alphabet and
/// rewrites `x` as `*`.
fn normalize(expression: &str) -> Result<String, CalcError> {
    let stripped: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    if let Some((position, symbol)) = stripped.chars().enumerate().find(|(_, c)| !is_allowed(*c)) {
        return Err(CalcError::InvalidCharacter {
            symbol,
            position,
            expression: stripped,
        });
    }

    Ok(stripped.replace('x', "*"))
}

fn check_parentheses(expression: &str) -> Result<(), CalcError> {
    let mut depth: i64 = 0;
    for symbol in expression.chars() {
        match symbol {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CalcError::UnbalancedParentheses);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CalcError::UnbalancedParentheses);
    }
    Ok(())
}

/// Rejects a literal `/0` unless it is the start of a decimal like `/0.5`.
/// Zero divisors that only appear after evaluation are caught by the
/// evaluator itself.
fn check_literal_zero_divisor(expression: &str) -> Result<(), CalcError> {
    let bytes = expression.as_bytes();
    let divides_by_zero = expression
        .match_indices("/0")
        .any(|(idx, _)| bytes.get(idx + 2) != Some(&b'.'));
    if divides_by_zero {
        return Err(CalcError::DivisionByZero);
    }
    Ok(())
}

pub fn calculate(expression: &str) -> Result<Evaluation, CalcError> {
    let expression = normalize(expression)?;
    check_parentheses(&expression)?;
    check_literal_zero_divisor(&expression)?;

    let value = eval::evaluate(&expression)?;
    Ok(Evaluation {
        result: round_significant(value),
        expression,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_of(expression: &str) -> f64 {
        calculate(expression)
            .map(|evaluation| evaluation.result)
            .unwrap_or_else(|err| panic!("{expression:?} failed: {err}"))
    }

    #[test]
    fn test_positive_calculations() {
        let positive_tests = vec![
            ("2+2", 4.0),
            ("(1+2)*3", 9.0),
            ("2x3", 6.0),
            ("1/0.5", 2.0),
            (" 7 - 2 ", 5.0),
            ("1/3", 0.3333333333),
            ("2.5e1*2", 50.0),
            ("10/0.25", 40.0),
        ];
        for (expression, expected) in positive_tests {
            assert_eq!(result_of(expression), expected, "calculating {expression:?}");
        }
    }

    #[test]
    fn test_normalized_expression_is_returned() {
        let evaluation = calculate(" 2 x ( 3 + 1 ) ").unwrap();
        assert_eq!(evaluation.expression, "2*(3+1)");
        assert_eq!(evaluation.result, 8.0);
    }

    #[test]
    fn test_negative_calculations() {
        let negative_tests = vec![
            ("", CalcError::EmptyExpression),
            ("  \t ", CalcError::EmptyExpression),
            ("10/0", CalcError::DivisionByZero),
            ("1+10/0*3", CalcError::DivisionByZero),
            ("5/(3-3)", CalcError::DivisionByZero),
            ("(1+2", CalcError::UnbalancedParentheses),
            ("1+2)", CalcError::UnbalancedParentheses),
            (")1+2(", CalcError::UnbalancedParentheses),
            ("2*", CalcError::InvalidExpression),
            ("()", CalcError::InvalidExpression),
        ];
        for (expression, expected) in negative_tests {
            assert_eq!(calculate(expression), Err(expected), "calculating {expression:?}");
        }
    }

    #[test]
    fn test_invalid_character_reports_position() {
        let err = calculate("2+@").unwrap_err();
        assert_eq!(
            err,
            CalcError::InvalidCharacter {
                symbol: '@',
                position: 2,
                expression: String::from("2+@"),
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid character '@' at position 2 in expression: '2+@'"
        );
    }

    #[test]
    fn test_position_counts_after_whitespace_is_removed() {
        let err = calculate("1 + 2 + a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid character 'a' at position 4 in expression: '1+2+a'"
        );
    }

    #[test]
    fn test_literal_zero_divisor_allows_decimals() {
        assert!(check_literal_zero_divisor("1/0.5").is_ok());
        assert!(check_literal_zero_divisor("1/0.5+3/0").is_err());
        assert!(check_literal_zero_divisor("1/05").is_err());
        assert!(check_literal_zero_divisor("10*0").is_ok());
    }
}
