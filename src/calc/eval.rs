use super::format::format_significant;
use super::CalcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    fn apply(self, left: f64, right: f64) -> Result<f64, CalcError> {
        match self {
            Operator::Add => Ok(left + right),
            Operator::Subtract => Ok(left - right),
            Operator::Multiply => Ok(left * right),
            Operator::Divide if right == 0.0 => Err(CalcError::DivisionByZero),
            Operator::Divide => Ok(left / right),
        }
    }
}

#[inline]
fn is_exponent(symbol: u8) -> bool {
    symbol == b'e' || symbol == b'E'
}

#[inline]
fn is_sign(symbol: u8) -> bool {
    symbol == b'+' || symbol == b'-'
}

#[inline]
fn is_operator(symbol: u8) -> bool {
    matches!(symbol, b'+' | b'-' | b'*' | b'/')
}

#[inline]
fn is_number_part(symbol: u8) -> bool {
    symbol.is_ascii_digit() || symbol == b'.' || is_exponent(symbol)
}

/// A `+`/`-` at `idx` is a sign rather than an operator when it opens the
/// expression, follows another operator, or follows an exponent marker.
fn is_sign_at(expression: &[u8], idx: usize) -> bool {
    is_sign(expression[idx])
        && (idx == 0 || is_operator(expression[idx - 1]) || is_exponent(expression[idx - 1]))
}

fn find_multiplicative(expression: &[u8]) -> Option<(usize, Operator)> {
    expression
        .iter()
        .position(|&symbol| symbol == b'*' || symbol == b'/')
        .map(|idx| match expression[idx] {
            b'*' => (idx, Operator::Multiply),
            _ => (idx, Operator::Divide),
        })
}

fn find_additive(expression: &[u8]) -> Option<(usize, Operator)> {
    (1..expression.len())
        .find(|&idx| is_sign(expression[idx]) && !is_sign_at(expression, idx))
        .map(|idx| match expression[idx] {
            b'+' => (idx, Operator::Add),
            _ => (idx, Operator::Subtract),
        })
}

/// First byte of the operand that ends right before `op`.
fn left_operand_start(expression: &[u8], op: usize) -> usize {
    let mut start = op;
    while start > 0 {
        let idx = start - 1;
        let symbol = expression[idx];
        if is_number_part(symbol) {
            start = idx;
            continue;
        }
        if is_sign_at(expression, idx) {
            start = idx;
            // only an exponent sign can have more of the number before it
            if idx > 0 && is_exponent(expression[idx - 1]) {
                continue;
            }
        }
        break;
    }
    start
}

/// One past the last byte of the operand that starts right after `op`.
fn right_operand_end(expression: &[u8], op: usize) -> usize {
    let mut end = op + 1;
    if end < expression.len() && expression[end] == b'-' {
        end += 1;
    }
    while end < expression.len() {
        let symbol = expression[end];
        if is_number_part(symbol) || (is_sign(symbol) && is_exponent(expression[end - 1])) {
            end += 1;
        } else {
            break;
        }
    }
    end
}

fn parse_number(text: &str) -> Result<f64, CalcError> {
    text.parse::<f64>().map_err(|_| CalcError::InvalidExpression)
}

/// Computes the operation at `op` and splices its formatted result back in
/// place of `left op right`.
fn reduce(expression: &str, op: usize, operator: Operator) -> Result<String, CalcError> {
    let bytes = expression.as_bytes();
    let start = left_operand_start(bytes, op);
    let end = right_operand_end(bytes, op);

    let left = parse_number(&expression[start..op])?;
    let right = parse_number(&expression[op + 1..end])?;
    let value = operator.apply(left, right)?;

    Ok(format!(
        "{}{}{}",
        &expression[..start],
        format_significant(value),
        &expression[end..]
    ))
}

fn matching_close_paren(expression: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, &symbol) in expression.iter().enumerate().skip(open) {
        match symbol {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Evaluates a validated expression by rewriting it: parenthesised groups
/// from the rightmost one, then `*` and `/` left to right, then `+` and `-`
/// left to right. Every intermediate value goes through
/// `format_significant`, so precision is lost at each step.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let mut expression = expression.to_string();

    while let Some(open) = expression.rfind('(') {
        let close = matching_close_paren(expression.as_bytes(), open)
            .ok_or(CalcError::UnbalancedParentheses)?;
        let inner = evaluate(&expression[open + 1..close])?;
        expression = format!(
            "{}{}{}",
            &expression[..open],
            format_significant(inner),
            &expression[close + 1..]
        );
    }

    while let Some((op, operator)) = find_multiplicative(expression.as_bytes()) {
        expression = reduce(&expression, op, operator)?;
    }

    while let Some((op, operator)) = find_additive(expression.as_bytes()) {
        expression = reduce(&expression, op, operator)?;
    }

    parse_number(&expression)
}
