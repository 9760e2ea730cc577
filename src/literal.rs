// Text literals for matrices.
//
// Accepted forms:
// - bare scalars: `3`, `-2.5e3`, `1+2i`, `-j`
// - nested rows: `[[1, 2], [3, 4]]` or a single row `[1, 2, 3]`
// - whitespace/semicolon rows: `[1 2; 3 4]`, with ranges `[1:4]` and `[0:0.5:2]`

use crate::error::{MatrixError, Result};
use num_complex::Complex64;

/// Upper bound on the entries a single range may expand to.
const MAX_RANGE_LEN: usize = 0x10000;

/// Converts a matrix literal into row-major rows.
///
/// Implementations only tokenize; shape validation happens in
/// [`crate::Matrix::from_rows`].
pub trait MatrixLiteralParser {
    fn parse(&self, text: &str) -> Result<Vec<Vec<Complex64>>>;
}

/// The parser used by [`crate::Matrix::create`] for text input.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLiteralParser;

impl MatrixLiteralParser for DefaultLiteralParser {
    fn parse(&self, text: &str) -> Result<Vec<Vec<Complex64>>> {
        let trimmed = text.trim();
        let inner = match trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(inner) => inner,
            None => return Ok(vec![vec![parse_complex(trimmed)?]]),
        };
        if inner.contains(['[', ']', ',']) {
            parse_nested(inner)
        } else {
            inner.split(';').map(parse_spaced_row).collect()
        }
    }
}

fn parse_error(message: impl Into<String>) -> MatrixError {
    MatrixError::Parse {
        op: "create",
        message: message.into(),
    }
}

/// `[1, 2], [3, 4]` or `1, 2, 3`. Bracketed rows may only be separated by
/// commas and whitespace.
fn parse_nested(inner: &str) -> Result<Vec<Vec<Complex64>>> {
    if !inner.contains('[') {
        if inner.contains(']') {
            return Err(parse_error(format!("unbalanced bracket in `{}`", inner)));
        }
        return Ok(vec![parse_comma_row(inner)?]);
    }
    let mut rows = Vec::new();
    let mut rest = inner;
    loop {
        let start = match rest.find('[') {
            Some(start) => start,
            None => {
                check_separator(rest, inner)?;
                break;
            }
        };
        check_separator(&rest[..start], inner)?;
        let after = &rest[start + 1..];
        let end = after
            .find(']')
            .ok_or_else(|| parse_error(format!("unclosed bracket in `{}`", inner)))?;
        let group = &after[..end];
        if group.contains('[') {
            return Err(parse_error(format!("rows nest deeper than two levels in `{}`", inner)));
        }
        rows.push(parse_comma_row(group)?);
        rest = &after[end + 1..];
    }
    Ok(rows)
}

/// Text between bracketed rows.
fn check_separator(text: &str, inner: &str) -> Result<()> {
    if text.chars().all(|c| c == ',' || c.is_whitespace()) {
        Ok(())
    } else {
        Err(parse_error(format!(
            "`{}` outside a bracketed row in `{}`",
            text.trim(),
            inner
        )))
    }
}

fn parse_comma_row(row: &str) -> Result<Vec<Complex64>> {
    row.split(',').map(|entry| parse_complex(entry.trim())).collect()
}

/// One row of a whitespace separated literal; sign and colon tokens
/// standing alone are glued to their neighbours first.
fn parse_spaced_row(row: &str) -> Result<Vec<Complex64>> {
    let mut tokens: Vec<String> = Vec::new();
    for raw in row.split_whitespace() {
        let lone_sign = raw == "+" || raw == "-";
        match tokens.last_mut() {
            Some(last) if last.ends_with(['+', '-', ':']) || lone_sign || raw.starts_with(':') => {
                last.push_str(raw)
            }
            _ => tokens.push(raw.to_string()),
        }
    }

    let mut values = Vec::new();
    for token in tokens {
        if token.contains(':') {
            values.extend(expand_range(&token)?);
        } else {
            values.push(parse_complex(&token)?);
        }
    }
    Ok(values)
}

/// `from:to` or `from:step:to` over real values; `to` is included when reached.
fn expand_range(token: &str) -> Result<Vec<Complex64>> {
    let parts: Vec<&str> = token.split(':').collect();
    let (from, step, to) = match parts.as_slice() {
        [from, to] => (parse_real(from)?, 1.0, parse_real(to)?),
        [from, step, to] => (parse_real(from)?, parse_real(step)?, parse_real(to)?),
        _ => return Err(parse_error(format!("malformed range `{}`", token))),
    };
    if from == to {
        return Ok(vec![Complex64::new(from, 0.0)]);
    }
    if step == 0.0 || (to - from).signum() != step.signum() {
        return Err(parse_error(format!("range `{}` never reaches its end", token)));
    }
    let mut values = Vec::new();
    for i in 0..MAX_RANGE_LEN {
        let x = from + step * i as f64;
        if (step > 0.0 && x > to) || (step < 0.0 && x < to) {
            break;
        }
        values.push(Complex64::new(x, 0.0));
    }
    Ok(values)
}

fn parse_real(text: &str) -> Result<f64> {
    let value = parse_complex(text.trim())?;
    if value.im != 0.0 {
        return Err(parse_error(format!("range bound `{}` must be real", text)));
    }
    Ok(value.re)
}

/// Parses `a`, `bi`, `a+bi` and `a-bj`; spaces inside the literal are ignored.
pub(crate) fn parse_complex(text: &str) -> Result<Complex64> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(parse_error("empty entry"));
    }
    let body = match compact.strip_suffix(['i', 'j', 'I', 'J']) {
        Some(body) => body,
        None => return parse_float(&compact).map(|re| Complex64::new(re, 0.0)),
    };
    // last sign that is neither leading nor part of an exponent
    let split = body
        .char_indices()
        .filter(|&(i, c)| {
            (c == '+' || c == '-')
                && i > 0
                && !matches!(body.as_bytes()[i - 1], b'e' | b'E')
        })
        .map(|(i, _)| i)
        .last();
    let (re_text, im_text) = match split {
        Some(i) => (&body[..i], &body[i..]),
        None => ("", body),
    };
    let re = if re_text.is_empty() {
        0.0
    } else {
        parse_float(re_text)?
    };
    let im = match im_text {
        "" | "+" => 1.0,
        "-" => -1.0,
        _ => parse_float(im_text)?,
    };
    Ok(Complex64::new(re, im))
}

fn parse_float(text: &str) -> Result<f64> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    digits
        .parse::<f64>()
        .map_err(|e| parse_error(format!("`{}`: {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn complex_entries() {
        assert_eq!(parse_complex("3").unwrap(), c(3.0, 0.0));
        assert_eq!(parse_complex("-2.5e3").unwrap(), c(-2500.0, 0.0));
        assert_eq!(parse_complex("1+2i").unwrap(), c(1.0, 2.0));
        assert_eq!(parse_complex("1 - 2j").unwrap(), c(1.0, -2.0));
        assert_eq!(parse_complex("-i").unwrap(), c(0.0, -1.0));
        assert_eq!(parse_complex("4i").unwrap(), c(0.0, 4.0));
        assert_eq!(parse_complex("1e-3+1e2i").unwrap(), c(1e-3, 100.0));
        assert!(parse_complex("abc").is_err());
    }

    #[test]
    fn nested_rows() {
        let rows = DefaultLiteralParser.parse("[[1, 2], [3, 4]]").unwrap();
        assert_eq!(rows, vec![vec![c(1.0, 0.0), c(2.0, 0.0)], vec![c(3.0, 0.0), c(4.0, 0.0)]]);
        let single = DefaultLiteralParser.parse("[1, 2, 3]").unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].len(), 3);
    }

    #[test]
    fn stray_entries_between_rows_are_rejected() {
        for text in ["[[1,2],3]", "[1, [2,3]]", "[[1,2] 5 [3,4]]", "[[1,2],[3,4]", "[1, 2]]", "[[[1]]]"] {
            let err = DefaultLiteralParser.parse(text).unwrap_err();
            assert!(matches!(err, MatrixError::Parse { op: "create", .. }), "{}", text);
        }
        let spaced = DefaultLiteralParser.parse("[ [1,2] ,\n [3,4] , ]").unwrap();
        assert_eq!(spaced.len(), 2);
    }

    #[test]
    fn spaced_rows_and_ranges() {
        let rows = DefaultLiteralParser.parse("[1 2; 3 4]").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![c(3.0, 0.0), c(4.0, 0.0)]);

        let range = DefaultLiteralParser.parse("[1:4]").unwrap();
        assert_eq!(range[0].iter().map(|z| z.re).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);

        let stepped = DefaultLiteralParser.parse("[0:2:7]").unwrap();
        assert_eq!(stepped[0].iter().map(|z| z.re).collect::<Vec<_>>(), vec![0.0, 2.0, 4.0, 6.0]);

        let down = DefaultLiteralParser.parse("[3 : -1 : 1]").unwrap();
        assert_eq!(down[0].iter().map(|z| z.re).collect::<Vec<_>>(), vec![3.0, 2.0, 1.0]);

        assert!(DefaultLiteralParser.parse("[1:0:3]").is_err());
    }

    #[test]
    fn spaced_complex_entries() {
        let rows = DefaultLiteralParser.parse("[1 + 2i 3]").unwrap();
        assert_eq!(rows[0], vec![c(1.0, 2.0), c(3.0, 0.0)]);
    }

    #[test]
    fn bare_scalar() {
        let rows = DefaultLiteralParser.parse(" 2-3i ").unwrap();
        assert_eq!(rows, vec![vec![c(2.0, -3.0)]]);
    }
}
