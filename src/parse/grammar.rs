use winnow::ascii::dec_int;
use winnow::combinator::{alt, cut_err, delimited, fail, not, opt, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::stream::Stateful;
use winnow::token::{any, one_of, take_while};

use crate::{Expr, Value};

const KEYWORDS: &[&str] = &["and", "AND", "or", "OR", "not", "NOT", "true", "false"];

/// Deepest allowed nesting of parentheses and negations.
pub const MAX_NESTING: usize = 128;

const NESTING: StrContext = StrContext::Label("nesting depth");

/// Rule text paired with the current nesting depth.
pub(crate) type Input<'i> = Stateful<&'i str, usize>;

pub(crate) fn input(text: &str) -> Input<'_> {
    Stateful {
        input: text,
        state: 0,
    }
}

/// Whether a parse failed on [`MAX_NESTING`] rather than on bad syntax.
pub(crate) fn nesting_exceeded(error: &ContextError) -> bool {
    error.context().any(|c| *c == NESTING)
}

/// Whether `name` can be written as a field reference in rule text.
pub(crate) fn is_identifier(name: &str) -> bool {
    ident.parse(input(name)).is_ok()
}

// -- Whitespace & words -----------------------------------------------------

fn ws(input: &mut Input<'_>) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// A keyword that must not run on into an identifier (`not` but not `notify`).
fn word<'i>(w: &'static str) -> impl Parser<Input<'i>, (), ErrMode<ContextError>> {
    terminated(w, not(one_of(is_ident_char))).void()
}

/// Run `inner` one nesting level deeper, failing hard past [`MAX_NESTING`].
fn nested<'i, O>(
    input: &mut Input<'i>,
    inner: impl FnOnce(&mut Input<'i>) -> ModalResult<O>,
) -> ModalResult<O> {
    if input.state >= MAX_NESTING {
        return cut_err(fail.context(NESTING)).parse_next(input);
    }
    input.state += 1;
    let result = inner(input);
    input.state -= 1;
    result
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut Input<'i>) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .verify(|name: &str| !KEYWORDS.contains(&name))
        .context(StrContext::Expected(StrContextValue::Description(
            "field name",
        )))
        .parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut Input<'_>) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn value(input: &mut Input<'_>) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        word("true").value(Value::Bool(true)),
        word("false").value(Value::Bool(false)),
        dec_int::<_, i64, _>.map(Value::Int),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "literal value",
    )))
    .parse_next(input)
}

// -- Operators --------------------------------------------------------------

fn and_op(input: &mut Input<'_>) -> ModalResult<()> {
    ws.parse_next(input)?;
    alt(("&&".void(), word("and"), word("AND"))).parse_next(input)
}

fn or_op(input: &mut Input<'_>) -> ModalResult<()> {
    ws.parse_next(input)?;
    alt(("||".void(), word("or"), word("OR"))).parse_next(input)
}

fn not_op(input: &mut Input<'_>) -> ModalResult<()> {
    alt(("!".void(), word("not"), word("NOT"))).parse_next(input)
}

// -- Expressions (precedence: OR < AND < NOT < primary) ---------------------

fn primary(input: &mut Input<'_>) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited(
            '(',
            group,
            (
                ws,
                cut_err(')').context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
            ),
        ),
        comparison_or_flag,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

/// The inside of a parenthesised group, one nesting level down.
fn group(input: &mut Input<'_>) -> ModalResult<Expr> {
    nested(input, |i| cut_err(expr).parse_next(i))
}

fn comparison_or_flag(input: &mut Input<'_>) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    if opt(preceded(ws, "==")).parse_next(input)?.is_some() {
        let val = cut_err(value).parse_next(input)?;
        Ok(Expr::Eq {
            field: name.to_owned(),
            value: val,
        })
    } else {
        Ok(Expr::Flag(name.to_owned()))
    }
}

fn unary(input: &mut Input<'_>) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    if opt(not_op).parse_next(input)?.is_some() {
        let inner = nested(input, |i| cut_err(unary).parse_next(i))?;
        Ok(Expr::Not(Box::new(inner)))
    } else {
        primary(input)
    }
}

/// Join a run of same-operator operands into a balanced tree, so a long
/// `a and b and c ...` chain stays shallow. Operand order is preserved.
fn balance(first: Expr, mut rest: Vec<Expr>, join: fn(Expr, Expr) -> Expr) -> Expr {
    if rest.is_empty() {
        return first;
    }
    let left_len = (rest.len() + 1).div_ceil(2);
    let mut right = rest.split_off(left_len - 1).into_iter();
    let left = balance(first, rest, join);
    match right.next() {
        Some(head) => join(left, balance(head, right.collect(), join)),
        None => left,
    }
}

fn and_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<Expr> = repeat(0.., preceded(and_op, cut_err(unary))).parse_next(input)?;
    Ok(balance(first, rest, Expr::and))
}

fn or_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> = repeat(0.., preceded(or_op, cut_err(and_expr))).parse_next(input)?;
    Ok(balance(first, rest, Expr::or))
}

fn expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub(crate) fn rule_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let parsed = expr.parse_next(input)?;
    ws.parse_next(input)?;
    Ok(parsed)
}
