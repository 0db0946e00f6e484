use super::ast::{Arg, Expr, ParsedStatement};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, multispace1},
    combinator::{map, map_res, opt, recognize, value, verify},
    multi::{many0, separated_list1},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

// --- Helpers ---

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        |s: &str| s.to_string(),
    )(input)
}

fn usize_parser(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>())(input)
}

fn statement_end(input: &str) -> IResult<&str, char> {
    preceded(multispace0, char(';'))(input)
}

pub fn comment(input: &str) -> IResult<&str, ()> {
    value((), pair(tag("//"), take_while(|c: char| c != '\n')))(input)
}

// --- Expressions ---

fn factor(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        map(preceded(char('-'), factor), |e| Expr::Neg(Box::new(e))),
        delimited(char('('), expr, char(')')),
        value(Expr::Pi, verify(identifier, |s: &str| s == "pi")),
        map(double, Expr::Float),
    )))(input)
}

fn fold_binary(first: Expr, rest: Vec<(char, Expr)>) -> Expr {
    rest.into_iter().fold(first, |acc, (op, rhs)| {
        let (lhs, rhs) = (Box::new(acc), Box::new(rhs));
        match op {
            '+' => Expr::Add(lhs, rhs),
            '-' => Expr::Sub(lhs, rhs),
            '*' => Expr::Mul(lhs, rhs),
            _ => Expr::Div(lhs, rhs),
        }
    })
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, first) = factor(input)?;
    let (input, rest) = many0(pair(alt((char('*'), char('/'))), factor))(input)?;
    Ok((input, fold_binary(first, rest)))
}

pub fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(alt((char('+'), char('-'))), term))(input)?;
    Ok((input, fold_binary(first, rest)))
}

// --- QASM Parsers ---

pub fn openqasm_version(input: &str) -> IResult<&str, String> {
    map(
        tuple((
            tag("OPENQASM"),
            multispace1,
            take_while1(|c: char| c != ';' && !c.is_whitespace()),
            statement_end,
        )),
        |(_, _, version, _): (&str, &str, &str, char)| version.to_string(),
    )(input)
}

pub fn include(input: &str) -> IResult<&str, ParsedStatement> {
    map(
        tuple((
            tag("include"),
            multispace1,
            delimited(char('"'), take_while1(|c: char| c != '"'), char('"')),
            statement_end,
        )),
        |(_, _, file, _): (&str, &str, &str, char)| ParsedStatement::Include(file.to_string()),
    )(input)
}

fn register_decl<'a>(
    keyword: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, (String, usize)> {
    map(
        tuple((
            tag(keyword),
            multispace1,
            identifier,
            ws(delimited(char('['), ws(usize_parser), char(']'))),
            statement_end,
        )),
        |(_, _, name, size, _)| (name, size),
    )
}

pub fn qreg(input: &str) -> IResult<&str, ParsedStatement> {
    map(register_decl("qreg"), |(name, size)| {
        ParsedStatement::QReg(name, size)
    })(input)
}

pub fn creg(input: &str) -> IResult<&str, ParsedStatement> {
    map(register_decl("creg"), |(name, size)| {
        ParsedStatement::CReg(name, size)
    })(input)
}

/// `q[3]` or a bare register name `q`.
fn argument(input: &str) -> IResult<&str, Arg> {
    pair(
        ws(identifier),
        opt(terminated(
            delimited(char('['), ws(usize_parser), char(']')),
            multispace0,
        )),
    )(input)
}

fn argument_list(input: &str) -> IResult<&str, Vec<Arg>> {
    separated_list1(char(','), argument)(input)
}

pub fn gate_call(input: &str) -> IResult<&str, ParsedStatement> {
    let (input, name) = identifier(input)?;
    let (input, params) = opt(preceded(
        multispace0,
        delimited(char('('), separated_list1(char(','), expr), char(')')),
    ))(input)?;
    let (input, qubits) = argument_list(input)?;
    let (input, _) = statement_end(input)?;

    Ok((
        input,
        ParsedStatement::Gate(name, qubits, params.unwrap_or_default()),
    ))
}

pub fn measure(input: &str) -> IResult<&str, ParsedStatement> {
    map(
        tuple((
            tag("measure"),
            multispace1,
            argument,
            tag("->"),
            argument,
            statement_end,
        )),
        |(_, _, q, _, c, _)| ParsedStatement::Measure(q, c),
    )(input)
}

pub fn reset(input: &str) -> IResult<&str, ParsedStatement> {
    map(
        tuple((tag("reset"), multispace1, argument, statement_end)),
        |(_, _, q, _)| ParsedStatement::Reset(q),
    )(input)
}

pub fn barrier(input: &str) -> IResult<&str, ParsedStatement> {
    map(
        tuple((tag("barrier"), multispace1, argument_list, statement_end)),
        |(_, _, qubits, _)| ParsedStatement::Barrier(qubits),
    )(input)
}
