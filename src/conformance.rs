//! Replays the official UTS #46 test vectors (`IdnaTestV2.txt`) against a [`Config`].
//!
//! The test file lists, for every source string, the expected `toUnicode`, nontransitional
//! `toASCII` and transitional `toASCII` results together with the UTS #46 status codes each
//! one should report. A result expected to be valid must have no error and the exact value. A
//! result expected to be invalid must report at least one error, and at least one of its
//! errors must fall under a listed code. Implementations may be stricter than the file, so
//! extra errors are allowed.
//!
//! ```
//! use uts46::{conformance, Config};
//!
//! let vectors = conformance::parse_corpus("fass.de; ; ; ; ; ;\nfaß.de; ; ; xn--fa-hia.de; ; fass.de; ")?;
//! let outcomes = conformance::run(&vectors, &Config::default());
//! assert!(outcomes.iter().all(conformance::Outcome::passed));
//! # Ok::<(), conformance::ParseError>(())
//! ```

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::{fmt, str::FromStr};

use thiserror::Error;
use tracing::warn;

use crate::{Config, Processing, Status, TransformResult};

/// The codes each error flag falls under. A single letter stands for every code of that step.
const CATEGORIES: [(Status, &[&str]); 15] = [
    (Status::DISALLOWED, &["P1"]),
    (Status::DISALLOWED_STD3_VALID, &["P1", "U1"]),
    (Status::DISALLOWED_STD3_MAPPED, &["P1", "U1"]),
    (Status::EMPTY_LABEL, &["X4_2", "A4_1", "A4_2"]),
    (Status::PUNYCODE, &["P4", "A3"]),
    (Status::NOT_NFC, &["V1"]),
    (Status::HYPHEN_3_4, &["V2"]),
    (Status::HYPHEN_START_END, &["V3"]),
    (Status::FULL_STOP, &["V4"]),
    (Status::LEADING_COMBINING_MARK, &["V5"]),
    (Status::INVALID_CHARACTER, &["V6"]),
    (Status::CONTEXT_J, &["C"]),
    (Status::BIDI, &["B"]),
    (Status::LABEL_TOO_LONG, &["A4_2"]),
    (Status::DOMAIN_NAME_TOO_LONG, &["A4_1"]),
];

/// A status code from the test file, such as `P1`, `V6`, `B5` or `A4_2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `config` turns off the check that reports this code.
    #[must_use]
    pub fn is_ignored_by(&self, config: &Config) -> bool {
        let code = self.as_str();
        (!config.check_hyphens && matches!(code, "V2" | "V3"))
            || (!config.check_bidi && code.starts_with('B'))
            || (!config.check_joiners && code.starts_with('C'))
            || (!config.verify_dns_length && code.starts_with("A4"))
            || (!config.use_std3_ascii_rules && code == "U1")
    }

    /// Whether an error flag in `status`, reported by `operation`, falls under this code.
    ///
    /// Empty labels are `X4_2` for `toUnicode` and `A4_*` for `toASCII`.
    #[must_use]
    pub fn is_reported_by(&self, status: Status, operation: Operation) -> bool {
        let code = self.as_str();
        CATEGORIES
            .into_iter()
            .filter(|(flag, _)| status.contains(*flag))
            .flat_map(|(flag, patterns)| {
                patterns.iter().filter(move |pattern| {
                    flag != Status::EMPTY_LABEL
                        || pattern.starts_with('X') == (operation == Operation::ToUnicode)
                })
            })
            .any(|pattern| code == *pattern || (pattern.len() == 1 && code.starts_with(*pattern)))
    }
}

impl FromStr for Code {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let step = chars.next().ok_or(())?;
        let number = chars.as_str();

        let valid = matches!(step, 'A' | 'B' | 'C' | 'P' | 'U' | 'V' | 'X')
            && number.starts_with(|c: char| c.is_ascii_digit())
            && number.chars().all(|c| c.is_ascii_digit() || c == '_');

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a test vector allows an implementation to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expectation {
    /// No error, and the exact expected value.
    Success,
    /// At least one error.
    Failure,
    /// Every listed code belongs to a disabled check, so anything goes.
    Either,
}

/// The status codes listed for one operation of a test vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExpectedStatus(pub Vec<Code>);

impl ExpectedStatus {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn expectation(&self, config: &Config) -> Expectation {
        if self.is_empty() {
            Expectation::Success
        } else if self.0.iter().all(|code| code.is_ignored_by(config)) {
            Expectation::Either
        } else {
            Expectation::Failure
        }
    }
}

impl fmt::Display for ExpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{code}")?;
        }
        f.write_str("]")
    }
}

/// One line of the test file, with blank columns already filled in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestVector {
    /// 1-based line number in the test file.
    pub line: usize,
    pub source: String,
    pub to_unicode: String,
    pub to_unicode_status: ExpectedStatus,
    pub to_ascii_n: String,
    pub to_ascii_n_status: ExpectedStatus,
    pub to_ascii_t: String,
    pub to_ascii_t_status: ExpectedStatus,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected {expected} columns, found {found}", expected = COLUMNS)]
    MissingColumns { line: usize, found: usize },
    #[error("line {line}: invalid escape sequence '{escape}'")]
    InvalidEscape { line: usize, escape: String },
    #[error("line {line}: invalid status list '{status}'")]
    InvalidStatus { line: usize, status: String },
}

const COLUMNS: usize = 7;

/// Parses the whole test file, skipping comments and blank lines.
///
/// # Errors
///
/// Fails on the first malformed line.
pub fn parse_corpus(text: &str) -> Result<Vec<TestVector>, ParseError> {
    text.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| parse_line(n, line))
        .collect()
}

/// Parses one line of the test file.
///
/// # Errors
///
/// See [`ParseError`].
pub fn parse_line(line: usize, text: &str) -> Result<TestVector, ParseError> {
    let data = text.split_once('#').map_or(text, |(data, _)| data);
    let columns = data.split(';').map(str::trim).collect::<Vec<_>>();
    let Ok([source, to_unicode, to_unicode_status, to_ascii_n, to_ascii_n_status, to_ascii_t, to_ascii_t_status]) =
        <[&str; COLUMNS]>::try_from(columns.as_slice())
    else {
        return Err(ParseError::MissingColumns {
            line,
            found: columns.len(),
        });
    };

    let source = unescape(line, source)?;
    let to_unicode = non_blank(line, to_unicode)?.unwrap_or_else(|| source.clone());
    let to_unicode_status = parse_status(line, to_unicode_status)?.unwrap_or_default();
    let to_ascii_n = non_blank(line, to_ascii_n)?.unwrap_or_else(|| to_unicode.clone());
    let to_ascii_n_status =
        parse_status(line, to_ascii_n_status)?.unwrap_or_else(|| to_unicode_status.clone());
    let to_ascii_t = non_blank(line, to_ascii_t)?.unwrap_or_else(|| to_ascii_n.clone());
    let to_ascii_t_status =
        parse_status(line, to_ascii_t_status)?.unwrap_or_else(|| to_ascii_n_status.clone());

    Ok(TestVector {
        line,
        source,
        to_unicode,
        to_unicode_status,
        to_ascii_n,
        to_ascii_n_status,
        to_ascii_t,
        to_ascii_t_status,
    })
}

fn non_blank(line: usize, column: &str) -> Result<Option<String>, ParseError> {
    if column.is_empty() {
        Ok(None)
    } else {
        unescape(line, column).map(Some)
    }
}

fn parse_status(line: usize, column: &str) -> Result<Option<ExpectedStatus>, ParseError> {
    if column.is_empty() {
        return Ok(None);
    }

    let invalid = || ParseError::InvalidStatus {
        line,
        status: column.to_string(),
    };

    column
        .strip_prefix('[')
        .and_then(|x| x.strip_suffix(']'))
        .ok_or_else(invalid)?
        .split([',', ' '])
        .filter(|x| !x.is_empty())
        .map(|x| x.parse::<Code>().map_err(|()| invalid()))
        .collect::<Result<Vec<_>, _>>()
        .map(|codes| Some(ExpectedStatus(codes)))
}

/// Replaces `\uXXXX` and `\x{X...}` escapes.
///
/// Escapes of surrogates cannot be represented in a `String` and are kept as written.
fn unescape(line: usize, s: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(i) = rest.find('\\') {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];

        let (hex, len) = if let Some(x) = tail.strip_prefix("\\u") {
            (x.get(..4), 6)
        } else if let Some(x) = tail.strip_prefix("\\x{") {
            let end = x.find('}');
            (end.and_then(|end| x.get(..end)), end.map_or(0, |end| end + 4))
        } else {
            out.push('\\');
            rest = &tail[1..];
            continue;
        };

        let invalid = || ParseError::InvalidEscape {
            line,
            escape: tail.chars().take(len.max(2)).collect(),
        };
        let cp = hex
            .filter(|hex| !hex.is_empty())
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .ok_or_else(invalid)?;

        match char::from_u32(cp) {
            Some(c) => out.push(c),
            None if (0xD800..=0xDFFF).contains(&cp) => out.push_str(&tail[..len]),
            None => return Err(invalid()),
        }
        rest = &tail[len..];
    }

    out.push_str(rest);
    Ok(out)
}

/// The three operations each test vector checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ToUnicode,
    ToAsciiN,
    ToAsciiT,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ToUnicode => "toUnicode",
            Self::ToAsciiN => "toAsciiN",
            Self::ToAsciiT => "toAsciiT",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Errors were reported for a valid input.
    UnexpectedError,
    /// No error was reported for an invalid input.
    MissingError,
    /// Errors were reported for an invalid input, but none under the listed codes.
    WrongStatus,
    /// No error was reported, but the value is wrong.
    WrongValue { expected: String },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedError => f.write_str("unexpected error"),
            Self::MissingError => f.write_str("missing error"),
            Self::WrongStatus => f.write_str("errors match no expected code"),
            Self::WrongValue { expected } => write!(f, "expected '{expected}'"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: {operation}: {kind}, got '{actual}' {status}")]
pub struct Failure {
    pub line: usize,
    pub operation: Operation,
    pub kind: FailureKind,
    pub actual: String,
    pub status: Status,
}

/// The result of replaying one [`TestVector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<'a> {
    pub vector: &'a TestVector,
    pub failures: Vec<Failure>,
}

impl Outcome<'_> {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replays every vector. Never stops early.
#[must_use]
pub fn run<'a>(vectors: &'a [TestVector], config: &Config) -> Vec<Outcome<'a>> {
    vectors.iter().map(|vector| run_one(vector, config)).collect()
}

/// Replays one vector.
///
/// `toUnicode` and `toAsciiN` use nontransitional processing and `toAsciiT` transitional
/// processing, whatever `config` says. The other options are taken from `config`.
#[must_use]
pub fn run_one<'a>(vector: &'a TestVector, config: &Config) -> Outcome<'a> {
    let nontransitional = config.processing(Processing::Nontransitional);
    let transitional = config.processing(Processing::Transitional);

    let checks = [
        (
            Operation::ToUnicode,
            nontransitional.to_unicode(&vector.source),
            &vector.to_unicode,
            &vector.to_unicode_status,
        ),
        (
            Operation::ToAsciiN,
            nontransitional.to_ascii(&vector.source),
            &vector.to_ascii_n,
            &vector.to_ascii_n_status,
        ),
        (
            Operation::ToAsciiT,
            transitional.to_ascii(&vector.source),
            &vector.to_ascii_t,
            &vector.to_ascii_t_status,
        ),
    ];

    let failures = checks
        .into_iter()
        .filter_map(|(operation, result, expected, status)| {
            let kind = compare(&result, expected, status, operation, config)?;
            let failure = Failure {
                line: vector.line,
                operation,
                kind,
                actual: result.value.into_owned(),
                status: result.status,
            };
            warn!(expected = %status, "{failure}");
            Some(failure)
        })
        .collect();

    Outcome { vector, failures }
}

fn compare(
    result: &TransformResult<'_>,
    expected: &str,
    status: &ExpectedStatus,
    operation: Operation,
    config: &Config,
) -> Option<FailureKind> {
    match (status.expectation(config), result.is_ok()) {
        (Expectation::Success, false) => Some(FailureKind::UnexpectedError),
        (Expectation::Success, true) if result.value != expected => Some(FailureKind::WrongValue {
            expected: expected.to_string(),
        }),
        (Expectation::Failure, true) => Some(FailureKind::MissingError),
        (Expectation::Failure, false)
            if !status.0.iter().any(|code| {
                !code.is_ignored_by(config) && code.is_reported_by(result.status.errors(), operation)
            }) =>
        {
            Some(FailureKind::WrongStatus)
        }
        _ => None,
    }
}

/// Pass and fail counts over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Summary {
    pub vectors: usize,
    pub passed: usize,
    pub failed_checks: usize,
}

impl Summary {
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.vectors - self.passed
    }
}

impl From<&[Outcome<'_>]> for Summary {
    fn from(outcomes: &[Outcome<'_>]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            summary.vectors += 1;
            if outcome.passed() {
                summary.passed += 1;
            }
            summary.failed_checks += outcome.failures.len();
            summary
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} vectors passed, {} failed checks",
            self.passed, self.vectors, self.failed_checks
        )
    }
}
