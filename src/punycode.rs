//! Punycode, the Bootstring profile for IDNA ([RFC 3492]).
//!
//! [RFC 3492]: https://www.rfc-editor.org/rfc/rfc3492

use core::cmp::Ordering;

extern crate alloc;
use alloc::{string::String, vec::Vec};

use thiserror::Error;

use crate::{_assert, _unreachable};

// Bootstring parameters for Punycode, RFC 3492 section 5.
const BASE: u32 = 36;
const T_MIN: u32 = 1;
const T_MAX: u32 = 26;
const SKEW: u32 = 38;
const DAMP: u32 = 700;
const INITIAL_BIAS: u32 = 72;
const INITIAL_N: u32 = 0x80;
const DELIMITER: char = '-';

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PunycodeError {
    /// The input is too long to be represented.
    #[error("overflow")]
    Overflow,
    #[error("bad input: {0}")]
    BadInput(#[from] BadInput),
}

/// Why a string is not valid Punycode.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum BadInput {
    #[error("'{0}' is not a base 36 digit")]
    InvalidDigit(char),
    #[error("incomplete digit sequence")]
    InvalidSequence,
    #[error("'{0}' before the last delimiter is not a basic code point")]
    NonBasic(char),
    #[error("integer overflow while decoding")]
    Overflow,
    #[error("decoded value {0:#X} is not a Unicode scalar value")]
    NotAScalar(u32),
}

/// Encodes Unicode as Punycode.
///
/// # Errors
///
/// Fails with [`PunycodeError::Overflow`] if `input` is too long to be represented. This never
/// happens for labels that fit in a DNS name.
///
/// # Examples
///
/// ```
/// # use uts46::punycode;
/// assert_eq!(punycode::encode("München").unwrap(), "Mnchen-3ya");
/// ```
pub fn encode(input: &str) -> Result<String, PunycodeError> {
    encode_slice(&input.chars().collect::<Vec<_>>())
}

/// Like [`encode`], for input that has already been split into `char`s.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_slice(input: &[char]) -> Result<String, PunycodeError> {
    let total = u32::try_from(input.len()).map_err(|_| PunycodeError::Overflow)?;

    let mut output = input.iter().filter(|c| c.is_ascii()).collect::<String>();
    // only ASCII so far, so bytes and chars agree
    let basic = u32::try_from(output.len()).map_err(|_| PunycodeError::Overflow)?;
    if basic > 0 {
        output.push(DELIMITER);
    }

    // every distinct non-basic code point, in the order they are inserted
    let mut pending = input
        .iter()
        .map(|&c| u32::from(c))
        .filter(|&c| c >= INITIAL_N)
        .collect::<Vec<_>>();
    pending.sort_unstable();
    pending.dedup();

    let mut n = INITIAL_N;
    let mut delta: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let mut handled = basic;

    for next in pending {
        // skip the insertions of n..next for every position seen so far
        delta = (next - n)
            .checked_mul(handled + 1)
            .and_then(|skipped| delta.checked_add(skipped))
            .ok_or(PunycodeError::Overflow)?;
        n = next;

        for &c in input {
            match u32::from(c).cmp(&n) {
                Ordering::Less => {
                    delta = delta.checked_add(1).ok_or(PunycodeError::Overflow)?;
                }
                Ordering::Equal => {
                    push_integer(&mut output, delta, bias);
                    bias = adapt(delta, handled + 1, handled == basic);
                    delta = 0;
                    handled += 1;
                }
                Ordering::Greater => (),
            }
        }

        delta = delta.checked_add(1).ok_or(PunycodeError::Overflow)?;
        n += 1;
    }

    _assert!(handled == total);

    Ok(output)
}

/// Writes `q` as a generalized variable-length integer.
fn push_integer(output: &mut String, mut q: u32, bias: u32) {
    let mut k = BASE;
    loop {
        let t = threshold(k, bias);
        if q < t {
            output.push(digit_char(q));
            return;
        }

        output.push(digit_char(t + (q - t) % (BASE - t)));
        q = (q - t) / (BASE - t);
        k += BASE;
    }
}

/// Decodes Punycode to Unicode.
///
/// Digits are case-insensitive. The case of basic code points is preserved.
///
/// # Errors
///
/// Fails with [`PunycodeError::BadInput`] if `input` is not valid Punycode.
///
/// # Examples
///
/// ```
/// # use uts46::punycode;
/// assert_eq!(punycode::decode("Mnchen-3ya").unwrap(), "München");
/// ```
pub fn decode(input: &str) -> Result<String, PunycodeError> {
    decode_to_vec(input).map(|x| x.into_iter().collect())
}

/// Like [`decode`], but returns the `char`s without collecting them into a `String`.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_to_vec(input: &str) -> Result<Vec<char>, PunycodeError> {
    let (basic, digits) = input
        .rsplit_once(DELIMITER)
        .unwrap_or(("", input));

    let mut output = basic
        .chars()
        .map(|c| if c.is_ascii() { Ok(c) } else { Err(BadInput::NonBasic(c)) })
        .collect::<Result<Vec<_>, _>>()?;
    let mut digits = digits.chars();

    let mut n = INITIAL_N;
    let mut i: u32 = 0;
    let mut bias = INITIAL_BIAS;

    while let Some(first) = digits.next() {
        let start = i;
        i = read_integer(first, &mut digits, i, bias)?;

        let len = u32::try_from(output.len() + 1).map_err(|_| BadInput::Overflow)?;
        bias = adapt(i - start, len, start == 0);
        n = n.checked_add(i / len).ok_or(BadInput::Overflow)?;
        i %= len;

        let c = char::from_u32(n).ok_or(BadInput::NotAScalar(n))?;
        output.insert(i as usize, c);
        i += 1;
    }

    Ok(output)
}

/// Reads one generalized variable-length integer starting with `first` and adds it to `i`.
fn read_integer(
    first: char,
    rest: &mut impl Iterator<Item = char>,
    mut i: u32,
    bias: u32,
) -> Result<u32, BadInput> {
    let mut c = first;
    let mut w: u32 = 1;
    let mut k = BASE;

    loop {
        let digit = digit_value(c).ok_or(BadInput::InvalidDigit(c))?;
        i = digit
            .checked_mul(w)
            .and_then(|x| i.checked_add(x))
            .ok_or(BadInput::Overflow)?;

        let t = threshold(k, bias);
        if digit < t {
            return Ok(i);
        }

        w = w.checked_mul(BASE - t).ok_or(BadInput::Overflow)?;
        k += BASE;
        c = rest.next().ok_or(BadInput::InvalidSequence)?;
    }
}

/// Bias adaptation, RFC 3492 section 6.1.
#[must_use]
const fn adapt(delta: u32, points: u32, first: bool) -> u32 {
    // SAFETY: callers pass a count of code points plus one.
    _assert!(points > 0);

    let mut delta = if first { delta / DAMP } else { delta / 2 };
    delta += delta / points;

    let mut k = 0;
    while delta > ((BASE - T_MIN) * T_MAX) / 2 {
        delta /= BASE - T_MIN;
        k += BASE;
    }
    k + ((BASE - T_MIN + 1) * delta) / (delta + SKEW)
}

/// The threshold `t` for position `k`, between `T_MIN` and `T_MAX`.
#[must_use]
const fn threshold(k: u32, bias: u32) -> u32 {
    let t = k.saturating_sub(bias);
    if t < T_MIN {
        T_MIN
    } else if t > T_MAX {
        T_MAX
    } else {
        t
    }
}

#[must_use]
const fn digit_value(c: char) -> Option<u32> {
    let c = c as u32;
    match c {
        0x61..=0x7A => Some(c - 0x61),      // a-z
        0x41..=0x5A => Some(c - 0x41),      // A-Z
        0x30..=0x39 => Some(c - 0x30 + 26), // 0-9
        _ => None,
    }
}

/// Lowercase digit for `d`, which is always below `BASE`.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
const fn digit_char(d: u32) -> char {
    let byte = match d {
        0..=25 => b'a' + d as u8,
        26..=35 => b'0' + (d - 26) as u8,
        // SAFETY: every caller reduces d modulo BASE or keeps it below the threshold
        _ => _unreachable!(),
    };
    byte as char
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::egyptian("ليهمابتكلموشعربي؟", "egbpdaj6bu4bxfgehfvwxn")]
    #[case::chinese_simplified("他们为什么不说中文", "ihqwcrb4cv8a8dqg056pqjye")]
    #[case::chinese_traditional("他們爲什麽不說中文", "ihqwctvzc91f659drss3x8bo0yb")]
    #[case::czech("Pročprostěnemluvíčesky", "Proprostnemluvesky-uyb24dma41a")]
    #[case::hebrew("למההםפשוטלאמדבריםעברית", "4dbcagdahymbxekheh6e0a7fei0b")]
    #[case::hindi(
        "यहलोगहिन्दीक्योंनहींबोलसकतेहैं",
        "i1baa7eci9glrd9b2ae1bj0hfcgg6iyaf8o0a1dig0cd"
    )]
    #[case::japanese(
        "なぜみんな日本語を話してくれないのか",
        "n8jok5ay5dzabd5bym9f0cm5685rrjetr6pdxa"
    )]
    #[case::korean(
        "세계의모든사람들이한국어를이해한다면얼마나좋을까",
        "989aomsvi5e83db1d2a355cv1e0vak1dwrv93d5xbh15a0dt30a5jpsd879ccm6fea98c"
    )]
    // RFC 3492 shows an uppercase D here, encoding always emits lowercase digits.
    #[case::russian("почемужеонинеговорятпорусски", "b1abfaaepdrnnbgefbadotcwatmq2g4l")]
    #[case::spanish(
        "PorquénopuedensimplementehablarenEspañol",
        "PorqunopuedensimplementehablarenEspaol-fmd56a"
    )]
    #[case::vietnamese(
        "TạisaohọkhôngthểchỉnóitiếngViệt",
        "TisaohkhngthchnitingVit-kjcr8268qyxafd2f1b9g"
    )]
    #[case::kinpachi("3年B組金八先生", "3B-ww4c5e180e575a65lsy2b")]
    #[case::super_monkeys(
        "安室奈美恵-with-SUPER-MONKEYS",
        "-with-SUPER-MONKEYS-pc58ag80a8qai00g7n9n"
    )]
    #[case::hello_another_way(
        "Hello-Another-Way-それぞれの場所",
        "Hello-Another-Way--fc4qua05auwb3674vfr0b"
    )]
    #[case::under_one_roof("ひとつ屋根の下2", "2-u9tlzr9756bt3uc0v")]
    #[case::takeuchi("MajiでKoiする5秒前", "MajiKoi5-783gue6qz075azm5e")]
    #[case::amiyumi("パフィーdeルンバ", "de-jg4avhby1noc0d")]
    #[case::at_light_speed("そのスピードで", "d9juau41awczczp")]
    #[case::money("-> $1.00 <-", "-> $1.00 <--")]
    #[case::bucher("bücher", "bcher-kva")]
    #[case::empty("", "")]
    #[case::emoji("🦀", "zs9h")]
    fn test_encode(#[case] input: &str, #[case] expected: &str) -> Result<(), PunycodeError> {
        assert_eq!(encode(input)?, expected);
        Ok(())
    }

    #[rstest]
    #[case::egyptian("egbpdaj6bu4bxfgehfvwxn", "ليهمابتكلموشعربي؟")]
    #[case::chinese_simplified("ihqwcrb4cv8a8dqg056pqjye", "他们为什么不说中文")]
    #[case::czech("Proprostnemluvesky-uyb24dma41a", "Pročprostěnemluvíčesky")]
    #[case::russian("b1abfaaepdrnnbgefbaDotcwatmq2g4l", "почемужеонинеговорятпорусски")]
    #[case::kinpachi("3B-ww4c5e180e575a65lsy2b", "3年B組金八先生")]
    #[case::super_monkeys(
        "-with-SUPER-MONKEYS-pc58ag80a8qai00g7n9n",
        "安室奈美恵-with-SUPER-MONKEYS"
    )]
    #[case::hello_another_way(
        "Hello-Another-Way--fc4qua05auwb3674vfr0b",
        "Hello-Another-Way-それぞれの場所"
    )]
    #[case::money("-> $1.00 <--", "-> $1.00 <-")]
    #[case::uppercase_digits("Bcher-KVA", "Bücher")]
    #[case::trailing_delimiter("abc-", "abc")]
    #[case::empty("", "")]
    #[case::emoji("zs9h", "🦀")]
    fn test_decode(#[case] input: &str, #[case] expected: &str) -> Result<(), PunycodeError> {
        assert_eq!(decode(input)?, expected);
        Ok(())
    }

    #[rstest]
    #[case::invalid_digit("a!", BadInput::InvalidDigit('!'))]
    #[case::truncated("9", BadInput::InvalidSequence)]
    #[case::truncated_group("zz", BadInput::InvalidSequence)]
    #[case::non_basic("ü-abc", BadInput::NonBasic('ü'))]
    #[case::overflow("99999999999999", BadInput::Overflow)]
    #[case::surrogate("ib9b", BadInput::NotAScalar(0xD800))]
    #[case::beyond_unicode("99999a", BadInput::NotAScalar(0x0048_A3C1))]
    fn decode_bad_input(#[case] input: &str, #[case] expected: BadInput) {
        assert_eq!(decode(input), Err(PunycodeError::BadInput(expected)));
    }

    #[test]
    fn encode_overflow() {
        let mut input = "a".repeat(4096);
        input.push('\u{10FFFF}');
        assert_eq!(encode(&input), Err(PunycodeError::Overflow));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            PunycodeError::from(BadInput::InvalidDigit('!')).to_string(),
            "bad input: '!' is not a base 36 digit"
        );
    }
}
