//! Label validity criteria, UTS #46 section 4.1.

use unicode_bidi::{bidi_class, BidiClass};
use unicode_joining_type::{get_joining_type, JoiningType};
use unicode_normalization::char::{canonical_combining_class, is_combining_mark};

use crate::{Config, Idna2008Status, Mapping, Processing, Status};

const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';
/// Canonical_Combining_Class of a virama.
const VIRAMA: u8 = 9;

/// Checks a non-empty label, after mapping, normalization and Punycode decoding.
pub(crate) fn check_label(label: &str, config: &Config, processing: Processing) -> Status {
    let mut status = Status::empty();

    if config.check_hyphens {
        status |= check_hyphens(label);
    }
    if label.contains('.') {
        status |= Status::FULL_STOP;
    }
    if label.chars().next().is_some_and(is_combining_mark) {
        status |= Status::LEADING_COMBINING_MARK;
    }
    if !label.chars().all(|c| is_valid(c, config, processing)) {
        status |= Status::INVALID_CHARACTER;
    }
    if config.check_joiners && !passes_joiners(label) {
        status |= Status::CONTEXT_J;
    }

    status
}

fn check_hyphens(label: &str) -> Status {
    let mut status = Status::empty();

    if label.chars().skip(2).take(2).eq(['-', '-']) {
        status |= Status::HYPHEN_3_4;
    }
    if label.starts_with('-') || label.ends_with('-') {
        status |= Status::HYPHEN_START_END;
    }

    status
}

fn is_valid(c: char, config: &Config, processing: Processing) -> bool {
    // ASCII fast path
    if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
        return true;
    }

    match Mapping::of(c) {
        Mapping::Valid(Idna2008Status::Valid) => true,
        Mapping::Valid(Idna2008Status::Nv8 | Idna2008Status::Xv8) => !config.use_idna2008_rules,
        Mapping::Deviation(_) => processing == Processing::Nontransitional,
        Mapping::DisallowedStd3Valid => !config.use_std3_ascii_rules,
        _ => false,
    }
}

/// CONTEXTJ rules of RFC 5892, appendix A.1 and A.2.
fn passes_joiners(label: &str) -> bool {
    for (i, c) in label.char_indices() {
        if c != ZWNJ && c != ZWJ {
            continue;
        }

        let (head, tail) = (&label[..i], &label[i + c.len_utf8()..]);

        if head
            .chars()
            .next_back()
            .is_some_and(|prev| canonical_combining_class(prev) == VIRAMA)
        {
            continue;
        }
        // ZWJ only has the virama rule
        if c == ZWJ {
            return false;
        }

        let left = has_appropriately_joining_char(head.chars().rev(), |jt| {
            matches!(jt, JoiningType::LeftJoining | JoiningType::DualJoining)
        });
        let right = has_appropriately_joining_char(tail.chars(), |jt| {
            matches!(jt, JoiningType::RightJoining | JoiningType::DualJoining)
        });
        if !(left && right) {
            return false;
        }
    }

    true
}

fn has_appropriately_joining_char(
    iter: impl Iterator<Item = char>,
    wanted: impl Fn(JoiningType) -> bool,
) -> bool {
    for c in iter {
        let jt = get_joining_type(c);
        if wanted(jt) {
            return true;
        }
        if jt != JoiningType::Transparent {
            return false;
        }
    }
    false
}

/// A bidi domain name has at least one character of class R, AL or AN (RFC 5893 section 1.4).
pub(crate) fn is_bidi_domain<'a>(mut labels: impl Iterator<Item = &'a str>) -> bool {
    labels.any(|label| {
        label
            .chars()
            .any(|c| matches!(bidi_class(c), BidiClass::R | BidiClass::AL | BidiClass::AN))
    })
}

/// The Bidi Rule of RFC 5893 section 2.
pub(crate) fn passes_bidi(label: &str) -> bool {
    let Some(first) = label.chars().next() else {
        return true;
    };

    // the last character that is not NSM
    let last = label
        .chars()
        .rev()
        .map(bidi_class)
        .find(|class| *class != BidiClass::NSM);

    match bidi_class(first) {
        // RTL
        BidiClass::R | BidiClass::AL => {
            let mut found_en = false;
            let mut found_an = false;
            for class in label.chars().map(bidi_class) {
                match class {
                    BidiClass::EN => found_en = true,
                    BidiClass::AN => found_an = true,
                    BidiClass::R
                    | BidiClass::AL
                    | BidiClass::ES
                    | BidiClass::CS
                    | BidiClass::ET
                    | BidiClass::ON
                    | BidiClass::BN
                    | BidiClass::NSM => (),
                    _ => return false,
                }
            }

            matches!(
                last,
                Some(BidiClass::R | BidiClass::AL | BidiClass::EN | BidiClass::AN)
            ) && !(found_en && found_an)
        }

        // LTR
        BidiClass::L => {
            label.chars().map(bidi_class).all(|class| {
                matches!(
                    class,
                    BidiClass::L
                        | BidiClass::EN
                        | BidiClass::ES
                        | BidiClass::CS
                        | BidiClass::ET
                        | BidiClass::ON
                        | BidiClass::BN
                        | BidiClass::NSM
                )
            }) && matches!(last, Some(BidiClass::L | BidiClass::EN))
        }

        // the first character must be L, R or AL
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("example", Status::empty())]
    #[case::ace_like("ab--cd", Status::HYPHEN_3_4)]
    #[case::leading("-abc", Status::HYPHEN_START_END)]
    #[case::trailing("abc-", Status::HYPHEN_START_END)]
    #[case::both("ab--", Status::HYPHEN_3_4.union(Status::HYPHEN_START_END))]
    #[case::short("a-", Status::HYPHEN_START_END)]
    fn hyphens(#[case] label: &str, #[case] expected: Status) {
        assert_eq!(check_hyphens(label), expected);
    }

    #[rstest]
    #[case::full_stop("a.b", Processing::Nontransitional, Status::FULL_STOP)]
    #[case::deviation_kept("faß", Processing::Nontransitional, Status::empty())]
    #[case::deviation_invalid("faß", Processing::Transitional, Status::INVALID_CHARACTER)]
    #[case::uppercase("Fa", Processing::Nontransitional, Status::INVALID_CHARACTER)]
    #[case::combining_mark("\u{0301}a", Processing::Nontransitional, Status::LEADING_COMBINING_MARK)]
    fn check_labels(
        #[case] label: &str,
        #[case] processing: Processing,
        #[case] expected: Status,
    ) {
        assert_eq!(check_label(label, &Config::new(), processing), expected);
    }

    #[rstest]
    // ZWNJ after a virama
    #[case::zwnj_virama("\u{0915}\u{094D}\u{200C}\u{0937}", true)]
    // ZWJ after a virama
    #[case::zwj_virama("\u{0915}\u{094D}\u{200D}\u{0937}", true)]
    #[case::zwj_alone("a\u{200D}b", false)]
    #[case::zwnj_leading("\u{200C}a", false)]
    // ARABIC LETTER BEH (D) ZWNJ ARABIC LETTER BEH (D)
    #[case::zwnj_dual_joining("\u{0628}\u{200C}\u{0628}", true)]
    // ARABIC LETTER BEH (D) FATHA (T) ZWNJ ARABIC LETTER REH (R)
    #[case::zwnj_transparent("\u{0628}\u{064E}\u{200C}\u{0631}", true)]
    // ARABIC LETTER REH (R) ZWNJ ARABIC LETTER BEH (D)
    #[case::zwnj_right_joining_before("\u{0631}\u{200C}\u{0628}", false)]
    #[case::no_joiners("abc", true)]
    fn joiners(#[case] label: &str, #[case] expected: bool) {
        assert_eq!(passes_joiners(label), expected);
    }

    #[rstest]
    #[case::ltr("abc", true)]
    #[case::ltr_digit_end("abc1", true)]
    #[case::rtl("\u{05D0}\u{05D1}", true)]
    #[case::rtl_digit_end("\u{05D0}1", true)]
    #[case::rtl_mixed_numbers("\u{0627}1\u{0661}", false)]
    #[case::rtl_with_latin("\u{05D0}a", false)]
    #[case::ltr_with_hebrew("a\u{05D0}", false)]
    #[case::digit_first("1\u{05D0}", false)]
    #[case::empty("", true)]
    fn bidi(#[case] label: &str, #[case] expected: bool) {
        assert_eq!(passes_bidi(label), expected);
    }

    #[test]
    fn bidi_domain() {
        assert!(is_bidi_domain(["example", "\u{05D0}"].into_iter()));
        assert!(!is_bidi_domain(["example", "com"].into_iter()));
    }
}
