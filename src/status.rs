use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Everything that went wrong, or was worth noting, while processing a domain name.
    ///
    /// Processing never stops at the first problem, so several flags may be set at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u32 {
        /// A disallowed code point was found.
        const DISALLOWED = 1 << 0;
        /// A code point that is only valid without STD3 ASCII rules was found.
        const DISALLOWED_STD3_VALID = 1 << 1;
        /// A code point that is only mapped without STD3 ASCII rules was found.
        const DISALLOWED_STD3_MAPPED = 1 << 2;
        /// A deviation character was kept by nontransitional processing. Not an error.
        const DEVIATION = 1 << 3;
        /// The name is empty, or has an empty label other than the root.
        const EMPTY_LABEL = 1 << 4;
        /// A label could not be converted to or from Punycode.
        const PUNYCODE = 1 << 5;
        /// A decoded ACE label is not in NFC.
        const NOT_NFC = 1 << 6;
        /// A label has `--` in the third and fourth positions.
        const HYPHEN_3_4 = 1 << 7;
        /// A label starts or ends with `-`.
        const HYPHEN_START_END = 1 << 8;
        /// A decoded ACE label contains U+002E.
        const FULL_STOP = 1 << 9;
        /// A label starts with a combining mark.
        const LEADING_COMBINING_MARK = 1 << 10;
        /// A label contains a code point that is not valid for its processing mode.
        const INVALID_CHARACTER = 1 << 11;
        /// ZWJ or ZWNJ in a context not allowed by RFC 5892.
        const CONTEXT_J = 1 << 12;
        /// A label of a bidi domain name breaks RFC 5893.
        const BIDI = 1 << 13;
        /// A label is longer than 63 octets.
        const LABEL_TOO_LONG = 1 << 14;
        /// The name is longer than 253 octets.
        const DOMAIN_NAME_TOO_LONG = 1 << 15;
    }
}

const NAMES: [(Status, &str); 16] = [
    (Status::DISALLOWED, "disallowed"),
    (Status::DISALLOWED_STD3_VALID, "disallowed_STD3_valid"),
    (Status::DISALLOWED_STD3_MAPPED, "disallowed_STD3_mapped"),
    (Status::DEVIATION, "deviation"),
    (Status::EMPTY_LABEL, "empty_label"),
    (Status::PUNYCODE, "punycode"),
    (Status::NOT_NFC, "not_nfc"),
    (Status::HYPHEN_3_4, "hyphen_3_4"),
    (Status::HYPHEN_START_END, "hyphen_start_end"),
    (Status::FULL_STOP, "full_stop"),
    (Status::LEADING_COMBINING_MARK, "leading_combining_mark"),
    (Status::INVALID_CHARACTER, "invalid_character"),
    (Status::CONTEXT_J, "context_j"),
    (Status::BIDI, "bidi"),
    (Status::LABEL_TOO_LONG, "label_too_long"),
    (Status::DOMAIN_NAME_TOO_LONG, "domain_name_too_long"),
];

impl Status {
    /// Flags that are reported but do not make a result invalid.
    pub const INFORMATIONAL: Self = Self::DEVIATION;

    /// The flags that make a result invalid.
    #[must_use]
    pub const fn errors(self) -> Self {
        self.difference(Self::INFORMATIONAL)
    }

    #[must_use]
    pub const fn has_errors(self) -> bool {
        !self.errors().is_empty()
    }

    /// The lowercase name of each set flag, in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use rstest::rstest;

    use super::*;

    #[test]
    fn every_flag_is_named() {
        let named = NAMES.iter().fold(Status::empty(), |acc, (flag, _)| acc | *flag);
        assert_eq!(named, Status::all());
    }

    #[rstest]
    #[case::empty(Status::empty(), "[]")]
    #[case::one(Status::BIDI, "[bidi]")]
    #[case::ordered(Status::BIDI | Status::DISALLOWED, "[disallowed, bidi]")]
    fn display(#[case] status: Status, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
    }

    #[test]
    fn deviation_is_not_an_error() {
        assert!(!Status::DEVIATION.has_errors());
        assert_eq!(
            (Status::DEVIATION | Status::PUNYCODE).errors(),
            Status::PUNYCODE
        );
    }
}
