//! The UTS #46 IDNA mapping table.
//!
//! This file is also compiled into the build script, which uses [`MappingTable::new`] to verify
//! the generated data before it is written out. Anything that needs the generated data lives
//! behind `cfg(has_mapping_data)`.

#![cfg_attr(not(has_mapping_data), allow(dead_code))]

use core::fmt;

use thiserror::Error;

/// The highest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// IDNA2008 marker attached to [`Mapping::Valid`] entries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Idna2008Status {
    /// Valid under both UTS #46 and IDNA2008.
    #[default]
    Valid,
    /// `NV8`: valid under UTS #46 but not under IDNA2008.
    Nv8,
    /// `XV8`: excluded by IDNA2008, but kept valid for compatibility.
    Xv8,
}

/// The kind of a [`Mapping`], without its payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Valid,
    Ignored,
    Mapped,
    Deviation,
    Disallowed,
    DisallowedStd3Valid,
    DisallowedStd3Mapped,
}

/// The classification of a code point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mapping<'a> {
    Valid(Idna2008Status),
    Ignored,
    Mapped(&'a str),
    /// Replaced in transitional processing, kept in nontransitional processing.
    Deviation(&'a str),
    Disallowed,
    /// Valid unless STD3 ASCII rules are in effect.
    DisallowedStd3Valid,
    /// Mapped unless STD3 ASCII rules are in effect.
    DisallowedStd3Mapped(&'a str),
}

impl<'a> Mapping<'a> {
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Valid(_) => Kind::Valid,
            Self::Ignored => Kind::Ignored,
            Self::Mapped(_) => Kind::Mapped,
            Self::Deviation(_) => Kind::Deviation,
            Self::Disallowed => Kind::Disallowed,
            Self::DisallowedStd3Valid => Kind::DisallowedStd3Valid,
            Self::DisallowedStd3Mapped(_) => Kind::DisallowedStd3Mapped,
        }
    }

    /// The IDNA2008 marker, present only for valid code points.
    #[must_use]
    pub const fn status(&self) -> Option<Idna2008Status> {
        match self {
            Self::Valid(status) => Some(*status),
            _ => None,
        }
    }

    /// The replacement string, present for mapped, deviation and STD3-mapped code points.
    ///
    /// A deviation may have an empty replacement (ZWJ and ZWNJ map to nothing).
    #[must_use]
    pub const fn replacement(&self) -> Option<&'a str> {
        match self {
            Self::Mapped(s) | Self::Deviation(s) | Self::DisallowedStd3Mapped(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "valid",
            Self::Ignored => "ignored",
            Self::Mapped => "mapped",
            Self::Deviation => "deviation",
            Self::Disallowed => "disallowed",
            Self::DisallowedStd3Valid => "disallowed_STD3_valid",
            Self::DisallowedStd3Mapped => "disallowed_STD3_mapped",
        })
    }
}

/// An inclusive range of code points sharing one [`Mapping`].
///
/// Bounds are `u32` rather than `char` so that the surrogate block can be covered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MappingRange<'a> {
    pub start: u32,
    pub end: u32,
    pub mapping: Mapping<'a>,
}

impl<'a> MappingRange<'a> {
    #[must_use]
    pub const fn new(start: u32, end: u32, mapping: Mapping<'a>) -> Self {
        Self {
            start,
            end,
            mapping,
        }
    }

    #[must_use]
    pub const fn contains(&self, code_point: u32) -> bool {
        self.start <= code_point && code_point <= self.end
    }
}

/// A code point above [`MAX_CODE_POINT`] was looked up.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("{0:#X} is outside the Unicode code space")]
pub struct OutOfRange(pub u32);

/// The ranges handed to [`MappingTable::new`] do not cover the code space exactly once.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TableError {
    #[error("mapping table is empty")]
    Empty,
    #[error("range {start:#X}..={end:#X} ends before it starts")]
    Inverted { start: u32, end: u32 },
    #[error("no mapping for {expected:#X}..{found:#X}")]
    Gap { expected: u32, found: u32 },
    #[error("range starting at {found:#X} overlaps the previous range, expected {expected:#X}")]
    Overlap { expected: u32, found: u32 },
    #[error("mapping table ends at {end:#X}, expected {:#X}", MAX_CODE_POINT)]
    Incomplete { end: u32 },
    #[error("range ending at {end:#X} is outside the Unicode code space")]
    OutOfRange { end: u32 },
}

/// A sorted, gap-free, non-overlapping list of [`MappingRange`]s covering
/// `0..=MAX_CODE_POINT`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MappingTable<'a> {
    ranges: &'a [MappingRange<'a>],
}

impl<'a> MappingTable<'a> {
    /// Checks that `ranges` cover every code point exactly once, in order.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, see [`TableError`].
    pub fn new(ranges: &'a [MappingRange<'a>]) -> Result<Self, TableError> {
        let mut expected = 0;
        let mut end = None;

        for range in ranges {
            if range.start > range.end {
                return Err(TableError::Inverted {
                    start: range.start,
                    end: range.end,
                });
            }
            if range.end > MAX_CODE_POINT {
                return Err(TableError::OutOfRange { end: range.end });
            }
            if range.start < expected {
                return Err(TableError::Overlap {
                    expected,
                    found: range.start,
                });
            }
            if range.start > expected {
                return Err(TableError::Gap {
                    expected,
                    found: range.start,
                });
            }

            end = Some(range.end);
            expected = range.end + 1;
        }

        match end {
            None => Err(TableError::Empty),
            Some(MAX_CODE_POINT) => Ok(Self { ranges }),
            Some(end) => Err(TableError::Incomplete { end }),
        }
    }

    #[must_use]
    pub const fn ranges(&self) -> &'a [MappingRange<'a>] {
        self.ranges
    }
}

#[cfg(has_mapping_data)]
static UTS46: MappingTable<'static> = MappingTable {
    ranges: crate::data::MAPPING,
};

#[cfg(has_mapping_data)]
impl MappingTable<'static> {
    /// The table generated from `IdnaMappingTable.txt`, checked at build time.
    #[must_use]
    pub fn uts46() -> &'static Self {
        &UTS46
    }
}

#[cfg(has_mapping_data)]
impl<'a> MappingTable<'a> {
    /// Looks up the classification of `code_point`.
    ///
    /// # Errors
    ///
    /// Fails with [`OutOfRange`] if `code_point` is above [`MAX_CODE_POINT`].
    pub fn lookup(&self, code_point: u32) -> Result<Mapping<'a>, OutOfRange> {
        use core::cmp::Ordering;

        if code_point > MAX_CODE_POINT {
            return Err(OutOfRange(code_point));
        }

        // SAFETY: the table covers 0..=MAX_CODE_POINT, checked by `new` or the build script.
        let i = crate::unwrap!(self.ranges.binary_search_by(|range| {
            if range.contains(code_point) {
                Ordering::Equal
            } else if code_point < range.start {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }));

        Ok(self.ranges[i].mapping)
    }

    /// Like [`Self::lookup`], but a `char` is always in range.
    #[must_use]
    pub fn get(&self, c: char) -> Mapping<'a> {
        // SAFETY: a `char` is never above MAX_CODE_POINT.
        crate::unwrap!(self.lookup(c as u32))
    }
}

#[cfg(has_mapping_data)]
impl Mapping<'static> {
    /// Looks up `c` in the built-in UTS #46 table.
    #[must_use]
    pub fn of(c: char) -> Self {
        MappingTable::uts46().get(c)
    }
}

#[cfg(all(has_mapping_data, test))]
mod test {
    extern crate std;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::lowercase('a', Mapping::Valid(Idna2008Status::Valid))]
    #[case::uppercase('A', Mapping::Mapped("a"))]
    #[case::space(' ', Mapping::DisallowedStd3Valid)]
    #[case::sharp_s('ß', Mapping::Deviation("ss"))]
    #[case::final_sigma('ς', Mapping::Deviation("σ"))]
    #[case::zwj('\u{200D}', Mapping::Deviation(""))]
    #[case::soft_hyphen('\u{AD}', Mapping::Ignored)]
    #[case::nbsp('\u{A0}', Mapping::DisallowedStd3Mapped(" "))]
    #[case::ideographic_full_stop('\u{3002}', Mapping::Mapped("."))]
    #[case::fullwidth_full_stop('\u{FF0E}', Mapping::Mapped("."))]
    #[case::halfwidth_full_stop('\u{FF61}', Mapping::Mapped("."))]
    #[case::xv8('\u{19DA}', Mapping::Valid(Idna2008Status::Xv8))]
    #[case::private_use('\u{E000}', Mapping::Disallowed)]
    fn of(#[case] c: char, #[case] expected: Mapping<'static>) {
        assert_eq!(Mapping::of(c), expected);
    }

    #[rstest]
    #[case::valid(Mapping::Valid(Idna2008Status::Nv8), Kind::Valid, Some(Idna2008Status::Nv8), None)]
    #[case::mapped(Mapping::Mapped("a"), Kind::Mapped, None, Some("a"))]
    #[case::deviation(Mapping::Deviation(""), Kind::Deviation, None, Some(""))]
    #[case::std3_mapped(
        Mapping::DisallowedStd3Mapped(" "),
        Kind::DisallowedStd3Mapped,
        None,
        Some(" ")
    )]
    #[case::disallowed(Mapping::Disallowed, Kind::Disallowed, None, None)]
    fn accessors(
        #[case] mapping: Mapping<'static>,
        #[case] kind: Kind,
        #[case] status: Option<Idna2008Status>,
        #[case] replacement: Option<&str>,
    ) {
        assert_eq!(mapping.kind(), kind);
        assert_eq!(mapping.status(), status);
        assert_eq!(mapping.replacement(), replacement);
    }

    #[test]
    fn kind_names() {
        use std::string::ToString;

        assert_eq!(Kind::DisallowedStd3Valid.to_string(), "disallowed_STD3_valid");
        assert_eq!(Kind::Ignored.to_string(), "ignored");
    }

    #[test]
    fn surrogates_are_disallowed() {
        let table = MappingTable::uts46();
        for cp in 0xD800..=0xDFFF {
            assert_eq!(table.lookup(cp), Ok(Mapping::Disallowed));
        }
    }

    #[test]
    fn uts46_is_well_formed() {
        let ranges = MappingTable::uts46().ranges();
        assert_eq!(MappingTable::new(ranges), Ok(*MappingTable::uts46()));
    }

    #[test]
    fn adjacent_ranges_are_merged() {
        let ranges = MappingTable::uts46().ranges();
        for w in ranges.windows(2) {
            assert_ne!(w[0].mapping, w[1].mapping, "{:X?}", w);
        }
    }

    const PARTIAL: &[MappingRange<'static>] = &[
        MappingRange::new(0, 0x7F, Mapping::Disallowed),
        MappingRange::new(0x80, 0xFFFF, Mapping::Disallowed),
    ];

    #[rstest]
    #[case::empty(&[], TableError::Empty)]
    #[case::incomplete(PARTIAL, TableError::Incomplete { end: 0xFFFF })]
    #[case::late_start(
        &[MappingRange::new(1, MAX_CODE_POINT, Mapping::Ignored)],
        TableError::Gap { expected: 0, found: 1 }
    )]
    #[case::gap(
        &[
            MappingRange::new(0, 0x10, Mapping::Ignored),
            MappingRange::new(0x12, MAX_CODE_POINT, Mapping::Disallowed),
        ],
        TableError::Gap { expected: 0x11, found: 0x12 }
    )]
    #[case::overlap(
        &[
            MappingRange::new(0, 0x10, Mapping::Ignored),
            MappingRange::new(0x10, MAX_CODE_POINT, Mapping::Disallowed),
        ],
        TableError::Overlap { expected: 0x11, found: 0x10 }
    )]
    #[case::inverted(
        &[MappingRange::new(0x10, 0, Mapping::Ignored)],
        TableError::Inverted { start: 0x10, end: 0 }
    )]
    #[case::beyond(
        &[MappingRange::new(0, 0x11_0000, Mapping::Ignored)],
        TableError::OutOfRange { end: 0x11_0000 }
    )]
    fn rejects_malformed(
        #[case] ranges: &[MappingRange<'static>],
        #[case] expected: TableError,
    ) {
        assert_eq!(MappingTable::new(ranges), Err(expected));
    }

    #[test]
    fn lookup_out_of_range() {
        assert_eq!(
            MappingTable::uts46().lookup(0x11_0000),
            Err(OutOfRange(0x11_0000))
        );
    }
}
