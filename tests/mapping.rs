use uts46::{Kind, Mapping, MappingTable, OutOfRange, MAX_CODE_POINT};

/// Every code point is covered by exactly one range.
#[test]
fn total() {
    let table = MappingTable::uts46();

    for cp in 0..=MAX_CODE_POINT {
        let mapping = table.lookup(cp).unwrap();
        if let Some(c) = char::from_u32(cp) {
            assert_eq!(Mapping::of(c), mapping);
        } else {
            assert_eq!(mapping.kind(), Kind::Disallowed, "{cp:#X}");
        }
    }
}

#[test]
fn out_of_range() {
    let table = MappingTable::uts46();
    assert_eq!(table.lookup(MAX_CODE_POINT + 1), Err(OutOfRange(0x11_0000)));
    assert_eq!(table.lookup(u32::MAX), Err(OutOfRange(u32::MAX)));
}

#[test]
fn sharp_s() {
    assert_eq!(
        MappingTable::uts46().lookup(0xDF),
        Ok(Mapping::Deviation("ss"))
    );
}

#[test]
fn replacements_are_mapped() {
    for range in MappingTable::uts46().ranges() {
        let Some(replacement) = range.mapping.replacement() else {
            continue;
        };

        // a replacement never needs mapping again, with the exception of deviations
        for c in replacement.chars() {
            assert!(
                !matches!(
                    Mapping::of(c),
                    Mapping::Mapped(_) | Mapping::Ignored | Mapping::DisallowedStd3Mapped(_)
                ),
                "{:#X}..={:#X} maps to {c:?}",
                range.start,
                range.end
            );
        }
    }
}
