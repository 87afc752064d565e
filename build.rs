use std::{
    env,
    fs::{self, File},
    io::Write,
    path::Path,
    str::FromStr,
};

use prettyplease::unparse;
use proc_macro2::{Span, TokenStream};
use quote::{quote, ToTokens};
use syn::{parse_quote, LitInt};
use thiserror::Error;

#[path = "src/mapping.rs"]
mod mapping;
use mapping::{Idna2008Status, Kind, Mapping, MappingRange, MappingTable};

const SOURCE: &str = "IdnaMappingTable.txt";

#[derive(Debug, Error)]
enum ReadLineError {
    #[error("line {0}: missing {1} field")]
    MissingField(usize, &'static str),
    #[error("line {0}: invalid code point '{1}'")]
    InvalidCodePoint(usize, String),
    #[error("line {0}: unknown status '{1}'")]
    UnknownStatus(usize, String),
    #[error("line {0}: unknown IDNA2008 status '{1}'")]
    UnknownIdna2008Status(usize, String),
}

struct ParseKind(Kind);

impl FromStr for ParseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid" => Ok(Self(Kind::Valid)),
            "ignored" => Ok(Self(Kind::Ignored)),
            "mapped" => Ok(Self(Kind::Mapped)),
            "deviation" => Ok(Self(Kind::Deviation)),
            "disallowed" => Ok(Self(Kind::Disallowed)),
            "disallowed_STD3_valid" => Ok(Self(Kind::DisallowedStd3Valid)),
            "disallowed_STD3_mapped" => Ok(Self(Kind::DisallowedStd3Mapped)),
            e => Err(e.to_string()),
        }
    }
}

struct ParseIdna2008Status(Idna2008Status);

impl FromStr for ParseIdna2008Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self(Idna2008Status::Valid)),
            "NV8" => Ok(Self(Idna2008Status::Nv8)),
            "XV8" => Ok(Self(Idna2008Status::Xv8)),
            e => Err(e.to_string()),
        }
    }
}

impl ToTokens for Idna2008Status {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let variant = format!("Idna2008Status::{self:?}");
        let token = variant.parse::<TokenStream>().unwrap();
        tokens.extend(quote!(#token));
    }
}

impl ToTokens for Mapping<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Mapping::Valid(status) => quote!(Mapping::Valid(#status)),
            Mapping::Ignored => quote!(Mapping::Ignored),
            Mapping::Mapped(s) => quote!(Mapping::Mapped(#s)),
            Mapping::Deviation(s) => quote!(Mapping::Deviation(#s)),
            Mapping::Disallowed => quote!(Mapping::Disallowed),
            Mapping::DisallowedStd3Valid => quote!(Mapping::DisallowedStd3Valid),
            Mapping::DisallowedStd3Mapped(s) => quote!(Mapping::DisallowedStd3Mapped(#s)),
        });
    }
}

impl ToTokens for MappingRange<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let (start, end, mapping) = (hex(self.start), hex(self.end), self.mapping);
        tokens.extend(quote!(MappingRange::new(#start, #end, #mapping)));
    }
}

fn hex(n: u32) -> LitInt {
    LitInt::new(&format!("{n:#06X}"), Span::call_site())
}

#[derive(Debug, Clone)]
struct IdnaMap {
    start: u32,
    end: u32,
    kind: Kind,
    map: String,
    idna2008: Idna2008Status,
}

impl IdnaMap {
    fn mapping(&self) -> Mapping<'_> {
        match self.kind {
            Kind::Valid => Mapping::Valid(self.idna2008),
            Kind::Ignored => Mapping::Ignored,
            Kind::Mapped => Mapping::Mapped(&self.map),
            Kind::Deviation => Mapping::Deviation(&self.map),
            Kind::Disallowed => Mapping::Disallowed,
            Kind::DisallowedStd3Valid => Mapping::DisallowedStd3Valid,
            Kind::DisallowedStd3Mapped => Mapping::DisallowedStd3Mapped(&self.map),
        }
    }

    fn to_range(&self) -> MappingRange<'_> {
        MappingRange::new(self.start, self.end, self.mapping())
    }

    /// Whether `next` starts right after `self` with the same classification.
    fn continues_with(&self, next: &Self) -> bool {
        self.end + 1 == next.start && self.mapping() == next.mapping()
    }
}

fn code_point(n: usize, s: &str) -> Result<u32, ReadLineError> {
    u32::from_str_radix(s, 16).map_err(|_| ReadLineError::InvalidCodePoint(n, s.to_string()))
}

fn read_line(n: usize, line: &str) -> Result<IdnaMap, ReadLineError> {
    let line = line.split_once('#').map_or(line, |(data, _)| data);
    let mut iter = line.split(';').map(str::trim);

    let range = iter
        .next()
        .ok_or(ReadLineError::MissingField(n, "code point"))?;
    let (start, end) = range.split_once("..").unwrap_or((range, range));
    let (start, end) = (code_point(n, start)?, code_point(n, end)?);

    let status = iter.next().ok_or(ReadLineError::MissingField(n, "status"))?;
    let ParseKind(kind) = status
        .parse()
        .map_err(|e| ReadLineError::UnknownStatus(n, e))?;

    let map = iter
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .map(|x| {
            code_point(n, x).and_then(|cp| {
                char::from_u32(cp).ok_or_else(|| ReadLineError::InvalidCodePoint(n, x.to_string()))
            })
        })
        .collect::<Result<String, _>>()?;

    let ParseIdna2008Status(idna2008) = iter
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| ReadLineError::UnknownIdna2008Status(n, e))?;

    Ok(IdnaMap {
        start,
        end,
        kind,
        map,
        idna2008,
    })
}

fn merge_ranges(ranges: Vec<IdnaMap>) -> Vec<IdnaMap> {
    let mut merged: Vec<IdnaMap> = Vec::with_capacity(ranges.len());

    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if last.continues_with(&range) {
                last.end = range.end;
                continue;
            }
        }
        merged.push(range);
    }

    merged
}

fn generate_data(path: &Path) -> Vec<IdnaMap> {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));

    let idna_maps = text
        .lines()
        .enumerate()
        .map(|(n, x)| (n + 1, x.trim()))
        .filter(|(_, x)| !x.is_empty() && !x.starts_with('#'))
        .map(|(n, x)| read_line(n, x))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| panic!("{SOURCE}: {e}"));

    for x in idna_maps.iter().filter(|x| !x.map.is_empty()) {
        if x.mapping().replacement().is_none() {
            println!(
                "cargo:warning=ignoring replacement of {} range: {:X}..={:X}",
                x.kind, x.start, x.end
            );
        }
    }

    merge_ranges(idna_maps)
}

fn main() {
    println!("cargo:rerun-if-changed={SOURCE}");
    println!("cargo:rerun-if-changed=src/mapping.rs");
    println!("cargo:rustc-cfg=has_mapping_data");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("failed to get manifest directory");
    let data = generate_data(&Path::new(&manifest_dir).join(SOURCE));

    let ranges = data.iter().map(IdnaMap::to_range).collect::<Vec<_>>();
    if let Err(e) = MappingTable::new(&ranges) {
        panic!("{SOURCE} does not cover the code space: {e}");
    }

    let tokens = parse_quote! {
        use crate::mapping::{Idna2008Status, Mapping, MappingRange};

        #[allow(clippy::unicode_not_nfc, clippy::unreadable_literal)]
        pub const MAPPING: &[MappingRange<'static>] = &[#(#ranges),*];
    };

    let pretty = unparse(&tokens);

    let out_dir = env::var("OUT_DIR").expect("failed to get target directory");
    let out_file = Path::new(&out_dir).join("data.rs");
    let mut out = File::create(out_file).expect("failed to create data.rs");

    out.write_all(pretty.as_bytes())
        .expect("failed to write pretty source");
}
