//! IDNA processing as defined by [UTS #46]: converting domain names between their Unicode form
//! and their ASCII-compatible (`xn--`) form.
//!
//! Processing never fails outright. Every operation returns the best-effort result together
//! with a [`Status`] describing every way the input departs from a valid domain name.
//!
//! ```
//! use uts46::{to_ascii, to_unicode, Processing, Status};
//!
//! let ascii = to_ascii("Bücher.example", Processing::Nontransitional);
//! assert!(ascii.is_ok());
//! assert_eq!(ascii.value, "xn--bcher-kva.example");
//!
//! let unicode = to_unicode("xn--bcher-kva.example");
//! assert_eq!(unicode.value, "bücher.example");
//!
//! assert!(to_ascii("a..b", Processing::Nontransitional)
//!     .status
//!     .contains(Status::EMPTY_LABEL));
//! ```
//!
//! [UTS #46]: https://www.unicode.org/reports/tr46/

#![no_std]
#![cfg_attr(feature = "forbid-unsafe", forbid(unsafe_code))]
#![warn(clippy::undocumented_unsafe_blocks, clippy::pedantic, clippy::nursery)]

extern crate alloc;
use alloc::{borrow::Cow, string::String, vec::Vec};

use thiserror::Error;
use tracing::{debug, trace};
use unicode_normalization::{is_nfc, is_nfc_quick, IsNormalized, UnicodeNormalization};

pub(crate) mod data {
    include!(concat!(env!("OUT_DIR"), "/data.rs"));
}

mod mapping;
pub use mapping::{
    Idna2008Status, Kind, Mapping, MappingRange, MappingTable, OutOfRange, TableError,
    MAX_CODE_POINT,
};

pub mod conformance;
pub mod punycode;

mod status;
pub use status::Status;

mod validate;

/// The prefix used before a punycode label.
pub const PREFIX: &str = "xn--";

/// Longest label allowed by DNS, in octets.
const MAX_LABEL_LEN: usize = 63;
/// Longest domain name allowed by DNS, in octets, without the root label.
const MAX_NAME_LEN: usize = 253;

macro_rules! unwrap {
    ($opt:expr) => {{
        #[cfg(feature = "forbid-unsafe")]
        {
            $opt.unwrap()
        }
        #[cfg(not(feature = "forbid-unsafe"))]
        #[allow(unused_unsafe, reason = "may be encased in an existing unsafe block")]
        {
            // SAFETY: Caller must verify this is safe.
            unsafe { $opt.unwrap_unchecked() }
        }
    }};
}
pub(crate) use unwrap;

macro_rules! _assert {
    ($cond:expr) => {{
        #[cfg(feature = "forbid-unsafe")]
        {
            assert!($cond);
        }
        #[cfg(not(feature = "forbid-unsafe"))]
        #[allow(unused_unsafe, reason = "may be encased in an existing unsafe block")]
        {
            // SAFETY: Caller must verify this is safe.
            unsafe { core::hint::assert_unchecked($cond) };
        }
    }};
}
pub(crate) use _assert;

macro_rules! _unreachable {
    () => {{
        #[cfg(feature = "forbid-unsafe")]
        {
            unreachable!()
        }
        #[cfg(not(feature = "forbid-unsafe"))]
        #[allow(unused_unsafe, reason = "may be encased in an existing unsafe block")]
        {
            // SAFETY: Caller must verify this is safe.
            unsafe { core::hint::unreachable_unchecked() }
        }
    }};
}
pub(crate) use _unreachable;

/// How deviation characters (ß, ς, ZWJ and ZWNJ) are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Processing {
    /// Map deviations to their IDNA2003 replacements.
    Transitional,
    /// Keep deviations as they are.
    #[default]
    Nontransitional,
}

/// Processing options.
///
/// The default is the strictest setting, which is the one the official conformance tests are
/// written for: nontransitional processing, STD3 ASCII rules, and every check enabled except
/// [`Config::use_idna2008_rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct Config {
    pub(crate) processing: Processing,
    pub(crate) use_std3_ascii_rules: bool,
    pub(crate) check_hyphens: bool,
    pub(crate) check_bidi: bool,
    pub(crate) check_joiners: bool,
    pub(crate) verify_dns_length: bool,
    pub(crate) use_idna2008_rules: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            processing: Processing::Nontransitional,
            use_std3_ascii_rules: true,
            check_hyphens: true,
            check_bidi: true,
            check_joiners: true,
            verify_dns_length: true,
            use_idna2008_rules: false,
        }
    }

    #[must_use]
    pub const fn processing(mut self, value: Processing) -> Self {
        self.processing = value;
        self
    }

    /// Forbid the ASCII code points that are not letters, digits or hyphens.
    #[must_use]
    pub const fn use_std3_ascii_rules(mut self, value: bool) -> Self {
        self.use_std3_ascii_rules = value;
        self
    }

    #[must_use]
    pub const fn check_hyphens(mut self, value: bool) -> Self {
        self.check_hyphens = value;
        self
    }

    #[must_use]
    pub const fn check_bidi(mut self, value: bool) -> Self {
        self.check_bidi = value;
        self
    }

    #[must_use]
    pub const fn check_joiners(mut self, value: bool) -> Self {
        self.check_joiners = value;
        self
    }

    /// Check label and domain name lengths in [`Config::to_ascii`].
    #[must_use]
    pub const fn verify_dns_length(mut self, value: bool) -> Self {
        self.verify_dns_length = value;
        self
    }

    /// Treat code points marked `NV8` or `XV8` as invalid.
    #[must_use]
    pub const fn use_idna2008_rules(mut self, value: bool) -> Self {
        self.use_idna2008_rules = value;
        self
    }

    /// Converts a domain name to its Unicode form.
    pub fn to_unicode<'a>(&self, domain: &'a str) -> TransformResult<'a> {
        let mut status = Status::empty();
        let mapped = self.map_normalize(domain, &mut status);
        let labels = self.process(&mapped, &mut status);

        let value = if labels.iter().any(|label| matches!(label, Cow::Owned(_))) {
            Cow::Owned(labels.join("."))
        } else {
            drop(labels);
            mapped
        };

        TransformResult { value, status }
    }

    /// Converts a domain name to its ASCII form.
    pub fn to_ascii<'a>(&self, domain: &'a str) -> TransformResult<'a> {
        let mut status = Status::empty();
        let mapped = self.map_normalize(domain, &mut status);
        let labels = self.process(&mapped, &mut status);

        let value = if mapped.is_ascii() && !labels.iter().any(|l| matches!(l, Cow::Owned(_))) {
            drop(labels);
            mapped
        } else {
            let mut ret = String::with_capacity(mapped.len());
            for (i, label) in labels.iter().enumerate() {
                if i > 0 {
                    ret.push('.');
                }

                if label.is_ascii() {
                    ret.push_str(label);
                    continue;
                }

                match punycode::encode(label) {
                    Ok(encoded) => {
                        ret.push_str(PREFIX);
                        ret.push_str(&encoded);
                    }
                    Err(e) => {
                        debug!(label = &**label, error = %e, "failed to encode label");
                        status |= Status::PUNYCODE;
                        ret.push_str(label);
                    }
                }
            }
            Cow::Owned(ret)
        };

        if self.verify_dns_length {
            status |= check_dns_length(&value);
        }

        if status.has_errors() {
            trace!(domain, %status, "to_ascii");
        }

        TransformResult { value, status }
    }

    fn map_normalize<'a>(&self, domain: &'a str, status: &mut Status) -> Cow<'a, str> {
        let mut s = self.map(domain, status);

        if is_nfc_quick(s.chars()) != IsNormalized::Yes {
            s = Cow::Owned(s.nfc().collect());
        }

        s
    }

    fn map<'a>(&self, domain: &'a str, status: &mut Status) -> Cow<'a, str> {
        let mut chars = domain.char_indices();

        while let Some((i, c)) = chars.next() {
            let Some(replacement) = self.map_char(c, status) else {
                continue;
            };

            let mut new = String::with_capacity(domain.len());
            new.push_str(&domain[..i]);
            new.push_str(replacement);
            for (_, c) in chars.by_ref() {
                match self.map_char(c, status) {
                    Some(replacement) => new.push_str(replacement),
                    None => new.push(c),
                }
            }
            return Cow::Owned(new);
        }

        Cow::Borrowed(domain)
    }

    /// Returns the replacement for `c`, or `None` if `c` is kept as is.
    fn map_char(&self, c: char, status: &mut Status) -> Option<&'static str> {
        // ASCII fast path
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.' {
            return None;
        }

        match Mapping::of(c) {
            Mapping::Valid(_) => None,
            Mapping::Ignored => Some(""),
            Mapping::Mapped(r) => Some(r),
            Mapping::Deviation(r) => match self.processing {
                Processing::Transitional => Some(r),
                Processing::Nontransitional => {
                    *status |= Status::DEVIATION;
                    None
                }
            },
            Mapping::Disallowed => {
                *status |= Status::DISALLOWED;
                None
            }
            Mapping::DisallowedStd3Valid => {
                if self.use_std3_ascii_rules {
                    *status |= Status::DISALLOWED_STD3_VALID;
                }
                None
            }
            Mapping::DisallowedStd3Mapped(r) => {
                if self.use_std3_ascii_rules {
                    *status |= Status::DISALLOWED_STD3_MAPPED;
                    None
                } else {
                    Some(r)
                }
            }
        }
    }

    /// Breaks a mapped and normalized domain name into labels, decoding and validating each.
    fn process<'a>(&self, mapped: &'a str, status: &mut Status) -> Vec<Cow<'a, str>> {
        let mut labels = Vec::new();

        for label in mapped.split('.') {
            let Some(encoded) = label.strip_prefix(PREFIX) else {
                if !label.is_empty() {
                    *status |= validate::check_label(label, self, self.processing);
                }
                labels.push(Cow::Borrowed(label));
                continue;
            };

            match punycode::decode(encoded) {
                // an ACE label never stands for the empty label
                Ok(decoded) if decoded.is_empty() => {
                    debug!(label, "label decodes to nothing");
                    *status |= Status::PUNYCODE;
                    labels.push(Cow::Borrowed(label));
                }
                Ok(decoded) => {
                    if !is_nfc(&decoded) {
                        *status |= Status::NOT_NFC;
                    }
                    // decoded labels are always validated nontransitionally
                    *status |= validate::check_label(&decoded, self, Processing::Nontransitional);
                    labels.push(Cow::Owned(decoded));
                }
                Err(e) => {
                    debug!(label, error = %e, "failed to decode label");
                    *status |= Status::PUNYCODE;
                    labels.push(Cow::Borrowed(label));
                }
            }
        }

        if self.check_bidi
            && validate::is_bidi_domain(labels.iter().map(|label| &**label))
            && !labels.iter().all(|label| validate::passes_bidi(label))
        {
            *status |= Status::BIDI;
        }

        // only the root label may be empty
        if let Some((_, init)) = labels.split_last() {
            if mapped.is_empty() || init.iter().any(|label| label.is_empty()) {
                *status |= Status::EMPTY_LABEL;
            }
        }

        labels
    }
}

fn check_dns_length(name: &str) -> Status {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Status::EMPTY_LABEL;
    }

    let mut status = Status::empty();
    if name.len() > MAX_NAME_LEN {
        status |= Status::DOMAIN_NAME_TOO_LONG;
    }
    if name.split('.').any(|label| label.len() > MAX_LABEL_LEN) {
        status |= Status::LABEL_TOO_LONG;
    }
    status
}

/// The output of [`Config::to_unicode`] and [`Config::to_ascii`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult<'a> {
    /// The converted domain name. Invalid parts are passed through unchanged.
    pub value: Cow<'a, str>,
    pub status: Status,
}

impl<'a> TransformResult<'a> {
    /// `true` if no error was recorded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        !self.status.has_errors()
    }

    /// Rejects the result if any error was recorded.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessingError`] carrying the best-effort value and the errors.
    pub fn into_result(self) -> Result<Cow<'a, str>, ProcessingError> {
        if self.is_ok() {
            Ok(self.value)
        } else {
            Err(ProcessingError {
                value: self.value.into_owned(),
                status: self.status.errors(),
            })
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid domain name '{value}': {status}")]
pub struct ProcessingError {
    pub value: String,
    pub status: Status,
}

/// Converts `domain` to Unicode using the default [`Config`].
#[must_use]
pub fn to_unicode(domain: &str) -> TransformResult<'_> {
    Config::new().to_unicode(domain)
}

/// Converts `domain` to ASCII using the default [`Config`] and the given processing.
#[must_use]
pub fn to_ascii(domain: &str, processing: Processing) -> TransformResult<'_> {
    Config::new().processing(processing).to_ascii(domain)
}
