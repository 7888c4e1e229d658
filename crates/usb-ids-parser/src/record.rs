//! Record types produced by the parser.

use std::collections::HashMap;
use std::fmt;

/// The taxonomy a record belongs to.
///
/// Every line is a `Device` line until a root line starts with one of the
/// section markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Vendors and their products
    #[default]
    Device,
    /// `C`: device classes, subclasses and protocols
    Class,
    /// `AT`: audio class terminal types
    AudioTerminal,
    /// `HID`: HID descriptor types
    HidDescriptor,
    /// `R`: HID descriptor item types
    HidItem,
    /// `BIAS`: physical descriptor bias types
    Bias,
    /// `PHY`: physical descriptor item types
    Physical,
    /// `HUT`: HID usages
    HidUsage,
    /// `L`: languages
    Language,
    /// `HCC`: HID descriptor country codes
    CountryCode,
    /// `VT`: video class terminal types
    VideoTerminal,
}

impl RecordType {
    /// Resolve a section marker, e.g. `"HID"`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let kind = match marker {
            "C" => Self::Class,
            "AT" => Self::AudioTerminal,
            "HID" => Self::HidDescriptor,
            "R" => Self::HidItem,
            "BIAS" => Self::Bias,
            "PHY" => Self::Physical,
            "HUT" => Self::HidUsage,
            "L" => Self::Language,
            "HCC" => Self::CountryCode,
            "VT" => Self::VideoTerminal,
            _ => return None,
        };
        Some(kind)
    }

    /// The section marker, `None` for device records.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Self::Device => None,
            Self::Class => Some("C"),
            Self::AudioTerminal => Some("AT"),
            Self::HidDescriptor => Some("HID"),
            Self::HidItem => Some("R"),
            Self::Bias => Some("BIAS"),
            Self::Physical => Some("PHY"),
            Self::HidUsage => Some("HUT"),
            Self::Language => Some("L"),
            Self::CountryCode => Some("HCC"),
            Self::VideoTerminal => Some("VT"),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker().unwrap_or("device"))
    }
}

/// One parsed line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Identifier token of this line (vendor id, product id, class code...)
    pub key: String,
    /// Free-text label after the key, may be empty
    pub value: String,
    /// Keys from the section root down to and including `key`
    pub path: Vec<String>,
    /// Taxonomy the line was read under
    pub kind: RecordType,
}

impl Record {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn is_root(&self) -> bool {
        self.path.len() == 1
    }
}

/// All records of a database, grouped by [`RecordType`].
///
/// Append-only; each group keeps source line order.
#[derive(Debug, Default)]
pub struct RecordCollection {
    by_kind: HashMap<RecordType, Vec<Record>>,
}

impl RecordCollection {
    pub fn push(&mut self, record: Record) {
        self.by_kind.entry(record.kind).or_default().push(record);
    }

    /// Records of one taxonomy in source order. Empty if none were read.
    pub fn records(&self, kind: RecordType) -> &[Record] {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Shorthand for `records(RecordType::Device)`.
    pub fn devices(&self) -> &[Record] {
        self.records(RecordType::Device)
    }

    /// Total number of records across all taxonomies.
    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.values().all(Vec::is_empty)
    }

    /// Taxonomies that have at least one record.
    pub fn kinds(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.by_kind.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordType, &[Record])> {
        self.by_kind.iter().map(|(kind, records)| (*kind, records.as_slice()))
    }
}
