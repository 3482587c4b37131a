//! Header line

use super::fields::{pad_left, pad_right};
use super::layout::Align;
use crate::core::aggregate::HeaderDescriptor;
use crate::domain::Cnpj;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of the header line before the terminator
pub const HEADER_WIDTH: usize = 132;

/// Start-of-header sentinel following the record-type marker
pub const HEADER_SENTINEL: &str = "#BPA#";

/// Kind of health secretariat receiving the file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationKind {
    #[default]
    #[serde(rename = "M")]
    Municipal,
    #[serde(rename = "E")]
    State,
}

impl DestinationKind {
    /// One-character flag written into the header
    pub fn flag(&self) -> char {
        match self {
            DestinationKind::Municipal => 'M',
            DestinationKind::State => 'E',
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}

impl FromStr for DestinationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M" => Ok(DestinationKind::Municipal),
            "E" => Ok(DestinationKind::State),
            other => Err(format!(
                "Destination kind must be 'M' (municipal) or 'E' (state), got '{other}'"
            )),
        }
    }
}

/// Who issues the file and who receives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIdentity {
    pub org_name: String,
    pub org_acronym: String,
    pub cnpj: Cnpj,
    pub destination_name: String,
    pub destination_kind: DestinationKind,
    pub version_tag: String,
}

struct HeaderField {
    name: &'static str,
    width: usize,
    align: Align,
}

const fn numeric(name: &'static str, width: usize) -> HeaderField {
    HeaderField {
        name,
        width,
        align: Align::Right,
    }
}

const fn text(name: &'static str, width: usize) -> HeaderField {
    HeaderField {
        name,
        width,
        align: Align::Left,
    }
}

const HEADER_FIELDS: [HeaderField; 13] = [
    text("cbc_hdr", 2),
    text("cbc_sentinel", 5),
    numeric("cbc_mvm", 6),
    numeric("cbc_lin", 6),
    numeric("cbc_flh", 6),
    numeric("cbc_smt_vrf", 4),
    text("cbc_rsp", 30),
    text("cbc_sgl", 6),
    numeric("cbc_cgccpf", 14),
    text("cbc_dst", 40),
    text("cbc_dst_in", 1),
    text("cbc_versao", 10),
    text("cbc_reservado", 2),
];

/// Builds the 132-character header line
///
/// Numeric slots are zero-filled on the left, text slots space-filled on the
/// right, and anything longer than its slot is cut to fit.
pub fn format_header(descriptor: &HeaderDescriptor, identity: &HeaderIdentity) -> String {
    let values = [
        "01".to_string(),
        HEADER_SENTINEL.to_string(),
        descriptor.competency.to_string(),
        descriptor.total_lines.to_string(),
        descriptor.total_pages.to_string(),
        descriptor.control.to_string(),
        identity.org_name.clone(),
        identity.org_acronym.clone(),
        identity.cnpj.as_str().to_string(),
        identity.destination_name.clone(),
        identity.destination_kind.flag().to_string(),
        identity.version_tag.clone(),
        String::new(),
    ];

    let mut line = String::with_capacity(HEADER_WIDTH);
    for (field, value) in HEADER_FIELDS.iter().zip(values.iter()) {
        let value: String = value.chars().filter(|c| !c.is_control()).collect();
        let token = match field.align {
            Align::Left => pad_right(&value, field.width, ' '),
            Align::Right => pad_left(&value, field.width, '0'),
        };
        tracing::trace!(field = field.name, token = %token, "header field");
        line.push_str(&token);
    }
    line
}
