//! Detail-line layouts
//!
//! Each layout version is a static table of [`FieldSpec`]s in column order.
//! A field names its 1-based start column, width, alignment, fill character
//! and the [`Rule`] that produces its content from a record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source column aliases, tried in order
pub mod columns {
    pub const PROFESSIONAL_CNS: &[&str] = &["cns_profissional", "cns_medico"];
    pub const OCCUPATION: &[&str] = &["cod_cbo_resp", "cod_cbo", "cbo", "cod_cbo_lanc"];
    pub const SERVICE_DATE: &[&str] = &[
        "data_atendimento",
        "data_lancamento",
        "data_procedimento",
        "data",
    ];
    pub const PROCEDURE: &[&str] = &["cod_procedimento", "procedimento", "cod_proc"];
    pub const PATIENT_CNS: &[&str] = &["cns_paciente", "cns_paciente_alt"];
    pub const SEX: &[&str] = &["sexo"];
    pub const MUNICIPALITY: &[&str] = &["municipio_codigo", "cod_ibge", "ibge"];
    pub const DIAGNOSIS: &[&str] = &["cid10", "cid", "cod_cid"];
    pub const AGE: &[&str] = &["idade"];
    pub const QUANTITY: &[&str] = &["quantidade"];
    pub const CARE_CHARACTER: &[&str] = &["carater_atend", "carater_atendimento"];
    pub const AUTHORIZATION: &[&str] = &["num_autorizacao"];
    pub const PATIENT_NAME: &[&str] = &["nome_paciente"];
    pub const BIRTH_DATE: &[&str] = &["data_nascimento"];
    pub const RACE: &[&str] = &["raca"];
    pub const ETHNICITY: &[&str] = &["etnia"];
    pub const TEAM_SEQUENCE: &[&str] = &["equipe_seq"];
    pub const TEAM_AREA: &[&str] = &["equipe_area"];
    pub const MANUFACTURER_CNPJ: &[&str] = &["cnpj_fabricante", "cnpj_fabricante_aih"];
    pub const POSTAL_CODE: &[&str] = &["cep_paciente", "cep_endereco", "cep"];
    pub const STREET_TYPE: &[&str] = &["tipo_logradouro"];
    pub const STREET: &[&str] = &["endereco", "logradouro"];
    pub const COMPLEMENT: &[&str] = &["complemento"];
    pub const STREET_NUMBER: &[&str] = &["numero_endereco"];
    pub const NEIGHBORHOOD: &[&str] = &["bairro"];
    pub const PHONE: &[&str] = &["telefone_celular", "telefone_residencial", "telefone"];
    pub const EMAIL: &[&str] = &["email"];
    pub const TEAM_INE: &[&str] = &["ine"];
    pub const PATIENT_CPF: &[&str] = &["cpf_paciente", "cpf"];
}

/// Side a value is aligned to inside its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Value first, fill on the right; overflow cut on the right
    Left,
    /// Fill first, value on the right; overflow cut on the left
    Right,
}

/// How a field's content is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Fixed literal
    Constant(&'static str),
    /// Reserved blanks
    Filler,
    /// Facility CNES from configuration
    FacilityCode,
    /// Competency period of the batch
    Competency,
    /// Page number derived from the record index
    Page,
    /// Sequence within the page derived from the record index
    Sequence,
    /// Digits, zero-filled when absent
    Numeric(&'static [&'static str]),
    /// Digits, blank when absent
    NumericOrBlank(&'static [&'static str]),
    /// Digits left-aligned, blank when absent
    DigitsLeft(&'static [&'static str]),
    /// Letters and digits only
    Alphanumeric(&'static [&'static str]),
    /// Free text
    Text(&'static [&'static str]),
    /// `YYYYMMDD`, zeros when absent
    Date(&'static [&'static str]),
    /// Diagnosis code without punctuation
    Diagnosis(&'static [&'static str]),
    /// `M` / `F` flag
    Sex,
    /// Supplied or derived age
    Age,
    /// Quantity with two implied decimals
    Quantity,
    /// Race code lookup
    Race,
    /// Ethnicity, only for the indigenous race
    Ethnicity,
    /// Street-type code lookup
    StreetType,
    /// House number with the no-number literal
    StreetNumber,
}

/// One positional field of a fixed-width line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// 1-based first column
    pub start: usize,
    pub width: usize,
    pub align: Align,
    pub fill: char,
    pub rule: Rule,
}

impl FieldSpec {
    const fn right(name: &'static str, start: usize, width: usize, rule: Rule) -> Self {
        Self {
            name,
            start,
            width,
            align: Align::Right,
            fill: '0',
            rule,
        }
    }

    const fn left(name: &'static str, start: usize, width: usize, rule: Rule) -> Self {
        Self {
            name,
            start,
            width,
            align: Align::Left,
            fill: ' ',
            rule,
        }
    }

    /// Last column occupied (1-based, inclusive)
    pub fn end(&self) -> usize {
        self.start + self.width - 1
    }

    /// Forces a token into this slot using the field's alignment and fill
    pub fn fit(&self, token: &str) -> String {
        match self.align {
            Align::Left => super::fields::pad_right(token, self.width, self.fill),
            Align::Right => super::fields::pad_left(token, self.width, self.fill),
        }
    }
}

use columns as c;

/// Columns shared by both layout versions (1..=156)
macro_rules! common_fields {
    () => {
        [
            FieldSpec::left("prd_ident", 1, 2, Rule::Constant("03")),
            FieldSpec::right("prd_cnes", 3, 7, Rule::FacilityCode),
            FieldSpec::right("prd_cmp", 10, 6, Rule::Competency),
            FieldSpec::left("prd_cnsmed", 16, 15, Rule::DigitsLeft(c::PROFESSIONAL_CNS)),
            FieldSpec::left("prd_cbo", 31, 6, Rule::Alphanumeric(c::OCCUPATION)),
            FieldSpec::right("prd_dtaten", 37, 8, Rule::Date(c::SERVICE_DATE)),
            FieldSpec::right("prd_flh", 45, 3, Rule::Page),
            FieldSpec::right("prd_seq", 48, 2, Rule::Sequence),
            FieldSpec::right("prd_pa", 50, 10, Rule::Numeric(c::PROCEDURE)),
            FieldSpec::left("prd_cnspac", 60, 15, Rule::DigitsLeft(c::PATIENT_CNS)),
            FieldSpec::left("prd_sexo", 75, 1, Rule::Sex),
            FieldSpec::right("prd_ibge", 76, 6, Rule::NumericOrBlank(c::MUNICIPALITY)),
            FieldSpec::left("prd_cid", 82, 4, Rule::Diagnosis(c::DIAGNOSIS)),
            FieldSpec::right("prd_idade", 86, 3, Rule::Age),
            FieldSpec::right("prd_qt", 89, 6, Rule::Quantity),
            FieldSpec::right("prd_caten", 95, 2, Rule::NumericOrBlank(c::CARE_CHARACTER)),
            FieldSpec::right("prd_naut", 97, 13, Rule::NumericOrBlank(c::AUTHORIZATION)),
            FieldSpec::left("prd_org", 110, 3, Rule::Constant("BPA")),
            FieldSpec::left("prd_nmpac", 113, 30, Rule::Text(c::PATIENT_NAME)),
            FieldSpec::right("prd_dtnasc", 143, 8, Rule::Date(c::BIRTH_DATE)),
            FieldSpec::right("prd_raca", 151, 2, Rule::Race),
            FieldSpec::right("prd_etnia", 153, 4, Rule::Ethnicity),
        ]
    };
}

const fn concat<const A: usize, const B: usize, const N: usize>(
    head: [FieldSpec; A],
    tail: [FieldSpec; B],
) -> [FieldSpec; N] {
    assert!(A + B == N, "layout table length mismatch");
    let mut out = [head[0]; N];
    let mut i = 0;
    while i < A {
        out[i] = head[i];
        i += 1;
    }
    let mut j = 0;
    while j < B {
        out[A + j] = tail[j];
        j += 1;
    }
    out
}

/// Canonical layout: full address and contact block, 349 characters
pub static EXTENDED_FIELDS: [FieldSpec; 36] = concat(
    common_fields!(),
    [
        FieldSpec::left("prd_reservado", 157, 9, Rule::Filler),
        FieldSpec::right("prd_equipe_seq", 166, 8, Rule::Numeric(c::TEAM_SEQUENCE)),
        FieldSpec::right("prd_equipe_area", 174, 4, Rule::Numeric(c::TEAM_AREA)),
        FieldSpec::right("prd_cnpj", 178, 14, Rule::NumericOrBlank(c::MANUFACTURER_CNPJ)),
        FieldSpec::right("prd_cep_pcnte", 192, 8, Rule::NumericOrBlank(c::POSTAL_CODE)),
        FieldSpec::right("prd_lograd_pcnte", 200, 3, Rule::StreetType),
        FieldSpec::left("prd_end_pcnte", 203, 30, Rule::Text(c::STREET)),
        FieldSpec::left("prd_compl_pcnte", 233, 10, Rule::Text(c::COMPLEMENT)),
        FieldSpec::left("prd_num_pcnte", 243, 5, Rule::StreetNumber),
        FieldSpec::left("prd_bairro_pcnte", 248, 30, Rule::Text(c::NEIGHBORHOOD)),
        FieldSpec::right("prd_ddtel_pcnte", 278, 11, Rule::NumericOrBlank(c::PHONE)),
        FieldSpec::left("prd_email_pcnte", 289, 40, Rule::Text(c::EMAIL)),
        FieldSpec::right("prd_ine", 329, 10, Rule::Numeric(c::TEAM_INE)),
        FieldSpec::right("prd_cpf_pcnte", 339, 11, Rule::NumericOrBlank(c::PATIENT_CPF)),
    ],
);

/// Earlier revision ending at the team-area code, 177 characters
pub static COMPACT_FIELDS: [FieldSpec; 27] = concat(
    common_fields!(),
    [
        FieldSpec::left("prd_nac", 157, 3, Rule::Constant("010")),
        FieldSpec::left("prd_srv", 160, 3, Rule::Filler),
        FieldSpec::left("prd_clf", 163, 3, Rule::Filler),
        FieldSpec::right("prd_equipe_seq", 166, 8, Rule::Numeric(c::TEAM_SEQUENCE)),
        FieldSpec::right("prd_equipe_area", 174, 4, Rule::Numeric(c::TEAM_AREA)),
    ],
);

/// Named detail-line layout revision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVersion {
    #[default]
    Extended,
    Compact,
}

impl LayoutVersion {
    /// Field table in column order
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            LayoutVersion::Extended => &EXTENDED_FIELDS,
            LayoutVersion::Compact => &COMPACT_FIELDS,
        }
    }

    /// Width of every detail line of this layout
    pub fn detail_width(&self) -> usize {
        self.fields().iter().map(|f| f.width).sum()
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutVersion::Extended => "extended",
            LayoutVersion::Compact => "compact",
        }
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "extended" => Ok(LayoutVersion::Extended),
            "compact" => Ok(LayoutVersion::Compact),
            other => Err(format!(
                "Unknown layout '{other}'. Must be 'extended' or 'compact'"
            )),
        }
    }
}
