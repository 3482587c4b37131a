//! Detail lines

use super::encoding::OutputEncoding;
use super::fields::{
    compute_age, format_alphanumeric, format_date, format_digits_left, format_money_quantity,
    format_numeric, format_numeric_or_blank, format_text, pad_left, parse_date, repeat_char,
    supplied_age,
};
use super::layout::{columns, FieldSpec, LayoutVersion, Rule};
use super::lookup::{
    diagnosis_code, ethnicity_code, race_code, sex_flag, street_number, street_type_code,
};
use crate::core::aggregate::{page_of, sequence_of};
use crate::domain::{Cnes, Competency, FieldFormatError, Record};

/// Batch-wide values every detail line needs
#[derive(Debug, Clone, Copy)]
pub struct DetailContext<'a> {
    pub cnes: &'a Cnes,
    pub competency: Competency,
    pub layout: LayoutVersion,
    pub encoding: OutputEncoding,
}

/// A formatted detail line plus the field-level fallbacks applied to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub text: String,
    pub substitutions: Vec<FieldFormatError>,
}

/// Formats the record at 1-based `index` of its batch
///
/// Field-level problems are recovered in place and listed in
/// [`DetailLine::substitutions`]. An error means the whole record is unusable.
pub fn format_detail(
    record: &Record,
    index: usize,
    ctx: &DetailContext<'_>,
) -> Result<DetailLine, FieldFormatError> {
    if record.is_empty() {
        return Err(FieldFormatError::EmptyRecord {
            record_index: index,
        });
    }

    let expected = ctx.layout.detail_width();
    let race = race_code(record.first_present(columns::RACE));
    let mut text = String::with_capacity(expected);
    let mut substitutions = Vec::new();

    for field in ctx.layout.fields() {
        let token = field.fit(&field_token(field, record, index, ctx, &race));
        if !token.chars().all(|c| ctx.encoding.can_encode(c)) {
            substitutions.push(FieldFormatError::Unencodable {
                record_index: index,
                field: field.name,
                encoding: ctx.encoding.name(),
            });
        }
        text.push_str(&token);
    }

    let actual = text.chars().count();
    if actual != expected {
        return Err(FieldFormatError::WidthMismatch {
            record_index: index,
            expected,
            actual,
        });
    }

    Ok(DetailLine {
        text,
        substitutions,
    })
}

fn field_token(
    field: &FieldSpec,
    record: &Record,
    index: usize,
    ctx: &DetailContext<'_>,
    race: &str,
) -> String {
    let width = field.width;
    match field.rule {
        Rule::Constant(value) => value.to_string(),
        Rule::Filler => repeat_char(' ', width),
        Rule::FacilityCode => ctx.cnes.as_str().to_string(),
        Rule::Competency => ctx.competency.to_string(),
        Rule::Page => pad_left(&page_of(index).to_string(), width, '0'),
        Rule::Sequence => pad_left(&sequence_of(index).to_string(), width, '0'),
        Rule::Numeric(names) => format_numeric(record.first_present(names), width),
        Rule::NumericOrBlank(names) => format_numeric_or_blank(record.first_present(names), width),
        Rule::DigitsLeft(names) => format_digits_left(record.first_present(names), width),
        Rule::Alphanumeric(names) => format_alphanumeric(record.first_present(names), width),
        Rule::Text(names) => format_text(record.first_present(names), width),
        Rule::Date(names) => format_date(record.first_present(names)),
        Rule::Diagnosis(names) => diagnosis_code(record.first_present(names)),
        Rule::Sex => sex_flag(record.first_present(columns::SEX)).to_string(),
        Rule::Age => format!("{:03}", resolve_age(record)),
        Rule::Quantity => format_money_quantity(record.first_present(columns::QUANTITY)),
        Rule::Race => race.to_string(),
        Rule::Ethnicity => ethnicity_code(record.first_present(columns::ETHNICITY), race),
        Rule::StreetType => street_type_code(
            record.first_present(columns::STREET_TYPE),
            record.first_present(columns::STREET),
        ),
        Rule::StreetNumber => street_number(record.first_present(columns::STREET_NUMBER)),
    }
}

/// Age written into the line
///
/// A supplied age column wins. Otherwise the age is derived from the birth
/// date and the service date; when either date is missing the age is zero.
pub fn resolve_age(record: &Record) -> u8 {
    if let Some(age) = supplied_age(record.first_present(columns::AGE)) {
        return age;
    }
    let birth = parse_date(record.first_present(columns::BIRTH_DATE));
    let service = parse_date(record.first_present(columns::SERVICE_DATE));
    match (birth, service) {
        (Some(birth), Some(service)) => compute_age(birth, service),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    fn cnes() -> Cnes {
        Cnes::new("2560372").unwrap()
    }

    fn ctx(cnes: &Cnes, layout: LayoutVersion, encoding: OutputEncoding) -> DetailContext<'_> {
        DetailContext {
            cnes,
            competency: Competency::new(2024, 1).unwrap(),
            layout,
            encoding,
        }
    }

    fn full_record() -> Record {
        Record::new()
            .with("cns_profissional", "702002887429583")
            .with("cod_cbo", "225125")
            .with("data_atendimento", "2024-01-15")
            .with("cod_procedimento", "0301010064")
            .with("cns_paciente", "898001234567890")
            .with("sexo", "F")
            .with("municipio_codigo", "355030")
            .with("cid10", "J45.9")
            .with("data_nascimento", "1990-06-20")
            .with("quantidade", "2.5")
            .with("carater_atend", "01")
            .with("nome_paciente", "Maria da Conceição")
            .with("raca", "pardo")
            .with("cep_paciente", "01310-100")
            .with("endereco", "Avenida Paulista")
            .with("numero_endereco", "")
            .with("bairro", "Bela Vista")
            .with("telefone_celular", "(11) 98765-4321")
            .with("email", "maria@example.com")
            .with("cpf_paciente", "123.456.789-09")
    }

    /// Slice of a line by 1-based inclusive columns
    fn cols(line: &str, start: usize, end: usize) -> String {
        line.chars().skip(start - 1).take(end - start + 1).collect()
    }

    #[test]
    fn test_extended_line_fields() {
        let cnes = cnes();
        let ctx = ctx(&cnes, LayoutVersion::Extended, OutputEncoding::Utf8);
        let line = format_detail(&full_record(), 21, &ctx).unwrap();
        let text = &line.text;

        assert_eq!(text.chars().count(), 349);
        assert!(line.substitutions.is_empty());
        assert_eq!(cols(text, 1, 2), "03");
        assert_eq!(cols(text, 3, 9), "2560372");
        assert_eq!(cols(text, 10, 15), "202401");
        assert_eq!(cols(text, 16, 30), "702002887429583");
        assert_eq!(cols(text, 31, 36), "225125");
        assert_eq!(cols(text, 37, 44), "20240115");
        assert_eq!(cols(text, 45, 47), "002");
        assert_eq!(cols(text, 48, 49), "01");
        assert_eq!(cols(text, 50, 59), "0301010064");
        assert_eq!(cols(text, 75, 75), "F");
        assert_eq!(cols(text, 76, 81), "355030");
        assert_eq!(cols(text, 82, 85), "J459");
        assert_eq!(cols(text, 86, 88), "033");
        assert_eq!(cols(text, 89, 94), "000250");
        assert_eq!(cols(text, 95, 96), "01");
        assert_eq!(cols(text, 97, 109), " ".repeat(13));
        assert_eq!(cols(text, 110, 112), "BPA");
        assert_eq!(cols(text, 113, 142), format!("{:<30}", "Maria da Conceição"));
        assert_eq!(cols(text, 151, 152), "03");
        assert_eq!(cols(text, 153, 156), "    ");
        assert_eq!(cols(text, 157, 165), " ".repeat(9));
        assert_eq!(cols(text, 166, 173), "00000000");
        assert_eq!(cols(text, 192, 199), "01310100");
        assert_eq!(cols(text, 200, 202), "002");
        assert_eq!(cols(text, 243, 247), "SN   ");
        assert_eq!(cols(text, 278, 288), "11987654321");
        assert_eq!(cols(text, 339, 349), "12345678909");
    }

    #[test]
    fn test_compact_line_fields() {
        let cnes = cnes();
        let ctx = ctx(&cnes, LayoutVersion::Compact, OutputEncoding::Utf8);
        let line = format_detail(&full_record(), 1, &ctx).unwrap();
        assert_eq!(line.text.chars().count(), 177);
        assert_eq!(cols(&line.text, 45, 49), "00101");
        assert_eq!(cols(&line.text, 157, 159), "010");
        assert_eq!(cols(&line.text, 160, 165), " ".repeat(6));
    }

    #[test]
    fn test_sparse_record_keeps_width() {
        let cnes = cnes();
        let ctx = ctx(&cnes, LayoutVersion::Extended, OutputEncoding::Utf8);
        let record = Record::new().with("qualquer", FieldValue::Null);
        let line = format_detail(&record, 1, &ctx).unwrap();
        assert_eq!(line.text.chars().count(), 349);
        assert_eq!(cols(&line.text, 37, 44), "00000000");
        assert_eq!(cols(&line.text, 86, 88), "000");
        assert_eq!(cols(&line.text, 89, 94), "000100");
    }

    #[test]
    fn test_empty_record_is_rejected() {
        let cnes = cnes();
        let ctx = ctx(&cnes, LayoutVersion::Extended, OutputEncoding::Utf8);
        let err = format_detail(&Record::new(), 4, &ctx).unwrap_err();
        assert_eq!(err, FieldFormatError::EmptyRecord { record_index: 4 });
    }

    #[test]
    fn test_unencodable_text_is_reported_per_field() {
        let cnes = cnes();
        let ctx = ctx(&cnes, LayoutVersion::Extended, OutputEncoding::Latin1);
        let record = full_record().with("nome_paciente", "Zoë 李");
        let line = format_detail(&record, 1, &ctx).unwrap();
        assert_eq!(line.text.chars().count(), 349);
        assert_eq!(
            line.substitutions,
            vec![FieldFormatError::Unencodable {
                record_index: 1,
                field: "prd_nmpac",
                encoding: "latin-1",
            }]
        );
    }

    #[test]
    fn test_resolve_age() {
        let supplied = Record::new().with("idade", "45");
        assert_eq!(resolve_age(&supplied), 45);

        let derived = Record::new()
            .with("data_nascimento", "2000-03-10")
            .with("data_atendimento", "2024-03-09");
        assert_eq!(resolve_age(&derived), 23);

        let no_service = Record::new().with("data_nascimento", "2000-03-10");
        assert_eq!(resolve_age(&no_service), 0);
    }

    #[test]
    fn test_ethnicity_follows_race() {
        let cnes = cnes();
        let ctx = ctx(&cnes, LayoutVersion::Extended, OutputEncoding::Utf8);
        let record = full_record().with("raca", "Indígena").with("etnia", "X123");
        let line = format_detail(&record, 1, &ctx).unwrap();
        assert_eq!(cols(&line.text, 151, 152), "05");
        assert_eq!(cols(&line.text, 153, 156), "0123");
    }
}
