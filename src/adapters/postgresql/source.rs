//! Ambulatory production query over PostgreSQL

use super::client::PostgresClient;
use crate::adapters::source::RecordSource;
use crate::config::DatabaseConfig;
use crate::domain::{Competency, FieldValue, Record, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::Type;
use tokio_postgres::Row;

/// One row per procedure entry, joined with its sheet, patient, professional
/// and procedure catalog. Column aliases are the names the codec looks up.
const PRODUCTION_QUERY: &str = "\
SELECT
    f.id AS ficha_id,
    f.data_atendimento,
    f.matricula AS cns_paciente,
    p.nome AS nome_paciente,
    p.cns AS cns_paciente_alt,
    p.sexo,
    p.raca,
    p.etnia,
    p.data_nascimento,
    p.endereco,
    p.numero AS numero_endereco,
    p.complemento,
    p.bairro,
    p.cep,
    p.tipo_logradouro,
    p.telefone,
    p.email,
    pr.cns AS cns_profissional,
    pr.cod_cbo_resp,
    pr.cod_cbo,
    l.cod_cbo AS cod_cbo_lanc,
    l.procedimento_id,
    proc.codigo AS cod_procedimento,
    l.quantidade::text AS quantidade,
    l.data AS data_procedimento,
    f.cid AS cid10,
    f.carater_atend
FROM ficha_amb_int f
JOIN lancamentos l ON l.ficha_id = f.id
LEFT JOIN pacientes p ON p.id = f.paciente_id
LEFT JOIN prestadores pr ON pr.id = f.prestador_id
LEFT JOIN procedimentos proc ON proc.id = l.procedimento_id";

const PERIOD_FILTER: &str = "
WHERE f.data_atendimento BETWEEN $1 AND $2
  AND l.data BETWEEN $1 AND $2";

const ORDERING: &str = "
ORDER BY f.id, l.id";

/// Builds the production query, filtered to a period when `filtered`
pub fn production_query(filtered: bool) -> String {
    let mut query = String::from(PRODUCTION_QUERY);
    if filtered {
        query.push_str(PERIOD_FILTER);
    }
    query.push_str(ORDERING);
    query
}

/// Record source backed by the facility database
pub struct PostgresSource {
    config: DatabaseConfig,
}

impl PostgresSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<PostgresClient> {
        let client = PostgresClient::connect(&self.config).await?;
        // Schema names are restricted to identifier characters by config validation
        client
            .batch_execute(&format!("SET search_path TO {}", self.config.schema))
            .await?;
        Ok(client)
    }
}

#[async_trait]
impl RecordSource for PostgresSource {
    async fn fetch_records(&self, competency: Option<&Competency>) -> Result<Vec<Record>> {
        let client = self.connect().await?;

        let rows = match competency {
            Some(competency) => {
                let first = competency.first_day();
                let last = competency.last_day();
                client.query(&production_query(true), &[&first, &last]).await?
            }
            None => client.query(&production_query(false), &[]).await?,
        };

        tracing::info!(
            competency = ?competency.map(ToString::to_string),
            row_count = rows.len(),
            schema = %self.config.schema,
            "Fetched production rows"
        );
        Ok(rows.iter().map(row_to_record).collect())
    }

    fn describe(&self) -> String {
        format!(
            "postgresql://{}@{}:{}/{} (schema {})",
            self.config.user,
            self.config.host,
            self.config.port,
            self.config.dbname,
            self.config.schema
        )
    }

    async fn test_connection(&self) -> Result<()> {
        self.connect().await?.test_connection().await
    }
}

/// Converts a row into a record, keeping column order
pub fn row_to_record(row: &Row) -> Record {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| (column.name().to_string(), cell_value(row, idx, column.type_())))
        .collect()
}

fn cell_value(row: &Row, idx: usize, ty: &Type) -> FieldValue {
    let value: std::result::Result<FieldValue, tokio_postgres::Error> = match *ty {
        Type::INT2 => row.try_get::<_, Option<i16>>(idx).map(|v| v.map(i64::from).into()),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx).map(|v| v.map(i64::from).into()),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).map(Into::into),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx).map(|v| v.map(f64::from).into()),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map(Into::into),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).map(Into::into),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx).map(Into::into),
        Type::TIMESTAMP => row.try_get::<_, Option<NaiveDateTime>>(idx).map(Into::into),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map(|v| v.map(|dt| dt.naive_utc()).into()),
        _ => row.try_get::<_, Option<String>>(idx).map(Into::into),
    };
    value.unwrap_or_else(|e| {
        tracing::debug!(column = idx, pg_type = %ty, error = %e, "Unsupported column value, using null");
        FieldValue::Null
    })
}
