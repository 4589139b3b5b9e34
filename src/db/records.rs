//! Employment record database operations

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RecordStore, StoreError};
use crate::certificate::models::{EmployerReferenceRow, EmploymentRecord};

const UNKNOWN_EMPLOYEE: &str = "Desconocido";
const UNKNOWN_EMPLOYER: &str = "Empresa No Especificada";
const UNKNOWN_TITLE: &str = "No especificado";

#[derive(Debug, sqlx::FromRow)]
struct EmploymentRow {
    cedula: Option<String>,
    nombre_empleado: Option<String>,
    nombre_empresa: Option<String>,
    desc_cargo: Option<String>,
    fecha_ingreso: Option<String>,
    fecha_retiro: Option<String>,
    salario_basico: Option<String>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl From<EmploymentRow> for EmploymentRecord {
    fn from(row: EmploymentRow) -> Self {
        EmploymentRecord {
            national_id: row.cedula.unwrap_or_default().trim().to_string(),
            employee_name: or_default(row.nombre_empleado, UNKNOWN_EMPLOYEE),
            employer_name: or_default(row.nombre_empresa, UNKNOWN_EMPLOYER),
            job_title: or_default(row.desc_cargo, UNKNOWN_TITLE),
            entry_date: row.fecha_ingreso.unwrap_or_default(),
            exit_date: row.fecha_retiro.unwrap_or_default(),
            base_salary: row.salario_basico.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EmployerRow {
    empresa: Option<String>,
    nit: Option<String>,
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_records_by_id(&self, national_id: &str) -> Result<Vec<EmploymentRecord>, StoreError> {
        let rows = sqlx::query_as::<_, EmploymentRow>(
            "SELECT cedula, nombre_empleado, nombre_empresa, desc_cargo, fecha_ingreso, fecha_retiro, salario_basico \
             FROM employment_records WHERE trim(cedula) = trim($1) ORDER BY row_id",
        )
        .bind(national_id)
        .fetch_all(&self.pool)
        .await?;

        log::debug!("Found {} employment rows for {}", rows.len(), national_id);
        Ok(rows.into_iter().map(EmploymentRecord::from).collect())
    }

    async fn get_employer_reference_table(&self) -> Result<Vec<EmployerReferenceRow>, StoreError> {
        let rows = sqlx::query_as::<_, EmployerRow>("SELECT empresa, nit FROM employers ORDER BY row_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| EmployerReferenceRow {
                alias_list: row.empresa,
                tax_id: row.nit,
            })
            .collect())
    }
}
