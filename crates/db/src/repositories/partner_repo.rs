//! Repository for the `parceiros_jwm` table.

use roster_core::partner::{PartnerField, PartnerRecord};
use sqlx::mysql::{MySqlArguments, MySqlPool};
use sqlx::query::Query;
use sqlx::MySql;

use crate::models::partner::PartnerRow;

/// Physical table name.
pub const PARTNER_TABLE: &str = "parceiros_jwm";

/// Reads and appends partner rows. Rows are never updated or deleted.
pub struct PartnerRepo;

impl PartnerRepo {
    /// Every row, in insertion order.
    pub async fn list_all(pool: &MySqlPool) -> Result<Vec<PartnerRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {PARTNER_TABLE} ORDER BY id",
            column_list()
        );
        let rows = sqlx::query_as::<_, PartnerRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(PartnerRecord::from).collect())
    }

    /// Insert a single record.
    pub async fn insert(pool: &MySqlPool, record: &PartnerRecord) -> Result<(), sqlx::Error> {
        let query = insert_statement();
        bind_record(sqlx::query(&query), record)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Insert a batch of records within one transaction. Either every row is
    /// committed or none is.
    pub async fn insert_batch(
        pool: &MySqlPool,
        records: &[PartnerRecord],
    ) -> Result<u64, sqlx::Error> {
        let query = insert_statement();
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for record in records {
            let result = bind_record(sqlx::query(&query), record)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

fn column_list() -> String {
    PartnerField::ALL
        .iter()
        .map(|field| field.column())
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_statement() -> String {
    let placeholders = vec!["?"; PartnerField::ALL.len()].join(", ");
    format!(
        "INSERT INTO {PARTNER_TABLE} ({}) VALUES ({placeholders})",
        column_list()
    )
}

fn bind_record<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    record: &'q PartnerRecord,
) -> Query<'q, MySql, MySqlArguments> {
    for value in record.values() {
        query = query.bind(value);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement_lists_every_column_once() {
        let sql = insert_statement();
        assert!(sql.starts_with("INSERT INTO parceiros_jwm (placa, marca, modelo, ano, tipo_veiculo"));
        assert!(sql.contains("tags, usuario)"));
        assert_eq!(sql.matches('?').count(), 15);
    }
}
