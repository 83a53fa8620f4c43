use roster_core::partner::PartnerRecord;
use sqlx::FromRow;

/// A row from the `parceiros_jwm` table.
///
/// Columns are nullable in tables created outside our migrations, so every
/// value is optional here and collapses to an empty string on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct PartnerRow {
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub ano: Option<String>,
    pub tipo_veiculo: Option<String>,
    pub motorista: Option<String>,
    pub telefone: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub rastreador: Option<String>,
    pub curso_mop: Option<String>,
    pub data_cadastro: Option<String>,
    pub indicacao: Option<String>,
    pub tags: Option<String>,
    pub usuario: Option<String>,
}

impl From<PartnerRow> for PartnerRecord {
    fn from(row: PartnerRow) -> Self {
        let values = [
            row.placa,
            row.marca,
            row.modelo,
            row.ano,
            row.tipo_veiculo,
            row.motorista,
            row.telefone,
            row.cidade,
            row.estado,
            row.rastreador,
            row.curso_mop,
            row.data_cadastro,
            row.indicacao,
            row.tags,
            row.usuario,
        ]
        .map(Option::unwrap_or_default);
        PartnerRecord::from_values(&values[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_columns_become_empty() {
        let row = PartnerRow {
            placa: Some("abc-1234".into()),
            marca: None,
            modelo: None,
            ano: Some("2019".into()),
            tipo_veiculo: None,
            motorista: None,
            telefone: None,
            cidade: Some("São Paulo".into()),
            estado: None,
            rastreador: None,
            curso_mop: None,
            data_cadastro: None,
            indicacao: None,
            tags: None,
            usuario: Some("ana".into()),
        };
        let record = PartnerRecord::from(row);
        assert_eq!(record.plate, "ABC-1234");
        assert_eq!(record.brand, "");
        assert_eq!(record.year, "2019");
        assert_eq!(record.city, "SAO PAULO");
        assert_eq!(record.created_by_user, "ANA");
    }
}
