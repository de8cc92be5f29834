//! Schema enforcement for raw tables.

use polars::prelude::{Column, DataFrame, DataType};
use tracing::debug;

use etl_common::{column_f64_values, column_text_values};
use etl_model::{ColumnType, ORDERS_SCHEMA, QualityError, Result, TableSchema, USERS_SCHEMA};

/// Coerce `df` into the declared schema.
///
/// The result holds exactly the declared columns, in declared order:
/// - `Numeric` columns become `f64`; unparseable cells become null
/// - `Identifier` columns become trimmed text; blank cells become null
/// - `Text` and `Timestamp` columns become text; blank cells become null
///
/// Timestamp columns that are already temporal are kept as they are.
pub fn enforce_schema(df: &DataFrame, schema: &TableSchema) -> Result<DataFrame> {
    let present = df.get_column_names();
    let missing: Vec<String> = schema
        .columns
        .iter()
        .filter(|spec| !present.iter().any(|name| name.as_str() == spec.name))
        .map(|spec| spec.name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(QualityError::Schema {
            table: schema.name.to_string(),
            missing,
        });
    }

    let mut columns = Vec::with_capacity(schema.columns.len());
    for spec in schema.columns {
        let source = df.column(spec.name)?;
        let column = match spec.column_type {
            ColumnType::Numeric => Column::new(spec.name.into(), column_f64_values(source)),
            ColumnType::Identifier => {
                let values: Vec<Option<String>> = column_text_values(source)
                    .into_iter()
                    .map(|value| {
                        value
                            .map(|v| v.trim().to_string())
                            .filter(|v| !v.is_empty())
                    })
                    .collect();
                Column::new(spec.name.into(), values)
            }
            ColumnType::Timestamp if matches!(source.dtype(), DataType::Datetime(_, _)) => {
                source.clone()
            }
            ColumnType::Text | ColumnType::Timestamp => {
                let values: Vec<Option<String>> = column_text_values(source)
                    .into_iter()
                    .map(|value| value.filter(|v| !v.trim().is_empty()))
                    .collect();
                Column::new(spec.name.into(), values)
            }
        };
        columns.push(column);
    }

    let enforced = DataFrame::new(columns)?;
    debug!(
        table = schema.name,
        rows = enforced.height(),
        dropped_columns = df.width().saturating_sub(enforced.width()),
        "schema enforced"
    );
    Ok(enforced)
}

pub fn enforce_orders_schema(df: &DataFrame) -> Result<DataFrame> {
    enforce_schema(df, &ORDERS_SCHEMA)
}

pub fn enforce_users_schema(df: &DataFrame) -> Result<DataFrame> {
    enforce_schema(df, &USERS_SCHEMA)
}
