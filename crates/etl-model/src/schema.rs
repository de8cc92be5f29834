//! Declared table schemas.
//!
//! Column access downstream of the schema enforcer relies on these
//! declarations instead of inferring types from data.

/// Semantic type of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Key-like text, trimmed; numbers rendered without trailing zeros.
    Identifier,
    /// Free or categorical text.
    Text,
    /// Floating-point numeric value.
    Numeric,
    /// Timestamp kept as text until the datetime stage parses it.
    Timestamp,
}

/// A single declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }
}

/// Ordered column declaration for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table label used in error messages and logs.
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
    /// Column that must be unique within a run.
    pub key: &'static str,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|spec| spec.name).collect()
    }
}

/// Canonical column names.
pub mod columns {
    pub const ORDER_ID: &str = "order_id";
    pub const USER_ID: &str = "user_id";
    pub const AMOUNT: &str = "amount";
    pub const QUANTITY: &str = "quantity";
    pub const CREATED_AT: &str = "created_at";
    pub const STATUS: &str = "status";
    pub const COUNTRY: &str = "country";
    pub const SIGNUP_DATE: &str = "signup_date";

    pub const STATUS_CLEAN: &str = "status_clean";
    pub const AMOUNT_WINSOR: &str = "amount_winsor";
}

pub const ORDERS_SCHEMA: TableSchema = TableSchema {
    name: "orders",
    columns: &[
        ColumnSpec::new(columns::ORDER_ID, ColumnType::Identifier),
        ColumnSpec::new(columns::USER_ID, ColumnType::Identifier),
        ColumnSpec::new(columns::AMOUNT, ColumnType::Numeric),
        ColumnSpec::new(columns::QUANTITY, ColumnType::Numeric),
        ColumnSpec::new(columns::CREATED_AT, ColumnType::Timestamp),
        ColumnSpec::new(columns::STATUS, ColumnType::Text),
    ],
    key: columns::ORDER_ID,
};

pub const USERS_SCHEMA: TableSchema = TableSchema {
    name: "users",
    columns: &[
        ColumnSpec::new(columns::USER_ID, ColumnType::Identifier),
        ColumnSpec::new(columns::COUNTRY, ColumnType::Text),
        ColumnSpec::new(columns::SIGNUP_DATE, ColumnType::Timestamp),
    ],
    key: columns::USER_ID,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_schema_order_is_stable() {
        assert_eq!(
            ORDERS_SCHEMA.column_names(),
            vec!["order_id", "user_id", "amount", "quantity", "created_at", "status"]
        );
        assert_eq!(ORDERS_SCHEMA.columns[2].column_type, ColumnType::Numeric);
        assert!(!USERS_SCHEMA.column_names().contains(&"amount"));
    }
}
