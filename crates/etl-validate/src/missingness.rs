//! Per-column missingness summary.

use polars::prelude::{Column, DataFrame};
use serde::Serialize;

use etl_model::Result;

/// Null count and share for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissingness {
    pub column: String,
    pub n_missing: u64,
    /// Share of rows that are null, in `[0, 1]`. Zero for an empty table.
    pub p_missing: f64,
}

/// Missingness of every column, sorted by `p_missing` descending then name.
pub fn missingness_stats(df: &DataFrame) -> Vec<ColumnMissingness> {
    let rows = df.height();
    let mut stats: Vec<ColumnMissingness> = df
        .get_columns()
        .iter()
        .map(|column| {
            let n_missing = column.null_count();
            let p_missing = if rows == 0 {
                0.0
            } else {
                n_missing as f64 / rows as f64
            };
            ColumnMissingness {
                column: column.name().to_string(),
                n_missing: n_missing as u64,
                p_missing,
            }
        })
        .collect();
    stats.sort_by(|a, b| {
        b.p_missing
            .total_cmp(&a.p_missing)
            .then_with(|| a.column.cmp(&b.column))
    });
    stats
}

/// The missingness summary as a table with `column`, `n_missing`, `p_missing`.
pub fn missingness_report(df: &DataFrame) -> Result<DataFrame> {
    let stats = missingness_stats(df);
    let names: Vec<&str> = stats.iter().map(|stat| stat.column.as_str()).collect();
    let counts: Vec<u64> = stats.iter().map(|stat| stat.n_missing).collect();
    let shares: Vec<f64> = stats.iter().map(|stat| stat.p_missing).collect();
    Ok(DataFrame::new(vec![
        Column::new("column".into(), names),
        Column::new("n_missing".into(), counts),
        Column::new("p_missing".into(), shares),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_by_share_then_name() {
        let df = DataFrame::new(vec![
            Column::new("status".into(), vec![Some("paid"), None, None, None]),
            Column::new("amount".into(), vec![Some(1.0), None, Some(2.0), Some(3.0)]),
            Column::new("created_at".into(), vec![None, Some("x"), Some("y"), Some("z")]),
            Column::new("order_id".into(), vec!["o1", "o2", "o3", "o4"]),
        ])
        .unwrap();

        let stats = missingness_stats(&df);
        let order: Vec<&str> = stats.iter().map(|stat| stat.column.as_str()).collect();
        assert_eq!(order, vec!["status", "amount", "created_at", "order_id"]);
        assert_eq!(stats[0].n_missing, 3);
        assert_eq!(stats[0].p_missing, 0.75);
        assert_eq!(stats[3].p_missing, 0.0);
    }

    #[test]
    fn report_has_three_columns() {
        let df = DataFrame::new(vec![Column::new("amount".into(), vec![None, Some(1.0)])]).unwrap();
        let report = missingness_report(&df).unwrap();
        assert_eq!(report.shape(), (1, 3));
        assert_eq!(report.column("n_missing").unwrap().u64().unwrap().get(0), Some(1));
        assert_eq!(report.column("p_missing").unwrap().f64().unwrap().get(0), Some(0.5));
    }

    #[test]
    fn empty_table_reports_zero_share() {
        let df = DataFrame::new(vec![Column::new("amount".into(), Vec::<f64>::new())]).unwrap();
        let stats = missingness_stats(&df);
        assert_eq!(stats[0].p_missing, 0.0);
    }
}
