// ==========================================
// 节点折扣结算引擎 - 快照加载器
// ==========================================
// 职责: 已清洗的条件目录 / 销售台账 / 终端销售台账 / 价格表 → 领域记录
// 说明: 只做列映射与类型转换; 清洗、去重、业务校验在上游完成
// ==========================================

use crate::config::EngineConfig;
use crate::domain::condition::{BonusValue, ConditionRecord, ValidatorValue};
use crate::domain::settlement::SettlementSnapshot;
use crate::domain::transaction::{PriceRecord, TransactionRecord};
use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

// ===== 必需列 =====
const CATALOG_COLUMNS: &[&str] = &[
    "SI/SO",
    "COD_ZNJE",
    "DES_ZNJE",
    "TIPO_DESCUENTO",
    "PERIODO",
    "APLICACION",
    "VALOR",
    "COD_ZDES",
    "COD_ZDEM",
    "ETAPA",
    "FAMILIA",
    "COD_PRODUCTO",
];
const LEDGER_COLUMNS: &[&str] = &[
    "YEAR",
    "MONTH",
    "COD_ZNJE",
    "COD_ZDES",
    "ETAPA",
    "FAMILIA",
    "COD_PRODUCTO",
    "TMS",
];
const PRICE_COLUMNS: &[&str] = &["COD_ZNJE", "COD_PRODUCTO", "PVP", "DTO_FACTURA"];

/// 列名别名 (清洗后的表头不完全统一)
fn aliases(key: &str) -> &'static [&'static str] {
    match key {
        "TMS" => &["TMS", "TM", "Ton"],
        "CTD_SACOS" => &["CTD_SACOS", "CANTIDAD"],
        "DTO_FACTURA" => &["DTO_FACTURA", "Dto. Factura"],
        "FECHA" => &["FECHA", "Fecha"],
        _ => &[],
    }
}

pub struct SnapshotLoader {
    wildcard_markers: Vec<String>,
    parser: UniversalFileParser,
}

impl SnapshotLoader {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            wildcard_markers: config.wildcard_markers.clone(),
            parser: UniversalFileParser,
        }
    }

    /// 一次性加载四张表并组装快照
    pub fn load_snapshot<P: AsRef<Path>>(
        &self,
        catalog: P,
        sales: P,
        sellout: P,
        prices: P,
    ) -> ImportResult<SettlementSnapshot> {
        let conditions = self.load_conditions(catalog)?;
        let sales = self.load_transactions(sales)?;
        let sellout = self.load_transactions(sellout)?;
        let prices = self.load_prices(prices)?;

        info!(
            conditions = conditions.len(),
            sales = sales.len(),
            sellout = sellout.len(),
            prices = prices.len(),
            "快照加载完成"
        );
        Ok(SettlementSnapshot::new(conditions, sales, sellout, prices))
    }

    pub fn load_conditions<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<ConditionRecord>> {
        let rows = self.parser.parse(path)?;
        self.conditions_from_rows(&rows)
    }

    pub fn load_transactions<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> ImportResult<Vec<TransactionRecord>> {
        let rows = self.parser.parse(path)?;
        self.transactions_from_rows(&rows)
    }

    pub fn load_prices<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<PriceRecord>> {
        let rows = self.parser.parse(path)?;
        self.prices_from_rows(&rows)
    }

    // ==========================================
    // 行映射
    // ==========================================

    pub fn conditions_from_rows(&self, rows: &[RawRecord]) -> ImportResult<Vec<ConditionRecord>> {
        require_columns("条件目录", rows, CATALOG_COLUMNS)?;

        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                let row_number = idx + 2;
                let liquidation_label = text(row, "SI/SO");
                let liquidation = Liquidation::from_label(&liquidation_label).ok_or_else(|| {
                    ImportError::UnknownLabel {
                        row: row_number,
                        field: "SI/SO".to_string(),
                        value: liquidation_label.clone(),
                    }
                })?;
                let period_label = text(row, "PERIODO");
                let period = RecognitionPeriod::from_label(&period_label).ok_or_else(|| {
                    ImportError::UnknownLabel {
                        row: row_number,
                        field: "PERIODO".to_string(),
                        value: period_label.clone(),
                    }
                })?;

                let raw_bonus = text(row, "VALOR");
                let bonus = raw_bonus
                    .parse::<f64>()
                    .map(BonusValue::Numeric)
                    .unwrap_or(BonusValue::Text(raw_bonus));
                let band_text = Some(text(row, "CONDICION")).filter(|s| !s.is_empty());

                Ok(ConditionRecord {
                    liquidation,
                    node_code: text(row, "COD_ZNJE"),
                    node_name: text(row, "DES_ZNJE"),
                    client_type: text(row, "TIPO_CLIENTE"),
                    discount_type: DiscountType::from_label(&text(row, "TIPO_DESCUENTO")),
                    period,
                    basis_label: text(row, "APLICACION"),
                    bonus,
                    band_text,
                    client: self.validator(row, "COD_ZDES"),
                    recipient: self.validator(row, "COD_ZDEM"),
                    stage: self.validator(row, "ETAPA"),
                    family: self.validator(row, "FAMILIA"),
                    product: self.validator(row, "COD_PRODUCTO"),
                })
            })
            .collect()
    }

    pub fn transactions_from_rows(
        &self,
        rows: &[RawRecord],
    ) -> ImportResult<Vec<TransactionRecord>> {
        require_columns("交易台账", rows, LEDGER_COLUMNS)?;

        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                let row_number = idx + 2;
                Ok(TransactionRecord {
                    year: parse_required::<i32>(row, "YEAR", row_number)?,
                    month: parse_required::<u32>(row, "MONTH", row_number)?,
                    node_code: text(row, "COD_ZNJE"),
                    node_name: text(row, "DES_ZNJE"),
                    client_code: text(row, "COD_ZDES"),
                    client_name: text(row, "DES_ZDES"),
                    recipient_code: text(row, "COD_ZDEM"),
                    recipient_name: text(row, "DES_ZDEM"),
                    stage: text(row, "ETAPA"),
                    family: text(row, "FAMILIA"),
                    product_code: text(row, "COD_PRODUCTO"),
                    product_name: text(row, "DES_PRODUCTO"),
                    invoice_class: text(row, "CLASE_FACTURA"),
                    invoice_number: text(row, "NUM_FACTURA"),
                    partners: get_string(row, "SOCIOS"),
                    invoice_date: parse_date(row, "FECHA", row_number)?,
                    order_reference: text(row, "REF_PEDIDO"),
                    billed_quantity: parse_f64(row, "CTD_SACOS", row_number)?,
                    weight: parse_f64(row, "TMS", row_number)?,
                    net_value: parse_f64(row, "VALOR_NETO", row_number)?,
                    base_price: parse_f64(row, "P_BASE", row_number)?,
                    volume_discount: parse_f64(row, "D_VOL", row_number)?,
                    quotation_discount: parse_f64(row, "D_COT", row_number)?,
                    contract_discount: parse_f64(row, "D_CONT", row_number)?,
                    logistics_discount: parse_f64(row, "D_LOG", row_number)?,
                    logistics_rebate: parse_f64(row, "R_LOG", row_number)?,
                    net_price: parse_f64(row, "P_NETO", row_number)?,
                })
            })
            .collect()
    }

    pub fn prices_from_rows(&self, rows: &[RawRecord]) -> ImportResult<Vec<PriceRecord>> {
        require_columns("价格表", rows, PRICE_COLUMNS)?;

        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                let row_number = idx + 2;
                Ok(PriceRecord {
                    node_code: text(row, "COD_ZNJE"),
                    product_code: text(row, "COD_PRODUCTO"),
                    list_price: parse_f64(row, "PVP", row_number)?,
                    invoice_discount_pct: parse_f64(row, "DTO_FACTURA", row_number)?,
                })
            })
            .collect()
    }

    fn validator(&self, row: &RawRecord, key: &str) -> ValidatorValue {
        ValidatorValue::parse(&text(row, key), &self.wildcard_markers)
    }
}

// ==========================================
// 字段提取
// ==========================================

/// 提取字符串字段(返回 Option),支持多个可能的列名
fn get_string(row: &RawRecord, key: &str) -> Option<String> {
    let candidates = aliases(key);
    let keys: &[&str] = if candidates.is_empty() {
        std::slice::from_ref(&key)
    } else {
        candidates
    };

    for alias in keys {
        if let Some(v) = row.get(*alias) {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn text(row: &RawRecord, key: &str) -> String {
    get_string(row, key).unwrap_or_default()
}

/// 解析浮点数; 空值记为 0
fn parse_f64(row: &RawRecord, key: &str, row_number: usize) -> ImportResult<f64> {
    match get_string(row, key) {
        None => Ok(0.0),
        Some(value) => value
            .parse::<f64>()
            .map_err(|_| ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: format!("无法解析为浮点数: {}", value),
            }),
    }
}

/// 解析必填整数(Excel 数值单元格可能带 ".0")
fn parse_required<T>(row: &RawRecord, key: &str, row_number: usize) -> ImportResult<T>
where
    T: std::str::FromStr,
{
    let value = get_string(row, key).ok_or_else(|| ImportError::TypeConversionError {
        row: row_number,
        field: key.to_string(),
        message: "必填字段为空".to_string(),
    })?;
    let integral = value.strip_suffix(".0").unwrap_or(&value);
    integral
        .parse::<T>()
        .map_err(|_| ImportError::TypeConversionError {
            row: row_number,
            field: key.to_string(),
            message: format!("无法解析为整数: {}", value),
        })
}

/// 解析日期 (YYYY-MM-DD / DD/MM/YYYY / YYYYMMDD, 可带时间部分)
fn parse_date(row: &RawRecord, key: &str, row_number: usize) -> ImportResult<Option<NaiveDate>> {
    let Some(value) = get_string(row, key) else {
        return Ok(None);
    };
    let date_part = value.split_whitespace().next().unwrap_or(&value);
    ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .map(Some)
        .ok_or_else(|| ImportError::DateFormatError {
            row: row_number,
            field: key.to_string(),
            value: value.clone(),
        })
}

/// 按首行表头检查必需列
fn require_columns(table: &str, rows: &[RawRecord], columns: &[&str]) -> ImportResult<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    for column in columns {
        let candidates = aliases(column);
        let present = if candidates.is_empty() {
            first.contains_key(*column)
        } else {
            candidates.iter().any(|c| first.contains_key(*c))
        };
        if !present {
            return Err(ImportError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_string_with_alias() {
        let r = row(&[("TM", "2.5"), ("Fecha", "2024-03-05")]);
        assert_eq!(get_string(&r, "TMS"), Some("2.5".to_string()));
        assert_eq!(get_string(&r, "FECHA"), Some("2024-03-05".to_string()));
        assert_eq!(get_string(&r, "P_BASE"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        for raw in ["2024-03-05", "05/03/2024", "20240305", "2024-03-05 00:00:00"] {
            let r = row(&[("FECHA", raw)]);
            assert_eq!(
                parse_date(&r, "FECHA", 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 5)
            );
        }
        let bad = row(&[("FECHA", "marzo")]);
        assert!(matches!(
            parse_date(&bad, "FECHA", 2),
            Err(ImportError::DateFormatError { .. })
        ));
    }

    #[test]
    fn test_parse_required_accepts_excel_float() {
        let r = row(&[("YEAR", "2024.0")]);
        assert_eq!(parse_required::<i32>(&r, "YEAR", 2).unwrap(), 2024);
    }
}
