// ==========================================
// 节点折扣结算引擎 - 结算明细 / 汇总表模型
// ==========================================
// 职责: 贡献结果行 / 明细表列定义 / 汇总表 / Sell-Out 透视表
// 说明: 只描述数据,不负责单元格样式与文件写出
// ==========================================

use crate::domain::condition::ExpandedConditionRecord;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::ApplicationBasis;
use serde::{Deserialize, Serialize};

// ==========================================
// 贡献结果 (Contribution Result)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub transaction: TransactionRecord,
    /// Sell-In 匹配到的条件行; 区间规则与 Sell-Out 为 None
    pub condition: Option<ExpandedConditionRecord>,
    pub bonus_rate: Option<f64>,

    // ===== 中间列(仅部分基准需要) =====
    pub unit_price: Option<f64>,
    pub invoice_discount: Option<f64>,
    pub credit_price: Option<f64>,
    pub additional_discount: Option<f64>,

    // ===== Sell-Out 按基准拆分 =====
    pub base_price_bonus: Option<f64>,
    pub net_value_bonus: Option<f64>,
    pub base_price_contribution: Option<f64>,
    pub net_value_contribution: Option<f64>,

    /// 最终贡献金额; 区间规则不产生逐行贡献
    pub contribution_amount: Option<f64>,
}

impl ContributionResult {
    /// 以交易行为底构建空结果
    pub fn from_transaction(transaction: &TransactionRecord) -> Self {
        Self {
            transaction: transaction.clone(),
            condition: None,
            bonus_rate: None,
            unit_price: None,
            invoice_discount: None,
            credit_price: None,
            additional_discount: None,
            base_price_bonus: None,
            net_value_bonus: None,
            base_price_contribution: None,
            net_value_contribution: None,
            contribution_amount: None,
        }
    }

    pub fn contribution(&self) -> f64 {
        self.contribution_amount.unwrap_or(0.0)
    }
}

// ==========================================
// 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    fn number(value: Option<f64>) -> Self {
        value.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

// ==========================================
// 明细表列 (Sheet Column)
// ==========================================
// 表头沿用报表固定的重命名映射
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetColumn {
    NodeCode,
    NodeName,
    ClientCode,
    ClientName,
    Stage,
    Family,
    ProductCode,
    ProductName,
    InvoiceClass,
    InvoiceNumber,
    OrderReference,
    RecipientCode,
    RecipientName,
    Partners,
    InvoiceDate,
    BilledQuantity,
    Weight,
    NetValue,
    Bonus,
    UnitPrice,
    InvoiceDiscount,
    CreditPrice,
    AdditionalDiscount,
    BasePriceBonus,
    NetValueBonus,
    BasePriceContribution,
    NetValueContribution,
    Contribution,
}

impl SheetColumn {
    pub fn header(&self) -> &'static str {
        match self {
            SheetColumn::NodeCode => "Cod. Nodo",
            SheetColumn::NodeName => "Nodo",
            SheetColumn::ClientCode => "Cliente",
            SheetColumn::ClientName => "Desc Cliente",
            SheetColumn::Stage => "Desc Variedad",
            SheetColumn::Family => "Des Familia",
            SheetColumn::ProductCode => "Material",
            SheetColumn::ProductName => "Desc Material",
            SheetColumn::InvoiceClass => "Clase de factura",
            SheetColumn::InvoiceNumber => "Doc.facturación",
            SheetColumn::OrderReference => "Referencia clientes",
            SheetColumn::RecipientCode => "Codigo Destinatario",
            SheetColumn::RecipientName => "Destinatario",
            SheetColumn::Partners => "Socios",
            SheetColumn::InvoiceDate => "Fecha factura",
            SheetColumn::BilledQuantity => "Cantidad facturada",
            SheetColumn::Weight => "TM",
            SheetColumn::NetValue => "Valor neto",
            SheetColumn::Bonus => "Bonificación",
            SheetColumn::UnitPrice => "PVP",
            SheetColumn::InvoiceDiscount => "Dto. Factura",
            SheetColumn::CreditPrice => "P. Crédito",
            SheetColumn::AdditionalDiscount => "Dto. Adicional",
            SheetColumn::BasePriceBonus => "Bonif. P.Base",
            SheetColumn::NetValueBonus => "Bonif. P.Neto",
            SheetColumn::BasePriceContribution => "APORTE Bonif. P.Base",
            SheetColumn::NetValueContribution => "APORTE Bonif. P.Neto",
            SheetColumn::Contribution => "APORTE",
        }
    }

    pub fn value(&self, row: &ContributionResult) -> CellValue {
        let tx = &row.transaction;
        match self {
            SheetColumn::NodeCode => CellValue::Text(tx.node_code.clone()),
            SheetColumn::NodeName => CellValue::Text(tx.node_name.clone()),
            SheetColumn::ClientCode => CellValue::Text(tx.client_code.clone()),
            SheetColumn::ClientName => CellValue::Text(tx.client_name.clone()),
            SheetColumn::Stage => CellValue::Text(tx.stage.clone()),
            SheetColumn::Family => CellValue::Text(tx.family.clone()),
            SheetColumn::ProductCode => CellValue::Text(tx.product_code.clone()),
            SheetColumn::ProductName => CellValue::Text(tx.product_name.clone()),
            SheetColumn::InvoiceClass => CellValue::Text(tx.invoice_class.clone()),
            SheetColumn::InvoiceNumber => CellValue::Text(tx.invoice_number.clone()),
            SheetColumn::OrderReference => CellValue::Text(tx.order_reference.clone()),
            SheetColumn::RecipientCode => CellValue::Text(tx.recipient_code.clone()),
            SheetColumn::RecipientName => CellValue::Text(tx.recipient_name.clone()),
            SheetColumn::Partners => tx
                .partners
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
            SheetColumn::InvoiceDate => tx
                .invoice_date
                .map(|d| CellValue::Text(d.format("%d/%m/%Y").to_string()))
                .unwrap_or(CellValue::Empty),
            SheetColumn::BilledQuantity => CellValue::Number(tx.billed_quantity),
            SheetColumn::Weight => CellValue::Number(tx.weight),
            SheetColumn::NetValue => CellValue::Number(tx.net_value),
            SheetColumn::Bonus => CellValue::number(row.bonus_rate),
            SheetColumn::UnitPrice => CellValue::number(row.unit_price),
            SheetColumn::InvoiceDiscount => CellValue::number(row.invoice_discount),
            SheetColumn::CreditPrice => CellValue::number(row.credit_price),
            SheetColumn::AdditionalDiscount => CellValue::number(row.additional_discount),
            SheetColumn::BasePriceBonus => CellValue::number(row.base_price_bonus),
            SheetColumn::NetValueBonus => CellValue::number(row.net_value_bonus),
            SheetColumn::BasePriceContribution => CellValue::number(row.base_price_contribution),
            SheetColumn::NetValueContribution => CellValue::number(row.net_value_contribution),
            SheetColumn::Contribution => CellValue::number(row.contribution_amount),
        }
    }
}

// ==========================================
// 明细表 (Settlement Sheet)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSheet {
    pub name: String,
    pub columns: Vec<SheetColumn>,
    pub records: Vec<ContributionResult>,
}

impl SettlementSheet {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    /// 按列定义渲染为单元格矩阵
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        self.records
            .iter()
            .map(|r| self.columns.iter().map(|c| c.value(r)).collect())
            .collect()
    }

    pub fn contribution_total(&self) -> f64 {
        self.records.iter().map(|r| r.contribution()).sum()
    }

    pub fn to_table(&self) -> SheetTable {
        SheetTable {
            name: self.name.clone(),
            headers: self.headers().into_iter().map(String::from).collect(),
            rows: self.rows(),
        }
    }
}

/// 渲染层使用的扁平表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ==========================================
// 汇总表 (Summary Sheet)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryRowKind {
    Group,   // 分组合计行
    Total,   // 总计行
    Derived, // 派生比率行(区间规则)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub kind: SummaryRowKind,
    pub keys: Vec<String>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySheet {
    pub name: String,
    pub key_headers: Vec<String>,
    pub value_headers: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummarySheet {
    pub fn value_index(&self, header: &str) -> Option<usize> {
        self.value_headers.iter().position(|h| h == header)
    }

    pub fn total_row(&self) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.kind == SummaryRowKind::Total)
    }

    /// 总计行中指定列的值
    pub fn total(&self, header: &str) -> Option<f64> {
        let idx = self.value_index(header)?;
        self.total_row()?.values.get(idx).copied().flatten()
    }

    pub fn group_rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(|r| r.kind == SummaryRowKind::Group)
    }

    /// 按首个键查找行(派生行用标签查找)
    pub fn row_by_label(&self, label: &str) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|r| r.keys.first().map(|k| k == label).unwrap_or(false))
    }

    pub fn value(&self, row: &SummaryRow, header: &str) -> Option<f64> {
        let idx = self.value_index(header)?;
        row.values.get(idx).copied().flatten()
    }
}

// ==========================================
// Sell-Out 透视表
// ==========================================
// 每个 (client, stage, family, product) 一行,每个出现的基准一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellOutPivotRow {
    pub client: String,
    pub stage: String,
    pub family: String,
    pub product: String,
    pub base_price_bonus: f64,
    pub net_value_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellOutPivot {
    /// 出现的基准列,顺序: BasePrice 在前
    pub bases: Vec<ApplicationBasis>,
    pub rows: Vec<SellOutPivotRow>,
}

impl SellOutPivot {
    pub fn has(&self, basis: ApplicationBasis) -> bool {
        self.bases.contains(&basis)
    }

    pub fn find(&self, client: &str, stage: &str, family: &str, product: &str) -> Option<&SellOutPivotRow> {
        self.rows.iter().find(|r| {
            r.client == client && r.stage == stage && r.family == family && r.product == product
        })
    }
}
