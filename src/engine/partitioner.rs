// ==========================================
// 节点折扣结算引擎 - 明细表拆分
// ==========================================
// Sell-In : 每个月份一张表 "Base MM.YYYY"
// Sell-Out: 每个客户一张表 "Base {客户名称}"
// 列定义: 去掉期间 / 节点 / 价格分项列,按策略追加计算列
// ==========================================

use crate::domain::sheet::{ContributionResult, SettlementSheet, SheetColumn};
use crate::domain::types::ApplicationBasis;
use crate::engine::period::month_sheet_name;
use crate::engine::strategy::{Computation, SettlementStrategy};
use tracing::debug;

pub struct SheetPartitioner;

impl SheetPartitioner {
    /// 按策略拆分明细表
    ///
    /// # 参数
    /// - strategy: 结算策略
    /// - computation: 计算产物
    /// - months: 输出月份(物流类为所选单月)
    /// - year: 结算年份
    pub fn partition(
        strategy: &SettlementStrategy,
        computation: &Computation,
        months: &[u32],
        year: i32,
    ) -> Vec<SettlementSheet> {
        let columns = Self::columns(strategy, computation);
        let sheets = match strategy {
            SettlementStrategy::SellOut => Self::by_client(computation.rows(), &columns),
            _ => Self::by_month(computation.rows(), months, year, &columns),
        };

        debug!(
            strategy = %strategy,
            sheets = sheets.len(),
            "明细表拆分完成"
        );
        sheets
    }

    /// 每月一张表;某月无记录时仍输出空表
    pub fn by_month(
        rows: &[ContributionResult],
        months: &[u32],
        year: i32,
        columns: &[SheetColumn],
    ) -> Vec<SettlementSheet> {
        months
            .iter()
            .map(|month| SettlementSheet {
                name: month_sheet_name(*month, year),
                columns: columns.to_vec(),
                records: rows
                    .iter()
                    .filter(|r| r.transaction.month == *month)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// 每个客户一张表,按客户首次出现顺序
    pub fn by_client(rows: &[ContributionResult], columns: &[SheetColumn]) -> Vec<SettlementSheet> {
        let mut clients: Vec<(&str, &str)> = Vec::new();
        for r in rows {
            let code = r.transaction.client_code.as_str();
            if !clients.iter().any(|(c, _)| *c == code) {
                clients.push((code, r.transaction.client_name.as_str()));
            }
        }

        clients
            .into_iter()
            .map(|(code, name)| SettlementSheet {
                name: format!("Base {}", name),
                columns: columns.to_vec(),
                records: rows
                    .iter()
                    .filter(|r| r.transaction.client_code == code)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// 明细列定义
    pub fn columns(strategy: &SettlementStrategy, computation: &Computation) -> Vec<SheetColumn> {
        use SheetColumn::*;

        if let SettlementStrategy::SellOut = strategy {
            let mut columns = vec![
                NodeCode,
                NodeName,
                ClientCode,
                ClientName,
                Stage,
                Family,
                ProductCode,
                ProductName,
                InvoiceNumber,
                InvoiceDate,
                BilledQuantity,
                Weight,
                NetValue,
                UnitPrice,
                InvoiceDiscount,
            ];
            if let Some(pivot) = computation.pivot() {
                if pivot.has(ApplicationBasis::BasePrice) {
                    columns.extend([BasePriceBonus, BasePriceContribution]);
                }
                if pivot.bases.iter().any(|b| *b != ApplicationBasis::BasePrice) {
                    columns.extend([NetValueBonus, NetValueContribution]);
                }
            }
            return columns;
        }

        let band = *strategy == SettlementStrategy::WeightBand;
        let mut columns = vec![
            ClientCode,
            ClientName,
            RecipientCode,
            RecipientName,
            Stage,
            Family,
            ProductCode,
            ProductName,
        ];
        if band {
            columns.push(InvoiceClass);
        }
        columns.push(InvoiceNumber);
        if band {
            columns.push(Partners);
        }
        columns.extend([InvoiceDate, OrderReference, BilledQuantity, Weight, NetValue]);

        match strategy.basis() {
            _ if band => {}
            Some(ApplicationBasis::BasePrice) | Some(ApplicationBasis::NetValue) => {
                columns.extend([
                    Bonus,
                    UnitPrice,
                    InvoiceDiscount,
                    CreditPrice,
                    AdditionalDiscount,
                    Contribution,
                ]);
            }
            _ => columns.extend([Bonus, Contribution]),
        }
        columns
    }
}
