// ==========================================
// 节点折扣结算引擎 - 引擎编排器
// ==========================================
// 用途: 协调各组件的执行顺序
//   条件过滤 → 月份窗口 → 策略选择 → 台账过滤
//   → 展开 / 区间规则 → 计算器 → 明细拆分 + 汇总
// 红线: 快照只读; 空结果以 SettlementOutcome::Empty 返回,不是错误
// ==========================================

use crate::config::EngineConfig;
use crate::domain::settlement::{
    EmptyReason, SettlementOutcome, SettlementOutput, SettlementRequest, SettlementSnapshot,
};
use crate::domain::types::Liquidation;
use crate::engine::condition_filter::ConditionFilter;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::partitioner::SheetPartitioner;
use crate::engine::period::{month_window, resolve_period};
use crate::engine::strategy::SettlementStrategy;
use crate::engine::summary::SummaryAggregator;
use crate::engine::transaction_filter::TransactionFilter;
use tracing::{debug, info, instrument, Span};
use uuid::Uuid;

// ==========================================
// SettlementEngine - 结算引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    config: EngineConfig,
}

impl SettlementEngine {
    /// 创建引擎实例
    ///
    /// # 参数
    /// - config: 业务常量配置
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 执行一次结算
    ///
    /// # 参数
    /// - snapshot: 输入快照(只读)
    /// - request: 结算请求
    ///
    /// # 返回
    /// - Ok(Generated): 明细表 + 汇总表
    /// - Ok(Empty): 无条件 / 无交易 / 无匹配
    /// - Err: 输入不变量错误
    #[instrument(skip(self, snapshot), fields(
        run_id = tracing::field::Empty,
        liquidation = %request.liquidation,
        node = %request.node,
        discount_type = %request.discount_type,
        year = request.year,
        month = request.month,
    ))]
    pub fn run(
        &self,
        snapshot: &SettlementSnapshot,
        request: &SettlementRequest,
    ) -> EngineResult<SettlementOutcome> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", tracing::field::display(run_id));

        if request.node.trim().is_empty() {
            return Err(EngineError::InvalidRequest("节点名称为空".to_string()));
        }

        info!(
            catalog_rows = snapshot.conditions.len(),
            sales_rows = snapshot.sales.len(),
            sellout_rows = snapshot.sellout.len(),
            "开始执行结算"
        );

        // ==========================================
        // 步骤1: 条件目录过滤
        // ==========================================
        let conditions = ConditionFilter::filter(
            &snapshot.conditions,
            request.liquidation,
            &request.node,
            request.discount_type,
        );
        let Some(period) = resolve_period(&conditions) else {
            info!(reason = %EmptyReason::NoConditions, "结算结束: 空结果");
            return Ok(SettlementOutcome::Empty(EmptyReason::NoConditions));
        };

        // ==========================================
        // 步骤2: 月份窗口 + 策略选择
        // ==========================================
        let window = month_window(period, request.month)?;
        let strategy = SettlementStrategy::select(request, &conditions, &self.config)?;
        let months = if strategy.is_logistics() {
            vec![request.month]
        } else {
            window
        };
        debug!(strategy = %strategy, ?months, period = %period, "策略已选定");

        // ==========================================
        // 步骤3: 台账过滤
        // ==========================================
        let transactions = match request.liquidation {
            Liquidation::SellIn => TransactionFilter::sell_in(
                &snapshot.sales,
                &request.node,
                request.year,
                &months,
                &self.config.sell_in_invoice_classes,
            ),
            Liquidation::SellOut => {
                let node_code = ConditionFilter::node_code(&conditions).unwrap_or_default();
                TransactionFilter::sell_out(&snapshot.sellout, node_code, request.year, &months)
            }
        };
        if transactions.is_empty() {
            info!(reason = %EmptyReason::NoTransactions, "结算结束: 空结果");
            return Ok(SettlementOutcome::Empty(EmptyReason::NoTransactions));
        }

        // ==========================================
        // 步骤4: 展开 + 计算
        // ==========================================
        let computation =
            strategy.compute(&transactions, &conditions, &snapshot.prices, &self.config)?;
        if computation.rows().is_empty() {
            info!(reason = %EmptyReason::NoMatches, "结算结束: 空结果");
            return Ok(SettlementOutcome::Empty(EmptyReason::NoMatches));
        }

        // ==========================================
        // 步骤5: 明细拆分 + 汇总
        // ==========================================
        let sheets = SheetPartitioner::partition(&strategy, &computation, &months, request.year);
        let summary = SummaryAggregator::summarize(&strategy, &computation, &self.config);

        let output = SettlementOutput {
            run_id,
            request: request.clone(),
            sheets,
            summaries: vec![summary],
            pivot: computation.pivot().cloned(),
        };

        info!(
            strategy = %strategy,
            sheets = output.sheets.len(),
            rows = computation.rows().len(),
            contribution_total = output.contribution_total(),
            "结算完成"
        );
        Ok(SettlementOutcome::Generated(output))
    }
}
