//! 预算分类判定
//!
//! 纯计算，不访问存储，便于覆盖各种边界。

use std::collections::HashMap;

use budget_shared::events::{NearLimitCategory, OverBudgetCategory};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::store::BudgetedCategory;

/// 判定结果，两个列表已排好序
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Classification {
    pub over_budget: Vec<OverBudgetCategory>,
    pub near_limit: Vec<NearLimitCategory>,
}

/// 把每个有预算的分类划入超支或接近上限
///
/// - 支出大于预算：超支
/// - 预算大于 0 且支出达到 `near_limit_percent`%（含）但小于预算：接近上限
/// - 支出恰好等于预算不进入任何列表
pub fn classify(
    budgets: &[BudgetedCategory],
    spending: &HashMap<Uuid, Decimal>,
    near_limit_percent: u32,
) -> Classification {
    let threshold = Decimal::new(i64::from(near_limit_percent), 2);
    let mut result = Classification::default();

    for budget in budgets {
        let spent = spending
            .get(&budget.category_id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let over_by = spent - budget.budget_amount;

        if over_by > Decimal::ZERO {
            result.over_budget.push(OverBudgetCategory {
                category_name: budget.category_name.clone(),
                budget_amount: budget.budget_amount,
                spent_amount: spent,
                over_by_amount: over_by,
            });
        } else if over_by < Decimal::ZERO
            && budget.budget_amount > Decimal::ZERO
            && spent >= budget.budget_amount * threshold
        {
            result.near_limit.push(NearLimitCategory {
                category_name: budget.category_name.clone(),
                budget_amount: budget.budget_amount,
                spent_amount: spent,
                remaining_amount: budget.budget_amount - spent,
            });
        }
    }

    result
        .over_budget
        .sort_by(|a, b| b.over_by_amount.cmp(&a.over_by_amount));
    result
        .near_limit
        .sort_by(|a, b| b.spent_amount.cmp(&a.spent_amount));
    result
}
