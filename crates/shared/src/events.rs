//! 预算汇总事件模型
//!
//! 定义每周预算汇总在服务与通知组件之间传递的数据结构：
//! 超支分类、接近上限分类以及一次汇总的完整摘要。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 超支分类
///
/// 本月支出已超过（汇总后的）预算金额
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverBudgetCategory {
    pub category_name: String,
    pub budget_amount: Decimal,
    pub spent_amount: Decimal,
    /// 超出金额，恒大于 0
    pub over_by_amount: Decimal,
}

/// 接近上限分类
///
/// 支出达到预算的阈值比例（默认 90%，含边界）但尚未超出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearLimitCategory {
    pub category_name: String,
    pub budget_amount: Decimal,
    pub spent_amount: Decimal,
    /// 剩余额度，不小于 0
    pub remaining_amount: Decimal,
}

/// 一次预算汇总的摘要
///
/// 同一次汇总的所有收件人共享同一份摘要，只有收件人信息不同
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDigest {
    /// 人类可读的月份标签，如 "October 2026"
    pub month_label: String,
    /// 按超出金额降序
    pub over_budget: Vec<OverBudgetCategory>,
    /// 按已支出金额降序
    pub near_limit: Vec<NearLimitCategory>,
    /// 邮件中 "查看预算" 链接
    pub app_url: String,
}

impl BudgetDigest {
    /// 两个列表都为空时，邮件只报告 "一切正常"
    pub fn is_all_clear(&self) -> bool {
        self.over_budget.is_empty() && self.near_limit.is_empty()
    }
}

/// 汇总邮件收件人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub name: String,
    pub email: String,
}
