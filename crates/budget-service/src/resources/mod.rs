//! 实体定义
//!
//! 每个文件声明一个实体的输入结构与生命周期钩子，交给 CRUD 工厂驱动。

mod budget;
mod category;
mod contribution;
mod income;
mod recurring_charge;
mod saving;
mod savings_goal;
mod transaction;
mod user;

pub use budget::{BudgetInput, Budgets};
pub use category::{Categories, CategoryInput};
pub use contribution::{ContributionInput, Contributions};
pub use income::{Income, IncomeInput};
pub use recurring_charge::{Frequency, RecurringChargeInput, RecurringCharges};
pub use saving::{SavingInput, Savings};
pub use savings_goal::{SavingsGoalInput, SavingsGoals};
pub use transaction::{TransactionInput, Transactions};
pub use user::{Role, UserInput, Users};

use std::borrow::Cow;

use rust_decimal::{Decimal, RoundingStrategy};
use validator::ValidationError;

/// 金额保留两位小数，中点远离零舍入（0.125 -> 0.13）
pub(crate) fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 金额必须大于 0
pub(crate) fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount").with_message(Cow::Borrowed("金额必须大于 0")))
    }
}

/// 金额不能为负
pub(crate) fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("non_negative_amount").with_message(Cow::Borrowed("金额不能为负数")))
    } else {
        Ok(())
    }
}

/// 去掉首尾空白后不能为空
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("not_blank").with_message(Cow::Borrowed("不能为空")))
    } else {
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validators() {
        assert!(positive_amount(&dec!(0.01)).is_ok());
        assert!(positive_amount(&dec!(0)).is_err());
        assert!(positive_amount(&dec!(-5)).is_err());

        assert!(non_negative_amount(&dec!(0)).is_ok());
        assert!(non_negative_amount(&dec!(100)).is_ok());
        assert!(non_negative_amount(&dec!(-0.01)).is_err());
    }

    #[test]
    fn test_money_rounds_half_away_from_zero() {
        assert_eq!(money(dec!(0.125)), dec!(0.13));
        assert_eq!(money(dec!(2.675)), dec!(2.68));
        assert_eq!(money(dec!(10.004)), dec!(10.00));
        assert_eq!(money(dec!(-0.125)), dec!(-0.13));
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Rent").is_ok());
        assert!(not_blank("   ").is_err());
    }
}
