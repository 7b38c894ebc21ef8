//! 汇总邮件模板
//!
//! 把 `BudgetDigest` 渲染成邮件主题、HTML 正文和纯文本正文。
//! 模板硬编码在代码中，用户可控的分类名称一律做 HTML 转义。

use budget_shared::events::{BudgetDigest, Recipient};
use rust_decimal::Decimal;

use crate::sender::EmailMessage;

/// 渲染后的邮件内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl RenderedEmail {
    /// 组装成可发送的邮件
    pub fn into_message(self, from: &str, recipient: &Recipient) -> EmailMessage {
        EmailMessage {
            from: from.to_string(),
            to: recipient.email.clone(),
            subject: self.subject,
            html: self.html,
            text: self.text,
        }
    }
}

/// 每周预算汇总邮件模板
pub struct SummaryEmailTemplate;

impl SummaryEmailTemplate {
    /// 主题包含月份与两类分类的数量，方便在收件箱中直接看到状态
    pub fn subject(digest: &BudgetDigest) -> String {
        if digest.is_all_clear() {
            return format!("Budget summary for {}: all on track", digest.month_label);
        }
        format!(
            "Budget summary for {}: {} over budget, {} near limit",
            digest.month_label,
            digest.over_budget.len(),
            digest.near_limit.len()
        )
    }

    /// 渲染完整邮件
    pub fn render(recipient: &Recipient, digest: &BudgetDigest) -> RenderedEmail {
        RenderedEmail {
            subject: Self::subject(digest),
            html: Self::render_html(recipient, digest),
            text: Self::render_text(recipient, digest),
        }
    }

    fn render_html(recipient: &Recipient, digest: &BudgetDigest) -> String {
        let mut sections = String::new();

        if !digest.over_budget.is_empty() {
            sections.push_str("<h2 style=\"color:#b91c1c\">Over budget</h2><table>");
            sections.push_str(
                "<tr><th align=\"left\">Category</th><th>Budget</th><th>Spent</th><th>Over by</th></tr>",
            );
            for c in &digest.over_budget {
                sections.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&c.category_name),
                    format_money(c.budget_amount),
                    format_money(c.spent_amount),
                    format_money(c.over_by_amount)
                ));
            }
            sections.push_str("</table>");
        }

        if !digest.near_limit.is_empty() {
            sections.push_str("<h2 style=\"color:#b45309\">Near limit</h2><table>");
            sections.push_str(
                "<tr><th align=\"left\">Category</th><th>Budget</th><th>Spent</th><th>Remaining</th></tr>",
            );
            for c in &digest.near_limit {
                sections.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&c.category_name),
                    format_money(c.budget_amount),
                    format_money(c.spent_amount),
                    format_money(c.remaining_amount)
                ));
            }
            sections.push_str("</table>");
        }

        if digest.is_all_clear() {
            sections.push_str("<p>Every budgeted category is comfortably on track. Nice work!</p>");
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        table {{ width: 100%; border-collapse: collapse; }}
        td, th {{ padding: 4px 8px; border-bottom: 1px solid #eee; }}
        .footer {{ text-align: center; color: #888; font-size: 12px; margin-top: 20px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Weekly budget summary: {month}</h1>
        <p>Hi {name},</p>
        {sections}
        <p><a href="{url}">Open your budgets</a></p>
        <div class="footer">
            <p>This summary is sent every Monday morning.</p>
        </div>
    </div>
</body>
</html>"#,
            title = escape_html(&Self::subject(digest)),
            month = escape_html(&digest.month_label),
            name = escape_html(&recipient.name),
            sections = sections,
            url = escape_html(&digest.app_url),
        )
    }

    fn render_text(recipient: &Recipient, digest: &BudgetDigest) -> String {
        let mut lines = vec![
            format!("Weekly budget summary: {}", digest.month_label),
            String::new(),
            format!("Hi {},", recipient.name),
            String::new(),
        ];

        if !digest.over_budget.is_empty() {
            lines.push("Over budget:".to_string());
            for c in &digest.over_budget {
                lines.push(format!(
                    "- {}: spent {} of {} (over by {})",
                    c.category_name,
                    format_money(c.spent_amount),
                    format_money(c.budget_amount),
                    format_money(c.over_by_amount)
                ));
            }
            lines.push(String::new());
        }

        if !digest.near_limit.is_empty() {
            lines.push("Near limit:".to_string());
            for c in &digest.near_limit {
                lines.push(format!(
                    "- {}: spent {} of {} ({} remaining)",
                    c.category_name,
                    format_money(c.spent_amount),
                    format_money(c.budget_amount),
                    format_money(c.remaining_amount)
                ));
            }
            lines.push(String::new());
        }

        if digest.is_all_clear() {
            lines.push("Every budgeted category is comfortably on track.".to_string());
            lines.push(String::new());
        }

        lines.push(format!("Open your budgets: {}", digest.app_url));
        lines.join("\n")
    }
}

/// 以美元格式输出金额：千分位分隔、两位小数，如 `$1,234.50`、`-$20.00`
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let formatted = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{frac_part}")
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
