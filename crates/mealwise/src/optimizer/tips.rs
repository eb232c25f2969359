use chrono::{DateTime, Utc};

use super::{rank_by_savings, BasketTotals, PurchaseOption};

/// Request-level facts the tips refer to.
#[derive(Debug, Clone, Copy)]
pub struct TipContext {
    pub organic_only: bool,
    pub budget: Option<f64>,
    pub now: DateTime<Utc>,
}

pub fn shopping_tips(
    purchases: &[PurchaseOption],
    totals: &BasketTotals,
    context: TipContext,
) -> Vec<String> {
    let mut tips = Vec::new();
    if purchases.is_empty() {
        return tips;
    }

    let expiring: Vec<&str> = purchases
        .iter()
        .filter(|option| option.item.hours_until_expiry(context.now) <= 24.0)
        .map(|option| option.item.product_name.as_str())
        .collect();
    if !expiring.is_empty() {
        tips.push(format!(
            "Use within 24 hours: {}. Plan these into your first meals.",
            expiring.join(", ")
        ));
    }

    let mut stores: Vec<&str> = Vec::new();
    for option in purchases {
        if !stores.contains(&option.item.store.name.as_str()) {
            stores.push(option.item.store.name.as_str());
        }
    }
    if stores.len() == 1 {
        tips.push(format!("Everything is available at {}.", stores[0]));
    } else {
        tips.push(format!(
            "Combine your trip: {} stores carry these offers ({}).",
            stores.len(),
            stores.join(", ")
        ));
    }

    if let Some(best) = rank_by_savings(purchases).first() {
        tips.push(format!(
            "Biggest single saving: {} at {} ({:.2} {} off).",
            best.item.product_name, best.item.store.name, best.savings, best.item.currency
        ));
    }

    if context.organic_only {
        tips.push("Only organic offers were considered.".to_string());
    }

    if let Some(budget) = context.budget {
        let remaining = budget - totals.total_cost;
        tips.push(format!(
            "Basket costs {:.2} of your {:.2} budget ({:.2} left).",
            totals.total_cost,
            budget,
            remaining.max(0.0)
        ));
    }

    tips
}
