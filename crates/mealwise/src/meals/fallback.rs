use async_trait::async_trait;

use super::domain::{MealContext, MealSuggestion};
use super::{MealSuggester, MealSuggestionError};

const ITEMS_PER_MEAL: usize = 3;

/// Deterministic suggestions: hands out the discounted items round-robin over
/// the requested meals, soonest-expiring first.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedMealSuggester;

impl RuleBasedMealSuggester {
    pub fn new() -> Self {
        Self
    }

    pub fn suggest_now(&self, context: &MealContext) -> Vec<MealSuggestion> {
        if context.ingredients.is_empty() || context.meals.is_empty() {
            return Vec::new();
        }

        let mut ordered: Vec<_> = context.ingredients.iter().collect();
        ordered.sort_by_key(|ingredient| ingredient.expires_at);

        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); context.meals.len()];
        for (index, ingredient) in ordered
            .into_iter()
            .take(ITEMS_PER_MEAL * context.meals.len())
            .enumerate()
        {
            buckets[index % context.meals.len()].push(ingredient.name.clone());
        }

        context
            .meals
            .iter()
            .zip(buckets)
            .filter(|(_, items)| !items.is_empty())
            .map(|(meal, items)| MealSuggestion {
                meal: meal.clone(),
                name: format!("{} with {}", capitalize(meal), join_names(&items)),
                ingredients: items.clone(),
                discounted_items: items,
                instructions: None,
            })
            .collect()
    }
}

#[async_trait]
impl MealSuggester for RuleBasedMealSuggester {
    async fn suggest(
        &self,
        context: &MealContext,
    ) -> Result<Vec<MealSuggestion>, MealSuggestionError> {
        Ok(self.suggest_now(context))
    }

    fn describe(&self) -> &'static str {
        "rule_based"
    }
}

fn capitalize(value: &str) -> String {
    let trimmed = value.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_names(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
