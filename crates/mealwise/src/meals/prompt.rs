use std::fmt::Write as _;

use super::domain::MealContext;

/// Renders the instruction sent to the generative model.
pub fn build_prompt(context: &MealContext) -> String {
    let mut prompt = String::new();

    writeln!(
        &mut prompt,
        "You are a meal planner who reduces food waste by cooking with discounted groceries."
    )
    .expect("write role");
    writeln!(
        &mut prompt,
        "Suggest one dish for each of these meals: {}.",
        context.meals.join(", ")
    )
    .expect("write meals");

    let mut constraints = Vec::new();
    if context.vegetarian {
        constraints.push("vegetarian".to_string());
    }
    if context.organic_only {
        constraints.push("organic ingredients preferred".to_string());
    }
    if !context.avoid_ingredients.is_empty() {
        constraints.push(format!("avoid {}", context.avoid_ingredients.join(", ")));
    }
    if !constraints.is_empty() {
        writeln!(&mut prompt, "Constraints: {}.", constraints.join("; ")).expect("write constraints");
    }

    prompt.push('\n');
    writeln!(&mut prompt, "Discounted items available:").expect("write items header");
    for ingredient in &context.ingredients {
        writeln!(
            &mut prompt,
            "- {} at {}: {:.2} {} (was {:.2}), best before {}",
            ingredient.name,
            ingredient.store,
            ingredient.price,
            ingredient.currency,
            ingredient.original_price,
            ingredient.expires_at.format("%Y-%m-%d %H:%M UTC")
        )
        .expect("write item");
    }

    prompt.push('\n');
    writeln!(
        &mut prompt,
        "Use as many discounted items as sensible, prioritising those that expire first. \
         Common pantry staples may be added."
    )
    .expect("write guidance");
    writeln!(
        &mut prompt,
        "Reply with JSON only: an array of objects with the keys \"meal\", \"name\", \
         \"ingredients\" (list of strings), \"discounted_items\" (list of item names from above) \
         and \"instructions\" (one short paragraph)."
    )
    .expect("write format");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::domain::MealIngredient;
    use chrono::{TimeZone, Utc};

    #[test]
    fn prompt_lists_meals_constraints_and_items() {
        let context = MealContext {
            meals: vec!["breakfast".to_string(), "dinner".to_string()],
            vegetarian: true,
            organic_only: false,
            avoid_ingredients: vec!["peanuts".to_string()],
            ingredients: vec![MealIngredient {
                name: "Cherry tomatoes 250g".to_string(),
                store: "Føtex Vesterbro".to_string(),
                price: 9.0,
                original_price: 18.0,
                currency: "DKK".to_string(),
                expires_at: Utc
                    .with_ymd_and_hms(2025, 3, 14, 22, 0, 0)
                    .single()
                    .expect("valid timestamp"),
            }],
        };

        let prompt = build_prompt(&context);
        assert!(prompt.contains("breakfast, dinner"));
        assert!(prompt.contains("vegetarian; avoid peanuts"));
        assert!(prompt.contains("- Cherry tomatoes 250g at Føtex Vesterbro: 9.00 DKK (was 18.00)"));
        assert!(prompt.contains("2025-03-14 22:00 UTC"));
        assert!(prompt.contains("JSON only"));
    }
}
