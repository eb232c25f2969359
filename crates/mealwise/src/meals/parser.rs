use serde::Deserialize;
use serde_json::Value;

use super::domain::MealSuggestion;
use super::MealSuggestionError;

#[derive(Debug, Deserialize)]
struct LooseSuggestion {
    #[serde(default)]
    meal: Option<String>,
    #[serde(default, alias = "dish", alias = "title")]
    name: Option<String>,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default, alias = "discountedItems", alias = "uses")]
    discounted_items: Vec<String>,
    #[serde(default, alias = "recipe", alias = "steps")]
    instructions: Option<String>,
}

/// Pulls meal suggestions out of a model reply. Accepts a bare JSON array, an
/// object with a `meals` array, either one wrapped in Markdown fences or
/// surrounded by prose. Entries without a name are dropped; a missing meal
/// slot is taken from the requested meals by position.
pub fn parse_suggestions(
    reply: &str,
    requested_meals: &[String],
) -> Result<Vec<MealSuggestion>, MealSuggestionError> {
    let payload = strip_code_fence(reply);
    let value = extract_json(payload).ok_or(MealSuggestionError::Unparseable)?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object
            .remove("meals")
            .or_else(|| object.remove("suggestions"))
        {
            Some(Value::Array(entries)) => entries,
            _ => return Err(MealSuggestionError::Unparseable),
        },
        _ => return Err(MealSuggestionError::Unparseable),
    };

    let suggestions: Vec<MealSuggestion> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<LooseSuggestion>(entry).ok())
        .enumerate()
        .filter_map(|(index, loose)| {
            let name = loose.name.map(|name| name.trim().to_string())?;
            if name.is_empty() {
                return None;
            }
            let meal = loose
                .meal
                .filter(|meal| !meal.trim().is_empty())
                .or_else(|| requested_meals.get(index).cloned())
                .unwrap_or_else(|| "meal".to_string());
            Some(MealSuggestion {
                meal,
                name,
                ingredients: loose.ingredients,
                discounted_items: loose.discounted_items,
                instructions: loose.instructions.filter(|text| !text.trim().is_empty()),
            })
        })
        .collect();

    if suggestions.is_empty() {
        return Err(MealSuggestionError::Empty);
    }
    Ok(suggestions)
}

fn strip_code_fence(reply: &str) -> &str {
    let Some(start) = reply.find("```") else {
        return reply.trim();
    };
    let after_fence = &reply[start + 3..];
    // Skip the language tag on the opening fence line.
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn extract_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    // Parse the first complete value at each opening bracket; trailing prose is ignored.
    text.char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{')
        .find_map(|(start, _)| {
            serde_json::Deserializer::from_str(&text[start..])
                .into_iter::<Value>()
                .next()
                .and_then(Result::ok)
                .filter(looks_like_suggestions)
        })
}

/// Footnotes such as "[1]" parse as JSON too; only objects or lists of objects count.
fn looks_like_suggestions(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_object),
        _ => false,
    }
}
