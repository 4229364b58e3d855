//! Table names derived from model names.

use tablemodel_core::to_snake_case;

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
];

const UNCOUNTABLE: &[&str] = &["data", "information", "equipment", "news", "series", "species"];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// English plural of a lowercase word.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }

    let mut chars = word.chars().rev();
    let last = chars.next().unwrap_or_default();
    let before = chars.next();

    if word.ends_with("ch") || word.ends_with("sh") || matches!(last, 's' | 'x' | 'z') {
        return format!("{word}es");
    }
    if last == 'y' && before.is_some_and(|c| !is_vowel(c)) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if last == 'o' && before.is_some_and(|c| !is_vowel(c)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Default table name for a model: snake_case with the last word pluralized.
pub fn table_name(model_name: &str) -> String {
    let snake = to_snake_case(model_name);
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralize(last)),
        None => pluralize(&snake),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_plurals() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("hero"), "heroes");
        assert_eq!(pluralize("radio"), "radios");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("status"), "statuses");
    }

    #[test]
    fn irregular_and_uncountable() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("data"), "data");
    }

    #[test]
    fn model_names() {
        assert_eq!(table_name("Hero"), "heroes");
        assert_eq!(table_name("BlogPost"), "blog_posts");
        assert_eq!(table_name("UserCategory"), "user_categories");
    }
}
