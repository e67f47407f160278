use std::collections::HashSet;

use crate::models::{Category, Direction};

/// Default categories seeded for every new user: (name, direction, keywords).
/// Order matters, the first category with a matching keyword wins.
pub const DEFAULT_CATEGORIES: &[(&str, Direction, &str)] = &[
    ("Food", Direction::Expense, "food,groceries,supermarket,store"),
    ("Cafe", Direction::Expense, "cafe,restaurant,bar,coffee,coffee shop"),
    ("Delivery", Direction::Expense, "delivery,yandex food,yandex lavka,lavka"),
    ("Transport", Direction::Expense, "taxi,metro,bus,transport,fare"),
    ("Utilities", Direction::Expense, "rent,utilities,water,electricity,gas,internet"),
    ("Tobacco", Direction::Expense, "cigarettes,tobacco,nicotine,vape,e-cigarette"),
    ("Flowers", Direction::Expense, "flowers,plants,bouquet"),
    ("Pets", Direction::Expense, "kibble,animals,pet,cat,dog,vet,veterinary"),
    ("Salary", Direction::Income, "salary,advance,paycheck,stipend"),
    ("Side job", Direction::Income, "side job,freelance"),
    ("Gift", Direction::Income, "gift,gifted"),
];

/// A keyword hits when it is a substring of the lowercased description or
/// equals one of its whitespace-separated words, so "cafe" also hits
/// "cafeteria".
fn keyword_matches(keyword: &str, text: &str, words: &HashSet<&str>) -> bool {
    text.contains(keyword) || words.contains(keyword)
}

/// Pick the first category (in table order) of the given direction whose
/// keywords match `description`, or the direction's fallback name.
pub fn resolve_category(categories: &[Category], description: &str, direction: Direction) -> String {
    let text = description.to_lowercase();
    let words: HashSet<&str> = text.split_whitespace().collect();

    categories
        .iter()
        .filter(|c| c.direction == direction)
        .find(|c| {
            c.keywords
                .iter()
                .map(|kw| kw.trim().to_lowercase())
                .filter(|kw| !kw.is_empty())
                .any(|kw| keyword_matches(&kw, &text, &words))
        })
        .map(|c| c.name.clone())
        .unwrap_or_else(|| direction.fallback_category().to_string())
}
