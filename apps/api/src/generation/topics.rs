//! Topic pools for assessment and coding-problem prompts, plus positional
//! category backfill for generated question batches.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

/// Labels that mean "the model did not pick a category".
const PLACEHOLDER_CATEGORIES: &[&str] = &["general", "misc", "other", "n/a"];

#[derive(Debug, Clone, PartialEq)]
pub struct TopicPool {
    pub label: String,
    /// How many MCQs of this topic a daily batch holds.
    pub count: usize,
    pub subtopics: Vec<String>,
}

impl TopicPool {
    fn new(label: &str, count: usize, subtopics: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            count,
            subtopics: subtopics.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn pick_subtopic<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.subtopics.choose(rng).map(String::as_str)
    }
}

/// Immutable topic configuration for the daily batch and coding problems.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicCatalog {
    /// MCQ topics, in batch order.
    pub mcq: Vec<TopicPool>,
    pub subjective: TopicPool,
    pub coding_themes: Vec<String>,
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self {
            mcq: vec![
                TopicPool::new(
                    "Java",
                    5,
                    &[
                        "collections framework",
                        "JVM memory model and garbage collection",
                        "concurrency and the java.util.concurrent package",
                        "exceptions and error handling",
                        "streams and lambdas",
                        "generics and type erasure",
                    ],
                ),
                TopicPool::new(
                    "DSA",
                    5,
                    &[
                        "arrays and two-pointer techniques",
                        "hash tables",
                        "trees and binary search trees",
                        "graphs and traversal",
                        "dynamic programming",
                        "sorting and searching complexity",
                        "stacks, queues and heaps",
                    ],
                ),
                TopicPool::new(
                    "OOPs",
                    5,
                    &[
                        "encapsulation and access control",
                        "inheritance versus composition",
                        "polymorphism and dynamic dispatch",
                        "SOLID principles",
                        "design patterns",
                        "abstract classes versus interfaces",
                    ],
                ),
            ],
            subjective: TopicPool::new(
                "Subjective",
                1,
                &[
                    "system design trade-offs",
                    "debugging a production incident",
                    "API design",
                    "scaling a web application",
                ],
            ),
            coding_themes: [
                "arrays",
                "strings",
                "hash maps",
                "linked lists",
                "binary trees",
                "graphs",
                "dynamic programming",
                "sliding window",
                "intervals",
                "heaps",
                "backtracking",
                "binary search",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl TopicCatalog {
    /// Size of a complete daily batch (5 + 5 + 5 + 1 by default).
    pub fn expected_total(&self) -> usize {
        self.mcq.iter().map(|pool| pool.count).sum::<usize>() + self.subjective.count
    }

    /// Category implied by position: the MCQ pools in order, then subjective.
    pub fn category_for_index(&self, index: usize) -> &str {
        let mut upper = 0;
        for pool in &self.mcq {
            upper += pool.count;
            if index < upper {
                return &pool.label;
            }
        }
        &self.subjective.label
    }

    /// Canonical label for a known category, matched case-insensitively.
    pub fn canonical(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        self.mcq
            .iter()
            .chain(std::iter::once(&self.subjective))
            .find(|pool| pool.label.eq_ignore_ascii_case(label))
            .map(|pool| pool.label.as_str())
    }

    pub fn pick_coding_theme<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.coding_themes.choose(rng).map(String::as_str)
    }
}

/// Rewrites each item's `category` to a canonical label, inferring it from the
/// item's position when it is missing, blank, a placeholder such as "General",
/// or not one of the catalog's topics. Non-object items are left alone.
pub fn backfill_categories(items: &mut [Value], catalog: &TopicCatalog) {
    for (index, item) in items.iter_mut().enumerate() {
        let Value::Object(map) = item else {
            continue;
        };

        let current = map.get("category").and_then(Value::as_str).map(str::trim);
        let resolved = match current {
            Some(label) if !is_placeholder(label) => catalog.canonical(label),
            _ => None,
        };
        let category = resolved.unwrap_or_else(|| catalog.category_for_index(index));
        map.insert("category".to_string(), Value::String(category.to_string()));
    }
}

fn is_placeholder(label: &str) -> bool {
    label.is_empty()
        || PLACEHOLDER_CATEGORIES
            .iter()
            .any(|p| p.eq_ignore_ascii_case(label))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_batch_is_sixteen_items() {
        assert_eq!(TopicCatalog::default().expected_total(), 16);
    }

    #[test]
    fn test_positional_categories() {
        let catalog = TopicCatalog::default();
        assert_eq!(catalog.category_for_index(0), "Java");
        assert_eq!(catalog.category_for_index(4), "Java");
        assert_eq!(catalog.category_for_index(5), "DSA");
        assert_eq!(catalog.category_for_index(9), "DSA");
        assert_eq!(catalog.category_for_index(10), "OOPs");
        assert_eq!(catalog.category_for_index(14), "OOPs");
        assert_eq!(catalog.category_for_index(15), "Subjective");
        assert_eq!(catalog.category_for_index(40), "Subjective");
    }

    #[test]
    fn test_backfill_sixteen_items_without_categories() {
        let catalog = TopicCatalog::default();
        let mut items: Vec<Value> = (0..16)
            .map(|i| json!({"type": "mcq", "text": format!("Question {i} about DSA")}))
            .collect();

        backfill_categories(&mut items, &catalog);

        let categories: Vec<&str> = items
            .iter()
            .map(|item| item["category"].as_str().unwrap())
            .collect();
        assert!(categories[0..5].iter().all(|c| *c == "Java"));
        assert!(categories[5..10].iter().all(|c| *c == "DSA"));
        assert!(categories[10..15].iter().all(|c| *c == "OOPs"));
        assert_eq!(categories[15], "Subjective");
    }

    #[test]
    fn test_backfill_replaces_placeholders_and_keeps_known_labels() {
        let catalog = TopicCatalog::default();
        let mut items = vec![
            json!({"category": "General"}),
            json!({"category": "dsa"}),
            json!({"category": "Astrology"}),
            json!({"category": null}),
            json!("not an object"),
        ];

        backfill_categories(&mut items, &catalog);

        assert_eq!(items[0]["category"], "Java");
        assert_eq!(items[1]["category"], "DSA");
        assert_eq!(items[2]["category"], "Java");
        assert_eq!(items[3]["category"], "Java");
        assert_eq!(items[4], json!("not an object"));
    }

    #[test]
    fn test_subtopic_pick_comes_from_pool() {
        let catalog = TopicCatalog::default();
        let mut rng = rand::thread_rng();
        let pool = &catalog.mcq[1];
        let pick = pool.pick_subtopic(&mut rng).unwrap();
        assert!(pool.subtopics.iter().any(|s| s == pick));
        assert!(catalog.pick_coding_theme(&mut rng).is_some());
    }
}
