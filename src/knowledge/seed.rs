use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::types::{Document, DocumentFormat};

const ONBOARDING_GUIDE: &str = include_str!("../../seed/onboarding_guide.txt");
const HEALTH_BENEFITS: &str = include_str!("../../seed/health_benefits.txt");

/// Knowledge that ships with the service, stamped with `loaded_at`.
pub fn builtin_seed_documents(loaded_at: DateTime<Utc>) -> Vec<Document> {
    vec![
        Document {
            id: "ish-onboarding-permanent-001".to_string(),
            name: "IndiaSportsHub - HR Policies & Onboarding Guide".to_string(),
            content: ONBOARDING_GUIDE.trim_end().to_string(),
            format: DocumentFormat::Txt,
            category: Some("Legal".to_string()),
            uploaded_at: loaded_at,
        },
        Document {
            id: "ish-health-comprehensive-2024".to_string(),
            name: "IndiaSporthub - Health Benefits & Company Policies.txt".to_string(),
            content: HEALTH_BENEFITS.trim_end().to_string(),
            format: DocumentFormat::Txt,
            category: Some("Benefits".to_string()),
            uploaded_at: loaded_at,
        },
    ]
}

/// Seed documents first, then persisted documents whose id the seed does not
/// already use. A persisted copy never replaces a seed entry.
pub fn merge_with_seed(seed: Vec<Document>, persisted: Vec<Document>) -> Vec<Document> {
    let mut seen: HashSet<String> = seed.iter().map(|doc| doc.id.clone()).collect();
    let mut merged = seed;

    for doc in persisted {
        if seen.insert(doc.id.clone()) {
            merged.push(doc);
        } else {
            tracing::debug!("Skipping persisted document '{}' shadowed by seed", doc.id);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, content: &str) -> Document {
        Document {
            id: id.to_string(),
            name: format!("doc {}", id),
            content: content.to_string(),
            format: DocumentFormat::Txt,
            category: None,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn seed_wins_and_unknown_ids_are_appended() {
        let seed = vec![doc("A", "X")];
        let persisted = vec![doc("A", "Y"), doc("B", "Z")];

        let merged = merge_with_seed(seed, persisted);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "A");
        assert_eq!(merged[0].content, "X");
        assert_eq!(merged[1].id, "B");
        assert_eq!(merged[1].content, "Z");
    }

    #[test]
    fn persisted_order_is_kept_after_seed() {
        let merged = merge_with_seed(
            vec![doc("S", "seed")],
            vec![doc("C", "c"), doc("B", "b"), doc("S", "stale")],
        );
        let ids: Vec<&str> = merged.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["S", "C", "B"]);
    }

    #[test]
    fn builtin_seed_has_unique_ids_and_text() {
        let seed = builtin_seed_documents(Utc::now());
        assert_eq!(seed.len(), 2);
        assert_ne!(seed[0].id, seed[1].id);
        assert!(seed[0].content.contains("First year: 15 vacation days."));
        assert!(seed[1].content.contains("HEALTH INSURANCE COVERAGE"));
    }
}
