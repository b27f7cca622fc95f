use indexmap::IndexMap;

use crate::matcher::SourceMatches;
use crate::model::{
    CategoryResult, CategorySummary, EnrichedRecord, LinkSummary, MatchPass, SourceMatchStats,
    UnmatchedRecord,
};

/// Per-source match counts for one category.
pub fn source_stats(matches: &SourceMatches, records: usize) -> SourceMatchStats {
    let mut stats = SourceMatchStats { records, ..Default::default() };
    for m in matches.matches.iter().flatten() {
        match m.pass {
            MatchPass::ExactName => stats.exact_name += 1,
            MatchPass::Attributes => stats.attributes += 1,
        }
    }
    stats.unmatched = records - matches.used.count();
    stats
}

/// Secondary records no primary record claimed, in source order.
pub fn unmatched_records(matches: &SourceMatches, candidates: &[EnrichedRecord]) -> Vec<UnmatchedRecord> {
    matches
        .used
        .unused()
        .filter_map(|i| candidates.get(i))
        .map(|r| UnmatchedRecord {
            source: matches.source.clone(),
            name: r.name().to_string(),
            url: r.record.url.clone(),
        })
        .collect()
}

pub fn category_summary(
    primary_records: usize,
    merged: usize,
    secondaries: &[(&SourceMatches, usize)],
    rejected_attributes: usize,
) -> CategorySummary {
    let sources: IndexMap<String, SourceMatchStats> = secondaries
        .iter()
        .map(|(m, records)| (m.source.clone(), source_stats(m, *records)))
        .collect();
    CategorySummary { primary_records, merged, sources, rejected_attributes }
}

/// Run totals across categories.
pub fn compute_summary(categories: &[CategoryResult]) -> LinkSummary {
    let mut summary = LinkSummary {
        categories: categories.len(),
        products: 0,
        matched: 0,
        unmatched: 0,
        rejected_attributes: 0,
    };

    for c in categories {
        summary.products += c.products.len();
        summary.unmatched += c.unmatched.len();
        summary.rejected_attributes += c.summary.rejected_attributes;
        summary.matched += c
            .summary
            .sources
            .values()
            .map(|s| s.exact_name + s.attributes)
            .sum::<usize>();
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::UsedSet;
    use crate::model::{AttributeProfile, CandidateMatch, Category, RawProductRecord};

    fn enriched(name: &str) -> EnrichedRecord {
        EnrichedRecord {
            record: RawProductRecord::new(name, &format!("https://tgdd/{name}"), Category::Phone),
            profile: AttributeProfile::default(),
        }
    }

    fn tgdd_matches() -> SourceMatches {
        let mut used = UsedSet::new(3);
        used.mark(0);
        used.mark(2);
        SourceMatches {
            source: "tgdd".into(),
            matches: vec![
                Some(CandidateMatch { index: 2, pass: MatchPass::ExactName }),
                None,
                Some(CandidateMatch { index: 0, pass: MatchPass::Attributes }),
            ],
            used,
        }
    }

    #[test]
    fn stats_by_pass() {
        let stats = source_stats(&tgdd_matches(), 3);
        assert_eq!(
            stats,
            SourceMatchStats { records: 3, exact_name: 1, attributes: 1, unmatched: 1 }
        );
    }

    #[test]
    fn unmatched_identities() {
        let candidates = vec![enriched("a"), enriched("b"), enriched("c")];
        let unmatched = unmatched_records(&tgdd_matches(), &candidates);
        assert_eq!(
            unmatched,
            vec![UnmatchedRecord { source: "tgdd".into(), name: "b".into(), url: "https://tgdd/b".into() }]
        );
    }

    #[test]
    fn run_totals() {
        let m = tgdd_matches();
        let summary = category_summary(3, 3, &[(&m, 3)], 2);
        let category = CategoryResult {
            category: Category::Phone,
            products: Vec::new(),
            summary,
            unmatched: vec![UnmatchedRecord { source: "tgdd".into(), name: "b".into(), url: "u".into() }],
        };
        let totals = compute_summary(&[category.clone(), category]);
        assert_eq!(totals.categories, 2);
        assert_eq!(totals.matched, 4);
        assert_eq!(totals.unmatched, 2);
        assert_eq!(totals.rejected_attributes, 4);
    }
}
