use crate::model::{CandidateMatch, EnrichedRecord, MatchPass};

/// Which records of one secondary source have been claimed during a
/// category pass. Append-only: a record once marked stays marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedSet {
    used: Vec<bool>,
}

impl UsedSet {
    pub fn new(len: usize) -> Self {
        Self { used: vec![false; len] }
    }

    pub fn is_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(false)
    }

    pub fn mark(&mut self, index: usize) {
        if let Some(slot) = self.used.get_mut(index) {
            *slot = true;
        }
    }

    pub fn count(&self) -> usize {
        self.used.iter().filter(|u| **u).count()
    }

    pub fn unused(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.used.len()).filter(move |&i| !self.is_used(i))
    }
}

/// Comparable names equal, case-insensitively.
pub fn names_match(primary: &EnrichedRecord, candidate: &EnrichedRecord) -> bool {
    primary.name().trim().to_lowercase() == candidate.name().trim().to_lowercase()
}

/// Same canonical brand and identical model, RAM and storage.
pub fn attributes_match(primary: &EnrichedRecord, candidate: &EnrichedRecord) -> bool {
    let (p, c) = (&primary.profile, &candidate.profile);
    primary.brand().to_lowercase() == candidate.brand().to_lowercase()
        && p.model == c.model
        && p.ram_gb == c.ram_gb
        && p.storage_gb == c.storage_gb
}

/// Select at most one unused candidate for `primary` and mark it used.
///
/// The exact-name pass runs over every unused candidate first; the
/// attribute pass only runs if it found nothing. Within a pass the
/// earliest unused candidate wins.
pub fn match_candidate(
    primary: &EnrichedRecord,
    candidates: &[EnrichedRecord],
    used: &mut UsedSet,
) -> Option<CandidateMatch> {
    let found = used
        .unused()
        .find(|&i| names_match(primary, &candidates[i]))
        .map(|index| CandidateMatch { index, pass: MatchPass::ExactName })
        .or_else(|| {
            used.unused()
                .find(|&i| attributes_match(primary, &candidates[i]))
                .map(|index| CandidateMatch { index, pass: MatchPass::Attributes })
        });

    if let Some(m) = found {
        used.mark(m.index);
    }
    found
}

/// Matches of one secondary source against every primary record.
#[derive(Debug, Clone)]
pub struct SourceMatches {
    pub source: String,
    /// Indexed like the primary records.
    pub matches: Vec<Option<CandidateMatch>>,
    pub used: UsedSet,
}

/// Run the greedy pass of `primary` (in order) against one secondary source.
pub fn match_source(source: &str, primary: &[EnrichedRecord], candidates: &[EnrichedRecord]) -> SourceMatches {
    let mut used = UsedSet::new(candidates.len());
    let matches = primary
        .iter()
        .map(|p| {
            let found = match_candidate(p, candidates, &mut used);
            match found {
                Some(m) => log::debug!(
                    "'{}' ← {source}[{}] '{}' via {}",
                    p.name(),
                    m.index,
                    candidates[m.index].name(),
                    m.pass
                ),
                None => log::debug!("'{}': no match in {source}", p.name()),
            }
            found
        })
        .collect();
    SourceMatches { source: source.to_string(), matches, used }
}

/// Match every secondary source. Sources have independent used sets, so
/// running them one after another selects exactly what an interleaved
/// per-primary-record loop would.
pub fn match_sources(
    primary: &[EnrichedRecord],
    secondaries: &[(&str, &[EnrichedRecord])],
) -> Vec<SourceMatches> {
    secondaries
        .iter()
        .map(|(source, candidates)| match_source(source, primary, candidates))
        .collect()
}
