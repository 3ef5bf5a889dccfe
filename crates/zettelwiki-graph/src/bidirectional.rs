//! Mutual-mention detection.

use zettelwiki_core::{BidirectionalSet, DocumentId, MentionMap, ResolvedLink};

/// Collapse resolved links into source -> distinct targets.
///
/// Documents with no outgoing mention get no entry.
pub fn mention_map(links: &[ResolvedLink]) -> MentionMap {
    let mut map = MentionMap::new();
    for link in links {
        if link.source != link.target {
            map.entry(link.source).or_default().insert(link.target);
        }
    }
    map
}

/// Pairs mentioning each other in both directions.
///
/// Symmetric by construction, one lookup per mention. Documents without a
/// mutual partner get no entry.
///
/// ```
/// use zettelwiki_core::{DocumentId, MentionMap};
/// use zettelwiki_graph::detect;
///
/// let mut mentions = MentionMap::new();
/// mentions.entry(DocumentId(1)).or_default().extend([DocumentId(2), DocumentId(3)]);
/// mentions.entry(DocumentId(3)).or_default().insert(DocumentId(1));
///
/// let mutual = detect(&mentions);
/// assert!(mutual[&DocumentId(1)].contains(&DocumentId(3)));
/// assert!(mutual[&DocumentId(3)].contains(&DocumentId(1)));
/// assert!(!mutual.contains_key(&DocumentId(2)));
/// ```
pub fn detect(mentions: &MentionMap) -> BidirectionalSet {
    let mut mutual = BidirectionalSet::new();
    for (&a, targets) in mentions {
        for &b in targets {
            if a != b && mentions.get(&b).is_some_and(|back| back.contains(&a)) {
                mutual.entry(a).or_default().insert(b);
            }
        }
    }
    mutual
}

/// Mutual partners of `id` in ascending order
pub fn partners(mutual: &BidirectionalSet, id: DocumentId) -> Vec<DocumentId> {
    mutual
        .get(&id)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default()
}

pub fn is_bidirectional(mutual: &BidirectionalSet, a: DocumentId, b: DocumentId) -> bool {
    mutual.get(&a).is_some_and(|set| set.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zettelwiki_core::LinkKind;

    fn link(source: u64, target: u64) -> ResolvedLink {
        ResolvedLink::new(DocumentId(source), DocumentId(target), LinkKind::Explicit)
    }

    #[test]
    fn test_mention_map_collapses_duplicates() {
        let map = mention_map(&[link(1, 2), link(1, 2), link(1, 3), link(4, 4)]);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&DocumentId(1)].len(), 2);
    }

    #[test]
    fn test_detect_is_symmetric() {
        let map = mention_map(&[
            link(1, 2),
            link(2, 1),
            link(2, 3),
            link(3, 4),
            link(4, 3),
            link(5, 1),
        ]);
        let mutual = detect(&map);

        for (a, partners) in &mutual {
            for b in partners {
                assert!(is_bidirectional(&mutual, *b, *a), "{} <-> {} not symmetric", a, b);
            }
        }
        assert_eq!(partners(&mutual, DocumentId(2)), vec![DocumentId(1)]);
        assert_eq!(partners(&mutual, DocumentId(3)), vec![DocumentId(4)]);
        assert!(partners(&mutual, DocumentId(5)).is_empty());
        assert!(!mutual.contains_key(&DocumentId(5)));
    }

    #[test]
    fn test_empty_mentions() {
        assert!(detect(&MentionMap::new()).is_empty());
    }
}
