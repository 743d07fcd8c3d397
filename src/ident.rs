//! Collision-free symbolic identifiers for generated model elements.

use std::collections::HashSet;

/// Prefix for ids allocated from an empty candidate name, and the
/// replacement for candidate names not starting with a letter or `_`.
const GENERIC_PREFIX: &str = "SId";

/// Allocates identifiers that are unique for the lifetime of one
/// translation run, regardless of collisions in the candidate names.
///
/// Allocated ids match `( letter | _ ) ( letter | digit | _ )*`.
///
/// ## Example
/// ```
/// use pathway_translate::ident::IdAllocator;
///
/// let mut ids = IdAllocator::new();
/// assert_eq!(ids.allocate("gene"), "gene");
/// assert_eq!(ids.allocate("gene"), "gene_1");
/// ```
#[derive(Debug, Default)]
pub struct IdAllocator {
    issued: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> IdAllocator {
        IdAllocator::default()
    }

    /// Derive a valid identifier from `candidate` and record it as
    /// issued. An already-issued result gets `_<n>` appended with the
    /// smallest free `n`.
    pub fn allocate(&mut self, candidate: &str) -> String {
        let candidate = candidate.trim();

        let id = if candidate.is_empty() {
            self.next_free(GENERIC_PREFIX)
        } else {
            let sanitized = sanitize(candidate);
            if self.issued.contains(&sanitized) {
                self.next_free(&sanitized)
            } else {
                sanitized
            }
        };

        self.issued.insert(id.clone());
        id
    }

    /// Number of ids issued so far in this run.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    fn next_free(&self, prefix: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{prefix}_{n}");
            if !self.issued.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn sanitize(candidate: &str) -> String {
    let mut sanitized = String::with_capacity(candidate.len() + 4);
    let mut chars = candidate.chars();

    // Must start with an ASCII letter or '_'.
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => sanitized.push(first),
        _ => sanitized.push_str("SId_"),
    }

    for c in chars {
        let c = if c == ' ' { '_' } else { c };
        if c.is_ascii_alphanumeric() || c == '_' {
            sanitized.push(c);
        }
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_unique_test() {
        let mut ids = IdAllocator::new();
        let mut seen = std::collections::HashSet::new();
        for candidate in ["gene", "gene", "gene", "gene_1", "", "", "tr", "tr"] {
            assert!(seen.insert(ids.allocate(candidate)));
        }
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn allocate_suffix_test() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate("gene"), "gene");
        assert_eq!(ids.allocate("gene"), "gene_1");
        assert_eq!(ids.allocate("gene"), "gene_2");
        // A manually colliding candidate pushes the suffix onward.
        assert_eq!(ids.allocate("gene_1"), "gene_1_1");
    }

    #[test]
    fn allocate_empty_test() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(""), "SId_1");
        assert_eq!(ids.allocate("  "), "SId_2");
    }

    #[test]
    fn allocate_sanitizes_test() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate("D-Glucose 6P"), "DGlucose_6P");
        assert_eq!(ids.allocate("9-cis-Retinol"), "SId_cisRetinol");
        assert_eq!(ids.allocate("_keep"), "_keep");
        assert_eq!(ids.allocate("Ins(1,4,5)P3"), "Ins145P3");
    }
}
