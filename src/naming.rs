//! Resolution of human-readable labels for pathway entries.
//!
//! The label for an entry is built in two steps: the synonym names of
//! all successfully annotated identifiers of the entry are
//! concatenated into one string (genes separated by `;`, synonyms
//! within a gene by `, `), and the configured [NamingMode] then picks
//! the final label out of that string. Pathway-map references and
//! hierarchy-database groups carry a trailing " - <species>" qualifier
//! that is trimmed before any splitting.

use crate::annotation::{AnnotationLookup, AnnotationRecord};
use crate::pathway::{Entry, EntryType};
use crate::{NamingMode, TranslatorConfig};

/// Identifier prefix of the hierarchy database; such identifiers are
/// described by a definition text rather than synonym names, and
/// carry species suffixes like map references do.
const HIERARCHY_PREFIX: &str = "br:";

/// Resolves entry labels from prefetched annotation records according
/// to the configured naming mode.
pub struct EntryNamer<'a> {
    mode: NamingMode,
    prefer_formula: bool,
    retrieve: bool,
    annotations: &'a dyn AnnotationLookup,
}

impl<'a> EntryNamer<'a> {
    pub fn new(config: &TranslatorConfig, annotations: &'a dyn AnnotationLookup) -> EntryNamer<'a> {
        EntryNamer {
            mode: config.naming_mode,
            prefer_formula: config.prefer_formula_for_compounds,
            retrieve: config.retrieve_annotations,
            annotations,
        }
    }

    /// Resolve the label for an entry, querying the annotation lookup
    /// for each identifier the entry references. In offline mode no
    /// lookups happen and the label falls back to the entry's own
    /// attributes.
    pub fn name_for_entry(&self, entry: &Entry) -> String {
        let records: Vec<AnnotationRecord> = if self.retrieve {
            entry
                .identifiers()
                .map(|identifier| self.annotations.lookup(identifier))
                .collect()
        } else {
            Vec::new()
        };

        self.name_from_records(entry, &records)
    }

    /// Resolve the label for an entry from already-queried records.
    pub fn name_from_records(&self, entry: &Entry, records: &[AnnotationRecord]) -> String {
        let mut names = String::new();

        for record in records.iter().filter(|record| record.success) {
            if !names.is_empty() && !names.ends_with(';') {
                names.push(';'); // gene boundary
            }

            if self.prefer_formula && record.formula.is_some() {
                names.push_str(record.formula.as_deref().unwrap_or_default());
            } else if self.mode == NamingMode::IntelligentWithEc
                && entry.entry_type != EntryType::Map
                && !record.ec_codes.is_empty()
            {
                names.push_str(&record.ec_codes.join(","));
            } else if record.identifier.starts_with(HIERARCHY_PREFIX) {
                if let Some(definition) = record.definition.as_deref() {
                    names.push_str(&normalize_synonyms(definition));
                }
            } else if let Some(record_names) = record.names.as_deref() {
                names.push_str(&normalize_synonyms(record_names));
            }
        }

        self.resolve(entry, &names)
    }

    fn resolve(&self, entry: &Entry, names: &str) -> String {
        if self.mode == NamingMode::FirstFromSource {
            let mut name = entry.name.as_str();
            if let Some(label) = entry.graphics_label() {
                if label.len() > 1 {
                    name = label;
                }
            }
            if entry.entry_type == EntryType::Map {
                return trim_species_suffix(name).to_owned();
            }
            if entry.name.starts_with(HIERARCHY_PREFIX) {
                name = trim_species_suffix(name);
            }
            return first_name(name).to_owned();
        }

        if !names.is_empty() {
            if entry.entry_type == EntryType::Map {
                return trim_species_suffix(names).to_owned();
            }
            let names = if entry.name.starts_with(HIERARCHY_PREFIX) {
                trim_species_suffix(names)
            } else {
                names
            };

            match self.mode {
                NamingMode::FirstName => return first_name(names).to_owned(),

                NamingMode::ShortestName => {
                    let synonyms = synonym_list(names);
                    return shortest_name(&synonyms).to_owned();
                }

                NamingMode::AllFirstNames => {
                    let mut firsts: Vec<&str> = Vec::new();
                    for group in names.split(';') {
                        let first = first_name(group);
                        if !firsts.contains(&first) {
                            firsts.push(first);
                        }
                    }
                    return firsts.join("; ");
                }

                NamingMode::Intelligent | NamingMode::IntelligentWithEc => {
                    // Shortest synonym for compounds.
                    if entry.entry_type == EntryType::Compound {
                        let synonyms = synonym_list(names);
                        return shortest_name(&synonyms).to_owned();
                    }

                    let mut firsts: Vec<&str> = Vec::new();
                    let mut very_first: Option<&str> = None;
                    for group in names.split(';') {
                        let first = first_name(group);
                        if very_first.map_or(true, str::is_empty) {
                            very_first = Some(first);
                        }
                        if !firsts.contains(&first) {
                            firsts.push(first);
                        }
                    }

                    if firsts.len() > 1 {
                        if let Some(family) = family_prefix(&firsts) {
                            return family;
                        }
                    }

                    if very_first.is_some_and(|first| !first.is_empty()) {
                        return firsts[0].to_owned();
                    }
                }

                NamingMode::FirstFromSource => {}
            }

            // In doubt, return the whole annotation string.
            return names.to_owned();
        }

        // No annotation data at all: fall back to the entry itself.
        let mut name = entry.name.as_str();
        if let Some(label) = entry.graphics_label() {
            if !label.is_empty() {
                name = label;
            }
        }
        if name.to_lowercase().starts_with("undefined") {
            return "Group".to_owned();
        }
        first_name(name).to_owned()
    }
}

/// Normalize a raw synonym string so that genes stay `;`-separated
/// only at record boundaries and synonyms within a gene are
/// `, `-separated.
fn normalize_synonyms(raw: &str) -> String {
    raw.replace(";\n", ", ").replace("; ", ", ").replace(';', ",")
}

/// Join the per-gene groups of a concatenated name string into one
/// `, `-separated synonym list.
fn synonym_list(names: &str) -> String {
    names.split(';').collect::<Vec<_>>().join(", ")
}

/// Return the leading name segment of a synonym list: everything up
/// to the first `;`, or up to a `,` that ends the string or is
/// followed by a space. Embedded numeric commas, as in
/// "Ins(1,4,5)P3", do not split.
pub(crate) fn first_name(name: &str) -> &str {
    let name = name.trim();
    let chars: Vec<(usize, char)> = name.char_indices().collect();

    for i in 1..chars.len() {
        let (pos, c) = chars[i];
        let separates = c == ';'
            || (c == ',' && (i == chars.len() - 1 || chars[i + 1].1 == ' '));
        if separates {
            // A one-character prefix is no name; keep the whole string.
            return if i > 1 { &name[..pos] } else { name };
        }
    }

    name
}

/// Return the shortest candidate of a `, `-separated synonym list
/// that is at least two characters long, preferring the
/// first-encountered among ties. Splits at `", "` only, preserving
/// names like "Ins(1,4,5)P3".
pub(crate) fn shortest_name(name: &str) -> &str {
    let mut best = name;
    for candidate in name.split(", ") {
        let candidate = candidate.trim();
        if candidate.len() > 1 && candidate.len() < best.len() {
            best = candidate;
        }
    }
    best
}

/// Strip a trailing " - <species>" qualifier, e.g. from
/// "Glycine, serine and threonine metabolism - Enterococcus faecalis".
fn trim_species_suffix(name: &str) -> &str {
    match name.rfind(" - ") {
        Some(pos) if pos > 0 => name[..pos].trim(),
        _ => name,
    }
}

/// Byte length of the longest common prefix of all names, compared
/// ASCII case-insensitively against the first name.
fn longest_common_prefix(names: &[&str]) -> usize {
    let Some((first, rest)) = names.split_first() else {
        return 0;
    };

    let mut len = first.len();
    for other in rest {
        let mut common = 0;
        for (a, b) in first[..len].chars().zip(other.chars()) {
            if !a.eq_ignore_ascii_case(&b) {
                break;
            }
            common += a.len_utf8();
        }
        len = common;
        if len == 0 {
            break;
        }
    }
    len
}

/// The gene-family label for a set of distinct leading names, if one
/// exists: a common prefix longer than two characters, with trailing
/// digits stripped when the remainder after the prefix is purely
/// numeric ("ALG13"/"ALG14" share "ALG1", which trims to "ALG").
fn family_prefix(firsts: &[&str]) -> Option<String> {
    let len = longest_common_prefix(firsts);
    if len <= 2 {
        return None;
    }

    let first = firsts[0];
    let mut prefix = &first[..len];
    let removed = &first[len..];

    if !removed.is_empty() && removed.chars().all(|c| c.is_ascii_digit()) {
        while prefix.chars().last().is_some_and(|c| c.is_ascii_digit()) {
            prefix = &prefix[..prefix.len() - 1];
            if prefix.len() < 2 {
                break;
            }
        }
    }

    (prefix.len() > 2).then(|| prefix.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::MemoryAnnotations;
    use crate::pathway::Graphics;

    fn namer_with_mode<'a>(
        mode: NamingMode,
        annotations: &'a MemoryAnnotations,
    ) -> EntryNamer<'a> {
        let config = TranslatorConfig {
            naming_mode: mode,
            ..TranslatorConfig::default()
        };
        EntryNamer::new(&config, annotations)
    }

    fn gene_entry(name: &str) -> Entry {
        Entry::new(1, name, EntryType::Gene)
    }

    #[test]
    fn first_name_test() {
        assert_eq!(first_name("Ins(1,4,5)P3"), "Ins(1,4,5)P3");
        assert_eq!(first_name("TP53; MDM2"), "TP53");
        assert_eq!(first_name("PCK1, MGC22652, PEPCK-C"), "PCK1");
        assert_eq!(first_name("  HK1, HXK1 "), "HK1");
        assert_eq!(first_name("single"), "single");
        assert_eq!(first_name("trailing,"), "trailing");
    }

    #[test]
    fn shortest_name_test() {
        assert_eq!(shortest_name("D-Glucose, Grape sugar"), "D-Glucose");
        // Single-character candidates are no names.
        assert_eq!(shortest_name("Tyr, C"), "Tyr");
        // First-encountered wins ties.
        assert_eq!(shortest_name("abc, xyz"), "abc");
    }

    #[test]
    fn trim_species_suffix_test() {
        assert_eq!(
            trim_species_suffix("Glycine, serine and threonine metabolism - Enterococcus faecalis"),
            "Glycine, serine and threonine metabolism"
        );
        assert_eq!(trim_species_suffix("No suffix here"), "No suffix here");
    }

    #[test]
    fn family_prefix_test() {
        assert_eq!(family_prefix(&["ALG13", "ALG14"]), Some("ALG".to_owned()));
        // Non-numeric remainder keeps the digits of the prefix.
        assert_eq!(family_prefix(&["CAMK2A", "CAMK2B"]), Some("CAMK2".to_owned()));
        // Two-character prefixes are too generic for a family label.
        assert_eq!(family_prefix(&["AB1", "AB2"]), None);
    }

    #[test]
    fn intelligent_family_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(AnnotationRecord::found("hsa:79868").with_names("ALG13"));
        annotations.insert(AnnotationRecord::found("hsa:199857").with_names("ALG14"));
        let namer = namer_with_mode(NamingMode::Intelligent, &annotations);

        let entry = gene_entry("hsa:79868 hsa:199857");
        assert_eq!(namer.name_for_entry(&entry), "ALG");
    }

    #[test]
    fn intelligent_single_gene_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(AnnotationRecord::found("hsa:3098").with_names("HK1; HXK1"));
        let namer = namer_with_mode(NamingMode::Intelligent, &annotations);

        assert_eq!(namer.name_for_entry(&gene_entry("hsa:3098")), "HK1");
    }

    #[test]
    fn intelligent_compound_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations
            .insert(AnnotationRecord::found("cpd:C00031").with_names("D-Glucose, Grape sugar"));
        let namer = namer_with_mode(NamingMode::Intelligent, &annotations);

        let entry = Entry::new(1, "cpd:C00031", EntryType::Compound);
        assert_eq!(namer.name_for_entry(&entry), "D-Glucose");
    }

    #[test]
    fn all_first_names_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(AnnotationRecord::found("hsa:5105").with_names("PCK1, PEPCK-C"));
        annotations.insert(AnnotationRecord::found("hsa:5106").with_names("PCK2, PEPCK-M"));
        let namer = namer_with_mode(NamingMode::AllFirstNames, &annotations);

        let entry = gene_entry("hsa:5105 hsa:5106");
        assert_eq!(namer.name_for_entry(&entry), "PCK1; PCK2");
    }

    #[test]
    fn ec_codes_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(
            AnnotationRecord::found("hsa:3098")
                .with_names("HK1, HXK1")
                .with_ec_codes(&["2.7.1.1"]),
        );
        let namer = namer_with_mode(NamingMode::IntelligentWithEc, &annotations);

        assert_eq!(namer.name_for_entry(&gene_entry("hsa:3098")), "2.7.1.1");
    }

    #[test]
    fn prefer_formula_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(
            AnnotationRecord::found("cpd:C00031")
                .with_names("D-Glucose, Grape sugar")
                .with_formula("C6H12O6"),
        );
        let config = TranslatorConfig {
            prefer_formula_for_compounds: true,
            ..TranslatorConfig::default()
        };
        let namer = EntryNamer::new(&config, &annotations);

        let entry = Entry::new(1, "cpd:C00031", EntryType::Compound);
        assert_eq!(namer.name_for_entry(&entry), "C6H12O6");
    }

    #[test]
    fn map_suffix_trim_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(
            AnnotationRecord::found("path:hsa00260")
                .with_names("Glycine, serine and threonine metabolism - Homo sapiens"),
        );
        let namer = namer_with_mode(NamingMode::FirstName, &annotations);

        let entry = Entry::new(1, "path:hsa00260", EntryType::Map);
        // Internal commas of a map title are not separators.
        assert_eq!(
            namer.name_for_entry(&entry),
            "Glycine, serine and threonine metabolism"
        );
    }

    #[test]
    fn hierarchy_definition_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(
            AnnotationRecord::found("br:hsa01000")
                .with_definition("Enzymes - Homo sapiens (human)"),
        );
        let namer = namer_with_mode(NamingMode::FirstName, &annotations);

        // Hierarchy groups describe themselves through a definition
        // and carry a species suffix like map references do.
        let entry = Entry::new(1, "br:hsa01000", EntryType::Other);
        assert_eq!(namer.name_for_entry(&entry), "Enzymes");
    }

    #[test]
    fn first_from_source_test() {
        let annotations = MemoryAnnotations::new();
        let namer = namer_with_mode(NamingMode::FirstFromSource, &annotations);

        let mut entry = gene_entry("hsa:3098");
        entry.graphics = Some(Graphics {
            label: Some("HK1, HXK1".to_owned()),
            x: 0,
            y: 0,
            width: 46,
            height: 17,
            fgcolor: None,
            bgcolor: None,
        });
        assert_eq!(namer.name_for_entry(&entry), "HK1");
    }

    #[test]
    fn fallback_test() {
        let annotations = MemoryAnnotations::new();
        let namer = namer_with_mode(NamingMode::Intelligent, &annotations);

        // Unknown identifier: the raw name is all we have.
        assert_eq!(namer.name_for_entry(&gene_entry("hsa:3098")), "hsa:3098");

        // Group markers become "Group".
        let marker = Entry::new(2, "undefined", EntryType::Group);
        assert_eq!(namer.name_for_entry(&marker), "Group");
    }

    #[test]
    fn offline_skips_lookup_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(AnnotationRecord::found("hsa:3098").with_names("HK1, HXK1"));
        let config = TranslatorConfig::offline();
        let namer = EntryNamer::new(&config, &annotations);

        assert_eq!(namer.name_for_entry(&gene_entry("hsa:3098")), "hsa:3098");
    }
}
