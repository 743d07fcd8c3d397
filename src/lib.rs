//! Translation of parsed biological-pathway graphs into other model
//! representations.
//!
//! The input is a [pathway::Pathway] produced by an external
//! markup-format parser. A [Translator] preprocesses the pathway in
//! place (annotation prefetch, reaction autocompletion, node
//! filtering) and then hands it to one of the [OutputFormat]
//! variants: [qual::QualitativeModelFormat] for a logical model,
//! [document::ModelDocumentFormat] for a species/reaction document,
//! or [graph::VisualGraphFormat] for a generic visual graph.
//!
//! External annotation data comes from an
//! [annotation::AnnotationLookup], a cache-backed collaborator that
//! is passed in explicitly and may freely report identifiers as
//! unknown — the pipeline degrades per entry instead of failing.
//!
//! ## Example
//! ```
//! use pathway_translate::annotation::{AnnotationRecord, MemoryAnnotations};
//! use pathway_translate::pathway::{Entry, EntryType, Pathway, Relation, subtype};
//! use pathway_translate::qual::QualitativeModelFormat;
//! use pathway_translate::{Translator, TranslatorConfig};
//!
//! let mut annotations = MemoryAnnotations::new();
//! annotations.insert(AnnotationRecord::found("hsa:3098").with_names("HK1, HXK1"));
//!
//! let mut pathway = Pathway::new("path:hsa00010", "hsa", "Glycolysis");
//! pathway.add_entry(Entry::new(1, "hsa:3098", EntryType::Gene));
//! pathway.add_entry(Entry::new(2, "cpd:C00031", EntryType::Compound));
//! let mut relation = Relation::new(1, 2);
//! relation.subtypes.push(subtype::ACTIVATION.to_owned());
//! pathway.add_relation(relation);
//!
//! let translator = Translator::new(&annotations, TranslatorConfig::default());
//! let model = translator.translate(&QualitativeModelFormat, &mut pathway).unwrap();
//!
//! assert_eq!(model.species[0].name, "HK1");
//! assert_eq!(model.transitions.len(), 1);
//! ```

#[macro_use]
extern crate serde_derive;

pub mod annotation;
mod atoms;
pub mod document;
pub mod graph;
pub mod ident;
pub mod naming;
pub mod ontology;
pub mod pathway;
mod preprocess;
pub mod qual;

use std::collections::HashSet;
use std::io::{BufReader, Read};

use anyhow::{Result, bail};
use tracing::error;

use crate::annotation::AnnotationLookup;
use crate::ident::IdAllocator;
use crate::naming::EntryNamer;
use crate::pathway::{Entry, Pathway};

/// How translated entries are labeled, see [naming::EntryNamer].
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NamingMode {
    /// The label or name from the source document, no annotations.
    FirstFromSource,
    /// The leading name of the annotation string.
    FirstName,
    /// The shortest synonym.
    ShortestName,
    /// The leading name of every gene, `; `-joined.
    AllFirstNames,
    /// Family-aware naming: shortest for compounds, common gene-family
    /// prefix for multi-gene entries, leading name otherwise.
    #[default]
    Intelligent,
    /// Like intelligent, but preferring enzyme-commission codes.
    IntelligentWithEc,
}

/// The configuration surface of the translation core.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct TranslatorConfig {
    /// Retrieve external annotations, or work purely from the
    /// document (offline mode).
    pub retrieve_annotations: bool,
    /// Remove entries with no incident relation/reaction.
    pub remove_orphans: bool,
    /// Remove entries not specific to the species of interest.
    /// Disable for reference pathways, which contain only such nodes.
    pub remove_generic_nodes: bool,
    /// Complete reactions with the substrates, products and enzymes
    /// implied by their annotation records.
    pub autocomplete_reactions: bool,
    /// Note unbalanced atom counts on translated reactions.
    pub check_atom_balance: bool,
    /// Remove entries referring to other pathway maps.
    pub remove_pathway_references: bool,
    /// Label compounds with their chemical formula.
    pub prefer_formula_for_compounds: bool,
    pub naming_mode: NamingMode,
}

impl Default for TranslatorConfig {
    fn default() -> TranslatorConfig {
        TranslatorConfig {
            retrieve_annotations: true,
            remove_orphans: false,
            remove_generic_nodes: true,
            autocomplete_reactions: true,
            check_atom_balance: false,
            remove_pathway_references: false,
            prefer_formula_for_compounds: false,
            naming_mode: NamingMode::Intelligent,
        }
    }
}

impl TranslatorConfig {
    /// Load a configuration from a YAML stream; absent keys keep
    /// their defaults.
    pub fn from_reader(source: &mut dyn Read) -> Result<TranslatorConfig> {
        let reader = BufReader::new(source);
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// The default configuration with annotation retrieval disabled.
    pub fn offline() -> TranslatorConfig {
        TranslatorConfig {
            retrieve_annotations: false,
            ..TranslatorConfig::default()
        }
    }
}

/// One output-format variant of the translation.
///
/// The shared pipeline asks the variant which edge kinds it
/// considers (this steers preprocessing) and then calls
/// `translate_core` on the preprocessed pathway.
pub trait OutputFormat {
    type Output;

    /// Whether relations play a role in this output format.
    fn considers_relations(&self) -> bool;

    /// Whether reactions play a role in this output format.
    fn considers_reactions(&self) -> bool;

    /// Translate an already-preprocessed pathway.
    fn translate_core(&self, pathway: &Pathway, run: &mut RunContext<'_>) -> Result<Self::Output>;
}

/// Per-run state: the identifier allocator and the transition
/// deduplication set, plus access to configuration and annotations.
/// A fresh context is created for every translation call, so no state
/// leaks between runs.
pub struct RunContext<'a> {
    config: &'a TranslatorConfig,
    annotations: &'a dyn AnnotationLookup,
    pub ids: IdAllocator,
    seen_transitions: HashSet<(String, String, String)>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        config: &'a TranslatorConfig,
        annotations: &'a dyn AnnotationLookup,
    ) -> RunContext<'a> {
        RunContext {
            config,
            annotations,
            ids: IdAllocator::new(),
            seen_transitions: HashSet::new(),
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        self.config
    }

    pub fn annotations(&self) -> &dyn AnnotationLookup {
        self.annotations
    }

    /// Resolve the label for an entry under the run's configuration.
    pub fn name_for_entry(&self, entry: &Entry) -> String {
        EntryNamer::new(self.config, self.annotations).name_for_entry(entry)
    }

    /// Record a transition key; false means an identical transition
    /// was already produced in this run.
    pub(crate) fn note_transition(&mut self, key: (String, String, String)) -> bool {
        self.seen_transitions.insert(key)
    }
}

/// The shared translation pipeline, parameterized by configuration
/// and an annotation source.
pub struct Translator<'a> {
    config: TranslatorConfig,
    annotations: &'a dyn AnnotationLookup,
}

impl<'a> Translator<'a> {
    pub fn new(annotations: &'a dyn AnnotationLookup, config: TranslatorConfig) -> Translator<'a> {
        Translator { config, annotations }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Preprocess the pathway in place and translate it into the
    /// given output format.
    ///
    /// An unexpected failure inside the format-specific translation
    /// is logged with full detail and reported as None, so a batch
    /// caller can carry on with its next input.
    pub fn translate<F: OutputFormat>(
        &self,
        format: &F,
        pathway: &mut Pathway,
    ) -> Option<F::Output> {
        preprocess::preprocess(
            pathway,
            &self.config,
            self.annotations,
            format.considers_relations(),
            format.considers_reactions(),
        );

        let mut run = RunContext::new(&self.config, self.annotations);
        match format.translate_core(pathway, &mut run) {
            Ok(output) => Some(output),
            Err(error) => {
                error!("translation of pathway {} failed: {error:#}", pathway.name());
                None
            }
        }
    }

    /// Translate the first pathway of a parsed input document. An
    /// empty document is a hard error: the input file was unreadable
    /// or malformed.
    pub fn translate_first<F: OutputFormat>(
        &self,
        format: &F,
        pathways: &mut [Pathway],
    ) -> Result<Option<F::Output>> {
        let Some(pathway) = pathways.first_mut() else {
            bail!("input document contains no pathways");
        };
        Ok(self.translate(format, pathway))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationRecord, MemoryAnnotations};
    use crate::pathway::{EntryType, Relation, subtype};
    use crate::qual::{QualitativeModelFormat, Sign};

    #[test]
    fn config_defaults_test() {
        let config = TranslatorConfig::default();
        assert!(config.retrieve_annotations);
        assert!(!config.remove_orphans);
        assert!(config.remove_generic_nodes);
        assert!(config.autocomplete_reactions);
        assert!(!config.check_atom_balance);
        assert!(!config.remove_pathway_references);
        assert!(!config.prefer_formula_for_compounds);
        assert_eq!(config.naming_mode, NamingMode::Intelligent);
    }

    #[test]
    fn config_from_reader_test() {
        let yaml = "remove-orphans: true\nnaming-mode: intelligent-with-ec\n";
        let config = TranslatorConfig::from_reader(&mut yaml.as_bytes()).unwrap();

        assert!(config.remove_orphans);
        assert_eq!(config.naming_mode, NamingMode::IntelligentWithEc);
        // Unset keys keep their defaults.
        assert!(config.retrieve_annotations);
    }

    #[test]
    fn glucose_activation_end_to_end_test() {
        let mut annotations = MemoryAnnotations::new();
        annotations
            .insert(AnnotationRecord::found("cpd:C00031").with_names("D-Glucose, Grape sugar"));
        annotations.insert(AnnotationRecord::found("hsa:3098").with_names("HK1; HXK1"));

        let mut pathway = Pathway::new("path:hsa00010", "hsa", "Glycolysis");
        pathway.add_entry(Entry::new(1, "cpd:C00031", EntryType::Compound));
        pathway.add_entry(Entry::new(2, "hsa:3098", EntryType::Gene));
        let mut relation = Relation::new(2, 1);
        relation.subtypes.push(subtype::ACTIVATION.to_owned());
        pathway.add_relation(relation);

        let translator = Translator::new(&annotations, TranslatorConfig::default());
        let model = translator
            .translate(&QualitativeModelFormat, &mut pathway)
            .unwrap();

        assert_eq!(model.species[0].name, "D-Glucose");
        assert_eq!(model.species[1].name, "HK1");

        assert_eq!(model.transitions.len(), 1);
        let transition = &model.transitions[0];
        assert_eq!(transition.input.species, model.species[1].id);
        assert_eq!(transition.output.species, model.species[0].id);
        assert_eq!(transition.input.sign, Sign::Positive);
        assert_eq!(transition.term, Some(170));
    }

    #[test]
    fn run_state_does_not_leak_between_translations() {
        let annotations = MemoryAnnotations::new();
        let translator = Translator::new(&annotations, TranslatorConfig::offline());

        let build = || {
            let mut pathway = Pathway::new("path:hsa00010", "hsa", "Glycolysis");
            pathway.add_entry(Entry::new(1, "hsa:3098", EntryType::Gene));
            pathway.add_entry(Entry::new(2, "cpd:C00031", EntryType::Compound));
            pathway.add_relation(Relation::new(1, 2));
            pathway
        };

        let first = translator
            .translate(&QualitativeModelFormat, &mut build())
            .unwrap();
        let second = translator
            .translate(&QualitativeModelFormat, &mut build())
            .unwrap();

        // Identical ids in both runs: nothing carried over.
        assert_eq!(first.species[0].id, second.species[0].id);
        assert_eq!(first.transitions[0].id, second.transitions[0].id);
        assert_eq!(first.transitions.len(), 1);
        assert_eq!(second.transitions.len(), 1);
    }

    #[test]
    fn translate_first_rejects_empty_input() {
        let annotations = MemoryAnnotations::new();
        let translator = Translator::new(&annotations, TranslatorConfig::offline());

        let result = translator.translate_first(&QualitativeModelFormat, &mut []);
        assert!(result.is_err());
    }

    #[test]
    fn internal_failure_yields_none() {
        struct FailingFormat;
        impl OutputFormat for FailingFormat {
            type Output = ();

            fn considers_relations(&self) -> bool {
                false
            }

            fn considers_reactions(&self) -> bool {
                false
            }

            fn translate_core(&self, _: &Pathway, _: &mut RunContext<'_>) -> Result<()> {
                bail!("boom");
            }
        }

        let annotations = MemoryAnnotations::new();
        let translator = Translator::new(&annotations, TranslatorConfig::offline());
        let mut pathway = Pathway::new("path:hsa00010", "hsa", "Glycolysis");

        assert!(translator.translate(&FailingFormat, &mut pathway).is_none());
    }
}
