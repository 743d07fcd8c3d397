//! Externally-sourced descriptive data for biological identifiers.
//!
//! The translation core never fetches anything itself: it reads
//! through an [AnnotationLookup], a cache-backed collaborator that
//! resolves one identifier to one [AnnotationRecord] and never fails
//! hard. [MemoryAnnotations] is the bundled implementation, backed by
//! an in-memory map that can be loaded from a JSON snapshot.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use anyhow::Result;

fn default_success() -> bool {
    true
}

/// Descriptive data for one biological identifier.
///
/// `names` holds `;`-separated distinct genes with `, `-separated
/// synonyms within a gene. A record with `success == false` carries
/// no usable information and is how an unknown identifier is
/// reported.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    /// Chemical formula, for compound identifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Enzyme-commission codes of a gene product.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ec_codes: Vec<String>,
    /// Free-text definition, used for hierarchy-database identifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Textual equation, for reaction identifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
    /// Enzyme-commission codes catalysing a reaction identifier.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub enzymes: Vec<String>,
    #[serde(default = "default_success")]
    pub success: bool,
}

impl AnnotationRecord {
    /// A successful record with no data yet.
    pub fn found(identifier: &str) -> AnnotationRecord {
        AnnotationRecord {
            identifier: identifier.to_owned(),
            names: None,
            formula: None,
            ec_codes: Vec::new(),
            definition: None,
            equation: None,
            enzymes: Vec::new(),
            success: true,
        }
    }

    /// The record reported for an unknown identifier.
    pub fn missing(identifier: &str) -> AnnotationRecord {
        AnnotationRecord {
            success: false,
            ..AnnotationRecord::found(identifier)
        }
    }

    pub fn with_names(mut self, names: &str) -> AnnotationRecord {
        self.names = Some(names.to_owned());
        self
    }

    pub fn with_formula(mut self, formula: &str) -> AnnotationRecord {
        self.formula = Some(formula.to_owned());
        self
    }

    pub fn with_ec_codes(mut self, ec_codes: &[&str]) -> AnnotationRecord {
        self.ec_codes = ec_codes.iter().map(|code| (*code).to_owned()).collect();
        self
    }

    pub fn with_definition(mut self, definition: &str) -> AnnotationRecord {
        self.definition = Some(definition.to_owned());
        self
    }

    pub fn with_equation(mut self, equation: &str) -> AnnotationRecord {
        self.equation = Some(equation.to_owned());
        self
    }

    pub fn with_enzymes(mut self, enzymes: &[&str]) -> AnnotationRecord {
        self.enzymes = enzymes.iter().map(|code| (*code).to_owned()).collect();
        self
    }
}

/// The cache-backed annotation source consumed by the pipeline.
///
/// Implementations must be safe to call many times for the same
/// identifier and must never panic for an unknown one: they return a
/// record whose `success` flag is false instead. Retry logic for
/// flaky backing stores belongs to the implementation, not to the
/// translation core.
pub trait AnnotationLookup {
    /// Resolve one identifier.
    fn lookup(&self, identifier: &str) -> AnnotationRecord;

    /// Batch cache-warming hook called by the preprocessor before
    /// translation starts. The default does nothing.
    fn prefetch(&self, identifiers: &[String]) {
        let _ = identifiers;
    }
}

/// An [AnnotationLookup] over a fixed in-memory record set.
///
/// ## Example
/// ```
/// use pathway_translate::annotation::{AnnotationLookup, AnnotationRecord, MemoryAnnotations};
///
/// let mut annotations = MemoryAnnotations::new();
/// annotations.insert(AnnotationRecord::found("cpd:C00031").with_names("D-Glucose, Grape sugar"));
///
/// assert!(annotations.lookup("cpd:C00031").success);
/// assert!(!annotations.lookup("cpd:C99999").success);
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct MemoryAnnotations {
    _records: HashMap<String, AnnotationRecord>,
}

impl MemoryAnnotations {
    pub fn new() -> MemoryAnnotations {
        MemoryAnnotations::default()
    }

    /// Load a snapshot from a JSON array of records.
    pub fn from_reader(source: &mut dyn Read) -> Result<MemoryAnnotations> {
        let reader = BufReader::new(source);
        let records: Vec<AnnotationRecord> = serde_json::from_reader(reader)?;

        let mut annotations = MemoryAnnotations::new();
        for record in records {
            annotations.insert(record);
        }
        Ok(annotations)
    }

    pub fn insert(&mut self, record: AnnotationRecord) {
        self._records.insert(record.identifier.clone(), record);
    }

    pub fn len(&self) -> usize {
        self._records.len()
    }

    pub fn is_empty(&self) -> bool {
        self._records.is_empty()
    }
}

impl AnnotationLookup for MemoryAnnotations {
    fn lookup(&self, identifier: &str) -> AnnotationRecord {
        match self._records.get(identifier) {
            Some(record) => record.clone(),
            None => AnnotationRecord::missing(identifier),
        }
    }
}
