//! The visual-graph output variant: the pathway as a
//! [petgraph::Graph] ready for a generic graph writer, with relation
//! edges and substrate-to-product reaction edges.

use std::collections::HashMap;

use petgraph::Graph;
use petgraph::graph::NodeIndex;

use anyhow::Result;
use tracing::debug;

use crate::pathway::{EntryId, EntryType, Graphics, Pathway};
use crate::{OutputFormat, RunContext};

/// The translated graph; node and edge weights carry everything a
/// graph writer needs.
pub type VisualGraph = Graph<GraphNode, GraphEdge>;

/// One pathway entry as a graph node.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub entry_type: EntryType,
    /// Position and size from the source markup, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphics: Option<Graphics>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GraphEdgeKind {
    Relation,
    Reaction,
}

/// A relation or one substrate-to-product arc of a reaction.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub label: String,
    pub kind: GraphEdgeKind,
}

/// The visual-graph output variant. Draws both relations and
/// reactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisualGraphFormat;

impl OutputFormat for VisualGraphFormat {
    type Output = VisualGraph;

    fn considers_relations(&self) -> bool {
        true
    }

    fn considers_reactions(&self) -> bool {
        true
    }

    fn translate_core(&self, pathway: &Pathway, run: &mut RunContext<'_>) -> Result<VisualGraph> {
        let mut graph = VisualGraph::new();

        let mut node_for_entry: HashMap<EntryId, NodeIndex> = HashMap::new();
        for entry in pathway.entries() {
            let label = run.name_for_entry(entry);
            let id = run.ids.allocate(&label);
            let index = graph.add_node(GraphNode {
                id,
                label,
                entry_type: entry.entry_type,
                graphics: entry.graphics.clone(),
            });
            node_for_entry.insert(entry.id, index);
        }

        for relation in pathway.relations() {
            let (Some(&source), Some(&target)) = (
                node_for_entry.get(&relation.entry1),
                node_for_entry.get(&relation.entry2),
            ) else {
                debug!(
                    "relation {} -> {} references an unknown or removed entry, skipping edge",
                    relation.entry1, relation.entry2
                );
                continue;
            };

            graph.add_edge(
                source,
                target,
                GraphEdge {
                    label: relation.subtypes.join(", "),
                    kind: GraphEdgeKind::Relation,
                },
            );
        }

        for reaction in pathway.reactions() {
            for substrate in &reaction.substrates {
                let Some(&source) = pathway
                    .entry_for_component(substrate)
                    .and_then(|entry| node_for_entry.get(&entry.id))
                else {
                    continue;
                };

                for product in &reaction.products {
                    let Some(&target) = pathway
                        .entry_for_component(product)
                        .and_then(|entry| node_for_entry.get(&entry.id))
                    else {
                        continue;
                    };

                    let edge = GraphEdge {
                        label: reaction.name.clone(),
                        kind: GraphEdgeKind::Reaction,
                    };
                    graph.add_edge(source, target, edge.clone());
                    if reaction.reversible {
                        graph.add_edge(target, source, edge);
                    }
                }
            }
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TranslatorConfig;
    use crate::annotation::MemoryAnnotations;
    use crate::pathway::{Entry, Reaction, ReactionComponent, Relation, subtype};

    #[test]
    fn translate_core_test() {
        let config = TranslatorConfig::offline();
        let annotations = MemoryAnnotations::new();
        let mut run = RunContext::new(&config, &annotations);

        let mut pathway = Pathway::new("path:hsa00010", "hsa", "Glycolysis");
        pathway.add_entry(Entry::new(1, "cpd:C00031", EntryType::Compound));
        pathway.add_entry(Entry::new(2, "cpd:C00668", EntryType::Compound));
        pathway.add_entry(Entry::new(3, "hsa:3098", EntryType::Gene));

        let mut relation = Relation::new(3, 1);
        relation.subtypes.push(subtype::ACTIVATION.to_owned());
        pathway.add_relation(relation);
        // Dangling relation, silently skipped.
        pathway.add_relation(Relation::new(3, 99));

        let mut reaction = Reaction::new("rn:R01786", true);
        let mut substrate = ReactionComponent::new("cpd:C00031");
        substrate.entry = Some(1);
        reaction.substrates.push(substrate);
        let mut product = ReactionComponent::new("cpd:C00668");
        product.entry = Some(2);
        reaction.products.push(product);
        pathway.add_reaction(reaction);

        let graph = VisualGraphFormat.translate_core(&pathway, &mut run).unwrap();

        assert_eq!(graph.node_count(), 3);
        // One relation edge plus forward and reverse reaction edges.
        assert_eq!(graph.edge_count(), 3);

        let relation_edges = graph
            .edge_weights()
            .filter(|edge| edge.kind == GraphEdgeKind::Relation)
            .count();
        assert_eq!(relation_edges, 1);

        let labels: Vec<&str> = graph
            .edge_weights()
            .filter(|edge| edge.kind == GraphEdgeKind::Reaction)
            .map(|edge| edge.label.as_str())
            .collect();
        assert_eq!(labels, vec!["rn:R01786", "rn:R01786"]);
    }
}
