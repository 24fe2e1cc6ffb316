//! Node/edge graph for the connection-circles view.

use crate::model::note::{ConnectionKind, Note, NoteId};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionEdge {
    pub from: NoteId,
    pub to: NoteId,
    pub kind: ConnectionKind,
    pub delay: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionGraph<'a> {
    pub nodes: Vec<&'a Note>,
    pub edges: Vec<ConnectionEdge>,
}

/// Builds the graph; edges whose target is not in `notes` (archived or on
/// another board) are left out.
pub fn connection_graph(notes: &[Note]) -> ConnectionGraph<'_> {
    let present: HashSet<NoteId> = notes.iter().map(|note| note.id).collect();
    let edges = notes
        .iter()
        .flat_map(|note| {
            note.connections.iter().map(move |connection| ConnectionEdge {
                from: note.id,
                to: connection.target_id,
                kind: connection.kind,
                delay: connection.delay,
            })
        })
        .filter(|edge| present.contains(&edge.to))
        .collect();

    ConnectionGraph {
        nodes: notes.iter().collect(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::connection_graph;
    use crate::model::note::{ConnectionKind, Note, NoteConnection};
    use uuid::Uuid;

    #[test]
    fn dangling_edges_are_dropped() {
        let board_id = Uuid::new_v4();
        let mut source = Note::new(board_id, "tester@example.com");
        let target = Note::new(board_id, "tester@example.com");
        source.connections = vec![
            NoteConnection {
                target_id: target.id,
                kind: ConnectionKind::Balancing,
                delay: true,
            },
            NoteConnection {
                target_id: Uuid::new_v4(),
                kind: ConnectionKind::Reinforcing,
                delay: false,
            },
        ];
        let notes = vec![source.clone(), target.clone()];

        let graph = connection_graph(&notes);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].from, source.id);
        assert_eq!(graph.edges[0].to, target.id);
        assert!(graph.edges[0].delay);
    }
}
