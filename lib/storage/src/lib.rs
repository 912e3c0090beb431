pub mod snapshot;
pub mod export;
pub mod naming;

pub use snapshot::{load_graph, write_graph, GraphFileDescription, GraphMetadata, NodeLinkData};
pub use export::{seed_table_to_tsv, write_seed_table};
pub use naming::{
    annotated_file_name, default_annotated_path, graph_file_name, parse_graph_file_name,
    seed_table_path, GraphParams,
};
