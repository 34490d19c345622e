#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use cg_graph as graph;
pub use cg_store as store;

pub use cg_graph::derive::Configurable;
pub use cg_store::ConfigHandler;
