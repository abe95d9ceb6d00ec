#![allow(clippy::needless_range_loop)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::too_long_first_doc_paragraph)]

pub mod alg;
pub mod chain;
pub mod exec;
pub mod utils;

pub use alg::ensemble::{ensemble, find_chain, find_sequence};
pub use chain::{program::Op, program::Program, Chain};
pub use utils::errors::AddChainError;
