//! An ordered map implemented with an AVL tree, and a word-frequency counter built on it.
//!
//! [`BalancedTree`] keeps its nodes in an arena and links them by index,
//! including a parent link per node that is used to walk back up the tree
//! while rebalancing. Every insertion restores the AVL condition with at most
//! one single or double rotation.
//!
//! ```
//! use avl_wordfreq::{count_words, BalancedTree, Order};
//!
//! let mut counts = BalancedTree::new();
//! count_words("The cat saw the hat.".as_bytes(), &mut counts).unwrap();
//! assert_eq!(counts.find("the").ok(), Some(&2));
//! assert_eq!(counts.traverse_keys(Order::In), vec!["cat", "hat", "saw", "the"]);
//! ```

mod error;
mod map;
mod words;

pub use error::{Error, Result};
pub use map::{BalancedTree, Order};
pub use words::{count_words, keep_only_letters, CountSummary, WordCounts};
