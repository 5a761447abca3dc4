//! Shared protocol types and helpers.

use std::collections::HashMap;
use std::hash::Hash;

/// A (topic, partition) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self { topic: topic.into(), partition }
    }
}

/// Group a flat payload list for nested encoding.
///
/// Callers hand requests over as flat lists; the wire format nests by topic
/// and partition. The first occurrence of a key fixes its position in the
/// encoded stream, and relative order within a group is preserved.
pub(crate) fn group_by_first_occurrence<'a, T, K, F>(items: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&at) => groups[at].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}
