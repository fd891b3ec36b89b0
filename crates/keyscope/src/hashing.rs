//! Deterministic row content fingerprints.
//!
//! Hash collisions across a column list flag rows that are identical in
//! every hashed column: true duplicates, as opposed to rows that merely
//! share the subset of columns currently under key validation.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::dataset::Dataset;
use crate::error::{KeyscopeError, Result};

/// SHA-256 digest of one row's content over a fixed column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHash([u8; 32]);

impl RowHash {
    /// Hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for byte in &self.0 {
            s.push_str(&format!("{:02x}", byte));
        }
        s
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RowHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for RowHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RowHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        if hex.len() != 64 {
            return Err(serde::de::Error::custom("expected 64 hex characters"));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk).map_err(serde::de::Error::custom)?;
            bytes[i] = u8::from_str_radix(s, 16).map_err(serde::de::Error::custom)?;
        }
        Ok(RowHash(bytes))
    }
}

/// Rows sharing one digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashGroup {
    pub hash: RowHash,
    pub row_count: usize,
    pub row_ids: Vec<usize>,
}

/// Duplicate-digest analysis of a dataset view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashAnalysis {
    pub total_rows: usize,
    pub unique_hashes: usize,
    /// `total_rows - unique_hashes`.
    pub duplicate_hash_count: usize,
    /// Groups with more than one member, by descending size; ties keep
    /// first-encountered order.
    pub groups: Vec<HashGroup>,
}

/// Hash every row of the view over the given column list.
///
/// Each value is fed to the hasher as a type-tag byte, a little-endian u64
/// payload length, then the canonical UTF-8 payload. The framing makes the
/// encoding total and prefix-free: no delimiter can leak between values, and
/// values of different types (`5`, `5.0`, `"5"`) never collide. There is no
/// salt and no randomness, so identical content always yields an identical
/// digest.
pub fn hash_rows(dataset: &Dataset, columns: &[String]) -> Result<Vec<(usize, RowHash)>> {
    let indices: Vec<usize> = columns
        .iter()
        .map(|name| dataset.column_index(name))
        .collect::<std::result::Result<_, KeyscopeError>>()?;

    let mut hashes = Vec::with_capacity(dataset.row_count());
    for row in 0..dataset.row_count() {
        let mut hasher = Sha256::new();
        for &col in &indices {
            let value = dataset.value_at(row, col);
            let payload = value.canonical_text();
            hasher.update([value.type_tag()]);
            hasher.update((payload.len() as u64).to_le_bytes());
            hasher.update(payload.as_bytes());
        }
        hashes.push((dataset.row_id(row), RowHash(hasher.finalize().into())));
    }

    Ok(hashes)
}

/// Hash all rows and group the collisions.
pub fn analyze(dataset: &Dataset, columns: &[String]) -> Result<HashAnalysis> {
    let hashes = hash_rows(dataset, columns)?;
    let total_rows = hashes.len();

    let mut groups: IndexMap<RowHash, Vec<usize>> = IndexMap::new();
    for (row_id, hash) in hashes {
        groups.entry(hash).or_default().push(row_id);
    }

    let unique_hashes = groups.len();

    let mut duplicate_groups: Vec<HashGroup> = groups
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(hash, row_ids)| HashGroup {
            hash,
            row_count: row_ids.len(),
            row_ids,
        })
        .collect();
    // Stable sort keeps first-encountered order among equal-sized groups.
    duplicate_groups.sort_by(|a, b| b.row_count.cmp(&a.row_count));

    Ok(HashAnalysis {
        total_rows,
        unique_hashes,
        duplicate_hash_count: total_rows - unique_hashes,
        groups: duplicate_groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn make_dataset(columns: Vec<&str>, rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::new(columns.into_iter().map(String::from).collect(), rows).unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hash_is_deterministic() {
        let ds = make_dataset(
            vec!["a", "b"],
            vec![
                vec![Value::from("x"), Value::from(1)],
                vec![Value::from("x"), Value::from(1)],
            ],
        );
        let hashes = hash_rows(&ds, &cols(&["a", "b"])).unwrap();
        assert_eq!(hashes[0].1, hashes[1].1);

        let again = hash_rows(&ds, &cols(&["a", "b"])).unwrap();
        assert_eq!(hashes[0].1, again[0].1);
    }

    #[test]
    fn test_differing_rows_differ() {
        let ds = make_dataset(
            vec!["a"],
            vec![vec![Value::from("x")], vec![Value::from("y")]],
        );
        let hashes = hash_rows(&ds, &cols(&["a"])).unwrap();
        assert_ne!(hashes[0].1, hashes[1].1);
    }

    #[test]
    fn test_type_tags_prevent_representation_collisions() {
        // 5, 5.0 and "5" stringify identically but hash differently.
        let ds = make_dataset(
            vec!["v"],
            vec![
                vec![Value::Integer(5)],
                vec![Value::Float(5.0)],
                vec![Value::from("5")],
            ],
        );
        let hashes = hash_rows(&ds, &cols(&["v"])).unwrap();
        assert_ne!(hashes[0].1, hashes[1].1);
        assert_ne!(hashes[0].1, hashes[2].1);
        assert_ne!(hashes[1].1, hashes[2].1);
    }

    #[test]
    fn test_length_framing_prevents_boundary_shifts() {
        // ("ab", "c") must not collide with ("a", "bc").
        let ds = make_dataset(
            vec!["a", "b"],
            vec![
                vec![Value::from("ab"), Value::from("c")],
                vec![Value::from("a"), Value::from("bc")],
            ],
        );
        let hashes = hash_rows(&ds, &cols(&["a", "b"])).unwrap();
        assert_ne!(hashes[0].1, hashes[1].1);
    }

    #[test]
    fn test_analyze_groups_by_descending_count() {
        let ds = make_dataset(
            vec!["a"],
            vec![
                vec![Value::from("p")],
                vec![Value::from("q")],
                vec![Value::from("q")],
                vec![Value::from("p")],
                vec![Value::from("q")],
                vec![Value::from("r")],
            ],
        );
        let analysis = analyze(&ds, &cols(&["a"])).unwrap();

        assert_eq!(analysis.total_rows, 6);
        assert_eq!(analysis.unique_hashes, 3);
        assert_eq!(analysis.duplicate_hash_count, 3);
        assert_eq!(analysis.groups.len(), 2);
        assert_eq!(analysis.groups[0].row_count, 3); // the "q" rows
        assert_eq!(analysis.groups[0].row_ids, vec![1, 2, 4]);
        assert_eq!(analysis.groups[1].row_ids, vec![0, 3]);
    }

    #[test]
    fn test_hex_round_trip() {
        let ds = make_dataset(vec!["a"], vec![vec![Value::from("x")]]);
        let hash = hash_rows(&ds, &cols(&["a"])).unwrap()[0].1;
        let json = serde_json::to_string(&hash).unwrap();
        let back: RowHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, back);
    }
}
