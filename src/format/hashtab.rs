//! Symbol name hash table with separate chaining.
//!
//! Buckets hold symbol indices; collisions chain through a parallel array
//! indexed by symbol index. Index 0 is the null symbol and doubles as the
//! empty-slot marker, so the null symbol itself is never registered here.

use crate::format::words::{push_u32, read_u32};

const HASH_SEED: u16 = 3911;

/// Hash an ASCII symbol name into the 16-bit word range.
pub fn hash_name(name: &str) -> Result<u16, String> {
    if !name.is_ascii() {
        return Err(format!("symbol name {:?} contains non-ASCII characters", name));
    }
    let mut hash = HASH_SEED;
    for &byte in name.as_bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as u16);
    }
    Ok(hash)
}

#[derive(Debug)]
pub struct HashTable {
    bucket: Vec<u32>,
    chain: Vec<u32>,
    occupied: usize,
}

impl HashTable {
    pub fn new(nbucket: usize, nchain: usize) -> Result<HashTable, String> {
        if nbucket == 0 || nchain == 0 {
            return Err("hash table must have at least one bucket and one chain slot".to_string());
        }
        Ok(HashTable { bucket: vec![0; nbucket], chain: vec![0; nchain], occupied: 0 })
    }

    pub fn nbucket(&self) -> usize {
        self.bucket.len()
    }

    pub fn nchain(&self) -> usize {
        self.chain.len()
    }

    /// Fraction of buckets holding at least one symbol.
    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.bucket.len() as f64
    }

    pub fn size_words(&self) -> u32 {
        (4 + 2 * (self.bucket.len() + self.chain.len())) as u32
    }

    /// Register `id` under `name`. Chain walks are bounded by the chain
    /// length; running out of reachable slots is an error.
    pub fn insert(&mut self, name: &str, id: u32) -> Result<(), String> {
        let slot = hash_name(name)? as usize % self.bucket.len();
        let mut cur = self.bucket[slot];
        if cur == id {
            return Ok(());
        }
        if cur == 0 {
            self.bucket[slot] = id;
            self.occupied += 1;
            return Ok(());
        }
        for _ in 0..self.chain.len() {
            let prev = cur as usize;
            if prev >= self.chain.len() {
                return Err(format!(
                    "hash chain index {} is out of range while inserting '{}'",
                    prev, name
                ));
            }
            cur = self.chain[prev];
            if cur == id {
                return Ok(());
            }
            if cur == 0 {
                self.chain[prev] = id;
                return Ok(());
            }
        }
        Err(format!("no chain slot left in hash table for symbol '{}'", name))
    }

    /// Look up the index registered under `name`. `name_of` resolves a
    /// symbol index back to its name so that chains can be disambiguated.
    pub fn find<F>(&self, name: &str, name_of: F) -> Result<Option<u32>, String>
    where
        F: Fn(u32) -> Option<String>,
    {
        let slot = hash_name(name)? as usize % self.bucket.len();
        let mut cur = self.bucket[slot];
        if cur == 0 {
            return Ok(None);
        }
        if name_of(cur).as_deref() == Some(name) {
            return Ok(Some(cur));
        }
        for _ in 0..self.chain.len() {
            let idx = cur as usize;
            if idx >= self.chain.len() {
                return Ok(None);
            }
            cur = self.chain[idx];
            if cur == 0 {
                return Ok(None);
            }
            if name_of(cur).as_deref() == Some(name) {
                return Ok(Some(cur));
            }
        }
        Ok(None)
    }

    /// Every symbol index reachable from a bucket. Walks are bounded by the
    /// chain length, so a corrupt cyclic chain still terminates.
    pub fn registered_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for &head in &self.bucket {
            let mut cur = head;
            for _ in 0..=self.chain.len() {
                if cur == 0 {
                    break;
                }
                ids.push(cur);
                let idx = cur as usize;
                if idx >= self.chain.len() {
                    break;
                }
                cur = self.chain[idx];
            }
        }
        ids
    }

    /// Grow the chain array to at least `n` slots.
    pub fn ensure_chain_capacity(&mut self, n: usize) {
        if self.chain.len() < n {
            self.chain.resize(n, 0);
        }
    }

    /// Throw away all registrations and start over with `nbucket` buckets.
    /// The caller re-inserts the symbols that should survive.
    pub fn rebuild_with_buckets(&mut self, nbucket: usize) {
        self.bucket = vec![0; nbucket];
        for slot in &mut self.chain {
            *slot = 0;
        }
        self.occupied = 0;
    }

    pub fn serialize_words(&self) -> Vec<u16> {
        let mut out = Vec::with_capacity(self.size_words() as usize);
        push_u32(&mut out, self.bucket.len() as u32);
        push_u32(&mut out, self.chain.len() as u32);
        for &b in &self.bucket {
            push_u32(&mut out, b);
        }
        for &c in &self.chain {
            push_u32(&mut out, c);
        }
        out
    }

    pub fn deserialize(words: &[u16]) -> Result<HashTable, String> {
        if words.len() < 4 {
            return Err(format!("hash table body has {} words, expected at least 4", words.len()));
        }
        let nbucket = read_u32(words, 0) as usize;
        let nchain = read_u32(words, 2) as usize;
        let expected = 4 + 2 * (nbucket + nchain);
        if words.len() != expected {
            return Err(format!(
                "hash table declares {} buckets and {} chain slots but has {} words, expected {}",
                nbucket,
                nchain,
                words.len(),
                expected
            ));
        }
        let mut tab = HashTable::new(nbucket, nchain)?;
        for i in 0..nbucket {
            tab.bucket[i] = read_u32(words, 4 + 2 * i);
            if tab.bucket[i] != 0 {
                tab.occupied += 1;
            }
        }
        for i in 0..nchain {
            tab.chain[i] = read_u32(words, 4 + 2 * (nbucket + i));
        }
        Ok(tab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_and_16_bit() {
        let a = hash_name("main").unwrap();
        assert_eq!(a, hash_name("main").unwrap());
        assert_ne!(hash_name("main").unwrap(), hash_name("mian").unwrap());
        assert_eq!(hash_name("").unwrap(), 3911);
    }

    #[test]
    fn test_non_ascii_name_rejected() {
        assert!(hash_name("ü").is_err());
    }

    #[test]
    fn test_insert_then_find() {
        let mut tab = HashTable::new(4, 8).unwrap();
        tab.insert("alpha", 1).unwrap();
        tab.insert("beta", 2).unwrap();
        tab.insert("gamma", 3).unwrap();
        let names = ["", "alpha", "beta", "gamma"];
        let name_of = |id: u32| names.get(id as usize).map(|s| s.to_string());
        assert_eq!(tab.find("alpha", name_of).unwrap(), Some(1));
        assert_eq!(tab.find("beta", name_of).unwrap(), Some(2));
        assert_eq!(tab.find("gamma", name_of).unwrap(), Some(3));
        assert_eq!(tab.find("delta", name_of).unwrap(), None);
    }

    #[test]
    fn test_collisions_chain_in_single_bucket() {
        // One bucket forces every symbol onto the same chain.
        let mut tab = HashTable::new(1, 8).unwrap();
        tab.insert("a", 1).unwrap();
        tab.insert("b", 2).unwrap();
        tab.insert("c", 3).unwrap();
        let names = ["", "a", "b", "c"];
        let name_of = |id: u32| names.get(id as usize).map(|s| s.to_string());
        for (name, id) in [("a", 1), ("b", 2), ("c", 3)] {
            assert_eq!(tab.find(name, name_of).unwrap(), Some(id));
        }
    }

    #[test]
    fn test_reinserting_same_id_is_idempotent() {
        let mut tab = HashTable::new(2, 4).unwrap();
        tab.insert("x", 1).unwrap();
        tab.insert("x", 1).unwrap();
        assert!((tab.load_factor() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_registered_ids_cover_buckets_and_chains() {
        let mut tab = HashTable::new(1, 8).unwrap();
        tab.insert("a", 1).unwrap();
        tab.insert("b", 2).unwrap();
        tab.insert("c", 3).unwrap();
        let mut ids = tab.registered_ids();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(HashTable::new(4, 4).unwrap().registered_ids().is_empty());
    }

    #[test]
    fn test_serialize_layout() {
        let mut tab = HashTable::new(2, 3).unwrap();
        tab.insert("q", 1).unwrap();
        let wire = tab.serialize_words();
        assert_eq!(wire.len(), tab.size_words() as usize);
        assert_eq!(read_u32(&wire, 0), 2);
        assert_eq!(read_u32(&wire, 2), 3);
        let back = HashTable::deserialize(&wire).unwrap();
        assert_eq!(back.nbucket(), 2);
        assert_eq!(back.nchain(), 3);
        assert_eq!(back.serialize_words(), wire);
    }

    #[test]
    fn test_truncated_body_rejected() {
        let tab = HashTable::new(2, 2).unwrap();
        let mut wire = tab.serialize_words();
        wire.pop();
        wire.pop();
        assert!(HashTable::deserialize(&wire).is_err());
    }
}
