use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Parsed patterns keyed by their source text.
///
/// Parsing is pure, so two threads racing on the same key build equal
/// values and the first insert wins.
#[derive(Debug)]
pub struct PatternCache<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Default for PatternCache<T> {
    fn default() -> Self {
        PatternCache {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> PatternCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(&self, pattern: &str, parse: impl FnOnce(&str) -> T) -> Arc<T> {
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return Arc::clone(hit);
        }
        let parsed = Arc::new(parse(pattern));
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(pattern.to_string()).or_insert(parsed))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_once_per_key() {
        let cache: PatternCache<usize> = PatternCache::new();
        let mut calls = 0;
        let a = cache.get_or_parse("abc", |p| {
            calls += 1;
            p.len()
        });
        let b = cache.get_or_parse("abc", |_| unreachable!());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }
}
