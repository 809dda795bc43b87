//! Ordered container over arena keys.
//!
//! The list only stores links; the items themselves live in a `SlotMap` owned
//! by the engine. A key can be linked into at most one position of a list, and
//! every relink checks the neighbors it is about to rewrite. A mismatch means
//! the caller corrupted the structure, so it panics instead of returning an
//! error.

use std::fmt;

use slotmap::{Key, SecondaryMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Link<K> {
    prev: Option<K>,
    next: Option<K>,
}

#[derive(Clone)]
pub struct OrderedList<K: Key> {
    head: Option<K>,
    tail: Option<K>,
    len: usize,
    links: SecondaryMap<K, Link<K>>,
}

impl<K: Key> Default for OrderedList<K> {
    fn default() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            links: SecondaryMap::new(),
        }
    }
}

impl<K: Key> fmt::Debug for OrderedList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_list().entries(self.iter()).finish() }
}

impl<K: Key> OrderedList<K> {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn first(&self) -> Option<K> { self.head }

    pub fn last(&self) -> Option<K> { self.tail }

    pub fn contains(&self, item: K) -> bool { self.links.contains_key(item) }

    pub fn prev(&self, item: K) -> Option<K> { self.link(item).prev }

    pub fn next(&self, item: K) -> Option<K> { self.link(item).next }

    /// Inserts `item` right before `next`. `None` means "before nothing",
    /// i.e. at the end.
    pub fn insert_before(&mut self, item: K, next: Option<K>) {
        let prev = match next {
            Some(next) => self.link(next).prev,
            None => self.tail,
        };
        self.insert(item, prev, next);
    }

    /// Inserts `item` right after `prev`. `None` means "after nothing", i.e.
    /// at the start.
    pub fn insert_after(&mut self, item: K, prev: Option<K>) {
        let next = match prev {
            Some(prev) => self.link(prev).next,
            None => self.head,
        };
        self.insert(item, prev, next);
    }

    pub fn insert_start(&mut self, item: K) { self.insert(item, None, self.head) }

    pub fn insert_end(&mut self, item: K) { self.insert(item, self.tail, None) }

    fn insert(&mut self, item: K, prev: Option<K>, next: Option<K>) {
        assert!(!self.contains(item), "{item:?} is already linked");
        if let Some(next) = next {
            let link = self.link_mut(next);
            assert_eq!(link.prev, prev, "broken link before {next:?}");
            link.prev = Some(item);
        } else {
            assert_eq!(self.tail, prev, "insert at the end must follow the tail");
        }
        if let Some(prev) = prev {
            let link = self.link_mut(prev);
            assert_eq!(link.next, next, "broken link after {prev:?}");
            link.next = Some(item);
        } else {
            assert_eq!(self.head, next, "insert at the start must precede the head");
        }
        if self.head == next {
            self.head = Some(item);
        }
        if self.tail == prev {
            self.tail = Some(item);
        }
        self.links.insert(item, Link { prev, next });
        self.len += 1;
    }

    pub fn remove(&mut self, item: K) {
        let Some(Link { prev, next }) = self.links.remove(item) else {
            panic!("{item:?} is not in the list");
        };
        match prev {
            Some(prev) => self.link_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.link_mut(next).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Swaps two adjacent items. `b` must directly follow `a`.
    pub fn swap(&mut self, a: K, b: K) {
        let Link { prev, next: a_next } = self.link(a);
        let Link { prev: b_prev, next } = self.link(b);
        assert!(a_next == Some(b) && b_prev == Some(a), "{a:?} and {b:?} are not adjacent");

        match prev {
            Some(prev) => self.link_mut(prev).next = Some(b),
            None => self.head = Some(b),
        }
        match next {
            Some(next) => self.link_mut(next).prev = Some(a),
            None => self.tail = Some(a),
        }
        *self.link_mut(b) = Link { prev, next: Some(a) };
        *self.link_mut(a) = Link { prev: Some(b), next };
    }

    /// Swaps `item` with its predecessor. No-op at the start.
    pub fn move_back(&mut self, item: K) {
        if let Some(prev) = self.prev(item) {
            self.swap(prev, item);
        }
    }

    /// Swaps `item` with its successor. No-op at the end.
    pub fn move_forward(&mut self, item: K) {
        if let Some(next) = self.next(item) {
            self.swap(item, next);
        }
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    pub fn index_of(&self, item: K) -> Option<usize> { self.iter().position(|k| k == item) }

    pub fn get(&self, index: usize) -> Option<K> { self.iter().nth(index) }

    fn link(&self, item: K) -> Link<K> {
        match self.links.get(item) {
            Some(link) => *link,
            None => panic!("{item:?} is not in the list"),
        }
    }

    fn link_mut(&mut self, item: K) -> &mut Link<K> {
        match self.links.get_mut(item) {
            Some(link) => link,
            None => panic!("{item:?} is not in the list"),
        }
    }
}

pub struct Iter<'a, K: Key> {
    list: &'a OrderedList<K>,
    cursor: Option<K>,
}

impl<K: Key> Iterator for Iter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.cursor?;
        self.cursor = self.list.next(current);
        Some(current)
    }
}

impl<'a, K: Key> IntoIterator for &'a OrderedList<K> {
    type IntoIter = Iter<'a, K>;
    type Item = K;

    fn into_iter(self) -> Iter<'a, K> { self.iter() }
}
