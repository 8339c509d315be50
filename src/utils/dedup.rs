use std::{collections::HashSet, hash::Hash};

/// An iterator that skips elements it has already yielded.
pub struct Dedup<I: Iterator>
where
    I::Item: Hash + Eq + Clone,
{
    base: I,
    seen: HashSet<I::Item>,
}

impl<I: Iterator> Iterator for Dedup<I>
where
    I::Item: Hash + Eq + Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let seen = &mut self.seen;
        self.base.find(|next| seen.insert(next.clone()))
    }
}

pub trait DedupIterator: Iterator + Sized
where
    Self::Item: Hash + Eq + Clone,
{
    /// Returns an iterator over the first occurrence of each element, in order.
    fn dedup(self) -> Dedup<Self> {
        Dedup {
            base: self,
            seen: HashSet::new(),
        }
    }
}

impl<I: Iterator> DedupIterator for I where I::Item: Hash + Eq + Clone {}
