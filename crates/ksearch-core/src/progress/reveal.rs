//! Staggered visibility shared by the sub-query and document animators.

use std::time::Duration;

/// Which animated item a fired timer refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealTarget {
    SubQuery(usize),
    Document(usize),
}

/// A reveal the caller must schedule `delay` after the triggering step was
/// processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTimer {
    pub target: RevealTarget,
    pub delay: Duration,
}

/// N items that become visible one by one, `index × stagger` apart.
///
/// Visibility only ever goes from hidden to shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaggeredReveal {
    visible: Vec<bool>,
    stagger: Duration,
}

impl StaggeredReveal {
    pub fn new(len: usize, stagger: Duration) -> Self {
        Self {
            visible: vec![false; len],
            stagger,
        }
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Delay of each item relative to the start of the sequence.
    pub fn schedule(&self) -> impl Iterator<Item = (usize, Duration)> + '_ {
        let stagger = self.stagger;
        (0..self.visible.len()).map(move |index| {
            let steps = u32::try_from(index).unwrap_or(u32::MAX);
            (index, stagger.saturating_mul(steps))
        })
    }

    /// Marks one item visible. Returns true if it was hidden before.
    pub fn reveal(&mut self, index: usize) -> bool {
        match self.visible.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }
}
