//! Knuth-Morris-Pratt exact byte search
//!
//! The marker search runs over a window of up to 1 MiB, so the scan
//! must not backtrack: KMP gives O(haystack + needle) time with a
//! table of O(needle) extra space, computed once per pattern and
//! reused across searches.

/// A compiled search pattern: the needle plus its KMP overlap table.
///
/// The table depends only on the needle, never on the haystack, so a
/// `Pattern` is built once and reused for every search in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    needle: Vec<u8>,
    overlap: Vec<i32>,
}

impl Pattern {
    /// Compile `needle` into a reusable pattern.
    ///
    /// An empty needle yields a pattern that never matches.
    #[must_use]
    pub fn new(needle: &[u8]) -> Self {
        Self {
            needle: needle.to_vec(),
            overlap: build_overlap(needle),
        }
    }

    /// The bytes this pattern searches for.
    #[must_use]
    pub fn needle(&self) -> &[u8] {
        &self.needle
    }

    /// Find the first occurrence of the needle in `haystack`.
    ///
    /// Returns the position one past the *start* of the match (the
    /// convention of the block format's reference readers, kept so
    /// offset arithmetic lines up with the wire-format description:
    /// for a match starting at index `i`, the marker's last byte is at
    /// `find() - 1 + needle.len() - 1`).
    ///
    /// A haystack shorter than the needle, or an empty needle, is a
    /// normal no-match, not an error.
    #[must_use]
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        let n = haystack.len();
        let m = self.needle.len();
        if m == 0 || n < m {
            return None;
        }
        // i: window start, j: bytes matched so far
        let mut i = 0usize;
        let mut j = 0usize;
        while i + j < n {
            if self.needle[j] == haystack[i + j] {
                if j == m - 1 {
                    return Some(i + 1);
                }
                j += 1;
            } else if j > 0 {
                // overlap[j] >= 0 for j >= 1
                let t = self.overlap[j] as usize;
                i = i + j - t;
                j = t;
            } else {
                i += 1;
            }
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn overlap(&self) -> &[i32] {
        &self.overlap
    }
}

/// Build the KMP failure function for `needle`.
///
/// `table[0] == -1`, `table[1] == 0`, and for `i >= 2`, `table[i]` is
/// the length of the longest proper border of `needle[0..i-1]`.
fn build_overlap(needle: &[u8]) -> Vec<i32> {
    let len = needle.len();
    let mut table = vec![0i32; len];
    if len == 0 {
        return table;
    }
    table[0] = -1;
    let mut i = 2usize;
    let mut j = 0usize;
    while i < len {
        if needle[i - 1] == needle[j] {
            j += 1;
            table[i] = j as i32;
            i += 1;
        } else if j > 0 {
            j = table[j] as usize;
        } else {
            table[i] = 0;
            i += 1;
        }
    }
    table
}
