//! Partial selection of the best `count` elements of a collection.

use std::cmp::Ordering;

/// Return the first `count` elements of `items` in the order defined by
/// `is_before`, without sorting the whole collection when `count` is small.
///
/// `is_before(a, b)` must be a strict weak ordering: `true` when `a` ranks
/// ahead of `b`. The result is ranked best first.
///
/// When `count` is at least a tenth of the collection a stable sort is
/// cheaper than maintaining a buffer, so that path sorts and truncates.
/// Otherwise a sorted buffer of `count` elements is kept and each remaining
/// element is either rejected against the current worst entry or
/// binary-inserted in `O(log count)`.
///
/// For strict total orders both paths return the same elements. When
/// elements compare equal the buffered path can differ from a stable sort:
/// a later element that ties with the worst kept element replaces it, where
/// a stable sort would keep the earlier one. Callers that need stable tie
/// handling should break ties inside `is_before` (for example on an index).
pub fn top_k_by<T, I, F>(items: I, count: usize, mut is_before: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T, &T) -> bool,
{
    if count == 0 {
        return Vec::new();
    }

    let items: Vec<T> = items.into_iter().collect();
    let prefix_count = count.min(items.len());

    if prefix_count >= items.len() / 10 {
        let mut sorted = items;
        sorted.sort_by(|a, b| ordering(&mut is_before, a, b));
        sorted.truncate(prefix_count);
        return sorted;
    }

    let mut iter = items.into_iter();
    let mut result: Vec<T> = iter.by_ref().take(prefix_count).collect();
    result.sort_by(|a, b| ordering(&mut is_before, a, b));

    for element in iter {
        if let Some(worst) = result.last() {
            if is_before(worst, &element) {
                continue;
            }
        }
        let insertion = result.partition_point(|kept| !is_before(&element, kept));
        result.pop();
        if insertion >= result.len() {
            result.push(element);
        } else {
            result.insert(insertion, element);
        }
    }

    result
}

fn ordering<T, F>(is_before: &mut F, a: &T, b: &T) -> Ordering
where
    F: FnMut(&T, &T) -> bool,
{
    if is_before(a, b) {
        Ordering::Less
    } else if is_before(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}
