//! Cursor pagination over creation-time ordered records.
//!
//! Records are ordered newest first by `(created_at, id)`. A [`PageCursor`]
//! anchors on one record's sort key and points either at older records
//! ([`Direction::After`]) or newer ones ([`Direction::Before`]), so callers
//! can page forward and backward without repeating or skipping items even
//! while new records are being inserted at the head.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{RecordId, Timestamp};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on any requested page size.
pub const MAX_PAGE_SIZE: usize = 100;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> usize {
    match limit {
        None => DEFAULT_PAGE_SIZE,
        Some(n) if n < 1 => 1,
        Some(n) => (n as u64).min(MAX_PAGE_SIZE as u64) as usize,
    }
}

/// Anything listed through [`paginate`].
pub trait Chronological {
    fn created_at(&self) -> Timestamp;
    fn record_id(&self) -> RecordId;

    fn sort_key(&self) -> SortKey {
        SortKey {
            created_at: self.created_at(),
            id: self.record_id(),
        }
    }
}

/// Total order key: creation time, ties broken by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub created_at: Timestamp,
    pub id: RecordId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Records older than the anchor (next page).
    After,
    /// Records newer than the anchor (previous page).
    Before,
}

/// Decoded form of the opaque cursor strings handed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub direction: Direction,
    pub anchor: SortKey,
}

impl PageCursor {
    pub fn after(anchor: SortKey) -> Self {
        Self {
            direction: Direction::After,
            anchor,
        }
    }

    pub fn before(anchor: SortKey) -> Self {
        Self {
            direction: Direction::Before,
            anchor,
        }
    }

    /// Encode as `{a|b}{unix_nanos}_{id}`.
    pub fn encode(&self) -> String {
        let tag = match self.direction {
            Direction::After => 'a',
            Direction::Before => 'b',
        };
        let nanos = self.anchor.created_at.timestamp_nanos_opt().unwrap_or(i64::MAX);
        format!("{tag}{nanos}_{}", self.anchor.id.simple())
    }

    pub fn decode(raw: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::Validation(format!("Invalid page cursor '{raw}'"));

        let mut chars = raw.chars();
        let direction = match chars.next() {
            Some('a') => Direction::After,
            Some('b') => Direction::Before,
            _ => return Err(invalid()),
        };
        let (nanos, id) = chars.as_str().split_once('_').ok_or_else(invalid)?;
        let nanos: i64 = nanos.parse().map_err(|_| invalid())?;
        let id = RecordId::parse_str(id).map_err(|_| invalid())?;

        Ok(Self {
            direction,
            anchor: SortKey {
                created_at: chrono::DateTime::<chrono::Utc>::from_timestamp_nanos(nanos),
                id,
            },
        })
    }
}

/// One page of results plus cursors to its neighbours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next (older) page, absent on the last page.
    pub next_cursor: Option<String>,
    /// Cursor for the previous (newer) page, absent on the first page.
    pub prev_cursor: Option<String>,
}

/// Select one page of `items` (in any order) relative to `cursor`.
pub fn paginate<T: Chronological>(
    mut items: Vec<T>,
    limit: usize,
    cursor: Option<&PageCursor>,
) -> Page<T> {
    let limit = limit.max(1);
    items.sort_by(|a, b| newest_first(&a.sort_key(), &b.sort_key()));

    let (start, end) = match cursor {
        None => (0, limit.min(items.len())),
        Some(c) => match c.direction {
            Direction::After => {
                let start = items.partition_point(|x| x.sort_key() >= c.anchor);
                (start, (start + limit).min(items.len()))
            }
            Direction::Before => {
                let end = items.partition_point(|x| x.sort_key() > c.anchor);
                (end.saturating_sub(limit), end)
            }
        },
    };

    if start >= end {
        return Page {
            items: Vec::new(),
            next_cursor: None,
            prev_cursor: None,
        };
    }

    let next_cursor = (end < items.len())
        .then(|| PageCursor::after(items[end - 1].sort_key()).encode());
    let prev_cursor = (start > 0).then(|| PageCursor::before(items[start].sort_key()).encode());

    let items = items.drain(start..end).collect();
    Page {
        items,
        next_cursor,
        prev_cursor,
    }
}

fn newest_first(a: &SortKey, b: &SortKey) -> Ordering {
    b.cmp(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        created_at: Timestamp,
        id: RecordId,
    }

    impl Chronological for Item {
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
        fn record_id(&self) -> RecordId {
            self.id
        }
    }

    fn items(n: usize) -> Vec<Item> {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        (0..n)
            .map(|i| Item {
                // Pairs share a timestamp so the id tie-break is exercised.
                created_at: base + Duration::seconds((i / 2) as i64),
                id: uuid::Uuid::from_u128(i as u128 + 1),
            })
            .collect()
    }

    fn ordered(n: usize) -> Vec<Item> {
        let mut all = items(n);
        all.sort_by(|a, b| newest_first(&a.sort_key(), &b.sort_key()));
        all
    }

    fn decode(c: &Option<String>) -> PageCursor {
        PageCursor::decode(c.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn first_page_is_newest() {
        let page = paginate(items(45), 20, None);
        assert_eq!(page.items, ordered(45)[..20].to_vec());
        assert!(page.next_cursor.is_some());
        assert!(page.prev_cursor.is_none());
    }

    #[test]
    fn forward_paging_neither_repeats_nor_skips() {
        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = paginate(items(45), 20, cursor.as_ref());
            seen.extend(page.items);
            match page.next_cursor {
                Some(c) => cursor = Some(PageCursor::decode(&c).unwrap()),
                None => break,
            }
        }
        assert_eq!(seen, ordered(45));
    }

    #[test]
    fn second_page_follows_first() {
        let first = paginate(items(21), 20, None);
        let second = paginate(items(21), 20, Some(&decode(&first.next_cursor)));
        assert_eq!(second.items, ordered(21)[20..].to_vec());
        assert!(second.next_cursor.is_none());
        assert!(second.prev_cursor.is_some());
    }

    #[test]
    fn backward_paging_returns_previous_page() {
        let first = paginate(items(45), 20, None);
        let second = paginate(items(45), 20, Some(&decode(&first.next_cursor)));
        let back = paginate(items(45), 20, Some(&decode(&second.prev_cursor)));
        assert_eq!(back.items, first.items);
        assert!(back.prev_cursor.is_none());
    }

    #[test]
    fn new_records_do_not_shift_next_page() {
        let first = paginate(items(30), 10, None);
        let cursor = decode(&first.next_cursor);

        // A newer record lands at the head between requests.
        let mut grown = items(30);
        grown.push(Item {
            created_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            id: uuid::Uuid::from_u128(999),
        });
        let second = paginate(grown, 10, Some(&cursor));
        assert_eq!(second.items, ordered(30)[10..20].to_vec());
    }

    #[test]
    fn empty_input_gives_empty_page() {
        let page = paginate(Vec::<Item>::new(), 20, None);
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
        assert!(page.prev_cursor.is_none());
    }

    #[test]
    fn cursor_round_trips() {
        let key = ordered(3)[1].sort_key();
        let cursor = PageCursor::before(key);
        assert_eq!(PageCursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn malformed_cursors_rejected() {
        for raw in ["", "x123_abc", "a123", "anotanumber_0000", "a1_not-a-uuid"] {
            assert_matches!(PageCursor::decode(raw), Err(CoreError::Validation(_)));
        }
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(5000)), MAX_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(7)), 7);
    }
}
