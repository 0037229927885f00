extern crate std;

use std::collections::HashMap;
use std::hash::Hash;

/// One upcoming PATH train at the target station.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathArrival {
    pub line: String,
    pub to: String,
    pub minutes: u32,
}

/// One upcoming bus scraped from a MyBus ETA page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BusArrival {
    pub route: String,
    pub to: String,
    pub minutes: u32,
}

/// What the renderer needs from a row, whichever feed it came from.
pub trait Arrival {
    fn label(&self) -> String;
    fn destination(&self) -> &str;
    fn minutes(&self) -> u32;
}

impl Arrival for PathArrival {
    fn label(&self) -> String {
        return self.line.clone();
    }

    fn destination(&self) -> &str {
        return &self.to;
    }

    fn minutes(&self) -> u32 {
        return self.minutes;
    }
}

impl Arrival for BusArrival {
    fn label(&self) -> String {
        return format!("#{}", self.route);
    }

    fn destination(&self) -> &str {
        return &self.to;
    }

    fn minutes(&self) -> u32 {
        return self.minutes;
    }
}

pub fn within_window(minutes: u32, window: u32) -> bool {
    return minutes <= window;
}

/// Collapses rows that share a key and sorts the survivors by minutes.
///
/// On a key collision the later row replaces the earlier one but keeps the
/// earlier one's position, so rows with equal minutes stay in first-seen order.
pub fn collapse_rows<T, K, F>(rows: Vec<T>, key_fn: F) -> Vec<T>
where
    T: Arrival,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut unique: Vec<T> = Vec::with_capacity(rows.len());

    for row in rows {
        let key = key_fn(&row);
        match slots.get(&key).copied() {
            Some(idx) => unique[idx] = row,
            None => {
                slots.insert(key, unique.len());
                unique.push(row);
            }
        }
    }

    unique.sort_by_key(|r| r.minutes());
    return unique;
}
