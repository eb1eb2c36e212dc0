#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use restorang::models::PriceObservation;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Source-selection variables every env test starts from a clean slate of.
pub const SOURCE_VARS: [&str; 4] = [
    "SOURCE_TYPE",
    "SUPABASE_URL",
    "SUPABASE_KEY",
    "RESTORANG_API_URL",
];

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

/// Like [`with_scoped_env`], with every source variable cleared unless `changes` sets it.
pub fn with_source_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let mut all: Vec<(&str, Option<&str>)> = SOURCE_VARS
        .iter()
        .filter(|k| !changes.iter().any(|(c, _)| c == *k))
        .map(|k| (*k, None))
        .collect();
    all.extend_from_slice(changes);
    with_scoped_env(&all, f)
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// One row per `(name, district, price)`, ids assigned in order from 1.
pub fn rows(data: &[(&str, &str, Option<f64>)]) -> Vec<PriceObservation> {
    data.iter()
        .enumerate()
        .map(|(i, (name, period, price))| {
            PriceObservation::new(i as i64 + 1, *name, *period, *price, 1)
        })
        .collect()
}
