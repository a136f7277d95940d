//! Member names never proxied onto a wrapper.
//!
//! These collide with object infrastructure (equality, hashing, cloning,
//! string conversion) or with the wrapper's own await machinery.

use std::collections::HashSet;
use std::sync::LazyLock;

static RESERVED_MEMBER_NAMES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "Equals",
        "GetHashCode",
        "ToString",
        "Clone",
        "MemberwiseClone",
        "GetType",
        "Finalize",
        "GetAwaiter",
        "AwaitAsync",
        "ConfigureAwait",
    ])
});

/// Whether `name` is reserved.
pub(crate) fn is_reserved(name: &str) -> bool {
    RESERVED_MEMBER_NAMES.contains(name)
}
