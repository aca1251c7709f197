//! Accepting connections and handing them to the HTTP layer.

pub mod listener;
