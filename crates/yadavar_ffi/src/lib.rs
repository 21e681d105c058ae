//! Flutter-facing bindings for the Yadavar reminder core.

pub mod api;
