// Per-tick systems: rate derivation, level integration and stage transitions.

pub mod integration;
pub mod manual;
pub mod rates;
pub mod transitions;
