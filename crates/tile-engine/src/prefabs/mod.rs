//! Stock entity builders registered by `EntityRegistry::with_builtins`.

pub mod elevator;
pub mod ladder;
pub mod liquid;
