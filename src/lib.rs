//! Workspace root package. Exists to carry workspace-wide dev tooling
//! (cargo-husky git hooks); all functionality lives in `crates/*`.
