pub mod reconciler;

pub use reconciler::{LeagueScore, Reconciler, ReconcilerSettings, ResolvedRound, ScoreError};
