pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use datasource::{DataSourceError, FplLiveSource, LiveSource, MockLiveSource};
pub use db::{init_db, Repository};
pub use domain::{
    Chip, H2hMatch, LeagueId, ManagerId, ManagerPicks, PlayerId, RoundData, RoundId, RoundLuck,
    RoundStatus, SeasonLuck, TeamGameweekScore,
};
pub use error::AppError;
pub use orchestration::{Reconciler, ReconcilerSettings, ScoreError};
pub use store::{MockRoundStore, RoundStore, StoreError};
