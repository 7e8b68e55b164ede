// powerscore-core: Data dependency bus, derivation pipeline and remote
// providers behind the power score analysis.

pub mod bus;
pub mod calculator;
pub mod config;
pub mod data_type;
pub mod derive;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bus::{Delivery, DeliveryResult, DeliveryStream, NotificationBus, WeakBus};
pub use calculator::{CalculatorParams, provide_calculator_data};
pub use config::{PollPolicies, PollPolicy, RuntimeConfig};
pub use data_type::DataType;
pub use derive::{DerivationConfig, PowerScore, init_calculations};
pub use error::{CoreError, DataError, DataErrorKind};
pub use model::Datum;
pub use provider::{CachedSession, MemorySessionCache, RemoteProviders, SessionCache};
pub use report::{AnalysisReport, PsiGauge};
pub use session::PowerScoreSession;
