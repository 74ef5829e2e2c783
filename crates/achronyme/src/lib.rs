//! Meta crate that re-exports the Achronyme building blocks with
//! sensible defaults. Downstream users can depend on this crate and opt
//! into specific layers via feature flags while keeping access to the
//! underlying crates when deeper integration is required.
//!
//! ```
//! use achronyme::Engine;
//!
//! let mut engine = Engine::new();
//! assert_eq!(engine.eval("2 + 3 * 4").unwrap(), "14");
//!
//! let v = engine.create_vector(vec![1.0, 0.0, 0.0, 0.0]);
//! let mag = engine.fft_mag(v).unwrap();
//! assert_eq!(engine.get_vector(mag).unwrap(), &[1.0, 1.0, 1.0, 1.0]);
//! ```

#[cfg(feature = "common")]
pub use achronyme_common as common;

#[cfg(feature = "parse")]
pub use achronyme_parse as parse;

#[cfg(feature = "num")]
pub use achronyme_num as num;

#[cfg(feature = "eval")]
pub use achronyme_eval as eval;

#[cfg(feature = "engine")]
pub use achronyme_runtime as runtime;

#[cfg(feature = "common")]
pub use achronyme_common::{Complex, EngineConfig, EngineError, EngineErrorKind, Matrix};

#[cfg(feature = "eval")]
pub use achronyme_eval::{Env, Interpreter, Value};

#[cfg(feature = "engine")]
pub use achronyme_runtime::{ArenaStats, Engine, Handle};
