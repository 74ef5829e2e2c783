pub mod dsp;
pub mod generate;
pub mod hof;
pub mod linalg;
pub mod math;
pub mod stats;

mod utils;

use std::sync::Once;

static REGISTER: Once = Once::new();

/// Install the builtin set into the global registry, once per process.
pub fn ensure_registered() {
    REGISTER.call_once(|| {
        math::register_builtins();
        stats::register_builtins();
        dsp::register_builtins();
        linalg::register_builtins();
        hof::register_builtins();
        generate::register_builtins();
    });
}
