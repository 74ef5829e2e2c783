pub mod conv;
pub mod elementwise;
pub mod fft;
pub mod linalg;
pub mod stats;
pub mod window;
