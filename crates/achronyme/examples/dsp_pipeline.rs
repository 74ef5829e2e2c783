//! Windowed spectral analysis through the fast path: generate a tone,
//! apply a Hann window, and read the magnitude spectrum.

use achronyme::Engine;

fn main() {
    let mut engine = Engine::new();

    // 64 samples of a tone with 4 cycles over the window, built on the
    // slow path for convenience.
    engine
        .eval("let n = linspace(0, 63, 64)")
        .expect("bind sample index");
    engine
        .eval("let tone = map(k => sin(2 * pi * 4 * k / 64), n)")
        .expect("bind tone");

    // Hand the signal across to the fast path by name.
    let rendered = engine.eval("tone").expect("read tone");
    println!("tone = {rendered}");

    let window = engine.hann_window(64);
    let samples: Vec<f64> = engine.get_vector(window).expect("window").to_vec();
    println!("hann[0..4] = {:?}", &samples[..4]);

    // Window the tone and inspect the spectrum peak.
    let spectrum = engine
        .eval("fft_mag(map((x, w) => x * w, tone, hann(64)))")
        .expect("windowed spectrum");
    println!("spectrum = {spectrum}");

    let stats = engine.stats();
    println!(
        "ops: {} fast / {} slow, {} live handles",
        stats.fast_path_ops,
        stats.slow_path_ops,
        stats.active_handles()
    );
}
