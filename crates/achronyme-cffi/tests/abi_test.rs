//! In-process exercises of the C ABI surface.
//!
//! Each test runs against the same thread-local engine, so every test
//! starts with `ach_reset()`.

use achronyme_cffi::*;
use std::ffi::CString;

fn status() -> ach_status {
    ach_status::ok()
}

fn buffer_to_string(buffer: ach_buffer) -> String {
    let s = if buffer.data.is_null() {
        String::new()
    } else {
        unsafe { std::slice::from_raw_parts(buffer.data, buffer.len) }
            .iter()
            .map(|&b| b as char)
            .collect()
    };
    unsafe { ach_buffer_free(buffer) };
    s
}

fn error_json(status: ach_status) -> String {
    assert_eq!(status.code, ach_status_code::ACH_STATUS_ERROR);
    buffer_to_string(status.error)
}

#[test]
fn abi_version_is_stable() {
    assert_eq!(ach_abi_version(), 1);
}

#[test]
fn eval_roundtrip() {
    ach_reset();
    let src = CString::new("2 + 3 * 4").unwrap();
    let mut st = status();
    let out = unsafe { ach_eval(src.as_ptr(), &mut st) };
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    assert_eq!(buffer_to_string(out), "14");
}

#[test]
fn eval_reports_structured_errors() {
    ach_reset();
    let src = CString::new("nope + 1").unwrap();
    let mut st = status();
    let out = unsafe { ach_eval(src.as_ptr(), &mut st) };
    assert!(out.data.is_null());
    let json = error_json(st);
    assert!(json.contains("\"kind\":\"NameError\""), "payload: {json}");
}

#[test]
fn null_source_is_an_error() {
    ach_reset();
    let mut st = status();
    let out = unsafe { ach_eval(std::ptr::null(), &mut st) };
    assert!(out.data.is_null());
    assert_eq!(st.code, ach_status_code::ACH_STATUS_ERROR);
    unsafe { ach_buffer_free(st.error) };
}

#[test]
fn vector_create_read_release() {
    ach_reset();
    let data = [3.0_f64, 4.0];
    let mut st = status();
    let h = unsafe { ach_create_vector(data.as_ptr(), data.len(), &mut st) };
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);

    let out = unsafe { ach_get_vector(h, &mut st) };
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    let xs = unsafe { std::slice::from_raw_parts(out.data, out.len) };
    assert_eq!(xs, &[3.0, 4.0]);
    unsafe { ach_f64_buffer_free(out) };

    assert_eq!(ach_norm(h, &mut st), 5.0);
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);

    ach_release_handle(h);
    let out = unsafe { ach_get_vector(h, &mut st) };
    assert!(out.data.is_null());
    let json = error_json(st);
    assert!(json.contains("InvalidHandle"), "payload: {json}");
}

#[test]
fn fast_path_pipeline() {
    ach_reset();
    let a = [1.0_f64, 2.0, 3.0];
    let b = [1.0_f64, 1.0];
    let mut st = status();
    let ha = unsafe { ach_create_vector(a.as_ptr(), a.len(), &mut st) };
    let hb = unsafe { ach_create_vector(b.as_ptr(), b.len(), &mut st) };

    let hc = ach_conv(ha, hb, &mut st);
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    let out = unsafe { ach_get_vector(hc, &mut st) };
    let xs = unsafe { std::slice::from_raw_parts(out.data, out.len) };
    assert_eq!(xs, &[1.0, 3.0, 5.0, 3.0]);
    unsafe { ach_f64_buffer_free(out) };

    // Magnitude spectrum of an impulse is flat.
    let imp = [1.0_f64, 0.0, 0.0, 0.0];
    let hi = unsafe { ach_create_vector(imp.as_ptr(), imp.len(), &mut st) };
    let hm = ach_dsp_fft_mag(hi, &mut st);
    let out = unsafe { ach_get_vector(hm, &mut st) };
    let xs = unsafe { std::slice::from_raw_parts(out.data, out.len) };
    for &x in xs {
        assert!((x - 1.0).abs() < 1e-12);
    }
    unsafe { ach_f64_buffer_free(out) };
}

#[test]
fn complex_vectors_travel_interleaved() {
    ach_reset();
    let mut st = status();
    let imp = [1.0_f64, 0.0, 0.0, 0.0];
    let hi = unsafe { ach_create_vector(imp.as_ptr(), imp.len(), &mut st) };
    let hs = ach_dsp_fft(hi, &mut st);
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);

    let out = unsafe { ach_get_complex_vector(hs, &mut st) };
    assert_eq!(out.len, 8);
    let xs = unsafe { std::slice::from_raw_parts(out.data, out.len) };
    // DFT of an impulse: every bin is 1 + 0i.
    for pair in xs.chunks_exact(2) {
        assert!((pair[0] - 1.0).abs() < 1e-12);
        assert!(pair[1].abs() < 1e-12);
    }
    unsafe { ach_f64_buffer_free(out) };

    // Round trip: hand the spectrum back in interleaved form.
    let interleaved = [1.0_f64, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
    let hz = unsafe { ach_create_complex_vector(interleaved.as_ptr(), interleaved.len(), &mut st) };
    let ht = ach_dsp_ifft(hz, &mut st);
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    let out = unsafe { ach_get_vector(ht, &mut st) };
    let xs = unsafe { std::slice::from_raw_parts(out.data, out.len) };
    assert!((xs[0] - 1.0).abs() < 1e-12);
    assert!(xs[1].abs() < 1e-12);
    unsafe { ach_f64_buffer_free(out) };

    // Odd buffers are rejected.
    let odd = [1.0_f64, 2.0, 3.0];
    let h = unsafe { ach_create_complex_vector(odd.as_ptr(), odd.len(), &mut st) };
    assert_eq!(h, ACH_NULL_HANDLE);
    let json = error_json(st);
    assert!(json.contains("ShapeError"), "payload: {json}");
}

#[test]
fn bind_variable_connects_fast_and_slow_paths() {
    ach_reset();
    let data = [3.0_f64, 4.0];
    let mut st = status();
    let h = unsafe { ach_create_vector(data.as_ptr(), data.len(), &mut st) };

    let name = CString::new("v").unwrap();
    unsafe { ach_bind_variable_to_handle(name.as_ptr(), h, &mut st) };
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);

    let src = CString::new("norm(v)").unwrap();
    let out = unsafe { ach_eval(src.as_ptr(), &mut st) };
    assert_eq!(buffer_to_string(out), "5");
}

#[test]
fn matrix_decompositions_over_the_abi() {
    ach_reset();
    let data = [4.0_f64, 1.0, 1.0, 3.0];
    let mut st = status();
    let h = unsafe { ach_create_matrix(data.as_ptr(), data.len(), 2, 2, &mut st) };
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);

    let lu = ach_lu(h, &mut st);
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    assert_ne!(lu.first, ACH_NULL_HANDLE);

    let qr = ach_qr(h, &mut st);
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    assert_ne!(qr.second, ACH_NULL_HANDLE);

    let svd = ach_svd(h, &mut st);
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    let s = unsafe { ach_get_vector(svd.second, &mut st) };
    assert_eq!(s.len, 2);
    unsafe { ach_f64_buffer_free(s) };

    let mut lambda = 0.0;
    let v = unsafe { ach_power_iteration(h, 500, 1e-12, &mut lambda, &mut st) };
    assert_eq!(st.code, ach_status_code::ACH_STATUS_OK);
    assert_ne!(v, ACH_NULL_HANDLE);
    assert!(lambda > 4.0 && lambda < 5.0);

    assert!(ach_is_symmetric(h, 1e-12, &mut st));
    assert!(ach_is_positive_definite(h, &mut st));
    assert!((ach_det(h, &mut st) - 11.0).abs() < 1e-10);

    let inv = ach_inverse(h, &mut st);
    let m = unsafe { ach_get_matrix(inv, &mut st) };
    assert_eq!((m.rows, m.cols), (2, 2));
    unsafe { ach_matrix_buffer_free(m) };
}

#[test]
fn singular_matrix_reports_kind() {
    ach_reset();
    let data = [1.0_f64, 2.0, 2.0, 4.0];
    let mut st = status();
    let h = unsafe { ach_create_matrix(data.as_ptr(), data.len(), 2, 2, &mut st) };
    let inv = ach_inverse(h, &mut st);
    assert_eq!(inv, ACH_NULL_HANDLE);
    let json = error_json(st);
    assert!(json.contains("SingularMatrix"), "payload: {json}");
}

#[test]
fn stats_reflect_usage() {
    ach_reset();
    let mut st = status();
    let data = [1.0_f64];
    let h = unsafe { ach_create_vector(data.as_ptr(), data.len(), &mut st) };
    let _ = ach_sum(h, &mut st);
    let src = CString::new("1 + 1").unwrap();
    let out = unsafe { ach_eval(src.as_ptr(), &mut st) };
    buffer_to_string(out);

    let stats = ach_arena_stats();
    assert_eq!(stats.active_handles, 1);
    assert_eq!(stats.slow_path_ops, 1);
    assert_eq!(stats.fast_path_ops, 2);

    ach_reset();
    let stats = ach_arena_stats();
    assert_eq!(stats.total_alloc, 0);
    assert_eq!(stats.active_handles, 0);
}

#[test]
fn windows_and_generators() {
    ach_reset();
    let mut st = status();
    let h = ach_hanning_window(1, &mut st);
    let out = unsafe { ach_get_vector(h, &mut st) };
    let xs = unsafe { std::slice::from_raw_parts(out.data, out.len) };
    assert_eq!(xs, &[1.0]);
    unsafe { ach_f64_buffer_free(out) };

    let h = ach_linspace(0.0, 1.0, 3, &mut st);
    let out = unsafe { ach_get_vector(h, &mut st) };
    let xs = unsafe { std::slice::from_raw_parts(out.data, out.len) };
    assert_eq!(xs, &[0.0, 0.5, 1.0]);
    unsafe { ach_f64_buffer_free(out) };

    let h = ach_identity(2, &mut st);
    let m = unsafe { ach_get_matrix(h, &mut st) };
    let xs = unsafe { std::slice::from_raw_parts(m.data.data, m.data.len) };
    assert_eq!(xs, &[1.0, 0.0, 0.0, 1.0]);
    unsafe { ach_matrix_buffer_free(m) };
}
