//! Flat C ABI over the engine.
//!
//! Every fallible entry point takes an out `*mut ach_status`; on error
//! the status carries a JSON payload (`{"kind": …, "message": …}`) in a
//! Rust-owned buffer the host must release with [`ach_buffer_free`].
//! Together with the return value this realizes the three-word
//! value / error-payload / error-flag contract of the binding layer.
//!
//! The engine instance is `thread_local!`: the core is single-threaded
//! by contract, and a host wanting isolation re-instantiates the
//! library.

#![allow(clippy::missing_safety_doc)]
#![allow(non_camel_case_types)]

use std::cell::RefCell;
use std::ffi::{CStr, c_char, c_int};
use std::ptr;
use std::slice;

use achronyme_common::{EngineError, EngineErrorKind};
use achronyme_runtime::{Engine, Handle, UnaryKernel};

thread_local! {
    static ENGINE: RefCell<Engine> = RefCell::new(Engine::new());
}

fn with_engine<T>(f: impl FnOnce(&mut Engine) -> T) -> T {
    ENGINE.with(|engine| f(&mut engine.borrow_mut()))
}

/// Returned from handle-producing calls whose status reports an error.
pub const ACH_NULL_HANDLE: u32 = u32::MAX;

/// A byte buffer owned by Rust, to be freed by `ach_buffer_free`.
#[repr(C)]
pub struct ach_buffer {
    pub data: *mut u8,
    pub len: usize,
    pub cap: usize,
}

impl ach_buffer {
    pub fn from_vec(mut v: Vec<u8>) -> Self {
        let b = ach_buffer {
            data: v.as_mut_ptr(),
            len: v.len(),
            cap: v.capacity(),
        };
        std::mem::forget(v);
        b
    }

    pub fn empty() -> Self {
        ach_buffer {
            data: ptr::null_mut(),
            len: 0,
            cap: 0,
        }
    }
}

/// An `f64` buffer owned by Rust, to be freed by `ach_f64_buffer_free`.
#[repr(C)]
pub struct ach_f64_buffer {
    pub data: *mut f64,
    pub len: usize,
    pub cap: usize,
}

impl ach_f64_buffer {
    pub fn from_vec(mut v: Vec<f64>) -> Self {
        let b = ach_f64_buffer {
            data: v.as_mut_ptr(),
            len: v.len(),
            cap: v.capacity(),
        };
        std::mem::forget(v);
        b
    }

    pub fn empty() -> Self {
        ach_f64_buffer {
            data: ptr::null_mut(),
            len: 0,
            cap: 0,
        }
    }
}

/// Row-major matrix payload: `rows * cols` values behind one buffer.
#[repr(C)]
pub struct ach_matrix_buffer {
    pub rows: usize,
    pub cols: usize,
    pub data: ach_f64_buffer,
}

impl ach_matrix_buffer {
    pub fn empty() -> Self {
        ach_matrix_buffer {
            rows: 0,
            cols: 0,
            data: ach_f64_buffer::empty(),
        }
    }
}

#[repr(C)]
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum ach_status_code {
    ACH_STATUS_OK = 0,
    ACH_STATUS_ERROR = 1,
}

/// Status reporting for FFI calls.
#[repr(C)]
pub struct ach_status {
    pub code: ach_status_code,
    pub error: ach_buffer, // JSON encoded error if code != OK
}

#[derive(serde::Serialize)]
struct ErrorPayload<'a> {
    kind: String,
    message: Option<&'a str>,
}

impl ach_status {
    pub fn ok() -> Self {
        ach_status {
            code: ach_status_code::ACH_STATUS_OK,
            error: ach_buffer::empty(),
        }
    }

    pub fn from_error(err: &EngineError) -> Self {
        let payload = ErrorPayload {
            kind: err.kind.to_string(),
            message: err.message.as_deref(),
        };
        let bytes = serde_json::to_vec(&payload)
            .unwrap_or_else(|_| format!("{{\"kind\": {:?}}}", err.kind.to_string()).into_bytes());
        ach_status {
            code: ach_status_code::ACH_STATUS_ERROR,
            error: ach_buffer::from_vec(bytes),
        }
    }

}

fn set_status(status: *mut ach_status, value: ach_status) {
    if !status.is_null() {
        unsafe {
            *status = value;
        }
    }
}

/// Handle-returning calls: report errors through the status and return
/// the null handle.
fn handle_result(result: Result<Handle, EngineError>, status: *mut ach_status) -> u32 {
    match result {
        Ok(h) => {
            set_status(status, ach_status::ok());
            h
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ACH_NULL_HANDLE
        }
    }
}

/// Scalar-returning calls: errors yield NaN plus the status.
fn f64_result(result: Result<f64, EngineError>, status: *mut ach_status) -> f64 {
    match result {
        Ok(x) => {
            set_status(status, ach_status::ok());
            x
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            f64::NAN
        }
    }
}

fn bool_result(result: Result<bool, EngineError>, status: *mut ach_status) -> bool {
    match result {
        Ok(x) => {
            set_status(status, ach_status::ok());
            x
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            false
        }
    }
}

unsafe fn read_utf8<'a>(ptr: *const c_char) -> Result<std::borrow::Cow<'a, str>, EngineError> {
    if ptr.is_null() {
        return Err(EngineError::new(EngineErrorKind::TypeMismatch)
            .with_message("null string pointer"));
    }
    Ok(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
}

unsafe fn read_f64s<'a>(data: *const f64, len: usize) -> Result<&'a [f64], EngineError> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(EngineError::new(EngineErrorKind::TypeMismatch)
            .with_message("null buffer pointer"));
    }
    Ok(unsafe { slice::from_raw_parts(data, len) })
}

/* ═══════════════════ versioning & memory ═══════════════════ */

#[unsafe(no_mangle)]
pub extern "C" fn ach_abi_version() -> c_int {
    1
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_buffer_free(buffer: ach_buffer) {
    if !buffer.data.is_null() {
        unsafe {
            let _ = Vec::from_raw_parts(buffer.data, buffer.len, buffer.cap);
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_f64_buffer_free(buffer: ach_f64_buffer) {
    if !buffer.data.is_null() {
        unsafe {
            let _ = Vec::from_raw_parts(buffer.data, buffer.len, buffer.cap);
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_matrix_buffer_free(buffer: ach_matrix_buffer) {
    unsafe { ach_f64_buffer_free(buffer.data) }
}

/* ═══════════════════ lifecycle ═══════════════════ */

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_eval(
    source: *const c_char,
    status: *mut ach_status,
) -> ach_buffer {
    let source = match unsafe { read_utf8(source) } {
        Ok(s) => s,
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            return ach_buffer::empty();
        }
    };
    match with_engine(|engine| engine.eval(&source)) {
        Ok(rendered) => {
            set_status(status, ach_status::ok());
            ach_buffer::from_vec(rendered.into_bytes())
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_buffer::empty()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_reset() {
    with_engine(|engine| engine.reset());
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_release_handle(h: u32) {
    with_engine(|engine| engine.release_handle(h));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_bind_variable_to_handle(
    name: *const c_char,
    h: u32,
    status: *mut ach_status,
) {
    let name = match unsafe { read_utf8(name) } {
        Ok(s) => s,
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            return;
        }
    };
    match with_engine(|engine| engine.bind_variable_to_handle(&name, h)) {
        Ok(()) => set_status(status, ach_status::ok()),
        Err(e) => set_status(status, ach_status::from_error(&e)),
    }
}

/* ═══════════════════ creation / retrieval ═══════════════════ */

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_create_vector(
    data: *const f64,
    len: usize,
    status: *mut ach_status,
) -> u32 {
    let result = unsafe { read_f64s(data, len) }
        .map(|xs| with_engine(|engine| engine.create_vector(xs.to_vec())));
    handle_result(result, status)
}

/// Alias kept for hosts that distinguish typed-array and raw-pointer
/// construction; the ABI shape is identical.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_create_vector_from_buffer(
    data: *const f64,
    len: usize,
    status: *mut ach_status,
) -> u32 {
    unsafe { ach_create_vector(data, len, status) }
}

/// Interleaved `re, im` pairs; `len` counts doubles, so it must be
/// even.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_create_complex_vector(
    data: *const f64,
    len: usize,
    status: *mut ach_status,
) -> u32 {
    let result = unsafe { read_f64s(data, len) }
        .and_then(|xs| with_engine(|engine| engine.create_complex_vector(xs)));
    handle_result(result, status)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_create_matrix(
    data: *const f64,
    len: usize,
    rows: usize,
    cols: usize,
    status: *mut ach_status,
) -> u32 {
    let result = unsafe { read_f64s(data, len) }
        .and_then(|xs| with_engine(|engine| engine.create_matrix(xs.to_vec(), rows, cols)));
    handle_result(result, status)
}

/// The vector payload is copied out; the caller owns the buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_get_vector(h: u32, status: *mut ach_status) -> ach_f64_buffer {
    match with_engine(|engine| engine.get_vector(h).map(<[f64]>::to_vec)) {
        Ok(xs) => {
            set_status(status, ach_status::ok());
            ach_f64_buffer::from_vec(xs)
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_f64_buffer::empty()
        }
    }
}

/// Complex payloads come back as interleaved `re, im` doubles (twice
/// the pair count).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_get_complex_vector(
    h: u32,
    status: *mut ach_status,
) -> ach_f64_buffer {
    match with_engine(|engine| {
        engine.get_complex_vector(h).map(|zs| {
            let mut out = Vec::with_capacity(zs.len() * 2);
            for z in zs {
                out.push(z.re);
                out.push(z.im);
            }
            out
        })
    }) {
        Ok(xs) => {
            set_status(status, ach_status::ok());
            ach_f64_buffer::from_vec(xs)
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_f64_buffer::empty()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_get_matrix(h: u32, status: *mut ach_status) -> ach_matrix_buffer {
    match with_engine(|engine| {
        engine
            .get_matrix(h)
            .map(|m| (m.rows(), m.cols(), m.data().to_vec()))
    }) {
        Ok((rows, cols, data)) => {
            set_status(status, ach_status::ok());
            ach_matrix_buffer {
                rows,
                cols,
                data: ach_f64_buffer::from_vec(data),
            }
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_matrix_buffer::empty()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_linspace(a: f64, b: f64, n: usize, status: *mut ach_status) -> u32 {
    let h = with_engine(|engine| engine.linspace(a, b, n));
    set_status(status, ach_status::ok());
    h
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_identity(n: usize, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.identity(n)), status)
}

/* ═══════════════════ element-wise math ═══════════════════ */

fn unary_math(kernel: UnaryKernel, h: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.map_unary(kernel, h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_math_sin(h: u32, status: *mut ach_status) -> u32 {
    unary_math(UnaryKernel::Sin, h, status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_math_cos(h: u32, status: *mut ach_status) -> u32 {
    unary_math(UnaryKernel::Cos, h, status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_math_tan(h: u32, status: *mut ach_status) -> u32 {
    unary_math(UnaryKernel::Tan, h, status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_math_exp(h: u32, status: *mut ach_status) -> u32 {
    unary_math(UnaryKernel::Exp, h, status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_math_ln(h: u32, status: *mut ach_status) -> u32 {
    unary_math(UnaryKernel::Ln, h, status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_math_sqrt(h: u32, status: *mut ach_status) -> u32 {
    unary_math(UnaryKernel::Sqrt, h, status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_math_abs(h: u32, status: *mut ach_status) -> u32 {
    unary_math(UnaryKernel::Abs, h, status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_vadd(a: u32, b: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.vadd(a, b)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_vsub(a: u32, b: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.vsub(a, b)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_vmul(a: u32, b: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.vmul(a, b)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_vdiv(a: u32, b: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.vdiv(a, b)), status)
}

/* ═══════════════════ reductions ═══════════════════ */

#[unsafe(no_mangle)]
pub extern "C" fn ach_dot(a: u32, b: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.dot(a, b)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_sum(h: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.sum(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_mean(h: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.mean(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_std(h: u32, ddof: usize, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.std(h, ddof)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_min(h: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.min(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_max(h: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.max(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_norm(h: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.norm(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_norm_l1(h: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.norm_l1(h)), status)
}

/* ═══════════════════ DSP ═══════════════════ */

#[unsafe(no_mangle)]
pub extern "C" fn ach_dsp_fft(h: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.fft(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_dsp_fft_mag(h: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.fft_mag(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_dsp_ifft(h: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.ifft(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_conv(a: u32, b: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.conv(a, b)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_conv_fft(a: u32, b: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.conv_fft(a, b)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_hanning_window(n: usize, status: *mut ach_status) -> u32 {
    let h = with_engine(|engine| engine.hann_window(n));
    set_status(status, ach_status::ok());
    h
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_hamming_window(n: usize, status: *mut ach_status) -> u32 {
    let h = with_engine(|engine| engine.hamming_window(n));
    set_status(status, ach_status::ok());
    h
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_blackman_window(n: usize, status: *mut ach_status) -> u32 {
    let h = with_engine(|engine| engine.blackman_window(n));
    set_status(status, ach_status::ok());
    h
}

/* ═══════════════════ linear algebra ═══════════════════ */

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ach_handle_pair {
    pub first: u32,
    pub second: u32,
}

impl ach_handle_pair {
    fn invalid() -> Self {
        ach_handle_pair {
            first: ACH_NULL_HANDLE,
            second: ACH_NULL_HANDLE,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ach_handle_triple {
    pub first: u32,
    pub second: u32,
    pub third: u32,
}

impl ach_handle_triple {
    fn invalid() -> Self {
        ach_handle_triple {
            first: ACH_NULL_HANDLE,
            second: ACH_NULL_HANDLE,
            third: ACH_NULL_HANDLE,
        }
    }
}

/// `(L, U, P)` with `P·A = L·U`.
#[unsafe(no_mangle)]
pub extern "C" fn ach_lu(h: u32, status: *mut ach_status) -> ach_handle_triple {
    match with_engine(|engine| engine.lu(h)) {
        Ok((l, u, p)) => {
            set_status(status, ach_status::ok());
            ach_handle_triple {
                first: l,
                second: u,
                third: p,
            }
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_handle_triple::invalid()
        }
    }
}

/// `(Q, R)`.
#[unsafe(no_mangle)]
pub extern "C" fn ach_qr(h: u32, status: *mut ach_status) -> ach_handle_pair {
    match with_engine(|engine| engine.qr(h)) {
        Ok((q, r)) => {
            set_status(status, ach_status::ok());
            ach_handle_pair { first: q, second: r }
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_handle_pair::invalid()
        }
    }
}

/// `(U, S, V)`; `S` is a vector handle of descending singular values.
#[unsafe(no_mangle)]
pub extern "C" fn ach_svd(h: u32, status: *mut ach_status) -> ach_handle_triple {
    match with_engine(|engine| engine.svd(h)) {
        Ok((u, s, v)) => {
            set_status(status, ach_status::ok());
            ach_handle_triple {
                first: u,
                second: s,
                third: v,
            }
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_handle_triple::invalid()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_cholesky(h: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.cholesky(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_inverse(h: u32, status: *mut ach_status) -> u32 {
    handle_result(with_engine(|engine| engine.inverse(h)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_det(h: u32, status: *mut ach_status) -> f64 {
    f64_result(with_engine(|engine| engine.det(h)), status)
}

/// The dominant eigenvalue is written through `out_lambda`; the unit
/// eigenvector comes back as a handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ach_power_iteration(
    h: u32,
    max_iter: usize,
    tol: f64,
    out_lambda: *mut f64,
    status: *mut ach_status,
) -> u32 {
    match with_engine(|engine| engine.power_iteration(h, max_iter, tol)) {
        Ok((lambda, v)) => {
            if !out_lambda.is_null() {
                unsafe {
                    *out_lambda = lambda;
                }
            }
            set_status(status, ach_status::ok());
            v
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ACH_NULL_HANDLE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_qr_eigenvalues(
    h: u32,
    max_iter: usize,
    tol: f64,
    status: *mut ach_status,
) -> u32 {
    handle_result(
        with_engine(|engine| engine.qr_eigenvalues(h, max_iter, tol)),
        status,
    )
}

/// `(values, vectors)`.
#[unsafe(no_mangle)]
pub extern "C" fn ach_eigen_symmetric(
    h: u32,
    max_iter: usize,
    tol: f64,
    status: *mut ach_status,
) -> ach_handle_pair {
    match with_engine(|engine| engine.eigen_symmetric(h, max_iter, tol)) {
        Ok((values, vectors)) => {
            set_status(status, ach_status::ok());
            ach_handle_pair {
                first: values,
                second: vectors,
            }
        }
        Err(e) => {
            set_status(status, ach_status::from_error(&e));
            ach_handle_pair::invalid()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_is_symmetric(h: u32, tol: f64, status: *mut ach_status) -> bool {
    bool_result(with_engine(|engine| engine.is_symmetric(h, tol)), status)
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_is_positive_definite(h: u32, status: *mut ach_status) -> bool {
    bool_result(with_engine(|engine| engine.is_positive_definite(h)), status)
}

/* ═══════════════════ diagnostics ═══════════════════ */

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ach_arena_stats {
    pub total_alloc: u64,
    pub total_free: u64,
    pub fast_path_ops: u64,
    pub slow_path_ops: u64,
    pub active_handles: u64,
}

#[unsafe(no_mangle)]
pub extern "C" fn ach_arena_stats() -> ach_arena_stats {
    with_engine(|engine| {
        let stats = engine.stats();
        ach_arena_stats {
            total_alloc: stats.total_alloc,
            total_free: stats.total_free,
            fast_path_ops: stats.fast_path_ops,
            slow_path_ops: stats.slow_path_ops,
            active_handles: stats.active_handles(),
        }
    })
}
