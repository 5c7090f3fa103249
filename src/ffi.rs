//! C interface over expressions and the default evaluation pipeline.
//!
//! Handles are boxed and owned by the caller: every pointer returned by a
//! `vx_new_*`, `vx_get_new_*`, `vx_get_head`, `vx_get_arguments` or
//! `vx_evaluate` call must be released with the matching `vx_free_*`
//! function. Inputs are only borrowed; constructors clone what they keep.
//!
//! Typed accessors abort the process when the expression holds a different
//! alternative. Callers check `vx_type_id` first.

use crate::engine::{Coordinator, EngineRegistry, ReferenceEngine, REFERENCE_ENGINE};
use crate::expression::{
    type_tag, ArgumentRef, CloneReason, ComplexExpression, Expression, ExpressionResult, Symbol,
};
use log::error;
use parking_lot::Mutex;
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::{Arc, OnceLock};

/// Opaque expression handle.
pub struct ExpressionHandle {
    delegate: Expression,
}

/// Opaque symbol handle.
pub struct SymbolHandle {
    delegate: Symbol,
}

static DEFAULT_COORDINATOR: OnceLock<Mutex<Coordinator>> = OnceLock::new();

/// Coordinator used by [`vx_evaluate`]: the reference engine as the only
/// pipeline stage. Hosts can replace the pipeline by evaluating a
/// `SetDefaultEnginePipeline` directive.
fn default_coordinator() -> &'static Mutex<Coordinator> {
    DEFAULT_COORDINATOR.get_or_init(|| {
        let registry = EngineRegistry::new();
        registry.register(REFERENCE_ENGINE, Arc::new(ReferenceEngine::new()));
        let mut coordinator = Coordinator::new(registry);
        coordinator.set_pipeline([REFERENCE_ENGINE]);
        Mutex::new(coordinator)
    })
}

fn new_expression(delegate: Expression) -> *mut ExpressionHandle {
    Box::into_raw(Box::new(ExpressionHandle { delegate }))
}

fn new_symbol(delegate: Symbol) -> *mut SymbolHandle {
    Box::into_raw(Box::new(SymbolHandle { delegate }))
}

fn new_string(value: &str) -> *mut c_char {
    match CString::new(value) {
        Ok(s) => s.into_raw(),
        Err(err) => {
            error!("string with interior NUL cannot cross the C interface: {}", err);
            std::process::abort()
        }
    }
}

fn or_abort<T>(result: ExpressionResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!("{}", err);
            std::process::abort()
        }
    }
}

unsafe fn expression<'a>(handle: *const ExpressionHandle) -> &'a Expression {
    &(*handle).delegate
}

unsafe fn complex<'a>(handle: *const ExpressionHandle) -> &'a ComplexExpression {
    or_abort(expression(handle).get_ref::<ComplexExpression>())
}

unsafe fn text(value: *const c_char) -> String {
    CStr::from_ptr(value).to_string_lossy().into_owned()
}

/// Evaluate a copy of `arg` through the default coordinator. Failures come
/// back as `ErrorWhenEvaluatingExpression` expressions.
///
/// # Safety
/// `arg` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn vx_evaluate(arg: *const ExpressionHandle) -> *mut ExpressionHandle {
    let input = expression(arg).clone(CloneReason::ForeignCall);
    let result = default_coordinator().lock().evaluate(input);
    new_expression(result)
}

#[no_mangle]
pub extern "C" fn vx_new_bool(value: bool) -> *mut ExpressionHandle {
    new_expression(Expression::Bool(value))
}

#[no_mangle]
pub extern "C" fn vx_new_int(value: i32) -> *mut ExpressionHandle {
    new_expression(Expression::from(value))
}

#[no_mangle]
pub extern "C" fn vx_new_long(value: i64) -> *mut ExpressionHandle {
    new_expression(Expression::Int64(value))
}

#[no_mangle]
pub extern "C" fn vx_new_float(value: f32) -> *mut ExpressionHandle {
    new_expression(Expression::from(value))
}

#[no_mangle]
pub extern "C" fn vx_new_double(value: f64) -> *mut ExpressionHandle {
    new_expression(Expression::Double(value))
}

/// # Safety
/// `value` must be a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vx_new_string(value: *const c_char) -> *mut ExpressionHandle {
    new_expression(Expression::String(text(value)))
}

/// Symbol atom named `name`.
///
/// # Safety
/// `name` must be a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vx_new_symbol_expression(name: *const c_char) -> *mut ExpressionHandle {
    new_expression(Expression::Symbol(Symbol::from(text(name))))
}

/// # Safety
/// `name` must be a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vx_new_symbol(name: *const c_char) -> *mut SymbolHandle {
    new_symbol(Symbol::from(text(name)))
}

/// Complex expression with head `head` and copies of the first `cardinality`
/// entries of `arguments` as dynamic arguments.
///
/// # Safety
/// `head` must be a live handle and `arguments` must point to at least
/// `cardinality` live handles (it may be null when `cardinality` is zero).
#[no_mangle]
pub unsafe extern "C" fn vx_new_complex(
    head: *const SymbolHandle,
    cardinality: usize,
    arguments: *const *const ExpressionHandle,
) -> *mut ExpressionHandle {
    let arguments: &[*const ExpressionHandle] = if cardinality == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(arguments, cardinality)
    };
    let dynamics = arguments
        .iter()
        .map(|&arg| expression(arg).clone(CloneReason::ForeignCall))
        .collect();
    new_expression(Expression::Complex(ComplexExpression::new(
        (*head).delegate.clone(),
        dynamics,
    )))
}

/// # Safety
/// `symbol` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn vx_symbol_to_new_string(symbol: *const SymbolHandle) -> *mut c_char {
    new_string((*symbol).delegate.name())
}

/// `0` bool, `1` long, `2` double, `3` string, `4` symbol, `5` complex;
/// extension atoms follow from `6`.
///
/// # Safety
/// `arg` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn vx_type_id(arg: *const ExpressionHandle) -> usize {
    let index = expression(arg).type_index();
    debug_assert!(index < type_tag::FIRST_EXTENSION);
    index
}

/// # Safety
/// `arg` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn vx_get_bool(arg: *const ExpressionHandle) -> bool {
    *or_abort(expression(arg).get_ref::<bool>())
}

/// # Safety
/// `arg` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn vx_get_long(arg: *const ExpressionHandle) -> i64 {
    *or_abort(expression(arg).get_ref::<i64>())
}

/// # Safety
/// `arg` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn vx_get_double(arg: *const ExpressionHandle) -> f64 {
    *or_abort(expression(arg).get_ref::<f64>())
}

/// # Safety
/// `arg` must be a live handle. Release the result with [`vx_free_string`].
#[no_mangle]
pub unsafe extern "C" fn vx_get_new_string(arg: *const ExpressionHandle) -> *mut c_char {
    new_string(or_abort(expression(arg).get_ref::<String>()).as_str())
}

/// # Safety
/// `arg` must be a live handle. Release the result with [`vx_free_string`].
#[no_mangle]
pub unsafe extern "C" fn vx_get_new_symbol_name(arg: *const ExpressionHandle) -> *mut c_char {
    new_string(or_abort(expression(arg).get_ref::<Symbol>()).name())
}

/// # Safety
/// `arg` must be a live handle to a complex expression.
#[no_mangle]
pub unsafe extern "C" fn vx_get_head(arg: *const ExpressionHandle) -> *mut SymbolHandle {
    new_symbol(complex(arg).head().clone())
}

/// # Safety
/// `arg` must be a live handle to a complex expression.
#[no_mangle]
pub unsafe extern "C" fn vx_get_argument_count(arg: *const ExpressionHandle) -> usize {
    complex(arg).argument_count()
}

/// Null-terminated array of independent copies of the arguments, spans
/// flattened into atoms.
///
/// # Safety
/// `arg` must be a live handle to a complex expression. Release the result
/// with [`vx_free_arguments`].
#[no_mangle]
pub unsafe extern "C" fn vx_get_arguments(
    arg: *const ExpressionHandle,
) -> *mut *mut ExpressionHandle {
    let mut handles: Vec<*mut ExpressionHandle> = complex(arg)
        .arguments()
        .map(ArgumentRef::into_expression)
        .map(new_expression)
        .collect();
    handles.push(ptr::null_mut());
    Box::into_raw(handles.into_boxed_slice()) as *mut *mut ExpressionHandle
}

/// # Safety
/// `e` must be null or a handle that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn vx_free_expression(e: *mut ExpressionHandle) {
    if !e.is_null() {
        drop(Box::from_raw(e));
    }
}

/// Free an array from [`vx_get_arguments`] and every handle still in it.
///
/// # Safety
/// `arguments` must be null or come from [`vx_get_arguments`], unmodified.
#[no_mangle]
pub unsafe extern "C" fn vx_free_arguments(arguments: *mut *mut ExpressionHandle) {
    if arguments.is_null() {
        return;
    }
    let mut len = 0;
    while !(*arguments.add(len)).is_null() {
        vx_free_expression(*arguments.add(len));
        len += 1;
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(arguments, len + 1)));
}

/// # Safety
/// `s` must be null or a handle that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn vx_free_symbol(s: *mut SymbolHandle) {
    if !s.is_null() {
        drop(Box::from_raw(s));
    }
}

/// # Safety
/// `s` must be null or a string returned by this interface.
#[no_mangle]
pub unsafe extern "C" fn vx_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    unsafe fn take_string(s: *mut c_char) -> String {
        let value = CStr::from_ptr(s).to_str().unwrap().to_string();
        vx_free_string(s);
        value
    }

    #[test]
    fn test_atoms() {
        unsafe {
            let b = vx_new_bool(true);
            let i = vx_new_int(7);
            let f = vx_new_float(0.5);
            let s = vx_new_string(c("howdie").as_ptr());
            let y = vx_new_symbol_expression(c("x").as_ptr());

            assert_eq!(vx_type_id(b), type_tag::BOOL);
            assert_eq!(vx_type_id(i), type_tag::INT64);
            assert_eq!(vx_type_id(f), type_tag::DOUBLE);
            assert_eq!(vx_type_id(s), type_tag::STRING);
            assert_eq!(vx_type_id(y), type_tag::SYMBOL);

            assert!(vx_get_bool(b));
            assert_eq!(vx_get_long(i), 7);
            assert_eq!(vx_get_double(f), 0.5);
            assert_eq!(take_string(vx_get_new_string(s)), "howdie");
            assert_eq!(take_string(vx_get_new_symbol_name(y)), "x");

            for handle in [b, i, f, s, y] {
                vx_free_expression(handle);
            }
        }
    }

    #[test]
    fn test_complex_round_trip() {
        unsafe {
            let head = vx_new_symbol(c("Plus").as_ptr());
            let args = [vx_new_long(5), vx_new_long(4)];
            let const_args = [args[0] as *const _, args[1] as *const _];
            let plus = vx_new_complex(head, 2, const_args.as_ptr());
            for arg in args {
                vx_free_expression(arg);
            }
            vx_free_symbol(head);

            assert_eq!(vx_type_id(plus), type_tag::COMPLEX);
            let head = vx_get_head(plus);
            assert_eq!(take_string(vx_symbol_to_new_string(head)), "Plus");
            vx_free_symbol(head);

            assert_eq!(vx_get_argument_count(plus), 2);
            let arguments = vx_get_arguments(plus);
            assert_eq!(vx_get_long(*arguments), 5);
            assert_eq!(vx_get_long(*arguments.add(1)), 4);
            assert!((*arguments.add(2)).is_null());
            vx_free_arguments(arguments);

            let result = vx_evaluate(plus);
            assert_eq!(vx_get_long(result), 9);
            assert_eq!((*plus).delegate, complex!("Plus", 5i64, 4i64));
            vx_free_expression(result);
            vx_free_expression(plus);
        }
    }

    #[test]
    fn test_empty_complex_and_failures() {
        unsafe {
            let head = vx_new_symbol(c("Nothing").as_ptr());
            let nothing = vx_new_complex(head, 0, ptr::null());
            vx_free_symbol(head);
            assert_eq!(vx_get_argument_count(nothing), 0);
            let arguments = vx_get_arguments(nothing);
            assert!((*arguments).is_null());
            vx_free_arguments(arguments);
            vx_free_expression(nothing);

            let head = vx_new_symbol(c("StringJoin").as_ptr());
            let bad = [vx_new_long(1) as *const _];
            let join = vx_new_complex(head, 1, bad.as_ptr());
            let result = vx_evaluate(join);
            let head = vx_get_head(result);
            assert_eq!(
                take_string(vx_symbol_to_new_string(head)),
                "ErrorWhenEvaluatingExpression"
            );
            vx_free_symbol(head);
            for handle in [result, join, bad[0] as *mut _] {
                vx_free_expression(handle);
            }
            vx_free_symbol(vx_new_symbol(c("unused").as_ptr()));
        }
    }
}
