//! Stock compute closures and renderers for catalog counters.
//!
//! PMT catalogs describe each counter as a small expression over one or two
//! raw samples, e.g. `$parameter_0 * 2**-14` for an energy counter in
//! fixed-point joules. The constructors here cover the common shapes;
//! anything else can be expressed with [`unary`], [`binary`] or [`from_fn`].
//!
//! ```rust
//! use pmt_monitor::telemetry::{transform, Catalog, CounterId, Device, SampleView, Sample, Unit};
//!
//! let mut builder = Catalog::builder(1, "/sys/class/intel_pmt/telem0");
//! let raw = builder.add_raw("temp_raw", Sample::new(0, 8), Unit::new("raw"));
//! builder.add_counter(
//!     "temp",
//!     Sample::new(0, 8),
//!     Unit::new("C"),
//!     transform::linear(0.5, -20.0),
//!     [raw, CounterId::UNDEFINED],
//! );
//! let catalog = builder.build().unwrap();
//!
//! let bytes = [120u8];
//! let view = SampleView::new(&catalog, &bytes);
//! let id = catalog.counter_id_by_name("temp").unwrap();
//! assert_eq!(view.read_counter(id).unwrap(), 40.0);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::{ComputeFn, CounterId, RenderFn, Result, SampleView};

/// Wraps an arbitrary compute closure.
pub fn from_fn<F>(f: F) -> ComputeFn
where
    F: Fn(&SampleView<'_>, CounterId, CounterId) -> Result<f64> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Applies `f` to the raw value of the first operand.
pub fn unary<F>(f: F) -> ComputeFn
where
    F: Fn(u64) -> f64 + Send + Sync + 'static,
{
    from_fn(move |view, a, _| Ok(f(view.read_sample(a)?)))
}

/// Applies `f` to the raw values of both operands.
pub fn binary<F>(f: F) -> ComputeFn
where
    F: Fn(u64, u64) -> f64 + Send + Sync + 'static,
{
    from_fn(move |view, a, b| Ok(f(view.read_sample(a)?, view.read_sample(b)?)))
}

/// The raw sample value, unscaled.
pub fn raw() -> ComputeFn {
    unary(|x| x as f64)
}

pub fn scaled(factor: f64) -> ComputeFn {
    unary(move |x| x as f64 * factor)
}

/// `raw * factor + offset`
pub fn linear(factor: f64, offset: f64) -> ComputeFn {
    unary(move |x| x as f64 * factor + offset)
}

/// Unsigned fixed-point value with `frac_bits` fractional bits.
pub fn fixed_point(frac_bits: i32) -> ComputeFn {
    scaled(2f64.powi(-frac_bits))
}

/// First operand divided by the second. A zero denominator follows IEEE 754
/// semantics (infinity or NaN).
pub fn ratio() -> ComputeFn {
    binary(|a, b| a as f64 / b as f64)
}

/// First operand minus the second.
pub fn difference() -> ComputeFn {
    binary(|a, b| a as f64 - b as f64)
}

/// A counter that ignores its operands.
pub fn constant(value: f64) -> ComputeFn {
    from_fn(move |_, _, _| Ok(value))
}

/// Renders raw enumeration codes through `table`.
///
/// Values that are not an exact table code render as `unknown(<value>)`.
pub fn enum_render<S: Into<String>>(table: impl IntoIterator<Item = (u64, S)>) -> RenderFn {
    let table: HashMap<u64, String> = table
        .into_iter()
        .map(|(code, name)| (code, name.into()))
        .collect();

    Arc::new(move |value: f64| {
        let code = value as u64;
        match table.get(&code) {
            Some(name) if code as f64 == value => name.clone(),
            _ => format!("unknown({value})"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Catalog, Sample, Unit};

    fn two_field_catalog(compute: ComputeFn) -> (Catalog, CounterId) {
        let mut builder = Catalog::builder(7, "/tmp/telem");
        let a = builder.add_raw("a", Sample::new(0, 16), Unit::new("raw"));
        let b = builder.add_raw("b", Sample::new(16, 16), Unit::new("raw"));
        let id = builder.add_counter("c", Sample::new(0, 16), Unit::new("x"), compute, [a, b]);
        (builder.build().unwrap(), id)
    }

    fn eval(compute: ComputeFn, a: u16, b: u16) -> f64 {
        let (catalog, id) = two_field_catalog(compute);
        let mut bytes = a.to_le_bytes().to_vec();
        bytes.extend_from_slice(&b.to_le_bytes());
        SampleView::new(&catalog, &bytes).read_counter(id).unwrap()
    }

    #[test]
    fn test_raw_and_scaled() {
        assert_eq!(eval(raw(), 1234, 0), 1234.0);
        assert_eq!(eval(scaled(0.25), 100, 0), 25.0);
        assert_eq!(eval(linear(2.0, -5.0), 10, 0), 15.0);
    }

    #[test]
    fn test_fixed_point() {
        // 0x0180 in U8.8 is 1.5
        assert_eq!(eval(fixed_point(8), 0x0180, 0), 1.5);
    }

    #[test]
    fn test_two_operand_transforms() {
        assert_eq!(eval(ratio(), 300, 4), 75.0);
        assert_eq!(eval(difference(), 10, 25), -15.0);
        assert!(eval(ratio(), 1, 0).is_infinite());
        assert_eq!(eval(binary(|a, b| (a * b) as f64), 6, 7), 42.0);
    }

    #[test]
    fn test_constant_reads_nothing() {
        assert_eq!(eval(constant(3.5), 0, 0), 3.5);
    }

    #[test]
    fn test_operand_errors_propagate() {
        let mut builder = Catalog::builder(7, "/tmp/telem");
        let id = builder.add_counter(
            "c",
            Sample::new(0, 8),
            Unit::new("x"),
            difference(),
            [CounterId::new(0), CounterId::UNDEFINED],
        );
        let catalog = builder.build().unwrap();
        let err = SampleView::new(&catalog, &[1u8])
            .read_counter(id)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_enum_render() {
        let render = enum_render([(0, "disabled"), (3, "enabled")]);
        assert_eq!(render(0.0), "disabled");
        assert_eq!(render(3.0), "enabled");
        assert_eq!(render(2.0), "unknown(2)");
        assert_eq!(render(3.5), "unknown(3.5)");
    }
}
