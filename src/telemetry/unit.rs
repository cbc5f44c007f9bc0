use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Unit label used by catalogs for enumerated counters.
pub const ENUM_LABEL: &str = "enum";

/// Renders a counter value into a symbolic label.
pub type RenderFn = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// Physical unit of a counter and, for symbolic counters, how to render it.
#[derive(Clone)]
pub struct Unit {
    label: String,
    render: Option<RenderFn>,
}

impl Unit {
    /// A plain physical unit such as `"W"` or `"degrees C"`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            render: None,
        }
    }

    /// A unit whose values are shown through `render` instead of numerically.
    pub fn with_render(
        label: impl Into<String>,
        render: impl Fn(f64) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            render: Some(Arc::new(render)),
        }
    }

    /// An [`ENUM_LABEL`] unit rendering raw codes through `table`.
    ///
    /// ```rust
    /// use pmt_monitor::telemetry::Unit;
    ///
    /// let unit = Unit::enumerated([(0, "idle"), (1, "active")]);
    /// assert_eq!(unit.format(1.0), "active");
    /// assert_eq!(unit.format(7.0), "unknown(7)");
    /// ```
    pub fn enumerated<S: Into<String>>(table: impl IntoIterator<Item = (u64, S)>) -> Self {
        Self {
            label: ENUM_LABEL.to_owned(),
            render: Some(super::transform::enum_render(table)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn render(&self) -> Option<&RenderFn> {
        self.render.as_ref()
    }

    pub fn is_symbolic(&self) -> bool {
        self.render.is_some()
    }

    /// Formats `value` for display: the rendered label for symbolic units,
    /// otherwise the number followed by the unit label.
    pub fn format(&self, value: f64) -> String {
        match &self.render {
            Some(render) => render(value),
            None => format!("{} {}", value, self.label),
        }
    }

    /// Builds a [`Reading`] for `value` in this unit.
    pub fn reading(&self, value: f64) -> Reading {
        Reading {
            value,
            unit: self.label.clone(),
            symbol: self.render.as_ref().map(|render| render(value)),
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("label", &self.label)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// One evaluated counter value together with its unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub value: f64,
    pub unit: String,
    /// Rendered label for symbolic counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => f.write_str(symbol),
            None => write!(f, "{} {}", self.value, self.unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_unit_formats_value_with_label() {
        let unit = Unit::new("W");
        assert!(!unit.is_symbolic());
        assert_eq!(unit.format(12.5), "12.5 W");

        let reading = unit.reading(12.5);
        assert_eq!(reading.symbol, None);
        assert_eq!(reading.to_string(), "12.5 W");
    }

    #[test]
    fn test_symbolic_unit_prefers_rendered_label() {
        let unit = Unit::with_render(ENUM_LABEL, |v| {
            if v == 0.0 { "off".into() } else { "on".into() }
        });
        assert!(unit.is_symbolic());
        assert_eq!(unit.format(1.0), "on");

        let reading = unit.reading(0.0);
        assert_eq!(reading.value, 0.0);
        assert_eq!(reading.unit, "enum");
        assert_eq!(reading.symbol.as_deref(), Some("off"));
        assert_eq!(reading.to_string(), "off");
    }

    #[test]
    fn test_reading_serialization() {
        let plain = serde_json::to_value(Unit::new("C").reading(41.0)).unwrap();
        assert_eq!(plain, serde_json::json!({"value": 41.0, "unit": "C"}));

        let symbolic = Unit::enumerated([(2, "throttled")]).reading(2.0);
        let symbolic = serde_json::to_value(symbolic).unwrap();
        assert_eq!(
            symbolic,
            serde_json::json!({"value": 2.0, "unit": "enum", "symbol": "throttled"})
        );
    }
}
